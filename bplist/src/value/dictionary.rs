/*!
 An insertion-ordered dictionary without duplicate keys.
*/

use std::{slice, vec};

use crate::{binary::primitives::encode_scalar, value::Value};

/// Key-value pairs, kept in the order they were inserted
///
/// Keys are usually [`Value::String`], but any non-container [`Value`] may be used.
/// Lookups are linear; property list dictionaries are small in practice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: Vec<(Value, Value)>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a pair, returning the previous value if the key was already present.
    ///
    /// An existing key keeps its position; only its value is replaced.
    pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Append a pair whose key is known not to be present
    pub(crate) fn push_unchecked(&mut self, key: Value, value: Value) {
        self.entries.push((key, value));
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.position(key).map(|idx| &self.entries[idx].1)
    }

    /// Get the value for a string key
    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.position(key).is_some()
    }

    /// Remove a key, preserving the order of the remaining pairs
    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        let idx = self.position(key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> slice::Iter<'_, (Value, Value)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Keys match when they encode to the same bytes, the rule the decoder uses to reject duplicates
    ///
    /// Unlike `==`, this treats `NaN` keys with the same bits as one key, and `0.0` and `-0.0` as two.
    fn position(&self, key: &Value) -> Option<usize> {
        match encode_scalar(key) {
            Some(encoded) => self
                .entries
                .iter()
                .position(|(k, _)| encode_scalar(k).as_ref() == Some(&encoded)),
            None => self.entries.iter().position(|(k, _)| k.is_same_object(key)),
        }
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut dictionary = Dictionary::new();
        iter.into_iter().for_each(|(k, v)| {
            dictionary.insert(k, v);
        });
        dictionary
    }
}

impl IntoIterator for Dictionary {
    type Item = (Value, Value);
    type IntoIter = vec::IntoIter<(Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dictionary {
    type Item = &'a (Value, Value);
    type IntoIter = slice::Iter<'a, (Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

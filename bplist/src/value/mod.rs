/*!
 The in-memory representation of property list data.

 ## Sharing

 Containers, data, and strings are reference counted. When a document references the same object from
 several places, decoding it yields clones of one [`Arc`], and [`Value::is_same_object`] reports them as
 the same object.
 When encoding, the same rule runs in reverse: a container is written once per distinct allocation, while
 scalars with identical type and content are always collapsed into a single object.
*/

pub mod date;
pub mod dictionary;
pub mod number;

use std::sync::Arc;

pub use date::Date;
pub use dictionary::Dictionary;
pub use number::{Integer, Real, Uid};

/// A property list value
#[derive(Debug, Clone)]
pub enum Value {
    /// The `null` object
    Null,
    Boolean(bool),
    Integer(Integer),
    Real(Real),
    Date(Date),
    /// Opaque bytes
    Data(Arc<[u8]>),
    String(Arc<str>),
    /// An `NSKeyedArchiver` object reference
    Uid(Uid),
    Array(Arc<Vec<Value>>),
    /// An unordered collection; equality ignores member order
    Set(Arc<Vec<Value>>),
    Dictionary(Arc<Dictionary>),
}

impl Value {
    /// Build an array from owned members
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Arc::new(items))
    }

    /// Build a set from owned members
    pub fn set(items: Vec<Value>) -> Self {
        Value::Set(Arc::new(items))
    }

    /// Build a data value from bytes
    pub fn data(bytes: impl Into<Arc<[u8]>>) -> Self {
        Value::Data(bytes.into())
    }

    /// Build a dictionary value from an owned [`Dictionary`]
    pub fn dictionary(dictionary: Dictionary) -> Self {
        Value::Dictionary(Arc::new(dictionary))
    }

    /// A human readable name for the variant, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Date(_) => "date",
            Value::Data(_) => "data",
            Value::String(_) => "string",
            Value::Uid(_) => "uid",
            Value::Array(_) => "array",
            Value::Set(_) => "set",
            Value::Dictionary(_) => "dictionary",
        }
    }

    /// Whether this is an array, set, or dictionary
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Value::Array(_) | Value::Set(_) | Value::Dictionary(_)
        )
    }

    /// Whether two values would be stored as the same object.
    ///
    /// Containers are the same object only if they share an allocation;
    /// scalars are the same object when they are equal.
    pub fn is_same_object(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) | (Value::Set(a), Value::Set(b)) => {
                Arc::ptr_eq(a, b)
            }
            (Value::Dictionary(a), Value::Dictionary(b)) => Arc::ptr_eq(a, b),
            (a, b) if a.is_container() || b.is_container() => false,
            (a, b) => a == b,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<Integer> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_signed_integer(&self) -> Option<i64> {
        self.as_integer()?.as_signed()
    }

    pub fn as_unsigned_integer(&self) -> Option<u64> {
        self.as_integer()?.as_unsigned()
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(value) => Some(value.as_f64()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<Date> {
        match self {
            Value::Date(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            Value::Data(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_uid(&self) -> Option<Uid> {
        match self {
            Value::Uid(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&[Value]> {
        match self {
            Value::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(dictionary) => Some(dictionary),
            _ => None,
        }
    }
}

/// Match every member of `left` to a distinct equal member of `right`
fn same_members(left: &[Value], right: &[Value]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut used = vec![false; right.len()];
    left.iter().all(|item| {
        match right
            .iter()
            .enumerate()
            .position(|(idx, other)| !used[idx] && item == other)
        {
            Some(idx) => {
                used[idx] = true;
                true
            }
            None => false,
        }
    })
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Data(a), Value::Data(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Uid(a), Value::Uid(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b) || a == b,
            (Value::Set(a), Value::Set(b)) => Arc::ptr_eq(a, b) || same_members(a, b),
            (Value::Dictionary(a), Value::Dictionary(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

macro_rules! value_from_integer {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::Integer(Integer::from(value))
            }
        })*
    };
}

value_from_integer!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl From<Integer> for Value {
    fn from(value: Integer) -> Self {
        Value::Integer(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Real(Real::Single(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(Real::Double(value))
    }
}

impl From<Real> for Value {
    fn from(value: Real) -> Self {
        Value::Real(value)
    }
}

impl From<Date> for Value {
    fn from(value: Date) -> Self {
        Value::Date(value)
    }
}

impl From<Uid> for Value {
    fn from(value: Uid) -> Self {
        Value::Uid(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Arc::from(value))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

impl From<Dictionary> for Value {
    fn from(dictionary: Dictionary) -> Self {
        Value::dictionary(dictionary)
    }
}

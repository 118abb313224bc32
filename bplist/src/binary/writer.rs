/*!
 Contains logic to encode a [`Value`] tree as a binary property list.

 Encoding happens in two passes. The first pass walks the tree depth-first and assigns every distinct object
 an index in order of first appearance; a container takes its index before its members, and dictionary keys
 come before dictionary values. The second pass serializes the objects in index order, then appends the offset
 table and the trailer.
*/

use std::{
    collections::{hash_map::Entry, HashMap},
    io::Write,
    sync::Arc,
};

use tracing::debug;

use crate::{
    binary::{
        primitives::{encode_scalar, min_width, push_be_uint, push_marker},
        trailer::{write_offset_table, Trailer},
        HEADER_SIZE, MAGIC, TAG_ARRAY, TAG_ASCII_STRING, TAG_DATA, TAG_DICTIONARY, TAG_SET,
        VERSION,
    },
    value::{Dictionary, Value},
};

/// An entry in the object table before references are sized
#[derive(Debug)]
enum Object {
    /// The complete encoding of a scalar
    Scalar(Vec<u8>),
    /// A container with its member indexes; dictionaries store all keys followed by all values
    Container { tag: u8, count: usize, refs: Vec<u64> },
}

/// Identify a shared allocation by type tag and address
///
/// Containers are identified this way so equal but separate containers stay separate objects. Data and
/// strings are looked up this way first so a shared payload is only encoded once.
fn allocation_key<T: ?Sized>(tag: u8, shared: &Arc<T>) -> (u8, usize) {
    (tag, Arc::as_ptr(shared) as *const () as usize)
}

/// Contains logic and data used to encode a [`Value`] tree
#[derive(Debug)]
pub struct BinaryPlistWriter<'a> {
    /// The top object of the document
    root: &'a Value,
    /// Every distinct object, by index
    objects: Vec<Object>,
    /// Index assigned to each scalar encoding
    scalars: HashMap<Vec<u8>, u64>,
    /// Index assigned to each reference counted allocation, keyed by type tag and address
    allocations: HashMap<(u8, usize), u64>,
}

impl<'a> BinaryPlistWriter<'a> {
    /// Prepare to encode the tree rooted at `root`
    pub fn new(root: &'a Value) -> Self {
        Self {
            root,
            objects: vec![],
            scalars: HashMap::new(),
            allocations: HashMap::new(),
        }
    }

    /// Reserve the next index for `object`
    fn push(&mut self, object: Object) -> u64 {
        self.objects.push(object);
        self.objects.len() as u64 - 1
    }

    /// Assign indexes to `value` and everything it contains, returning the index of `value`
    fn flatten(&mut self, value: &Value) -> u64 {
        match value {
            Value::Array(items) => self.flatten_sequence(TAG_ARRAY, items),
            Value::Set(items) => self.flatten_sequence(TAG_SET, items),
            Value::Dictionary(dictionary) => self.flatten_dictionary(dictionary),
            Value::Data(data) => self.flatten_payload(allocation_key(TAG_DATA, data), value),
            Value::String(string) => {
                self.flatten_payload(allocation_key(TAG_ASCII_STRING, string), value)
            }
            scalar => self.flatten_scalar(scalar),
        }
    }

    /// Scalars with the same encoding share one index
    fn flatten_scalar(&mut self, scalar: &Value) -> u64 {
        let encoded = encode_scalar(scalar).unwrap_or_default();
        let next = self.objects.len() as u64;
        match self.scalars.entry(encoded) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                self.objects.push(Object::Scalar(entry.key().clone()));
                entry.insert(next);
                next
            }
        }
    }

    fn flatten_payload(&mut self, key: (u8, usize), scalar: &Value) -> u64 {
        if let Some(index) = self.allocations.get(&key) {
            return *index;
        }
        let index = self.flatten_scalar(scalar);
        self.allocations.insert(key, index);
        index
    }

    fn flatten_sequence(&mut self, tag: u8, items: &Arc<Vec<Value>>) -> u64 {
        let key = allocation_key(tag, items);
        if let Some(index) = self.allocations.get(&key) {
            return *index;
        }
        let index = self.push(Object::Container {
            tag,
            count: items.len(),
            refs: vec![],
        });
        self.allocations.insert(key, index);

        let mut refs = Vec::with_capacity(items.len());
        for item in items.iter() {
            refs.push(self.flatten(item));
        }
        self.objects[index as usize] = Object::Container {
            tag,
            count: items.len(),
            refs,
        };
        index
    }

    fn flatten_dictionary(&mut self, dictionary: &Arc<Dictionary>) -> u64 {
        let key = allocation_key(TAG_DICTIONARY, dictionary);
        if let Some(index) = self.allocations.get(&key) {
            return *index;
        }
        let index = self.push(Object::Container {
            tag: TAG_DICTIONARY,
            count: dictionary.len(),
            refs: vec![],
        });
        self.allocations.insert(key, index);

        let mut refs = Vec::with_capacity(dictionary.len() * 2);
        for key in dictionary.keys() {
            refs.push(self.flatten(key));
        }
        for value in dictionary.values() {
            refs.push(self.flatten(value));
        }
        self.objects[index as usize] = Object::Container {
            tag: TAG_DICTIONARY,
            count: dictionary.len(),
            refs,
        };
        index
    }

    /// Encode the document into `sink`
    pub fn write<W: Write>(self, sink: &mut W) -> std::io::Result<()> {
        sink.write_all(&self.to_vec())
    }

    /// Encode the document into a new buffer
    pub fn to_vec(mut self) -> Vec<u8> {
        let root = self.root;
        let top_object = self.flatten(root);
        let num_objects = self.objects.len() as u64;
        let object_ref_size = min_width(num_objects.saturating_sub(1));

        let mut out = Vec::with_capacity(HEADER_SIZE + self.objects.len() * 4);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(VERSION);

        let mut offsets = Vec::with_capacity(self.objects.len());
        for object in &self.objects {
            offsets.push(out.len() as u64);
            match object {
                Object::Scalar(encoded) => out.extend_from_slice(encoded),
                Object::Container { tag, count, refs } => {
                    push_marker(&mut out, *tag, *count);
                    refs.iter()
                        .for_each(|index| push_be_uint(&mut out, *index, object_ref_size));
                }
            }
        }

        let offset_table_start = out.len() as u64;
        let offset_int_size = min_width(offset_table_start);
        write_offset_table(&mut out, &offsets, offset_int_size);

        let trailer = Trailer {
            offset_int_size,
            object_ref_size,
            num_objects,
            top_object,
            offset_table_start,
        };
        out.extend_from_slice(&trailer.to_bytes());

        debug!(
            num_objects,
            object_ref_size,
            offset_int_size,
            "Wrote binary plist"
        );
        out
    }
}

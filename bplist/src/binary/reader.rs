/*!
 Contains logic to decode a binary property list into a [`Value`] tree.

 Objects are materialized lazily starting from the top object. Each object is read at most once:
 later references to the same index receive a clone of the cached [`Value`], which for containers, data,
 and strings shares the underlying allocation.

 Containers are decoded recursively, so [`DecodeOptions::max_depth`] also bounds stack use.
*/

use std::{collections::HashSet, sync::Arc};

use tracing::{debug, trace};

use crate::{
    binary::{
        options::DecodeOptions,
        primitives::{decode_latin1, decode_utf16_be, encode_scalar, read_be_uint, read_integer},
        trailer::{read_offset_table, Trailer},
        EXTENDED_SIZE, HEADER_SIZE, MAGIC, MARKER_DATE, MARKER_FALSE, MARKER_FILL, MARKER_NULL,
        MARKER_TRUE, TAG_ARRAY, TAG_ASCII_STRING, TAG_DATA, TAG_DATE, TAG_DICTIONARY,
        TAG_INTEGER, TAG_REAL, TAG_SET, TAG_SPECIAL, TAG_UID, TAG_UTF16_STRING,
    },
    error::decode::DecodeError,
    value::{Date, Dictionary, Real, Uid, Value},
};

/// Contains logic and data used to decode a binary property list
#[derive(Debug)]
pub struct BinaryPlistReader<'a> {
    /// The document we want to decode
    stream: &'a [u8],
    /// Limits applied while decoding
    options: DecodeOptions,
    /// Bytes per object reference inside a container
    ref_size: usize,
    /// Objects live in `stream[HEADER_SIZE..object_table_end]`
    object_table_end: usize,
    /// Byte offset of each object, by index
    offsets: Vec<usize>,
    /// Objects that have been fully decoded, by index
    object_table: Vec<Option<Value>>,
    /// Objects on the current resolution path, by index
    in_progress: Vec<bool>,
}

impl<'a> BinaryPlistReader<'a> {
    /// Prepare to decode `stream` with the default [`DecodeOptions`]
    pub fn new(stream: &'a [u8]) -> Self {
        Self::with_options(stream, DecodeOptions::default())
    }

    /// Prepare to decode `stream` with custom limits
    pub fn with_options(stream: &'a [u8], options: DecodeOptions) -> Self {
        Self {
            stream,
            options,
            ref_size: 0,
            object_table_end: 0,
            offsets: vec![],
            object_table: vec![],
            in_progress: vec![],
        }
    }

    /// Ensure the stream starts with `bplist` and a version we can read
    fn validate_header(&self) -> Result<(), DecodeError> {
        let header = self
            .stream
            .get(..HEADER_SIZE)
            .ok_or_else(|| DecodeError::UnsupportedFormat("missing header".to_string()))?;
        if &header[..MAGIC.len()] != MAGIC {
            return Err(DecodeError::UnsupportedFormat(format!(
                "invalid magic {:?}",
                String::from_utf8_lossy(&header[..MAGIC.len()])
            )));
        }
        match &header[MAGIC.len()..] {
            b"00" | b"01" => Ok(()),
            version => Err(DecodeError::UnsupportedFormat(format!(
                "unsupported version {:?}",
                String::from_utf8_lossy(version)
            ))),
        }
    }

    /// Read exactly `n` bytes starting at `start`, staying inside the object table
    fn read_exact_bytes(&self, start: usize, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = start
            .checked_add(n)
            .ok_or(DecodeError::UnexpectedEndOfData(usize::MAX, self.object_table_end))?;
        if end > self.object_table_end {
            return Err(DecodeError::UnexpectedEndOfData(end, self.object_table_end));
        }
        Ok(&self.stream[start..end])
    }

    /// Get the byte at a given index, if the index is within the object table
    fn get_byte(&self, byte_idx: usize) -> Result<u8, DecodeError> {
        if byte_idx < self.object_table_end {
            return Ok(self.stream[byte_idx]);
        }
        Err(DecodeError::UnexpectedEndOfData(
            byte_idx + 1,
            self.object_table_end,
        ))
    }

    /// Read the element count of the object at `offset`, returning it with the position of the payload
    fn read_count(&self, offset: usize, nibble: u8) -> Result<(usize, usize), DecodeError> {
        if nibble != EXTENDED_SIZE {
            return Ok((nibble as usize, offset + 1));
        }
        let marker = self.get_byte(offset + 1)?;
        if marker >> 4 != TAG_INTEGER || marker & 0x0F > 3 {
            return Err(DecodeError::MalformedObject(
                offset,
                "extended count must be an integer of 1, 2, 4, or 8 bytes",
            ));
        }
        let width = 1 << (marker & 0x0F);
        let count = read_be_uint(self.read_exact_bytes(offset + 2, width)?);
        let count = usize::try_from(count)
            .ok()
            .filter(|count| *count as u64 <= i64::MAX as u64)
            .ok_or(DecodeError::MalformedObject(offset, "extended count is out of range"))?;
        Ok((count, offset + 2 + width))
    }

    /// Read `count` object references starting at `start`
    fn read_refs(&self, start: usize, count: usize) -> Result<Vec<u64>, DecodeError> {
        let len = count
            .checked_mul(self.ref_size)
            .ok_or(DecodeError::UnexpectedEndOfData(usize::MAX, self.object_table_end))?;
        Ok(self
            .read_exact_bytes(start, len)?
            .chunks_exact(self.ref_size)
            .map(read_be_uint)
            .collect())
    }

    /// Get the object at `index`, decoding it if this is the first time it is seen
    fn resolve(&mut self, index: u64, depth: usize) -> Result<Value, DecodeError> {
        let idx = usize::try_from(index)
            .ok()
            .filter(|idx| *idx < self.offsets.len())
            .ok_or(DecodeError::ReferenceOutOfRange(
                index,
                self.offsets.len() as u64,
            ))?;

        if let Some(value) = &self.object_table[idx] {
            return Ok(value.clone());
        }
        if self.in_progress[idx] {
            return Err(DecodeError::CyclicReference(index));
        }
        if depth > self.options.max_depth {
            return Err(DecodeError::DepthLimitExceeded(self.options.max_depth));
        }

        self.in_progress[idx] = true;
        let result = self.read_object(self.offsets[idx], depth);
        self.in_progress[idx] = false;

        let value = result?;
        self.object_table[idx] = Some(value.clone());
        Ok(value)
    }

    /// Resolve each reference as a child of an object at `depth`
    fn resolve_all(&mut self, refs: &[u64], depth: usize) -> Result<Vec<Value>, DecodeError> {
        let mut values = Vec::with_capacity(refs.len());
        for index in refs {
            values.push(self.resolve(*index, depth + 1)?);
        }
        Ok(values)
    }

    /// Decode the object whose marker byte is at `offset`
    fn read_object(&mut self, offset: usize, depth: usize) -> Result<Value, DecodeError> {
        let marker = self.get_byte(offset)?;
        let nibble = marker & 0x0F;
        trace!(offset, marker, depth, "Reading object");

        match marker >> 4 {
            TAG_SPECIAL => match marker {
                MARKER_NULL | MARKER_FILL => Ok(Value::Null),
                MARKER_FALSE => Ok(Value::Boolean(false)),
                MARKER_TRUE => Ok(Value::Boolean(true)),
                _ => Err(DecodeError::UnknownObjectMarker(marker, offset)),
            },
            TAG_INTEGER => {
                if nibble > 4 {
                    return Err(DecodeError::MalformedObject(
                        offset,
                        "integers must be 1, 2, 4, 8, or 16 bytes",
                    ));
                }
                let bytes = self.read_exact_bytes(offset + 1, 1 << nibble)?;
                Ok(Value::Integer(read_integer(bytes)))
            }
            TAG_REAL => {
                let real = match nibble {
                    2 => {
                        let bytes = self.read_exact_bytes(offset + 1, 4)?;
                        Real::Single(f32::from_bits(read_be_uint(bytes) as u32))
                    }
                    3 => {
                        let bytes = self.read_exact_bytes(offset + 1, 8)?;
                        Real::Double(f64::from_bits(read_be_uint(bytes)))
                    }
                    _ => {
                        return Err(DecodeError::MalformedObject(
                            offset,
                            "reals must be 4 or 8 bytes",
                        ))
                    }
                };
                Ok(Value::Real(real))
            }
            TAG_DATE => {
                if marker != MARKER_DATE {
                    return Err(DecodeError::MalformedObject(
                        offset,
                        "dates must be 8 bytes",
                    ));
                }
                let bytes = self.read_exact_bytes(offset + 1, 8)?;
                Ok(Value::Date(Date::from_seconds_since_reference(
                    f64::from_bits(read_be_uint(bytes)),
                )))
            }
            TAG_DATA => {
                let (count, start) = self.read_count(offset, nibble)?;
                Ok(Value::Data(Arc::from(self.read_exact_bytes(start, count)?)))
            }
            TAG_ASCII_STRING => {
                let (count, start) = self.read_count(offset, nibble)?;
                Ok(Value::String(Arc::from(decode_latin1(
                    self.read_exact_bytes(start, count)?,
                ))))
            }
            TAG_UTF16_STRING => {
                let (count, start) = self.read_count(offset, nibble)?;
                let len = count.checked_mul(2).ok_or(DecodeError::UnexpectedEndOfData(
                    usize::MAX,
                    self.object_table_end,
                ))?;
                Ok(Value::String(Arc::from(decode_utf16_be(
                    self.read_exact_bytes(start, len)?,
                ))))
            }
            TAG_UID => {
                if nibble > 7 {
                    return Err(DecodeError::MalformedObject(
                        offset,
                        "UIDs must be 1 to 8 bytes",
                    ));
                }
                let bytes = self.read_exact_bytes(offset + 1, nibble as usize + 1)?;
                Ok(Value::Uid(Uid::new(read_be_uint(bytes))))
            }
            TAG_ARRAY => {
                let (count, start) = self.read_count(offset, nibble)?;
                let refs = self.read_refs(start, count)?;
                Ok(Value::Array(Arc::new(self.resolve_all(&refs, depth)?)))
            }
            TAG_SET => {
                let (count, start) = self.read_count(offset, nibble)?;
                let refs = self.read_refs(start, count)?;
                Ok(Value::Set(Arc::new(self.resolve_all(&refs, depth)?)))
            }
            TAG_DICTIONARY => {
                let (count, start) = self.read_count(offset, nibble)?;
                let refs = self.read_refs(start, count.saturating_mul(2))?;
                let (key_refs, value_refs) = refs.split_at(count);
                self.read_dictionary(offset, key_refs, value_refs, depth)
            }
            _ => Err(DecodeError::UnknownObjectMarker(marker, offset)),
        }
    }

    /// Resolve the keys and values of the dictionary at `offset`
    fn read_dictionary(
        &mut self,
        offset: usize,
        key_refs: &[u64],
        value_refs: &[u64],
        depth: usize,
    ) -> Result<Value, DecodeError> {
        let keys = self.resolve_all(key_refs, depth)?;

        let mut seen = HashSet::with_capacity(keys.len());
        for key in &keys {
            // Keys are compared by their canonical encoding, which containers do not have
            let encoded = encode_scalar(key).ok_or(DecodeError::MalformedObject(
                offset,
                "dictionary keys cannot be containers",
            ))?;
            if !seen.insert(encoded) {
                return Err(DecodeError::DuplicateKey(offset));
            }
        }

        let values = self.resolve_all(value_refs, depth)?;
        let mut dictionary = Dictionary::with_capacity(keys.len());
        keys.into_iter()
            .zip(values)
            .for_each(|(key, value)| dictionary.push_unchecked(key, value));
        Ok(Value::Dictionary(Arc::new(dictionary)))
    }

    /// Attempt to decode the document, returning its top object
    pub fn parse(&mut self) -> Result<Value, DecodeError> {
        self.validate_header()?;

        let trailer = Trailer::read(self.stream)?;
        debug!(
            offset_int_size = trailer.offset_int_size,
            object_ref_size = trailer.object_ref_size,
            num_objects = trailer.num_objects,
            top_object = trailer.top_object,
            offset_table_start = trailer.offset_table_start,
            "Read binary plist trailer"
        );

        self.offsets = read_offset_table(self.stream, &trailer)?;
        self.ref_size = trailer.object_ref_size as usize;
        self.object_table_end = trailer.offset_table_start as usize;
        self.object_table = vec![None; self.offsets.len()];
        self.in_progress = vec![false; self.offsets.len()];

        self.resolve(trailer.top_object, 0)
    }
}

impl<'a> From<&'a [u8]> for BinaryPlistReader<'a> {
    fn from(stream: &'a [u8]) -> Self {
        Self::new(stream)
    }
}

impl<'a> From<&'a Vec<u8>> for BinaryPlistReader<'a> {
    fn from(stream: &'a Vec<u8>) -> Self {
        Self::new(stream)
    }
}

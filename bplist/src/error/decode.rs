/*!
 Errors that can happen when decoding binary property list data.
*/

use std::{
    error,
    fmt::{Display, Formatter, Result},
};

/// Errors that can happen when decoding binary property list data
///
/// Every variant is terminal: a decode call that fails never yields a partial [`Value`](crate::Value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The stream does not start with `bplist` or carries a version we do not read
    UnsupportedFormat(String),
    /// The trailer fields are zero, too wide, or inconsistent with the stream length
    MalformedTrailer(&'static str),
    /// An object index maps to an offset outside of the object table
    OffsetOutOfRange(usize, u64),
    /// A container references an object index that does not exist
    ReferenceOutOfRange(u64, u64),
    /// A read needed data up to the first position but the region ends at the second
    UnexpectedEndOfData(usize, usize),
    /// A marker byte whose type tag is not part of the format
    UnknownObjectMarker(u8, usize),
    /// A known type tag whose size or payload is invalid
    MalformedObject(usize, &'static str),
    /// A dictionary contains the same key more than once
    DuplicateKey(usize),
    /// An object is reachable from itself
    CyclicReference(u64),
    /// Containers are nested deeper than the configured maximum
    DepthLimitExceeded(usize),
}

impl Display for DecodeError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            DecodeError::UnsupportedFormat(why) => write!(fmt, "Unsupported format: {why}"),
            DecodeError::MalformedTrailer(why) => write!(fmt, "Malformed trailer: {why}"),
            DecodeError::OffsetOutOfRange(index, offset) => {
                write!(
                    fmt,
                    "Object {index} has offset {offset:x} outside of the object table!"
                )
            }
            DecodeError::ReferenceOutOfRange(index, count) => {
                write!(fmt, "Reference {index} is outside of {count} objects!")
            }
            DecodeError::UnexpectedEndOfData(end, len) => {
                write!(fmt, "Index {end:x} is outside of range {len:x}!")
            }
            DecodeError::UnknownObjectMarker(marker, offset) => {
                write!(fmt, "Unknown object marker {marker:#04x} at offset {offset:x}")
            }
            DecodeError::MalformedObject(offset, why) => {
                write!(fmt, "Malformed object at offset {offset:x}: {why}")
            }
            DecodeError::DuplicateKey(offset) => {
                write!(fmt, "Dictionary at offset {offset:x} contains a duplicate key")
            }
            DecodeError::CyclicReference(index) => {
                write!(fmt, "Object {index} references itself")
            }
            DecodeError::DepthLimitExceeded(depth) => {
                write!(fmt, "Objects are nested deeper than {depth} levels")
            }
        }
    }
}

impl error::Error for DecodeError {}

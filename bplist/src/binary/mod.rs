/*!
 Contains logic and data structures used to read and write binary property list (`bplist00`) data.

 ## Overview

 A binary property list is a reference-indexed serialization of a small value algebra. A document is made of four sections:

 ```txt
 [8 bytes]  magic "bplist" + 2-byte version tag ("00")
 [object table: one marker byte per object, followed by its payload]
 [offset table: numObjects * offsetIntSize bytes]
 [32-byte trailer]
 ```

 Containers do not store their members inline; they store object indexes, which the offset table maps to
 the byte offset of each object. All multi-byte integers are big-endian.

 ## Features

 - Pure Rust implementation with no dependencies on Apple frameworks
 - Shared references decode to one shared [`Value`](crate::Value)
 - Robust error handling for malformed, truncated, or cyclic data

 ## Reference

 Format details follow [`CFBinaryPList.c`](https://opensource.apple.com/source/CF/CF-855.17/CFBinaryPList.c).
*/

pub mod options;
pub(crate) mod primitives;
pub mod reader;
pub mod trailer;
pub mod writer;
mod tests;

use std::io::Write;

use crate::{
    binary::{options::DecodeOptions, reader::BinaryPlistReader, writer::BinaryPlistWriter},
    error::decode::DecodeError,
    value::Value,
};

/// The bplist magic number
pub(crate) const MAGIC: &[u8; 6] = b"bplist";
/// Length of the magic number and version tag
pub(crate) const HEADER_SIZE: usize = 8;
/// The version tag written by [`encode`]
pub(crate) const VERSION: &[u8; 2] = b"00";

/// Type tag for `null`, booleans, and fill bytes
pub(crate) const TAG_SPECIAL: u8 = 0x0;
/// Type tag for integers; the size nibble is the base 2 log of the byte width
pub(crate) const TAG_INTEGER: u8 = 0x1;
/// Type tag for reals; the size nibble is the base 2 log of the byte width
pub(crate) const TAG_REAL: u8 = 0x2;
/// Type tag for dates, always followed by an 8-byte real
pub(crate) const TAG_DATE: u8 = 0x3;
/// Type tag for opaque bytes
pub(crate) const TAG_DATA: u8 = 0x4;
/// Type tag for strings stored one byte per character
pub(crate) const TAG_ASCII_STRING: u8 = 0x5;
/// Type tag for strings stored as big-endian UTF-16 code units
pub(crate) const TAG_UTF16_STRING: u8 = 0x6;
/// Type tag for UIDs; the size nibble is the byte width minus one
pub(crate) const TAG_UID: u8 = 0x8;
pub(crate) const TAG_ARRAY: u8 = 0xA;
pub(crate) const TAG_SET: u8 = 0xC;
pub(crate) const TAG_DICTIONARY: u8 = 0xD;

pub(crate) const MARKER_NULL: u8 = 0x00;
pub(crate) const MARKER_FALSE: u8 = 0x08;
pub(crate) const MARKER_TRUE: u8 = 0x09;
/// Padding; read as `null`
pub(crate) const MARKER_FILL: u8 = 0x0F;
/// Date marker, the only valid one for [`TAG_DATE`]
pub(crate) const MARKER_DATE: u8 = 0x33;
/// Size nibble indicating that the real count follows as an integer object
pub(crate) const EXTENDED_SIZE: u8 = 0x0F;

/// Decode a binary property list with the default [`DecodeOptions`]
///
/// # Example
///
/// ```
/// use bplist::{decode, encode_to_vec, Value};
///
/// let bytes = encode_to_vec(&Value::from("hello"));
/// assert_eq!(decode(&bytes).unwrap(), Value::from("hello"));
/// ```
pub fn decode(stream: &[u8]) -> Result<Value, DecodeError> {
    BinaryPlistReader::new(stream).parse()
}

/// Decode a binary property list with custom limits
pub fn decode_with_options(stream: &[u8], options: &DecodeOptions) -> Result<Value, DecodeError> {
    BinaryPlistReader::with_options(stream, options.clone()).parse()
}

/// Encode a [`Value`] tree as a binary property list into `sink`
///
/// The only possible errors are the ones returned by `sink`.
pub fn encode<W: Write>(value: &Value, sink: &mut W) -> std::io::Result<()> {
    BinaryPlistWriter::new(value).write(sink)
}

/// Encode a [`Value`] tree as a binary property list into a new buffer
pub fn encode_to_vec(value: &Value) -> Vec<u8> {
    BinaryPlistWriter::new(value).to_vec()
}

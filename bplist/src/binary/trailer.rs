/*!
 The fixed-size trailer and the offset table that precede it.
*/

use crate::{
    binary::{
        primitives::{push_be_uint, read_be_uint},
        HEADER_SIZE,
    },
    error::decode::DecodeError,
};

/// The number of bytes used by a trailer
pub const TRAILER_SIZE: usize = 32;
/// Unused bytes at the start of the trailer
const TRAILER_RESERVED: usize = 6;

/// Describes how to interpret the offset table and object references of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
    /// Bytes per offset table entry
    pub offset_int_size: u8,
    /// Bytes per object reference inside a container
    pub object_ref_size: u8,
    /// Number of objects in the object table
    pub num_objects: u64,
    /// Index of the root object
    pub top_object: u64,
    /// Absolute byte offset of the offset table
    pub offset_table_start: u64,
}

impl Trailer {
    /// Read and validate the trailer at the end of `stream`
    pub fn read(stream: &[u8]) -> Result<Self, DecodeError> {
        let minimum = HEADER_SIZE + TRAILER_SIZE;
        if stream.len() < minimum {
            return Err(DecodeError::UnexpectedEndOfData(minimum, stream.len()));
        }
        let trailer_start = stream.len() - TRAILER_SIZE;
        let bytes = &stream[trailer_start..];

        let trailer = Self {
            offset_int_size: bytes[TRAILER_RESERVED],
            object_ref_size: bytes[TRAILER_RESERVED + 1],
            num_objects: read_be_uint(&bytes[8..16]),
            top_object: read_be_uint(&bytes[16..24]),
            offset_table_start: read_be_uint(&bytes[24..32]),
        };
        trailer.validate(trailer_start)?;
        Ok(trailer)
    }

    fn validate(&self, trailer_start: usize) -> Result<(), DecodeError> {
        if !(1..=8).contains(&self.offset_int_size) {
            return Err(DecodeError::MalformedTrailer(
                "offset table entries must be 1 to 8 bytes",
            ));
        }
        if !(1..=8).contains(&self.object_ref_size) {
            return Err(DecodeError::MalformedTrailer(
                "object references must be 1 to 8 bytes",
            ));
        }
        if self.num_objects == 0 {
            return Err(DecodeError::MalformedTrailer("document contains no objects"));
        }
        if self.top_object >= self.num_objects {
            return Err(DecodeError::MalformedTrailer(
                "top object index is out of range",
            ));
        }
        if self.object_ref_size < 8 && (self.num_objects - 1) >> (8 * self.object_ref_size) != 0 {
            return Err(DecodeError::MalformedTrailer(
                "object references are too narrow to address every object",
            ));
        }
        if self.offset_table_start < HEADER_SIZE as u64 {
            return Err(DecodeError::MalformedTrailer(
                "offset table begins inside the header",
            ));
        }
        let table_end = self
            .num_objects
            .checked_mul(self.offset_int_size as u64)
            .and_then(|len| len.checked_add(self.offset_table_start))
            .ok_or(DecodeError::MalformedTrailer("offset table size overflows"))?;
        if table_end > trailer_start as u64 {
            return Err(DecodeError::MalformedTrailer(
                "offset table extends into the trailer",
            ));
        }
        Ok(())
    }

    /// Serialize the trailer
    pub fn to_bytes(&self) -> [u8; TRAILER_SIZE] {
        let mut out = Vec::with_capacity(TRAILER_SIZE);
        out.extend_from_slice(&[0; TRAILER_RESERVED]);
        out.push(self.offset_int_size);
        out.push(self.object_ref_size);
        push_be_uint(&mut out, self.num_objects, 8);
        push_be_uint(&mut out, self.top_object, 8);
        push_be_uint(&mut out, self.offset_table_start, 8);

        let mut bytes = [0; TRAILER_SIZE];
        bytes.copy_from_slice(&out);
        bytes
    }
}

/// Read the offset table described by `trailer`, checking that every entry points inside the object table
///
/// The trailer must already be validated against `stream`.
pub fn read_offset_table(stream: &[u8], trailer: &Trailer) -> Result<Vec<usize>, DecodeError> {
    let width = trailer.offset_int_size as usize;
    let start = trailer.offset_table_start as usize;
    let end = start + trailer.num_objects as usize * width;
    let table = stream
        .get(start..end)
        .ok_or(DecodeError::UnexpectedEndOfData(end, stream.len()))?;

    table
        .chunks_exact(width)
        .enumerate()
        .map(|(index, entry)| {
            let offset = read_be_uint(entry);
            if offset < HEADER_SIZE as u64 || offset >= trailer.offset_table_start {
                return Err(DecodeError::OffsetOutOfRange(index, offset));
            }
            Ok(offset as usize)
        })
        .collect()
}

/// Append an offset table using `width` bytes per entry
pub fn write_offset_table(out: &mut Vec<u8>, offsets: &[u64], width: u8) {
    offsets
        .iter()
        .for_each(|offset| push_be_uint(out, *offset, width));
}

#[cfg(test)]
mod tests {
    use crate::{
        binary::trailer::{read_offset_table, write_offset_table, Trailer, TRAILER_SIZE},
        error::decode::DecodeError,
    };

    /// Build a stream with a header, `body`, and a trailer
    fn document(body: &[u8], trailer: &Trailer) -> Vec<u8> {
        let mut stream = b"bplist00".to_vec();
        stream.extend_from_slice(body);
        stream.extend_from_slice(&trailer.to_bytes());
        stream
    }

    fn single_object() -> Trailer {
        Trailer {
            offset_int_size: 1,
            object_ref_size: 1,
            num_objects: 1,
            top_object: 0,
            offset_table_start: 9,
        }
    }

    #[test]
    fn can_write_trailer_layout() {
        let bytes = single_object().to_bytes();
        assert_eq!(bytes.len(), TRAILER_SIZE);
        assert_eq!(&bytes[..8], &[0, 0, 0, 0, 0, 0, 1, 1]);
        assert_eq!(bytes[15], 1);
        assert_eq!(bytes[23], 0);
        assert_eq!(bytes[31], 9);
    }

    #[test]
    fn can_read_valid_trailer() {
        let trailer = single_object();
        let stream = document(&[0x09, 0x08], &trailer);
        assert_eq!(Trailer::read(&stream), Ok(trailer));
        assert_eq!(read_offset_table(&stream, &trailer), Ok(vec![8]));
    }

    #[test]
    fn cant_read_short_stream() {
        assert_eq!(
            Trailer::read(b"bplist00"),
            Err(DecodeError::UnexpectedEndOfData(40, 8))
        );
    }

    #[test]
    fn cant_read_zero_widths() {
        let mut trailer = single_object();
        trailer.offset_int_size = 0;
        let stream = document(&[0x09, 0x08], &trailer);
        assert!(matches!(
            Trailer::read(&stream),
            Err(DecodeError::MalformedTrailer(_))
        ));

        let mut trailer = single_object();
        trailer.object_ref_size = 9;
        let stream = document(&[0x09, 0x08], &trailer);
        assert!(matches!(
            Trailer::read(&stream),
            Err(DecodeError::MalformedTrailer(_))
        ));
    }

    #[test]
    fn cant_read_top_object_out_of_range() {
        let mut trailer = single_object();
        trailer.top_object = 1;
        let stream = document(&[0x09, 0x08], &trailer);
        assert_eq!(
            Trailer::read(&stream),
            Err(DecodeError::MalformedTrailer(
                "top object index is out of range"
            ))
        );
    }

    #[test]
    fn cant_read_table_past_trailer() {
        let mut trailer = single_object();
        trailer.num_objects = u64::MAX;
        trailer.object_ref_size = 8;
        let stream = document(&[0x09, 0x08], &trailer);
        assert!(matches!(
            Trailer::read(&stream),
            Err(DecodeError::MalformedTrailer(_))
        ));

        let mut trailer = single_object();
        trailer.offset_table_start = 10;
        let stream = document(&[0x09, 0x08], &trailer);
        assert_eq!(
            Trailer::read(&stream),
            Err(DecodeError::MalformedTrailer(
                "offset table extends into the trailer"
            ))
        );
    }

    #[test]
    fn cant_read_narrow_references() {
        let mut trailer = single_object();
        trailer.num_objects = 257;
        trailer.offset_table_start = 8;
        let stream = document(&[0; 257], &trailer);
        assert_eq!(
            Trailer::read(&stream),
            Err(DecodeError::MalformedTrailer(
                "object references are too narrow to address every object"
            ))
        );
    }

    #[test]
    fn cant_read_offset_outside_object_table() {
        let trailer = single_object();
        let stream = document(&[0x09, 0x09], &trailer);
        assert_eq!(
            read_offset_table(&stream, &trailer),
            Err(DecodeError::OffsetOutOfRange(0, 9))
        );

        let stream = document(&[0x09, 0x02], &trailer);
        assert_eq!(
            read_offset_table(&stream, &trailer),
            Err(DecodeError::OffsetOutOfRange(0, 2))
        );
    }

    #[test]
    fn can_write_offset_table() {
        let mut out = vec![];
        write_offset_table(&mut out, &[8, 0x10B], 2);
        assert_eq!(out, vec![0x00, 0x08, 0x01, 0x0B]);
    }
}

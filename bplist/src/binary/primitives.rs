/*!
 Big-endian integer, real, and string codecs shared by the reader and the writer.
*/

use tracing::debug;

use crate::{
    binary::{
        EXTENDED_SIZE, MARKER_DATE, MARKER_FALSE, MARKER_NULL, MARKER_TRUE, TAG_ASCII_STRING,
        TAG_DATA, TAG_INTEGER, TAG_REAL, TAG_UID, TAG_UTF16_STRING,
    },
    value::{Integer, Real, Value},
};

/// Read up to 8 bytes as a big-endian unsigned integer
pub(crate) fn read_be_uint(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | *byte as u64)
}

/// Append the low `width` bytes of `value` in big-endian order
pub(crate) fn push_be_uint(out: &mut Vec<u8>, value: u64, width: u8) {
    let bytes = value.to_be_bytes();
    out.extend_from_slice(&bytes[8 - width as usize..]);
}

/// The smallest number of bytes, from 1 to 8, that can hold `value`
pub(crate) fn min_width(value: u64) -> u8 {
    let bits = 64 - value.leading_zeros() as u8;
    bits.div_ceil(8).max(1)
}

/// The smallest power of two byte width, from 1 to 8, that can hold `value`
pub(crate) fn min_power_width(value: u64) -> u8 {
    min_width(value).next_power_of_two()
}

/// Interpret an integer object payload of 1, 2, 4, 8, or 16 bytes
///
/// Widths below 8 bytes are unsigned, 8 bytes is signed. For 16 bytes only the low 64 bits are kept.
pub(crate) fn read_integer(bytes: &[u8]) -> Integer {
    match bytes.len() {
        8 => Integer::from(read_be_uint(bytes) as i64),
        16 => {
            let high = read_be_uint(&bytes[..8]);
            let low = read_be_uint(&bytes[8..]);
            if high == u64::MAX && (low as i64) < 0 {
                return Integer::from(low as i64);
            }
            if high != 0 {
                debug!(high, low, "Discarding high word of 128-bit integer");
            }
            Integer::from(low)
        }
        _ => Integer::from(read_be_uint(bytes)),
    }
}

/// Decode one byte per character, mapping each byte to the Latin-1 code point of the same value
pub(crate) fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| *byte as char).collect()
}

/// Decode big-endian UTF-16 code units, replacing unpaired surrogates with U+FFFD
pub(crate) fn decode_utf16_be(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Append an integer object using the narrowest width that holds the value
///
/// Negative values always take 8 bytes, since only that width is signed. Unsigned values
/// above [`i64::MAX`] take 16 bytes with a zero high word.
pub(crate) fn push_integer(out: &mut Vec<u8>, integer: Integer) {
    let bits = integer.bits();
    let (nibble, width) = match bits {
        _ if integer.is_negative() => (3, 8),
        0..=0xFF => (0, 1),
        0x100..=0xFFFF => (1, 2),
        0x1_0000..=0xFFFF_FFFF => (2, 4),
        _ if bits <= i64::MAX as u64 => (3, 8),
        _ => (4, 16),
    };
    out.push(TAG_INTEGER << 4 | nibble);
    if width == 16 {
        push_be_uint(out, 0, 8);
        push_be_uint(out, bits, 8);
    } else {
        push_be_uint(out, bits, width);
    }
}

/// Append a marker byte for `tag`, storing `count` in the size nibble or as a trailing integer object
pub(crate) fn push_marker(out: &mut Vec<u8>, tag: u8, count: usize) {
    if count < EXTENDED_SIZE as usize {
        out.push(tag << 4 | count as u8);
    } else {
        out.push(tag << 4 | EXTENDED_SIZE);
        push_integer(out, Integer::from(count));
    }
}

/// Append a string object: one byte per character when every character is ASCII, UTF-16 otherwise
pub(crate) fn push_string(out: &mut Vec<u8>, string: &str) {
    if string.is_ascii() {
        push_marker(out, TAG_ASCII_STRING, string.len());
        out.extend_from_slice(string.as_bytes());
    } else {
        let units: Vec<u16> = string.encode_utf16().collect();
        push_marker(out, TAG_UTF16_STRING, units.len());
        units
            .iter()
            .for_each(|unit| out.extend_from_slice(&unit.to_be_bytes()));
    }
}

/// The complete object encoding of a scalar, or [`None`] for containers
///
/// Two scalars encode identically exactly when they have the same type and content, so the
/// encoding doubles as the identity used to collapse duplicate objects.
pub(crate) fn encode_scalar(value: &Value) -> Option<Vec<u8>> {
    let mut out = vec![];
    match value {
        Value::Null => out.push(MARKER_NULL),
        Value::Boolean(false) => out.push(MARKER_FALSE),
        Value::Boolean(true) => out.push(MARKER_TRUE),
        Value::Integer(integer) => push_integer(&mut out, *integer),
        Value::Real(Real::Single(real)) => {
            out.push(TAG_REAL << 4 | 2);
            out.extend_from_slice(&real.to_be_bytes());
        }
        Value::Real(Real::Double(real)) => {
            out.push(TAG_REAL << 4 | 3);
            out.extend_from_slice(&real.to_be_bytes());
        }
        Value::Date(date) => {
            out.push(MARKER_DATE);
            out.extend_from_slice(&date.seconds_since_reference().to_be_bytes());
        }
        Value::Data(data) => {
            push_marker(&mut out, TAG_DATA, data.len());
            out.extend_from_slice(data);
        }
        Value::String(string) => push_string(&mut out, string),
        Value::Uid(uid) => {
            let width = min_power_width(uid.get());
            out.push(TAG_UID << 4 | (width - 1));
            push_be_uint(&mut out, uid.get(), width);
        }
        Value::Array(_) | Value::Set(_) | Value::Dictionary(_) => return None,
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use crate::{
        binary::primitives::{
            decode_latin1, decode_utf16_be, encode_scalar, min_power_width, min_width,
            push_be_uint, push_marker, read_be_uint, read_integer,
        },
        value::{Integer, Uid, Value},
    };

    #[test]
    fn can_pick_min_width() {
        assert_eq!(min_width(0), 1);
        assert_eq!(min_width(0xFF), 1);
        assert_eq!(min_width(0x100), 2);
        assert_eq!(min_width(0xFF_FFFF), 3);
        assert_eq!(min_width(u64::MAX), 8);
    }

    #[test]
    fn can_pick_min_power_width() {
        assert_eq!(min_power_width(0xFF), 1);
        assert_eq!(min_power_width(0x1_0000), 4);
        assert_eq!(min_power_width(0x1_0000_0000), 8);
    }

    #[test]
    fn can_read_and_push_be_uint() {
        let mut out = vec![];
        push_be_uint(&mut out, 0x0102_0304, 3);
        assert_eq!(out, vec![0x02, 0x03, 0x04]);
        assert_eq!(read_be_uint(&out), 0x02_0304);
    }

    #[test]
    fn can_read_narrow_integers_as_unsigned() {
        assert_eq!(read_integer(&[0xFF]), Integer::from(255u8));
        assert_eq!(read_integer(&[0xFF, 0xFF]), Integer::from(65535u16));
        assert_eq!(read_integer(&[0xFF, 0xFF, 0xFF, 0xFF]), Integer::from(u32::MAX));
    }

    #[test]
    fn can_read_eight_byte_integer_as_signed() {
        assert_eq!(read_integer(&[0xFF; 8]), Integer::from(-1i64));
    }

    #[test]
    fn can_read_sixteen_byte_integer() {
        let mut negative = vec![0xFF; 16];
        negative[15] = 0xFE;
        assert_eq!(read_integer(&negative), Integer::from(-2i64));

        let mut unsigned = vec![0; 8];
        unsigned.extend_from_slice(&[0xFF; 8]);
        assert_eq!(read_integer(&unsigned), Integer::from(u64::MAX));
    }

    #[test]
    fn can_decode_latin1() {
        assert_eq!(decode_latin1(&[0x68, 0xE9]), "hé");
    }

    #[test]
    fn can_decode_utf16_permissively() {
        assert_eq!(decode_utf16_be(&[0x00, 0x68, 0x00, 0xE9]), "hé");
        assert_eq!(decode_utf16_be(&[0xD8, 0x3D, 0xDE, 0x00]), "\u{1F600}");
        assert_eq!(decode_utf16_be(&[0xD8, 0x3D, 0x00, 0x68]), "\u{FFFD}h");
    }

    #[test]
    fn can_push_extended_marker() {
        let mut out = vec![];
        push_marker(&mut out, 0xA, 14);
        push_marker(&mut out, 0xA, 15);
        push_marker(&mut out, 0xA, 300);
        assert_eq!(out, vec![0xAE, 0xAF, 0x10, 0x0F, 0xAF, 0x11, 0x01, 0x2C]);
    }

    #[test]
    fn can_encode_minimal_integers() {
        assert_eq!(encode_scalar(&Value::from(255)), Some(vec![0x10, 0xFF]));
        assert_eq!(encode_scalar(&Value::from(256)), Some(vec![0x11, 0x01, 0x00]));
        assert_eq!(
            encode_scalar(&Value::from(-1)),
            Some(vec![0x13, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF])
        );
        assert_eq!(
            encode_scalar(&Value::from(u64::MAX)).map(|bytes| bytes.len()),
            Some(17)
        );
    }

    #[test]
    fn can_encode_ascii_and_utf16_strings() {
        assert_eq!(encode_scalar(&Value::from("hi")), Some(vec![0x52, 0x68, 0x69]));
        assert_eq!(
            encode_scalar(&Value::from("\u{80}")),
            Some(vec![0x61, 0x00, 0x80])
        );
    }

    #[test]
    fn can_encode_uid_distinct_from_integer() {
        assert_eq!(encode_scalar(&Value::Uid(Uid::new(1))), Some(vec![0x80, 0x01]));
        assert_eq!(
            encode_scalar(&Value::Uid(Uid::new(0x1_0000))),
            Some(vec![0x83, 0x00, 0x01, 0x00, 0x00])
        );
    }

    #[test]
    fn cant_encode_containers_as_scalars() {
        assert!(encode_scalar(&Value::array(vec![])).is_none());
    }
}

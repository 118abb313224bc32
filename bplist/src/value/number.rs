/*!
 Numeric containers stored in a property list.
*/

use std::fmt::{Display, Formatter, Result};

/// An integer stored in a property list
///
/// The format stores integers of up to 64 bits of precision. The value is kept as its 64-bit
/// two's complement bit pattern and a flag telling whether that pattern should be read as a
/// negative [`i64`]. Non-negative values are always stored unsigned, so two [`Integer`]s are
/// equal exactly when their numeric values are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Integer {
    bits: u64,
    negative: bool,
}

impl Integer {
    /// The value as an [`i64`], if it fits
    pub fn as_signed(&self) -> Option<i64> {
        if self.negative {
            return Some(self.bits as i64);
        }
        i64::try_from(self.bits).ok()
    }

    /// The value as a [`u64`], if it is not negative
    pub fn as_unsigned(&self) -> Option<u64> {
        if self.negative {
            return None;
        }
        Some(self.bits)
    }

    /// Whether the value is below zero
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// The raw 64-bit two's complement pattern of the value
    pub(crate) fn bits(&self) -> u64 {
        self.bits
    }
}

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        Self {
            bits: value,
            negative: false,
        }
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Self {
            bits: value as u64,
            negative: value < 0,
        }
    }
}

macro_rules! integer_from_unsigned {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Integer {
            fn from(value: $ty) -> Self {
                Integer::from(value as u64)
            }
        })*
    };
}

macro_rules! integer_from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Integer {
            fn from(value: $ty) -> Self {
                Integer::from(value as i64)
            }
        })*
    };
}

integer_from_unsigned!(u8, u16, u32, usize);
integer_from_signed!(i8, i16, i32, isize);

impl Display for Integer {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        if self.negative {
            write!(fmt, "{}", self.bits as i64)
        } else {
            write!(fmt, "{}", self.bits)
        }
    }
}

/// A floating point number, tagged with the precision it was stored at
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Real {
    /// A 4-byte [`f32`]
    Single(f32),
    /// An 8-byte [`f64`]
    Double(f64),
}

impl Real {
    /// The value widened to an [`f64`]
    pub fn as_f64(&self) -> f64 {
        match self {
            Real::Single(value) => *value as f64,
            Real::Double(value) => *value,
        }
    }
}

impl From<f32> for Real {
    fn from(value: f32) -> Self {
        Self::Single(value)
    }
}

impl From<f64> for Real {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

/// An opaque identifier, used by `NSKeyedArchiver` to reference entries in its `$objects` array
///
/// A [`Uid`] is never equal to an [`Integer`] with the same numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uid(u64);

impl Uid {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl Display for Uid {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        write!(fmt, "UID({})", self.0)
    }
}

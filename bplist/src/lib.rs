#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub mod binary;
pub mod error;
pub mod value;

pub use binary::{decode, decode_with_options, encode, encode_to_vec, options::DecodeOptions};
pub use error::decode::DecodeError;
pub use value::{Date, Dictionary, Integer, Real, Uid, Value};

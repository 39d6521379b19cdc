//! Codec Module
//!
//! Byte encodings for every supported value type.
//!
//! ## Primitive Encodings
//! ```text
//! uuid        16 bytes
//! utf8        UTF-8 bytes
//! int64..int8 fixed width, two's complement, big-endian
//! float32/64  IEEE-754, big-endian
//! bigint      minimal two's complement, big-endian
//! bool        1 byte (0x01 / 0x00)
//! bytes       identity
//! timestamp   int64 milliseconds since epoch
//! ```
//!
//! ## Composite Encoding
//! ```text
//! ┌──────────┬─────────────┬─────────┐
//! │ Len (2)  │  Component  │ EOC (1) │  ... repeated in ordinal order
//! └──────────┴─────────────┴─────────┘
//! ```
//! The end-of-component byte is 0x00 in stored names. The last component of
//! a range end bound carries 0x01 so the bound sorts after every stored name
//! that shares its prefix.

mod primitive;
mod composite;
mod opaque;

use std::cmp::Ordering;
use std::fmt;

use bytes::Bytes;

use crate::error::Result;
use crate::types::{Value, ValueType};

pub use primitive::PrimitiveCodec;
pub use composite::{CompositeCodec, EndOfComponent};
pub use opaque::OpaqueCodec;

/// Paired encode/decode functions for one value type
pub trait Codec: Send + Sync + fmt::Debug {
    /// The type this codec serves
    fn value_type(&self) -> &ValueType;

    /// Encode a value of this codec's type
    fn encode(&self, value: &Value) -> Result<Bytes>;

    /// Decode bytes produced by [`Codec::encode`]
    fn decode(&self, bytes: &[u8]) -> Result<Value>;

    /// Order two encoded values the way the store compares them
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }

    /// Downcast for the range builder
    fn as_composite(&self) -> Option<&CompositeCodec> {
        None
    }

    fn is_composite(&self) -> bool {
        self.as_composite().is_some()
    }
}

//! Runtime values

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EncodingError, Result};

use super::{CompositeValue, ValueType};

/// A row key, column name or column value
#[derive(Debug, Clone)]
pub enum Value {
    Uuid(Uuid),
    Text(String),
    Int64(i64),
    Int32(i32),
    Int16(i16),
    Int8(i8),
    Float32(f32),
    Float64(f64),
    BigInteger(BigInt),
    Boolean(bool),
    Bytes(Vec<u8>),
    Buffer(Bytes),
    Timestamp(DateTime<Utc>),
    Composite(CompositeValue),
    Opaque(OpaqueValue),
}

impl Value {
    /// Runtime type tag of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Uuid(_) => ValueType::Uuid,
            Value::Text(_) => ValueType::Utf8,
            Value::Int64(_) => ValueType::Int64,
            Value::Int32(_) => ValueType::Int32,
            Value::Int16(_) => ValueType::Int16,
            Value::Int8(_) => ValueType::Int8,
            Value::Float32(_) => ValueType::Float32,
            Value::Float64(_) => ValueType::Float64,
            Value::BigInteger(_) => ValueType::BigInteger,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Bytes(_) => ValueType::Bytes,
            Value::Buffer(_) => ValueType::ByteBuffer,
            Value::Timestamp(_) => ValueType::Timestamp,
            Value::Composite(c) => ValueType::Named(c.type_name().to_string()),
            Value::Opaque(o) => ValueType::Named(o.type_name.clone()),
        }
    }

    /// Timestamp from milliseconds since the epoch
    pub fn timestamp_millis(millis: i64) -> Option<Value> {
        DateTime::from_timestamp_millis(millis).map(Value::Timestamp)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Widen any fixed-width integer to i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int16(v) => Some(i64::from(*v)),
            Value::Int8(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeValue> {
        match self {
            Value::Composite(c) => Some(c),
            _ => None,
        }
    }

    /// Position of the variant, used to order values of different types
    fn rank(&self) -> u8 {
        match self {
            Value::Uuid(_) => 0,
            Value::Text(_) => 1,
            Value::Int64(_) => 2,
            Value::Int32(_) => 3,
            Value::Int16(_) => 4,
            Value::Int8(_) => 5,
            Value::Float32(_) => 6,
            Value::Float64(_) => 7,
            Value::BigInteger(_) => 8,
            Value::Boolean(_) => 9,
            Value::Bytes(_) => 10,
            Value::Buffer(_) => 11,
            Value::Timestamp(_) => 12,
            Value::Composite(_) => 13,
            Value::Opaque(_) => 14,
        }
    }
}

// =============================================================================
// Ordering / Equality / Hashing
// =============================================================================

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Uuid(a), Value::Uuid(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Int64(a), Value::Int64(b)) => a.cmp(b),
            (Value::Int32(a), Value::Int32(b)) => a.cmp(b),
            (Value::Int16(a), Value::Int16(b)) => a.cmp(b),
            (Value::Int8(a), Value::Int8(b)) => a.cmp(b),
            (Value::Float32(a), Value::Float32(b)) => a.total_cmp(b),
            (Value::Float64(a), Value::Float64(b)) => a.total_cmp(b),
            (Value::BigInteger(a), Value::BigInteger(b)) => a.cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            (Value::Buffer(a), Value::Buffer(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Composite(a), Value::Composite(b)) => a.cmp(b),
            (Value::Opaque(a), Value::Opaque(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Uuid(v) => v.hash(state),
            Value::Text(v) => v.hash(state),
            Value::Int64(v) => v.hash(state),
            Value::Int32(v) => v.hash(state),
            Value::Int16(v) => v.hash(state),
            Value::Int8(v) => v.hash(state),
            Value::Float32(v) => v.to_bits().hash(state),
            Value::Float64(v) => v.to_bits().hash(state),
            Value::BigInteger(v) => v.hash(state),
            Value::Boolean(v) => v.hash(state),
            Value::Bytes(v) => v.hash(state),
            Value::Buffer(v) => v.hash(state),
            Value::Timestamp(v) => v.hash(state),
            Value::Composite(v) => v.hash(state),
            Value::Opaque(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Uuid(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{:?}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int8(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::BigInteger(v) => write!(f, "{}", v),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Buffer(v) => write!(f, "<{} bytes>", v.len()),
            Value::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Composite(v) => write!(f, "{}", v),
            Value::Opaque(v) => write!(f, "<{}: {} bytes>", v.type_name, v.payload.len()),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    Uuid => Uuid,
    String => Text,
    i64 => Int64,
    i32 => Int32,
    i16 => Int16,
    i8 => Int8,
    f32 => Float32,
    f64 => Float64,
    BigInt => BigInteger,
    bool => Boolean,
    Vec<u8> => Bytes,
    Bytes => Buffer,
    DateTime<Utc> => Timestamp,
    CompositeValue => Composite,
    OpaqueValue => Opaque,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

// =============================================================================
// Opaque Values
// =============================================================================

/// A value of a type with no store-native encoding.
///
/// The payload is the bincode form of some serde type. It is only readable
/// by a process that knows that type, so opaque columns do not travel well
/// between systems.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OpaqueValue {
    pub type_name: String,
    pub payload: Vec<u8>,
}

impl OpaqueValue {
    /// Serialize `value` under the declared type name
    pub fn encode<T: Serialize>(type_name: impl Into<String>, value: &T) -> Result<Self> {
        let payload =
            bincode::serialize(value).map_err(|e| EncodingError::Opaque(e.to_string()))?;
        Ok(Self {
            type_name: type_name.into(),
            payload,
        })
    }

    /// Deserialize the payload back into `T`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        bincode::deserialize(&self.payload)
            .map_err(|e| EncodingError::Opaque(e.to_string()).into())
    }
}

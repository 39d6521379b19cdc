//! Codecs for store-native primitive types

use std::cmp::Ordering;

use bytes::Bytes;
use chrono::DateTime;
use num_bigint::BigInt;
use uuid::Uuid;

use crate::error::{EncodingError, Result, UsageError};
use crate::types::{Value, ValueType};

use super::Codec;

/// Codec for one primitive [`ValueType`]
#[derive(Debug, Clone)]
pub struct PrimitiveCodec {
    value_type: ValueType,
}

impl PrimitiveCodec {
    /// Returns `None` for [`ValueType::Named`]
    pub fn new(value_type: ValueType) -> Option<Self> {
        if value_type.is_primitive() {
            Some(Self { value_type })
        } else {
            None
        }
    }

    fn mismatch(&self, value: &Value) -> UsageError {
        UsageError::TypeMismatch {
            expected: self.value_type.to_string(),
            actual: value.value_type().to_string(),
        }
    }

    fn malformed(&self, reason: impl Into<String>) -> EncodingError {
        EncodingError::malformed(self.value_type.name(), reason)
    }

    fn fixed<const N: usize>(&self, bytes: &[u8]) -> Result<[u8; N]> {
        bytes.try_into().map_err(|_| {
            self.malformed(format!("expected {} bytes, got {}", N, bytes.len()))
                .into()
        })
    }
}

impl Codec for PrimitiveCodec {
    fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    fn encode(&self, value: &Value) -> Result<Bytes> {
        let bytes = match (&self.value_type, value) {
            (ValueType::Uuid, Value::Uuid(v)) => Bytes::copy_from_slice(v.as_bytes()),
            (ValueType::Utf8, Value::Text(v)) => Bytes::copy_from_slice(v.as_bytes()),
            (ValueType::Int64, Value::Int64(v)) => Bytes::copy_from_slice(&v.to_be_bytes()),
            (ValueType::Int32, Value::Int32(v)) => Bytes::copy_from_slice(&v.to_be_bytes()),
            (ValueType::Int16, Value::Int16(v)) => Bytes::copy_from_slice(&v.to_be_bytes()),
            (ValueType::Int8, Value::Int8(v)) => Bytes::copy_from_slice(&v.to_be_bytes()),
            (ValueType::Float32, Value::Float32(v)) => Bytes::copy_from_slice(&v.to_be_bytes()),
            (ValueType::Float64, Value::Float64(v)) => Bytes::copy_from_slice(&v.to_be_bytes()),
            (ValueType::BigInteger, Value::BigInteger(v)) => Bytes::from(v.to_signed_bytes_be()),
            (ValueType::Boolean, Value::Boolean(v)) => Bytes::copy_from_slice(&[u8::from(*v)]),
            (ValueType::Bytes, Value::Bytes(v)) => Bytes::copy_from_slice(v),
            (ValueType::ByteBuffer, Value::Buffer(v)) => v.clone(),
            (ValueType::Timestamp, Value::Timestamp(v)) => {
                Bytes::copy_from_slice(&v.timestamp_millis().to_be_bytes())
            }
            _ => return Err(self.mismatch(value).into()),
        };
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        let value = match &self.value_type {
            ValueType::Uuid => Value::Uuid(Uuid::from_bytes(self.fixed::<16>(bytes)?)),
            ValueType::Utf8 => {
                let text = std::str::from_utf8(bytes).map_err(|e| self.malformed(e.to_string()))?;
                Value::Text(text.to_string())
            }
            ValueType::Int64 => Value::Int64(i64::from_be_bytes(self.fixed(bytes)?)),
            ValueType::Int32 => Value::Int32(i32::from_be_bytes(self.fixed(bytes)?)),
            ValueType::Int16 => Value::Int16(i16::from_be_bytes(self.fixed(bytes)?)),
            ValueType::Int8 => Value::Int8(i8::from_be_bytes(self.fixed(bytes)?)),
            ValueType::Float32 => Value::Float32(f32::from_be_bytes(self.fixed(bytes)?)),
            ValueType::Float64 => Value::Float64(f64::from_be_bytes(self.fixed(bytes)?)),
            ValueType::BigInteger => {
                if bytes.is_empty() {
                    return Err(self.malformed("empty integer").into());
                }
                Value::BigInteger(BigInt::from_signed_bytes_be(bytes))
            }
            ValueType::Boolean => {
                let [b] = self.fixed::<1>(bytes)?;
                Value::Boolean(b == 1)
            }
            ValueType::Bytes => Value::Bytes(bytes.to_vec()),
            ValueType::ByteBuffer => Value::Buffer(Bytes::copy_from_slice(bytes)),
            ValueType::Timestamp => {
                let millis = i64::from_be_bytes(self.fixed(bytes)?);
                let ts = DateTime::from_timestamp_millis(millis)
                    .ok_or_else(|| self.malformed(format!("{} ms out of range", millis)))?;
                Value::Timestamp(ts)
            }
            ValueType::Named(name) => {
                return Err(EncodingError::UnknownType(name.clone()).into());
            }
        };
        Ok(value)
    }

    /// Signed numeric types compare by value; the rest compare as bytes
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        match self.value_type {
            ValueType::Int64
            | ValueType::Int32
            | ValueType::Int16
            | ValueType::Int8
            | ValueType::Float32
            | ValueType::Float64
            | ValueType::BigInteger
            | ValueType::Timestamp => match (self.decode(a), self.decode(b)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => a.cmp(b),
            },
            _ => a.cmp(b),
        }
    }
}

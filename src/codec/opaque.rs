//! Codec for opaque serde types

use bytes::Bytes;

use crate::error::{EncodingError, Result, UsageError};
use crate::types::{OpaqueValue, Value, ValueType};

use super::Codec;

/// Writes an [`OpaqueValue`] as a bincode envelope (type name + payload).
///
/// Only a reader that knows the payload's serde type can make sense of the
/// column, so this codec is used solely for types explicitly declared opaque.
#[derive(Debug, Clone)]
pub struct OpaqueCodec {
    value_type: ValueType,
}

impl OpaqueCodec {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            value_type: ValueType::Named(type_name.into()),
        }
    }

    fn type_name(&self) -> &str {
        self.value_type.name()
    }
}

impl Codec for OpaqueCodec {
    fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    fn encode(&self, value: &Value) -> Result<Bytes> {
        match value {
            Value::Opaque(opaque) if opaque.type_name == self.type_name() => {
                let bytes = bincode::serialize(opaque)
                    .map_err(|e| EncodingError::Opaque(e.to_string()))?;
                Ok(Bytes::from(bytes))
            }
            other => Err(UsageError::TypeMismatch {
                expected: self.value_type.to_string(),
                actual: other.value_type().to_string(),
            }
            .into()),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        let opaque: OpaqueValue =
            bincode::deserialize(bytes).map_err(|e| EncodingError::Opaque(e.to_string()))?;
        if opaque.type_name != self.type_name() {
            return Err(EncodingError::malformed(
                self.type_name(),
                format!("envelope holds a '{}'", opaque.type_name),
            )
            .into());
        }
        Ok(Value::Opaque(opaque))
    }
}

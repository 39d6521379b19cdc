//! Value type tags

use std::fmt;

/// Declared type of a row key, column name or column value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueType {
    Uuid,
    Utf8,
    Int64,
    Int32,
    Int16,
    Int8,
    Float32,
    Float64,
    BigInteger,
    Boolean,
    /// Owned byte sequence
    Bytes,
    /// Shared, reference-counted byte buffer
    ByteBuffer,
    /// Milliseconds since the Unix epoch
    Timestamp,
    /// Composite or opaque type declared with the registry
    Named(String),
}

impl ValueType {
    /// All primitive tags, in registry order
    pub const PRIMITIVES: [ValueType; 13] = [
        ValueType::Uuid,
        ValueType::Utf8,
        ValueType::Int64,
        ValueType::Int32,
        ValueType::Int16,
        ValueType::Int8,
        ValueType::Float32,
        ValueType::Float64,
        ValueType::BigInteger,
        ValueType::Boolean,
        ValueType::Bytes,
        ValueType::ByteBuffer,
        ValueType::Timestamp,
    ];

    /// Shorthand for a named (composite or opaque) type
    pub fn named(name: impl Into<String>) -> Self {
        ValueType::Named(name.into())
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, ValueType::Named(_))
    }

    /// Canonical short name, also accepted by [`ValueType::parse`]
    pub fn name(&self) -> &str {
        match self {
            ValueType::Uuid => "uuid",
            ValueType::Utf8 => "utf8",
            ValueType::Int64 => "int64",
            ValueType::Int32 => "int32",
            ValueType::Int16 => "int16",
            ValueType::Int8 => "int8",
            ValueType::Float32 => "float32",
            ValueType::Float64 => "float64",
            ValueType::BigInteger => "bigint",
            ValueType::Boolean => "bool",
            ValueType::Bytes => "bytes",
            ValueType::ByteBuffer => "buffer",
            ValueType::Timestamp => "timestamp",
            ValueType::Named(name) => name,
        }
    }

    /// Parse a type name. Unrecognized names become [`ValueType::Named`].
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "uuid" => ValueType::Uuid,
            "utf8" | "text" | "string" => ValueType::Utf8,
            "int64" | "long" | "i64" => ValueType::Int64,
            "int32" | "int" | "i32" => ValueType::Int32,
            "int16" | "short" | "i16" => ValueType::Int16,
            "int8" | "byte" | "i8" => ValueType::Int8,
            "float32" | "float" | "f32" => ValueType::Float32,
            "float64" | "double" | "f64" => ValueType::Float64,
            "bigint" | "biginteger" | "varint" => ValueType::BigInteger,
            "bool" | "boolean" => ValueType::Boolean,
            "bytes" | "blob" => ValueType::Bytes,
            "buffer" | "bytebuffer" => ValueType::ByteBuffer,
            "timestamp" | "date" => ValueType::Timestamp,
            _ => ValueType::Named(raw.trim().to_string()),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

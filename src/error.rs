//! Error types for widebridge
//!
//! Three kinds abort an operation: usage errors detected locally before any
//! store call, encoding errors raised by codecs and schemas, and store errors
//! passed through from the store client unchanged.

use thiserror::Error;

/// Result type alias using BridgeError
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Unified error type for widebridge operations
#[derive(Debug, Error)]
pub enum BridgeError {
    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("Usage error: {0}")]
    Usage(#[from] UsageError),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Connection failed: {0}")]
    Connect(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Caller mistakes, surfaced before the store is contacted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("range lookup requires both a start and an end column")]
    MissingBoundary,

    #[error("row key is null")]
    NullKey,

    #[error("record has no field named '{0}'")]
    MissingField(String),

    #[error("expected a value of type {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },
}

/// Failures mapping a type to a codec or converting bytes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("no codec registered for type '{0}'")]
    UnknownType(String),

    #[error("composite type '{0}' declares no component fields")]
    NoComponents(String),

    #[error("composite type '{type_name}' declares ordinal {ordinal} more than once")]
    DuplicateOrdinal { type_name: String, ordinal: u32 },

    #[error("malformed {type_name} value: {reason}")]
    Malformed { type_name: String, reason: String },

    #[error("opaque serialization failed: {0}")]
    Opaque(String),
}

impl EncodingError {
    pub(crate) fn malformed(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        EncodingError::Malformed {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}

/// Failures reported by the store client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no host available: {0}")]
    Unavailable(String),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("schema mismatch: {0}")]
    Schema(String),

    #[error("{0}")]
    Other(String),
}

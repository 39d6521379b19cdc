//! # widebridge
//!
//! Persist and query stream-pipeline records in a wide-column store:
//! - Codec selection from explicit value type tags
//! - Scalar and multi-field composite row keys / column names
//! - Ordinal-ordered prefix and range queries over composite column names
//! - Batched writes, deletes and counter increments
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Record + RecordMapper                        │
//! │           (column family, row key, columns)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Client                                 │
//! │        (lookups, batched writes, counter increments)         │
//! └──────┬──────────────────────┬──────────────────────┬────────┘
//!        │                      │                      │
//!        ▼                      ▼                      ▼
//! ┌─────────────┐       ┌──────────────┐       ┌─────────────┐
//! │  Registry   │──────▶│ Range Builder│       │ StoreClient │
//! │  (codecs)   │       │(prefix/bound)│       │ (external)  │
//! └──────┬──────┘       └──────────────┘       └─────────────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   Schema    │
//! │ (ordinals)  │
//! └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod types;
pub mod codec;
pub mod schema;
pub mod registry;
pub mod range;
pub mod mapping;
pub mod store;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BridgeError, EncodingError, Result, StoreError, UsageError};
pub use config::Config;
pub use client::Client;
pub use registry::SerializerRegistry;
pub use range::{build_range, BoundaryMode, RangeSpec};
pub use types::{ColumnMap, CompositeValue, Value, ValueType};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of widebridge
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

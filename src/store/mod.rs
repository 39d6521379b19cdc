//! Store Module
//!
//! The contract this crate needs from a wide-column store client, and an
//! in-process implementation of it.
//!
//! ## Responsibilities of a store client
//! - Verify the keyspace at connect time
//! - Whole-row reads and column slice reads, by encoded row key
//! - Atomic execution of a [`MutationBatch`]
//! - Connection pooling, timeouts and retries (none of which happen here)
//!
//! Every call is addressed by a [`ColumnFamily`] descriptor carrying the
//! row-key and column-name codecs, so a client can compare encoded column
//! names the way the store does.

mod batch;
mod memory;

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::codec::Codec;
use crate::error::StoreError;
use crate::range::ByteRange;

pub use batch::{Mutation, MutationBatch};
pub use memory::{MemoryStore, StoreStats};

/// Result type for store client calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A column family and the codecs of its row keys and column names
#[derive(Clone)]
pub struct ColumnFamily {
    name: String,
    key_codec: Arc<dyn Codec>,
    column_codec: Arc<dyn Codec>,
}

impl ColumnFamily {
    pub fn new(name: impl Into<String>, key_codec: Arc<dyn Codec>, column_codec: Arc<dyn Codec>) -> Self {
        Self {
            name: name.into(),
            key_codec,
            column_codec,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_codec(&self) -> &Arc<dyn Codec> {
        &self.key_codec
    }

    /// Codec (and comparator) of column names
    pub fn column_codec(&self) -> &Arc<dyn Codec> {
        &self.column_codec
    }
}

impl fmt::Debug for ColumnFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnFamily")
            .field("name", &self.name)
            .field("key_type", self.key_codec.value_type())
            .field("column_type", self.column_codec.value_type())
            .finish()
    }
}

/// An encoded column as returned by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumn {
    pub name: Bytes,
    pub value: Bytes,
}

/// Wide-column store client
pub trait StoreClient: Send + Sync {
    /// Fails when the keyspace is unknown or no host answers
    fn describe_keyspace(&self, keyspace: &str) -> StoreResult<()>;

    /// Every column of a row, in column-name order
    fn get_row(&self, family: &ColumnFamily, row_key: &[u8]) -> StoreResult<Vec<RawColumn>>;

    /// Columns of a row whose names fall inside `range`, in column-name order
    fn get_range(&self, family: &ColumnFamily, row_key: &[u8], range: &ByteRange) -> StoreResult<Vec<RawColumn>>;

    /// Current value of a counter column
    fn get_counter(&self, family: &ColumnFamily, row_key: &[u8], column: &[u8]) -> StoreResult<Option<i64>>;

    /// Apply every mutation of the batch as one unit
    fn execute_batch(&self, batch: MutationBatch) -> StoreResult<()>;

    /// Release connections
    fn shutdown(&self) {}
}

//! In-process store client
//!
//! Keeps rows in memory, ordered by each column family's column-name
//! comparator. Supports failure injection so callers can exercise error
//! paths without a cluster.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::error::StoreError;
use crate::range::ByteRange;

use super::{ColumnFamily, Mutation, MutationBatch, RawColumn, StoreClient, StoreResult};

/// Rows of one column family: row key → columns sorted by name
type Rows = HashMap<Bytes, Vec<RawColumn>>;

/// (column family, row key, column) → counter value
type Counters = HashMap<(String, Bytes, Bytes), i64>;

/// Call counts observed by a [`MemoryStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStats {
    pub reads: u64,
    pub batches: u64,
}

/// Store client backed by process memory
pub struct MemoryStore {
    keyspace: String,

    /// Column family name → rows
    families: RwLock<HashMap<String, Rows>>,

    counters: RwLock<Counters>,

    /// Error returned by the next call, consumed once
    fail_next: Mutex<Option<StoreError>>,

    reads: AtomicU64,
    batches: AtomicU64,
    shut_down: AtomicBool,
}

impl MemoryStore {
    /// Empty store serving a single keyspace
    pub fn new(keyspace: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            families: RwLock::new(HashMap::new()),
            counters: RwLock::new(HashMap::new()),
            fail_next: Mutex::new(None),
            reads: AtomicU64::new(0),
            batches: AtomicU64::new(0),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Make the next call fail with `error`
    pub fn fail_next(&self, error: StoreError) {
        *self.fail_next.lock() = Some(error);
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            reads: self.reads.load(Ordering::SeqCst),
            batches: self.batches.load(Ordering::SeqCst),
        }
    }

    /// Number of stored columns in a row
    pub fn column_count(&self, family: &str, row_key: &[u8]) -> usize {
        self.families
            .read()
            .get(family)
            .and_then(|rows| rows.get(row_key))
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn check(&self) -> StoreResult<()> {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store client is shut down".to_string()));
        }
        match self.fail_next.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn read_row<F>(&self, family: &ColumnFamily, row_key: &[u8], keep: F) -> StoreResult<Vec<RawColumn>>
    where
        F: Fn(&RawColumn) -> bool,
    {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let families = self.families.read();
        let columns: Vec<RawColumn> = families
            .get(family.name())
            .and_then(|rows| rows.get(row_key))
            .map(|columns| columns.iter().filter(|c| keep(*c)).cloned().collect())
            .unwrap_or_default();
        Ok(columns)
    }
}

impl StoreClient for MemoryStore {
    fn describe_keyspace(&self, keyspace: &str) -> StoreResult<()> {
        self.check()?;
        if keyspace == self.keyspace {
            Ok(())
        } else {
            Err(StoreError::Schema(format!("keyspace '{}' does not exist", keyspace)))
        }
    }

    fn get_row(&self, family: &ColumnFamily, row_key: &[u8]) -> StoreResult<Vec<RawColumn>> {
        self.read_row(family, row_key, |_| true)
    }

    fn get_range(&self, family: &ColumnFamily, row_key: &[u8], range: &ByteRange) -> StoreResult<Vec<RawColumn>> {
        let comparator = family.column_codec().as_ref();
        self.read_row(family, row_key, |column| range.contains(comparator, &column.name))
    }

    fn get_counter(&self, family: &ColumnFamily, row_key: &[u8], column: &[u8]) -> StoreResult<Option<i64>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let key = (
            family.name().to_string(),
            Bytes::copy_from_slice(row_key),
            Bytes::copy_from_slice(column),
        );
        Ok(self.counters.read().get(&key).copied())
    }

    /// Both locks are held for the whole batch, so readers see all of it or
    /// none of it
    fn execute_batch(&self, batch: MutationBatch) -> StoreResult<()> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let mut families = self.families.write();
        let mut counters = self.counters.write();
        let size = batch.len();

        for mutation in batch {
            match mutation {
                Mutation::Put {
                    family,
                    row_key,
                    column,
                    value,
                } => {
                    let comparator = family.column_codec();
                    let columns = families
                        .entry(family.name().to_string())
                        .or_default()
                        .entry(row_key)
                        .or_default();
                    match columns.binary_search_by(|c| comparator.compare(&c.name, &column)) {
                        Ok(i) => columns[i].value = value,
                        Err(i) => columns.insert(i, RawColumn { name: column, value }),
                    }
                }
                Mutation::Delete {
                    family,
                    row_key,
                    column,
                } => {
                    let comparator = family.column_codec();
                    if let Some(columns) = families
                        .get_mut(family.name())
                        .and_then(|rows| rows.get_mut(&row_key))
                    {
                        if let Ok(i) = columns.binary_search_by(|c| comparator.compare(&c.name, &column)) {
                            columns.remove(i);
                        }
                    }
                }
                Mutation::Increment {
                    family,
                    row_key,
                    column,
                    amount,
                } => {
                    // Store counters are 64-bit and wrap on overflow
                    let counter = counters
                        .entry((family.name().to_string(), row_key, column))
                        .or_insert(0);
                    *counter = counter.wrapping_add(amount);
                }
            }
        }

        debug!(mutations = size, "applied batch");
        Ok(())
    }

    fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
    }
}

//! Mapping Module
//!
//! How pipeline records become rows, columns and counters.
//!
//! ## Contracts
//! - [`RecordMapper`]: column family, row key and column map for a record,
//!   plus the declared key / column name / column value types
//! - [`CounterMapper`]: counter columns and increment amount for a record
//!
//! ## Stock Mappers
//! - [`FieldMapper`]: row key from one field, other fields become columns
//! - [`FieldCounterMapper`]: row key from one field, counted field values
//!   become counter columns

mod record;
mod field;

pub use record::Record;
pub use field::{FieldCounterMapper, FieldMapper, Increment};

use crate::error::Result;
use crate::types::{ColumnMap, Value, ValueType};

/// Maps a record to a row of typed columns
pub trait RecordMapper: Send + Sync {
    /// Column family the record belongs to
    fn column_family(&self, record: &Record) -> Result<String>;

    /// Row key of the record
    fn row_key(&self, record: &Record) -> Result<Value>;

    /// Column name → column value entries to write
    fn columns(&self, record: &Record) -> Result<ColumnMap>;

    fn key_type(&self) -> &ValueType;

    fn column_name_type(&self) -> &ValueType;

    fn column_value_type(&self) -> &ValueType;

    /// Delete the mapped columns instead of writing them
    fn should_delete(&self, _record: &Record) -> bool {
        false
    }
}

/// Maps a record to counter increments. Row keys and column names are
/// always strings.
pub trait CounterMapper: Send + Sync {
    fn column_family(&self, record: &Record) -> Result<String>;

    fn row_key(&self, record: &Record) -> Result<String>;

    fn increment_amount(&self, record: &Record) -> Result<i64>;

    /// Counter columns to bump by [`CounterMapper::increment_amount`]
    fn counter_columns(&self, record: &Record) -> Result<Vec<String>>;
}

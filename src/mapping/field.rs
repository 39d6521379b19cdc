//! Field-driven mappers

use crate::error::{Result, UsageError};
use crate::types::{ColumnMap, Value, ValueType};

use super::{CounterMapper, Record, RecordMapper};

/// Maps one field to the row key and other fields to columns named after
/// them.
///
/// With no explicit column list every field except the row key and the
/// delete flag becomes a column.
#[derive(Debug, Clone)]
pub struct FieldMapper {
    column_family: String,
    row_key_field: String,
    key_type: ValueType,
    column_name_type: ValueType,
    column_fields: Vec<String>,
    value_type: ValueType,
    delete_field: Option<String>,
}

impl FieldMapper {
    /// Utf8 row keys and Utf8 values unless overridden
    pub fn new(column_family: impl Into<String>, row_key_field: impl Into<String>) -> Self {
        Self {
            column_family: column_family.into(),
            row_key_field: row_key_field.into(),
            key_type: ValueType::Utf8,
            column_name_type: ValueType::Utf8,
            column_fields: Vec::new(),
            value_type: ValueType::Utf8,
            delete_field: None,
        }
    }

    pub fn key_type(mut self, key_type: ValueType) -> Self {
        self.key_type = key_type;
        self
    }

    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Only these fields become columns
    pub fn columns<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// A boolean field that, when true, turns the write into a delete
    pub fn delete_flag(mut self, field: impl Into<String>) -> Self {
        self.delete_field = Some(field.into());
        self
    }

    fn is_column(&self, name: &str) -> bool {
        if self.column_fields.is_empty() {
            name != self.row_key_field && self.delete_field.as_deref() != Some(name)
        } else {
            self.column_fields.iter().any(|f| f == name)
        }
    }
}

impl RecordMapper for FieldMapper {
    fn column_family(&self, _record: &Record) -> Result<String> {
        Ok(self.column_family.clone())
    }

    fn row_key(&self, record: &Record) -> Result<Value> {
        record
            .get(&self.row_key_field)
            .cloned()
            .ok_or_else(|| UsageError::NullKey.into())
    }

    fn columns(&self, record: &Record) -> Result<ColumnMap> {
        Ok(record
            .fields()
            .filter(|(name, _)| self.is_column(name))
            .map(|(name, value)| (Value::from(name), value.clone()))
            .collect())
    }

    fn key_type(&self) -> &ValueType {
        &self.key_type
    }

    fn column_name_type(&self) -> &ValueType {
        &self.column_name_type
    }

    fn column_value_type(&self) -> &ValueType {
        &self.value_type
    }

    fn should_delete(&self, record: &Record) -> bool {
        self.delete_field
            .as_deref()
            .and_then(|field| record.get(field))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// How much a counter mapper adds per record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Increment {
    Fixed(i64),
    /// Read the amount from an integer field
    Field(String),
}

/// Counts the values of selected fields under a row keyed by another field.
///
/// Each counted field's value, rendered as a string, names the counter
/// column that is incremented.
#[derive(Debug, Clone)]
pub struct FieldCounterMapper {
    column_family: String,
    row_key_field: String,
    counter_fields: Vec<String>,
    increment: Increment,
}

impl FieldCounterMapper {
    pub fn new<I, S>(column_family: impl Into<String>, row_key_field: impl Into<String>, counter_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column_family: column_family.into(),
            row_key_field: row_key_field.into(),
            counter_fields: counter_fields.into_iter().map(Into::into).collect(),
            increment: Increment::Fixed(1),
        }
    }

    pub fn increment(mut self, increment: Increment) -> Self {
        self.increment = increment;
        self
    }
}

impl CounterMapper for FieldCounterMapper {
    fn column_family(&self, _record: &Record) -> Result<String> {
        Ok(self.column_family.clone())
    }

    fn row_key(&self, record: &Record) -> Result<String> {
        let value = record.get(&self.row_key_field).ok_or(UsageError::NullKey)?;
        key_string(value)
    }

    fn increment_amount(&self, record: &Record) -> Result<i64> {
        match &self.increment {
            Increment::Fixed(amount) => Ok(*amount),
            Increment::Field(field) => {
                let value = record.require(field)?;
                value.as_i64().ok_or_else(|| {
                    UsageError::TypeMismatch {
                        expected: ValueType::Int64.to_string(),
                        actual: value.value_type().to_string(),
                    }
                    .into()
                })
            }
        }
    }

    fn counter_columns(&self, record: &Record) -> Result<Vec<String>> {
        self.counter_fields
            .iter()
            .map(|field| key_string(record.require(field)?))
            .collect()
    }
}

/// Render a text or integer value as a counter key
fn key_string(value: &Value) -> Result<String> {
    match value {
        Value::Text(s) => Ok(s.clone()),
        Value::Uuid(u) => Ok(u.to_string()),
        other => other.as_i64().map(|n| n.to_string()).ok_or_else(|| {
            UsageError::TypeMismatch {
                expected: ValueType::Utf8.to_string(),
                actual: other.value_type().to_string(),
            }
            .into()
        }),
    }
}

//! Composite values

use std::collections::BTreeMap;
use std::fmt;

use super::Value;

/// An instance of a composite type: named component values.
///
/// A component that was never set is null. Null components are skipped by the
/// range builder and cannot be encoded into a full column name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompositeValue {
    type_name: String,
    fields: BTreeMap<String, Value>,
}

impl CompositeValue {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Set a component, builder style
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Set or clear a component
    pub fn set(&mut self, field: impl Into<String>, value: Option<Value>) {
        let field = field.into();
        match value {
            Some(v) => {
                self.fields.insert(field, v);
            }
            None => {
                self.fields.remove(&field);
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Names of the fields that are set
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Number of non-null components
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for CompositeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.type_name)?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        f.write_str(")")
    }
}

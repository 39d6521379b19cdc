//! Types Module
//!
//! The value model shared by codecs, the range builder and the client.
//!
//! ## Type Tags
//! Every codec is selected by an explicit [`ValueType`] tag. Primitive tags
//! map one-to-one onto store-native encodings; [`ValueType::Named`] refers to
//! a composite or opaque type declared with the registry.
//!
//! ## Values
//! [`Value`] is totally ordered and hashable so decoded column names can key
//! a [`ColumnMap`]. Floats order by IEEE-754 total order.

mod value;
mod value_type;
mod composite;

use std::collections::BTreeMap;

pub use value::{OpaqueValue, Value};
pub use value_type::ValueType;
pub use composite::CompositeValue;

/// Decoded columns of one row: column name → column value
pub type ColumnMap = BTreeMap<Value, Value>;

//! Schema Module
//!
//! Declarative shapes of composite types and the introspection that turns a
//! shape into an ordered component list.
//!
//! ## Responsibilities
//! - Declare a composite type's fields, component ordinals and parent shape
//! - Reject duplicate ordinals when the schema is built
//! - Produce the ordinal-sorted [`CompositeDescriptor`] used for encoding,
//!   comparison and range building
//!
//! The ordinal order is the order the store compares composite column names
//! in. A descriptor that disagrees with it makes range queries return wrong
//! or empty slices.

mod composite;
mod introspect;

pub use composite::{CompositeSchema, SchemaBuilder, SchemaField};
pub use introspect::{components_of, has_components, ComponentField, CompositeDescriptor};

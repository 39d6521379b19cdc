//! Composite schema declarations

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{EncodingError, Result};
use crate::types::ValueType;

use super::introspect::components_of;

/// One declared field of a composite type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub name: String,
    pub value_type: ValueType,
    /// Component ordinal; `None` for fields that are not part of the encoding
    pub ordinal: Option<u32>,
    /// Generated bookkeeping field, never a component
    pub synthetic: bool,
}

/// Shape of a composite type, optionally extending a parent shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeSchema {
    name: String,
    parent: Option<Arc<CompositeSchema>>,
    fields: Vec<SchemaField>,
}

impl CompositeSchema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            parent: None,
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<CompositeSchema>> {
        self.parent.as_ref()
    }

    /// Fields declared directly on this schema, in declaration order
    pub fn declared_fields(&self) -> &[SchemaField] {
        &self.fields
    }

    /// This schema followed by its ancestors, nearest first
    pub fn lineage(&self) -> impl Iterator<Item = &CompositeSchema> {
        std::iter::successors(Some(self), |schema| schema.parent.as_deref())
    }
}

/// Builder for CompositeSchema
pub struct SchemaBuilder {
    name: String,
    parent: Option<Arc<CompositeSchema>>,
    fields: Vec<SchemaField>,
}

impl SchemaBuilder {
    /// Inherit every field of `parent`
    pub fn extends(mut self, parent: Arc<CompositeSchema>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Declare a component field with its ordinal
    pub fn component(mut self, name: impl Into<String>, ordinal: u32, value_type: ValueType) -> Self {
        self.fields.push(SchemaField {
            name: name.into(),
            value_type,
            ordinal: Some(ordinal),
            synthetic: false,
        });
        self
    }

    /// Declare a field that is carried by the type but not encoded
    pub fn field(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.fields.push(SchemaField {
            name: name.into(),
            value_type,
            ordinal: None,
            synthetic: false,
        });
        self
    }

    /// Declare a generated field; skipped even if it carries an ordinal
    pub fn synthetic(mut self, name: impl Into<String>, ordinal: Option<u32>, value_type: ValueType) -> Self {
        self.fields.push(SchemaField {
            name: name.into(),
            value_type,
            ordinal,
            synthetic: true,
        });
        self
    }

    /// Validate and freeze the schema.
    ///
    /// Field names must be unique across the lineage and so must component
    /// ordinals.
    pub fn build(self) -> Result<Arc<CompositeSchema>> {
        let schema = CompositeSchema {
            name: self.name,
            parent: self.parent,
            fields: self.fields,
        };

        let mut names = HashSet::new();
        for field in schema.lineage().flat_map(|s| s.fields.iter()) {
            if !names.insert(field.name.as_str()) {
                return Err(EncodingError::malformed(
                    schema.name.clone(),
                    format!("field '{}' declared more than once", field.name),
                )
                .into());
            }
        }

        let mut seen: HashMap<u32, &str> = HashMap::new();
        let descriptor = components_of(&schema);
        for component in descriptor.iter() {
            if seen.insert(component.ordinal, &component.name).is_some() {
                return Err(EncodingError::DuplicateOrdinal {
                    type_name: schema.name.clone(),
                    ordinal: component.ordinal,
                }
                .into());
            }
        }

        Ok(Arc::new(schema))
    }
}

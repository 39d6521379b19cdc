//! Composite field introspection
//!
//! Collects the component fields of a schema and all of its ancestors and
//! orders them by ordinal.

use std::slice::Iter;

use crate::types::{CompositeValue, Value, ValueType};

use super::CompositeSchema;

/// A field that participates in the composite encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentField {
    pub name: String,
    pub ordinal: u32,
    pub value_type: ValueType,
}

impl ComponentField {
    /// Read this component from an instance; `None` means null
    pub fn read<'a>(&self, value: &'a CompositeValue) -> Option<&'a Value> {
        value.get(&self.name)
    }
}

/// Ordinal-ordered components of one composite type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeDescriptor {
    type_name: String,
    components: Vec<ComponentField>,
    /// Declared fields that are carried but not encoded
    carried: Vec<String>,
}

impl CompositeDescriptor {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn iter(&self) -> Iter<'_, ComponentField> {
        self.components.iter()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ComponentField> {
        self.components.get(index)
    }

    /// Position of the named component in ordinal order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|c| c.name == name)
    }

    /// True if the type or one of its ancestors declares `name`
    pub fn declares(&self, name: &str) -> bool {
        self.position(name).is_some() || self.carried.iter().any(|f| f == name)
    }
}

impl<'a> IntoIterator for &'a CompositeDescriptor {
    type Item = &'a ComponentField;
    type IntoIter = Iter<'a, ComponentField>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

/// Component fields of `schema` and its ancestors, ascending by ordinal
pub fn components_of(schema: &CompositeSchema) -> CompositeDescriptor {
    let mut components: Vec<ComponentField> = component_fields(schema)
        .map(|(field, ordinal)| ComponentField {
            name: field.name.clone(),
            ordinal,
            value_type: field.value_type.clone(),
        })
        .collect();

    components.sort_by_key(|c| c.ordinal);

    let carried = schema
        .lineage()
        .flat_map(|s| s.declared_fields().iter())
        .filter(|field| !components.iter().any(|c| c.name == field.name))
        .map(|field| field.name.clone())
        .collect();

    CompositeDescriptor {
        type_name: schema.name().to_string(),
        components,
        carried,
    }
}

/// True iff the lineage declares at least one component field
pub fn has_components(schema: &CompositeSchema) -> bool {
    component_fields(schema).next().is_some()
}

fn component_fields(
    schema: &CompositeSchema,
) -> impl Iterator<Item = (&super::SchemaField, u32)> + '_ {
    schema
        .lineage()
        .flat_map(|s| s.declared_fields().iter())
        .filter(|field| !field.synthetic)
        .filter_map(|field| field.ordinal.map(|ordinal| (field, ordinal)))
}

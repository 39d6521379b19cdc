//! Serializer Registry
//!
//! Maps a declared [`ValueType`] to the codec that encodes it.
//!
//! ## Resolution
//! - Primitive tags resolve to a prebuilt [`PrimitiveCodec`]
//! - `Named` types resolve against declarations: a composite schema with at
//!   least one component gets a [`CompositeCodec`], a type declared opaque
//!   gets an [`OpaqueCodec`]
//! - Anything else is an [`EncodingError::UnknownType`]
//!
//! ## Concurrency
//! Composite codecs and descriptors are memoized behind `RwLock`s. Entries
//! are computed outside the lock and inserted with `or_insert`, so two
//! threads racing on the same type both compute it and one result wins.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::codec::{Codec, CompositeCodec, OpaqueCodec, PrimitiveCodec};
use crate::error::{BridgeError, EncodingError, Result};
use crate::schema::{components_of, has_components, CompositeDescriptor, CompositeSchema};
use crate::types::{Value, ValueType};

/// How a named type is encoded
#[derive(Debug, Clone, PartialEq, Eq)]
enum Declaration {
    Composite(Arc<CompositeSchema>),
    Opaque,
}

/// Codec lookup and memoization
pub struct SerializerRegistry {
    /// One shared codec per primitive tag
    primitives: HashMap<ValueType, Arc<dyn Codec>>,

    /// Named types known to this registry
    declarations: RwLock<HashMap<String, Declaration>>,

    /// Memoized composite descriptors by type name
    descriptors: RwLock<HashMap<String, Arc<CompositeDescriptor>>>,

    /// Memoized codecs for named types
    named: RwLock<HashMap<String, Arc<dyn Codec>>>,
}

impl SerializerRegistry {
    pub fn new() -> Self {
        let primitives = ValueType::PRIMITIVES
            .iter()
            .filter_map(|ty| {
                PrimitiveCodec::new(ty.clone())
                    .map(|codec| (ty.clone(), Arc::new(codec) as Arc<dyn Codec>))
            })
            .collect();

        Self {
            primitives,
            declarations: RwLock::new(HashMap::new()),
            descriptors: RwLock::new(HashMap::new()),
            named: RwLock::new(HashMap::new()),
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// Declare a composite type. Re-declaring the same schema is a no-op.
    pub fn register_composite(&self, schema: Arc<CompositeSchema>) -> Result<()> {
        self.declare(schema.name().to_string(), Declaration::Composite(schema))
    }

    /// Declare a type whose values are stored as opaque serde payloads
    pub fn register_opaque(&self, type_name: impl Into<String>) -> Result<()> {
        self.declare(type_name.into(), Declaration::Opaque)
    }

    fn declare(&self, name: String, declaration: Declaration) -> Result<()> {
        if ValueType::parse(&name).is_primitive() {
            return Err(BridgeError::Config(format!(
                "'{}' is a primitive type name",
                name
            )));
        }

        let mut declarations = self.declarations.write();
        match declarations.get(&name) {
            Some(existing) if *existing == declaration => Ok(()),
            Some(_) => Err(BridgeError::Config(format!(
                "type '{}' is already declared differently",
                name
            ))),
            None => {
                debug!(type_name = %name, "declared type");
                declarations.insert(name, declaration);
                Ok(())
            }
        }
    }

    /// Schema of a declared composite type
    pub fn schema(&self, type_name: &str) -> Option<Arc<CompositeSchema>> {
        match self.declarations.read().get(type_name) {
            Some(Declaration::Composite(schema)) => Some(Arc::clone(schema)),
            _ => None,
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Codec for a declared type
    pub fn codec_for(&self, value_type: &ValueType) -> Result<Arc<dyn Codec>> {
        self.resolve(value_type, &mut Vec::new())
    }

    /// Codec for the runtime type of `value`
    pub fn codec_for_value(&self, value: &Value) -> Result<Arc<dyn Codec>> {
        self.codec_for(&value.value_type())
    }

    /// True when `value_type` resolves to a composite codec
    pub fn is_composite(&self, value_type: &ValueType) -> bool {
        match value_type {
            ValueType::Named(name) => self
                .schema(name)
                .map(|schema| has_components(&schema))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Ordinal-ordered components of a declared composite type
    pub fn descriptor_for(&self, type_name: &str) -> Result<Arc<CompositeDescriptor>> {
        if let Some(descriptor) = self.descriptors.read().get(type_name) {
            return Ok(Arc::clone(descriptor));
        }

        let schema = self
            .schema(type_name)
            .ok_or_else(|| EncodingError::UnknownType(type_name.to_string()))?;
        let descriptor = Arc::new(components_of(&schema));

        let mut descriptors = self.descriptors.write();
        Ok(Arc::clone(
            descriptors
                .entry(type_name.to_string())
                .or_insert(descriptor),
        ))
    }

    /// `resolving` holds the named types on the current path, to catch a
    /// composite that contains itself
    fn resolve(&self, value_type: &ValueType, resolving: &mut Vec<String>) -> Result<Arc<dyn Codec>> {
        let name = match value_type {
            ValueType::Named(name) => name,
            primitive => {
                return self
                    .primitives
                    .get(primitive)
                    .cloned()
                    .ok_or_else(|| EncodingError::UnknownType(primitive.to_string()).into());
            }
        };

        if let Some(codec) = self.named.read().get(name) {
            return Ok(Arc::clone(codec));
        }

        if resolving.iter().any(|n| n == name) {
            return Err(EncodingError::malformed(
                name.as_str(),
                format!("type contains itself via {}", resolving.join(" -> ")),
            )
            .into());
        }

        let declaration = self
            .declarations
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| EncodingError::UnknownType(name.clone()))?;

        let codec: Arc<dyn Codec> = match declaration {
            Declaration::Opaque => Arc::new(OpaqueCodec::new(name.as_str())),
            Declaration::Composite(schema) => {
                if !has_components(&schema) {
                    return Err(EncodingError::NoComponents(name.clone()).into());
                }
                let descriptor = self.descriptor_for(name)?;

                resolving.push(name.clone());
                let components = descriptor
                    .iter()
                    .map(|field| self.resolve(&field.value_type, resolving))
                    .collect::<Result<Vec<_>>>();
                resolving.pop();

                debug!(
                    type_name = %name,
                    components = descriptor.len(),
                    "built composite codec"
                );
                Arc::new(CompositeCodec::new(descriptor, components?)?)
            }
        };

        let mut named = self.named.write();
        Ok(Arc::clone(named.entry(name.clone()).or_insert(codec)))
    }
}

impl Default for SerializerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

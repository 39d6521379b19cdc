//! Codec for composite column names and row keys

use std::cmp::Ordering;
use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{EncodingError, Result, UsageError};
use crate::schema::{ComponentField, CompositeDescriptor};
use crate::types::{CompositeValue, Value, ValueType};

use super::Codec;

/// Length prefix size of one component
const LENGTH_SIZE: usize = 2;

/// Trailing end-of-component marker size
const EOC_SIZE: usize = 1;

/// End-of-component marker written after each component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EndOfComponent {
    /// Stored names and inclusive start bounds
    Equal = 0x00,

    /// Inclusive end bound: sorts after every name sharing the prefix
    GreaterThanEqual = 0x01,
}

/// Codec for one composite type.
///
/// Holds the descriptor and one codec per component, in ordinal order.
#[derive(Debug)]
pub struct CompositeCodec {
    value_type: ValueType,
    descriptor: Arc<CompositeDescriptor>,
    components: Vec<Arc<dyn Codec>>,
}

impl CompositeCodec {
    /// `components` must line up with the descriptor's ordinal order
    pub fn new(descriptor: Arc<CompositeDescriptor>, components: Vec<Arc<dyn Codec>>) -> Result<Self> {
        if descriptor.is_empty() {
            return Err(EncodingError::NoComponents(descriptor.type_name().to_string()).into());
        }
        if descriptor.len() != components.len() {
            return Err(EncodingError::malformed(
                descriptor.type_name(),
                format!(
                    "{} components declared but {} codecs supplied",
                    descriptor.len(),
                    components.len()
                ),
            )
            .into());
        }
        Ok(Self {
            value_type: ValueType::Named(descriptor.type_name().to_string()),
            descriptor,
            components,
        })
    }

    pub fn descriptor(&self) -> &Arc<CompositeDescriptor> {
        &self.descriptor
    }

    /// Codec of the named component
    pub fn component_codec(&self, field: &str) -> Option<&Arc<dyn Codec>> {
        self.descriptor
            .position(field)
            .and_then(|index| self.components.get(index))
    }

    /// Encode a range bound from components in query order.
    ///
    /// Every component ends with [`EndOfComponent::Equal`] except the last,
    /// which ends with `last`.
    pub fn encode_bound(&self, parts: &[(&ComponentField, &Value)], last: EndOfComponent) -> Result<Bytes> {
        let mut out = BytesMut::new();
        for (i, (field, value)) in parts.iter().enumerate() {
            let codec = self.component_codec(&field.name).ok_or_else(|| {
                EncodingError::malformed(
                    self.descriptor.type_name(),
                    format!("unknown component '{}'", field.name),
                )
            })?;
            let eoc = if i + 1 == parts.len() {
                last
            } else {
                EndOfComponent::Equal
            };
            self.put_component(&mut out, &codec.encode(value)?, eoc)?;
        }
        Ok(out.freeze())
    }

    fn put_component(&self, out: &mut BytesMut, bytes: &[u8], eoc: EndOfComponent) -> Result<()> {
        let len = u16::try_from(bytes.len()).map_err(|_| {
            EncodingError::malformed(
                self.descriptor.type_name(),
                format!("component of {} bytes exceeds {}", bytes.len(), u16::MAX),
            )
        })?;
        out.reserve(LENGTH_SIZE + bytes.len() + EOC_SIZE);
        out.put_u16(len);
        out.put_slice(bytes);
        out.put_u8(eoc as u8);
        Ok(())
    }

    fn composite_of<'a>(&self, value: &'a Value) -> Result<&'a CompositeValue> {
        match value {
            Value::Composite(c) if c.type_name() == self.descriptor.type_name() => {
                self.check_fields(c)?;
                Ok(c)
            }
            other => Err(UsageError::TypeMismatch {
                expected: self.value_type.to_string(),
                actual: other.value_type().to_string(),
            }
            .into()),
        }
    }

    /// Reject values carrying fields the type never declared
    pub fn check_fields(&self, value: &CompositeValue) -> Result<()> {
        match value.field_names().find(|name| !self.descriptor.declares(name)) {
            Some(unknown) => Err(EncodingError::malformed(
                self.descriptor.type_name(),
                format!("unknown component '{}'", unknown),
            )
            .into()),
            None => Ok(()),
        }
    }
}

/// Split one framed component off the front of `bytes`
fn split_component(bytes: &[u8]) -> Option<(&[u8], u8, &[u8])> {
    if bytes.len() < LENGTH_SIZE {
        return None;
    }
    let len = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
    let end = LENGTH_SIZE + len;
    if bytes.len() < end + EOC_SIZE {
        return None;
    }
    Some((&bytes[LENGTH_SIZE..end], bytes[end], &bytes[end + EOC_SIZE..]))
}

impl Codec for CompositeCodec {
    fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Components are written in ordinal order up to the first null one.
    /// A non-null component after a null one cannot be represented.
    fn encode(&self, value: &Value) -> Result<Bytes> {
        let composite = self.composite_of(value)?;

        let mut out = BytesMut::new();
        let mut first_null: Option<&str> = None;
        for (field, codec) in self.descriptor.iter().zip(&self.components) {
            match (field.read(composite), first_null) {
                (Some(component), None) => {
                    self.put_component(&mut out, &codec.encode(component)?, EndOfComponent::Equal)?;
                }
                (Some(_), Some(null_field)) => {
                    return Err(EncodingError::malformed(
                        self.descriptor.type_name(),
                        format!("component '{}' is set after null component '{}'", field.name, null_field),
                    )
                    .into());
                }
                (None, None) => first_null = Some(&field.name),
                (None, Some(_)) => {}
            }
        }

        if out.is_empty() {
            return Err(EncodingError::malformed(self.descriptor.type_name(), "no components set").into());
        }
        Ok(out.freeze())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        let mut composite = CompositeValue::new(self.descriptor.type_name());
        let mut rest = bytes;
        let mut index = 0;

        while !rest.is_empty() {
            let (component, _eoc, tail) = split_component(rest).ok_or_else(|| {
                EncodingError::malformed(
                    self.descriptor.type_name(),
                    format!("truncated component at index {}", index),
                )
            })?;
            let (field, codec) = match (self.descriptor.get(index), self.components.get(index)) {
                (Some(field), Some(codec)) => (field, codec),
                _ => {
                    return Err(EncodingError::malformed(
                        self.descriptor.type_name(),
                        format!("more than {} components", self.descriptor.len()),
                    )
                    .into())
                }
            };
            composite.set(field.name.clone(), Some(codec.decode(component)?));
            rest = tail;
            index += 1;
        }

        Ok(Value::Composite(composite))
    }

    /// Component-wise comparison honoring end-of-component markers
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        let (mut ra, mut rb) = (a, b);
        let mut index = 0;

        while !ra.is_empty() && !rb.is_empty() {
            let (Some((ca, ea, ta)), Some((cb, eb, tb))) = (split_component(ra), split_component(rb)) else {
                return a.cmp(b);
            };

            let ord = match self.components.get(index) {
                Some(codec) => codec.compare(ca, cb),
                None => ca.cmp(cb),
            };
            if ord != Ordering::Equal {
                return ord;
            }

            let (ea, eb) = (ea as i8, eb as i8);
            if ea < 0 {
                if eb >= 0 {
                    return Ordering::Less;
                }
            } else if ea > 0 {
                if eb <= 0 {
                    return Ordering::Greater;
                }
            } else if eb != 0 {
                return if eb > 0 { Ordering::Less } else { Ordering::Greater };
            }

            ra = ta;
            rb = tb;
            index += 1;
        }

        match (ra.is_empty(), rb.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, _) => Ordering::Greater,
        }
    }

    fn as_composite(&self) -> Option<&CompositeCodec> {
        Some(self)
    }
}

//! Range/Prefix Query Builder
//!
//! Turns a start and end column name into the slice a store should return.
//!
//! ## Scalar column names
//! One bounded clause `start..=end`. Each bound is encoded with the codec of
//! its own runtime type, so heterogeneous bounds are allowed.
//!
//! ## Composite column names
//! ```text
//! components (ordinal order)   C = [c0, c1, c2, ...]
//! non-null in start AND end    N = C filtered, order kept
//! N[..last]                    exact prefix on start's value
//! N[last]                      bounded: >= start value, <= end value
//! ```
//! The encoded start bound ends every component with EOC 0x00. The end
//! bound repeats the prefix and closes the bounded component with 0x01, so
//! both ends are inclusive under the composite comparator.

use bytes::Bytes;
use tracing::debug;

use crate::codec::{Codec, CompositeCodec, EndOfComponent};
use crate::error::{Result, UsageError};
use crate::registry::SerializerRegistry;
use crate::schema::ComponentField;
use crate::types::{CompositeValue, Value};

/// Boundary policy requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryMode {
    Equal,
    GreaterThanEqualLessThanEqual,
}

/// Encoded slice bounds; `None` is open on that side.
///
/// A present but empty bound is a real bound: the empty string is a valid
/// column name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ByteRange {
    pub start: Option<Bytes>,
    pub end: Option<Bytes>,
}

impl ByteRange {
    /// Both ends inclusive
    pub fn between(start: Bytes, end: Bytes) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// The whole row
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether an encoded column name falls inside the range, using the
    /// column family's comparator
    pub fn contains(&self, comparator: &dyn Codec, name: &[u8]) -> bool {
        let after_start = self
            .start
            .as_ref()
            .map_or(true, |start| comparator.compare(name, start).is_ge());
        let before_end = self
            .end
            .as_ref()
            .map_or(true, |end| comparator.compare(name, end).is_le());
        after_start && before_end
    }
}

/// Exact match on one leading component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixComponent {
    pub field: String,
    pub value: Value,
}

/// Inclusive range on the final component (or on a scalar name)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedClause {
    /// Component name; `None` for scalar column names
    pub field: Option<String>,
    pub start: Value,
    pub end: Value,
}

/// Shape of one column slice query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSpec {
    prefix: Vec<PrefixComponent>,
    bounded: Option<BoundedClause>,
    composite: bool,
    mode: Option<BoundaryMode>,
    bytes: ByteRange,
}

impl RangeSpec {
    /// Exact-match components, in ordinal order
    pub fn prefix(&self) -> &[PrefixComponent] {
        &self.prefix
    }

    /// The range clause, absent when no component was set on both sides
    pub fn bounded(&self) -> Option<&BoundedClause> {
        self.bounded.as_ref()
    }

    pub fn is_composite(&self) -> bool {
        self.composite
    }

    pub fn mode(&self) -> Option<BoundaryMode> {
        self.mode
    }

    /// Encoded bounds handed to the store
    pub fn byte_range(&self) -> &ByteRange {
        &self.bytes
    }
}

/// Build the slice between `start` and `end`.
///
/// `codec` is the column family's column-name codec. Both bounds are
/// required; a missing one is a [`UsageError::MissingBoundary`].
pub fn build_range(
    start: Option<&Value>,
    end: Option<&Value>,
    mode: Option<BoundaryMode>,
    codec: &dyn Codec,
    registry: &SerializerRegistry,
) -> Result<RangeSpec> {
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err(UsageError::MissingBoundary.into()),
    };

    match codec.as_composite() {
        None => build_scalar(start, end, mode, registry),
        Some(composite) => build_composite(start, end, mode, composite),
    }
}

/// Point lookup for a single column name
pub fn exact(column: &Value, codec: &dyn Codec, registry: &SerializerRegistry) -> Result<RangeSpec> {
    build_range(Some(column), Some(column), None, codec, registry)
}

fn build_scalar(
    start: &Value,
    end: &Value,
    mode: Option<BoundaryMode>,
    registry: &SerializerRegistry,
) -> Result<RangeSpec> {
    let bytes = ByteRange::between(
        registry.codec_for_value(start)?.encode(start)?,
        registry.codec_for_value(end)?.encode(end)?,
    );

    debug!(start = %start, end = %end, "scalar range");

    Ok(RangeSpec {
        prefix: Vec::new(),
        bounded: Some(BoundedClause {
            field: None,
            start: start.clone(),
            end: end.clone(),
        }),
        composite: false,
        mode,
        bytes,
    })
}

fn build_composite(
    start: &Value,
    end: &Value,
    mode: Option<BoundaryMode>,
    codec: &CompositeCodec,
) -> Result<RangeSpec> {
    let start = composite_bound(start, codec)?;
    let end = composite_bound(end, codec)?;

    // Containment filter over the whole ordinal list, not a scan that stops
    // at the first null.
    let present: Vec<(&ComponentField, &Value, &Value)> = codec
        .descriptor()
        .iter()
        .filter_map(|field| match (field.read(start), field.read(end)) {
            (Some(s), Some(e)) => Some((field, s, e)),
            _ => None,
        })
        .collect();

    let Some(((bounded_field, bounded_start, bounded_end), leading)) = present.split_last() else {
        debug!(type_name = codec.descriptor().type_name(), "no shared components, open range");
        return Ok(RangeSpec {
            prefix: Vec::new(),
            bounded: None,
            composite: true,
            mode,
            bytes: ByteRange::unbounded(),
        });
    };

    let mut prefix = Vec::with_capacity(leading.len());
    let mut start_parts = Vec::with_capacity(present.len());
    let mut end_parts = Vec::with_capacity(present.len());

    for (field, value, _) in leading {
        debug!(field = %field.name, value = %value, "withPrefix");
        prefix.push(PrefixComponent {
            field: field.name.clone(),
            value: (*value).clone(),
        });
        start_parts.push((*field, *value));
        end_parts.push((*field, *value));
    }

    debug!(field = %bounded_field.name, value = %bounded_start, "greaterThanEquals");
    debug!(field = %bounded_field.name, value = %bounded_end, "lessThanEquals");
    start_parts.push((*bounded_field, *bounded_start));
    end_parts.push((*bounded_field, *bounded_end));

    let bytes = ByteRange::between(
        codec.encode_bound(&start_parts, EndOfComponent::Equal)?,
        codec.encode_bound(&end_parts, EndOfComponent::GreaterThanEqual)?,
    );

    Ok(RangeSpec {
        prefix,
        bounded: Some(BoundedClause {
            field: Some(bounded_field.name.clone()),
            start: (*bounded_start).clone(),
            end: (*bounded_end).clone(),
        }),
        composite: true,
        mode,
        bytes,
    })
}

fn composite_bound<'a>(value: &'a Value, codec: &CompositeCodec) -> Result<&'a CompositeValue> {
    match value {
        Value::Composite(c) if c.type_name() == codec.descriptor().type_name() => {
            codec.check_fields(c)?;
            Ok(c)
        }
        other => Err(UsageError::TypeMismatch {
            expected: codec.descriptor().type_name().to_string(),
            actual: other.value_type().to_string(),
        }
        .into()),
    }
}

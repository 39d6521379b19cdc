//! Serializer Registry Tests
//!
//! These tests verify:
//! - Every primitive tag resolves, to the same codec instance each time
//! - Named types resolve to composite or opaque codecs by declaration
//! - Unregistered types are errors, not silent fallbacks
//! - Concurrent lookups agree

use std::sync::Arc;
use std::thread;

use serde::{Deserialize, Serialize};
use widebridge::codec::Codec;
use widebridge::schema::CompositeSchema;
use widebridge::types::OpaqueValue;
use widebridge::{BridgeError, CompositeValue, EncodingError, SerializerRegistry, Value, ValueType};

// =============================================================================
// Helper Functions
// =============================================================================

fn day_key_schema() -> Arc<CompositeSchema> {
    CompositeSchema::builder("DayKey")
        .component("tenant", 0, ValueType::Utf8)
        .component("day", 1, ValueType::Timestamp)
        .build()
        .unwrap()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Reading {
    sensor: String,
    celsius: f64,
}

// =============================================================================
// Primitive Tests
// =============================================================================

#[test]
fn test_every_primitive_resolves() {
    let registry = SerializerRegistry::new();
    for ty in ValueType::PRIMITIVES.iter() {
        let codec = registry.codec_for(ty).unwrap();
        assert_eq!(codec.value_type(), ty);
        assert!(!codec.is_composite());
    }
}

#[test]
fn test_same_codec_instance_returned() {
    let registry = SerializerRegistry::new();
    let a = registry.codec_for(&ValueType::Int64).unwrap();
    let b = registry.codec_for(&ValueType::Int64).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_codec_for_value_uses_runtime_type() {
    let registry = SerializerRegistry::new();
    let codec = registry.codec_for_value(&Value::Int16(3)).unwrap();
    assert_eq!(codec.value_type(), &ValueType::Int16);
}

// =============================================================================
// Named Type Tests
// =============================================================================

#[test]
fn test_unregistered_type_is_unknown() {
    let registry = SerializerRegistry::new();
    let err = registry.codec_for(&ValueType::named("Mystery")).unwrap_err();
    assert!(matches!(
        err,
        BridgeError::Encoding(EncodingError::UnknownType(ref name)) if name == "Mystery"
    ));
}

#[test]
fn test_composite_declaration_yields_composite_codec() {
    let registry = SerializerRegistry::new();
    registry.register_composite(day_key_schema()).unwrap();

    let ty = ValueType::named("DayKey");
    let codec = registry.codec_for(&ty).unwrap();
    assert!(codec.is_composite());
    assert!(registry.is_composite(&ty));
    assert!(Arc::ptr_eq(&codec, &registry.codec_for(&ty).unwrap()));
}

#[test]
fn test_schema_without_components_is_rejected() {
    let registry = SerializerRegistry::new();
    let schema = CompositeSchema::builder("Loose")
        .field("note", ValueType::Utf8)
        .build()
        .unwrap();
    registry.register_composite(schema).unwrap();

    let err = registry.codec_for(&ValueType::named("Loose")).unwrap_err();
    assert!(matches!(err, BridgeError::Encoding(EncodingError::NoComponents(_))));
    assert!(!registry.is_composite(&ValueType::named("Loose")));
}

#[test]
fn test_opaque_declaration_round_trip() {
    let registry = SerializerRegistry::new();
    registry.register_opaque("Reading").unwrap();

    let reading = Reading {
        sensor: "s-1".to_string(),
        celsius: 21.5,
    };
    let value = Value::Opaque(OpaqueValue::encode("Reading", &reading).unwrap());

    let codec = registry.codec_for(&ValueType::named("Reading")).unwrap();
    let decoded = codec.decode(&codec.encode(&value).unwrap()).unwrap();
    assert_eq!(decoded, value);

    let back: Reading = match decoded {
        Value::Opaque(opaque) => opaque.decode().unwrap(),
        other => panic!("Expected opaque value, got {}", other),
    };
    assert_eq!(back, reading);
}

#[test]
fn test_nested_composite_components() {
    let registry = SerializerRegistry::new();
    registry.register_composite(day_key_schema()).unwrap();
    let outer = CompositeSchema::builder("Outer")
        .component("inner", 0, ValueType::named("DayKey"))
        .component("n", 1, ValueType::Int32)
        .build()
        .unwrap();
    registry.register_composite(outer).unwrap();

    let inner = CompositeValue::new("DayKey")
        .with("tenant", "acme")
        .with("day", Value::timestamp_millis(1_000).unwrap());
    let value = Value::Composite(CompositeValue::new("Outer").with("inner", inner).with("n", 9i32));

    let codec = registry.codec_for(&ValueType::named("Outer")).unwrap();
    assert_eq!(codec.decode(&codec.encode(&value).unwrap()).unwrap(), value);
}

#[test]
fn test_redeclaring_same_schema_is_allowed() {
    let registry = SerializerRegistry::new();
    registry.register_composite(day_key_schema()).unwrap();
    registry.register_composite(day_key_schema()).unwrap();
}

#[test]
fn test_conflicting_declaration_is_rejected() {
    let registry = SerializerRegistry::new();
    registry.register_composite(day_key_schema()).unwrap();
    assert!(matches!(
        registry.register_opaque("DayKey"),
        Err(BridgeError::Config(_))
    ));
}

#[test]
fn test_descriptor_is_cached() {
    let registry = SerializerRegistry::new();
    registry.register_composite(day_key_schema()).unwrap();

    let a = registry.descriptor_for("DayKey").unwrap();
    let b = registry.descriptor_for("DayKey").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.len(), 2);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_lookups_agree() {
    let registry = Arc::new(SerializerRegistry::new());
    registry.register_composite(day_key_schema()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let codec = registry.codec_for(&ValueType::named("DayKey")).unwrap();
                let descriptor = registry.descriptor_for("DayKey").unwrap();
                (codec.value_type().clone(), descriptor.len())
            })
        })
        .collect();

    for handle in handles {
        let (ty, len) = handle.join().unwrap();
        assert_eq!(ty, ValueType::named("DayKey"));
        assert_eq!(len, 2);
    }

    // Whoever won the race, later lookups share one instance
    let a = registry.codec_for(&ValueType::named("DayKey")).unwrap();
    let b = registry.codec_for(&ValueType::named("DayKey")).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

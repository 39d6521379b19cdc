//! Client Facade Tests
//!
//! These tests verify:
//! - Connecting validates config and the keyspace
//! - Row, column-list and range lookups decode through the mapper's types
//! - Writes, deletes and counters go out as single batches
//! - Store and decode failures surface to the caller

use std::sync::Arc;

use widebridge::mapping::{FieldCounterMapper, FieldMapper, Increment, Record, RecordMapper};
use widebridge::schema::CompositeSchema;
use widebridge::store::MemoryStore;
use widebridge::{
    BoundaryMode, BridgeError, Client, ColumnMap, CompositeValue, Config, Result,
    SerializerRegistry, StoreError, UsageError, Value, ValueType,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn config() -> Config {
    Config::builder()
        .cluster_name("test-cluster")
        .keyspace("pipeline")
        .seed("127.0.0.1:9160")
        .build()
}

fn setup() -> (Arc<MemoryStore>, Client) {
    let store = Arc::new(MemoryStore::new("pipeline"));
    let client = Client::connect(config(), store.clone()).unwrap();
    (store, client)
}

fn user_record(id: &str, name: &str, city: &str) -> Record {
    Record::new().with("id", id).with("name", name).with("city", city)
}

/// Rows keyed by host, one Int64 column per (tenant, seq) event
struct EventMapper {
    key_type: ValueType,
    name_type: ValueType,
    value_type: ValueType,
}

impl EventMapper {
    fn new() -> Self {
        Self {
            key_type: ValueType::Utf8,
            name_type: ValueType::named("EventKey"),
            value_type: ValueType::Int64,
        }
    }
}

impl RecordMapper for EventMapper {
    fn column_family(&self, _record: &Record) -> Result<String> {
        Ok("events".to_string())
    }

    fn row_key(&self, record: &Record) -> Result<Value> {
        Ok(record.require("host")?.clone())
    }

    fn columns(&self, record: &Record) -> Result<ColumnMap> {
        let mut columns = ColumnMap::new();
        columns.insert(
            event_key(
                record.require("tenant")?.as_str().unwrap_or_default(),
                record.require("seq")?.as_i64(),
            ),
            record.require("bytes")?.clone(),
        );
        Ok(columns)
    }

    fn key_type(&self) -> &ValueType {
        &self.key_type
    }

    fn column_name_type(&self) -> &ValueType {
        &self.name_type
    }

    fn column_value_type(&self) -> &ValueType {
        &self.value_type
    }
}

fn event_key(tenant: &str, seq: Option<i64>) -> Value {
    let mut key = CompositeValue::new("EventKey").with("tenant", tenant);
    key.set("seq", seq.map(Value::Int64));
    Value::Composite(key)
}

fn event(host: &str, tenant: &str, seq: i64, bytes: i64) -> Record {
    Record::new()
        .with("host", host)
        .with("tenant", tenant)
        .with("seq", seq)
        .with("bytes", bytes)
}

fn event_client() -> (Arc<MemoryStore>, Client) {
    let registry = Arc::new(SerializerRegistry::new());
    registry
        .register_composite(
            CompositeSchema::builder("EventKey")
                .component("tenant", 0, ValueType::Utf8)
                .component("seq", 1, ValueType::Int64)
                .build()
                .unwrap(),
        )
        .unwrap();
    let store = Arc::new(MemoryStore::new("pipeline"));
    let client = Client::connect_with_registry(config(), store.clone(), registry).unwrap();
    (store, client)
}

// =============================================================================
// Connection Tests
// =============================================================================

#[test]
fn test_connect_unknown_keyspace_fails() {
    let store = Arc::new(MemoryStore::new("other"));
    let result = Client::connect(config(), store);
    assert!(matches!(result, Err(BridgeError::Connect(_))));
}

#[test]
fn test_connect_invalid_config_fails() {
    let store = Arc::new(MemoryStore::new("pipeline"));
    let config = Config::builder().keyspace("pipeline").build();
    let result = Client::connect(config, store);
    assert!(matches!(result, Err(BridgeError::Config(_))));
}

#[test]
fn test_connect_store_down_fails() {
    let store = Arc::new(MemoryStore::new("pipeline"));
    store.fail_next(StoreError::Unavailable("no hosts".to_string()));
    let result = Client::connect(config(), store);
    assert!(matches!(result, Err(BridgeError::Connect(_))));
}

#[test]
fn test_stop_shuts_store_down() {
    let (store, client) = setup();
    client.stop();

    let again = Client::connect(config(), store);
    assert!(matches!(again, Err(BridgeError::Connect(_))));
}

// =============================================================================
// Write and Lookup Tests
// =============================================================================

#[test]
fn test_write_then_lookup_row() {
    let (store, client) = setup();
    let mapper = FieldMapper::new("users", "id");

    client.write_record(&mapper, &user_record("u1", "ada", "london")).unwrap();
    assert_eq!(store.stats().batches, 1);

    let row = client.lookup_row(&mapper, &Record::new().with("id", "u1")).unwrap();
    assert_eq!(row.len(), 2);
    assert_eq!(row.get(&Value::from("name")), Some(&Value::from("ada")));
    assert_eq!(row.get(&Value::from("city")), Some(&Value::from("london")));
}

#[test]
fn test_lookup_missing_row_is_empty() {
    let (_store, client) = setup();
    let mapper = FieldMapper::new("users", "id");

    let row = client.lookup_row(&mapper, &Record::new().with("id", "nobody")).unwrap();
    assert!(row.is_empty());
}

#[test]
fn test_lookup_without_key_is_usage_error() {
    let (_store, client) = setup();
    let mapper = FieldMapper::new("users", "id");

    let err = client.lookup_row(&mapper, &Record::new()).unwrap_err();
    assert!(matches!(err, BridgeError::Usage(UsageError::NullKey)));
}

#[test]
fn test_lookup_columns_skips_missing() {
    let (store, client) = setup();
    let mapper = FieldMapper::new("users", "id");
    client.write_record(&mapper, &user_record("u1", "ada", "london")).unwrap();

    let columns = [Value::from("name"), Value::from("email")];
    let found = client
        .lookup_columns(&mapper, &Record::new().with("id", "u1"), &columns)
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found.get(&Value::from("name")), Some(&Value::from("ada")));
    assert_eq!(store.stats().reads, 2);
}

#[test]
fn test_empty_column_name_lookups() {
    let (_store, client) = setup();
    let mapper = FieldMapper::new("users", "id");
    let record = user_record("u1", "ada", "london").with("", "blank");
    client.write_record(&mapper, &record).unwrap();
    let row = Record::new().with("id", "u1");

    let found = client.lookup_columns(&mapper, &row, &[Value::from("")]).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found.get(&Value::from("")), Some(&Value::from("blank")));

    let between = client
        .lookup_range(&mapper, &row, Some(&Value::from("b")), Some(&Value::from("")), None)
        .unwrap()
        .unwrap();
    assert!(between.is_empty());
}

#[test]
fn test_write_records_is_one_batch() {
    let (store, client) = setup();
    let mapper = FieldMapper::new("users", "id");
    let records = vec![
        user_record("u1", "ada", "london"),
        user_record("u2", "alan", "wilmslow"),
        user_record("u3", "grace", "arlington"),
    ];

    client.write_records(&mapper, &records).unwrap();

    assert_eq!(store.stats().batches, 1);
    assert_eq!(store.column_count("users", b"u2"), 2);
}

#[test]
fn test_empty_write_is_not_submitted() {
    let (store, client) = setup();
    let mapper = FieldMapper::new("users", "id");

    client.write_records(&mapper, &[]).unwrap();
    client.write_record(&mapper, &Record::new().with("id", "u1")).unwrap();

    assert_eq!(store.stats().batches, 0);
}

#[test]
fn test_delete_flag_removes_columns() {
    let (store, client) = setup();
    let mapper = FieldMapper::new("users", "id").delete_flag("deleted");

    client.write_record(&mapper, &user_record("u1", "ada", "london")).unwrap();
    assert_eq!(store.column_count("users", b"u1"), 2);

    let tombstone = Record::new()
        .with("id", "u1")
        .with("city", "")
        .with("deleted", true);
    client.write_record(&mapper, &tombstone).unwrap();

    let row = client.lookup_row(&mapper, &Record::new().with("id", "u1")).unwrap();
    assert_eq!(row.len(), 1);
    assert!(row.contains_key(&Value::from("name")));
}

#[test]
fn test_typed_values_round_trip() {
    let (_store, client) = setup();
    let mapper = FieldMapper::new("scores", "player")
        .key_type(ValueType::Utf8)
        .value_type(ValueType::Int64)
        .columns(["round1", "round2"]);

    let record = Record::new()
        .with("player", "p1")
        .with("round1", 17i64)
        .with("round2", -4i64)
        .with("ignored", 99i64);
    client.write_record(&mapper, &record).unwrap();

    let row = client.lookup_row(&mapper, &Record::new().with("player", "p1")).unwrap();
    assert_eq!(row.len(), 2);
    assert_eq!(row.get(&Value::from("round2")), Some(&Value::Int64(-4)));
}

// =============================================================================
// Range Lookup Tests
// =============================================================================

#[test]
fn test_range_without_start_skips_store() {
    let (store, client) = event_client();
    let mapper = EventMapper::new();
    let end = event_key("acme", Some(10));

    let result = client
        .lookup_range(&mapper, &Record::new().with("host", "h1"), None, Some(&end), None)
        .unwrap();

    assert!(result.is_none());
    assert_eq!(store.stats().reads, 0);
}

#[test]
fn test_composite_range_lookup() {
    let (_store, client) = event_client();
    let mapper = EventMapper::new();
    let records = vec![
        event("h1", "acme", 1, 100),
        event("h1", "acme", 5, 500),
        event("h1", "acme", 9, 900),
        event("h1", "zeta", 5, 50),
    ];
    client.write_records(&mapper, &records).unwrap();

    let row = Record::new().with("host", "h1");
    let found = client
        .lookup_range(
            &mapper,
            &row,
            Some(&event_key("acme", Some(2))),
            Some(&event_key("acme", Some(9))),
            Some(BoundaryMode::GreaterThanEqualLessThanEqual),
        )
        .unwrap()
        .unwrap();

    let values: Vec<&Value> = found.values().collect();
    assert_eq!(values, vec![&Value::Int64(500), &Value::Int64(900)]);
}

#[test]
fn test_prefix_only_range_selects_tenant() {
    let (_store, client) = event_client();
    let mapper = EventMapper::new();
    let records = vec![
        event("h1", "acme", 1, 100),
        event("h1", "acme", 2, 200),
        event("h1", "beta", 1, 10),
    ];
    client.write_records(&mapper, &records).unwrap();

    let bound = event_key("acme", None);
    let found = client
        .lookup_range(&mapper, &Record::new().with("host", "h1"), Some(&bound), Some(&bound), None)
        .unwrap()
        .unwrap();

    assert_eq!(found.len(), 2);
    for key in found.keys() {
        let tenant = key.as_composite().and_then(|c| c.get("tenant"));
        assert_eq!(tenant, Some(&Value::from("acme")));
    }
}

// =============================================================================
// Counter Tests
// =============================================================================

#[test]
fn test_counters_accumulate() {
    let (store, client) = setup();
    let mapper = FieldCounterMapper::new("page_views", "site", ["page"]);

    let records: Vec<Record> = (0..3)
        .map(|_| Record::new().with("site", "example.org").with("page", "/home"))
        .collect();
    client.increment_counters_batch(&mapper, &records).unwrap();
    assert_eq!(store.stats().batches, 1);

    let count = client.read_counter("page_views", "example.org", "/home").unwrap();
    assert_eq!(count, Some(3));
    assert_eq!(client.read_counter("page_views", "example.org", "/about").unwrap(), None);
}

#[test]
fn test_counter_increment_from_field() {
    let (_store, client) = setup();
    let mapper = FieldCounterMapper::new("bytes_by_status", "host", ["status"])
        .increment(Increment::Field("bytes".to_string()));

    for bytes in [100i64, 250] {
        let record = Record::new()
            .with("host", "h1")
            .with("status", 200i32)
            .with("bytes", bytes);
        client.increment_counters(&mapper, &record).unwrap();
    }

    assert_eq!(client.read_counter("bytes_by_status", "h1", "200").unwrap(), Some(350));
}

#[test]
fn test_counter_overflow_wraps() {
    let (_store, client) = setup();
    let mapper = FieldCounterMapper::new("totals", "site", ["page"]).increment(Increment::Fixed(i64::MAX));
    let record = Record::new().with("site", "s1").with("page", "/");

    client.increment_counters(&mapper, &record).unwrap();
    client.increment_counters(&mapper, &record).unwrap();

    assert_eq!(client.read_counter("totals", "s1", "/").unwrap(), Some(-2));
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_store_error_propagates() {
    let (store, client) = setup();
    let mapper = FieldMapper::new("users", "id");

    store.fail_next(StoreError::Timeout("read timed out".to_string()));
    let err = client.lookup_row(&mapper, &Record::new().with("id", "u1")).unwrap_err();
    assert!(matches!(err, BridgeError::Store(StoreError::Timeout(_))));
}

#[test]
fn test_failed_write_leaves_row_untouched() {
    let (store, client) = setup();
    let mapper = FieldMapper::new("users", "id");

    store.fail_next(StoreError::Unavailable("coordinator down".to_string()));
    assert!(client.write_record(&mapper, &user_record("u1", "ada", "london")).is_err());
    assert_eq!(store.column_count("users", b"u1"), 0);
}

#[test]
fn test_decode_failure_aborts_lookup() {
    let (_store, client) = setup();
    let writer = FieldMapper::new("users", "id");
    client.write_record(&writer, &user_record("u1", "ada", "london")).unwrap();

    let reader = FieldMapper::new("users", "id").value_type(ValueType::Int64);
    let err = client.lookup_row(&reader, &Record::new().with("id", "u1")).unwrap_err();
    assert!(matches!(err, BridgeError::Encoding(_)));
}

#[test]
fn test_wrong_value_type_on_write_is_usage_error() {
    let (store, client) = setup();
    let mapper = FieldMapper::new("users", "id").value_type(ValueType::Int64);

    let err = client.write_record(&mapper, &user_record("u1", "ada", "london")).unwrap_err();
    assert!(matches!(err, BridgeError::Usage(UsageError::TypeMismatch { .. })));
    assert_eq!(store.stats().batches, 0);
}

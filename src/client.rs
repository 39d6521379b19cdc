//! Client Module
//!
//! Row access facade: reads and writes pipeline records through a store
//! client, delegating every encoding decision to the registry and every
//! slice shape to the range builder.
//!
//! ## Responsibilities
//! - Resolve row-key, column-name and value codecs per mapper
//! - Whole-row, column-list and range lookups, decoded into a [`ColumnMap`]
//! - Batched writes, deletes and counter increments
//!
//! ## Failure semantics
//! Store errors surface unchanged as [`BridgeError::Store`]. Nothing is
//! retried. A column that fails to decode fails the whole lookup.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::codec::Codec;
use crate::config::Config;
use crate::error::{BridgeError, Result};
use crate::mapping::{CounterMapper, Record, RecordMapper};
use crate::range::{self, BoundaryMode};
use crate::registry::SerializerRegistry;
use crate::store::{ColumnFamily, MutationBatch, RawColumn, StoreClient};
use crate::types::{ColumnMap, Value, ValueType};

/// Connected facade over one keyspace
///
/// ## Concurrency
/// All methods take `&self`. The registry's caches are the only shared
/// mutable state; each call blocks until the store client answers.
pub struct Client {
    /// Settings used to connect
    config: Config,

    /// Store client every call goes through
    store: Arc<dyn StoreClient>,

    /// Codec lookup shared with callers that declare composite types
    registry: Arc<SerializerRegistry>,
}

impl Client {
    /// Connect with a fresh registry
    pub fn connect(config: Config, store: Arc<dyn StoreClient>) -> Result<Self> {
        Self::connect_with_registry(config, store, Arc::new(SerializerRegistry::new()))
    }

    /// Connect and share an existing registry
    ///
    /// Steps:
    /// 1. Validate config
    /// 2. Describe the keyspace to prove the store answers
    pub fn connect_with_registry(
        config: Config,
        store: Arc<dyn StoreClient>,
        registry: Arc<SerializerRegistry>,
    ) -> Result<Self> {
        config.validate()?;

        if let Err(e) = store.describe_keyspace(&config.keyspace) {
            warn!(
                cluster = %config.cluster_name,
                keyspace = %config.keyspace,
                error = %e,
                "store initialization failed"
            );
            return Err(BridgeError::Connect(format!(
                "keyspace '{}' on cluster '{}': {}",
                config.keyspace, config.cluster_name, e
            )));
        }

        info!(
            cluster = %config.cluster_name,
            keyspace = %config.keyspace,
            seeds = ?config.seeds,
            pool = %config.pool_name,
            "connected"
        );

        Ok(Self {
            config,
            store,
            registry,
        })
    }

    /// Shut the store client down
    pub fn stop(self) {
        self.store.shutdown();
        info!(keyspace = %self.config.keyspace, "stopped");
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Every column of the record's row
    pub fn lookup_row(&self, mapper: &dyn RecordMapper, record: &Record) -> Result<ColumnMap> {
        let (family, row_key) = self.locate(mapper, record)?;
        let value_codec = self.registry.codec_for(mapper.column_value_type())?;

        let columns = self.store.get_row(&family, &row_key)?;
        let mut result = ColumnMap::new();
        decode_into(&family, value_codec.as_ref(), columns, &mut result)?;
        Ok(result)
    }

    /// The named columns of the record's row; missing ones are left out
    ///
    /// One exact slice query per name.
    pub fn lookup_columns(
        &self,
        mapper: &dyn RecordMapper,
        record: &Record,
        columns: &[Value],
    ) -> Result<ColumnMap> {
        let (family, row_key) = self.locate(mapper, record)?;
        let value_codec = self.registry.codec_for(mapper.column_value_type())?;

        let mut result = ColumnMap::new();
        for column in columns {
            let spec = range::exact(column, family.column_codec().as_ref(), &self.registry)?;
            let found = self.store.get_range(&family, &row_key, spec.byte_range())?;
            debug!(column = %column, results = found.len(), "selected column");
            decode_into(&family, value_codec.as_ref(), found, &mut result)?;
        }
        Ok(result)
    }

    /// Columns between `start` and `end`, both inclusive.
    ///
    /// Returns `None` without contacting the store when either bound is
    /// missing.
    pub fn lookup_range(
        &self,
        mapper: &dyn RecordMapper,
        record: &Record,
        start: Option<&Value>,
        end: Option<&Value>,
        mode: Option<BoundaryMode>,
    ) -> Result<Option<ColumnMap>> {
        if start.is_none() || end.is_none() {
            debug!("range lookup without both bounds");
            return Ok(None);
        }

        let (family, row_key) = self.locate(mapper, record)?;
        let value_codec = self.registry.codec_for(mapper.column_value_type())?;
        let spec = range::build_range(start, end, mode, family.column_codec().as_ref(), &self.registry)?;

        let columns = self.store.get_range(&family, &row_key, spec.byte_range())?;
        let mut result = ColumnMap::new();
        decode_into(&family, value_codec.as_ref(), columns, &mut result)?;
        Ok(Some(result))
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Write (or delete) the record's columns in one batch
    pub fn write_record(&self, mapper: &dyn RecordMapper, record: &Record) -> Result<()> {
        self.write_records(mapper, std::slice::from_ref(record))
    }

    /// Write (or delete) the columns of every record in one batch
    pub fn write_records(&self, mapper: &dyn RecordMapper, records: &[Record]) -> Result<()> {
        let value_codec = self.registry.codec_for(mapper.column_value_type())?;
        let mut batch = MutationBatch::new();

        for record in records {
            let (family, row_key) = self.locate(mapper, record)?;
            let columns = mapper.columns(record)?;
            let delete = mapper.should_delete(record);

            for (name, value) in &columns {
                let column = family.column_codec().encode(name)?;
                if delete {
                    batch.delete(&family, row_key.clone(), column);
                } else {
                    batch.put(&family, row_key.clone(), column, value_codec.encode(value)?);
                }
            }
        }

        self.submit(batch)
    }

    /// Bump the record's counter columns in one batch
    pub fn increment_counters(&self, mapper: &dyn CounterMapper, record: &Record) -> Result<()> {
        self.increment_counters_batch(mapper, std::slice::from_ref(record))
    }

    /// Bump the counter columns of every record in one batch
    pub fn increment_counters_batch(&self, mapper: &dyn CounterMapper, records: &[Record]) -> Result<()> {
        let utf8 = self.registry.codec_for(&ValueType::Utf8)?;
        let mut batch = MutationBatch::new();

        for record in records {
            let family = ColumnFamily::new(mapper.column_family(record)?, utf8.clone(), utf8.clone());
            let row_key = utf8.encode(&Value::Text(mapper.row_key(record)?))?;
            let amount = mapper.increment_amount(record)?;

            for column in mapper.counter_columns(record)? {
                batch.increment(&family, row_key.clone(), utf8.encode(&Value::Text(column))?, amount);
            }
        }

        self.submit(batch)
    }

    /// Current value of one counter column
    pub fn read_counter(&self, column_family: &str, row_key: &str, column: &str) -> Result<Option<i64>> {
        let utf8 = self.registry.codec_for(&ValueType::Utf8)?;
        let family = ColumnFamily::new(column_family, utf8.clone(), utf8.clone());
        let row_key = utf8.encode(&Value::from(row_key))?;
        let column = utf8.encode(&Value::from(column))?;
        Ok(self.store.get_counter(&family, &row_key, &column)?)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn registry(&self) -> &Arc<SerializerRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Column family descriptor and encoded row key for a record
    fn locate(&self, mapper: &dyn RecordMapper, record: &Record) -> Result<(ColumnFamily, Bytes)> {
        let family = ColumnFamily::new(
            mapper.column_family(record)?,
            self.registry.codec_for(mapper.key_type())?,
            self.registry.codec_for(mapper.column_name_type())?,
        );
        let row_key = family.key_codec().encode(&mapper.row_key(record)?)?;
        Ok((family, row_key))
    }

    fn submit(&self, batch: MutationBatch) -> Result<()> {
        if batch.is_empty() {
            debug!("nothing to submit");
            return Ok(());
        }
        debug!(mutations = batch.len(), "submitting batch");
        Ok(self.store.execute_batch(batch)?)
    }
}

/// Decode raw columns with the family's name codec and `value_codec`
fn decode_into(
    family: &ColumnFamily,
    value_codec: &dyn Codec,
    columns: Vec<RawColumn>,
    into: &mut ColumnMap,
) -> Result<()> {
    for column in columns {
        let name = family.column_codec().decode(&column.name)?;
        let value = value_codec.decode(&column.value)?;
        into.insert(name, value);
    }
    Ok(())
}

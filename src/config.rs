//! Configuration for widebridge
//!
//! Connection settings consumed once when a [`Client`](crate::Client) is
//! built. Defaults are explicit values; overrides come from the builder or
//! from a flat property map.

use std::collections::HashMap;

use crate::error::{BridgeError, Result};

// =============================================================================
// Property Keys
// =============================================================================

pub const CLUSTER_NAME_KEY: &str = "cassandra.clusterName";
pub const KEYSPACE_KEY: &str = "cassandra.keyspace";
pub const SEEDS_KEY: &str = "cassandra.host";
pub const POOL_NAME_KEY: &str = "cassandra.pool.name";
pub const MAX_CONNS_PER_HOST_KEY: &str = "cassandra.pool.maxConnsPerHost";
pub const DISCOVERY_KEY: &str = "cassandra.discovery";

/// Main configuration for a store connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Cluster Configuration
    // -------------------------------------------------------------------------
    /// Logical name of the cluster
    pub cluster_name: String,

    /// Keyspace every column family lives in
    pub keyspace: String,

    /// Seed hosts (`host:port`)
    pub seeds: Vec<String>,

    /// How the client learns about nodes beyond the seeds
    pub discovery: NodeDiscovery,

    // -------------------------------------------------------------------------
    // Pool Configuration
    // -------------------------------------------------------------------------
    /// Connection pool name
    pub pool_name: String,

    /// Max connections held open per host
    pub max_conns_per_host: usize,
}

/// Node discovery strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeDiscovery {
    /// Only talk to the configured seeds
    #[default]
    None,

    /// Ask the ring for its members
    RingDescribe,
}

impl NodeDiscovery {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(NodeDiscovery::None),
            "ring_describe" | "ring" => Ok(NodeDiscovery::RingDescribe),
            other => Err(BridgeError::Config(format!(
                "unknown discovery type '{}'",
                other
            ))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cluster_name: "ClusterName".to_string(),
            keyspace: String::new(),
            seeds: Vec::new(),
            discovery: NodeDiscovery::None,
            pool_name: "MyConnectionPool".to_string(),
            max_conns_per_host: 1,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Overlay a flat property map on the defaults.
    ///
    /// Keys that are absent keep their default; seeds are a comma separated
    /// host list.
    pub fn from_properties(props: &HashMap<String, String>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(name) = props.get(CLUSTER_NAME_KEY) {
            builder = builder.cluster_name(name.as_str());
        }
        if let Some(keyspace) = props.get(KEYSPACE_KEY) {
            builder = builder.keyspace(keyspace.as_str());
        }
        if let Some(hosts) = props.get(SEEDS_KEY) {
            builder = builder.seeds(parse_seeds(hosts));
        }
        if let Some(pool) = props.get(POOL_NAME_KEY) {
            builder = builder.pool_name(pool.as_str());
        }
        if let Some(raw) = props.get(MAX_CONNS_PER_HOST_KEY) {
            let count = raw.trim().parse::<usize>().map_err(|e| {
                BridgeError::Config(format!("{} '{}': {}", MAX_CONNS_PER_HOST_KEY, raw, e))
            })?;
            builder = builder.max_conns_per_host(count);
        }
        if let Some(raw) = props.get(DISCOVERY_KEY) {
            builder = builder.discovery(NodeDiscovery::parse(raw)?);
        }

        Ok(builder.build())
    }

    /// Check the settings a connection cannot do without
    pub fn validate(&self) -> Result<()> {
        if self.cluster_name.trim().is_empty() {
            return Err(BridgeError::Config("cluster name is empty".to_string()));
        }
        if self.keyspace.trim().is_empty() {
            return Err(BridgeError::Config("keyspace is not set".to_string()));
        }
        if self.seeds.is_empty() {
            return Err(BridgeError::Config("no seed hosts configured".to_string()));
        }
        if self.max_conns_per_host == 0 {
            return Err(BridgeError::Config(
                "max connections per host must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_seeds(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(str::to_string)
        .collect()
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the cluster name
    pub fn cluster_name(mut self, name: impl Into<String>) -> Self {
        self.config.cluster_name = name.into();
        self
    }

    /// Set the keyspace
    pub fn keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.config.keyspace = keyspace.into();
        self
    }

    /// Replace the seed host list
    pub fn seeds<I, S>(mut self, seeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.seeds = seeds.into_iter().map(Into::into).collect();
        self
    }

    /// Add one seed host
    pub fn seed(mut self, host: impl Into<String>) -> Self {
        self.config.seeds.push(host.into());
        self
    }

    /// Set the node discovery strategy
    pub fn discovery(mut self, discovery: NodeDiscovery) -> Self {
        self.config.discovery = discovery;
        self
    }

    /// Set the connection pool name
    pub fn pool_name(mut self, name: impl Into<String>) -> Self {
        self.config.pool_name = name.into();
        self
    }

    /// Set the max connections per host
    pub fn max_conns_per_host(mut self, count: usize) -> Self {
        self.config.max_conns_per_host = count;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

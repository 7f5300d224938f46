//! # Node Configuration
//!
//! Defaults overridden from `QC_*` environment variables.
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `QC_API_HOST` | `api.http.host` | `0.0.0.0` |
//! | `QC_API_PORT` | `api.http.port` | `54320` |
//! | `QC_BLOCK_INTERVAL_MS` | `block.interval_ms` | `1000` |
//! | `QC_MAX_OPERATIONS_PER_BLOCK` | `block.max_operations_per_block` | `1000` |
//! | `QC_POOL_CAPACITY` | `pool.capacity` | `10000` |
//! | `QC_GENESIS_FILE` | `genesis_file` | none |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use qc_16_api_gateway::{ConfigError as GatewayConfigError, GatewayConfig};
use qc_18_token_model::service::ServiceConfig;
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeConfig {
    /// API Gateway configuration.
    pub api: GatewayConfig,
    /// Block production configuration.
    pub block: BlockConfig,
    /// Operation pool configuration.
    pub pool: PoolConfig,
    /// JSON genesis file seeded at height 0.
    pub genesis_file: Option<PathBuf>,
}

impl NodeConfig {
    /// Defaults overridden from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden from `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(host) = parse_var(&lookup, "QC_API_HOST")? {
            config.api.http.host = host;
        }
        if let Some(port) = parse_var(&lookup, "QC_API_PORT")? {
            config.api.http.port = port;
        }
        if let Some(ms) = parse_var(&lookup, "QC_BLOCK_INTERVAL_MS")? {
            config.block.interval_ms = ms;
        }
        if let Some(max) = parse_var(&lookup, "QC_MAX_OPERATIONS_PER_BLOCK")? {
            config.block.max_operations_per_block = max;
        }
        if let Some(capacity) = parse_var(&lookup, "QC_POOL_CAPACITY")? {
            config.pool.capacity = capacity;
        }
        if let Some(path) = lookup("QC_GENESIS_FILE").filter(|p| !p.is_empty()) {
            config.genesis_file = Some(PathBuf::from(path));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()?;
        if self.block.interval_ms == 0 {
            return Err(ConfigError::Invalid("block interval cannot be 0".into()));
        }
        if self.block.max_operations_per_block == 0 {
            return Err(ConfigError::Invalid(
                "max operations per block cannot be 0".into(),
            ));
        }
        if self.pool.capacity == 0 {
            return Err(ConfigError::Invalid("pool capacity cannot be 0".into()));
        }
        Ok(())
    }

    /// Settings handed to the token block service.
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            max_operations_per_block: self.block.max_operations_per_block,
        }
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidVar {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

/// Block production configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockConfig {
    /// Time between block attempts in milliseconds.
    pub interval_ms: u64,
    /// Operations drained from the pool per block.
    pub max_operations_per_block: usize,
}

impl BlockConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_operations_per_block: ServiceConfig::default().max_operations_per_block,
        }
    }
}

/// Operation pool configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Operations held before submissions are refused.
    pub capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { capacity: 10_000 }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key}={value:?} is invalid: {reason}")]
    InvalidVar {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Api(#[from] GatewayConfigError),
}

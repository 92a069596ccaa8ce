//! Store configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via DYNASNAP_CONFIG or --config)
//! 3. Environment variables

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Connection and table settings for a DynamoDB-backed store.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Service endpoint. `None` uses the regional AWS endpoint; set it to
    /// point at DynamoDB Local or another emulator.
    pub endpoint: Option<String>,
    /// Region used for request signing and endpoint resolution.
    pub region: String,
    /// Static access key. When unset, the default AWS provider chain is used.
    pub access_key_id: Option<String>,
    /// Static secret key, required when `access_key_id` is set.
    pub secret_access_key: Option<String>,
    /// Table all snapshots are written to.
    pub table_name: String,
    /// Provisioned throughput applied on table creation.
    pub throughput: ThroughputConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: "us-east-1".to_string(),
            access_key_id: None,
            secret_access_key: None,
            table_name: "snapshots".to_string(),
            throughput: ThroughputConfig::default(),
        }
    }
}

// Keeps the secret key out of logs.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("table_name", &self.table_name)
            .field("throughput", &self.throughput)
            .finish()
    }
}

impl StoreConfig {
    /// Loads configuration from `DYNASNAP_CONFIG` (if set), then applies
    /// environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os("DYNASNAP_CONFIG").map(PathBuf::from);
        Self::load_from(path.as_deref())
    }

    /// Loads configuration from `path` (defaults when `None`), then applies
    /// environment variable overrides.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: StoreConfig = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("DYNASNAP_ENDPOINT") {
            self.endpoint = Some(endpoint).filter(|e| !e.is_empty());
        }

        if let Ok(region) = std::env::var("DYNASNAP_REGION") {
            self.region = region;
        }

        if let Ok(key) = std::env::var("DYNASNAP_ACCESS_KEY_ID") {
            self.access_key_id = Some(key);
        }

        if let Ok(secret) = std::env::var("DYNASNAP_SECRET_ACCESS_KEY") {
            self.secret_access_key = Some(secret);
        }

        if let Ok(table) = std::env::var("DYNASNAP_TABLE") {
            self.table_name = table;
        }

        self.throughput.apply_env_overrides();
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "table_name must not be empty".to_string(),
            ));
        }
        if self.region.trim().is_empty() {
            return Err(ConfigError::Validation(
                "region must not be empty".to_string(),
            ));
        }
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(_), None) => Err(ConfigError::Validation(
                "access_key_id set but secret_access_key missing".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::Validation(
                "secret_access_key set but access_key_id missing".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Returns the static credentials pair, if configured.
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(key), Some(secret)) => Some((key.as_str(), secret.as_str())),
            _ => None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Ok(())
    }
}

/// Provisioned read/write capacity for a new table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThroughputConfig {
    pub read_capacity_units: i64,
    pub write_capacity_units: i64,
}

impl Default for ThroughputConfig {
    fn default() -> Self {
        Self {
            read_capacity_units: 5,
            write_capacity_units: 5,
        }
    }
}

impl ThroughputConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(units) = std::env::var("DYNASNAP_READ_CAPACITY") {
            if let Ok(n) = units.parse() {
                self.read_capacity_units = n;
            }
        }

        if let Ok(units) = std::env::var("DYNASNAP_WRITE_CAPACITY") {
            if let Ok(n) = units.parse() {
                self.write_capacity_units = n;
            }
        }
    }
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file '{}': {}", .0.display(), .1)]
    Parse(PathBuf, String),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}

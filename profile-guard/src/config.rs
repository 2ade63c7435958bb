//! Configuration for profile-guard.
//!
//! Everything has a default, so a JSON document only needs the keys it
//! changes:
//!
//! ```rust
//! use profile_guard::config::ProfilerConfig;
//!
//! let config = ProfilerConfig::from_json_str(r#"{"query": {"batch_size": 1024}}"#).unwrap();
//! assert_eq!(config.query.batch_size, 1024);
//! ```

use crate::error::{ProfileError, Result};
use crate::logging::setup::LoggingConfig;
use crate::logging::LogConfig;
use datafusion::execution::context::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for sessions created by [`QueryBackend::with_config`](crate::backend::QueryBackend::with_config).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Batch size for query execution
    pub batch_size: usize,
    /// Target number of partitions for parallel execution
    pub target_partitions: usize,
    /// Whether to expose `information_schema` tables
    pub information_schema: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            batch_size: 8192,
            target_partitions: num_cpus::get(),
            information_schema: true,
        }
    }
}

impl QueryConfig {
    /// Builds the DataFusion session configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new()
            .with_batch_size(self.batch_size)
            .with_target_partitions(self.target_partitions)
            .with_information_schema(self.information_schema)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    pub query: QueryConfig,
    /// Runtime logging knobs for checks
    pub log: LogConfig,
    /// Global subscriber setup
    pub logging: LoggingConfig,
}

impl ProfilerConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Rejects settings DataFusion cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.query.batch_size == 0 {
            return Err(ProfileError::Configuration(
                "query.batch_size must be greater than zero".to_string(),
            ));
        }
        if self.query.target_partitions == 0 {
            return Err(ProfileError::Configuration(
                "query.target_partitions must be greater than zero".to_string(),
            ));
        }
        if self.log.max_field_length == 0 {
            return Err(ProfileError::Configuration(
                "log.max_field_length must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

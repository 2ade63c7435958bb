//! Logging utilities and configuration for profile-guard.
//!
//! Evaluation entry points carry `tracing` spans. [`LogConfig`] decides which
//! groups of events checks log at runtime; [`setup`] installs a subscriber for
//! applications that do not bring their own.

use serde::{Deserialize, Serialize};

/// Serde support for [`tracing::Level`], stored as its lowercase name.
pub(crate) mod level_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S: Serializer>(level: &Level, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&level.as_str().to_lowercase())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Level, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Level::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

/// Runtime logging knobs for checks.
///
/// Verbosity itself is left to the subscriber filter, see
/// [`setup::LoggingConfig`]. These flags switch whole groups of events on or
/// off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Whether to log which type and capability made a metric fall back to
    /// its neutral output
    pub log_capability_details: bool,
    /// Whether to log backend reads
    pub log_data_operations: bool,
    /// Whether to log test cases that did not succeed
    pub log_test_outcomes: bool,
    /// Maximum length for logged field values
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_capability_details: false,
            log_data_operations: true,
            log_test_outcomes: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Creates a verbose configuration suitable for debugging.
    pub fn verbose() -> Self {
        Self {
            log_capability_details: true,
            log_data_operations: true,
            log_test_outcomes: true,
            max_field_length: 1024,
        }
    }

    /// Creates a minimal configuration for production.
    pub fn production() -> Self {
        Self {
            log_capability_details: false,
            log_data_operations: false,
            log_test_outcomes: true,
            max_field_length: 128,
        }
    }

    /// Truncates a value to this configuration's field length.
    pub fn field(&self, value: &str) -> String {
        truncate_field(value, self.max_field_length)
    }
}

/// Logs a capability rejection at debug level when the config asks for it.
#[macro_export]
macro_rules! log_capability {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_capability_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Logs a test case that did not succeed at info level when the config
/// asks for it.
#[macro_export]
macro_rules! log_test_outcome {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_test_outcomes {
            tracing::info!($($arg)*);
        }
    };
}

/// Logs a backend read at info level when the config asks for it.
#[macro_export]
macro_rules! log_data_op {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_data_operations {
            tracing::info!($($arg)*);
        }
    };
}

/// Truncates a string to at most `max_length` characters.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    match value.char_indices().nth(max_length) {
        None => value.to_string(),
        Some((end, _)) => format!("{}...(truncated)", &value[..end]),
    }
}

/// Subscriber setup for applications.
pub mod setup {
    use super::level_serde;
    use crate::error::{ProfileError, Result};
    use serde::{Deserialize, Serialize};
    use tracing::Level;

    /// Configuration for the global subscriber.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct LoggingConfig {
        /// Log level for everything else
        #[serde(with = "level_serde")]
        pub level: Level,
        /// Log level for profile-guard components
        #[serde(with = "level_serde")]
        pub crate_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                crate_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// Creates a configuration for production use.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                crate_level: Level::INFO,
                json_format: true,
                env_filter: None,
            }
        }

        /// Creates a configuration for development use.
        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                crate_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        pub fn with_crate_level(mut self, level: Level) -> Self {
            self.crate_level = level;
            self
        }

        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter directive string.
        pub fn env_filter(&self) -> String {
            match self.env_filter {
                Some(ref filter) => filter.clone(),
                None => format!(
                    "{},profile_guard={}",
                    self.level.as_str().to_lowercase(),
                    self.crate_level.as_str().to_lowercase()
                ),
            }
        }
    }

    /// Installs the global subscriber.
    ///
    /// `RUST_LOG` wins over the configured filter when set. Fails if a
    /// global subscriber is already installed.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use profile_guard::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(config.env_filter()))
            .map_err(|e| ProfileError::Configuration(format!("invalid log filter: {e}")))?;

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer().json().boxed()
        } else {
            tracing_subscriber::fmt::layer().boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| ProfileError::Configuration(format!("logging already initialized: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::setup::LoggingConfig;
    use super::*;
    use tracing::Level;

    #[test]
    fn test_log_config_presets() {
        let config = LogConfig::default();
        assert!(!config.log_capability_details);
        assert!(config.log_test_outcomes);
        assert_eq!(config.max_field_length, 256);

        let verbose = LogConfig::verbose();
        assert!(verbose.log_capability_details);

        let production = LogConfig::production();
        assert!(!production.log_data_operations);
        assert!(!production.log_capability_details);
        assert_eq!(production.max_field_length, 128);
    }

    #[test]
    fn test_truncate_field() {
        assert_eq!(truncate_field("hello", 10), "hello");
        assert_eq!(
            truncate_field("this is a very long text", 10),
            "this is a ...(truncated)"
        );
        assert_eq!(truncate_field("héllo wörld", 5), "héllo...(truncated)");
        assert_eq!(LogConfig::production().field("short"), "short");
    }

    #[test]
    fn test_env_filter() {
        assert_eq!(LoggingConfig::default().env_filter(), "info,profile_guard=debug");
        assert_eq!(
            LoggingConfig::production().env_filter(),
            "warn,profile_guard=info"
        );
        assert_eq!(
            LoggingConfig::default()
                .with_env_filter("profile_guard=trace")
                .env_filter(),
            "profile_guard=trace"
        );
    }

    #[test]
    fn test_levels_serialize_by_name() {
        let json = serde_json::to_string(&LoggingConfig::development()).unwrap();
        assert!(json.contains("\"level\":\"debug\""));

        let config: LoggingConfig =
            serde_json::from_str(r#"{"level": "warn", "json_format": true}"#).unwrap();
        assert_eq!(config.level, Level::WARN);
        assert_eq!(config.crate_level, Level::DEBUG);
        assert!(config.json_format);

        assert!(serde_json::from_str::<LoggingConfig>(r#"{"level": "loud"}"#).is_err());
    }
}

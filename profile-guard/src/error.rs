//! Error types for profile-guard.
//!
//! Every fallible operation in the crate returns [`ProfileError`]. Type
//! capability mismatches are not represented here: they are recovered
//! locally into neutral metric outputs.

use thiserror::Error;

/// The main error type for profile-guard.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// The observation a check needs could not be obtained at all.
    ///
    /// This is distinct from a check failing: the check cannot be evaluated.
    #[error("Data unavailable for '{check}': {message}")]
    DataUnavailable {
        /// Name of the check or test case that needed the data
        check: String,
        /// Detailed error message
        message: String,
    },

    /// A check that cannot degrade gracefully was pointed at a column whose
    /// type does not support it.
    #[error("Column '{column}' of type {data_type} is not supported by '{check}'")]
    UnsupportedType {
        /// Name of the check or test case
        check: String,
        /// Column the check targeted
        column: String,
        /// Declared type of that column
        data_type: String,
    },

    /// Error when a required column is not found in the table.
    #[error("Column '{column}' not found in table")]
    ColumnNotFound { column: String },

    /// A test case parameter is missing or could not be parsed.
    #[error("Invalid parameter '{parameter}' for '{check}': {message}")]
    InvalidParameter {
        /// Name of the test case
        check: String,
        /// Parameter key
        parameter: String,
        /// What was wrong with it
        message: String,
    },

    /// Error from DataFusion query planning or execution.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Security-related error, e.g. an identifier unsafe to put in SQL.
    #[error("Security error: {0}")]
    Security(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, ProfileError>`.
pub type Result<T> = std::result::Result<T, ProfileError>;

impl ProfileError {
    /// Creates a new data unavailable error.
    pub fn data_unavailable(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataUnavailable {
            check: check.into(),
            message: message.into(),
        }
    }

    /// Creates a new invalid parameter error.
    pub fn invalid_parameter(
        check: impl Into<String>,
        parameter: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            check: check.into(),
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Returns true when the error means a check could not be evaluated,
    /// as opposed to the backend itself failing.
    ///
    /// Validators turn these into errored results; everything else is
    /// propagated to the caller unchanged.
    pub fn is_evaluation_error(&self) -> bool {
        matches!(
            self,
            Self::DataUnavailable { .. }
                | Self::UnsupportedType { .. }
                | Self::ColumnNotFound { .. }
                | Self::InvalidParameter { .. }
        )
    }
}

impl From<serde_json::Error> for ProfileError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<ProfileError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.with_context(|| msg.to_string())
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| match e.into() {
            ProfileError::Internal(inner) => ProfileError::Internal(format!("{}: {inner}", f())),
            ProfileError::Configuration(inner) => {
                ProfileError::Configuration(format!("{}: {inner}", f()))
            }
            other => ProfileError::Internal(format!("{}: {other}", f())),
        })
    }
}

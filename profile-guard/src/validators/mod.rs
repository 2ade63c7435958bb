//! Test case validators.
//!
//! A [`Validator`] reads what it needs through [`TableAccess`], so the same
//! validator runs against either backend. [`Validator::run`] turns
//! evaluation errors (no data, missing column, bad parameter, unsupported
//! type) into errored [`TestCaseResult`]s; backend failures are returned as
//! `Err`.
//!
//! ## Example
//!
//! ```rust
//! use profile_guard::backend::MaterializedTable;
//! use profile_guard::core::TestCase;
//! use profile_guard::validators::{TableColumnNameToExist, Validator};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let table = MaterializedTable::empty("events");
//! let test_case = TestCase::new("check_cols", "events").with_parameter("columnName", "id");
//!
//! let result = TableColumnNameToExist.run(&table, &test_case).await.unwrap();
//! assert!(result.status.is_error());
//! assert!(result.observation.is_none());
//! assert!(result.message.unwrap().contains("check_cols"));
//! # });
//! ```

mod column_count;
mod column_values;
mod table_column;

pub use column_count::TableColumnCountToEqual;
pub use column_values::{ColumnValueLengthsToBeBetween, ColumnValuesToBeNotNull};
pub use table_column::{TableColumnNameToExist, TableColumnToMatchSet};

use crate::backend::TableAccess;
use crate::core::{Column, TestCase, TestCaseResult};
use crate::error::{ProfileError, Result};
use crate::logging::LogConfig;
use crate::{log_data_op, log_test_outcome};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt::Debug;
use tracing::{instrument, warn};

/// A named assertion over a table or one of its columns.
#[async_trait]
pub trait Validator: Debug + Send + Sync {
    /// Stable identifier, e.g. `tableColumnNameToExist`.
    fn name(&self) -> &'static str;

    /// Observes the table and compares the observation with the test case.
    ///
    /// Implementations return evaluation errors as `Err`; [`Validator::run`]
    /// decides what becomes an errored result.
    async fn validate(
        &self,
        access: &dyn TableAccess,
        test_case: &TestCase,
    ) -> Result<TestCaseResult>;

    /// Runs the test case.
    ///
    /// Evaluation errors become an errored result naming the test case.
    /// So does a test case aimed at another table than the one `access`
    /// reads. Backend failures propagate.
    #[instrument(skip_all, fields(validator = self.name(), test_case = test_case.name(), table = access.table_name()))]
    async fn run(&self, access: &dyn TableAccess, test_case: &TestCase) -> Result<TestCaseResult> {
        let outcome = match same_table(access, test_case) {
            Ok(()) => self.validate(access, test_case).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(result) => Ok(result),
            Err(e) if e.is_evaluation_error() => {
                warn!(error = %e, "test case could not be evaluated");
                Ok(TestCaseResult::errored(
                    test_case.name(),
                    format!("Test case '{}' could not be evaluated: {e}", test_case.name()),
                ))
            }
            Err(e) => Err(e),
        }
    }
}

/// Fails when the test case names another table than the backend reads.
fn same_table(access: &dyn TableAccess, test_case: &TestCase) -> Result<()> {
    if test_case.table() == access.table_name() {
        return Ok(());
    }
    Err(ProfileError::invalid_parameter(
        test_case.name(),
        "table",
        format!(
            "test case targets table '{}' but the backend reads '{}'",
            test_case.table(),
            access.table_name()
        ),
    ))
}

/// Column names of the table, failing when there are none.
pub(crate) async fn column_names(
    access: &dyn TableAccess,
    test_case: &TestCase,
) -> Result<Vec<String>> {
    let names = access.columns().await?;
    if names.is_empty() {
        return Err(ProfileError::data_unavailable(
            test_case.name(),
            format!(
                "Column names for test case {} returned no columns",
                test_case.name()
            ),
        ));
    }
    Ok(names)
}

/// The column a column-level test case targets.
pub(crate) async fn target_column(
    access: &dyn TableAccess,
    test_case: &TestCase,
) -> Result<Column> {
    access.column(test_case.column()?).await
}

/// Validators by name.
///
/// # Examples
///
/// ```rust
/// use profile_guard::validators::ValidatorRegistry;
///
/// let registry = ValidatorRegistry::new();
/// assert!(registry.get("columnValuesToBeNotNull").is_some());
/// assert!(registry.get("columnValuesToBeUnique").is_none());
/// ```
#[derive(Debug)]
pub struct ValidatorRegistry {
    validators: BTreeMap<&'static str, Box<dyn Validator>>,
    log: LogConfig,
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidatorRegistry {
    /// Creates a registry with every built-in validator.
    pub fn new() -> Self {
        let mut registry = Self {
            validators: BTreeMap::new(),
            log: LogConfig::default(),
        };
        registry.register(Box::new(TableColumnNameToExist));
        registry.register(Box::new(TableColumnCountToEqual));
        registry.register(Box::new(TableColumnToMatchSet));
        registry.register(Box::new(ColumnValuesToBeNotNull));
        registry.register(Box::new(ColumnValueLengthsToBeBetween));
        registry
    }

    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Adds a validator, replacing any with the same name.
    pub fn register(&mut self, validator: Box<dyn Validator>) {
        self.validators.insert(validator.name(), validator);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Validator> {
        self.validators.get(name).map(Box::as_ref)
    }

    /// Registered validator names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.validators.keys().copied().collect()
    }

    /// Runs the named validator.
    ///
    /// An unknown validator is a configuration error, not an errored result.
    pub async fn run(
        &self,
        validator: &str,
        access: &dyn TableAccess,
        test_case: &TestCase,
    ) -> Result<TestCaseResult> {
        let found = self.get(validator).ok_or_else(|| {
            ProfileError::Configuration(format!("unknown validator '{validator}'"))
        })?;

        log_data_op!(
            self.log,
            validator = validator,
            test_case = test_case.name(),
            backend = %access.kind(),
            "running test case"
        );
        let result = found.run(access, test_case).await?;
        if let Some(message) = &result.message {
            log_test_outcome!(
                self.log,
                test_case = test_case.name(),
                status = ?result.status,
                message = %self.log.field(message),
                "test case did not succeed"
            );
        }
        Ok(result)
    }
}

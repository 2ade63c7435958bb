//! Column count validation.

use super::Validator;
use crate::backend::TableAccess;
use crate::core::{Observation, TestCase, TestCaseResult};
use crate::error::Result;
use async_trait::async_trait;
use tracing::instrument;

/// `tableColumnCountToEqual`: the table has exactly `columnCount` columns.
///
/// Unlike the name-based validators, a table without columns is a valid
/// observation of zero.
///
/// # Examples
///
/// ```rust
/// use profile_guard::validators::{TableColumnCountToEqual, Validator};
///
/// assert_eq!(TableColumnCountToEqual.name(), "tableColumnCountToEqual");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TableColumnCountToEqual;

#[async_trait]
impl Validator for TableColumnCountToEqual {
    fn name(&self) -> &'static str {
        "tableColumnCountToEqual"
    }

    #[instrument(skip_all, fields(test_case = test_case.name()))]
    async fn validate(
        &self,
        access: &dyn TableAccess,
        test_case: &TestCase,
    ) -> Result<TestCaseResult> {
        let expected: i64 = test_case.required_parameter("columnCount")?;
        let count = i64::try_from(access.columns().await?.len()).unwrap_or(i64::MAX);

        Ok(TestCaseResult::from_outcome(
            test_case.name(),
            count == expected,
            Observation::Count(count),
            || format!("Expected {expected} columns, found {count}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MaterializedTable;
    use crate::core::ResultStatus;
    use crate::test_helpers::{query_backend, users_batch};

    #[tokio::test]
    async fn test_count_matches() {
        let backend = query_backend("users", users_batch()).await;
        let test_case = TestCase::new("count", "users").with_parameter("columnCount", 2);

        let result = TableColumnCountToEqual.run(&backend, &test_case).await.unwrap();
        assert_eq!(result.status, ResultStatus::Success);
        assert_eq!(result.observation, Some(Observation::Count(2)));
    }

    #[tokio::test]
    async fn test_count_mismatch() {
        let table = MaterializedTable::from_batch("users", users_batch());
        let test_case = TestCase::new("count", "users").with_parameter("columnCount", 3);

        let result = TableColumnCountToEqual.run(&table, &test_case).await.unwrap();
        assert_eq!(result.status, ResultStatus::Failure);
        assert_eq!(result.message.as_deref(), Some("Expected 3 columns, found 2"));
    }

    #[tokio::test]
    async fn test_empty_table_counts_zero() {
        let table = MaterializedTable::empty("nothing");
        let test_case = TestCase::new("count", "nothing").with_parameter("columnCount", 0);

        let result = TableColumnCountToEqual.run(&table, &test_case).await.unwrap();
        assert!(result.status.is_success());
        assert_eq!(result.observation, Some(Observation::Count(0)));
    }

    #[tokio::test]
    async fn test_unparsable_count_is_errored() {
        let table = MaterializedTable::from_batch("users", users_batch());
        let test_case = TestCase::new("bad_count", "users").with_parameter("columnCount", "two");

        let result = TableColumnCountToEqual.run(&table, &test_case).await.unwrap();
        assert!(result.status.is_error());
        assert!(result.message.unwrap().contains("bad_count"));
    }
}

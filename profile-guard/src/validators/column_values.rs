//! Validators over the values of one column.
//!
//! Both ask [`TableAccess::aggregate`] for their metrics, so the query
//! backend computes them in the engine and the materialized backend
//! computes them in memory.

use super::{target_column, Validator};
use crate::backend::TableAccess;
use crate::core::{Capability, MetricValue, Observation, TestCase, TestCaseResult};
use crate::error::{ProfileError, Result};
use crate::metrics::{MaxLength, MinLength, NullCount};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// `columnValuesToBeNotNull`: the column has no null values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnValuesToBeNotNull;

#[async_trait]
impl Validator for ColumnValuesToBeNotNull {
    fn name(&self) -> &'static str {
        "columnValuesToBeNotNull"
    }

    #[instrument(skip_all, fields(test_case = test_case.name()))]
    async fn validate(
        &self,
        access: &dyn TableAccess,
        test_case: &TestCase,
    ) -> Result<TestCaseResult> {
        let column = target_column(access, test_case).await?;
        let nulls = access
            .aggregate(&column, &[&NullCount])
            .await?
            .first()
            .cloned()
            .flatten()
            .and_then(|value| value.as_i64())
            .unwrap_or_default();

        Ok(TestCaseResult::from_outcome(
            test_case.name(),
            nulls == 0,
            Observation::Count(nulls),
            || format!("Found {nulls} null values in column '{}'", column.name()),
        ))
    }
}

/// `columnValueLengthsToBeBetween`: every non-null value's length lies in
/// `[minLength, maxLength]`. Either bound may be omitted.
///
/// The observation is the maximum length. Columns whose type has no length
/// cannot be evaluated, and neither can a column without non-null values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnValueLengthsToBeBetween;

#[async_trait]
impl Validator for ColumnValueLengthsToBeBetween {
    fn name(&self) -> &'static str {
        "columnValueLengthsToBeBetween"
    }

    #[instrument(skip_all, fields(test_case = test_case.name()))]
    async fn validate(
        &self,
        access: &dyn TableAccess,
        test_case: &TestCase,
    ) -> Result<TestCaseResult> {
        let lower = test_case.parameter_as::<i64>("minLength")?;
        let upper = test_case.parameter_as::<i64>("maxLength")?;
        if let (Some(lower), Some(upper)) = (lower, upper) {
            if lower > upper {
                return Err(ProfileError::invalid_parameter(
                    test_case.name(),
                    "minLength",
                    format!("{lower} is greater than maxLength {upper}"),
                ));
            }
        }

        let column = target_column(access, test_case).await?;
        if !column.supports(Capability::Length) {
            return Err(ProfileError::UnsupportedType {
                check: test_case.name().to_string(),
                column: column.name().to_string(),
                data_type: column.data_type().to_string(),
            });
        }

        let lengths = access.aggregate(&column, &[&MaxLength, &MinLength]).await?;
        let (longest, shortest) = match lengths.as_slice() {
            [Some(longest), Some(shortest)] => (longest.clone(), shortest.clone()),
            _ => {
                return Err(ProfileError::data_unavailable(
                    test_case.name(),
                    format!("Column '{}' has no non-null values", column.name()),
                ))
            }
        };
        debug!(%longest, %shortest, "observed value lengths");

        let (max, min) = (as_long(&longest), as_long(&shortest));
        let passed =
            lower.map_or(true, |lower| min >= lower) && upper.map_or(true, |upper| max <= upper);

        Ok(TestCaseResult::from_outcome(
            test_case.name(),
            passed,
            Observation::Metric(longest),
            || {
                format!(
                    "Value lengths in column '{}' range from {min} to {max}, expected between {} and {}",
                    column.name(),
                    bound(lower),
                    bound(upper)
                )
            },
        ))
    }
}

fn as_long(value: &MetricValue) -> i64 {
    value.as_i64().unwrap_or_default()
}

fn bound(value: Option<i64>) -> String {
    value.map_or_else(|| "unbounded".to_string(), |v| v.to_string())
}

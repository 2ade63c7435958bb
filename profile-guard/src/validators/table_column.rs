//! Validators over the table's column names.

use super::{column_names, Validator};
use crate::backend::TableAccess;
use crate::core::{Observation, TestCase, TestCaseResult};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;
use tracing::instrument;

/// `tableColumnNameToExist`: the table has a column named `columnName`.
///
/// The observation is the list of column names in table order. A table
/// with no columns cannot be evaluated.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableColumnNameToExist;

#[async_trait]
impl Validator for TableColumnNameToExist {
    fn name(&self) -> &'static str {
        "tableColumnNameToExist"
    }

    #[instrument(skip_all, fields(test_case = test_case.name()))]
    async fn validate(
        &self,
        access: &dyn TableAccess,
        test_case: &TestCase,
    ) -> Result<TestCaseResult> {
        let expected: String = test_case.required_parameter("columnName")?;
        let names = column_names(access, test_case).await?;
        let passed = names.iter().any(|name| *name == expected);

        Ok(TestCaseResult::from_outcome(
            test_case.name(),
            passed,
            Observation::ColumnNames(names),
            || format!("Column '{expected}' not found in table '{}'", access.table_name()),
        ))
    }
}

/// `tableColumnToMatchSet`: the table's columns are exactly `columnNames`.
///
/// `columnNames` is comma separated. With `ordered=true` the order must
/// match as well; otherwise the columns are compared as sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableColumnToMatchSet;

#[async_trait]
impl Validator for TableColumnToMatchSet {
    fn name(&self) -> &'static str {
        "tableColumnToMatchSet"
    }

    #[instrument(skip_all, fields(test_case = test_case.name()))]
    async fn validate(
        &self,
        access: &dyn TableAccess,
        test_case: &TestCase,
    ) -> Result<TestCaseResult> {
        let expected = test_case.list_parameter("columnNames")?;
        let ordered = test_case.parameter_as::<bool>("ordered")?.unwrap_or(false);
        let names = column_names(access, test_case).await?;

        let passed = if ordered {
            names == expected
        } else {
            names.iter().collect::<BTreeSet<_>>() == expected.iter().collect::<BTreeSet<_>>()
        };

        Ok(TestCaseResult::from_outcome(
            test_case.name(),
            passed,
            Observation::ColumnNames(names.clone()),
            || {
                format!(
                    "Columns [{}] do not match expected [{}]{}",
                    names.join(", "),
                    expected.join(", "),
                    if ordered { " in order" } else { "" }
                )
            },
        ))
    }
}

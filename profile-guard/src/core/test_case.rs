//! Test case definitions consumed by validators.

use crate::error::{ProfileError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// A named assertion request against a table or one of its columns.
///
/// Parameters are kept as strings, the way catalogs store them; validators
/// parse what they need through [`TestCase::parameter_as`].
///
/// # Examples
///
/// ```rust
/// use profile_guard::core::TestCase;
///
/// let test_case = TestCase::new("email_exists", "customers")
///     .with_parameter("columnName", "email");
/// assert_eq!(test_case.parameter("columnName"), Some("email"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    name: String,
    table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    column: Option<String>,
    #[serde(default)]
    parameters: BTreeMap<String, String>,
}

impl TestCase {
    /// Creates a table-level test case.
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            column: None,
            parameters: BTreeMap::new(),
        }
    }

    /// Targets a column of the table.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Adds a parameter.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.parameters.insert(key.into(), value.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Resolves the target column, failing if this is a table-level test case.
    pub fn column(&self) -> Result<&str> {
        self.column.as_deref().ok_or_else(|| {
            ProfileError::invalid_parameter(&self.name, "column", "test case targets no column")
        })
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// Parses an optional parameter.
    pub fn parameter_as<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.parameter(key)
            .map(|raw| {
                raw.trim().parse::<T>().map_err(|e| {
                    ProfileError::invalid_parameter(&self.name, key, format!("'{raw}': {e}"))
                })
            })
            .transpose()
    }

    /// Parses a parameter that must be present.
    pub fn required_parameter<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.parameter_as(key)?
            .ok_or_else(|| ProfileError::invalid_parameter(&self.name, key, "missing"))
    }

    /// Splits a comma separated parameter into trimmed, non-empty items.
    pub fn list_parameter(&self, key: &str) -> Result<Vec<String>> {
        let raw = self
            .parameter(key)
            .ok_or_else(|| ProfileError::invalid_parameter(&self.name, key, "missing"))?;
        Ok(raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect())
    }
}

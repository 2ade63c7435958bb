//! SQL identifier escaping for the query-pushdown backend.
//!
//! Column and table names end up inside generated SQL, so they are checked
//! and quoted here before any expression is built.

use crate::error::{ProfileError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

const MAX_IDENTIFIER_LENGTH: usize = 128;

static TABLE_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    // Letters, numbers, underscores; dots separate qualified names.
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*(\.[a-zA-Z_][a-zA-Z0-9_]*)*$")
        .expect("Hard-coded regex pattern should be valid")
});

/// SQL identifier validation and escaping utilities.
pub struct SqlSecurity;

impl SqlSecurity {
    /// Quotes a column name as a single SQL identifier.
    ///
    /// Any name Arrow allows is accepted, spaces, dots and non-ASCII
    /// characters included. Embedded double quotes are doubled so the name
    /// cannot close the identifier.
    ///
    /// # Examples
    /// ```rust
    /// use profile_guard::security::SqlSecurity;
    ///
    /// assert_eq!(SqlSecurity::escape_identifier("email").unwrap(), "\"email\"");
    /// assert_eq!(SqlSecurity::escape_identifier("first name").unwrap(), "\"first name\"");
    /// assert_eq!(SqlSecurity::escape_identifier("a\"b").unwrap(), "\"a\"\"b\"");
    /// assert!(SqlSecurity::escape_identifier("id\0").is_err());
    /// ```
    pub fn escape_identifier(identifier: &str) -> Result<String> {
        Self::validate_identifier(identifier)?;
        Ok(format!("\"{}\"", identifier.replace('"', "\"\"")))
    }

    /// Checks that a column name can be quoted at all.
    pub fn validate_identifier(identifier: &str) -> Result<()> {
        if identifier.trim().is_empty() {
            return Err(ProfileError::Security(
                "SQL identifier cannot be empty or whitespace-only".to_string(),
            ));
        }

        if identifier.chars().count() > MAX_IDENTIFIER_LENGTH {
            return Err(ProfileError::Security(format!(
                "SQL identifier too long (max {MAX_IDENTIFIER_LENGTH} characters)"
            )));
        }

        if identifier.contains('\0') {
            return Err(ProfileError::Security(
                "SQL identifier cannot contain null bytes".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates and quotes a possibly qualified table name such as
    /// `sales.orders`, one part at a time.
    ///
    /// # Examples
    /// ```rust
    /// use profile_guard::security::SqlSecurity;
    ///
    /// assert_eq!(
    ///     SqlSecurity::escape_table_name("sales.orders").unwrap(),
    ///     "\"sales\".\"orders\""
    /// );
    /// assert!(SqlSecurity::escape_table_name("orders; DROP TABLE users--").is_err());
    /// ```
    pub fn escape_table_name(table: &str) -> Result<String> {
        Self::validate_identifier(table)?;

        if !TABLE_NAME_REGEX.is_match(table) {
            return Err(ProfileError::Security(format!(
                "Invalid table name format: '{table}'. Table names must start with a letter or underscore and contain only letters, numbers, underscores, and dots"
            )));
        }

        table
            .split('.')
            .map(Self::escape_identifier)
            .collect::<Result<Vec<_>>>()
            .map(|parts| parts.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_identifier_accepts_any_arrow_name() {
        assert_eq!(SqlSecurity::escape_identifier("user_id").unwrap(), "\"user_id\"");
        assert_eq!(
            SqlSecurity::escape_identifier("first name").unwrap(),
            "\"first name\""
        );
        assert_eq!(SqlSecurity::escape_identifier("prénom").unwrap(), "\"prénom\"");
        assert_eq!(SqlSecurity::escape_identifier("user-id").unwrap(), "\"user-id\"");
        assert_eq!(SqlSecurity::escape_identifier("a.b").unwrap(), "\"a.b\"");
        assert_eq!(
            SqlSecurity::escape_identifier("x\"); DROP TABLE t; --").unwrap(),
            "\"x\"\"); DROP TABLE t; --\""
        );
    }

    #[test]
    fn test_escape_identifier_invalid() {
        assert!(SqlSecurity::escape_identifier("").is_err());
        assert!(SqlSecurity::escape_identifier("   ").is_err());
        assert!(SqlSecurity::escape_identifier("id\0").is_err());
        assert!(SqlSecurity::escape_identifier(&"a".repeat(129)).is_err());
        assert!(SqlSecurity::escape_identifier(&"é".repeat(128)).is_ok());
    }

    #[test]
    fn test_escape_table_name() {
        assert_eq!(SqlSecurity::escape_table_name("users").unwrap(), "\"users\"");
        assert_eq!(
            SqlSecurity::escape_table_name("sales.orders").unwrap(),
            "\"sales\".\"orders\""
        );
        assert!(SqlSecurity::escape_table_name("1abc").is_err());
        assert!(SqlSecurity::escape_table_name("users; DROP TABLE users").is_err());

        let err = SqlSecurity::escape_table_name("bad-name").unwrap_err();
        assert!(matches!(err, ProfileError::Security(_)));
    }
}

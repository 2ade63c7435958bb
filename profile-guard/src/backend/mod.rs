//! Data backends that metrics and validators run against.
//!
//! There are two ways to reach a table:
//!
//! - **[`QueryBackend`]**: a DataFusion [`SessionContext`](datafusion::prelude::SessionContext)
//!   with a registered table. Metrics only build deferred SQL aggregates;
//!   the backend executes them.
//! - **[`MaterializedTable`]**: Arrow record batches already loaded in memory.
//!   Metrics compute their values directly.
//!
//! Validators do not care which one they get. They read through
//! [`TableAccess`], which both backends implement.

mod materialized;
mod query;

pub use materialized::MaterializedTable;
pub use query::{AggregateExpr, QueryBackend};

use crate::core::{Column, MetricValue};
use crate::error::{ProfileError, Result};
use crate::metrics::Metric;
use async_trait::async_trait;
use datafusion::scalar::ScalarValue;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// Which kind of backend a check is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Query pushdown through DataFusion.
    QueryEngine,
    /// A fully loaded in-memory table.
    Materialized,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::QueryEngine => f.write_str("query_engine"),
            BackendKind::Materialized => f.write_str("materialized"),
        }
    }
}

/// Read access to one table, implemented by every backend.
///
/// This is the whole surface a validator needs: which columns exist, what
/// type they have, the values of one of them, and metrics computed where
/// the data lives.
#[async_trait]
pub trait TableAccess: Debug + Send + Sync {
    /// Returns the kind of backend behind this accessor.
    fn kind(&self) -> BackendKind;

    /// Returns the name of the table being read.
    fn table_name(&self) -> &str;

    /// Returns the column names in table order.
    async fn columns(&self) -> Result<Vec<String>>;

    /// Resolves a column with its declared type.
    ///
    /// Fails with [`ProfileError::ColumnNotFound`](crate::error::ProfileError::ColumnNotFound)
    /// when the table has no such column.
    async fn column(&self, name: &str) -> Result<Column>;

    /// Returns every value of a column, nulls included.
    async fn values(&self, column: &str) -> Result<Vec<ScalarValue>>;

    /// Computes `metrics` over `column`, one entry per metric in order.
    ///
    /// `None` means the aggregate is SQL NULL: a null-skipping metric that
    /// saw no non-null values. Unlike metric evaluation, a metric the column
    /// type does not support is an [`ProfileError::UnsupportedType`] error.
    async fn aggregate(
        &self,
        column: &Column,
        metrics: &[&dyn Metric],
    ) -> Result<Vec<Option<MetricValue>>>;
}

/// Fails when the column type lacks a capability one of `metrics` needs.
pub(crate) fn ensure_supported(column: &Column, metrics: &[&dyn Metric]) -> Result<()> {
    match metrics
        .iter()
        .find(|metric| !column.supports(metric.required_capability()))
    {
        Some(metric) => Err(ProfileError::UnsupportedType {
            check: metric.name().to_string(),
            column: column.name().to_string(),
            data_type: column.data_type().to_string(),
        }),
        None => Ok(()),
    }
}

/// A backend a metric or validator is bound to.
#[derive(Debug, Clone)]
pub enum Backend {
    Query(QueryBackend),
    Materialized(MaterializedTable),
}

impl Backend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Query(_) => BackendKind::QueryEngine,
            Backend::Materialized(_) => BackendKind::Materialized,
        }
    }

    fn access(&self) -> &dyn TableAccess {
        match self {
            Backend::Query(query) => query,
            Backend::Materialized(table) => table,
        }
    }
}

impl From<QueryBackend> for Backend {
    fn from(backend: QueryBackend) -> Self {
        Backend::Query(backend)
    }
}

impl From<MaterializedTable> for Backend {
    fn from(table: MaterializedTable) -> Self {
        Backend::Materialized(table)
    }
}

#[async_trait]
impl TableAccess for Backend {
    fn kind(&self) -> BackendKind {
        Backend::kind(self)
    }

    fn table_name(&self) -> &str {
        self.access().table_name()
    }

    async fn columns(&self) -> Result<Vec<String>> {
        self.access().columns().await
    }

    async fn column(&self, name: &str) -> Result<Column> {
        self.access().column(name).await
    }

    async fn values(&self, column: &str) -> Result<Vec<ScalarValue>> {
        self.access().values(column).await
    }

    async fn aggregate(
        &self,
        column: &Column,
        metrics: &[&dyn Metric],
    ) -> Result<Vec<Option<MetricValue>>> {
        self.access().aggregate(column, metrics).await
    }
}

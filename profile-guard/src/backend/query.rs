//! Query-pushdown backend over a DataFusion session.

use super::{ensure_supported, BackendKind, MaterializedTable, TableAccess};
use crate::config::QueryConfig;
use crate::core::{Column, MetricValue};
use crate::error::{ProfileError, Result};
use crate::metrics::{aggregate_expr, Metric};
use crate::security::SqlSecurity;
use arrow::array::Array;
use arrow::datatypes::SchemaRef;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use datafusion::scalar::ScalarValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument};

/// A deferred aggregate built by a metric for the query backend.
///
/// The SQL fragment is a single select item such as
/// `MAX(CHARACTER_LENGTH("email"))`. Identifiers are escaped before the
/// fragment is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateExpr {
    metric: String,
    column: String,
    sql: String,
}

impl AggregateExpr {
    pub fn new(metric: impl Into<String>, column: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            column: column.into(),
            sql: sql.into(),
        }
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl fmt::Display for AggregateExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// A table registered in a DataFusion [`SessionContext`].
///
/// # Examples
///
/// ```rust,no_run
/// use datafusion::prelude::*;
/// use profile_guard::backend::QueryBackend;
///
/// # async fn example() -> profile_guard::error::Result<()> {
/// let ctx = SessionContext::new();
/// ctx.register_csv("users", "data/users.csv", CsvReadOptions::new()).await?;
///
/// let backend = QueryBackend::new(ctx, "users");
/// println!("{:?}", backend.schema().await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct QueryBackend {
    ctx: SessionContext,
    table: String,
}

impl fmt::Debug for QueryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBackend")
            .field("table", &self.table)
            .field("session_id", &self.ctx.session_id())
            .finish()
    }
}

impl QueryBackend {
    /// Wraps an existing session in which `table` is registered.
    pub fn new(ctx: SessionContext, table: impl Into<String>) -> Self {
        Self {
            ctx,
            table: table.into(),
        }
    }

    /// Creates a fresh session from configuration. Register the table on
    /// [`QueryBackend::context`] before evaluating anything.
    pub fn with_config(config: &QueryConfig, table: impl Into<String>) -> Self {
        Self::new(
            SessionContext::new_with_config(config.session_config()),
            table,
        )
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Introspects the table schema without scanning data.
    pub async fn schema(&self) -> Result<SchemaRef> {
        let df = self.ctx.table(self.table.as_str()).await?;
        Ok(df.schema().inner().clone())
    }

    /// Runs deferred aggregates in a single scan.
    ///
    /// Returns one entry per expression, in order; SQL NULL (for example the
    /// maximum over zero rows) becomes `None`.
    #[instrument(skip(self, exprs), fields(table = %self.table, expressions = exprs.len()))]
    pub async fn execute(&self, exprs: &[AggregateExpr]) -> Result<Vec<Option<MetricValue>>> {
        if exprs.is_empty() {
            return Ok(Vec::new());
        }

        let table = SqlSecurity::escape_table_name(&self.table)?;
        let select = exprs
            .iter()
            .enumerate()
            .map(|(i, expr)| format!("{} AS \"m{i}\"", expr.sql()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {select} FROM {table}");
        debug!(%sql, "executing aggregate query");

        let batches = self.ctx.sql(&sql).await?.collect().await?;
        let batch = batches
            .iter()
            .find(|batch| batch.num_rows() > 0)
            .ok_or_else(|| {
                ProfileError::data_unavailable(&self.table, "aggregate query returned no rows")
            })?;

        (0..exprs.len())
            .map(|i| {
                let scalar = ScalarValue::try_from_array(batch.column(i).as_ref(), 0)?;
                Ok(MetricValue::from_scalar(&scalar))
            })
            .collect()
    }

    /// Loads the whole table into memory.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn materialize(&self) -> Result<MaterializedTable> {
        let df = self.ctx.table(self.table.as_str()).await?;
        let schema = df.schema().inner().clone();
        let batches = df.collect().await?;
        MaterializedTable::try_new(self.table.clone(), schema, batches)
    }
}

#[async_trait]
impl TableAccess for QueryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::QueryEngine
    }

    fn table_name(&self) -> &str {
        &self.table
    }

    async fn columns(&self) -> Result<Vec<String>> {
        let schema = self.schema().await?;
        Ok(schema
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect())
    }

    async fn column(&self, name: &str) -> Result<Column> {
        let schema = self.schema().await?;
        schema
            .field_with_name(name)
            .map(Column::from_field)
            .map_err(|_| ProfileError::ColumnNotFound {
                column: name.to_string(),
            })
    }

    async fn values(&self, column: &str) -> Result<Vec<ScalarValue>> {
        // Resolve first so a missing column reads the same as on the
        // materialized backend.
        self.column(column).await?;

        let sql = format!(
            "SELECT {} FROM {}",
            SqlSecurity::escape_identifier(column)?,
            SqlSecurity::escape_table_name(&self.table)?
        );
        let batches = self.ctx.sql(&sql).await?.collect().await?;

        let mut values = Vec::new();
        for batch in &batches {
            let array = batch.column(0);
            for row in 0..array.len() {
                values.push(ScalarValue::try_from_array(array.as_ref(), row)?);
            }
        }
        Ok(values)
    }

    #[instrument(skip(self, column, metrics), fields(table = %self.table, column = column.name()))]
    async fn aggregate(
        &self,
        column: &Column,
        metrics: &[&dyn Metric],
    ) -> Result<Vec<Option<MetricValue>>> {
        ensure_supported(column, metrics)?;
        let exprs = metrics
            .iter()
            .map(|metric| aggregate_expr(*metric, column))
            .collect::<Result<Vec<_>>>()?;
        self.execute(&exprs).await
    }
}

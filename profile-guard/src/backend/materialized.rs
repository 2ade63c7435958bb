//! In-memory backend over Arrow record batches.

use super::{ensure_supported, BackendKind, TableAccess};
use crate::core::{Column, MetricValue};
use crate::error::{ProfileError, Result};
use crate::metrics::Metric;
use arrow::array::Array;
use arrow::datatypes::{Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::scalar::ScalarValue;
use std::sync::Arc;

/// A table fully loaded into memory.
///
/// # Examples
///
/// ```rust
/// use arrow::array::StringArray;
/// use arrow::datatypes::{DataType, Field, Schema};
/// use arrow::record_batch::RecordBatch;
/// use profile_guard::backend::MaterializedTable;
/// use std::sync::Arc;
///
/// let schema = Arc::new(Schema::new(vec![Field::new("name", DataType::Utf8, true)]));
/// let batch = RecordBatch::try_new(
///     schema,
///     vec![Arc::new(StringArray::from(vec![Some("ada"), None]))],
/// )
/// .unwrap();
///
/// let table = MaterializedTable::from_batch("people", batch);
/// assert_eq!(table.column_names(), vec!["name"]);
/// assert_eq!(table.num_rows(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MaterializedTable {
    name: String,
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl MaterializedTable {
    /// Creates a table from batches that all share `schema`.
    pub fn try_new(
        name: impl Into<String>,
        schema: SchemaRef,
        batches: Vec<RecordBatch>,
    ) -> Result<Self> {
        for batch in &batches {
            let batch_schema = batch.schema();
            let matches = batch_schema.fields().len() == schema.fields().len()
                && batch_schema
                    .fields()
                    .iter()
                    .zip(schema.fields().iter())
                    .all(|(a, b)| a.name() == b.name() && a.data_type() == b.data_type());
            if !matches {
                return Err(ProfileError::Arrow(ArrowError::SchemaError(format!(
                    "batch schema {batch_schema:?} does not match table schema {schema:?}"
                ))));
            }
        }

        Ok(Self {
            name: name.into(),
            schema,
            batches,
        })
    }

    /// Creates a table from a single batch.
    pub fn from_batch(name: impl Into<String>, batch: RecordBatch) -> Self {
        Self {
            name: name.into(),
            schema: batch.schema(),
            batches: vec![batch],
        }
    }

    /// Creates a table with no columns and no rows.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: Arc::new(Schema::empty()),
            batches: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Returns the column names in schema order.
    pub fn column_names(&self) -> Vec<String> {
        self.schema
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect()
    }

    /// Resolves a column with its declared type.
    pub fn column_info(&self, name: &str) -> Result<Column> {
        self.schema
            .field_with_name(name)
            .map(Column::from_field)
            .map_err(|_| ProfileError::ColumnNotFound {
                column: name.to_string(),
            })
    }

    /// Returns every value of a column across all batches, nulls included.
    pub fn column_values(&self, name: &str) -> Result<Vec<ScalarValue>> {
        let index = self
            .schema
            .index_of(name)
            .map_err(|_| ProfileError::ColumnNotFound {
                column: name.to_string(),
            })?;

        let mut values = Vec::with_capacity(self.num_rows());
        for batch in &self.batches {
            let array = batch.column(index);
            for row in 0..array.len() {
                values.push(ScalarValue::try_from_array(array.as_ref(), row)?);
            }
        }
        Ok(values)
    }
}

#[async_trait]
impl TableAccess for MaterializedTable {
    fn kind(&self) -> BackendKind {
        BackendKind::Materialized
    }

    fn table_name(&self) -> &str {
        &self.name
    }

    async fn columns(&self) -> Result<Vec<String>> {
        Ok(self.column_names())
    }

    async fn column(&self, name: &str) -> Result<Column> {
        self.column_info(name)
    }

    async fn values(&self, column: &str) -> Result<Vec<ScalarValue>> {
        self.column_values(column)
    }

    async fn aggregate(
        &self,
        column: &Column,
        metrics: &[&dyn Metric],
    ) -> Result<Vec<Option<MetricValue>>> {
        ensure_supported(column, metrics)?;
        let values = self.column_values(column.name())?;
        let all_null = values.iter().all(ScalarValue::is_null);

        Ok(metrics
            .iter()
            .map(|metric| {
                if metric.skips_nulls() && all_null {
                    None
                } else {
                    Some(metric.compute(column, &values))
                }
            })
            .collect())
    }
}

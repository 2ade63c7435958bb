//! Fixtures shared by unit tests.

use crate::backend::QueryBackend;
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use datafusion::prelude::SessionContext;
use std::sync::Arc;

/// A single nullable Utf8 column.
pub fn string_batch(name: &str, values: Vec<Option<&str>>) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![Field::new(name, DataType::Utf8, true)]));
    RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(values))]).unwrap()
}

/// A single nullable Int64 column.
pub fn int_batch(name: &str, values: Vec<Option<i64>>) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![Field::new(name, DataType::Int64, true)]));
    RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(values))]).unwrap()
}

/// `id` and `email`, in that order.
pub fn users_batch() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("email", DataType::Utf8, true),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(vec![1, 2, 3, 4])),
            Arc::new(StringArray::from(vec![
                Some("ada@example.com"),
                Some("grace@example.com"),
                None,
                Some("alan@example.org"),
            ])),
        ],
    )
    .unwrap()
}

/// Registers `batch` as `table` in a fresh session.
pub async fn query_backend(table: &str, batch: RecordBatch) -> QueryBackend {
    let ctx = SessionContext::new();
    ctx.register_batch(table, batch).unwrap();
    QueryBackend::new(ctx, table)
}

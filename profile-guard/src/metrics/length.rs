//! Longest and shortest value length.
//!
//! Length means characters for strings and top-level elements for lists,
//! on both backends. An empty list has length 0 and a null list has none.

use super::Metric;
use crate::core::{Capability, Column, MetricValue, ResultType, TypeCategory};
use arrow::array::Array;
use datafusion::scalar::ScalarValue;

/// Length of one materialized value, `None` for nulls and non-length types.
pub(crate) fn value_length(value: &ScalarValue) -> Option<i64> {
    match value {
        ScalarValue::Utf8(Some(s))
        | ScalarValue::LargeUtf8(Some(s))
        | ScalarValue::Utf8View(Some(s)) => i64::try_from(s.chars().count()).ok(),
        ScalarValue::Dictionary(_, inner) => value_length(inner),
        ScalarValue::List(array) if !array.is_null(0) => Some(i64::from(array.value_length(0))),
        ScalarValue::LargeList(array) if !array.is_null(0) => Some(array.value_length(0)),
        ScalarValue::FixedSizeList(array) if !array.is_null(0) => {
            Some(i64::from(array.value_length()))
        }
        _ => None,
    }
}

/// SQL length function matching [`value_length`] for the column's category.
fn length_sql(column: &Column, identifier: &str) -> String {
    match column.category() {
        // COALESCE keeps an empty list at 0.
        TypeCategory::Collection => format!(
            "CASE WHEN {identifier} IS NULL THEN NULL ELSE COALESCE(array_length({identifier}, 1), 0) END"
        ),
        _ => format!("CHARACTER_LENGTH({identifier})"),
    }
}

/// Lengths of every non-null value.
fn lengths(values: &[ScalarValue]) -> impl Iterator<Item = i64> + '_ {
    values.iter().filter(|v| !v.is_null()).filter_map(value_length)
}

/// `maxLength`: the longest value in a string or list column.
///
/// With no non-null values the materialized backend reports `0`, the same
/// zero it reports for unsupported types.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxLength;

impl Metric for MaxLength {
    fn name(&self) -> &'static str {
        "maxLength"
    }

    fn result_type(&self) -> ResultType {
        ResultType::Long
    }

    fn required_capability(&self) -> Capability {
        Capability::Length
    }

    fn expression(&self, column: &Column, identifier: &str) -> String {
        format!("MAX({})", length_sql(column, identifier))
    }

    fn compute(&self, _column: &Column, values: &[ScalarValue]) -> MetricValue {
        MetricValue::Long(lengths(values).max().unwrap_or(0))
    }
}

/// `minLength`: the shortest value in a string or list column.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinLength;

impl Metric for MinLength {
    fn name(&self) -> &'static str {
        "minLength"
    }

    fn result_type(&self) -> ResultType {
        ResultType::Long
    }

    fn required_capability(&self) -> Capability {
        Capability::Length
    }

    fn expression(&self, column: &Column, identifier: &str) -> String {
        format!("MIN({})", length_sql(column, identifier))
    }

    fn compute(&self, _column: &Column, values: &[ScalarValue]) -> MetricValue {
        MetricValue::Long(lengths(values).min().unwrap_or(0))
    }
}

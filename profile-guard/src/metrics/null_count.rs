//! Null value count.

use super::Metric;
use crate::core::{Capability, Column, MetricValue, ResultType};
use datafusion::scalar::ScalarValue;

/// `nullCount`: how many values of the column are null. Every type supports it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCount;

impl Metric for NullCount {
    fn name(&self) -> &'static str {
        "nullCount"
    }

    fn result_type(&self) -> ResultType {
        ResultType::Long
    }

    fn required_capability(&self) -> Capability {
        Capability::Counting
    }

    fn expression(&self, _column: &Column, identifier: &str) -> String {
        format!("COUNT(*) - COUNT({identifier})")
    }

    fn compute(&self, _column: &Column, values: &[ScalarValue]) -> MetricValue {
        let nulls = values.iter().filter(|value| value.is_null()).count();
        MetricValue::Long(i64::try_from(nulls).unwrap_or(i64::MAX))
    }

    fn skips_nulls(&self) -> bool {
        false
    }
}

//! Arithmetic mean of a numeric column.

use super::Metric;
use crate::core::{Capability, Column, MetricValue, ResultType};
use datafusion::scalar::ScalarValue;

/// Numeric value of a scalar, `None` for nulls and non-numeric scalars.
fn numeric_value(value: &ScalarValue) -> Option<f64> {
    MetricValue::from_scalar(value).map(|value| value.as_f64())
}

/// `mean`: the average of the non-null values of a numeric column.
///
/// With no non-null values the materialized backend reports `0.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mean;

impl Metric for Mean {
    fn name(&self) -> &'static str {
        "mean"
    }

    fn result_type(&self) -> ResultType {
        ResultType::Double
    }

    fn required_capability(&self) -> Capability {
        Capability::Arithmetic
    }

    fn expression(&self, _column: &Column, identifier: &str) -> String {
        format!("AVG({identifier})")
    }

    fn compute(&self, _column: &Column, values: &[ScalarValue]) -> MetricValue {
        let (sum, count) = values
            .iter()
            .filter_map(numeric_value)
            .fold((0.0, 0u64), |(sum, count), v| (sum + v, count + 1));

        if count == 0 {
            return self.result_type().zero();
        }
        MetricValue::Double(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::DataType;

    #[test]
    fn test_mean_skips_nulls() {
        let column = Column::new("age", DataType::Int64);
        let values = vec![
            ScalarValue::Int64(Some(10)),
            ScalarValue::Int64(None),
            ScalarValue::Int64(Some(20)),
        ];
        assert_eq!(Mean.compute(&column, &values), MetricValue::Double(15.0));
    }

    #[test]
    fn test_mean_of_nothing_is_zero() {
        let column = Column::new("age", DataType::Int64);
        assert_eq!(
            Mean.compute(&column, &[ScalarValue::Int64(None)]),
            MetricValue::Double(0.0)
        );
    }

    #[test]
    fn test_mean_requires_numeric_columns() {
        assert!(Column::new("age", DataType::Float64).supports(Mean.required_capability()));
        assert!(!Column::new("name", DataType::Utf8).supports(Mean.required_capability()));
        assert_eq!(
            Mean.expression(&Column::new("age", DataType::Float64), "\"age\""),
            "AVG(\"age\")"
        );
    }

    #[test]
    fn test_decimal_values() {
        let column = Column::new("price", DataType::Decimal128(10, 2));
        let values = vec![
            ScalarValue::Decimal128(Some(150), 10, 2),
            ScalarValue::Decimal128(Some(250), 10, 2),
        ];
        assert_eq!(Mean.compute(&column, &values), MetricValue::Double(2.0));
    }

    #[test]
    fn test_half_and_wide_decimal_values() {
        let halves = [Some(1.0f32), None, Some(2.0)]
            .iter()
            .map(|v| ScalarValue::Float32(*v).cast_to(&DataType::Float16).unwrap())
            .collect::<Vec<_>>();
        let column = Column::new("ratio", DataType::Float16);
        assert_eq!(Mean.compute(&column, &halves), MetricValue::Double(1.5));

        let wide = [150, 250]
            .iter()
            .map(|v| {
                ScalarValue::Decimal128(Some(*v), 10, 2)
                    .cast_to(&DataType::Decimal256(40, 2))
                    .unwrap()
            })
            .collect::<Vec<_>>();
        let column = Column::new("price", DataType::Decimal256(40, 2));
        assert_eq!(Mean.compute(&column, &wide), MetricValue::Double(2.0));
    }
}

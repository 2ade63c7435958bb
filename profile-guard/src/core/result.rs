//! Result envelopes returned by metric and validator evaluation.

use crate::backend::AggregateExpr;
use datafusion::scalar::ScalarValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The status of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    /// The evaluation completed (and, for test cases, the condition held)
    Success,
    /// The test case condition did not hold
    Failure,
    /// The check could not be evaluated at all
    Error,
}

impl ResultStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ResultStatus::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ResultStatus::Failure)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResultStatus::Error)
    }
}

/// The semantic type of the value a metric computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Long,
    Double,
}

impl ResultType {
    /// The concrete zero of this type, used as the materialized neutral value.
    pub fn zero(&self) -> MetricValue {
        match self {
            ResultType::Long => MetricValue::Long(0),
            ResultType::Double => MetricValue::Double(0.0),
        }
    }
}

/// A computed metric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum MetricValue {
    /// An integer metric value (e.g., a length or a count).
    Long(i64),
    /// A floating-point metric value (e.g., a mean).
    Double(f64),
}

impl MetricValue {
    /// Returns the numeric value as f64.
    pub fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Long(v) => *v as f64,
            MetricValue::Double(v) => *v,
        }
    }

    /// Attempts to get the value as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetricValue::Long(v) => Some(*v),
            MetricValue::Double(v) if v.fract() == 0.0 => Some(*v as i64),
            MetricValue::Double(_) => None,
        }
    }

    /// Converts a scalar returned by a query into a metric value.
    ///
    /// Returns `None` for SQL NULL and for non-numeric scalars.
    pub fn from_scalar(scalar: &ScalarValue) -> Option<Self> {
        let value = match scalar {
            ScalarValue::Int8(Some(v)) => MetricValue::Long(i64::from(*v)),
            ScalarValue::Int16(Some(v)) => MetricValue::Long(i64::from(*v)),
            ScalarValue::Int32(Some(v)) => MetricValue::Long(i64::from(*v)),
            ScalarValue::Int64(Some(v)) => MetricValue::Long(*v),
            ScalarValue::UInt8(Some(v)) => MetricValue::Long(i64::from(*v)),
            ScalarValue::UInt16(Some(v)) => MetricValue::Long(i64::from(*v)),
            ScalarValue::UInt32(Some(v)) => MetricValue::Long(i64::from(*v)),
            ScalarValue::UInt64(Some(v)) => match i64::try_from(*v) {
                Ok(v) => MetricValue::Long(v),
                Err(_) => MetricValue::Double(*v as f64),
            },
            ScalarValue::Float16(Some(v)) => MetricValue::Double(v.to_f64()),
            ScalarValue::Float32(Some(v)) => MetricValue::Double(f64::from(*v)),
            ScalarValue::Float64(Some(v)) => MetricValue::Double(*v),
            ScalarValue::Decimal128(Some(v), _, scale) => {
                MetricValue::Double(*v as f64 / 10f64.powi(i32::from(*scale)))
            }
            // i256 has no lossless f64 conversion; its decimal text does.
            ScalarValue::Decimal256(Some(v), _, scale) => {
                let unscaled = v.to_string().parse::<f64>().ok()?;
                MetricValue::Double(unscaled / 10f64.powi(i32::from(*scale)))
            }
            _ => return None,
        };
        Some(value)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Long(v) => write!(f, "{v}"),
            MetricValue::Double(v) if v.fract() == 0.0 => write!(f, "{v:.0}"),
            MetricValue::Double(v) => write!(f, "{v:.4}"),
        }
    }
}

/// What a metric evaluation produced, which depends on the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricOutput {
    /// Query backend: a deferred aggregate, executed later by the backend.
    Expression(AggregateExpr),
    /// Query backend: the column type does not support the metric, so no
    /// expression was produced. Distinct from an expression that yields zero.
    NoExpression,
    /// Materialized backend: an eagerly computed value. Unsupported types
    /// yield the zero of the metric's result type.
    Value(MetricValue),
}

impl MetricOutput {
    pub fn expression(&self) -> Option<&AggregateExpr> {
        match self {
            MetricOutput::Expression(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&MetricValue> {
        match self {
            MetricOutput::Value(value) => Some(value),
            _ => None,
        }
    }
}

/// The result of evaluating one metric against one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    /// Name of the metric, e.g. `maxLength`
    pub metric: String,
    /// Column the metric was bound to
    pub column: String,
    pub status: ResultStatus,
    pub output: MetricOutput,
    /// True when the capability gate rejected the column type
    pub capability_rejected: bool,
    /// Optional diagnostic message
    pub message: Option<String>,
}

impl MetricResult {
    /// A metric that ran its backend-specific path.
    pub fn computed(
        metric: impl Into<String>,
        column: impl Into<String>,
        output: MetricOutput,
    ) -> Self {
        Self {
            metric: metric.into(),
            column: column.into(),
            status: ResultStatus::Success,
            output,
            capability_rejected: false,
            message: None,
        }
    }

    /// A metric whose column type failed the capability gate.
    pub fn rejected(
        metric: impl Into<String>,
        column: impl Into<String>,
        output: MetricOutput,
        message: impl Into<String>,
    ) -> Self {
        Self {
            metric: metric.into(),
            column: column.into(),
            status: ResultStatus::Success,
            output,
            capability_rejected: true,
            message: Some(message.into()),
        }
    }
}

/// The observation a validator retrieved before comparing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Observation {
    /// Column names, in table order.
    ColumnNames(Vec<String>),
    /// A count, e.g. of columns or of null values.
    Count(i64),
    /// A metric computed over the target column.
    Metric(MetricValue),
}

/// The result of running one test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseResult {
    /// Name of the test case
    pub test_case: String,
    pub status: ResultStatus,
    /// What was observed, absent when the observation could not be made
    pub observation: Option<Observation>,
    pub message: Option<String>,
}

impl TestCaseResult {
    /// The condition held.
    pub fn success(test_case: impl Into<String>, observation: Observation) -> Self {
        Self {
            test_case: test_case.into(),
            status: ResultStatus::Success,
            observation: Some(observation),
            message: None,
        }
    }

    /// The condition did not hold.
    pub fn failure(
        test_case: impl Into<String>,
        observation: Observation,
        message: impl Into<String>,
    ) -> Self {
        Self {
            test_case: test_case.into(),
            status: ResultStatus::Failure,
            observation: Some(observation),
            message: Some(message.into()),
        }
    }

    /// The test case could not be evaluated.
    pub fn errored(test_case: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            test_case: test_case.into(),
            status: ResultStatus::Error,
            observation: None,
            message: Some(message.into()),
        }
    }

    /// Success or failure depending on `passed`.
    pub fn from_outcome(
        test_case: impl Into<String>,
        passed: bool,
        observation: Observation,
        failure_message: impl FnOnce() -> String,
    ) -> Self {
        if passed {
            Self::success(test_case, observation)
        } else {
            Self::failure(test_case, observation, failure_message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_per_result_type() {
        assert_eq!(ResultType::Long.zero(), MetricValue::Long(0));
        assert_eq!(ResultType::Double.zero(), MetricValue::Double(0.0));
    }

    #[test]
    fn test_metric_value_from_scalar() {
        assert_eq!(
            MetricValue::from_scalar(&ScalarValue::Int32(Some(5))),
            Some(MetricValue::Long(5))
        );
        assert_eq!(
            MetricValue::from_scalar(&ScalarValue::UInt64(Some(3))),
            Some(MetricValue::Long(3))
        );
        assert_eq!(
            MetricValue::from_scalar(&ScalarValue::Float64(Some(2.5))),
            Some(MetricValue::Double(2.5))
        );
        assert_eq!(
            MetricValue::from_scalar(&ScalarValue::Decimal128(Some(1250), 10, 2)),
            Some(MetricValue::Double(12.5))
        );
        assert_eq!(MetricValue::from_scalar(&ScalarValue::Int32(None)), None);
        assert_eq!(
            MetricValue::from_scalar(&ScalarValue::Utf8(Some("x".to_string()))),
            None
        );
    }

    #[test]
    fn test_metric_value_from_wide_and_half_scalars() {
        use arrow::datatypes::DataType;

        let half = ScalarValue::Float32(Some(1.5))
            .cast_to(&DataType::Float16)
            .unwrap();
        assert_eq!(MetricValue::from_scalar(&half), Some(MetricValue::Double(1.5)));

        let wide = ScalarValue::Decimal128(Some(-1250), 10, 2)
            .cast_to(&DataType::Decimal256(40, 2))
            .unwrap();
        assert!(matches!(wide, ScalarValue::Decimal256(..)));
        assert_eq!(MetricValue::from_scalar(&wide), Some(MetricValue::Double(-12.5)));

        assert_eq!(
            MetricValue::from_scalar(&ScalarValue::UInt64(Some(u64::MAX))),
            Some(MetricValue::Double(u64::MAX as f64))
        );
    }

    #[test]
    fn test_metric_value_display() {
        assert_eq!(MetricValue::Long(42).to_string(), "42");
        assert_eq!(MetricValue::Double(3.0).to_string(), "3");
        assert_eq!(MetricValue::Double(0.12345).to_string(), "0.1235");
        assert_eq!(MetricValue::Double(4.0).as_i64(), Some(4));
        assert_eq!(MetricValue::Double(4.5).as_i64(), None);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ResultStatus::Error).unwrap();
        assert_eq!(json, "\"error\"");
    }

    #[test]
    fn test_test_case_result_constructors() {
        let ok = TestCaseResult::from_outcome("t", true, Observation::Count(1), || {
            "unused".to_string()
        });
        assert!(ok.status.is_success());
        assert!(ok.message.is_none());

        let failed = TestCaseResult::from_outcome("t", false, Observation::Count(1), || {
            "expected 2".to_string()
        });
        assert!(failed.status.is_failure());
        assert_eq!(failed.observation, Some(Observation::Count(1)));

        let errored = TestCaseResult::errored("t", "no data");
        assert!(errored.status.is_error());
        assert!(errored.observation.is_none());
    }
}

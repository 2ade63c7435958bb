//! Column metrics that run on either backend.
//!
//! A [`Metric`] knows two ways to compute the same statistic: as a deferred
//! SQL aggregate for the query backend, and eagerly over materialized
//! values. [`evaluate_metric`] picks the path for the bound backend after
//! consulting the capability gate.
//!
//! ## Neutral outputs
//!
//! When the column type does not support a metric, evaluation does not
//! fail. It returns the backend's neutral output instead:
//!
//! | Backend        | Neutral output                                 |
//! |----------------|------------------------------------------------|
//! | Query engine   | [`MetricOutput::NoExpression`]                 |
//! | Materialized   | [`MetricOutput::Value`] with the zero of the metric's [`ResultType`] |
//!
//! The two differ on purpose. Query callers need to tell "not computed"
//! apart from "computed as zero"; materialized callers aggregate the number
//! directly and always need one.
//!
//! ## Example
//!
//! ```rust
//! use arrow::array::StringArray;
//! use arrow::datatypes::{DataType, Field, Schema};
//! use arrow::record_batch::RecordBatch;
//! use profile_guard::backend::{Backend, MaterializedTable};
//! use profile_guard::core::{Column, MetricValue};
//! use profile_guard::metrics::{BoundMetric, MaxLength};
//! use std::sync::Arc;
//!
//! let schema = Arc::new(Schema::new(vec![Field::new("name", DataType::Utf8, true)]));
//! let batch = RecordBatch::try_new(
//!     schema,
//!     vec![Arc::new(StringArray::from(vec![Some("ada"), Some("grace"), None]))],
//! )
//! .unwrap();
//! let backend = Backend::from(MaterializedTable::from_batch("people", batch));
//! let column = Column::new("name", DataType::Utf8);
//!
//! let result = BoundMetric::new(&MaxLength, &column, &backend).evaluate().unwrap();
//! assert_eq!(result.output.value(), Some(&MetricValue::Long(5)));
//! ```

mod length;
mod mean;
mod null_count;

pub use length::{MaxLength, MinLength};
pub use mean::Mean;
pub use null_count::NullCount;

use crate::backend::{AggregateExpr, Backend, BackendKind};
use crate::core::{Capability, Column, MetricOutput, MetricResult, MetricValue, ResultType};
use crate::error::Result;
use crate::log_capability;
use crate::logging::LogConfig;
use crate::security::SqlSecurity;
use datafusion::scalar::ScalarValue;
use once_cell::sync::Lazy;
use std::fmt::Debug;
use tracing::{debug, instrument};

static DEFAULT_LOG_CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::default);

/// A named, typed statistic over one column.
///
/// Implementations are stateless. The backend-specific methods are only
/// called after the column passed the capability check.
pub trait Metric: Debug + Send + Sync {
    /// Stable identifier, e.g. `maxLength`.
    fn name(&self) -> &'static str;

    /// The type of the computed value.
    fn result_type(&self) -> ResultType;

    /// The capability the column type must support.
    fn required_capability(&self) -> Capability;

    /// Builds the select item for the query backend. `identifier` is the
    /// already escaped column name.
    fn expression(&self, column: &Column, identifier: &str) -> String;

    /// Computes the value over materialized column values, nulls included.
    fn compute(&self, column: &Column, values: &[ScalarValue]) -> MetricValue;

    /// Whether the value is only defined over non-null values, like a SQL
    /// aggregate that yields NULL when it sees none.
    fn skips_nulls(&self) -> bool {
        true
    }
}

/// Builds the deferred aggregate for a metric the column type supports.
pub fn aggregate_expr(metric: &dyn Metric, column: &Column) -> Result<AggregateExpr> {
    let identifier = SqlSecurity::escape_identifier(column.name())?;
    Ok(AggregateExpr::new(
        metric.name(),
        column.name(),
        metric.expression(column, &identifier),
    ))
}

/// The output a backend reports when the column type is unsupported.
pub fn neutral_output(kind: BackendKind, result_type: ResultType) -> MetricOutput {
    match kind {
        BackendKind::QueryEngine => MetricOutput::NoExpression,
        BackendKind::Materialized => MetricOutput::Value(result_type.zero()),
    }
}

/// Evaluates `metric` over `column` on `backend`.
///
/// Capability mismatches are not errors. Backend failures while reading
/// materialized values, and column names that cannot be quoted, are
/// propagated.
pub fn evaluate_metric(
    metric: &dyn Metric,
    column: &Column,
    backend: &Backend,
) -> Result<MetricResult> {
    evaluate_metric_with(metric, column, backend, &DEFAULT_LOG_CONFIG)
}

/// [`evaluate_metric`] with explicit logging knobs.
#[instrument(skip_all, fields(metric = metric.name(), column = column.name(), backend = %backend.kind()))]
pub fn evaluate_metric_with(
    metric: &dyn Metric,
    column: &Column,
    backend: &Backend,
    log: &LogConfig,
) -> Result<MetricResult> {
    let capability = metric.required_capability();
    if !column.supports(capability) {
        debug!("column type does not support metric, returning neutral output");
        log_capability!(
            log,
            data_type = %column.data_type(),
            category = %column.category(),
            %capability,
            "capability rejected"
        );
        return Ok(MetricResult::rejected(
            metric.name(),
            column.name(),
            neutral_output(backend.kind(), metric.result_type()),
            format!(
                "Don't know how to process type {} when computing {}",
                column.data_type(),
                metric.name()
            ),
        ));
    }

    let output = match backend {
        Backend::Query(_) => MetricOutput::Expression(aggregate_expr(metric, column)?),
        Backend::Materialized(table) => {
            let values = table.column_values(column.name())?;
            MetricOutput::Value(metric.compute(column, &values))
        }
    };

    Ok(MetricResult::computed(metric.name(), column.name(), output))
}

/// A metric bound to one column and one backend for its whole lifetime.
///
/// The column and backend are borrowed: they belong to the caller and
/// outlive the binding, which is built, evaluated and dropped.
#[derive(Debug, Clone, Copy)]
pub struct BoundMetric<'a> {
    metric: &'a dyn Metric,
    column: &'a Column,
    backend: &'a Backend,
    log: &'a LogConfig,
}

impl<'a> BoundMetric<'a> {
    pub fn new(metric: &'a dyn Metric, column: &'a Column, backend: &'a Backend) -> Self {
        Self {
            metric,
            column,
            backend,
            log: &DEFAULT_LOG_CONFIG,
        }
    }

    pub fn with_log_config(mut self, log: &'a LogConfig) -> Self {
        self.log = log;
        self
    }

    pub fn name(&self) -> &'static str {
        self.metric.name()
    }

    pub fn result_type(&self) -> ResultType {
        self.metric.result_type()
    }

    pub fn column(&self) -> &Column {
        self.column
    }

    pub fn backend(&self) -> &Backend {
        self.backend
    }

    pub fn evaluate(&self) -> Result<MetricResult> {
        evaluate_metric_with(self.metric, self.column, self.backend, self.log)
    }
}

/// Every metric in the family.
pub fn all_metrics() -> Vec<Box<dyn Metric>> {
    vec![
        Box::new(MaxLength),
        Box::new(MinLength),
        Box::new(NullCount),
        Box::new(Mean),
    ]
}

/// Looks up a metric by its stable name.
pub fn metric_by_name(name: &str) -> Option<Box<dyn Metric>> {
    all_metrics().into_iter().find(|metric| metric.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MaterializedTable;
    use crate::error::ProfileError;
    use crate::test_helpers::{int_batch, query_backend, string_batch};
    use arrow::datatypes::DataType;

    #[test]
    fn test_neutral_output_policy() {
        assert_eq!(
            neutral_output(BackendKind::QueryEngine, ResultType::Long),
            MetricOutput::NoExpression
        );
        assert_eq!(
            neutral_output(BackendKind::Materialized, ResultType::Long),
            MetricOutput::Value(MetricValue::Long(0))
        );
        assert_eq!(
            neutral_output(BackendKind::Materialized, ResultType::Double),
            MetricOutput::Value(MetricValue::Double(0.0))
        );
    }

    #[test]
    fn test_unsupported_type_on_materialized_backend_is_zero() {
        let backend = Backend::from(MaterializedTable::from_batch(
            "t",
            int_batch("age", vec![Some(31), Some(7)]),
        ));
        let column = Column::new("age", DataType::Int64);

        let result = evaluate_metric(&MaxLength, &column, &backend).unwrap();
        assert!(result.capability_rejected);
        assert!(result.status.is_success());
        assert_eq!(result.output, MetricOutput::Value(MetricValue::Long(0)));
        assert!(result.message.unwrap().contains("maxLength"));
    }

    #[tokio::test]
    async fn test_unsupported_type_on_query_backend_has_no_expression() {
        let backend = Backend::from(query_backend("t", int_batch("age", vec![Some(31)])).await);
        let column = Column::new("age", DataType::Int64);

        let result = evaluate_metric(&MaxLength, &column, &backend).unwrap();
        assert!(result.capability_rejected);
        assert_eq!(result.output, MetricOutput::NoExpression);
    }

    #[tokio::test]
    async fn test_supported_type_on_query_backend_builds_expression() {
        let backend =
            Backend::from(query_backend("t", string_batch("name", vec![Some("ada")])).await);
        let column = Column::new("name", DataType::Utf8);

        let result = BoundMetric::new(&MaxLength, &column, &backend)
            .evaluate()
            .unwrap();
        assert!(!result.capability_rejected);
        let expr = result.output.expression().unwrap();
        assert_eq!(expr.sql(), "MAX(CHARACTER_LENGTH(\"name\"))");
        assert_eq!(expr.metric(), "maxLength");
        assert_eq!(expr.column(), "name");
    }

    #[tokio::test]
    async fn test_column_names_are_quoted_not_rejected() {
        let backend =
            Backend::from(query_backend("t", string_batch("name", vec![Some("ada")])).await);

        let column = Column::new("first \"name\"; DROP TABLE t", DataType::Utf8);
        let result = evaluate_metric(&MaxLength, &column, &backend).unwrap();
        assert_eq!(
            result.output.expression().unwrap().sql(),
            "MAX(CHARACTER_LENGTH(\"first \"\"name\"\"; DROP TABLE t\"))"
        );

        let column = Column::new("name\0", DataType::Utf8);
        let err = evaluate_metric(&MaxLength, &column, &backend).unwrap_err();
        assert!(matches!(err, ProfileError::Security(_)));
    }

    #[test]
    fn test_verbose_logging_does_not_change_the_result() {
        let backend = Backend::from(MaterializedTable::from_batch(
            "t",
            int_batch("age", vec![Some(31)]),
        ));
        let column = Column::new("age", DataType::Int64);
        let verbose = LogConfig::verbose();

        let logged = BoundMetric::new(&MaxLength, &column, &backend)
            .with_log_config(&verbose)
            .evaluate()
            .unwrap();
        let quiet = BoundMetric::new(&MaxLength, &column, &backend)
            .evaluate()
            .unwrap();
        assert_eq!(logged, quiet);
        assert!(logged.capability_rejected);
    }

    #[test]
    fn test_metric_lookup() {
        assert_eq!(metric_by_name("maxLength").unwrap().name(), "maxLength");
        assert_eq!(metric_by_name("nullCount").unwrap().result_type(), ResultType::Long);
        assert_eq!(metric_by_name("mean").unwrap().result_type(), ResultType::Double);
        assert!(metric_by_name("unknown").is_none());

        let names: Vec<_> = all_metrics().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["maxLength", "minLength", "nullCount", "mean"]);
    }
}

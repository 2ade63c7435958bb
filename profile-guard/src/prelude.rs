//! Prelude for commonly used types and traits in profile-guard.

pub use crate::backend::{Backend, BackendKind, MaterializedTable, QueryBackend, TableAccess};
pub use crate::config::{ProfilerConfig, QueryConfig};
pub use crate::core::{
    Capability, Column, MetricOutput, MetricResult, MetricValue, Observation, ResultStatus,
    TestCase, TestCaseResult, TypeCategory,
};
pub use crate::error::{ErrorContext, ProfileError, Result};
pub use crate::logging::LogConfig;
pub use crate::metrics::{BoundMetric, Metric};
pub use crate::validators::{Validator, ValidatorRegistry};

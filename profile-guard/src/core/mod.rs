//! Core types shared by metrics and validators.
//!
//! - **[`Column`]** and the type registry that resolves its [`TypeCategory`]
//! - **[`supports`]**, the capability gate every type-sensitive check consults
//! - **[`TestCase`]**, the assertion request a validator runs
//! - **[`MetricResult`]** and **[`TestCaseResult`]**, the result envelopes

mod result;
mod test_case;
mod types;

pub use result::{
    MetricOutput, MetricResult, MetricValue, Observation, ResultStatus, ResultType,
    TestCaseResult,
};
pub use test_case::TestCase;
pub use types::{supports, Capability, Column, TypeCategory, TypeRegistry};

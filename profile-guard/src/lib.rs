//! # profile-guard
//!
//! Column metrics and test case validators that give the same answer
//! whether a table lives behind a query engine or is already loaded in
//! memory.
//!
//! ## Overview
//!
//! Every check is written once and runs against either backend:
//!
//! - **Query pushdown** ([`backend::QueryBackend`]): a DataFusion session
//!   with a registered table. Metrics build deferred SQL aggregates that the
//!   backend executes in a single scan.
//! - **Materialized** ([`backend::MaterializedTable`]): Arrow record batches.
//!   Metrics compute their values directly.
//!
//! Column types are classified once into a [`core::TypeCategory`]. Before
//! anything type-sensitive runs, the capability gate ([`core::supports`])
//! decides whether the category allows it. Unsupported types never fail a
//! metric: the query backend reports no expression and the materialized
//! backend reports zero.
//!
//! ## Quick Start
//!
//! ```rust
//! use profile_guard::prelude::*;
//! use profile_guard::metrics::MaxLength;
//! use profile_guard::validators::TableColumnNameToExist;
//! use arrow::array::StringArray;
//! use arrow::datatypes::{DataType, Field, Schema};
//! use arrow::record_batch::RecordBatch;
//! use datafusion::prelude::SessionContext;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let schema = Arc::new(Schema::new(vec![Field::new("email", DataType::Utf8, true)]));
//! let batch = RecordBatch::try_new(
//!     schema,
//!     vec![Arc::new(StringArray::from(vec![Some("ada@example.com"), None]))],
//! )
//! .unwrap();
//!
//! let ctx = SessionContext::new();
//! ctx.register_batch("customers", batch.clone()).unwrap();
//! let query = Backend::from(QueryBackend::new(ctx, "customers"));
//! let memory = Backend::from(MaterializedTable::from_batch("customers", batch));
//!
//! // Same metric, both backends
//! let column = query.column("email").await.unwrap();
//! let deferred = BoundMetric::new(&MaxLength, &column, &query).evaluate().unwrap();
//! let eager = BoundMetric::new(&MaxLength, &column, &memory).evaluate().unwrap();
//!
//! let Backend::Query(engine) = &query else { unreachable!() };
//! let executed = engine
//!     .execute(&[deferred.output.expression().unwrap().clone()])
//!     .await
//!     .unwrap();
//! assert_eq!(executed[0].as_ref(), eager.output.value());
//!
//! // Same test case, both backends
//! let test_case = TestCase::new("email_exists", "customers").with_parameter("columnName", "email");
//! assert_eq!(
//!     TableColumnNameToExist.run(&query, &test_case).await.unwrap(),
//!     TableColumnNameToExist.run(&memory, &test_case).await.unwrap(),
//! );
//! # });
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`error::Result`]. Validators turn errors that
//! mean "this test case cannot be evaluated" into errored results naming the
//! test case; backend failures from DataFusion or Arrow are returned as
//! errors.
//!
//! ## Logging
//!
//! Evaluation entry points are instrumented with `tracing`. Applications
//! without a subscriber can install one with
//! [`logging::setup::init_logging`].

pub mod backend;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod prelude;
pub mod security;
pub mod validators;

#[cfg(test)]
pub(crate) mod test_helpers;

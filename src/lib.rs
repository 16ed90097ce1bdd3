//! crashlens: a query engine for interactive exploration of vehicle-collision
//! records.
//!
//! The engine loads a CSV or Parquet export of collision person records,
//! resolves the columns it understands ([`schema`]), derives computed columns
//! ([`features`]), and answers generate-report requests: a [`FilterCriteria`]
//! goes in, a [`ResultBundle`] of chart-ready aggregates and KPI figures comes
//! out. Missing columns and empty result sets degrade to placeholders rather
//! than errors, so every request produces a renderable report.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod convert;
pub mod criteria;
pub mod engine;
pub mod features;
pub mod kpi;
pub mod schema;
pub mod source;

pub use criteria::FilterCriteria;
pub use engine::{Dashboard, ResultBundle, NO_DATA_MESSAGE};
pub use kpi::KpiSummary;
pub use schema::{ResolvedSchema, Role};

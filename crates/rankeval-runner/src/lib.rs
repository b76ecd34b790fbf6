//! Parallel aggregation of run evaluations.
//!
//! A run is every recommendation file of one (dataset, algorithm) pair, one file per test
//! partition. The [`Aggregator`] discovers the files, evaluates them on a bounded worker pool,
//! and persists a single score table ordered by partition id.
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::float_cmp,
        reason = "Test allows"
    )
)]

/// Bounded parallel aggregation.
pub mod aggregate;
/// Run file discovery.
pub mod discovery;
/// Score table summaries.
pub mod summary;

pub use aggregate::{AggregateReport, Aggregator};
pub use discovery::{RunFile, RunLayout, discover, parse_partition};
pub use summary::{MetricSummary, log_summary, render_markdown, summarize};

//! Rank-sensitive top-N metrics and the per-run evaluator.
//!
//! Metrics are registered statically in [`registry`]; each kind has a scalar form that scores
//! one user's list and a bulk form that scores a whole run table in one pass. The two forms
//! always agree. [`RunEvaluator`] combines a [`MetricSet`] with the missing-score policy and
//! produces the per-user score rows of one run.
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

/// Per-run evaluation.
pub mod analysis;
/// Rank discounting.
pub mod discount;
/// Metric implementations.
pub mod library;
/// Configured metric sets.
pub mod metric_set;
/// Static metric registry.
pub mod registry;

pub use analysis::RunEvaluator;
pub use discount::{PATIENCE, discount, rbp_max, test_weight};
pub use library::{BulkScores, MetricParams};
pub use metric_set::{Metric, MetricSet};
pub use registry::{MetricEntry, MetricKind, REGISTRY, lookup};

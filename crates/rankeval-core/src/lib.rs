//! Core types for top-N recommendation evaluation.
//!
//! This crate provides the table types shared by the data splitter and the evaluator, the
//! Parquet/CSV codec, configuration, the dataset registry, and deterministic seed derivation.
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

/// Configuration loaded from `rankeval.toml`.
pub mod config;
/// Dataset registry.
pub mod datasets;
/// Error types and result definitions.
pub mod error;
/// Recommendation list tables.
pub mod recs;
/// Aggregated score tables.
pub mod scores;
/// Deterministic seed derivation.
pub mod seed;
/// Parquet and CSV codec.
pub mod table;
/// Held-out truth tables.
pub mod truth;
/// Row types.
pub mod types;

pub use config::{EvaluateConfig, MetricConfig, PathsConfig, RankevalConfig, Strategy};
pub use datasets::{DatasetRegistry, DatasetSource, TableFormat};
pub use error::{Error, Result};
pub use recs::RecTable;
pub use scores::{PartitionScore, ScoreTable};
pub use seed::{Params, RandomParams, derive_seed};
pub use truth::{TruthSet, TruthTable};
pub use types::{Interaction, ItemId, PartitionId, RecRow, ScoreRow, TruthRow, UserId};

//! Static table of metric kinds.
//!
//! Every kind maps to a scalar and a bulk implementation. The entry type has no optional
//! fields, so a kind without both forms does not compile.

use core::fmt;
use core::str::FromStr;

use rankeval_core::{Error, RecRow, RecTable, TruthSet, TruthTable};

use crate::library::{self, BulkScores, MetricParams};

/// Scalar form: one user's list against that user's truth set.
pub type ScalarFn = fn(&[RecRow], &TruthSet, &MetricParams) -> Option<f64>;

/// Bulk form: a whole run table against a whole truth table.
pub type BulkFn = fn(&RecTable, &TruthTable, &MetricParams) -> BulkScores;

/// Metric kinds known to the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Rank-biased precision
    Rbp,
    /// Normalized discounted cumulative gain
    Ndcg,
    /// Reciprocal rank of the first relevant entry
    RecipRank,
    /// Hit indicator
    Hit,
    /// Precision at the cutoff
    Precision,
    /// Recall at the cutoff
    Recall,
}

impl MetricKind {
    /// Name used in configuration files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rbp => "rbp",
            Self::Ndcg => "ndcg",
            Self::RecipRank => "recip_rank",
            Self::Hit => "hit",
            Self::Precision => "precision",
            Self::Recall => "recall",
        }
    }

    /// Whether the kind reads the patience parameter.
    pub const fn uses_patience(self) -> bool {
        matches!(self, Self::Rbp)
    }

    /// The registry entry for this kind.
    pub fn entry(self) -> &'static MetricEntry {
        match self {
            Self::Rbp => &RBP,
            Self::Ndcg => &NDCG,
            Self::RecipRank => &RECIP_RANK,
            Self::Hit => &HIT,
            Self::Precision => &PRECISION,
            Self::Recall => &RECALL,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        REGISTRY
            .iter()
            .map(|entry| entry.kind)
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| {
                let known: Vec<&str> = REGISTRY.iter().map(|entry| entry.kind.as_str()).collect();
                Error::Config(format!(
                    "Unknown metric kind `{name}` (expected one of: {})",
                    known.join(", ")
                ))
            })
    }
}

/// A metric kind with both of its implementations.
#[derive(Debug, Clone, Copy)]
pub struct MetricEntry {
    /// Kind this entry implements
    pub kind: MetricKind,
    /// Per-user implementation
    pub scalar: ScalarFn,
    /// Whole-table implementation
    pub bulk: BulkFn,
}

/// Rank-biased precision.
pub static RBP: MetricEntry = MetricEntry {
    kind: MetricKind::Rbp,
    scalar: library::rbp,
    bulk: library::bulk_rbp,
};

/// Normalized discounted cumulative gain.
pub static NDCG: MetricEntry = MetricEntry {
    kind: MetricKind::Ndcg,
    scalar: library::ndcg,
    bulk: library::bulk_ndcg,
};

/// Reciprocal rank.
pub static RECIP_RANK: MetricEntry = MetricEntry {
    kind: MetricKind::RecipRank,
    scalar: library::recip_rank,
    bulk: library::bulk_recip_rank,
};

/// Hit indicator.
pub static HIT: MetricEntry = MetricEntry {
    kind: MetricKind::Hit,
    scalar: library::hit,
    bulk: library::bulk_hit,
};

/// Precision.
pub static PRECISION: MetricEntry = MetricEntry {
    kind: MetricKind::Precision,
    scalar: library::precision,
    bulk: library::bulk_precision,
};

/// Recall.
pub static RECALL: MetricEntry = MetricEntry {
    kind: MetricKind::Recall,
    scalar: library::recall,
    bulk: library::bulk_recall,
};

/// Every registered metric.
pub static REGISTRY: [&MetricEntry; 6] = [&RBP, &NDCG, &RECIP_RANK, &HIT, &PRECISION, &RECALL];

/// Look up a metric kind by its configuration name.
///
/// # Errors
/// Returns a configuration error for unknown names
pub fn lookup(name: &str) -> rankeval_core::Result<&'static MetricEntry> {
    name.parse::<MetricKind>().map(MetricKind::entry)
}

//! Rank-biased precision.

use rankeval_core::{RecRow, RecTable, TruthSet, TruthTable};

use super::{BulkScores, MetricParams, fold_matches, join, truncate};
use crate::discount::discount;

/// Rank-biased precision of one list: `(1 - p) * Σ p^rank` over relevant entries.
///
/// Missing when the truth set is empty.
pub fn rbp(recs: &[RecRow], truth: &TruthSet, params: &MetricParams) -> Option<f64> {
    if truth.is_empty() {
        return None;
    }

    let total: f64 = truncate(recs, params.k)
        .iter()
        .filter(|row| truth.contains(row.item))
        .map(|row| discount(row.rank, params.patience))
        .sum();
    Some(total * (1.0 - params.patience))
}

/// Rank-biased precision of every list with at least one relevant entry.
pub fn bulk_rbp(recs: &RecTable, truth: &TruthTable, params: &MetricParams) -> BulkScores {
    let matches = join(recs, truth, params.k);
    let mut scores = fold_matches(&matches, |total, found| {
        total + discount(found.rank, params.patience)
    });
    for score in scores.values_mut() {
        *score *= 1.0 - params.patience;
    }
    scores
}

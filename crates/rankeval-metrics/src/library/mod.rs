//! Per-user top-N metrics, each in a scalar and a bulk form.
//!
//! A scalar form scores one user's list against that user's truth set. A bulk form scores a
//! whole run table in one pass: it truncates every list, joins the surviving rows to the truth
//! table on (user, item), and folds the matches per user. Bulk output only contains users with
//! at least one match; the evaluator fills the rest with 0 (non-empty truth) or missing (empty
//! truth), which is exactly what the scalar form returns for them.

mod hit;
mod ndcg;
mod precision;
mod rbp;
mod recip_rank;

use std::collections::BTreeMap;

use rankeval_core::{RecRow, RecTable, TruthTable, UserId};

use crate::discount::PATIENCE;

pub use hit::{bulk_hit, hit};
pub use ndcg::{bulk_ndcg, ndcg};
pub use precision::{bulk_precision, bulk_recall, precision, recall};
pub use rbp::{bulk_rbp, rbp};
pub use recip_rank::{bulk_recip_rank, recip_rank};

/// Per-user scores produced by a bulk form.
pub type BulkScores = BTreeMap<UserId, f64>;

/// Parameters shared by every metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricParams {
    /// Rank cutoff; `None` scores the whole list
    pub k: Option<usize>,
    /// Patience for rank-biased precision
    pub patience: f64,
}

impl MetricParams {
    /// Parameters with a cutoff and the default patience.
    pub const fn at(cutoff: usize) -> Self {
        Self {
            k: Some(cutoff),
            patience: PATIENCE,
        }
    }
}

impl Default for MetricParams {
    fn default() -> Self {
        Self {
            k: None,
            patience: PATIENCE,
        }
    }
}

/// The first `k` entries of a list, or all of them.
pub(crate) fn truncate(list: &[RecRow], cutoff: Option<usize>) -> &[RecRow] {
    match cutoff {
        Some(limit) if limit < list.len() => &list[..limit],
        _ => list,
    }
}

/// A recommendation row that joined to a truth row.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Match {
    pub user: UserId,
    /// 1-based position within the user's list
    pub position: usize,
    pub rank: u32,
    pub gain: f64,
}

/// Inner join of every list, truncated to `cutoff`, with the truth table on (user, item).
///
/// Matches come out ordered by user, then position.
pub(crate) fn join(recs: &RecTable, truth: &TruthTable, cutoff: Option<usize>) -> Vec<Match> {
    let mut matches = Vec::new();
    for (user, list) in recs.lists() {
        let Some(relevant) = truth.get(user) else {
            continue;
        };
        for (offset, row) in truncate(list, cutoff).iter().enumerate() {
            if let Some(gain) = relevant.gain(row.item) {
                matches.push(Match {
                    user,
                    position: offset + 1,
                    rank: row.rank,
                    gain,
                });
            }
        }
    }
    matches
}

/// Group-fold matches per user.
pub(crate) fn fold_matches<F>(matches: &[Match], mut step: F) -> BulkScores
where
    F: FnMut(f64, &Match) -> f64,
{
    let mut scores = BulkScores::new();
    for found in matches {
        let total = scores.entry(found.user).or_insert(0.0);
        *total = step(*total, found);
    }
    scores
}

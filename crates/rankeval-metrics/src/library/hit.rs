//! Hit indicator.

use rankeval_core::{RecRow, RecTable, TruthSet, TruthTable};

use super::{BulkScores, MetricParams, fold_matches, join, truncate};

/// 1 when any of the first `k` entries is relevant, 0 otherwise.
///
/// Missing when the truth set is empty.
pub fn hit(recs: &[RecRow], truth: &TruthSet, params: &MetricParams) -> Option<f64> {
    if truth.is_empty() {
        return None;
    }

    let found = truncate(recs, params.k)
        .iter()
        .any(|row| truth.contains(row.item));
    Some(if found { 1.0 } else { 0.0 })
}

/// Hit indicator of every list with at least one relevant entry; always 1.
pub fn bulk_hit(recs: &RecTable, truth: &TruthTable, params: &MetricParams) -> BulkScores {
    fold_matches(&join(recs, truth, params.k), |_, _| 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[i64]) -> Vec<RecRow> {
        items
            .iter()
            .zip(1..)
            .map(|(&item, rank)| RecRow { user: 1, item, rank })
            .collect()
    }

    #[test]
    fn test_hit_within_cutoff() {
        let truth = TruthSet::from_gains([(12, 1.0)]);
        let recs = list(&[10, 11, 12]);
        assert_eq!(hit(&recs, &truth, &MetricParams::at(3)), Some(1.0));
        assert_eq!(hit(&recs, &truth, &MetricParams::at(2)), Some(0.0));
    }

    #[test]
    fn test_empty_list_is_a_miss() {
        let truth = TruthSet::from_gains([(12, 1.0)]);
        assert_eq!(hit(&[], &truth, &MetricParams::default()), Some(0.0));
    }

    #[test]
    fn test_empty_truth_is_missing() {
        assert!(hit(&list(&[10]), &TruthSet::default(), &MetricParams::default()).is_none());
    }
}

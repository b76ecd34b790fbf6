//! Precision and recall at a cutoff.

use rankeval_core::{RecRow, RecTable, TruthSet, TruthTable};

use super::{BulkScores, MetricParams, fold_matches, join, truncate};

fn count_relevant(recs: &[RecRow], truth: &TruthSet) -> usize {
    recs.iter().filter(|row| truth.contains(row.item)).count()
}

fn recall_denominator(truth: &TruthSet, cutoff: Option<usize>) -> usize {
    cutoff.map_or(truth.len(), |limit| truth.len().min(limit))
}

/// Fraction of the first `k` entries that are relevant.
///
/// Missing when the truth set or the list is empty.
pub fn precision(recs: &[RecRow], truth: &TruthSet, params: &MetricParams) -> Option<f64> {
    let shown = truncate(recs, params.k);
    if truth.is_empty() || shown.is_empty() {
        return None;
    }

    Some(count_relevant(shown, truth) as f64 / shown.len() as f64)
}

/// Precision of every list with at least one relevant entry.
pub fn bulk_precision(recs: &RecTable, truth: &TruthTable, params: &MetricParams) -> BulkScores {
    let mut scores = fold_matches(&join(recs, truth, params.k), |total, _| total + 1.0);
    for (user, score) in &mut scores {
        let shown = recs
            .list(*user)
            .map_or(0, |list| truncate(list, params.k).len());
        *score /= shown as f64;
    }
    scores
}

/// Fraction of the relevant items found in the first `k` entries, out of at most `k`.
///
/// Missing when the truth set is empty.
pub fn recall(recs: &[RecRow], truth: &TruthSet, params: &MetricParams) -> Option<f64> {
    if truth.is_empty() {
        return None;
    }

    let found = count_relevant(truncate(recs, params.k), truth);
    let possible = recall_denominator(truth, params.k);
    Some(if possible == 0 {
        0.0
    } else {
        found as f64 / possible as f64
    })
}

/// Recall of every list with at least one relevant entry.
pub fn bulk_recall(recs: &RecTable, truth: &TruthTable, params: &MetricParams) -> BulkScores {
    let mut scores = fold_matches(&join(recs, truth, params.k), |total, _| total + 1.0);
    for (user, score) in &mut scores {
        let possible = truth
            .get(*user)
            .map_or(0, |relevant| recall_denominator(relevant, params.k));
        *score /= possible as f64;
    }
    scores
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
    fn test_precision_over_shown_entries() {
        let truth = TruthSet::from_gains([(10, 1.0), (12, 1.0)]);
        let recs = list(&[10, 11, 12, 13]);
        assert_eq!(precision(&recs, &truth, &MetricParams::default()), Some(0.5));
        assert_eq!(precision(&recs, &truth, &MetricParams::at(1)), Some(1.0));
        // a short list is not padded up to the cutoff
        assert_eq!(precision(&recs, &truth, &MetricParams::at(10)), Some(0.5));
    }

    #[test]
    fn test_precision_of_empty_list_is_missing() {
        let truth = TruthSet::from_gains([(10, 1.0)]);
        assert!(precision(&[], &truth, &MetricParams::default()).is_none());
    }

    #[test]
    fn test_recall_caps_denominator_at_cutoff() {
        let truth = TruthSet::from_gains([(10, 1.0), (11, 1.0), (12, 1.0), (13, 1.0)]);
        let recs = list(&[10, 99]);
        assert_eq!(recall(&recs, &truth, &MetricParams::default()), Some(0.25));
        assert_eq!(recall(&recs, &truth, &MetricParams::at(2)), Some(0.5));
    }

    #[test]
    fn test_empty_truth_is_missing() {
        let recs = list(&[10]);
        assert!(precision(&recs, &TruthSet::default(), &MetricParams::default()).is_none());
        assert!(recall(&recs, &TruthSet::default(), &MetricParams::default()).is_none());
    }
}

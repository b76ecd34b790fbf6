//! Normalized discounted cumulative gain.

use rankeval_core::{RecRow, RecTable, TruthSet, TruthTable};

use super::{BulkScores, MetricParams, fold_matches, join, truncate};

/// Logarithmic position discount, clamped so the first two positions are undiscounted.
fn position_discount(position: usize) -> f64 {
    (position as f64).log2().max(1.0)
}

fn dcg(gains: impl IntoIterator<Item = (usize, f64)>) -> f64 {
    gains
        .into_iter()
        .map(|(position, gain)| gain / position_discount(position))
        .sum()
}

fn ideal_dcg(truth: &TruthSet, cutoff: Option<usize>) -> f64 {
    dcg(truth
        .ideal_gains(cutoff)
        .into_iter()
        .enumerate()
        .map(|(offset, gain)| (offset + 1, gain)))
}

fn normalize(actual: f64, ideal: f64) -> f64 {
    if ideal.abs() < f64::EPSILON {
        0.0
    } else {
        actual / ideal
    }
}

/// nDCG of one list. Gains come from the truth set (rating, or 1 when unrated).
///
/// Missing when the truth set is empty; 0 when the ideal DCG is 0.
pub fn ndcg(recs: &[RecRow], truth: &TruthSet, params: &MetricParams) -> Option<f64> {
    if truth.is_empty() {
        return None;
    }

    let actual = dcg(truncate(recs, params.k)
        .iter()
        .enumerate()
        .filter_map(|(offset, row)| truth.gain(row.item).map(|gain| (offset + 1, gain))));
    Some(normalize(actual, ideal_dcg(truth, params.k)))
}

/// nDCG of every list with at least one relevant entry.
pub fn bulk_ndcg(recs: &RecTable, truth: &TruthTable, params: &MetricParams) -> BulkScores {
    let matches = join(recs, truth, params.k);
    let mut scores = fold_matches(&matches, |total, found| {
        total + found.gain / position_discount(found.position)
    });
    for (user, score) in &mut scores {
        let ideal = truth
            .get(*user)
            .map_or(0.0, |relevant| ideal_dcg(relevant, params.k));
        *score = normalize(*score, ideal);
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
    fn test_perfect_ordering_scores_one() {
        let truth = TruthSet::from_gains([(10, 1.0), (11, 1.0)]);
        let score = ndcg(&list(&[10, 11, 12]), &truth, &MetricParams::default()).unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_graded_gains() {
        let truth = TruthSet::from_gains([(10, 1.0), (11, 5.0)]);
        // actual: 1/1 + 5/1 at positions 1 and 2, ideal: 5/1 + 1/1
        let swapped = ndcg(&list(&[10, 11]), &truth, &MetricParams::default()).unwrap();
        assert!((swapped - 1.0).abs() < 1e-12);

        // relevant item at position 4 is discounted by log2(4) = 2
        let late = ndcg(&list(&[1, 2, 3, 11]), &truth, &MetricParams::default()).unwrap();
        assert!((late - 2.5 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_cutoff_truncates_ideal() {
        let truth = TruthSet::from_gains([(10, 1.0), (11, 1.0), (12, 1.0)]);
        let score = ndcg(&list(&[10, 99]), &truth, &MetricParams::at(1)).unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_truth_is_missing() {
        assert!(ndcg(&list(&[10]), &TruthSet::default(), &MetricParams::default()).is_none());
    }

    #[test]
    fn test_zero_gain_truth_scores_zero() {
        let truth = TruthSet::from_gains([(10, 0.0)]);
        assert_eq!(
            ndcg(&list(&[10]), &truth, &MetricParams::default()),
            Some(0.0)
        );
    }
}

//! Reciprocal rank.

use rankeval_core::{RecRow, RecTable, TruthSet, TruthTable};

use super::{BulkScores, MetricParams, fold_matches, join, truncate};

fn reciprocal(position: usize) -> f64 {
    1.0 / position as f64
}

/// `1 / position` of the first relevant entry among the first `k`, or 0.
///
/// Missing when the truth set is empty.
pub fn recip_rank(recs: &[RecRow], truth: &TruthSet, params: &MetricParams) -> Option<f64> {
    if truth.is_empty() {
        return None;
    }

    Some(
        truncate(recs, params.k)
            .iter()
            .position(|row| truth.contains(row.item))
            .map_or(0.0, |offset| reciprocal(offset + 1)),
    )
}

/// Reciprocal rank of every list with at least one relevant entry.
pub fn bulk_recip_rank(recs: &RecTable, truth: &TruthTable, params: &MetricParams) -> BulkScores {
    // matches arrive in position order, so the first one per user wins
    fold_matches(&join(recs, truth, params.k), |best, found| {
        if best > 0.0 {
            best
        } else {
            reciprocal(found.position)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankeval_core::TruthRow;

    fn list(items: &[i64]) -> Vec<RecRow> {
        items
            .iter()
            .zip(1..)
            .map(|(&item, rank)| RecRow { user: 1, item, rank })
            .collect()
    }

    #[test]
    fn test_first_relevant_position() {
        let truth = TruthSet::from_gains([(11, 1.0), (13, 1.0)]);
        let score = recip_rank(&list(&[10, 11, 12, 13]), &truth, &MetricParams::default());
        assert_eq!(score, Some(0.5));
    }

    #[test]
    fn test_no_relevant_entry() {
        let truth = TruthSet::from_gains([(99, 1.0)]);
        assert_eq!(
            recip_rank(&list(&[10, 11]), &truth, &MetricParams::default()),
            Some(0.0)
        );
    }

    #[test]
    fn test_cutoff_hides_relevant_entry() {
        let truth = TruthSet::from_gains([(12, 1.0)]);
        assert_eq!(
            recip_rank(&list(&[10, 11, 12]), &truth, &MetricParams::at(2)),
            Some(0.0)
        );
    }

    #[test]
    fn test_bulk_keeps_first_match() {
        let recs = RecTable::new(list(&[10, 11, 12])).unwrap();
        let truth = TruthTable::from_rows([11, 12].map(|item| TruthRow {
            user: 1,
            item,
            rating: None,
        }));
        let scores = bulk_recip_rank(&recs, &truth, &MetricParams::default());
        assert_eq!(scores.get(&1), Some(&0.5));
    }
}

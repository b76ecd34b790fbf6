//! End-to-end metric scenarios on small hand-built runs.

#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::tests_outside_test_module,
        clippy::float_cmp,
        reason = "Test allows"
    )
)]

use rankeval_core::{RecRow, RecTable, ScoreRow, Strategy, TruthRow, TruthTable, UserId};
use rankeval_metrics::RunEvaluator;

fn score(rows: &[ScoreRow], user: UserId, metric: &str) -> Option<Option<f64>> {
    rows.iter()
        .find(|row| row.user == user && row.metric == metric)
        .map(|row| row.score)
}

fn two_item_list() -> RecTable {
    RecTable::new(vec![
        RecRow {
            user: 1,
            item: 100,
            rank: 1,
        },
        RecRow {
            user: 1,
            item: 200,
            rank: 2,
        },
    ])
    .unwrap()
}

#[test]
fn test_single_relevant_item_at_top() {
    let truth = TruthTable::from_rows([TruthRow {
        user: 1,
        item: 100,
        rating: None,
    }]);

    for strategy in [Strategy::Bulk, Strategy::Scalar] {
        let rows = RunEvaluator::default()
            .with_strategy(strategy)
            .evaluate(&two_item_list(), &truth);

        let rbp = score(&rows, 1, "rbp").unwrap().unwrap();
        assert!((rbp - 0.16).abs() < 1e-12);
        assert_eq!(score(&rows, 1, "hit10"), Some(Some(1.0)));
        assert_eq!(score(&rows, 1, "recip_rank"), Some(Some(1.0)));
        assert_eq!(score(&rows, 1, "ndcg"), Some(Some(1.0)));
    }
}

#[test]
fn test_empty_truth_reports_missing_only_when_asked() {
    let truth = TruthTable::default();

    let with_missing = RunEvaluator::default().evaluate(&two_item_list(), &truth);
    assert_eq!(with_missing.len(), 6);
    assert_eq!(score(&with_missing, 1, "rbp"), Some(None));
    assert!(with_missing.iter().all(|row| row.score.is_none()));

    let without = RunEvaluator::default()
        .with_include_missing(false)
        .evaluate(&two_item_list(), &truth);
    assert!(without.is_empty());
}

//! Integration tests for run discovery and parallel aggregation.

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

use std::fs::{create_dir_all, write};
use std::path::Path;

use rankeval_core::table::{read_scores, write_recommendations, write_test_set};
use rankeval_core::{Error, Interaction, PartitionId, RecRow};
use rankeval_metrics::RunEvaluator;
use rankeval_runner::{Aggregator, RunLayout};
use tempfile::TempDir;

fn layout(root: &Path) -> RunLayout {
    RunLayout::new(root.join("runs"), root.join("data-split"))
}

fn rec(user: i64, item: i64, rank: u32) -> RecRow {
    RecRow { user, item, rank }
}

fn held_out(index: u64, user: i64, item: i64) -> Interaction {
    Interaction {
        index,
        user,
        item,
        rating: None,
        timestamp: None,
    }
}

/// Partition `id`: user 1 ranks [100, 200], user 2 ranks [300]; truth holds item `100 * id`
/// for user 1 and item 300 for user 2.
fn write_partition(layout: &RunLayout, id: u32) {
    let partition = PartitionId(id);
    let run_dir = layout.run_dir("ml", "als");
    write_recommendations(
        &run_dir.join(format!("recs-{id}.parquet")),
        &[rec(1, 100, 1), rec(1, 200, 2), rec(2, 300, 1)],
    )
    .unwrap();
    write_test_set(
        &layout.truth_path("ml", partition),
        &[held_out(0, 1, i64::from(id) * 100), held_out(1, 2, 300)],
    )
    .unwrap();
}

#[tokio::test]
async fn test_scores_merged_in_partition_order() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    for id in [10, 2, 1] {
        write_partition(&layout, id);
    }

    let report = Aggregator::new(layout.clone(), RunEvaluator::default())
        .with_max_workers(2)
        .run("ml", "als", None)
        .await
        .unwrap();

    assert_eq!(report.output, layout.scores_path("ml", "als"));
    assert_eq!(
        report.scores.partitions(),
        vec![PartitionId(1), PartitionId(2), PartitionId(10)]
    );
    // 3 partitions x 2 users x 6 metrics
    assert_eq!(report.scores.len(), 36);

    let rbp = report.scores.get(PartitionId(1), 1, "rbp").unwrap().unwrap();
    assert!((rbp - 0.16).abs() < 1e-12);
    assert_eq!(report.scores.get(PartitionId(1), 1, "hit10"), Some(Some(1.0)));
    assert_eq!(report.scores.get(PartitionId(1), 1, "recip_rank"), Some(Some(1.0)));
    assert_eq!(report.scores.get(PartitionId(2), 1, "recip_rank"), Some(Some(0.5)));
    assert_eq!(report.scores.get(PartitionId(10), 1, "hit"), Some(Some(0.0)));

    let persisted = read_scores(&report.output).unwrap();
    assert_eq!(persisted, report.scores);

    let rbp_summary = &report.summary[0];
    assert_eq!(rbp_summary.metric, "rbp");
    assert_eq!(rbp_summary.count, 6);
    assert_eq!(rbp_summary.missing, 0);
}

#[tokio::test]
async fn test_result_independent_of_worker_count() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    for id in 1..=6 {
        write_partition(&layout, id);
    }

    let serial = Aggregator::new(layout.clone(), RunEvaluator::default())
        .with_max_workers(1)
        .aggregate("ml", "als")
        .await
        .unwrap();
    let parallel = Aggregator::new(layout, RunEvaluator::default())
        .with_max_workers(0)
        .aggregate("ml", "als")
        .await
        .unwrap();
    assert_eq!(serial, parallel);
}

#[tokio::test]
async fn test_missing_truth_file_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    write_partition(&layout, 1);
    write_recommendations(
        &layout.run_dir("ml", "als").join("recs-2.parquet"),
        &[rec(1, 100, 1)],
    )
    .unwrap();

    let error = Aggregator::new(layout.clone(), RunEvaluator::default())
        .run("ml", "als", None)
        .await
        .unwrap_err();
    assert!(matches!(error, Error::MissingTruth { partition: 2, .. }));
    assert!(!layout.scores_path("ml", "als").exists());
}

#[tokio::test]
async fn test_failing_run_file_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    for id in 1..=4 {
        write_partition(&layout, id);
    }
    let broken = layout.run_dir("ml", "als").join("recs-3.parquet");
    write(&broken, b"not parquet").unwrap();

    let output = temp.path().join("out").join("scores.parquet");
    let result = Aggregator::new(layout, RunEvaluator::default())
        .with_max_workers(2)
        .run("ml", "als", Some(&output))
        .await;
    assert!(result.is_err());
    assert!(!output.exists());
}

#[tokio::test]
async fn test_misnamed_run_file_is_fatal() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    write_partition(&layout, 1);
    let run_dir = layout.run_dir("ml", "als");
    create_dir_all(&run_dir).unwrap();
    write(run_dir.join("recs-1-old.parquet"), b"").unwrap();

    let error = Aggregator::new(layout, RunEvaluator::default())
        .aggregate("ml", "als")
        .await
        .unwrap_err();
    assert!(matches!(error, Error::RunFileName(_)));
}

#[tokio::test]
async fn test_unrelated_file_in_run_directory_is_fatal() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    write_partition(&layout, 1);
    write(layout.run_dir("ml", "als").join("README.md"), "notes").unwrap();

    let error = Aggregator::new(layout.clone(), RunEvaluator::default())
        .run("ml", "als", None)
        .await
        .unwrap_err();
    assert!(matches!(&error, Error::RunFileName(name) if name == "README.md"), "{error}");
    assert!(!layout.scores_path("ml", "als").exists());
}

#[tokio::test]
async fn test_first_partition_failure_is_reported() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    for id in 1..=6 {
        write_partition(&layout, id);
    }
    write(layout.run_dir("ml", "als").join("recs-1.parquet"), b"garbage").unwrap();

    let error = Aggregator::new(layout.clone(), RunEvaluator::default())
        .with_max_workers(1)
        .run("ml", "als", None)
        .await
        .unwrap_err();
    assert!(matches!(error, Error::Parquet(_)), "{error}");
    assert!(!layout.scores_path("ml", "als").exists());
}

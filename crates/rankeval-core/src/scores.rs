//! Aggregated score table keyed by (partition, user, metric).

use std::collections::BTreeMap;

use crate::types::{PartitionId, ScoreRow, UserId};

/// One row of the aggregated score table.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionScore {
    /// Partition the run file belongs to
    pub partition: PartitionId,
    /// Scored user
    pub user: UserId,
    /// Metric name
    pub metric: String,
    /// Score, or `None` when undefined for the user
    pub score: Option<f64>,
}

/// Scores of every run of a (dataset, algorithm) pair, ordered by partition id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreTable {
    rows: Vec<PartitionScore>,
}

impl ScoreTable {
    /// Concatenate per-partition results in partition order.
    pub fn from_partitions(parts: BTreeMap<PartitionId, Vec<ScoreRow>>) -> Self {
        let rows = parts
            .into_iter()
            .flat_map(|(partition, scores)| {
                scores.into_iter().map(move |row| PartitionScore {
                    partition,
                    user: row.user,
                    metric: row.metric,
                    score: row.score,
                })
            })
            .collect();
        Self { rows }
    }

    /// Wrap rows that are already in table order.
    pub fn from_rows(rows: Vec<PartitionScore>) -> Self {
        Self { rows }
    }

    /// All rows in table order.
    pub fn rows(&self) -> &[PartitionScore] {
        &self.rows
    }

    /// Look up one cell. The outer `Option` is row presence, the inner one is the score.
    pub fn get(&self, partition: PartitionId, user: UserId, metric: &str) -> Option<Option<f64>> {
        self.rows
            .iter()
            .find(|row| row.partition == partition && row.user == user && row.metric == metric)
            .map(|row| row.score)
    }

    /// Metric names in first-seen order.
    pub fn metrics(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !names.contains(&row.metric.as_str()) {
                names.push(&row.metric);
            }
        }
        names
    }

    /// Distinct partitions, ascending.
    pub fn partitions(&self) -> Vec<PartitionId> {
        let mut partitions: Vec<PartitionId> = self.rows.iter().map(|row| row.partition).collect();
        partitions.dedup();
        partitions
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

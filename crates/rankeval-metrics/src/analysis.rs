//! Scoring of one run against one truth table.

use std::collections::BTreeSet;

use rankeval_core::{
    EvaluateConfig, RecTable, Result, ScoreRow, Strategy, TruthSet, TruthTable, UserId,
};
use tracing::debug;

use crate::library::BulkScores;
use crate::metric_set::{Metric, MetricSet};

/// Computes every metric of a [`MetricSet`] for every user of a run.
#[derive(Debug, Clone)]
pub struct RunEvaluator {
    metrics: MetricSet,
    include_missing: bool,
    strategy: Strategy,
}

impl RunEvaluator {
    /// Evaluator with the bulk strategy that reports missing scores.
    pub fn new(metrics: MetricSet) -> Self {
        Self {
            metrics,
            include_missing: true,
            strategy: Strategy::Bulk,
        }
    }

    /// Evaluator configured from the `[evaluate]` section.
    ///
    /// # Errors
    /// Returns a configuration error if the metric set is invalid
    pub fn from_config(config: &EvaluateConfig) -> Result<Self> {
        Ok(Self::new(MetricSet::from_config(&config.metrics)?)
            .with_include_missing(config.include_missing)
            .with_strategy(config.strategy))
    }

    /// Report undefined scores as missing rows (`true`) or drop them (`false`).
    #[must_use]
    pub const fn with_include_missing(mut self, include_missing: bool) -> Self {
        self.include_missing = include_missing;
        self
    }

    /// Select the bulk or scalar metric path.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Metrics reported by this evaluator.
    pub const fn metrics(&self) -> &MetricSet {
        &self.metrics
    }

    /// Score every user of the run, ordered by user and then metric order.
    ///
    /// When missing scores are reported, users that only appear in the truth table are scored
    /// against an empty list.
    pub fn evaluate(&self, recs: &RecTable, truth: &TruthTable) -> Vec<ScoreRow> {
        let mut users: BTreeSet<UserId> = recs.users().collect();
        if self.include_missing {
            users.extend(truth.users());
        }

        let columns: Vec<Vec<Option<f64>>> = self
            .metrics
            .iter()
            .map(|metric| match self.strategy {
                Strategy::Bulk => Self::bulk_column(metric, &users, recs, truth),
                Strategy::Scalar => Self::scalar_column(metric, &users, recs, truth),
            })
            .collect();

        let mut rows = Vec::with_capacity(users.len() * self.metrics.len());
        for (position, &user) in users.iter().enumerate() {
            for (metric, column) in self.metrics.iter().zip(&columns) {
                let score = column[position];
                if score.is_some() || self.include_missing {
                    rows.push(ScoreRow {
                        user,
                        metric: metric.name.clone(),
                        score,
                    });
                }
            }
        }

        debug!(
            "Scored {} users ({} listed, {} with truth): {} rows",
            users.len(),
            recs.user_count(),
            truth.user_count(),
            rows.len()
        );
        rows
    }

    fn scalar_column(
        metric: &Metric,
        users: &BTreeSet<UserId>,
        recs: &RecTable,
        truth: &TruthTable,
    ) -> Vec<Option<f64>> {
        let empty = TruthSet::default();
        users
            .iter()
            .map(|&user| {
                let list = recs.list(user).unwrap_or_default();
                let relevant = truth.get(user).unwrap_or(&empty);
                (metric.entry.scalar)(list, relevant, &metric.params)
            })
            .collect()
    }

    fn bulk_column(
        metric: &Metric,
        users: &BTreeSet<UserId>,
        recs: &RecTable,
        truth: &TruthTable,
    ) -> Vec<Option<f64>> {
        let scores: BulkScores = (metric.entry.bulk)(recs, truth, &metric.params);
        let empty = TruthSet::default();
        users
            .iter()
            .map(|&user| {
                if let Some(&score) = scores.get(&user) {
                    return Some(score);
                }
                let relevant = truth.get(user).unwrap_or(&empty);
                match recs.list(user) {
                    _ if relevant.is_empty() => None,
                    Some(_) => Some(0.0),
                    // truth-only users: score the empty list directly
                    None => (metric.entry.scalar)(&[], relevant, &metric.params),
                }
            })
            .collect()
    }
}

impl Default for RunEvaluator {
    fn default() -> Self {
        Self::new(MetricSet::standard())
    }
}

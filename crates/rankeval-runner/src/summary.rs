//! Per-metric summary of a score table.

use std::collections::HashMap;

use rankeval_core::ScoreTable;
use tracing::info;

/// Aggregate view of one metric across every partition and user.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSummary {
    /// Metric name
    pub metric: String,
    /// Number of defined scores
    pub count: usize,
    /// Mean of the defined scores; `None` when there are none
    pub mean: Option<f64>,
    /// Number of missing scores
    pub missing: usize,
}

/// Summarize every metric of the table, in table metric order.
pub fn summarize(table: &ScoreTable) -> Vec<MetricSummary> {
    let mut totals: HashMap<&str, (f64, usize, usize)> = HashMap::new();
    for row in table.rows() {
        let entry = totals.entry(row.metric.as_str()).or_default();
        match row.score {
            Some(score) => {
                entry.0 += score;
                entry.1 += 1;
            }
            None => entry.2 += 1,
        }
    }

    table
        .metrics()
        .into_iter()
        .map(|metric| {
            let (sum, count, missing) = totals.get(metric).copied().unwrap_or_default();
            MetricSummary {
                metric: metric.to_owned(),
                count,
                mean: (count > 0).then(|| sum / count as f64),
                missing,
            }
        })
        .collect()
}

/// Log one line per metric.
pub fn log_summary(summaries: &[MetricSummary]) {
    for summary in summaries {
        match summary.mean {
            Some(mean) => info!(
                "{}: mean {:.4} over {} users ({} missing)",
                summary.metric, mean, summary.count, summary.missing
            ),
            None => info!(
                "{}: no defined scores ({} missing)",
                summary.metric, summary.missing
            ),
        }
    }
}

/// Render the summary as a Markdown report.
pub fn render_markdown(
    dataset: &str,
    algo: &str,
    partitions: usize,
    summaries: &[MetricSummary],
) -> String {
    use std::fmt::Write as _;

    let mut report = format!("# {dataset} / {algo}\n\n");
    _ = writeln!(report, "**Partitions**: {partitions}\n");
    report.push_str("| Metric | Mean | Scored | Missing |\n");
    report.push_str("|--------|------|--------|---------|\n");
    for summary in summaries {
        let mean = summary
            .mean
            .map_or_else(|| "-".to_owned(), |mean| format!("{mean:.4}"));
        _ = writeln!(
            report,
            "| {} | {mean} | {} | {} |",
            summary.metric, summary.count, summary.missing
        );
    }
    report
}

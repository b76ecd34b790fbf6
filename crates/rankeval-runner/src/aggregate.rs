//! Parallel evaluation of every run file of a (dataset, algorithm) pair.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rankeval_core::table::{read_recommendations, read_truth, write_scores};
use rankeval_core::{Error, PartitionId, RankevalConfig, Result, ScoreRow, ScoreTable};
use rankeval_metrics::RunEvaluator;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::discovery::{RunFile, RunLayout, discover};
use crate::summary::{MetricSummary, log_summary, summarize};

/// One unit of work: a run file with its truth file.
#[derive(Debug, Clone)]
struct Job {
    run: RunFile,
    truth: PathBuf,
}

/// Result of a completed aggregation.
#[derive(Debug, Clone)]
pub struct AggregateReport {
    /// Where the score table was written
    pub output: PathBuf,
    /// The merged score table
    pub scores: ScoreTable,
    /// Per-metric summary of the table
    pub summary: Vec<MetricSummary>,
}

/// Evaluates run files on a bounded worker pool and merges their scores.
#[derive(Debug, Clone)]
pub struct Aggregator {
    layout: RunLayout,
    evaluator: Arc<RunEvaluator>,
    max_workers: usize,
}

impl Aggregator {
    /// Aggregator using every available CPU.
    pub fn new(layout: RunLayout, evaluator: RunEvaluator) -> Self {
        Self {
            layout,
            evaluator: Arc::new(evaluator),
            max_workers: num_cpus::get().max(1),
        }
    }

    /// Aggregator configured from `rankeval.toml`.
    ///
    /// # Errors
    /// Returns a configuration error if the metric set is invalid
    pub fn from_config(config: &RankevalConfig) -> Result<Self> {
        let evaluator = RunEvaluator::from_config(&config.evaluate)?;
        Ok(Self::new(RunLayout::from_paths(&config.paths), evaluator)
            .with_max_workers(config.worker_count(num_cpus::get())))
    }

    /// Limit the number of run files evaluated at once; 0 uses every CPU.
    #[must_use]
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = match max_workers {
            0 => num_cpus::get().max(1),
            workers => workers,
        };
        self
    }

    /// Directory layout in use.
    pub const fn layout(&self) -> &RunLayout {
        &self.layout
    }

    /// Evaluate every run file of `<dataset>-<algo>` and merge the scores by partition id.
    ///
    /// # Errors
    /// Returns the first discovery, validation, or evaluation error; later tasks are aborted
    pub async fn aggregate(&self, dataset: &str, algo: &str) -> Result<ScoreTable> {
        let run_dir = self.layout.run_dir(dataset, algo);
        let runs = discover(&run_dir)?;
        info!("Found {} run files in {}", runs.len(), run_dir.display());

        let mut jobs = Vec::with_capacity(runs.len());
        for run in runs {
            let truth = self.layout.truth_path(dataset, run.partition);
            if !truth.is_file() {
                return Err(Error::MissingTruth {
                    partition: run.partition.get(),
                    path: truth,
                });
            }
            jobs.push(Job { run, truth });
        }

        let parts = self.evaluate_jobs(jobs).await?;
        Ok(ScoreTable::from_partitions(parts))
    }

    async fn evaluate_jobs(
        &self,
        jobs: Vec<Job>,
    ) -> Result<BTreeMap<PartitionId, Vec<ScoreRow>>> {
        let evaluator = Arc::clone(&self.evaluator);
        let parts = run_bounded(jobs, self.max_workers, move |job: Job| {
            evaluate_run(&evaluator, &job).map(|rows| (job.run.partition, rows))
        })
        .await?;
        Ok(parts.into_iter().collect())
    }

    /// Aggregate and persist the score table.
    ///
    /// Writes to `output`, or to `<runs_dir>/<dataset>-<algo>-scores.parquet`. Nothing is
    /// written unless every run file was evaluated.
    ///
    /// # Errors
    /// Returns an error if aggregation fails or the table cannot be written
    pub async fn run(
        &self,
        dataset: &str,
        algo: &str,
        output: Option<&Path>,
    ) -> Result<AggregateReport> {
        let scores = self.aggregate(dataset, algo).await?;
        let output = output.map_or_else(
            || self.layout.scores_path(dataset, algo),
            Path::to_path_buf,
        );

        info!("Writing {} scores to {}", scores.len(), output.display());
        write_scores(&output, &scores)?;

        let summary = summarize(&scores);
        log_summary(&summary);
        Ok(AggregateReport {
            output,
            scores,
            summary,
        })
    }
}

type Slot<T> = (Result<T>, OwnedSemaphorePermit);

/// Run `work` over `jobs` on at most `max_workers` blocking threads.
///
/// A job is only started once a finished one has been collected, so the first error stops
/// scheduling. Jobs still queued on the blocking pool are aborted.
async fn run_bounded<J, T, F>(jobs: Vec<J>, max_workers: usize, work: F) -> Result<Vec<T>>
where
    J: Send + 'static,
    T: Send + 'static,
    F: Fn(J) -> Result<T> + Send + Sync + 'static,
{
    let max_workers = max_workers.max(1);
    let work = Arc::new(work);
    let semaphore = Arc::new(Semaphore::new(max_workers));
    let mut join_set: JoinSet<Slot<T>> = JoinSet::new();
    let mut outputs = Vec::with_capacity(jobs.len());

    for job in jobs {
        while join_set.len() >= max_workers {
            collect_next(&mut join_set, &mut outputs).await?;
        }

        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|err| Error::Aggregation(err.to_string()))?;
        let task_work = Arc::clone(&work);
        join_set.spawn_blocking(move || ((*task_work)(job), permit));
    }

    while !join_set.is_empty() {
        collect_next(&mut join_set, &mut outputs).await?;
    }

    Ok(outputs)
}

async fn collect_next<T: 'static>(
    join_set: &mut JoinSet<Slot<T>>,
    outputs: &mut Vec<T>,
) -> Result<()> {
    let Some(joined) = join_set.join_next().await else {
        return Ok(());
    };
    let outcome = match joined {
        Ok((outcome, _permit)) => outcome,
        Err(err) => Err(Error::Aggregation(format!(
            "Run evaluation task failed: {err}"
        ))),
    };
    match outcome {
        Ok(output) => {
            outputs.push(output);
            Ok(())
        }
        Err(err) => {
            debug!("Stopping with {} jobs in flight", join_set.len());
            join_set.abort_all();
            Err(err)
        }
    }
}

fn evaluate_run(evaluator: &RunEvaluator, job: &Job) -> Result<Vec<ScoreRow>> {
    let recs = read_recommendations(&job.run.path)?;
    let truth = read_truth(&job.truth)?;
    let rows = evaluator.evaluate(&recs, &truth);
    debug!(
        "Partition {}: {} users, {} scores",
        job.run.partition,
        recs.user_count(),
        rows.len()
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counted(
        started: &Arc<AtomicUsize>,
        failing: u32,
    ) -> impl Fn(u32) -> Result<u32> + Send + Sync + 'static {
        let counter = Arc::clone(started);
        move |job| {
            counter.fetch_add(1, Ordering::SeqCst);
            if job == failing {
                Err(Error::Aggregation(format!("job {job} failed")))
            } else {
                Ok(job)
            }
        }
    }

    #[tokio::test]
    async fn test_first_failure_stops_scheduling() {
        let started = Arc::new(AtomicUsize::new(0));
        let result = run_bounded((1..=6).collect(), 1, counted(&started, 1)).await;

        let error = result.unwrap_err();
        assert!(error.to_string().contains("job 1 failed"), "{error}");
        assert_eq!(started.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_midway_skips_later_jobs() {
        let started = Arc::new(AtomicUsize::new(0));
        let result = run_bounded((1..=6).collect(), 1, counted(&started, 3)).await;

        assert!(result.is_err());
        assert_eq!(started.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_collects_every_job_when_all_succeed() {
        let started = Arc::new(AtomicUsize::new(0));
        let mut outputs = run_bounded((1..=6).collect(), 3, counted(&started, 0))
            .await
            .unwrap();
        outputs.sort_unstable();

        assert_eq!(outputs, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(started.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_zero_workers_still_runs() {
        let started = Arc::new(AtomicUsize::new(0));
        let outputs = run_bounded(vec![7], 0, counted(&started, 0)).await.unwrap();
        assert_eq!(outputs, vec![7]);
    }
}

//! Bounded worker pool with a single statistics aggregator.
//!
//! Tasks are admitted in submission order, at most `concurrency` at a time.
//! Each worker reports its terminal outcome over a bounded channel; the
//! aggregator is the only writer of [`RunStatistics`], so counts are exact
//! regardless of completion order.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::types::{DownloadTask, ProgressEvent, TaskOutcome};

use super::processor::TaskProcessor;
use super::stats::RunStatistics;

/// Outcomes buffered between workers and the aggregator.
const OUTCOME_BUFFER: usize = 64;

/// Runs a batch of tasks through a shared [`TaskProcessor`].
pub struct BatchRunner {
    processor: Arc<TaskProcessor>,
    concurrency: usize,
}

impl BatchRunner {
    pub fn new(processor: TaskProcessor, concurrency: usize) -> Self {
        Self {
            processor: Arc::new(processor),
            concurrency: concurrency.max(1),
        }
    }

    pub fn processor(&self) -> &TaskProcessor {
        &self.processor
    }

    /// Process every task and return the run statistics.
    ///
    /// `on_event` receives a task event followed by a snapshot for every
    /// finished task, then one final snapshot with `done = true`. It is only
    /// ever called from the aggregator.
    ///
    /// Once `cancel` fires, no further task is admitted; tasks already running
    /// finish their current attempt without retrying. Skipped tasks are counted
    /// in `not_started`.
    pub async fn run<F>(
        &self,
        tasks: Vec<DownloadTask>,
        cancel: CancellationToken,
        mut on_event: F,
    ) -> RunStatistics
    where
        F: FnMut(ProgressEvent) + Send,
    {
        let start = Instant::now();
        let submitted = tasks.len();
        let (tx, mut rx) = mpsc::channel::<TaskOutcome>(OUTCOME_BUFFER);

        tracing::info!(
            "Starting batch of {} URLs with {} workers",
            submitted,
            self.concurrency
        );

        let admit = self.admit(tasks, cancel, tx);

        let aggregate = async {
            let mut stats = RunStatistics::default();
            while let Some(outcome) = rx.recv().await {
                stats.record(&outcome);
                on_event(ProgressEvent::from_outcome(&outcome));
                on_event(ProgressEvent::Snapshot {
                    stats: stats.snapshot(),
                    done: false,
                });
            }
            stats
        };

        let (not_started, mut stats) = tokio::join!(admit, aggregate);

        stats.not_started = not_started;
        stats.elapsed = start.elapsed();
        on_event(ProgressEvent::Snapshot {
            stats: stats.snapshot(),
            done: true,
        });

        debug_assert!(stats.is_consistent());
        debug_assert_eq!(stats.attempted + stats.not_started, submitted);
        tracing::info!(
            "Batch finished in {:?}: {} saved, {} filtered, {} failed, {} not started",
            stats.elapsed,
            stats.saved,
            stats.filtered,
            stats.failed,
            stats.not_started
        );
        stats
    }

    /// Spawn workers in order until the tasks run out or a stop is requested.
    /// Returns the number of tasks never started.
    async fn admit(
        &self,
        tasks: Vec<DownloadTask>,
        cancel: CancellationToken,
        tx: mpsc::Sender<TaskOutcome>,
    ) -> usize {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let total = tasks.len();
        let mut handles: Vec<(String, JoinHandle<()>)> = Vec::with_capacity(total);

        for task in tasks {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                permit = semaphore.clone().acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                tracing::warn!("Stop requested, not starting remaining tasks");
                break;
            };

            let processor = self.processor.clone();
            let cancel = cancel.clone();
            let tx = tx.clone();
            let url = task.url.clone();

            let handle = tokio::spawn(async move {
                let outcome = processor.process(&task, &cancel).await;
                drop(permit); // Release concurrency permit before reporting
                if tx.send(outcome).await.is_err() {
                    tracing::error!("Aggregator closed before {} was reported", task.url);
                }
            });
            handles.push((url, handle));
        }

        let started = handles.len();

        for (url, handle) in handles {
            if let Err(e) = handle.await {
                tracing::error!("Worker for {url} panicked: {e}");
                let outcome = TaskOutcome::Failed {
                    url,
                    kind: "worker".to_string(),
                    message: format!("Worker error: {e}"),
                };
                if tx.send(outcome).await.is_err() {
                    tracing::error!("Aggregator closed before worker failure was reported");
                }
            }
        }

        total - started
    }
}

//! Per-task state machine: fetch, validate, filter, categorize, persist.
//!
//! Every task ends in exactly one [`TaskOutcome`]. Errors never escape a task;
//! they are folded into `Failed` with a stable kind string.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::TaskError;
use crate::types::{
    Category, DownloadTask, FilterDecision, ImageMetadata, PersistedFile, TaskOutcome,
};

use super::categorize::Categorizer;
use super::fetch::{fetch_with_retry, Fetcher, RetryPolicy};
use super::naming::{filename_with_hash, short_hash};
use super::persist::Persister;
use super::rules::RuleEvaluator;
use super::validate::Validator;

/// Everything a worker needs to carry one task to its terminal outcome.
pub struct TaskProcessor {
    fetcher: Arc<dyn Fetcher>,
    retry: RetryPolicy,
    rules: RuleEvaluator,
    categorizer: Categorizer,
    persister: Persister,
}

/// Outcome of the stages after a successful fetch, before folding errors.
enum Accepted {
    Saved(PersistedFile),
    Filtered(FilterDecision),
}

impl TaskProcessor {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        retry: RetryPolicy,
        rules: RuleEvaluator,
        categorizer: Categorizer,
        persister: Persister,
    ) -> Self {
        Self {
            fetcher,
            retry,
            rules,
            categorizer,
            persister,
        }
    }

    /// Build every stage from a validated configuration.
    pub fn from_config(config: &Config, fetcher: Arc<dyn Fetcher>) -> Self {
        Self::new(
            fetcher,
            RetryPolicy::from_config(&config.download),
            RuleEvaluator::new(config.filter.clone()),
            Categorizer::new(&config.categories, config.output.categorize),
            Persister::new(config.output_dir()),
        )
    }

    pub fn output_root(&self) -> &Path {
        self.persister.root()
    }

    /// Carry `task` through the pipeline.
    pub async fn process(&self, task: &DownloadTask, cancel: &CancellationToken) -> TaskOutcome {
        let start = Instant::now();
        tracing::debug!("Processing: {}", task.url);

        let outcome = match self.run(task, cancel).await {
            Ok(Accepted::Saved(file)) => {
                tracing::debug!(
                    "Saved {} as {:?}{}",
                    task.url,
                    file.path,
                    if file.already_present {
                        " (already present)"
                    } else {
                        ""
                    }
                );
                TaskOutcome::Saved {
                    url: task.url.clone(),
                    file,
                }
            }
            Ok(Accepted::Filtered(decision)) => {
                tracing::debug!("Filtered {}: {}", task.url, decision.reason());
                TaskOutcome::Filtered {
                    url: task.url.clone(),
                    decision,
                }
            }
            Err(e) => {
                tracing::debug!("Failed {}: {}", task.url, e);
                TaskOutcome::Failed {
                    url: task.url.clone(),
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                }
            }
        };

        tracing::trace!("  Total: {:?}", start.elapsed());
        outcome
    }

    async fn run(
        &self,
        task: &DownloadTask,
        cancel: &CancellationToken,
    ) -> Result<Accepted, TaskError> {
        let fetched = fetch_with_retry(self.fetcher.as_ref(), &task.url, &self.retry, cancel).await?;
        tracing::trace!("  Fetch: {:?} ({} bytes)", fetched.elapsed, fetched.bytes.len());

        let (bytes, validated) = {
            let task = task.clone();
            let bytes = fetched.bytes;
            tokio::task::spawn_blocking(move || {
                let result = Validator::validate(&bytes, &task);
                (bytes, result)
            })
            .await
            .map_err(|e| TaskError::Worker(e.to_string()))?
        };
        let meta = validated?;
        tracing::trace!("  Validate: {}x{} {}", meta.width, meta.height, meta.format);

        let decision = self.rules.evaluate(&meta);
        if !decision.accepted() {
            return Ok(Accepted::Filtered(decision));
        }

        let category = self.categorize(&meta);
        let hash = short_hash(&bytes);
        let filename =
            filename_with_hash(&task.url, task.hints.title.as_deref(), &hash, meta.format);

        let file = self
            .persister
            .persist(category, &filename, &hash, bytes)
            .await?;
        Ok(Accepted::Saved(file))
    }

    fn categorize(&self, meta: &ImageMetadata) -> Category {
        let category = self.categorizer.categorize(meta);
        tracing::trace!("  Category: {}", category);
        category
    }
}

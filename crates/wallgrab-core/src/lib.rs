//! Wallgrab Core - concurrent wallpaper acquisition library.
//!
//! Wallgrab fetches a batch of image URLs, keeps the ones that make good
//! desktop wallpapers, sorts them into category directories and reports
//! live progress.
//!
//! # Architecture
//!
//! Each URL is an independent task on a bounded worker pool:
//!
//! ```text
//! URL → Fetch (retry) → Validate → Rules → Categorize → Filename → Persist
//! ```
//!
//! Outcomes flow to a single aggregator that owns the run statistics.
//!
//! # Usage
//!
//! ```rust,ignore
//! use wallgrab_core::{Config, DownloadTask, Wallgrab};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> wallgrab_core::Result<()> {
//!     let wallgrab = Wallgrab::new(Config::load()?)?;
//!     let tasks = vec![DownloadTask::new("https://example.com/peak.jpg")];
//!     let stats = wallgrab.run(tasks, CancellationToken::new(), |_| {}).await;
//!     println!("Saved {} wallpapers", stats.saved);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod source;
pub mod types;

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

// Re-exports for convenient access
pub use config::Config;
pub use error::{
    ConfigError, FetchError, PersistError, Result, TaskError, ValidationError, WallgrabError,
};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{BatchRunner, Fetcher, HttpFetcher, RunStatistics, TaskProcessor};
pub use types::{
    Category, DownloadTask, HintMetadata, ProgressEvent, RunSnapshot, TaskOutcome,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wallgrab downloader - the main entry point for running a batch.
pub struct Wallgrab {
    config: Config,
    fetcher: Arc<dyn Fetcher>,
    runner: BatchRunner,
}

impl Wallgrab {
    /// Validate `config` and set up the shared HTTP client.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config.download)?);
        Self::with_fetcher(config, fetcher)
    }

    /// Use a custom fetcher, e.g. a non-HTTP transport.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        config.validate()?;
        tracing::debug!("Initializing Wallgrab v{}", VERSION);
        let processor = TaskProcessor::from_config(&config, fetcher.clone());
        let runner = BatchRunner::new(processor, config.download.concurrency);
        Ok(Self {
            config,
            fetcher,
            runner,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Absolute directory that category folders are created under.
    pub fn output_root(&self) -> &std::path::Path {
        self.runner.processor().output_root()
    }

    /// Extract image tasks from a web page using the configured fetcher.
    pub async fn tasks_from_page(&self, page_url: &str) -> Result<Vec<DownloadTask>> {
        Ok(source::tasks_from_page(self.fetcher.as_ref(), page_url).await?)
    }

    /// Run `tasks` to completion or until `cancel` fires.
    pub async fn run<F>(
        &self,
        tasks: Vec<DownloadTask>,
        cancel: CancellationToken,
        on_event: F,
    ) -> RunStatistics
    where
        F: FnMut(ProgressEvent) + Send,
    {
        self.runner.run(tasks, cancel, on_event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_wallgrab_new_with_defaults() {
        let wallgrab = Wallgrab::new(Config::default()).unwrap();
        assert_eq!(wallgrab.config().download.concurrency, 5);
        assert!(wallgrab.output_root().is_absolute());
        assert!(wallgrab.output_root().ends_with("wallpapers"));
    }

    #[test]
    fn test_wallgrab_rejects_invalid_config() {
        let mut config = Config::default();
        config.download.concurrency = 0;
        let err = Wallgrab::new(config).err().unwrap();
        assert!(matches!(err, WallgrabError::Config(_)));
    }
}

//! Download pipeline components.
//!
//! Stages, in the order a task passes through them:
//! - **fetch**: Bounded-time retrieval with retry and size ceiling
//! - **validate**: Magic-byte format detection and header-only decode
//! - **rules**: Resolution, aspect and size acceptance rules
//! - **categorize**: Ordered keyword classification
//! - **naming**: Slug plus content-hash filenames
//! - **persist**: Category directories and collision handling
//!
//! **processor** chains the stages for one task, **batch** runs many tasks on
//! a bounded worker pool and **stats** aggregates their outcomes.

pub mod batch;
pub mod categorize;
pub mod fetch;
pub mod naming;
pub mod persist;
pub mod processor;
pub mod retry;
pub mod rules;
pub mod stats;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenient access
pub use batch::BatchRunner;
pub use categorize::Categorizer;
pub use fetch::{fetch_with_retry, Fetcher, HttpFetcher, RetryPolicy};
pub use naming::{content_hash, filename_with_hash, resolve_filename, short_hash, slugify};
pub use persist::Persister;
pub use processor::TaskProcessor;
pub use rules::RuleEvaluator;
pub use stats::{FailureRecord, RunStatistics};
pub use validate::Validator;

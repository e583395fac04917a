//! Run statistics, owned and written by the batch aggregator alone.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::types::{Category, RunSnapshot, TaskOutcome};

/// One failed task, kept for the end-of-run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub url: String,
    pub kind: String,
    pub message: String,
}

/// Aggregated counters for a run.
///
/// Invariant: `attempted == saved + filtered + failed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub attempted: usize,
    pub saved: usize,
    pub filtered: usize,
    pub failed: usize,
    /// Saved tasks whose file was already on disk
    pub duplicates: usize,
    /// Tasks never started because the run was stopped
    pub not_started: usize,
    /// Total payload bytes of saved tasks
    pub saved_bytes: u64,
    pub categories: BTreeMap<Category, usize>,
    pub failures: Vec<FailureRecord>,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

impl RunStatistics {
    /// Count one terminal outcome.
    pub fn record(&mut self, outcome: &TaskOutcome) {
        self.attempted += 1;
        match outcome {
            TaskOutcome::Saved { file, .. } => {
                self.saved += 1;
                self.saved_bytes += file.size;
                if file.already_present {
                    self.duplicates += 1;
                }
                *self.categories.entry(file.category).or_insert(0) += 1;
            }
            TaskOutcome::Filtered { .. } => self.filtered += 1,
            TaskOutcome::Failed { url, kind, message } => {
                self.failed += 1;
                self.failures.push(FailureRecord {
                    url: url.clone(),
                    kind: kind.clone(),
                    message: message.clone(),
                });
            }
        }
    }

    /// Every attempted task has exactly one terminal classification.
    pub fn is_consistent(&self) -> bool {
        self.attempted == self.saved + self.filtered + self.failed
    }

    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            attempted: self.attempted,
            saved: self.saved,
            filtered: self.filtered,
            failed: self.failed,
            duplicates: self.duplicates,
            not_started: self.not_started,
            categories: self.categories.clone(),
        }
    }

    /// Tasks per second over the whole run.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.attempted as f64 / secs
        } else {
            0.0
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FilterDecision, PersistedFile};
    use std::path::PathBuf;

    fn saved(category: Category, already_present: bool) -> TaskOutcome {
        TaskOutcome::Saved {
            url: "https://x/a.jpg".to_string(),
            file: PersistedFile {
                path: PathBuf::from("/w/a.jpg"),
                category,
                filename: "a.jpg".to_string(),
                size: 2_000_000,
                already_present,
            },
        }
    }

    #[test]
    fn test_record_each_outcome_once() {
        let mut stats = RunStatistics::default();
        stats.record(&saved(Category::Nature, false));
        stats.record(&saved(Category::Nature, true));
        stats.record(
            &TaskOutcome::Filtered {
                url: "u".to_string(),
                decision: FilterDecision::default(),
            },
        );
        stats.record(
            &TaskOutcome::Failed {
                url: "https://x/404".to_string(),
                kind: "http".to_string(),
                message: "HTTP 404".to_string(),
            },
        );

        assert_eq!(stats.attempted, 4);
        assert_eq!(stats.saved, 2);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.filtered, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.categories.get(&Category::Nature), Some(&2));
        assert_eq!(stats.failures[0].kind, "http");
        assert_eq!(stats.saved_bytes, 4_000_000);
        assert!(stats.is_consistent());
    }

    #[test]
    fn test_snapshot_mirrors_counters() {
        let mut stats = RunStatistics::default();
        stats.record(&saved(Category::Space, false));
        stats.not_started = 3;
        let snap = stats.snapshot();
        assert_eq!(snap.attempted, 1);
        assert_eq!(snap.saved, 1);
        assert_eq!(snap.not_started, 3);
        assert_eq!(snap.categories.get(&Category::Space), Some(&1));
    }

    #[test]
    fn test_serializes_elapsed_as_seconds() {
        let stats = RunStatistics {
            elapsed: Duration::from_millis(1500),
            ..Default::default()
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"elapsed\":1.5"));
    }
}

//! Progress display, event log and end-of-run summary.

use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use wallgrab_core::types::OutcomeKind;
use wallgrab_core::{OutputFormat, OutputWriter, ProgressEvent, RunStatistics};

/// Failures listed individually in the summary before eliding the rest.
const MAX_LISTED_FAILURES: usize = 10;

pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Running saved/filtered/failed tallies for the progress message.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProgressCounters {
    pub saved: usize,
    pub filtered: usize,
    pub failed: usize,
}

impl ProgressCounters {
    pub fn observe(&mut self, event: &ProgressEvent) {
        if let ProgressEvent::Task { outcome, .. } = event {
            match outcome {
                OutcomeKind::Saved => self.saved += 1,
                OutcomeKind::Filtered => self.filtered += 1,
                OutcomeKind::Failed => self.failed += 1,
            }
        }
    }

    pub fn message(&self) -> String {
        format!(
            "saved {} · filtered {} · failed {}",
            self.saved, self.filtered, self.failed
        )
    }

    pub fn render(&self, pb: &ProgressBar, event: &ProgressEvent) {
        if let ProgressEvent::Task {
            url,
            outcome: OutcomeKind::Failed,
            reason,
            ..
        } = event
        {
            tracing::debug!("Failed {url}: {}", reason.as_deref().unwrap_or("unknown"));
        }
        if matches!(event, ProgressEvent::Task { .. }) {
            pb.inc(1);
            pb.set_message(self.message());
        }
    }
}

/// Event log for `--events`, as JSON Lines or a JSON array.
pub struct EventLog {
    path: PathBuf,
    writer: OutputWriter<BufWriter<File>>,
    write_errors: usize,
}

impl EventLog {
    pub fn create(path: &Path, format: OutputFormat) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: OutputWriter::new(BufWriter::new(file), format),
            write_errors: 0,
        })
    }

    /// Log an event. Write failures are counted and reported once at the end.
    pub fn record(&mut self, event: &ProgressEvent) {
        if let Err(e) = self.writer.write_event(event) {
            if self.write_errors == 0 {
                tracing::warn!("Failed to write event log {:?}: {e}", self.path);
            }
            self.write_errors += 1;
        }
    }

    /// Append the final report, close the document and flush.
    pub fn finish(mut self, stats: &RunStatistics) -> anyhow::Result<PathBuf> {
        self.writer.write_report(stats)?;
        self.writer.finish()?;
        if self.write_errors > 0 {
            tracing::warn!("{} event(s) could not be logged", self.write_errors);
        }
        tracing::debug!("{} record(s) logged", self.writer.items_written());
        Ok(self.path)
    }
}

pub fn print_summary(stats: &RunStatistics, output_root: &Path) {
    let mb_saved = stats.saved_bytes as f64 / 1_000_000.0;

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("             Download Summary");
    eprintln!("  ====================================");
    eprintln!("    Saved:        {:>8}", stats.saved);
    if stats.duplicates > 0 {
        eprintln!("      (already present: {})", stats.duplicates);
    }
    eprintln!("    Filtered:     {:>8}", stats.filtered);
    eprintln!("    Failed:       {:>8}", stats.failed);
    if stats.not_started > 0 {
        eprintln!("    Not started:  {:>8}", stats.not_started);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", stats.attempted);
    eprintln!("    Duration:     {:>7.1}s", stats.elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} img/sec", stats.rate());
    eprintln!("    Downloaded:   {:>7.1} MB", mb_saved);

    if !stats.categories.is_empty() {
        eprintln!("  ------------------------------------");
        eprintln!("    Categories:");
        for (category, count) in &stats.categories {
            eprintln!("      {:<14}{:>8}", category.as_str(), count);
        }
    }

    if !stats.failures.is_empty() {
        eprintln!("  ------------------------------------");
        eprintln!("    Failures:");
        for failure in stats.failures.iter().take(MAX_LISTED_FAILURES) {
            eprintln!("      [{}] {}", failure.kind, failure.url);
        }
        if stats.failures.len() > MAX_LISTED_FAILURES {
            eprintln!(
                "      ... and {} more",
                stats.failures.len() - MAX_LISTED_FAILURES
            );
        }
    }
    eprintln!("  ====================================");
    eprintln!();
    eprintln!("  Images saved to: {}", output_root.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallgrab_core::RunSnapshot;

    fn task(outcome: OutcomeKind) -> ProgressEvent {
        ProgressEvent::Task {
            url: "https://example.com/a.jpg".to_string(),
            outcome,
            category: None,
            reason: None,
            path: None,
        }
    }

    #[test]
    fn test_counters_ignore_snapshots() {
        let mut counters = ProgressCounters::default();
        counters.observe(&task(OutcomeKind::Saved));
        counters.observe(&task(OutcomeKind::Failed));
        counters.observe(&ProgressEvent::Snapshot {
            stats: RunSnapshot::default(),
            done: false,
        });
        assert_eq!(
            counters,
            ProgressCounters {
                saved: 1,
                filtered: 0,
                failed: 1
            }
        );
        assert_eq!(counters.message(), "saved 1 · filtered 0 · failed 1");
    }

    #[test]
    fn test_progress_bar_advances_per_task() {
        let pb = ProgressBar::hidden();
        pb.set_length(3);
        let mut counters = ProgressCounters::default();
        for event in [
            task(OutcomeKind::Saved),
            ProgressEvent::Snapshot {
                stats: RunSnapshot::default(),
                done: false,
            },
            task(OutcomeKind::Filtered),
        ] {
            counters.observe(&event);
            counters.render(&pb, &event);
        }
        assert_eq!(pb.position(), 2);
    }

    #[test]
    fn test_event_log_writes_tasks_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("events.jsonl");

        let mut log = EventLog::create(&path, OutputFormat::JsonLines).unwrap();
        log.record(&task(OutcomeKind::Saved));
        log.record(&ProgressEvent::Snapshot {
            stats: RunSnapshot::default(),
            done: false,
        });
        let written = log.finish(&RunStatistics::default()).unwrap();
        assert_eq!(written, path);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"type\":\"task\""));
        assert!(lines[1].contains("\"type\":\"report\""));
    }

    #[test]
    fn test_event_log_as_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");

        let mut log = EventLog::create(&path, OutputFormat::Json).unwrap();
        log.record(&task(OutcomeKind::Failed));
        log.record(&task(OutcomeKind::Saved));
        log.finish(&RunStatistics::default()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let trimmed = content.trim();
        assert!(trimmed.starts_with('[') && trimmed.ends_with(']'));
        assert_eq!(content.matches("\"type\":\"task\"").count(), 2);
        assert_eq!(content.matches("\"type\":\"report\"").count(), 1);
    }
}

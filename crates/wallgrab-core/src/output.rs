//! Event and report serialization in JSON or JSON Lines.

use serde::Serialize;
use std::io::{self, Write};

use crate::pipeline::RunStatistics;
use crate::types::ProgressEvent;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One JSON array holding every record
    Json,
    /// One JSON object per line (newline-delimited JSON)
    #[default]
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Serializes progress events and run reports to a writer.
///
/// As an event log it keeps task events and the final snapshot; intermediate
/// snapshots are skipped since they are derivable from the task lines.
/// In [`OutputFormat::Json`] the records are streamed as array elements and
/// the array is closed by [`OutputWriter::finish`].
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            items_written: 0,
        }
    }

    /// Write a single record.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            let sep = if self.items_written == 0 { "[\n" } else { ",\n" };
            self.writer.write_all(sep.as_bytes())?;
        }
        serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        if self.format == OutputFormat::JsonLines {
            writeln!(self.writer)?;
        }
        self.items_written += 1;
        Ok(())
    }

    /// Log one progress event. Returns whether it was written.
    pub fn write_event(&mut self, event: &ProgressEvent) -> io::Result<bool> {
        match event {
            ProgressEvent::Snapshot { done: false, .. } => Ok(false),
            _ => self.write(event).map(|_| true),
        }
    }

    /// Write the end-of-run report including failure details.
    pub fn write_report(&mut self, stats: &RunStatistics) -> io::Result<()> {
        #[derive(Serialize)]
        struct Report<'a> {
            #[serde(rename = "type")]
            kind: &'static str,
            #[serde(flatten)]
            stats: &'a RunStatistics,
        }
        self.write(&Report {
            kind: "report",
            stats,
        })
    }

    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Close the JSON array if one is open, then flush.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            let close = if self.items_written == 0 { "[]\n" } else { "\n]\n" };
            self.writer.write_all(close.as_bytes())?;
        }
        self.writer.flush()
    }
}

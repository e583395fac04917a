//! The `wallgrab download` command.

mod report;
mod setup;

use clap::{ArgGroup, Args};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use wallgrab_core::{OutputFormat, Wallgrab};

use report::{create_progress_bar, print_summary, EventLog, ProgressCounters};
use setup::{build_config, resolve_tasks};

/// Arguments for the `download` command.
#[derive(Args, Debug, Default)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["urls", "file", "page"]),
))]
pub struct DownloadArgs {
    /// Direct image URLs to download
    #[arg(short, long, num_args = 1..)]
    pub urls: Vec<String>,

    /// File containing URLs (one per line, `#` comments allowed)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Web page to extract <img> URLs from
    #[arg(short, long)]
    pub page: Option<String>,

    /// Output directory [default: from config, "wallpapers"]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Minimum width in pixels
    #[arg(long)]
    pub min_width: Option<u32>,

    /// Minimum height in pixels
    #[arg(long)]
    pub min_height: Option<u32>,

    /// Minimum aspect ratio (width / height)
    #[arg(long)]
    pub min_aspect: Option<f64>,

    /// Maximum aspect ratio (width / height)
    #[arg(long)]
    pub max_aspect: Option<f64>,

    /// Minimum file size in KB
    #[arg(long)]
    pub min_size: Option<u64>,

    /// Number of concurrent downloads (1-20)
    #[arg(short, long)]
    pub concurrent: Option<usize>,

    /// Per-attempt timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Retries for transient network failures
    #[arg(long)]
    pub retries: Option<u32>,

    /// Abort downloads larger than this many MB (0 disables the limit)
    #[arg(long)]
    pub max_size_mb: Option<u64>,

    /// Disable automatic categorization
    #[arg(long)]
    pub no_categorize: bool,

    /// Write per-task outcomes and the final report to this file
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Event log format: jsonl or json
    #[arg(long, value_parser = parse_events_format, default_value = "jsonl")]
    pub events_format: OutputFormat,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

fn parse_events_format(s: &str) -> Result<OutputFormat, String> {
    OutputFormat::parse(s).ok_or_else(|| format!("unknown format '{s}' (expected jsonl or json)"))
}

/// Execute the download command.
pub async fn execute(args: DownloadArgs) -> anyhow::Result<()> {
    let config = build_config(&args)?;
    let wallgrab = Wallgrab::new(config)?;

    let tasks = resolve_tasks(&args, &wallgrab).await?;
    if tasks.is_empty() {
        anyhow::bail!("No images to download");
    }
    tracing::info!(
        "Downloading {} image(s) into {:?}",
        tasks.len(),
        wallgrab.output_root()
    );

    let mut events = match &args.events {
        Some(path) => Some(EventLog::create(path, args.events_format)?),
        None => None,
    };

    let cancel = CancellationToken::new();
    let stopper = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing in-flight downloads...");
            stopper.cancel();
        }
    });

    let progress = (!args.no_progress).then(|| create_progress_bar(tasks.len() as u64));
    let mut counters = ProgressCounters::default();

    let stats = wallgrab
        .run(tasks, cancel, |event| {
            counters.observe(&event);
            if let Some(pb) = &progress {
                counters.render(pb, &event);
            }
            if let Some(log) = events.as_mut() {
                log.record(&event);
            }
        })
        .await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if let Some(log) = events.take() {
        let path = log.finish(&stats)?;
        tracing::info!("Event log written to {:?}", path);
    }

    print_summary(&stats, wallgrab.output_root());
    Ok(())
}

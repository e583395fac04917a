//! Download setup: config overrides and task source resolution.

use wallgrab_core::{source, Config, DownloadTask, Wallgrab};

use super::DownloadArgs;

/// Load the config file and apply CLI overrides on top.
///
/// The merged config is validated by `Wallgrab::new`.
pub fn build_config(args: &DownloadArgs) -> anyhow::Result<Config> {
    let mut config = Config::load()?;
    apply_overrides(&mut config, args);
    Ok(config)
}

fn apply_overrides(config: &mut Config, args: &DownloadArgs) {
    if let Some(ref dir) = args.output {
        config.output.dir = dir.clone();
    }
    if args.no_categorize {
        config.output.categorize = false;
    }

    let filter = &mut config.filter;
    if let Some(v) = args.min_width {
        filter.min_width = v;
    }
    if let Some(v) = args.min_height {
        filter.min_height = v;
    }
    if let Some(v) = args.min_aspect {
        filter.min_aspect = v;
    }
    if let Some(v) = args.max_aspect {
        filter.max_aspect = v;
    }
    if let Some(kb) = args.min_size {
        filter.min_size_bytes = kb.saturating_mul(1024);
    }

    let download = &mut config.download;
    if let Some(v) = args.concurrent {
        download.concurrency = v;
    }
    if let Some(v) = args.timeout {
        download.timeout_secs = v;
    }
    if let Some(v) = args.retries {
        download.max_retries = v;
    }
    if let Some(mb) = args.max_size_mb {
        download.max_size_bytes = (mb > 0).then(|| mb.saturating_mul(1024 * 1024));
    }
}

/// Turn whichever input source was given into download tasks.
pub async fn resolve_tasks(
    args: &DownloadArgs,
    wallgrab: &Wallgrab,
) -> anyhow::Result<Vec<DownloadTask>> {
    if !args.urls.is_empty() {
        let tasks: Vec<DownloadTask> = args.urls.iter().map(DownloadTask::new).collect();
        let indirect = tasks
            .iter()
            .filter(|t| !source::is_direct_image_url(&t.url))
            .count();
        if indirect > 0 {
            tracing::debug!(
                "{indirect} URL(s) have no image extension; format is checked after download"
            );
        }
        return Ok(tasks);
    }

    if let Some(ref path) = args.file {
        if !path.exists() {
            anyhow::bail!(
                "URL file does not exist: {:?}\n\n  Hint: Check the file path and try again.",
                path
            );
        }
        return Ok(source::read_url_file(path).await?);
    }

    if let Some(ref page) = args.page {
        eprintln!("Extracting images from {page}...");
        let tasks = wallgrab
            .tasks_from_page(page)
            .await
            .map_err(|e| anyhow::anyhow!("Could not fetch {page}: {e}"))?;
        eprintln!("Found {} images", tasks.len());
        return Ok(tasks);
    }

    Ok(Vec::new())
}

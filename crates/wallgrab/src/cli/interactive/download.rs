//! Guided download flow.
//!
//! Source → output directory → concurrency → confirmation, then delegates
//! to `cli::download::execute()`.

use console::Style;
use dialoguer::{Confirm, Input, Select};
use std::path::PathBuf;
use wallgrab_core::config::MAX_CONCURRENCY;
use wallgrab_core::Config;

use super::handle_interrupt;
use super::theme::wallgrab_theme;
use crate::cli::download::DownloadArgs;

/// Where the URLs come from.
enum Source {
    Urls(Vec<String>),
    File(PathBuf),
    Page(String),
}

impl Source {
    fn describe(&self) -> String {
        match self {
            Source::Urls(urls) => format!("{} URL(s)", urls.len()),
            Source::File(path) => format!("URL file {}", path.display()),
            Source::Page(page) => format!("images on {page}"),
        }
    }
}

pub async fn guided_download(config: &Config) -> anyhow::Result<()> {
    let theme = wallgrab_theme();

    let Some(source) = prompt_source(&theme)? else {
        return Ok(());
    };

    let Some(raw_dir) = handle_interrupt(
        Input::<String>::with_theme(&theme)
            .with_prompt("Output directory")
            .default(config.output.dir.to_string_lossy().into_owned())
            .interact_text(),
    )?
    else {
        return Ok(());
    };
    let output = expand(&raw_dir);

    let Some(concurrent) = handle_interrupt(
        Input::<usize>::with_theme(&theme)
            .with_prompt("Concurrent downloads")
            .default(config.download.concurrency)
            .validate_with(|n: &usize| -> Result<(), String> {
                if (1..=MAX_CONCURRENCY).contains(n) {
                    Ok(())
                } else {
                    Err(format!("Enter a number from 1 to {MAX_CONCURRENCY}"))
                }
            })
            .interact_text(),
    )?
    else {
        return Ok(());
    };

    eprintln!();
    let bold = Style::new().for_stderr().bold();
    let dim = Style::new().for_stderr().dim();
    eprintln!(
        "  {}",
        bold.apply_to(format!("Ready to download {}", source.describe()))
    );
    eprintln!(
        "  {}",
        dim.apply_to(format!(
            "Output: {} | Concurrent: {concurrent} | Categorize: {}",
            output.display(),
            if config.output.categorize { "on" } else { "off" }
        ))
    );
    eprintln!();

    let confirm = Confirm::with_theme(&theme)
        .with_prompt("Start downloading?")
        .default(true)
        .interact_opt()?;
    if !matches!(confirm, Some(true)) {
        return Ok(());
    }

    let args = build_args(source, output, concurrent);
    if let Err(e) = crate::cli::download::execute(args).await {
        let err = Style::new().for_stderr().red();
        eprintln!("  {} {e:#}", err.apply_to("✗"));
    }

    eprintln!();
    let post_choice = Select::with_theme(&theme)
        .with_prompt("What next?")
        .items(&["Download more", "Back to main menu"])
        .default(0)
        .interact_opt()?;

    if matches!(post_choice, Some(0)) {
        Box::pin(guided_download(config)).await?;
    }

    Ok(())
}

fn prompt_source(theme: &dialoguer::theme::ColorfulTheme) -> anyhow::Result<Option<Source>> {
    let items = &[
        "Paste image URLs",
        "Read URLs from a file",
        "Extract images from a web page",
    ];
    let Some(choice) = Select::with_theme(theme)
        .with_prompt("Where are the wallpapers?")
        .items(items)
        .default(0)
        .interact_opt()?
    else {
        return Ok(None);
    };

    let source = match choice {
        0 => {
            let Some(raw) = handle_interrupt(
                Input::<String>::with_theme(theme)
                    .with_prompt("Image URLs (space separated)")
                    .interact_text(),
            )?
            else {
                return Ok(None);
            };
            let urls = split_urls(&raw);
            if urls.is_empty() {
                return Ok(None);
            }
            Source::Urls(urls)
        }
        1 => loop {
            let Some(raw) = handle_interrupt(
                Input::<String>::with_theme(theme)
                    .with_prompt("Path to URL file")
                    .interact_text(),
            )?
            else {
                return Ok(None);
            };
            let path = expand(&raw);
            if path.is_file() {
                break Source::File(path);
            }
            let warn = Style::new().for_stderr().yellow();
            eprintln!(
                "  {}",
                warn.apply_to(format!("File not found: {}", path.display()))
            );
        },
        _ => {
            let Some(page) = handle_interrupt(
                Input::<String>::with_theme(theme)
                    .with_prompt("Page URL")
                    .interact_text(),
            )?
            else {
                return Ok(None);
            };
            Source::Page(page.trim().to_string())
        }
    };
    Ok(Some(source))
}

fn split_urls(raw: &str) -> Vec<String> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn expand(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw.trim()).into_owned())
}

fn build_args(source: Source, output: PathBuf, concurrent: usize) -> DownloadArgs {
    let mut args = DownloadArgs {
        output: Some(output),
        concurrent: Some(concurrent),
        ..DownloadArgs::default()
    };
    match source {
        Source::Urls(urls) => args.urls = urls,
        Source::File(path) => args.file = Some(path),
        Source::Page(page) => args.page = Some(page),
    }
    args
}

//! Wallgrab CLI - bulk wallpaper downloader.
//!
//! Wallgrab fetches images from URLs, keeps the ones that fit wallpaper
//! resolution and aspect rules, and sorts them into category folders.
//!
//! # Usage
//!
//! ```bash
//! # Download direct image URLs
//! wallgrab download -u https://example.com/a.jpg https://example.com/b.jpg
//!
//! # URLs from a file, ten at a time
//! wallgrab download -f urls.txt --concurrent 10
//!
//! # Every image on a page, with stricter filters
//! wallgrab download -p https://example.com/wallpapers --min-width 2560 --min-height 1440
//!
//! # View configuration
//! wallgrab config show
//! ```

use clap::{Parser, Subcommand};
use std::io::IsTerminal;

mod cli;
mod logging;

/// Wallgrab - download, filter and organize high-resolution wallpapers.
#[derive(Parser, Debug)]
#[command(name = "wallgrab")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Download, filter and categorize images
    Download(cli::download::DownloadArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match wallgrab_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `wallgrab config path`."
            );
            wallgrab_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Wallgrab v{}", wallgrab_core::VERSION);

    match cli.command {
        Some(Commands::Download(args)) => cli::download::execute(args).await,
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() => {
            cli::interactive::run(&config).await
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

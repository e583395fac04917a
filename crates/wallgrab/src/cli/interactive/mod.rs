//! Interactive mode for a bare `wallgrab` invocation on a TTY.
//!
//! A menu-driven front end that builds the same arguments as the
//! flag-based `download` command and hands them to it.

pub mod download;
pub mod theme;

use console::Style;
use dialoguer::Select;
use wallgrab_core::Config;

/// Map a dialoguer result to `Ok(None)` on interrupt (Ctrl+C or a closed
/// terminal) so prompts without an `_opt` variant can exit a flow cleanly.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

const MENU_ITEMS: &[&str] = &["Download wallpapers", "Configure settings", "Exit"];

/// Entry point for interactive mode.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    theme::print_banner();

    let theme = theme::wallgrab_theme();

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => download::guided_download(config).await?,
            Some(1) => show_config(config)?,
            _ => break,
        }
    }

    Ok(())
}

/// Settings summary with options to print the full TOML or the file path.
fn show_config(config: &Config) -> anyhow::Result<()> {
    let theme = theme::wallgrab_theme();
    let dim = Style::new().for_stderr().dim();
    let cyan = Style::new().for_stderr().cyan();
    let label = Style::new().for_stderr().bold();

    loop {
        eprintln!();
        eprintln!("  {}", cyan.apply_to("Current configuration:"));
        eprintln!();

        let config_path = Config::default_path();
        let path_note = if config_path.exists() {
            "(exists)"
        } else {
            "(using defaults)"
        };

        eprintln!(
            "    {:<20} {} {}",
            label.apply_to("Config file:"),
            config_path.display(),
            dim.apply_to(path_note)
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Output dir:"),
            config.output_dir().display()
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Categorize:"),
            if config.output.categorize { "on" } else { "off" }
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Filters:"),
            filter_summary(config)
        );
        eprintln!(
            "    {:<20} {} concurrent, {}s timeout, {} retries",
            label.apply_to("Downloads:"),
            config.download.concurrency,
            config.download.timeout_secs,
            config.download.max_retries
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Size limit:"),
            match config.download.max_size_bytes {
                Some(bytes) => format!("{} MB", bytes / (1024 * 1024)),
                None => "none".to_string(),
            }
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Log level:"),
            config.logging.level
        );
        eprintln!();

        let items = &["View full config (TOML)", "Show config file path", "Back"];

        let selection = Select::with_theme(&theme)
            .with_prompt("Configuration")
            .items(items)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => match config.to_toml() {
                Ok(toml) => {
                    eprintln!();
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                    eprintln!("{toml}");
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                    eprintln!();
                }
                Err(e) => {
                    let err = Style::new().for_stderr().red();
                    eprintln!("  {} Failed to serialize config: {e}", err.apply_to("✗"));
                    eprintln!();
                }
            },
            Some(1) => {
                eprintln!();
                eprintln!("  {}", config_path.display());
                eprintln!();
            }
            _ => break,
        }
    }

    Ok(())
}

fn filter_summary(config: &Config) -> String {
    let f = &config.filter;
    format!(
        "≥{}x{}, aspect {:.2}-{:.2}, ≥{} KB",
        f.min_width,
        f.min_height,
        f.min_aspect,
        f.max_aspect,
        f.min_size_bytes / 1024
    )
}

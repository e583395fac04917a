//! Dialoguer theme and banner for interactive mode.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// Cyan prompts and selection marker, green confirmations, red errors.
pub fn wallgrab_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().cyan(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().cyan(),
        active_item_style: Style::new().for_stderr().cyan(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Print the version banner to stderr.
pub fn print_banner() {
    let lines = banner_lines(wallgrab_core::VERSION);
    let cyan = Style::new().for_stderr().cyan();

    eprintln!();
    for line in &lines {
        eprintln!("{}", cyan.apply_to(line));
    }
    eprintln!();
}

fn banner_lines(version: &str) -> [String; 4] {
    let title = format!("Wallgrab v{version}");
    let tagline = "Fetch, filter and sort wallpapers";
    let width = tagline.chars().count().max(title.chars().count()) + 4;

    [
        format!("  ╔{:═<width$}╗", ""),
        format!("  ║{title:^width$}║"),
        format!("  ║{tagline:^width$}║"),
        format!("  ╚{:═<width$}╝", ""),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_rows_share_width() {
        let lines = banner_lines("0.1.0");
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]));
        assert!(lines[1].contains("Wallgrab v0.1.0"));
    }
}

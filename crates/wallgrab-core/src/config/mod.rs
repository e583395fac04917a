//! Configuration management for wallgrab.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. All config structs implement `Default`, so a partial TOML file
//! only overrides what it names.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for wallgrab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Acceptance rules
    pub filter: FilterConfig,

    /// Network and worker settings
    pub download: DownloadConfig,

    /// Output layout
    pub output: OutputConfig,

    /// Category keyword table
    pub categories: CategoryConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.wallgrab.wallgrab/config.toml
    /// - Linux: ~/.config/wallgrab/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\wallgrab\config\config.toml
    ///
    /// Falls back to ~/.wallgrab/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "wallgrab", "wallgrab")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".wallgrab").join("config.toml")
            })
    }

    /// Get the resolved output directory (with ~ expansion).
    pub fn output_dir(&self) -> PathBuf {
        let path_str = self.output.dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.filter.min_width, 1920);
        assert_eq!(config.filter.min_height, 1080);
        assert_eq!(config.filter.min_size_bytes, 100 * 1024);
        assert_eq!(config.download.concurrency, 5);
        assert_eq!(config.download.timeout_secs, 30);
        assert_eq!(config.output.dir, PathBuf::from("wallpapers"));
        assert!(config.output.categorize);
    }

    #[test]
    fn test_default_category_order() {
        let config = Config::default();
        let order: Vec<Category> = config.categories.rules.iter().map(|r| r.category).collect();
        assert_eq!(
            order,
            vec![
                Category::Nature,
                Category::Space,
                Category::Abstract,
                Category::City,
                Category::Animals,
                Category::Tech,
                Category::Fantasy,
            ]
        );
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[filter]"));
        assert!(toml.contains("[download]"));
        assert!(toml.contains("[[categories.rules]]"));
    }

    #[test]
    fn test_toml_roundtrip_preserves_table() {
        let config = Config::default();
        let parsed = Config::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [filter]
            min_width = 2560

            [download]
            concurrency = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.filter.min_width, 2560);
        assert_eq!(config.filter.min_height, 1080);
        assert_eq!(config.download.concurrency, 10);
        assert_eq!(config.categories, CategoryConfig::default());
    }

    #[test]
    fn test_custom_category_table() {
        let config = Config::from_toml(
            r#"
            [[categories.rules]]
            category = "space"
            keywords = ["nasa", "hubble"]
            "#,
        )
        .unwrap();
        assert_eq!(config.categories.rules.len(), 1);
        assert_eq!(config.categories.rules[0].category, Category::Space);
    }

    #[test]
    fn test_load_from_rejects_invalid_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[filter]\nmin_aspect = 4.0\nmax_aspect = 2.0\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_output_dir_expands_tilde() {
        let mut config = Config::default();
        config.output.dir = PathBuf::from("~/wallpapers");
        let dir = config.output_dir();
        assert!(!dir.to_string_lossy().starts_with('~'));
    }
}

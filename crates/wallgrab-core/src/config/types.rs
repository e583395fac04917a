//! Sub-configuration structs with defaults matching the stock wallpaper profile.

use crate::types::Category;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Hard ceiling for `download.concurrency`.
pub const MAX_CONCURRENCY: usize = 20;

/// Quality and geometry rules. All must pass; bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Minimum width in pixels
    pub min_width: u32,

    /// Minimum height in pixels
    pub min_height: u32,

    /// Minimum width/height ratio
    pub min_aspect: f64,

    /// Maximum width/height ratio
    pub max_aspect: f64,

    /// Minimum payload size in bytes
    pub min_size_bytes: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_width: 1920,
            min_height: 1080,
            min_aspect: 1.5,
            max_aspect: 3.0,
            min_size_bytes: 100 * 1024,
        }
    }
}

/// Network and worker-pool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Number of concurrent workers (1..=20)
    pub concurrency: usize,

    /// Timeout for a single fetch attempt, in seconds
    pub timeout_secs: u64,

    /// Retries after the first attempt for transient failures
    pub max_retries: u32,

    /// Base backoff delay between retries in milliseconds
    pub retry_delay_ms: u64,

    /// Abort a download once its body exceeds this many bytes
    pub max_size_bytes: Option<u64>,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            timeout_secs: 30,
            max_retries: 2,
            retry_delay_ms: 500,
            max_size_bytes: Some(50 * 1024 * 1024),
            user_agent: format!("wallgrab/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Where accepted images land.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory; category subdirectories are created beneath it
    pub dir: PathBuf,

    /// Sort images into category subdirectories
    pub categorize: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("wallpapers"),
            categorize: true,
        }
    }
}

/// One row of the category table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    fn new(category: Category, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Ordered category table. Earlier rules win when several match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    pub rules: Vec<CategoryRule>,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                CategoryRule::new(
                    Category::Nature,
                    &[
                        "nature",
                        "landscape",
                        "mountain",
                        "forest",
                        "ocean",
                        "beach",
                        "sunset",
                        "sunrise",
                    ],
                ),
                CategoryRule::new(
                    Category::Space,
                    &[
                        "space",
                        "galaxy",
                        "nebula",
                        "planet",
                        "star",
                        "cosmos",
                        "astronomy",
                    ],
                ),
                CategoryRule::new(
                    Category::Abstract,
                    &["abstract", "pattern", "geometric", "minimalist", "artistic"],
                ),
                CategoryRule::new(
                    Category::City,
                    &[
                        "city",
                        "urban",
                        "skyline",
                        "architecture",
                        "building",
                        "street",
                    ],
                ),
                CategoryRule::new(
                    Category::Animals,
                    &["animal", "wildlife", "cat", "dog", "bird", "lion", "tiger"],
                ),
                CategoryRule::new(
                    Category::Tech,
                    &[
                        "technology",
                        "computer",
                        "digital",
                        "cyberpunk",
                        "futuristic",
                    ],
                ),
                CategoryRule::new(
                    Category::Fantasy,
                    &["fantasy", "dragon", "magic", "medieval", "artwork"],
                ),
            ],
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

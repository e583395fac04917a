//! Keyword categorization over free-text metadata.
//!
//! The table is scanned in order and the first category with any keyword
//! occurring as a substring of the metadata blob wins. There is no scoring.

use crate::config::{CategoryConfig, CategoryRule};
use crate::types::{Category, ImageMetadata};

/// Ordered first-match keyword classifier.
#[derive(Debug, Clone)]
pub struct Categorizer {
    rules: Vec<CategoryRule>,
    enabled: bool,
}

impl Categorizer {
    /// Build from the configured table. Keywords are lower-cased once here.
    pub fn new(config: &CategoryConfig, enabled: bool) -> Self {
        let rules = config
            .rules
            .iter()
            .map(|rule| CategoryRule {
                category: rule.category,
                keywords: rule.keywords.iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();
        Self { rules, enabled }
    }

    /// A categorizer that always answers `uncategorized`.
    pub fn disabled() -> Self {
        Self {
            rules: Vec::new(),
            enabled: false,
        }
    }

    pub fn categorize(&self, meta: &ImageMetadata) -> Category {
        if !self.enabled {
            return Category::Uncategorized;
        }
        let blob = text_blob(meta);
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| blob.contains(k.as_str())))
            .map(|rule| rule.category)
            .unwrap_or(Category::Uncategorized)
    }
}

/// Lower-cased title, alt, description and URL path joined by spaces.
fn text_blob(meta: &ImageMetadata) -> String {
    let hints = &meta.hints;
    let path = url_path(&meta.url);
    [
        hints.title.as_deref(),
        hints.alt.as_deref(),
        hints.description.as_deref(),
        Some(path.as_str()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

fn url_path(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    }
}

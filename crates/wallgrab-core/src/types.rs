//! Core data types for the wallgrab pipeline.
//!
//! These types describe a task's input, the facts derived from its payload,
//! and the single terminal outcome each task reports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Free-text hints attached to a URL, usually scraped from the `<img>` tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl HintMetadata {
    /// Build hints from raw attribute values, dropping empty strings.
    pub fn from_parts(title: &str, alt: &str, description: &str) -> Self {
        let keep = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        Self {
            title: keep(title),
            alt: keep(alt),
            description: keep(description),
        }
    }
}

/// One URL to acquire. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadTask {
    pub url: String,

    #[serde(default)]
    pub hints: HintMetadata,
}

impl DownloadTask {
    /// A task with no hint metadata.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            hints: HintMetadata::default(),
        }
    }

    pub fn with_hints(url: impl Into<String>, hints: HintMetadata) -> Self {
        Self {
            url: url.into(),
            hints,
        }
    }
}

/// Raw bytes produced by one successful fetch.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub elapsed: Duration,
}

/// The closed set of image formats wallgrab accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Bmp,
}

impl ImageFormat {
    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::WebP => "webp",
            ImageFormat::Bmp => "bmp",
        }
    }

    /// The matching `image` crate format, used to drive header decoding.
    pub fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::WebP => image::ImageFormat::WebP,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
            ImageFormat::WebP => "webp",
            ImageFormat::Bmp => "bmp",
        };
        f.write_str(name)
    }
}

/// Facts derived from a validated payload. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub byte_size: u64,
    pub format: ImageFormat,
    pub hints: HintMetadata,
}

impl ImageMetadata {
    /// Width divided by height. Height is never zero after validation.
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Semantic category for an accepted image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Nature,
    Space,
    Abstract,
    City,
    Animals,
    Tech,
    Fantasy,
    Uncategorized,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Nature,
        Category::Space,
        Category::Abstract,
        Category::City,
        Category::Animals,
        Category::Tech,
        Category::Fantasy,
        Category::Uncategorized,
    ];

    /// Directory name under the output root.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Nature => "nature",
            Category::Space => "space",
            Category::Abstract => "abstract",
            Category::City => "city",
            Category::Animals => "animals",
            Category::Tech => "tech",
            Category::Fantasy => "fantasy",
            Category::Uncategorized => "uncategorized",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single geometry/quality rule that an image failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleViolation {
    MinWidth { actual: u32, required: u32 },
    MinHeight { actual: u32, required: u32 },
    MinAspect { actual: f64, required: f64 },
    MaxAspect { actual: f64, allowed: f64 },
    MinSize { actual: u64, required: u64 },
}

impl RuleViolation {
    /// True for the width/height rules.
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            RuleViolation::MinWidth { .. } | RuleViolation::MinHeight { .. }
        )
    }
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleViolation::MinWidth { actual, required } => {
                write!(f, "width {actual}px < {required}px")
            }
            RuleViolation::MinHeight { actual, required } => {
                write!(f, "height {actual}px < {required}px")
            }
            RuleViolation::MinAspect { actual, required } => {
                write!(f, "aspect {actual:.3} < {required}")
            }
            RuleViolation::MaxAspect { actual, allowed } => {
                write!(f, "aspect {actual:.3} > {allowed}")
            }
            RuleViolation::MinSize { actual, required } => {
                write!(f, "size {actual}B < {required}B")
            }
        }
    }
}

/// Verdict of the rule evaluator. Empty `violations` means accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterDecision {
    pub violations: Vec<RuleViolation>,
}

impl FilterDecision {
    pub fn accepted(&self) -> bool {
        self.violations.is_empty()
    }

    /// Human-readable list of the violated rules.
    pub fn reason(&self) -> String {
        self.violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A file written (or found already present) for an accepted image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedFile {
    pub path: PathBuf,
    pub category: Category,
    pub filename: String,
    /// Payload size in bytes
    pub size: u64,
    /// Identical content was already on disk; nothing was written.
    pub already_present: bool,
}

/// The terminal state a task reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Saved,
    Filtered,
    Failed,
}

/// The one result every started task reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum TaskOutcome {
    Saved {
        url: String,
        file: PersistedFile,
    },
    Filtered {
        url: String,
        decision: FilterDecision,
    },
    Failed {
        url: String,
        /// Stable error class, e.g. `http` or `corrupt_image`
        kind: String,
        message: String,
    },
}

impl TaskOutcome {
    pub fn url(&self) -> &str {
        match self {
            TaskOutcome::Saved { url, .. }
            | TaskOutcome::Filtered { url, .. }
            | TaskOutcome::Failed { url, .. } => url,
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            TaskOutcome::Saved { .. } => OutcomeKind::Saved,
            TaskOutcome::Filtered { .. } => OutcomeKind::Filtered,
            TaskOutcome::Failed { .. } => OutcomeKind::Failed,
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            TaskOutcome::Saved { file, .. } => Some(file.category),
            _ => None,
        }
    }

    /// Why the task did not save, if it did not.
    pub fn reason(&self) -> Option<String> {
        match self {
            TaskOutcome::Saved { .. } => None,
            TaskOutcome::Filtered { decision, .. } => Some(decision.reason()),
            TaskOutcome::Failed { kind, message, .. } => Some(format!("{kind}: {message}")),
        }
    }
}

/// Point-in-time view of the run counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub attempted: usize,
    pub saved: usize,
    pub filtered: usize,
    pub failed: usize,
    pub duplicates: usize,
    pub not_started: usize,
    pub categories: BTreeMap<Category, usize>,
}

/// Events consumed by presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProgressEvent {
    /// A task reached its terminal state
    Task {
        url: String,
        outcome: OutcomeKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        category: Option<Category>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
    /// Counters after the latest task, or the final tally
    Snapshot {
        #[serde(flatten)]
        stats: RunSnapshot,
        done: bool,
    },
}

impl ProgressEvent {
    pub fn from_outcome(outcome: &TaskOutcome) -> Self {
        let path = match outcome {
            TaskOutcome::Saved { file, .. } => Some(file.path.clone()),
            _ => None,
        };
        ProgressEvent::Task {
            url: outcome.url().to_string(),
            outcome: outcome.kind(),
            category: outcome.category(),
            reason: outcome.reason(),
            path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved(category: Category) -> TaskOutcome {
        TaskOutcome::Saved {
            url: "https://example.com/a.jpg".to_string(),
            file: PersistedFile {
                path: PathBuf::from("/w/nature/a_0123456789abcdef.jpg"),
                category,
                filename: "a_0123456789abcdef.jpg".to_string(),
                size: 2_000_000,
                already_present: false,
            },
        }
    }

    #[test]
    fn test_hint_metadata_drops_blank_parts() {
        let hints = HintMetadata::from_parts("  Mountain  ", "", "   ");
        assert_eq!(hints.title.as_deref(), Some("Mountain"));
        assert!(hints.alt.is_none());
        assert!(hints.description.is_none());
    }

    #[test]
    fn test_image_format_extension_is_canonical() {
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
        assert_eq!(ImageFormat::WebP.extension(), "webp");
        assert_eq!(ImageFormat::Bmp.to_image_format(), image::ImageFormat::Bmp);
    }

    #[test]
    fn test_progress_event_from_saved_outcome() {
        let event = ProgressEvent::from_outcome(&saved(Category::Nature));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"task\""));
        assert!(json.contains("\"outcome\":\"saved\""));
        assert!(json.contains("\"category\":\"nature\""));
        assert!(!json.contains("reason"));
    }

    #[test]
    fn test_filtered_reason_lists_every_violation() {
        let outcome = TaskOutcome::Filtered {
            url: "u".to_string(),
            decision: FilterDecision {
                violations: vec![
                    RuleViolation::MinWidth {
                        actual: 1280,
                        required: 1920,
                    },
                    RuleViolation::MinHeight {
                        actual: 720,
                        required: 1080,
                    },
                ],
            },
        };
        let reason = outcome.reason().unwrap();
        assert_eq!(reason, "width 1280px < 1920px; height 720px < 1080px");
    }

    #[test]
    fn test_snapshot_event_flattens_counters() {
        let event = ProgressEvent::Snapshot {
            stats: RunSnapshot {
                attempted: 3,
                saved: 1,
                filtered: 1,
                failed: 1,
                ..Default::default()
            },
            done: true,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"attempted\":3"));
        assert!(json.contains("\"done\":true"));
    }
}

//! Error types for the wallgrab acquisition pipeline.
//!
//! Errors are organized by stage. Only [`ConfigError`] is fatal to a run;
//! every per-task error is folded into a failed [`crate::types::TaskOutcome`]
//! by the processor and never crosses a worker boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for wallgrab operations.
#[derive(Error, Debug)]
pub enum WallgrabError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Fetching a page or URL list failed
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Network retrieval errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, DNS, TLS or per-attempt timeout failure
    #[error("Network error: {message}")]
    Network { message: String, timed_out: bool },

    /// Server answered with a non-2xx status
    #[error("HTTP {status}")]
    Http { status: u16 },

    /// URL could not be parsed or is not http(s)
    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Body exceeded the configured byte ceiling
    #[error("Response exceeds size limit of {limit} bytes")]
    SizeExceeded { limit: u64 },

    /// A stop signal arrived before the next attempt could start
    #[error("Cancelled before retry")]
    Cancelled,
}

impl FetchError {
    pub(crate) fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            timed_out: false,
        }
    }

    pub(crate) fn timeout(timeout_ms: u64) -> Self {
        Self::Network {
            message: format!("timed out after {timeout_ms}ms"),
            timed_out: true,
        }
    }
}

/// Errors raised while validating fetched bytes as an image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Payload had zero bytes
    #[error("Empty payload")]
    EmptyPayload,

    /// Recognized as something outside the JPEG/PNG/WebP/BMP allow-list
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// Header could not be decoded, payload truncated, or zero dimensions
    #[error("Corrupt image: {message}")]
    CorruptImage { message: String },
}

/// Disk persistence errors.
#[derive(Error, Debug)]
#[error("Failed to persist {path}: {source}")]
pub struct PersistError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Any error that can terminate a single task as failed.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    /// A worker task panicked or was aborted
    #[error("Worker error: {0}")]
    Worker(String),
}

impl TaskError {
    /// Short, stable identifier for the error class, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            TaskError::Fetch(FetchError::Network { .. }) => "network",
            TaskError::Fetch(FetchError::Http { .. }) => "http",
            TaskError::Fetch(FetchError::InvalidUrl { .. }) => "invalid_url",
            TaskError::Fetch(FetchError::SizeExceeded { .. }) => "size_exceeded",
            TaskError::Fetch(FetchError::Cancelled) => "cancelled",
            TaskError::Validation(ValidationError::EmptyPayload) => "empty_payload",
            TaskError::Validation(ValidationError::UnsupportedFormat { .. }) => {
                "unsupported_format"
            }
            TaskError::Validation(ValidationError::CorruptImage { .. }) => "corrupt_image",
            TaskError::Persist(_) => "persistence",
            TaskError::Worker(_) => "worker",
        }
    }
}

/// Convenience type alias for wallgrab results.
pub type Result<T> = std::result::Result<T, WallgrabError>;

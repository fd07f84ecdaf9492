use std::time::Duration;

use thiserror::Error;

/// Application-wide error types for SkuScout.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// An extraction rule could not be parsed or compiled.
    #[error("Invalid rule '{rule}': {message}")]
    InvalidRule { rule: String, message: String },

    /// A site URL has no usable scheme or host.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML-to-text conversion failed.
    #[error("Cleaner error: {0}")]
    CleanerError(String),

    /// The search endpoint returned something unusable.
    #[error("Search error: {0}")]
    SearchError(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

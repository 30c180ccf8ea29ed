//! Error types for tomoscrape.
//!
//! Library crates use [`TomoError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all tomoscrape operations.
#[derive(Debug, thiserror::Error)]
pub enum TomoError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP failure while fetching a manga page.
    #[error("fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Image transfer failure.
    #[error("download error for {url}: {message}")]
    Download { url: String, message: String },

    /// The input catalog could not be read or parsed.
    #[error("catalog error: {message}")]
    Catalog { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TomoError>;

impl TomoError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a fetch error for a manga page URL.
    pub fn fetch(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: msg.into(),
        }
    }

    /// Create a download error for an image URL.
    pub fn download(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            message: msg.into(),
        }
    }

    /// Create a catalog error from any displayable message.
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error only affects a single manga entry (the batch goes on).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Download { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = TomoError::config("missing base url");
        assert_eq!(err.to_string(), "config error: missing base url");

        let err = TomoError::fetch("https://example.com/a", "HTTP 404 Not Found");
        assert_eq!(
            err.to_string(),
            "fetch error for https://example.com/a: HTTP 404 Not Found"
        );
    }

    #[test]
    fn only_fetch_and_download_are_recoverable() {
        assert!(TomoError::fetch("u", "boom").is_recoverable());
        assert!(TomoError::download("u", "boom").is_recoverable());
        assert!(!TomoError::catalog("unreadable").is_recoverable());
        assert!(!TomoError::config("bad").is_recoverable());
    }
}

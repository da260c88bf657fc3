//! Error types for sharegrab

use std::time::Duration;
use thiserror::Error;

/// Main error type for sharegrab operations
#[derive(Debug, Error)]
pub enum GrabError {
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },

    #[error("Element {selector} has no usable `{attribute}` attribute")]
    MissingAttribute { selector: String, attribute: String },

    #[error("Browser session error: {0}")]
    Browser(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("{0} serves an HLS playlist, not a media file")]
    UnexpectedPlaylist(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid job file: {0}")]
    InvalidJob(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GrabError {
    /// Check if a download attempt that failed with this error is worth repeating
    pub fn is_retryable(&self) -> bool {
        match self {
            GrabError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_body()
                    || e.status().map_or(false, |s| s.is_server_error())
            }
            _ => false,
        }
    }

    /// Check if the error came from driving the browser
    pub fn is_browser_error(&self) -> bool {
        matches!(
            self,
            GrabError::Navigation { .. }
                | GrabError::ElementNotFound(_)
                | GrabError::Timeout { .. }
                | GrabError::MissingAttribute { .. }
                | GrabError::Browser(_)
        )
    }
}

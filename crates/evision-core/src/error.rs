//! Error types for the eVision download robot

use crate::browser::BrowserError;
use std::time::Duration;
use thiserror::Error;

/// Main error type for all robot operations
#[derive(Error, Debug)]
pub enum EvisionError {
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Timed out waiting for {what}{}", format_after(.after))]
    Timeout {
        what: String,
        after: Option<Duration>,
    },

    #[error("Unrecognized modal overlay: {0}")]
    UnrecognizedOverlay(String),

    #[error("Could not extract {0}")]
    Extraction(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("WebDriver error: {0}")]
    WebDriver(String),
}

fn format_after(after: &Option<Duration>) -> String {
    match after {
        Some(after) => format!(" after {:?}", after),
        None => String::new(),
    }
}

impl EvisionError {
    pub fn timeout(what: impl Into<String>, after: Option<Duration>) -> Self {
        Self::Timeout {
            what: what.into(),
            after,
        }
    }

    /// True for browser errors that a retry or another poll may clear
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Browser(e) if e.is_transient())
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Browser(BrowserError::StaleElement(_)))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result type for robot operations
pub type Result<T> = std::result::Result<T, EvisionError>;

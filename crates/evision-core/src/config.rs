//! Configuration management for the eVision download robot

use crate::error::{EvisionError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variables with this prefix override file settings,
/// e.g. `EVISION__TIMEOUTS__LONG_SECS=600`
pub const ENV_PREFIX: &str = "EVISION";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvisionConfig {
    /// Page the browser opens so the user can log in
    pub entry_url: String,

    /// Title of the window holding the application being processed
    pub application_title: String,

    pub timeouts: TimeoutConfig,

    /// Attempts at clicking through modal overlays before giving up
    pub click_attempts: u32,

    pub tab_attempts: u32,

    /// Previous/Next round trips tried when the details page misbehaves
    pub resync_attempts: u32,

    /// Concurrent PDF downloads
    pub download_workers: usize,

    /// Debug lines kept for the instant replay
    pub replay_capacity: usize,
}

impl Default for EvisionConfig {
    fn default() -> Self {
        Self {
            entry_url: "https://evision.as.it.ubc.ca/".to_string(),
            application_title: "Graduate Admissions Decision Processing".to_string(),
            timeouts: TimeoutConfig::default(),
            click_attempts: 90,
            tab_attempts: 5,
            resync_attempts: 3,
            download_workers: 2,
            replay_capacity: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    pub poll_interval_ms: u64,
    pub confirm_secs: u64,
    pub short_secs: u64,
    pub medium_secs: u64,
    pub ordering_secs: u64,
    pub long_secs: u64,
    pub window_close_secs: u64,
    pub download_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            confirm_secs: 1,
            short_secs: 30,
            medium_secs: 90,
            ordering_secs: 300,
            long_secs: 3600,
            window_close_secs: 10,
            download_secs: 600,
        }
    }
}

impl TimeoutConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Presence of controls that confirm the right window is in front
    pub fn confirm(&self) -> Duration {
        Duration::from_secs(self.confirm_secs)
    }

    /// Ordinary element lookups
    pub fn short(&self) -> Duration {
        Duration::from_secs(self.short_secs)
    }

    /// Asynchronous page rewrites and popup windows
    pub fn medium(&self) -> Duration {
        Duration::from_secs(self.medium_secs)
    }

    /// The document ordering page that follows the first CONTINUE
    pub fn ordering(&self) -> Duration {
        Duration::from_secs(self.ordering_secs)
    }

    /// PDF merges and busy overlays
    pub fn long(&self) -> Duration {
        Duration::from_secs(self.long_secs)
    }

    pub fn window_close(&self) -> Duration {
        Duration::from_secs(self.window_close_secs)
    }

    pub fn download(&self) -> Duration {
        Duration::from_secs(self.download_secs)
    }
}

impl EvisionConfig {
    /// Load configuration from an optional file plus `EVISION__*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| EvisionError::Config(format!("Failed to read configuration: {}", e)))?;
        let config: Self = settings
            .try_deserialize()
            .map_err(|e| EvisionError::Config(format!("Failed to parse configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EvisionError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.entry_url.trim().is_empty() {
            return Err(EvisionError::Config("Entry URL is required".to_string()));
        }

        if self.application_title.trim().is_empty() {
            return Err(EvisionError::Config("Application window title is required".to_string()));
        }

        let t = &self.timeouts;
        let zero = [
            ("poll_interval_ms", t.poll_interval_ms),
            ("confirm_secs", t.confirm_secs),
            ("short_secs", t.short_secs),
            ("medium_secs", t.medium_secs),
            ("ordering_secs", t.ordering_secs),
            ("long_secs", t.long_secs),
            ("window_close_secs", t.window_close_secs),
            ("download_secs", t.download_secs),
        ]
        .into_iter()
        .find(|(_, value)| *value == 0);
        if let Some((name, _)) = zero {
            return Err(EvisionError::Config(format!("Timeout {} must be greater than zero", name)));
        }

        if self.click_attempts == 0 || self.tab_attempts == 0 {
            return Err(EvisionError::Config(
                "click_attempts and tab_attempts must be at least 1".to_string(),
            ));
        }

        if self.download_workers == 0 {
            return Err(EvisionError::Config("download_workers must be at least 1".to_string()));
        }

        Ok(())
    }
}

//! Front-end configuration.
//!
//! Timings for the terminal and web views. Every field has a default, so a
//! config file only needs the values it changes:
//!
//! ```json
//! { "transition_ms": 600, "autoplay": true }
//! ```

use serde::{Serialize, Deserialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Playback timing and startup options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How long an advance stays highlighted as a transition.
    pub transition_ms: u64,
    /// Input poll interval of the terminal view.
    pub tick_ms: u64,
    /// Delay between steps while autoplaying.
    pub autoplay_interval_ms: u64,
    /// Start in autoplay mode.
    pub autoplay: bool,
}

impl Config {
    pub const DEFAULT_TRANSITION_MS: u64 = 1000;
    pub const DEFAULT_TICK_MS: u64 = 50;
    pub const DEFAULT_AUTOPLAY_INTERVAL_MS: u64 = 1500;

    /// Load a config file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_json(&text)
    }

    /// Parse config JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn autoplay_interval(&self) -> Duration {
        Duration::from_millis(self.autoplay_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transition_ms: Self::DEFAULT_TRANSITION_MS,
            tick_ms: Self::DEFAULT_TICK_MS,
            autoplay_interval_ms: Self::DEFAULT_AUTOPLAY_INTERVAL_MS,
            autoplay: false,
        }
    }
}

/// Errors that can occur while loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("JSON error: {0}")]
    ParseError(#[from] serde_json::Error),
}

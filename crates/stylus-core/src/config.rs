//! Engine configuration
//!
//! Every field has a default, so an empty TOML document is a valid config.
//!
//! ```toml
//! id_prefix = "stylus-"
//! marker_class = "stylus"
//! retire_delay_ms = 1000
//! orphan_check = true
//!
//! [watchdog]
//! mode = "observer"
//! poll_interval_ms = 500
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{Error, Result};
use stylus_protocol::StyleId;

fn default_id_prefix() -> String {
    "stylus-".to_string()
}

fn default_marker_class() -> String {
    "stylus".to_string()
}

/// How the watchdog notices a replaced document root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchdogMode {
    /// Child-list mutation records of the document node
    #[default]
    Observer,
    /// Periodic comparison of the live root against the stored one
    Polling,
}

/// Watchdog settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    pub mode: WatchdogMode,
    /// Interval of the root comparison in polling mode. Also used when the
    /// host has no mutation observer.
    pub poll_interval_ms: u64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            mode: WatchdogMode::Observer,
            poll_interval_ms: 500,
        }
    }
}

/// Configuration for one engine instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Prefix of injected element ids
    pub id_prefix: String,
    /// Class carried by every injected element
    pub marker_class: String,
    /// How long a retired element may wait for its replacement
    pub retire_delay_ms: u64,
    /// Root-rewrite watchdog settings
    pub watchdog: WatchdogConfig,
    /// Arm the session lifecycle guard on regular pages
    pub orphan_check: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            id_prefix: default_id_prefix(),
            marker_class: default_marker_class(),
            retire_delay_ms: 1000,
            watchdog: WatchdogConfig::default(),
            orphan_check: true,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a config from TOML
    ///
    /// # Example
    ///
    /// ```
    /// use stylus_core::config::{EngineConfig, WatchdogMode};
    ///
    /// let config = EngineConfig::parse(r#"
    /// retire_delay_ms = 250
    ///
    /// [watchdog]
    /// mode = "polling"
    /// "#).unwrap();
    ///
    /// assert_eq!(config.retire_delay_ms, 250);
    /// assert_eq!(config.watchdog.mode, WatchdogMode::Polling);
    /// assert_eq!(config.id_prefix, "stylus-");
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.id_prefix.is_empty() {
            return Err(config_error("id_prefix must not be empty"));
        }
        if self.marker_class.is_empty() || self.marker_class.contains(char::is_whitespace) {
            return Err(config_error("marker_class must be a single class name"));
        }
        if self.retire_delay_ms == 0 {
            return Err(config_error("retire_delay_ms must be greater than zero"));
        }
        if self.watchdog.poll_interval_ms == 0 {
            return Err(config_error("watchdog.poll_interval_ms must be greater than zero"));
        }
        Ok(())
    }

    pub fn retire_delay(&self) -> Duration {
        Duration::from_millis(self.retire_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.watchdog.poll_interval_ms)
    }

    /// Element id of a live style: `stylus-<id>`
    pub fn element_id(&self, id: &StyleId) -> String {
        format!("{}{}", self.id_prefix, id)
    }

    /// Element id of a retired style: `stylus-ghost-<id>`
    pub fn ghost_id(&self, id: &StyleId) -> String {
        format!("{}ghost-{}", self.id_prefix, id)
    }
}

fn config_error(message: &str) -> Error {
    Error::Config {
        message: message.to_string(),
    }
}

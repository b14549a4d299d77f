//! Station configuration
//!
//! Defaults, optionally overlaid by a TOML file, then by `PACKING_*`
//! environment variables.

use crate::error::ConfigError;
use crate::events::MAX_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a packing station
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StationConfig {
    /// Catalog JSON to load instead of the embedded seed
    pub catalog_path: Option<PathBuf>,

    /// Shortest accepted IMEI, in digits
    pub imei_min_len: usize,

    /// Longest accepted IMEI, in digits
    pub imei_max_len: usize,

    /// Prefix for ids of boxes added in manual mode
    pub manual_box_prefix: String,

    /// Broadcast channel capacity of the event bus
    pub event_capacity: usize,

    /// Whether a workstation must be registered before claiming a unit
    pub require_registration: bool,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            imei_min_len: 14,
            imei_max_len: 16,
            manual_box_prefix: "BX-MANUAL".to_string(),
            event_capacity: 256,
            require_registration: true,
        }
    }
}

fn parse_flag(val: &str) -> bool {
    val.to_lowercase() == "true" || val == "1"
}

impl StationConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Load a TOML file, then apply environment overrides on top
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `PACKING_*` overrides from an arbitrary variable source.
    ///
    /// Unparseable numbers are ignored and leave the current value.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("PACKING_CATALOG_PATH") {
            self.catalog_path = if path.is_empty() {
                None
            } else {
                Some(PathBuf::from(path))
            };
        }
        if let Some(n) = lookup("PACKING_IMEI_MIN_LEN").and_then(|v| v.parse().ok()) {
            self.imei_min_len = n;
        }
        if let Some(n) = lookup("PACKING_IMEI_MAX_LEN").and_then(|v| v.parse().ok()) {
            self.imei_max_len = n;
        }
        if let Some(prefix) = lookup("PACKING_MANUAL_BOX_PREFIX") {
            self.manual_box_prefix = prefix;
        }
        if let Some(n) = lookup("PACKING_EVENT_CAPACITY").and_then(|v| v.parse().ok()) {
            self.event_capacity = n;
        }
        if let Some(val) = lookup("PACKING_REQUIRE_REGISTRATION") {
            self.require_registration = parse_flag(&val);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.imei_min_len == 0 {
            return Err(ConfigError::invalid("imei_min_len must be at least 1"));
        }
        if self.imei_min_len > self.imei_max_len {
            return Err(ConfigError::invalid(format!(
                "imei_min_len ({}) exceeds imei_max_len ({})",
                self.imei_min_len, self.imei_max_len
            )));
        }
        if self.event_capacity == 0 || self.event_capacity > MAX_CAPACITY {
            return Err(ConfigError::invalid(format!(
                "event_capacity must be between 1 and {}, got {}",
                MAX_CAPACITY, self.event_capacity
            )));
        }
        if self.manual_box_prefix.trim().is_empty() {
            return Err(ConfigError::invalid("manual_box_prefix must not be empty"));
        }
        Ok(())
    }
}

//! Runtime configuration.
//!
//! Stored as TOML. Every key is optional; missing keys take the defaults below.
//!
//! ```toml
//! poll_interval_ms = 50
//!
//! [axis]
//! min = -1000
//! max = 1000
//! deadzone = 1000      # per-mille of the axis range, 0..=10000
//!
//! [controller]          # remembered controller, optional
//! instance = "6f1d2b61-d5a0-11cf-bfc7-444553540000"
//! product = "028e045e-0000-0000-0000-504944564944"
//! instance_name = "Controller (XBOX 360 For Windows)"
//! product_name = "Controller (XBOX 360 For Windows)"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::controller::ControllerIdentity;
use crate::error::{Error, Result};

/// Upper bound DirectInput accepts for `DIPROP_DEADZONE` / `DIPROP_SATURATION`.
pub const MAX_DEADZONE: u32 = 10_000;

/// Axis properties written to every axis object when a device is opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    pub min: i32,
    pub max: i32,
    pub deadzone: u32,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            min: -1000,
            max: 1000,
            deadzone: 1000,
        }
    }
}

impl AxisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min >= self.max {
            return Err(Error::InvalidConfig(format!(
                "axis.min ({}) must be below axis.max ({})",
                self.min, self.max
            )));
        }
        if self.deadzone > MAX_DEADZONE {
            return Err(Error::InvalidConfig(format!(
                "axis.deadzone ({}) exceeds {MAX_DEADZONE}",
                self.deadzone
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub poll_interval_ms: u64,
    pub axis: AxisConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<ControllerIdentity>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_ms: 50,
            axis: AxisConfig::default(),
            controller: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let cfg = Self::from_toml_str(&text)?;
        log::debug!("loaded config from {}", path.as_ref().display());
        Ok(cfg)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.validate()?;
        std::fs::write(path.as_ref(), self.to_toml_string()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "poll_interval_ms must be greater than zero".into(),
            ));
        }
        self.axis.validate()
    }

    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

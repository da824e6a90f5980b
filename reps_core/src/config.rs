//! Configuration file support for reptrack.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/reptrack/config.toml`.
//! Rep thresholds and screen timings are fixed and are not part of it.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub tracking: TrackingOptions,

    #[serde(default)]
    pub replay: ReplayConfig,
}

/// Body regions and display size handed to the pose detector at session start
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackingOptions {
    #[serde(default)]
    pub face: bool,
    #[serde(default = "enabled")]
    pub left_arm: bool,
    #[serde(default = "enabled")]
    pub right_arm: bool,
    #[serde(default = "enabled")]
    pub left_wrist: bool,
    #[serde(default = "enabled")]
    pub right_wrist: bool,
    #[serde(default = "enabled")]
    pub torso: bool,
    #[serde(default = "enabled")]
    pub left_leg: bool,
    #[serde(default = "enabled")]
    pub right_leg: bool,
    #[serde(default = "enabled")]
    pub left_ankle: bool,
    #[serde(default = "enabled")]
    pub right_ankle: bool,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for TrackingOptions {
    fn default() -> Self {
        Self {
            face: false,
            left_arm: true,
            right_arm: true,
            left_wrist: true,
            right_wrist: true,
            torso: true,
            left_leg: true,
            right_leg: true,
            left_ankle: true,
            right_ankle: true,
            width: default_width(),
            height: default_height(),
        }
    }
}

impl TrackingOptions {
    /// Calibration and every rep rule read the torso, legs and ankles
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("torso", self.torso),
            ("left_leg", self.left_leg),
            ("right_leg", self.right_leg),
            ("left_ankle", self.left_ankle),
            ("right_ankle", self.right_ankle),
        ];
        if let Some((name, _)) = required.iter().find(|(_, on)| !on) {
            return Err(Error::Config(format!(
                "tracking.{} must be enabled for rep counting",
                name
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::Config(format!(
                "tracking display size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Recording replay parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplayConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self { fps: default_fps() }
    }
}

// Default value functions
fn enabled() -> bool {
    true
}

fn default_width() -> u32 {
    400
}

fn default_height() -> u32 {
    600
}

fn default_fps() -> u32 {
    30
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let base = match dirs::config_dir() {
            Some(dir) => dir,
            None => {
                let home = std::env::var("HOME")
                    .map_err(|_| Error::Config("HOME environment variable not set".into()))?;
                PathBuf::from(home).join(".config")
            }
        };
        Ok(base.join("reptrack").join("config.toml"))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.tracking.validate()?;
        if self.replay.fps == 0 {
            return Err(Error::Config("replay.fps must be at least 1".into()));
        }
        Ok(())
    }
}

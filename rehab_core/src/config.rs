//! Configuration file support for the rehab tracker.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/rehab/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Longest exercise report window, in days
pub const MAX_WINDOW_DAYS: i64 = 3650;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub levels: LevelConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Bounds applied to feedback-driven level changes before they are stored
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LevelConfig {
    #[serde(default = "default_min_active_level")]
    pub min_active_level: i32,

    #[serde(default = "default_max_level")]
    pub max_level: i32,

    /// Store a flare-up as level 0 instead of raising it to `min_active_level`
    #[serde(default = "default_hold_halt_on_flare_up")]
    pub hold_halt_on_flare_up: bool,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            min_active_level: default_min_active_level(),
            max_level: default_max_level(),
            hold_halt_on_flare_up: default_hold_halt_on_flare_up(),
        }
    }
}

/// Exercise report configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_window_days")]
    pub window_days: i64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|_| PathBuf::from("."))
    });
    base.join("rehab")
}

fn default_min_active_level() -> i32 {
    1
}

fn default_max_level() -> i32 {
    10
}

fn default_hold_halt_on_flare_up() -> bool {
    true
}

fn default_window_days() -> i64 {
    14
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
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
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|_| PathBuf::from("."))
        });
        base.join("rehab").join("config.toml")
    }

    /// Reject settings the service cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.levels.min_active_level < 1 {
            return Err(Error::Config(format!(
                "levels.min_active_level must be at least 1, got {}",
                self.levels.min_active_level
            )));
        }
        if self.levels.min_active_level > self.levels.max_level {
            return Err(Error::Config(format!(
                "levels.min_active_level ({}) exceeds levels.max_level ({})",
                self.levels.min_active_level, self.levels.max_level
            )));
        }
        if !(1..=MAX_WINDOW_DAYS).contains(&self.report.window_days) {
            return Err(Error::Config(format!(
                "report.window_days must be between 1 and {}, got {}",
                MAX_WINDOW_DAYS, self.report.window_days
            )));
        }
        Ok(())
    }
}

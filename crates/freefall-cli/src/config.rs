//! TOML configuration: body shape, display, limits and an optional scripted
//! scenario that replaces the interactive prompts.

use std::fs;
use std::path::{Path, PathBuf};

use freefall_core::WindMode;
use freefall_sim::{track, Track, TrackError, DEFAULT_MAX_TICKS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid display settings: {0}")]
    Track(#[from] TrackError),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub body: BodyConfig,
    pub display: DisplayConfig,
    pub limits: LimitsConfig,
    pub scenario: Option<ScenarioConfig>,
}

/// Shape shared by every simulated object.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BodyConfig {
    pub drag_coefficient: f64,
    pub cross_sectional_area: f64,
}

impl Default for BodyConfig {
    fn default() -> Self {
        // smooth sphere, ~11 cm across
        Self { drag_coefficient: 0.47, cross_sectional_area: 0.01 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub rows: usize,
    pub trail_len: usize,
    pub frame_delay_ms: u64,
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rows: track::DEFAULT_ROWS,
            trail_len: track::DEFAULT_TRAIL_LEN,
            frame_delay_ms: 50,
            color: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    pub max_ticks: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_ticks: DEFAULT_MAX_TICKS }
    }
}

/// Pre-set wind and objects; when present no prompts are shown.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    pub wind: WindMode,
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
}

/// Per-object launch values, as typed at the prompt or listed in a scenario.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectSpec {
    pub mass: f64,
    pub initial_velocity: f64,
    pub initial_height: f64,
}

impl Config {
    /// # Errors
    /// Fails if the file cannot be read or is not valid config TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// # Errors
    /// Fails on malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// # Errors
    /// Fails when rows or trail length is zero.
    pub fn track(&self) -> Result<Track, ConfigError> {
        Ok(Track::new(self.display.rows, self.display.trail_len)?)
    }
}

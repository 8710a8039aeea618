//! Runtime settings: optional YAML file plus environment overrides.
//!
//! Lookup order: `SKIRMISH_CONFIG` (must exist when set), then `skirmish.yaml`
//! in the working directory if present, then defaults. `SKIRMISH_BIND` and
//! `SKIRMISH_ROSTER` override the bind address and roster path afterwards.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::{
    SimulationConfig, TraceMode, DEFAULT_MAX_TICKS, DEFAULT_STALL_WINDOW, DEFAULT_TICK_SIZE,
};
use crate::data::DEFAULT_ROSTER_PATH;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_CONFIG_PATH: &str = "skirmish.yaml";
/// Built compare-view frontend served next to the API.
pub const DEFAULT_STATIC_DIR: &str = "frontend/dist";

pub const CONFIG_ENV: &str = "SKIRMISH_CONFIG";
pub const BIND_ENV: &str = "SKIRMISH_BIND";
pub const ROSTER_ENV: &str = "SKIRMISH_ROSTER";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationDefaults {
    pub tick_size: f64,
    pub starting_distance: f64,
    pub stall_window: u64,
    pub max_ticks: u64,
}

impl Default for SimulationDefaults {
    fn default() -> Self {
        Self {
            tick_size: DEFAULT_TICK_SIZE,
            starting_distance: 0.0,
            stall_window: DEFAULT_STALL_WINDOW,
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }
}

impl SimulationDefaults {
    pub fn to_config(&self) -> SimulationConfig {
        SimulationConfig {
            tick_size: self.tick_size,
            starting_distance: self.starting_distance,
            stall_window: self.stall_window,
            max_ticks: self.max_ticks,
            trace_mode: TraceMode::Off,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_addr: String,
    pub roster_path: PathBuf,
    pub static_dir: PathBuf,
    pub simulation: SimulationDefaults,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            roster_path: PathBuf::from(DEFAULT_ROSTER_PATH),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            simulation: SimulationDefaults::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("unable to read settings '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse settings '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl Settings {
    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load() -> Result<Self, SettingsError> {
        let mut settings = match env::var(CONFIG_ENV) {
            Ok(path) => Self::load_from(path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load_from(DEFAULT_CONFIG_PATH)?
            }
            Err(_) => Self::default(),
        };
        settings.apply_overrides(env::var(BIND_ENV).ok(), env::var(ROSTER_ENV).ok());
        Ok(settings)
    }

    fn apply_overrides(&mut self, bind_addr: Option<String>, roster_path: Option<String>) {
        if let Some(bind_addr) = bind_addr.filter(|value| !value.trim().is_empty()) {
            self.bind_addr = bind_addr;
        }
        if let Some(roster_path) = roster_path.filter(|value| !value.trim().is_empty()) {
            self.roster_path = PathBuf::from(roster_path);
        }
    }
}

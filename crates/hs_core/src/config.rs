//! Engine configuration, read from an optional JSON file.
//!
//! Every field has a default, so a missing file or a partial file is fine:
//!
//! ```json
//! { "tick_hz": 60, "window": { "width": 640, "height": 480 } }
//! ```
//!
//! The file path is `handmade.json` in the working directory unless the
//! `HS_CONFIG` environment variable names another one.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::memory::{MemoryConfig, GAME_STATE_SIZE};

pub const CONFIG_ENV_VAR: &str = "HS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "handmade.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Handmade".to_string(),
            width: 1024,
            height: 768,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowConfig,
    /// Simulation ticks per second.
    pub tick_hz: f32,
    /// Longest frame time fed to the accumulator, in seconds.
    pub max_frame_time: f32,
    pub samples_per_sec: i32,
    /// Audio kept queued on the device, measured in ticks.
    pub audio_latency_ticks: f32,
    pub memory: MemoryConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            tick_hz: 30.0,
            max_frame_time: 0.25,
            samples_per_sec: 44100,
            audio_latency_ticks: 2.0,
            memory: MemoryConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.tick_hz
    }
}

pub fn resolve_config_path(env_override: Option<String>) -> PathBuf {
    match env_override {
        Some(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_CONFIG_PATH),
    }
}

pub fn load_config_from_path(path: &Path) -> Result<EngineConfig, CoreError> {
    let raw = fs::read_to_string(path).map_err(|source| CoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: EngineConfig = serde_json::from_str(&raw).map_err(|source| CoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Load the configured file, falling back to defaults when it is absent or
/// unusable.
pub fn load_config() -> EngineConfig {
    let path = resolve_config_path(std::env::var(CONFIG_ENV_VAR).ok());
    load_config_or_default(&path)
}

fn load_config_or_default(path: &Path) -> EngineConfig {
    if !path.exists() {
        log::warn!("No config at '{}', using defaults.", path.display());
        return EngineConfig::default();
    }
    match load_config_from_path(path) {
        Ok(config) => {
            log::info!("Config loaded from '{}'", path.display());
            config
        }
        Err(err) => {
            log::warn!("{err}; using defaults.");
            EngineConfig::default()
        }
    }
}

fn validate_config(config: &EngineConfig) -> Result<(), CoreError> {
    let fail = |reason: &str| -> Result<(), CoreError> {
        Err(CoreError::Validation {
            what: "config",
            reason: reason.to_string(),
        })
    };
    if !(config.tick_hz.is_finite() && config.tick_hz > 0.0) {
        return fail("tick_hz must be > 0");
    }
    if !(config.max_frame_time.is_finite() && config.max_frame_time > 0.0) {
        return fail("max_frame_time must be > 0");
    }
    if config.samples_per_sec <= 0 {
        return fail("samples_per_sec must be > 0");
    }
    if !(config.audio_latency_ticks.is_finite() && config.audio_latency_ticks >= 0.0) {
        return fail("audio_latency_ticks must be >= 0");
    }
    if config.window.width == 0 || config.window.height == 0 {
        return fail("window size must be non-zero");
    }
    if config.memory.permanent_storage_size < GAME_STATE_SIZE {
        return fail("permanent_storage_size is too small for the game state");
    }
    Ok(())
}

//! Configuration loading and validation

use anyhow::{bail, Result};
use nao_pos_core::{deg_to_rad, NUM_JOINTS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub publisher: PublisherConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Emit periodic action requests
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between action requests
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Action to request (name of a pos file without extension)
    #[serde(default = "default_action")]
    pub action: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_interval(),
            action: default_action(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval() -> u64 {
    10
}

fn default_action() -> String {
    "only_legs".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Directory holding `<action>.pos` files
    #[serde(default = "default_pos_dir")]
    pub pos_dir: PathBuf,
    /// Command period in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Pose assumed at the start of every playback, in degrees (empty = all zero)
    #[serde(default)]
    pub start_positions_deg: Vec<f32>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            pos_dir: default_pos_dir(),
            tick_ms: default_tick_ms(),
            start_positions_deg: Vec::new(),
        }
    }
}

fn default_pos_dir() -> PathBuf {
    PathBuf::from("./pos")
}

fn default_tick_ms() -> u64 {
    12 // LoLA runs at roughly 83 Hz
}

impl PlaybackConfig {
    /// Start pose in radians
    pub fn start_pose(&self) -> Result<[f32; NUM_JOINTS]> {
        let mut pose = [0.0; NUM_JOINTS];
        match self.start_positions_deg.len() {
            0 => {}
            NUM_JOINTS => {
                for (joint, degrees) in pose.iter_mut().zip(&self.start_positions_deg) {
                    *joint = deg_to_rad(*degrees);
                }
            }
            n => bail!(
                "start_positions_deg has {} values, expected {}",
                n,
                NUM_JOINTS
            ),
        }
        Ok(pose)
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.publisher.interval_secs == 0 {
            bail!("publisher.interval_secs must be greater than zero");
        }
        if self.playback.tick_ms == 0 {
            bail!("playback.tick_ms must be greater than zero");
        }
        self.playback.start_pose()?;
        Ok(())
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        config
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Config::default()
    };

    config.validate()?;
    Ok(config)
}

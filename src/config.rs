use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::phase::Phase;

pub const MAX_FPS: u32 = 60;

/// Defaults read from the optional config file. Every field may be omitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub duration: String,
    pub inhale: u64,
    pub hold1: u64,
    pub exhale: u64,
    pub hold2: u64,
    pub fps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration: "60s".to_string(),
            inhale: 4,
            hold1: 2,
            exhale: 4,
            hold2: 2,
            fps: 10,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "zen") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("zen_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            debug!(path = %self.path.display(), "no config file, using defaults");
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "ignoring malformed config file");
                Config::default()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("session duration must be greater than zero")]
    ZeroDuration,
    #[error("inhale and exhale must be positive (hold can be 0)")]
    ZeroBreath,
    #[error("FPS must be between 1 and 60, got {0}")]
    FpsOutOfRange(u32),
}

/// Validated, immutable parameters for one breathing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    total_secs: u64,
    inhale_secs: u64,
    hold_after_inhale_secs: u64,
    exhale_secs: u64,
    hold_after_exhale_secs: u64,
    fps: u32,
}

impl SessionConfig {
    pub fn new(
        total_secs: u64,
        inhale_secs: u64,
        hold_after_inhale_secs: u64,
        exhale_secs: u64,
        hold_after_exhale_secs: u64,
        fps: u32,
    ) -> Result<Self, ConfigError> {
        if total_secs == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if inhale_secs == 0 || exhale_secs == 0 {
            return Err(ConfigError::ZeroBreath);
        }
        if !(1..=MAX_FPS).contains(&fps) {
            return Err(ConfigError::FpsOutOfRange(fps));
        }
        Ok(Self {
            total_secs,
            inhale_secs,
            hold_after_inhale_secs,
            exhale_secs,
            hold_after_exhale_secs,
            fps,
        })
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn total(&self) -> Duration {
        Duration::from_secs(self.total_secs)
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn phase_secs(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Inhale => self.inhale_secs,
            Phase::HoldAfterInhale => self.hold_after_inhale_secs,
            Phase::Exhale => self.exhale_secs,
            Phase::HoldAfterExhale => self.hold_after_exhale_secs,
        }
    }

    pub fn phase_duration(&self, phase: Phase) -> Duration {
        Duration::from_secs(self.phase_secs(phase))
    }

    /// Frame ticks that fit in a phase at the configured rate.
    pub fn frames_for(&self, phase: Phase) -> u64 {
        self.phase_secs(phase).saturating_mul(u64::from(self.fps))
    }

    /// Length of one full cycle. Display only.
    pub fn cycle_secs(&self) -> u64 {
        Phase::CYCLE.iter().map(|p| self.phase_secs(*p)).sum()
    }
}

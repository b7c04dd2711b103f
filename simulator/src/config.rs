use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shadowflight_types::{ConfigError, EngineCapabilities, GameConfig};
use thiserror::Error as ThisError;

/// How simulated time relates to wall-clock time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Pacing {
    /// Advance the clock as fast as possible.
    #[default]
    Virtual,
    /// Advance the clock on a tokio interval.
    Realtime,
}

#[derive(Debug, ThisError, PartialEq)]
pub enum SettingsError {
    #[error(transparent)]
    Game(#[from] ConfigError),
    #[error("rounds must be > 0")]
    NoRounds,
    #[error("cash_out_at must be > 1.0 (got {0})")]
    CashOutTarget(f64),
    #[error("speed must be finite and > 0 (got {0})")]
    Speed(f64),
}

/// Simulator settings, loadable from YAML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub game: GameConfig,
    /// Seed for the round RNG. Drawn from entropy when absent.
    pub seed: Option<u64>,
    pub rounds: u32,
    pub bet: f64,
    /// Multiplier at which the bot cashes out. The bot never cashes out when absent.
    pub cash_out_at: Option<f64>,
    pub stop_on_profit: Option<f64>,
    pub stop_on_loss: Option<f64>,
    /// SQLite database for round history (disabled when omitted).
    pub history_path: Option<PathBuf>,
    pub pacing: Pacing,
    /// Simulated milliseconds per wall-clock millisecond in realtime pacing.
    pub speed: f64,
    /// Play without auto-play or safe-zone rounds.
    pub classic: bool,
    pub log_level: String,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            seed: None,
            rounds: 10,
            bet: 10.0,
            cash_out_at: Some(2.0),
            stop_on_profit: None,
            stop_on_loss: None,
            history_path: None,
            pacing: Pacing::Virtual,
            speed: 1.0,
            classic: false,
            log_level: "info".to_string(),
        }
    }
}

impl SimulatorConfig {
    pub fn from_yaml(contents: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(contents).context("parse simulator config")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read simulator config {}", path.display()))?;
        Self::from_yaml(&contents)
    }

    pub fn capabilities(&self) -> EngineCapabilities {
        if self.classic {
            EngineCapabilities::classic()
        } else {
            EngineCapabilities::default()
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.game.validate()?;
        if self.rounds == 0 {
            return Err(SettingsError::NoRounds);
        }
        if let Some(target) = self.cash_out_at {
            if target.is_nan() || target <= 1.0 {
                return Err(SettingsError::CashOutTarget(target));
            }
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(SettingsError::Speed(self.speed));
        }
        Ok(())
    }
}

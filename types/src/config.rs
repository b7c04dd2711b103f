use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use crate::constants::*;

#[derive(Debug, ThisError, PartialEq)]
pub enum ConfigError {
    #[error("bet limits invalid (min={min}, max={max})")]
    BetLimits { min: f64, max: f64 },
    #[error("initial balance must be non-negative (got={0})")]
    InitialBalance(f64),
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("difficulty bounds invalid (min={min}, initial={initial}, max={max})")]
    DifficultyBounds { min: f64, initial: f64, max: f64 },
    #[error("difficulty steps must be positive (win={win}, loss={loss})")]
    DifficultySteps { win: f64, loss: f64 },
    #[error("safe zone chance out of range (got={0})")]
    SafeZoneChance(f64),
    #[error("crash_point_max must exceed 1.0 (got={0})")]
    CrashPointMax(f64),
    #[error("drain_exponent must be positive (got={0})")]
    DrainExponent(f64),
    #[error("simple_history_cap must be greater than zero")]
    SimpleHistoryCap,
}

/// Tunables consumed by the round engine.
///
/// Fixed once an engine is built. Every field falls back to the matching
/// constant when omitted from a config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub min_bet: f64,
    pub max_bet: f64,
    pub initial_balance: f64,
    pub game_loop_interval_ms: u64,
    pub countdown_seconds: u32,
    pub post_round_delay_ms: u64,
    pub shake_duration_ms: u64,
    pub difficulty_initial: f64,
    pub difficulty_min: f64,
    pub difficulty_max: f64,
    pub difficulty_win_increase: f64,
    pub difficulty_loss_decrease: f64,
    pub safe_zone_chance: f64,
    pub crash_point_max: f64,
    pub drain_exponent: f64,
    pub simple_history_cap: usize,
    pub advertised_rtp_percent: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_bet: MIN_BET,
            max_bet: MAX_BET,
            initial_balance: INITIAL_BALANCE,
            game_loop_interval_ms: GAME_LOOP_INTERVAL_MS,
            countdown_seconds: COUNTDOWN_SECONDS,
            post_round_delay_ms: POST_ROUND_DELAY_MS,
            shake_duration_ms: SHAKE_DURATION_MS,
            difficulty_initial: DIFFICULTY_INITIAL,
            difficulty_min: DIFFICULTY_MIN,
            difficulty_max: DIFFICULTY_MAX,
            difficulty_win_increase: DIFFICULTY_WIN_INCREASE,
            difficulty_loss_decrease: DIFFICULTY_LOSS_DECREASE,
            safe_zone_chance: SAFE_ZONE_CHANCE,
            crash_point_max: CRASH_POINT_MAX,
            drain_exponent: DRAIN_EXPONENT,
            simple_history_cap: SIMPLE_HISTORY_CAP,
            advertised_rtp_percent: THEORETICAL_RTP_PERCENT,
        }
    }
}

impl GameConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_bet > 0.0 && self.min_bet <= self.max_bet) {
            return Err(ConfigError::BetLimits {
                min: self.min_bet,
                max: self.max_bet,
            });
        }
        if !(self.initial_balance >= 0.0) {
            return Err(ConfigError::InitialBalance(self.initial_balance));
        }
        if self.game_loop_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration("game_loop_interval_ms"));
        }
        if self.countdown_seconds == 0 {
            return Err(ConfigError::ZeroDuration("countdown_seconds"));
        }
        if self.post_round_delay_ms == 0 {
            return Err(ConfigError::ZeroDuration("post_round_delay_ms"));
        }
        if !(self.difficulty_min > 0.0
            && self.difficulty_min <= self.difficulty_initial
            && self.difficulty_initial <= self.difficulty_max)
        {
            return Err(ConfigError::DifficultyBounds {
                min: self.difficulty_min,
                initial: self.difficulty_initial,
                max: self.difficulty_max,
            });
        }
        if !(self.difficulty_win_increase > 0.0 && self.difficulty_loss_decrease > 0.0) {
            return Err(ConfigError::DifficultySteps {
                win: self.difficulty_win_increase,
                loss: self.difficulty_loss_decrease,
            });
        }
        if !(0.0..=1.0).contains(&self.safe_zone_chance) {
            return Err(ConfigError::SafeZoneChance(self.safe_zone_chance));
        }
        if !(self.crash_point_max > 1.0) {
            return Err(ConfigError::CrashPointMax(self.crash_point_max));
        }
        if !(self.drain_exponent > 0.0) {
            return Err(ConfigError::DrainExponent(self.drain_exponent));
        }
        if self.simple_history_cap == 0 {
            return Err(ConfigError::SimpleHistoryCap);
        }
        Ok(())
    }

    /// Countdown length in milliseconds.
    pub fn countdown_ms(&self) -> u64 {
        u64::from(self.countdown_seconds).saturating_mul(1_000)
    }
}

/// Feature switches that select between the game's variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineCapabilities {
    /// Allow auto-play sessions to be activated.
    pub auto_play: bool,
    /// Allow rounds to roll a safe zone.
    pub safe_zone: bool,
}

impl Default for EngineCapabilities {
    fn default() -> Self {
        Self {
            auto_play: true,
            safe_zone: true,
        }
    }
}

impl EngineCapabilities {
    /// The stripped-down variant without auto-play or safe zones.
    pub fn classic() -> Self {
        Self {
            auto_play: false,
            safe_zone: false,
        }
    }
}

use serde::{Deserialize, Serialize};

/// Phase of the round cycle.
///
/// Phases run `Betting -> Countdown -> InProgress -> Crashed -> Betting`
/// with no terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RoundPhase {
    Betting = 0,
    Countdown = 1,
    InProgress = 2,
    Crashed = 3,
}

impl RoundPhase {
    /// The phase that follows this one.
    pub fn next(self) -> Self {
        match self {
            RoundPhase::Betting => RoundPhase::Countdown,
            RoundPhase::Countdown => RoundPhase::InProgress,
            RoundPhase::InProgress => RoundPhase::Crashed,
            RoundPhase::Crashed => RoundPhase::Betting,
        }
    }

    /// Whether the player's stake is currently committed.
    pub fn stake_at_risk(self) -> bool {
        matches!(self, RoundPhase::Countdown | RoundPhase::InProgress)
    }
}

impl TryFrom<u8> for RoundPhase {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RoundPhase::Betting),
            1 => Ok(RoundPhase::Countdown),
            2 => Ok(RoundPhase::InProgress),
            3 => Ok(RoundPhase::Crashed),
            _ => Err(()),
        }
    }
}

/// Per-tick state handed to the presentation layer.
///
/// `plane_y` and `shadow_y` are display positions only.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlightFrame {
    pub phase: RoundPhase,
    pub multiplier: f64,
    pub effective_multiplier: f64,
    pub is_safe_zone: bool,
    pub is_warning: bool,
    pub plane_y: f64,
    pub shadow_y: f64,
    pub proximity: f64,
}

/// Coarse label for the difficulty factor shown next to the balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeLevel {
    Low,
    Normal,
    High,
    Intense,
}

impl ChallengeLevel {
    pub fn from_difficulty(difficulty: f64) -> Self {
        if difficulty < 0.9 {
            ChallengeLevel::Low
        } else if difficulty < 1.1 {
            ChallengeLevel::Normal
        } else if difficulty < 1.3 {
            ChallengeLevel::High
        } else {
            ChallengeLevel::Intense
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::round::FlightFrame;

/// Why an auto-play session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoPlayStopReason {
    Manual,
    RoundsExhausted,
    ProfitTarget,
    LossLimit,
    InsufficientBalance,
}

/// Notification emitted by the round engine.
///
/// Consumed by presentation, audio and haptics collaborators. The crash
/// multiplier is only revealed by `Crashed`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EngineEvent {
    BetPlaced { amount: f64, balance: f64 },
    CountdownTick { remaining: u32 },
    Takeoff { is_safe_zone: bool },
    Frame(FlightFrame),
    DrainLevel { percentage: f64 },
    WarningOnset,
    CashedOut { amount: f64, multiplier: f64 },
    Crashed { crash_multiplier: f64 },
    ShakeEnded,
    RoundReset,
    AutoPlayStopped { reason: AutoPlayStopReason },
}

impl EngineEvent {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::BetPlaced { .. } => "bet_placed",
            EngineEvent::CountdownTick { .. } => "countdown_tick",
            EngineEvent::Takeoff { .. } => "takeoff",
            EngineEvent::Frame(_) => "frame",
            EngineEvent::DrainLevel { .. } => "drain_level",
            EngineEvent::WarningOnset => "warning_onset",
            EngineEvent::CashedOut { .. } => "cashed_out",
            EngineEvent::Crashed { .. } => "crashed",
            EngineEvent::ShakeEnded => "shake_ended",
            EngineEvent::RoundReset => "round_reset",
            EngineEvent::AutoPlayStopped { .. } => "auto_play_stopped",
        }
    }

    /// Whether the event repeats on every tick.
    pub fn is_continuous(&self) -> bool {
        matches!(self, EngineEvent::Frame(_) | EngineEvent::DrainLevel { .. })
    }
}

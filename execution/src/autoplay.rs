//! Auto-play sessions.
//!
//! A session re-places the same stake every time the engine returns to
//! `Betting`, until its round budget runs out, a profit or loss threshold is
//! crossed, the balance can no longer cover the stake, or the player stops it.
//! A round already in flight is never interrupted.

use shadowflight_types::{AutoPlayStopReason, EngineEvent, RoundPhase};
use thiserror::Error as ThisError;
use tracing::{info, warn};

use crate::bet::clamp_bet;
use crate::engine::RoundEngine;
use crate::scheduler::Scheduler;

#[derive(Debug, ThisError, Clone, Copy, PartialEq)]
pub enum AutoPlayRefused {
    #[error("auto-play is disabled for this engine")]
    Disabled,
    #[error("auto-play can only start while betting is open")]
    NotBetting,
    #[error("an auto-play session is already running")]
    AlreadyActive,
    #[error("auto-play needs at least one round")]
    NoRounds,
    #[error("insufficient balance for auto-play (balance={balance}, bet={bet})")]
    InsufficientBalance { balance: f64, bet: f64 },
}

/// Requested session parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoPlaySettings {
    pub rounds: u32,
    pub bet_amount: f64,
    /// Stop once profit reaches this amount. Ignored unless finite and positive.
    pub stop_on_profit: Option<f64>,
    /// Stop once loss reaches this amount. Ignored unless finite and positive.
    pub stop_on_loss: Option<f64>,
}

/// A running session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoPlaySession {
    pub rounds_remaining: u32,
    pub bet_amount: f64,
    pub initial_balance: f64,
    pub stop_on_profit: Option<f64>,
    pub stop_on_loss: Option<f64>,
}

impl AutoPlaySession {
    pub fn profit(&self, balance: f64) -> f64 {
        balance - self.initial_balance
    }

    /// Threshold crossed at `balance`, if any.
    fn threshold_reached(&self, balance: f64) -> Option<AutoPlayStopReason> {
        let profit = self.profit(balance);
        if self.stop_on_profit.is_some_and(|target| profit >= target) {
            return Some(AutoPlayStopReason::ProfitTarget);
        }
        if self.stop_on_loss.is_some_and(|limit| -profit >= limit) {
            return Some(AutoPlayStopReason::LossLimit);
        }
        None
    }
}

/// What auto-play did on a return to `Betting`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AutoPlayStep {
    Placed { amount: f64, rounds_remaining: u32 },
    Stopped(AutoPlayStopReason),
    Idle,
}

#[derive(Clone, Debug, Default)]
pub struct AutoPlayController {
    session: Option<AutoPlaySession>,
}

fn threshold(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

impl AutoPlayController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&AutoPlaySession> {
        self.session.as_ref()
    }

    /// Start a session. Nothing changes when the request is refused.
    pub fn activate<S: Scheduler>(
        &mut self,
        engine: &RoundEngine<S>,
        settings: AutoPlaySettings,
    ) -> Result<&AutoPlaySession, AutoPlayRefused> {
        if !engine.capabilities().auto_play {
            return Err(AutoPlayRefused::Disabled);
        }
        if self.session.is_some() {
            return Err(AutoPlayRefused::AlreadyActive);
        }
        if engine.phase() != RoundPhase::Betting {
            return Err(AutoPlayRefused::NotBetting);
        }
        if settings.rounds == 0 {
            return Err(AutoPlayRefused::NoRounds);
        }

        let config = engine.config();
        let balance = engine.balance();
        let bet = clamp_bet(settings.bet_amount, balance, config);
        if bet < config.min_bet || bet > balance {
            return Err(AutoPlayRefused::InsufficientBalance { balance, bet });
        }

        let session = AutoPlaySession {
            rounds_remaining: settings.rounds,
            bet_amount: bet,
            initial_balance: balance,
            stop_on_profit: threshold(settings.stop_on_profit),
            stop_on_loss: threshold(settings.stop_on_loss),
        };
        info!(
            rounds = session.rounds_remaining,
            bet = session.bet_amount,
            stop_on_profit = session.stop_on_profit,
            stop_on_loss = session.stop_on_loss,
            "auto-play activated"
        );
        Ok(&*self.session.insert(session))
    }

    /// Stop the session. The current round, if any, plays out.
    pub fn deactivate<S: Scheduler>(&mut self, engine: &mut RoundEngine<S>) -> bool {
        if self.session.is_none() {
            return false;
        }
        self.stop(engine, AutoPlayStopReason::Manual);
        true
    }

    /// Run the session for a return to `Betting`.
    pub fn on_betting<S: Scheduler>(&mut self, engine: &mut RoundEngine<S>) -> AutoPlayStep {
        let Some(session) = self.session else {
            return AutoPlayStep::Idle;
        };
        if engine.phase() != RoundPhase::Betting {
            return AutoPlayStep::Idle;
        }

        let balance = engine.balance();
        let reason = if session.rounds_remaining == 0 {
            Some(AutoPlayStopReason::RoundsExhausted)
        } else if let Some(reason) = session.threshold_reached(balance) {
            Some(reason)
        } else if balance < session.bet_amount || session.bet_amount < engine.config().min_bet {
            Some(AutoPlayStopReason::InsufficientBalance)
        } else {
            None
        };
        if let Some(reason) = reason {
            self.stop(engine, reason);
            return AutoPlayStep::Stopped(reason);
        }

        match engine.place_bet(session.bet_amount) {
            Ok(amount) => {
                let rounds_remaining = session.rounds_remaining - 1;
                if let Some(active) = self.session.as_mut() {
                    active.rounds_remaining = rounds_remaining;
                }
                AutoPlayStep::Placed {
                    amount,
                    rounds_remaining,
                }
            }
            Err(err) => {
                warn!(?err, "auto-play bet rejected");
                self.stop(engine, AutoPlayStopReason::InsufficientBalance);
                AutoPlayStep::Stopped(AutoPlayStopReason::InsufficientBalance)
            }
        }
    }

    fn stop<S: Scheduler>(&mut self, engine: &mut RoundEngine<S>, reason: AutoPlayStopReason) {
        if let Some(session) = self.session.take() {
            info!(
                ?reason,
                rounds_remaining = session.rounds_remaining,
                profit = session.profit(engine.balance()),
                "auto-play stopped"
            );
            engine.push_event(EngineEvent::AutoPlayStopped { reason });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadowflight_types::{EngineCapabilities, GameConfig};

    use crate::rng::GameRng;
    use crate::scheduler::VirtualScheduler;

    fn engine(balance: f64, capabilities: EngineCapabilities) -> RoundEngine {
        let config = GameConfig {
            initial_balance: balance,
            ..GameConfig::default()
        };
        RoundEngine::new(config, capabilities, VirtualScheduler::new(), GameRng::from_seed(9)).unwrap()
    }

    fn settings(rounds: u32, bet_amount: f64) -> AutoPlaySettings {
        AutoPlaySettings {
            rounds,
            bet_amount,
            stop_on_profit: None,
            stop_on_loss: None,
        }
    }

    #[test]
    fn test_refused_when_disabled() {
        let engine = engine(100.0, EngineCapabilities::classic());
        let mut auto = AutoPlayController::new();
        assert_eq!(
            auto.activate(&engine, settings(3, 10.0)).unwrap_err(),
            AutoPlayRefused::Disabled
        );
        assert!(!auto.is_active());
    }

    #[test]
    fn test_refused_without_rounds() {
        let engine = engine(100.0, EngineCapabilities::default());
        let mut auto = AutoPlayController::new();
        assert_eq!(
            auto.activate(&engine, settings(0, 10.0)).unwrap_err(),
            AutoPlayRefused::NoRounds
        );
    }

    #[test]
    fn test_refused_outside_betting() {
        let mut engine = engine(100.0, EngineCapabilities::default());
        engine.place_bet(10.0).unwrap();
        let mut auto = AutoPlayController::new();
        assert_eq!(
            auto.activate(&engine, settings(3, 10.0)).unwrap_err(),
            AutoPlayRefused::NotBetting
        );
    }

    #[test]
    fn test_refused_when_broke() {
        let engine = engine(0.5, EngineCapabilities::default());
        let mut auto = AutoPlayController::new();
        assert!(matches!(
            auto.activate(&engine, settings(3, 10.0)),
            Err(AutoPlayRefused::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn test_refused_when_already_active() {
        let engine = engine(100.0, EngineCapabilities::default());
        let mut auto = AutoPlayController::new();
        auto.activate(&engine, settings(3, 10.0)).unwrap();
        assert_eq!(
            auto.activate(&engine, settings(3, 10.0)).unwrap_err(),
            AutoPlayRefused::AlreadyActive
        );
    }

    #[test]
    fn test_thresholds_normalized() {
        let engine = engine(100.0, EngineCapabilities::default());
        let mut auto = AutoPlayController::new();
        let session = auto
            .activate(
                &engine,
                AutoPlaySettings {
                    rounds: 2,
                    bet_amount: 10.0,
                    stop_on_profit: Some(0.0),
                    stop_on_loss: Some(f64::NAN),
                },
            )
            .unwrap();
        assert_eq!(session.stop_on_profit, None);
        assert_eq!(session.stop_on_loss, None);
        assert_eq!(session.initial_balance, 100.0);
    }

    #[test]
    fn test_on_betting_places_and_counts() {
        let mut engine = engine(100.0, EngineCapabilities::default());
        let mut auto = AutoPlayController::new();
        auto.activate(&engine, settings(2, 10.0)).unwrap();

        assert_eq!(
            auto.on_betting(&mut engine),
            AutoPlayStep::Placed {
                amount: 10.0,
                rounds_remaining: 1
            }
        );
        assert_eq!(engine.phase(), RoundPhase::Countdown);
        // Not back in betting yet.
        assert_eq!(auto.on_betting(&mut engine), AutoPlayStep::Idle);
        assert_eq!(auto.session().unwrap().rounds_remaining, 1);
    }

    #[test]
    fn test_profit_target_stops() {
        let mut engine = engine(100.0, EngineCapabilities::default());
        let mut auto = AutoPlayController::new();
        auto.activate(
            &engine,
            AutoPlaySettings {
                rounds: 10,
                bet_amount: 10.0,
                stop_on_profit: Some(5.0),
                stop_on_loss: None,
            },
        )
        .unwrap();
        let session = *auto.session().unwrap();
        assert_eq!(session.threshold_reached(105.0), Some(AutoPlayStopReason::ProfitTarget));
        assert_eq!(session.threshold_reached(104.0), None);

        engine.drain_events();
        assert!(auto.deactivate(&mut engine));
        assert!(!auto.deactivate(&mut engine));
        assert_eq!(
            engine.drain_events(),
            vec![EngineEvent::AutoPlayStopped {
                reason: AutoPlayStopReason::Manual
            }]
        );
    }

    #[test]
    fn test_exhausted_rounds_stop() {
        let mut engine = engine(100.0, EngineCapabilities::default());
        let mut auto = AutoPlayController::new();
        auto.activate(&engine, settings(1, 10.0)).unwrap();
        auto.session.as_mut().unwrap().rounds_remaining = 0;
        assert_eq!(
            auto.on_betting(&mut engine),
            AutoPlayStep::Stopped(AutoPlayStopReason::RoundsExhausted)
        );
        assert!(!auto.is_active());
        assert_eq!(engine.phase(), RoundPhase::Betting);
    }
}

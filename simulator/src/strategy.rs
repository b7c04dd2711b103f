use shadowflight_execution::{RoundEngine, Scheduler};
use shadowflight_types::RoundPhase;

/// When the bot takes its winnings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CashOutStrategy {
    /// Cash out once the effective multiplier reaches the target.
    Target(f64),
    /// Ride every round to the crash.
    Hold,
}

impl CashOutStrategy {
    pub fn from_target(target: Option<f64>) -> Self {
        match target {
            Some(target) => Self::Target(target),
            None => Self::Hold,
        }
    }

    pub fn should_cash_out<S: Scheduler>(&self, engine: &RoundEngine<S>) -> bool {
        if engine.phase() != RoundPhase::InProgress || engine.has_cashed_out() {
            return false;
        }
        match self {
            Self::Target(target) => engine.effective_multiplier() >= *target,
            Self::Hold => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadowflight_execution::RoundOverride;

    #[test]
    fn test_target_waits_for_effective_multiplier() {
        let mut engine = RoundEngine::with_seed(1).unwrap();
        engine.push_override(RoundOverride {
            crash_multiplier: 10.0,
            is_safe_zone: true,
            rise_rate: 0.03,
        });
        let strategy = CashOutStrategy::Target(1.2);
        assert!(!strategy.should_cash_out(&engine));

        engine.place_bet(10.0).unwrap();
        engine.advance(engine.config().countdown_ms());
        assert!(!strategy.should_cash_out(&engine));

        let tick = engine.config().game_loop_interval_ms;
        while !strategy.should_cash_out(&engine) {
            engine.advance(tick);
            assert_eq!(engine.phase(), RoundPhase::InProgress);
        }
        assert!(engine.effective_multiplier() >= 1.2);
        engine.cash_out().unwrap();
        assert!(!strategy.should_cash_out(&engine));
    }

    #[test]
    fn test_hold_never_cashes_out() {
        assert_eq!(CashOutStrategy::from_target(None), CashOutStrategy::Hold);
        let engine = RoundEngine::with_seed(2).unwrap();
        assert!(!CashOutStrategy::Hold.should_cash_out(&engine));
    }
}

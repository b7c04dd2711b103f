//! Round-to-round difficulty adaptation.
//!
//! Wins push the factor up by a fixed step, losses pull it down, and the
//! result is clamped to the configured bounds. Whether the round was a safe
//! zone plays no part.

use shadowflight_types::{ChallengeLevel, GameConfig};

#[derive(Clone, Debug, PartialEq)]
pub struct DifficultyController {
    factor: f64,
    min: f64,
    max: f64,
    win_increase: f64,
    loss_decrease: f64,
}

impl DifficultyController {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            factor: config
                .difficulty_initial
                .clamp(config.difficulty_min, config.difficulty_max),
            min: config.difficulty_min,
            max: config.difficulty_max,
            win_increase: config.difficulty_win_increase,
            loss_decrease: config.difficulty_loss_decrease,
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn challenge_level(&self) -> ChallengeLevel {
        ChallengeLevel::from_difficulty(self.factor)
    }

    /// Step the factor after a round and return the new value.
    pub fn on_round_end(&mut self, won: bool) -> f64 {
        self.factor = if won {
            (self.factor + self.win_increase).min(self.max)
        } else {
            (self.factor - self.loss_decrease).max(self.min)
        };
        self.factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_starts_at_initial() {
        let config = GameConfig::default();
        let controller = DifficultyController::new(&config);
        assert_eq!(controller.factor(), config.difficulty_initial);
        assert_eq!(controller.challenge_level(), ChallengeLevel::Normal);
    }

    #[test]
    fn test_single_steps() {
        let config = GameConfig::default();
        let mut controller = DifficultyController::new(&config);
        let after_win = controller.on_round_end(true);
        assert!((after_win - (config.difficulty_initial + config.difficulty_win_increase)).abs() < 1e-12);
        let after_loss = controller.on_round_end(false);
        assert!((after_loss - (after_win - config.difficulty_loss_decrease)).abs() < 1e-12);
    }

    #[test]
    fn test_repeated_wins_converge_to_max() {
        let config = GameConfig::default();
        let mut controller = DifficultyController::new(&config);
        for _ in 0..1_000 {
            controller.on_round_end(true);
        }
        assert_eq!(controller.factor(), config.difficulty_max);
        controller.on_round_end(true);
        assert_eq!(controller.factor(), config.difficulty_max);
        assert_eq!(controller.challenge_level(), ChallengeLevel::Intense);
    }

    #[test]
    fn test_repeated_losses_converge_to_min() {
        let config = GameConfig::default();
        let mut controller = DifficultyController::new(&config);
        for _ in 0..1_000 {
            controller.on_round_end(false);
        }
        assert_eq!(controller.factor(), config.difficulty_min);
        controller.on_round_end(false);
        assert_eq!(controller.factor(), config.difficulty_min);
        assert_eq!(controller.challenge_level(), ChallengeLevel::Low);
    }

    proptest! {
        #[test]
        fn prop_factor_never_leaves_bounds(outcomes in proptest::collection::vec(any::<bool>(), 0..500)) {
            let config = GameConfig::default();
            let mut controller = DifficultyController::new(&config);
            for won in outcomes {
                let factor = controller.on_round_end(won);
                prop_assert!(factor >= config.difficulty_min);
                prop_assert!(factor <= config.difficulty_max);
            }
        }
    }
}

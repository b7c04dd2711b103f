//! Stake validation.
//!
//! Bad stake input is never an error: non-numeric or too-small values become
//! the minimum bet, oversized values are capped at the maximum bet and then at
//! the available balance. The only rejection is a balance that cannot cover
//! the minimum.

use shadowflight_types::GameConfig;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError, Clone, Copy, PartialEq)]
pub enum BetRejected {
    #[error("bets are only accepted while betting is open")]
    NotBetting,
    #[error("insufficient balance (balance={balance}, min_bet={min_bet})")]
    InsufficientBalance { balance: f64, min_bet: f64 },
}

/// Clamp a requested stake to `[min_bet, min(max_bet, balance)]`.
///
/// The result is below `min_bet` only when the balance is.
pub fn clamp_bet(requested: f64, balance: f64, config: &GameConfig) -> f64 {
    let mut amount = if requested.is_nan() || requested < config.min_bet {
        config.min_bet
    } else {
        requested
    };
    if amount > config.max_bet {
        amount = config.max_bet;
    }
    if amount > balance {
        amount = balance.max(0.0);
    }
    amount
}

/// Parse a stake typed by the player and clamp it.
pub fn parse_bet_input(input: &str, balance: f64, config: &GameConfig) -> f64 {
    let requested = input.trim().parse::<f64>().unwrap_or(f64::NAN);
    clamp_bet(requested, balance, config)
}

/// Add a quick-bet increment to the current stake, capped at the maximum bet.
pub fn quick_bet(current: f64, increment: f64, config: &GameConfig) -> f64 {
    (current + increment).min(config.max_bet)
}

/// Largest stake the balance allows.
pub fn max_bet(balance: f64, config: &GameConfig) -> f64 {
    clamp_bet(config.max_bet, balance, config)
}

/// Validate a stake against the balance, returning the amount to commit.
pub fn validate_stake(requested: f64, balance: f64, config: &GameConfig) -> Result<f64, BetRejected> {
    let amount = clamp_bet(requested, balance, config);
    if amount < config.min_bet || balance < amount {
        return Err(BetRejected::InsufficientBalance {
            balance,
            min_bet: config.min_bet,
        });
    }
    Ok(amount)
}

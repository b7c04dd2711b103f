/// Smallest stake a round accepts
pub const MIN_BET: f64 = 1.0;

/// Largest stake a round accepts
pub const MAX_BET: f64 = 1_000.0;

/// Balance granted to a fresh player
pub const INITIAL_BALANCE: f64 = 1_000.0;

/// Period of the in-flight multiplier tick
pub const GAME_LOOP_INTERVAL_MS: u64 = 50;

/// Seconds between placing a bet and takeoff
pub const COUNTDOWN_SECONDS: u32 = 5;

/// How long the crashed state is shown before betting reopens
pub const POST_ROUND_DELAY_MS: u64 = 3_000;

/// Duration of the screen shake fired on crash
pub const SHAKE_DURATION_MS: u64 = 500;

/// Difficulty factor bounds and step sizes.
pub const DIFFICULTY_INITIAL: f64 = 1.0;
pub const DIFFICULTY_MIN: f64 = 0.7;
pub const DIFFICULTY_MAX: f64 = 1.5;
pub const DIFFICULTY_WIN_INCREASE: f64 = 0.05;
pub const DIFFICULTY_LOSS_DECREASE: f64 = 0.02;

/// Probability that a round is a safe zone
pub const SAFE_ZONE_CHANCE: f64 = 0.08;

/// Multiplier mapped to the top of the flight screen
pub const CRASH_POINT_MAX: f64 = 100.0;

/// Exponent applied to shadow proximity to get the payout drain
pub const DRAIN_EXPONENT: f64 = 2.0;

/// Number of crash multipliers kept in the compact history strip
pub const SIMPLE_HISTORY_CAP: usize = 5;

/// Advertised return-to-player, in percent (advisory, see `rtp` in execution)
pub const THEORETICAL_RTP_PERCENT: f64 = 95.0;

/// Initial shadow gap before difficulty scaling
pub const INITIAL_GAP: f64 = 15.0;

/// Height of the flight screen in plane-position units
pub const FLIGHT_CEILING: f64 = 80.0;

/// Quick-bet increments offered next to the stake input.
pub const QUICK_BET_INCREMENTS: [f64; 3] = [10.0, 50.0, 100.0];

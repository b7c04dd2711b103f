//! Return-to-player analysis.
//!
//! The advertised RTP is a display constant. These functions derive the real
//! figure from the crash table: for a player who always cashes out at
//! `target`, `rtp(target) = target * P(C > target)`.
//!
//! The analytic figures ignore the shadow drain (they price a cash-out at the
//! raw multiplier); [`simulate`] plays rounds through the flight model and
//! reports both the raw and the drained return.

use serde::Serialize;
use shadowflight_types::GameConfig;

use crate::flight::{compute_flight, next_multiplier, FlightParams, RISE_RATE_MAX, RISE_RATE_MIN};
use crate::rng::GameRng;
use crate::sampler::{sample_crash_point, CrashBucket, CRASH_BUCKETS, SAFE_ZONE_BASE, SAFE_ZONE_WIDTH};

/// Probability of each crash bucket at `difficulty`.
///
/// The selection roll is raised to `difficulty`, so bucket `i` is hit with
/// probability `upper_i^(1/d) - upper_{i-1}^(1/d)`.
pub fn bucket_probabilities(difficulty: f64) -> [f64; CRASH_BUCKETS.len()] {
    let mut probabilities = [0.0; CRASH_BUCKETS.len()];
    let mut previous = 0.0;
    for (slot, bucket) in probabilities.iter_mut().zip(CRASH_BUCKETS.iter()) {
        let cumulative = bucket.upper.powf(1.0 / difficulty);
        *slot = cumulative - previous;
        previous = cumulative;
    }
    probabilities
}

fn bucket_survival(bucket: &CrashBucket, target: f64) -> f64 {
    if target < bucket.base {
        return 1.0;
    }
    if bucket.is_fixed() || target >= bucket.ceiling() {
        return 0.0;
    }
    let fraction = (target - bucket.base) / bucket.width;
    1.0 - fraction.powf(1.0 / bucket.exponent)
}

/// `P(C > target)` for a normal round.
pub fn survival(target: f64, difficulty: f64) -> f64 {
    bucket_probabilities(difficulty)
        .iter()
        .zip(CRASH_BUCKETS.iter())
        .map(|(p, bucket)| p * bucket_survival(bucket, target))
        .sum()
}

/// `P(C > target)` for a safe-zone round.
pub fn safe_zone_survival(target: f64) -> f64 {
    if target < SAFE_ZONE_BASE {
        return 1.0;
    }
    if target >= SAFE_ZONE_BASE + SAFE_ZONE_WIDTH {
        return 0.0;
    }
    1.0 - ((target - SAFE_ZONE_BASE) / SAFE_ZONE_WIDTH).sqrt()
}

/// `P(C > target)` across normal and safe-zone rounds.
pub fn blended_survival(target: f64, difficulty: f64, safe_zone_chance: f64) -> f64 {
    (1.0 - safe_zone_chance) * survival(target, difficulty)
        + safe_zone_chance * safe_zone_survival(target)
}

/// Expected return per unit staked when always cashing out at `target`.
pub fn return_to_player(target: f64, difficulty: f64, safe_zone_chance: f64) -> f64 {
    target * blended_survival(target, difficulty, safe_zone_chance)
}

/// Mean crash multiplier.
pub fn expected_crash_point(difficulty: f64, safe_zone_chance: f64) -> f64 {
    let normal: f64 = bucket_probabilities(difficulty)
        .iter()
        .zip(CRASH_BUCKETS.iter())
        .map(|(p, bucket)| p * (bucket.base + bucket.width / (bucket.exponent + 1.0)))
        .sum();
    // u^2 has mean 1/3.
    let safe = SAFE_ZONE_BASE + SAFE_ZONE_WIDTH / 3.0;
    (1.0 - safe_zone_chance) * normal + safe_zone_chance * safe
}

/// RTP at one cash-out target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TargetRtp {
    pub target: f64,
    pub survival: f64,
    pub rtp: f64,
}

impl TargetRtp {
    fn at(target: f64, difficulty: f64, safe_zone_chance: f64) -> Self {
        let survival = blended_survival(target, difficulty, safe_zone_chance);
        Self {
            target,
            survival,
            rtp: target * survival,
        }
    }
}

/// Target in `[1.01, max]` with the highest analytic RTP, scanning in `step` increments.
pub fn best_target(difficulty: f64, safe_zone_chance: f64, max: f64, step: f64) -> TargetRtp {
    let mut best = TargetRtp::at(1.01, difficulty, safe_zone_chance);
    if step <= 0.0 {
        return best;
    }
    let mut target = 1.01 + step;
    while target <= max {
        let candidate = TargetRtp::at(target, difficulty, safe_zone_chance);
        if candidate.rtp > best.rtp {
            best = candidate;
        }
        target += step;
    }
    best
}

/// Analytic RTP summary for one difficulty.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RtpReport {
    pub difficulty: f64,
    pub safe_zone_chance: f64,
    /// Display figure; not derived from the crash table.
    pub advertised_percent: f64,
    pub expected_crash_point: f64,
    pub instant_crash_probability: f64,
    pub targets: Vec<TargetRtp>,
    pub best: TargetRtp,
}

impl RtpReport {
    pub fn new(config: &GameConfig, difficulty: f64, targets: &[f64]) -> Self {
        let chance = config.safe_zone_chance;
        Self {
            difficulty,
            safe_zone_chance: chance,
            advertised_percent: config.advertised_rtp_percent,
            expected_crash_point: expected_crash_point(difficulty, chance),
            instant_crash_probability: (1.0 - chance) * bucket_probabilities(difficulty)[0],
            targets: targets
                .iter()
                .map(|target| TargetRtp::at(*target, difficulty, chance))
                .collect(),
            best: best_target(difficulty, chance, config.crash_point_max, 0.01),
        }
    }
}

/// Monte Carlo estimate of the return for a fixed cash-out target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SimulatedRtp {
    pub rounds: u64,
    pub wins: u64,
    /// Return when paid at the raw multiplier.
    pub raw_rtp: f64,
    /// Return when paid at the drained multiplier, as the engine pays.
    pub effective_rtp: f64,
}

/// Play `rounds` rounds at a fixed `difficulty`, cashing out on the first tick
/// the multiplier reaches `target`.
pub fn simulate(
    rng: &mut GameRng,
    config: &GameConfig,
    difficulty: f64,
    target: f64,
    rounds: u64,
) -> SimulatedRtp {
    let mut raw = 0.0;
    let mut effective = 0.0;
    let mut wins = 0;
    for _ in 0..rounds {
        let is_safe_zone = rng.chance(config.safe_zone_chance);
        let crash_multiplier = sample_crash_point(rng, is_safe_zone, difficulty);
        let rise_rate = rng.uniform(RISE_RATE_MIN, RISE_RATE_MAX);
        let params = FlightParams {
            crash_multiplier,
            is_safe_zone,
            difficulty,
            drain_exponent: config.drain_exponent,
            crash_point_max: config.crash_point_max,
        };

        let mut multiplier: f64 = 1.0;
        loop {
            multiplier = next_multiplier(multiplier, rise_rate);
            if multiplier >= crash_multiplier {
                break;
            }
            if multiplier >= target {
                wins += 1;
                raw += multiplier;
                effective += compute_flight(multiplier, &params).effective_multiplier;
                break;
            }
        }
    }

    let staked = rounds.max(1) as f64;
    SimulatedRtp {
        rounds,
        wins,
        raw_rtp: raw / staked,
        effective_rtp: effective / staked,
    }
}

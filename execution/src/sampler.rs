//! Crash point sampling.
//!
//! A round's crash multiplier is drawn once at takeoff and hidden until the
//! round ends. Normal rounds use a seven-bucket table whose selection roll is
//! skewed by the difficulty factor; safe-zone rounds draw from a fixed range
//! instead.
//!
//! ```text
//! effective_roll = roll ^ difficulty
//!
//!   < 0.03  -> 1.00                    (instant crash)
//!   < 0.58  -> 1.01  + U^2   * 0.48
//!   < 0.78  -> 1.50  + U     * 0.49
//!   < 0.90  -> 2.00  + U^1.5 * 2.99
//!   < 0.96  -> 5.00  + U^2   * 4.99
//!   < 0.99  -> 10.00 + U^2.5 * 39.99
//!   else    -> 50.00 + U^3   * 50.00
//! ```

use crate::rng::GameRng;

/// One row of the crash point table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrashBucket {
    /// Cumulative upper bound on the effective roll.
    pub upper: f64,
    /// Smallest multiplier the bucket produces.
    pub base: f64,
    /// Span of the bucket's output range (zero for a fixed output).
    pub width: f64,
    /// Skew exponent applied to the in-bucket uniform draw.
    pub exponent: f64,
}

impl CrashBucket {
    const fn new(upper: f64, base: f64, width: f64, exponent: f64) -> Self {
        Self {
            upper,
            base,
            width,
            exponent,
        }
    }

    /// Map an in-bucket uniform draw to a multiplier.
    pub fn shape(&self, u: f64) -> f64 {
        self.base + u.powf(self.exponent) * self.width
    }

    /// Whether the bucket always yields `base`.
    pub fn is_fixed(&self) -> bool {
        self.width == 0.0
    }

    /// Largest multiplier the bucket can produce.
    pub fn ceiling(&self) -> f64 {
        self.base + self.width
    }
}

pub const CRASH_BUCKETS: [CrashBucket; 7] = [
    CrashBucket::new(0.03, 1.00, 0.0, 1.0),
    CrashBucket::new(0.58, 1.01, 0.48, 2.0),
    CrashBucket::new(0.78, 1.50, 0.49, 1.0),
    CrashBucket::new(0.90, 2.00, 2.99, 1.5),
    CrashBucket::new(0.96, 5.00, 4.99, 2.0),
    CrashBucket::new(0.99, 10.00, 39.99, 2.5),
    CrashBucket::new(1.00, 50.00, 50.00, 3.0),
];

/// Safe-zone crash points lie in `[SAFE_ZONE_BASE, SAFE_ZONE_BASE + SAFE_ZONE_WIDTH)`.
pub const SAFE_ZONE_BASE: f64 = 2.0;
pub const SAFE_ZONE_WIDTH: f64 = 18.0;

/// Index of the bucket an effective roll falls into.
pub fn bucket_index(effective_roll: f64) -> usize {
    CRASH_BUCKETS
        .iter()
        .position(|bucket| effective_roll < bucket.upper)
        .unwrap_or(CRASH_BUCKETS.len() - 1)
}

/// Index of the bucket whose output range contains `multiplier`.
///
/// Bucket ranges are disjoint, so a sampled multiplier identifies its bucket.
pub fn bucket_for_multiplier(multiplier: f64) -> usize {
    CRASH_BUCKETS
        .iter()
        .rposition(|bucket| multiplier >= bucket.base)
        .unwrap_or(0)
}

/// Draw a crash multiplier.
///
/// Always returns a value `>= 1.00`. Safe-zone rounds ignore `difficulty`.
pub fn sample_crash_point(rng: &mut GameRng, is_safe_zone: bool, difficulty: f64) -> f64 {
    if is_safe_zone {
        let u = rng.unit();
        return SAFE_ZONE_BASE + u * u * SAFE_ZONE_WIDTH;
    }

    let roll = rng.unit();
    let effective_roll = roll.powf(difficulty);
    let bucket = &CRASH_BUCKETS[bucket_index(effective_roll)];
    if bucket.is_fixed() {
        return bucket.base;
    }
    bucket.shape(rng.unit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use shadowflight_types::{DIFFICULTY_MAX, DIFFICULTY_MIN};

    const SAMPLES: usize = 100_000;

    /// Probability of each bucket once the roll is raised to `difficulty`.
    fn expected_bucket_probabilities(difficulty: f64) -> Vec<f64> {
        let mut previous = 0.0;
        CRASH_BUCKETS
            .iter()
            .map(|bucket| {
                let cumulative = bucket.upper.powf(1.0 / difficulty);
                let p = cumulative - previous;
                previous = cumulative;
                p
            })
            .collect()
    }

    #[test]
    fn test_bucket_index_thresholds() {
        assert_eq!(bucket_index(0.0), 0);
        assert_eq!(bucket_index(0.0299), 0);
        assert_eq!(bucket_index(0.03), 1);
        assert_eq!(bucket_index(0.5799), 1);
        assert_eq!(bucket_index(0.58), 2);
        assert_eq!(bucket_index(0.78), 3);
        assert_eq!(bucket_index(0.90), 4);
        assert_eq!(bucket_index(0.96), 5);
        assert_eq!(bucket_index(0.99), 6);
        assert_eq!(bucket_index(0.999_999), 6);
    }

    #[test]
    fn test_bucket_for_multiplier_ranges() {
        assert_eq!(bucket_for_multiplier(1.00), 0);
        assert_eq!(bucket_for_multiplier(1.01), 1);
        assert_eq!(bucket_for_multiplier(1.49), 1);
        assert_eq!(bucket_for_multiplier(1.50), 2);
        assert_eq!(bucket_for_multiplier(4.99), 3);
        assert_eq!(bucket_for_multiplier(5.00), 4);
        assert_eq!(bucket_for_multiplier(49.99), 5);
        assert_eq!(bucket_for_multiplier(100.0), 6);
    }

    #[test]
    fn test_bucket_frequencies_match_thresholds() {
        for difficulty in [DIFFICULTY_MIN, 1.0, DIFFICULTY_MAX] {
            let mut rng = GameRng::from_seed(0xC0FFEE);
            let mut counts = [0usize; CRASH_BUCKETS.len()];
            for _ in 0..SAMPLES {
                let crash = sample_crash_point(&mut rng, false, difficulty);
                assert!(crash >= 1.0);
                counts[bucket_for_multiplier(crash)] += 1;
            }

            let expected = expected_bucket_probabilities(difficulty);
            for (index, (&count, &p)) in counts.iter().zip(expected.iter()).enumerate() {
                let observed = count as f64 / SAMPLES as f64;
                // Five standard deviations of a binomial proportion.
                let tolerance = 5.0 * (p * (1.0 - p) / SAMPLES as f64).sqrt() + 1e-4;
                assert!(
                    (observed - p).abs() < tolerance,
                    "difficulty {difficulty} bucket {index}: observed {observed}, expected {p}"
                );
            }
        }
    }

    #[test]
    fn test_harder_difficulty_crashes_earlier() {
        let mean = |difficulty: f64| {
            let mut rng = GameRng::from_seed(11);
            (0..SAMPLES)
                .map(|_| sample_crash_point(&mut rng, false, difficulty).min(10.0))
                .sum::<f64>()
                / SAMPLES as f64
        };
        assert!(mean(DIFFICULTY_MAX) < mean(1.0));
        assert!(mean(1.0) < mean(DIFFICULTY_MIN));
    }

    #[test]
    fn test_outputs_stay_inside_bucket_ranges() {
        let mut rng = GameRng::from_seed(5);
        for _ in 0..SAMPLES {
            let crash = sample_crash_point(&mut rng, false, 1.0);
            let bucket = &CRASH_BUCKETS[bucket_for_multiplier(crash)];
            assert!(crash >= bucket.base && crash <= bucket.ceiling());
        }
    }

    #[test]
    fn test_same_seed_same_crash_points() {
        let mut a = GameRng::from_seed(99);
        let mut b = GameRng::from_seed(99);
        for _ in 0..1_000 {
            assert_eq!(
                sample_crash_point(&mut a, false, 1.2).to_bits(),
                sample_crash_point(&mut b, false, 1.2).to_bits()
            );
        }
    }

    proptest! {
        #[test]
        fn prop_safe_zone_range(seed in any::<u64>(), difficulty in DIFFICULTY_MIN..=DIFFICULTY_MAX) {
            let mut rng = GameRng::from_seed(seed);
            for _ in 0..64 {
                let crash = sample_crash_point(&mut rng, true, difficulty);
                prop_assert!((2.0..20.0).contains(&crash));
            }
        }

        #[test]
        fn prop_normal_rounds_at_least_one(seed in any::<u64>(), difficulty in DIFFICULTY_MIN..=DIFFICULTY_MAX) {
            let mut rng = GameRng::from_seed(seed);
            for _ in 0..64 {
                let crash = sample_crash_point(&mut rng, false, difficulty);
                prop_assert!((1.0..=100.0).contains(&crash));
            }
        }
    }
}

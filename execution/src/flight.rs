//! Multiplier growth and shadow drain.
//!
//! The multiplier climbs on every tick. The shadow's distance to the plane is
//! a function of how far, on a log scale, the multiplier has travelled towards
//! the hidden crash point; the closer the shadow, the more of the payout it
//! drains.

use shadowflight_types::{FLIGHT_CEILING, INITIAL_GAP};

/// Scale applied to the per-tick growth term.
pub const GROWTH_SCALE: f64 = 0.05;

/// Bounds of the per-round rise rate draw.
pub const RISE_RATE_MIN: f64 = 0.01;
pub const RISE_RATE_MAX: f64 = 0.03;

/// Floor for the crash point used as a log base.
pub const MIN_LOG_CRASH_POINT: f64 = 1.01;

/// Normalized progress past which the warning is raised.
pub const WARNING_THRESHOLD: f64 = 0.95;
pub const SAFE_ZONE_WARNING_THRESHOLD: f64 = 0.99;

/// Gap shape exponents for normal and safe-zone rounds.
pub const GAP_EXPONENT: f64 = 2.0;
pub const SAFE_ZONE_GAP_EXPONENT: f64 = 0.5;

/// Multiplier after one tick.
pub fn next_multiplier(multiplier: f64, rise_rate: f64) -> f64 {
    multiplier + rise_rate * (multiplier.ln() + 1.0) * GROWTH_SCALE
}

/// Round-constant inputs to the drain computation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightParams {
    pub crash_multiplier: f64,
    pub is_safe_zone: bool,
    pub difficulty: f64,
    pub drain_exponent: f64,
    pub crash_point_max: f64,
}

/// Derived per-tick quantities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightDynamics {
    /// Logarithmic fraction of the way to the crash point, in `[0, 1]`.
    pub normalized_progress: f64,
    pub current_gap: f64,
    pub max_gap: f64,
    /// How close the shadow is, in `[0, 1]`.
    pub proximity: f64,
    pub drain_percentage: f64,
    pub effective_multiplier: f64,
    pub is_warning: bool,
    pub plane_y: f64,
    pub shadow_y: f64,
}

/// Compute drain and display positions for a multiplier that has not crashed.
pub fn compute_flight(multiplier: f64, params: &FlightParams) -> FlightDynamics {
    let safe_crash_point = params.crash_multiplier.max(MIN_LOG_CRASH_POINT);
    let normalized_progress = (multiplier.ln() / safe_crash_point.ln()).clamp(0.0, 1.0);

    let gap_exponent = if params.is_safe_zone {
        SAFE_ZONE_GAP_EXPONENT
    } else {
        GAP_EXPONENT
    };
    let gap_factor = (1.0 - normalized_progress).powf(gap_exponent);

    let scaled_gap = INITIAL_GAP / params.difficulty;
    let max_gap = scaled_gap + 1.0;
    let current_gap = gap_factor * scaled_gap + 1.0;

    let proximity = (1.0 - current_gap / max_gap).max(0.0);
    let drain_percentage = proximity.powf(params.drain_exponent);
    let effective_multiplier = multiplier * (1.0 - drain_percentage);

    let warning_threshold = if params.is_safe_zone {
        SAFE_ZONE_WARNING_THRESHOLD
    } else {
        WARNING_THRESHOLD
    };

    let plane_y = multiplier.ln() / params.crash_point_max.ln() * FLIGHT_CEILING;

    FlightDynamics {
        normalized_progress,
        current_gap,
        max_gap,
        proximity,
        drain_percentage,
        effective_multiplier,
        is_warning: normalized_progress > warning_threshold,
        plane_y,
        shadow_y: plane_y - current_gap,
    }
}

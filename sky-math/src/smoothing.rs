//! Exponential smoothing primitives
//!
//! All time dependence is explicit: callers pass the elapsed frame time so
//! results are reproducible without a wall clock.

use crate::angles::{shortest_arc_deg, wrap_degrees};

/// One step of an exponential low-pass filter.
///
/// `alpha` is the fraction of the remaining distance covered this step and is
/// clamped into [0, 1].
pub fn low_pass(current: f64, target: f64, alpha: f64) -> f64 {
    current + (target - current) * alpha.clamp(0.0, 1.0)
}

/// Low-pass step for an angle on the circle, result wrapped into [0, 360).
///
/// The raw difference is mapped into (-180, 180] before it is scaled, so a
/// target just across north pulls the short way round.
pub fn low_pass_angle_deg(current: f64, target: f64, alpha: f64) -> f64 {
    let delta = shortest_arc_deg(current, target);
    wrap_degrees(current + delta * alpha.clamp(0.0, 1.0))
}

/// Frame-rate independent blend factor.
///
/// `rate` is the per-reference-frame fraction; the factor for an arbitrary
/// frame is `1 - (1 - rate)^(dt * reference_hz)`.
///
/// # Arguments
/// * `rate` - Fraction of the gap closed in one reference frame, in [0, 1]
/// * `dt_seconds` - Elapsed time for this frame
/// * `reference_hz` - Frame rate the rate was tuned at (typically 60)
pub fn decay_factor(rate: f64, dt_seconds: f64, reference_hz: f64) -> f64 {
    let rate = rate.clamp(0.0, 1.0);
    let frames = (dt_seconds * reference_hz).max(0.0);
    1.0 - (1.0 - rate).powf(frames)
}

/// Velocity multiplier after `dt_seconds` for friction tuned per reference frame.
///
/// With `dt_seconds == reference_seconds` this is exactly `friction`.
pub fn friction_over(friction: f64, dt_seconds: f64, reference_seconds: f64) -> f64 {
    if reference_seconds <= 0.0 {
        return friction;
    }
    friction.powf((dt_seconds / reference_seconds).max(0.0))
}

/// Number of friction steps before a speed falls strictly below `threshold`.
///
/// Closed form `ceil(ln(threshold / initial) / ln(friction))`; zero when the
/// speed already sits below the threshold. Returns `None` when friction does
/// not decay (`friction >= 1`) or is not positive.
pub fn ticks_until_below(initial: f64, friction: f64, threshold: f64) -> Option<u32> {
    if initial.abs() < threshold {
        return Some(0);
    }
    if !(friction > 0.0 && friction < 1.0) || threshold <= 0.0 {
        return None;
    }
    let steps = (threshold / initial.abs()).ln() / friction.ln();
    Some(steps.ceil().max(0.0) as u32)
}

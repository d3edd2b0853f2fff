//! Angle wrapping and clamping in degrees
//!
//! Azimuths live in [0, 360), signed differences live in (-180, 180].
//! Every function tolerates arbitrarily large inputs.

/// Wrap an angle into [0, 360).
///
/// `rem_euclid` can round a tiny negative input up to exactly 360.0, which is
/// folded back to 0.0 here so the half-open interval holds.
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Wrap an angle into (-180, 180].
pub fn wrap_signed_degrees(angle: f64) -> f64 {
    let wrapped = wrap_degrees(angle);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Signed shortest rotation taking `from` onto `to`, in (-180, 180].
///
/// # Arguments
/// * `from` - Starting angle in degrees
/// * `to` - Target angle in degrees
///
/// # Returns
/// The difference `to - from` mapped onto the short way round the circle
pub fn shortest_arc_deg(from: f64, to: f64) -> f64 {
    wrap_signed_degrees(to - from)
}

/// Clamp an altitude into [-90, 90].
///
/// Non-finite input collapses to the horizon rather than poisoning camera state.
pub fn clamp_altitude(altitude: f64) -> f64 {
    clamp_or(altitude, -90.0, 90.0, 0.0)
}

/// Clamp `value` into `[min, max]`, substituting `fallback` for NaN or infinity.
pub fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_wrap_degrees_range() {
        assert_relative_eq!(wrap_degrees(370.0), 10.0, epsilon = 1e-12);
        assert_relative_eq!(wrap_degrees(-10.0), 350.0, epsilon = 1e-12);
        assert_relative_eq!(wrap_degrees(720.0), 0.0, epsilon = 1e-12);
        assert_eq!(wrap_degrees(-1e-18), 0.0);
    }

    #[test]
    fn test_signed_wrap_keeps_half_turn_positive() {
        assert_relative_eq!(wrap_signed_degrees(180.0), 180.0);
        assert_relative_eq!(wrap_signed_degrees(-180.0), 180.0);
        assert_relative_eq!(wrap_signed_degrees(190.0), -170.0, epsilon = 1e-12);
    }

    #[test]
    fn test_shortest_arc_across_north() {
        assert_relative_eq!(shortest_arc_deg(350.0, 10.0), 20.0, epsilon = 1e-12);
        assert_relative_eq!(shortest_arc_deg(10.0, 350.0), -20.0, epsilon = 1e-12);
        assert_relative_eq!(shortest_arc_deg(0.0, 180.0), 180.0, epsilon = 1e-12);
    }

    #[test]
    fn test_shortest_arc_never_exceeds_half_turn() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let a = rng.gen_range(0.0..360.0);
            let b = rng.gen_range(-720.0..720.0);
            let d = shortest_arc_deg(a, b);
            assert!(d > -180.0 && d <= 180.0, "arc {d} from {a} to {b}");
            assert_relative_eq!(wrap_degrees(a + d), wrap_degrees(b), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_clamp_altitude() {
        assert_eq!(clamp_altitude(95.0), 90.0);
        assert_eq!(clamp_altitude(-120.0), -90.0);
        assert_eq!(clamp_altitude(12.5), 12.5);
        assert_eq!(clamp_altitude(f64::NAN), 0.0);
    }

    #[test]
    fn test_clamp_or_fallback_is_clamped() {
        assert_eq!(clamp_or(f64::INFINITY, 1.0, 120.0, 200.0), 120.0);
        assert_eq!(clamp_or(200.0, 1.0, 120.0, 75.0), 120.0);
    }
}

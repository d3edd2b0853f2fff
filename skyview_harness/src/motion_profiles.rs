//! Synthetic device orientation for driving the sky view in sensor mode
//!
//! Provides static, panning, nodding, circling and handheld-jitter motions
//! that stand in for a phone's orientation sensor.

use std::f64::consts::PI;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skyview::OrientationSample;

/// Trait for synthetic orientation sources
pub trait OrientationMotion: Send + Sync {
    /// Orientation reported by the sensor at time `t`
    fn sample_at(&self, t: Duration) -> OrientationSample;

    /// Get motion description
    fn description(&self) -> &str;
}

/// Device held still
pub struct StaticOrientation {
    azimuth_deg: f64,
    altitude_deg: f64,
}

impl StaticOrientation {
    pub fn new(azimuth_deg: f64, altitude_deg: f64) -> Self {
        Self {
            azimuth_deg,
            altitude_deg,
        }
    }
}

impl OrientationMotion for StaticOrientation {
    fn sample_at(&self, _t: Duration) -> OrientationSample {
        OrientationSample::new(self.azimuth_deg, self.altitude_deg)
    }

    fn description(&self) -> &str {
        "Static (no motion)"
    }
}

/// Constant-rate turn around the horizon
pub struct SlowPan {
    start_azimuth_deg: f64,
    altitude_deg: f64,
    /// Positive turns east
    rate_deg_per_sec: f64,
}

impl SlowPan {
    pub fn new(start_azimuth_deg: f64, altitude_deg: f64, rate_deg_per_sec: f64) -> Self {
        Self {
            start_azimuth_deg,
            altitude_deg,
            rate_deg_per_sec,
        }
    }
}

impl OrientationMotion for SlowPan {
    fn sample_at(&self, t: Duration) -> OrientationSample {
        let azimuth = self.start_azimuth_deg + self.rate_deg_per_sec * t.as_secs_f64();
        // Raw sensors report in [0, 360)
        OrientationSample::new(azimuth.rem_euclid(360.0), self.altitude_deg)
    }

    fn description(&self) -> &str {
        "Slow pan along the horizon"
    }
}

/// Sinusoidal tilt up and down at a fixed heading
pub struct Nodding {
    azimuth_deg: f64,
    base_altitude_deg: f64,
    amplitude_deg: f64,
    period_sec: f64,
}

impl Nodding {
    pub fn new(azimuth_deg: f64, base_altitude_deg: f64, amplitude_deg: f64, period_sec: f64) -> Self {
        Self {
            azimuth_deg,
            base_altitude_deg,
            amplitude_deg,
            period_sec,
        }
    }
}

impl OrientationMotion for Nodding {
    fn sample_at(&self, t: Duration) -> OrientationSample {
        let phase = 2.0 * PI * t.as_secs_f64() / self.period_sec;
        OrientationSample::new(
            self.azimuth_deg,
            self.base_altitude_deg + self.amplitude_deg * phase.sin(),
        )
    }

    fn description(&self) -> &str {
        "Nodding in altitude"
    }
}

/// Pointing traces a circle around a center direction
pub struct CircleSweep {
    center_azimuth_deg: f64,
    center_altitude_deg: f64,
    radius_deg: f64,
    period_sec: f64,
}

impl CircleSweep {
    pub fn new(
        center_azimuth_deg: f64,
        center_altitude_deg: f64,
        radius_deg: f64,
        period_sec: f64,
    ) -> Self {
        Self {
            center_azimuth_deg,
            center_altitude_deg,
            radius_deg,
            period_sec,
        }
    }
}

impl OrientationMotion for CircleSweep {
    fn sample_at(&self, t: Duration) -> OrientationSample {
        let phase = 2.0 * PI * t.as_secs_f64() / self.period_sec;
        let azimuth = self.center_azimuth_deg + self.radius_deg * phase.cos();
        OrientationSample::new(
            azimuth.rem_euclid(360.0),
            self.center_altitude_deg + self.radius_deg * phase.sin(),
        )
    }

    fn description(&self) -> &str {
        "Circular sweep"
    }
}

/// Hand tremor: smooth random wander around a base direction
///
/// Offsets are drawn once from a seeded generator at fixed control times and
/// linearly interpolated, so the same seed always gives the same path.
pub struct HandheldJitter {
    azimuth_deg: f64,
    altitude_deg: f64,
    control_interval_sec: f64,
    /// (azimuth, altitude) offsets in degrees at each control time
    offsets: Vec<(f64, f64)>,
}

impl HandheldJitter {
    pub fn new(
        azimuth_deg: f64,
        altitude_deg: f64,
        max_deviation_deg: f64,
        num_control_points: usize,
        seed: u64,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut offsets = Vec::with_capacity(num_control_points.max(1));
        offsets.push((0.0, 0.0));

        // Random walk with momentum, clamped to the deviation
        for _ in 1..num_control_points {
            let (prev_az, prev_alt) = offsets[offsets.len() - 1];
            let step_az = rng.gen_range(-1.0..1.0) * max_deviation_deg * 0.3;
            let step_alt = rng.gen_range(-1.0..1.0) * max_deviation_deg * 0.3;
            offsets.push((
                (prev_az * 0.7 + step_az).clamp(-max_deviation_deg, max_deviation_deg),
                (prev_alt * 0.7 + step_alt).clamp(-max_deviation_deg, max_deviation_deg),
            ));
        }

        Self {
            azimuth_deg,
            altitude_deg,
            control_interval_sec: 0.25,
            offsets,
        }
    }

    fn offset_at(&self, t_sec: f64) -> (f64, f64) {
        let position = (t_sec / self.control_interval_sec).max(0.0);
        let last = self.offsets.len() - 1;
        let index = (position.floor() as usize).min(last);
        if index == last {
            return self.offsets[last];
        }
        let frac = position - index as f64;
        let (a, b) = (self.offsets[index], self.offsets[index + 1]);
        (a.0 + (b.0 - a.0) * frac, a.1 + (b.1 - a.1) * frac)
    }
}

impl OrientationMotion for HandheldJitter {
    fn sample_at(&self, t: Duration) -> OrientationSample {
        let (d_az, d_alt) = self.offset_at(t.as_secs_f64());
        OrientationSample::new(
            (self.azimuth_deg + d_az).rem_euclid(360.0),
            self.altitude_deg + d_alt,
        )
    }

    fn description(&self) -> &str {
        "Handheld jitter"
    }
}

/// Collection of standard test motions
pub struct TestMotions {
    pub base_azimuth: f64,
    pub base_altitude: f64,
}

impl TestMotions {
    pub fn new(azimuth_deg: f64, altitude_deg: f64) -> Self {
        Self {
            base_azimuth: azimuth_deg,
            base_altitude: altitude_deg,
        }
    }

    /// Names accepted by [`TestMotions::get_motion`]
    pub const NAMES: [&'static str; 5] = ["static", "pan", "nod", "circle", "jitter"];

    /// Get all standard test motions
    pub fn all_motions(&self) -> Vec<Box<dyn OrientationMotion>> {
        Self::NAMES
            .iter()
            .filter_map(|name| self.get_motion(name))
            .collect()
    }

    /// Get motion by name
    pub fn get_motion(&self, name: &str) -> Option<Box<dyn OrientationMotion>> {
        let (az, alt) = (self.base_azimuth, self.base_altitude);
        match name.to_lowercase().as_str() {
            "static" => Some(Box::new(StaticOrientation::new(az, alt))),
            "pan" => Some(Box::new(SlowPan::new(az, alt, 6.0))), // 6 deg/s
            "nod" => Some(Box::new(Nodding::new(az, alt, 10.0, 4.0))),
            "circle" => Some(Box::new(CircleSweep::new(az, alt, 8.0, 6.0))),
            "jitter" => Some(Box::new(HandheldJitter::new(az, alt, 0.5, 240, 42))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_static_orientation() {
        let motion = StaticOrientation::new(100.0, 30.0);
        assert_eq!(
            motion.sample_at(Duration::ZERO),
            motion.sample_at(Duration::from_secs(100))
        );
    }

    #[test]
    fn test_slow_pan_wraps() {
        let motion = SlowPan::new(350.0, 10.0, 5.0);
        let s = motion.sample_at(Duration::from_secs(4));
        assert_relative_eq!(s.azimuth_deg, 10.0, epsilon = 1e-9);
        assert_eq!(s.altitude_deg, 10.0);
    }

    #[test]
    fn test_nodding_period() {
        let motion = Nodding::new(90.0, 30.0, 10.0, 8.0);
        assert_relative_eq!(motion.sample_at(Duration::from_secs(2)).altitude_deg, 40.0, epsilon = 1e-9);
        assert_relative_eq!(motion.sample_at(Duration::from_secs(6)).altitude_deg, 20.0, epsilon = 1e-9);
        assert_relative_eq!(motion.sample_at(Duration::from_secs(8)).altitude_deg, 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_circle_sweep_returns_to_start() {
        let motion = CircleSweep::new(180.0, 45.0, 5.0, 8.0);
        let p0 = motion.sample_at(Duration::ZERO);
        let p_full = motion.sample_at(Duration::from_secs(8));
        assert_relative_eq!(p0.azimuth_deg, p_full.azimuth_deg, epsilon = 1e-9);
        assert_relative_eq!(p0.altitude_deg, p_full.altitude_deg, epsilon = 1e-9);

        let quarter = motion.sample_at(Duration::from_secs(2));
        assert_relative_eq!(quarter.altitude_deg, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_jitter_is_bounded_and_seeded() {
        let a = HandheldJitter::new(0.0, 30.0, 0.5, 40, 42);
        let b = HandheldJitter::new(0.0, 30.0, 0.5, 40, 42);

        let start = a.sample_at(Duration::ZERO);
        assert_eq!(start.azimuth_deg, 0.0);
        assert_eq!(start.altitude_deg, 30.0);

        for i in 0..200 {
            let t = Duration::from_millis(i * 60);
            let s = a.sample_at(t);
            assert_eq!(s, b.sample_at(t));
            let d_az = sky_math::shortest_arc_deg(0.0, s.azimuth_deg);
            assert!(d_az.abs() <= 0.5 + 1e-9);
            assert!((s.altitude_deg - 30.0).abs() <= 0.5 + 1e-9);
        }
    }

    #[test]
    fn test_every_named_motion_exists() {
        let motions = TestMotions::new(0.0, 20.0);
        assert_eq!(motions.all_motions().len(), TestMotions::NAMES.len());
        assert!(motions.get_motion("JITTER").is_some());
        assert!(motions.get_motion("warp").is_none());
    }
}

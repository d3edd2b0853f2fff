//! Equatorial coordinates on the celestial sphere

use std::f64::consts::{FRAC_PI_2, TAU};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A point on the celestial sphere in the equatorial frame
///
/// Angles are stored in radians. Right ascension is kept in [0, 2π),
/// declination in [-π/2, π/2].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equatorial {
    /// Right ascension in radians
    pub ra: f64,
    /// Declination in radians
    pub dec: f64,
}

impl Equatorial {
    /// Create from radians, normalising RA and clamping Dec
    pub fn new(ra: f64, dec: f64) -> Self {
        Self {
            ra: ra.rem_euclid(TAU),
            dec: dec.clamp(-FRAC_PI_2, FRAC_PI_2),
        }
    }

    /// Create from degrees
    pub fn from_degrees(ra_deg: f64, dec_deg: f64) -> Self {
        Self::new(ra_deg.to_radians(), dec_deg.to_radians())
    }

    pub fn ra_degrees(&self) -> f64 {
        self.ra.to_degrees()
    }

    pub fn dec_degrees(&self) -> f64 {
        self.dec.to_degrees()
    }

    /// Unit vector with x toward (0h, 0°), z toward the north celestial pole
    ///
    /// x = cos(dec)cos(ra), y = cos(dec)sin(ra), z = sin(dec)
    pub fn to_unit_vector(&self) -> Vector3<f64> {
        let (sin_ra, cos_ra) = self.ra.sin_cos();
        let (sin_dec, cos_dec) = self.dec.sin_cos();
        Vector3::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec)
    }

    /// Recover coordinates from any non-zero vector
    ///
    /// Returns `None` for a zero or non-finite vector.
    pub fn from_unit_vector(v: &Vector3<f64>) -> Option<Self> {
        let norm = v.norm();
        if !norm.is_finite() || norm < f64::EPSILON {
            return None;
        }
        let u = v / norm;
        Some(Self::new(u.y.atan2(u.x), u.z.clamp(-1.0, 1.0).asin()))
    }

    /// Great-circle separation from `other` in radians
    pub fn angular_distance(&self, other: &Equatorial) -> f64 {
        let a = self.to_unit_vector();
        let b = other.to_unit_vector();
        // atan2 of cross/dot stays accurate for both tiny and near-antipodal separations
        a.cross(&b).norm().atan2(a.dot(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_unit_vector_axes() {
        let v = Equatorial::from_degrees(0.0, 0.0).to_unit_vector();
        assert_relative_eq!(v, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);

        let v = Equatorial::from_degrees(90.0, 0.0).to_unit_vector();
        assert_relative_eq!(v, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);

        let v = Equatorial::from_degrees(123.0, 90.0).to_unit_vector();
        assert_relative_eq!(v, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_normalises_ra_and_clamps_dec() {
        let eq = Equatorial::from_degrees(-30.0, 100.0);
        assert_relative_eq!(eq.ra_degrees(), 330.0, epsilon = 1e-10);
        assert_relative_eq!(eq.dec_degrees(), 90.0, epsilon = 1e-10);
    }

    #[test]
    fn test_unit_vector_recovers_coordinates() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let eq = Equatorial::from_degrees(rng.gen_range(0.0..360.0), rng.gen_range(-89.0..89.0));
            let back = Equatorial::from_unit_vector(&(eq.to_unit_vector() * 3.0)).unwrap();
            assert_relative_eq!(back.ra, eq.ra, epsilon = 1e-9);
            assert_relative_eq!(back.dec, eq.dec, epsilon = 1e-9);
        }
        assert!(Equatorial::from_unit_vector(&Vector3::zeros()).is_none());
    }

    #[test]
    fn test_angular_distance() {
        let a = Equatorial::from_degrees(10.0, 0.0);
        let b = Equatorial::from_degrees(20.0, 0.0);
        assert_relative_eq!(a.angular_distance(&b).to_degrees(), 10.0, epsilon = 1e-9);

        let pole = Equatorial::from_degrees(0.0, 90.0);
        assert_relative_eq!(a.angular_distance(&pole).to_degrees(), 90.0, epsilon = 1e-9);
    }
}

//! Observer location on the Earth's surface

use serde::{Deserialize, Serialize};

/// Geodetic position of the observer
///
/// Latitude is north-positive and clamped to [-90, 90]; longitude is
/// east-positive and wrapped into (-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverLocation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl ObserverLocation {
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        let wrapped = longitude_deg.rem_euclid(360.0);
        let longitude_deg = if wrapped > 180.0 {
            wrapped - 360.0
        } else {
            wrapped
        };
        Self {
            latitude_deg: latitude_deg.clamp(-90.0, 90.0),
            longitude_deg,
        }
    }

    /// Latitude in radians
    pub fn latitude_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }
}

impl Default for ObserverLocation {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalises_inputs() {
        let obs = ObserverLocation::new(95.0, 190.0);
        assert_eq!(obs.latitude_deg, 90.0);
        assert_relative_eq!(obs.longitude_deg, -170.0, epsilon = 1e-12);

        let obs = ObserverLocation::new(-33.9, -180.0);
        assert_relative_eq!(obs.longitude_deg, 180.0, epsilon = 1e-12);
    }
}

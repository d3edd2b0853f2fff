//! Time and sidereal-time calculations.
//!
//! Provides Julian Date, Greenwich Mean Sidereal Time (GMST) and Local
//! Sidereal Time (LST). Everything that needs the rotational phase of the sky
//! goes through [`SiderealClock`] so the star field and the artwork anchored to
//! it can never disagree about where the meridian is.

use time::OffsetDateTime;

use crate::observer::ObserverLocation;

pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const JULIAN_DATE_UNIX_EPOCH: f64 = 2_440_587.5;
pub const JULIAN_DATE_J2000: f64 = 2_451_545.0;
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;
pub const GMST_BASE_DEG: f64 = 280.460_618_37;
pub const GMST_ROTATION_PER_DAY: f64 = 360.985_647_366_29;
pub const GMST_CORRECTION: f64 = 0.000_387_933;
pub const GMST_CUBIC_DIVISOR: f64 = 38_710_000.0;

/// Julian Date for a UTC instant (sub-second precision retained)
pub fn julian_date(timestamp: OffsetDateTime) -> f64 {
    let seconds = timestamp.unix_timestamp_nanos() as f64 / 1e9;
    seconds / SECONDS_PER_DAY + JULIAN_DATE_UNIX_EPOCH
}

/// Greenwich Mean Sidereal Time in degrees, wrapped into [0, 360)
///
/// IAU 1982 expression in terms of days and centuries since J2000.0.
pub fn greenwich_mean_sidereal_time_deg(timestamp: OffsetDateTime) -> f64 {
    let days_since_j2000 = julian_date(timestamp) - JULIAN_DATE_J2000;
    let centuries = days_since_j2000 / DAYS_PER_JULIAN_CENTURY;
    let gmst_degrees = GMST_BASE_DEG
        + GMST_ROTATION_PER_DAY * days_since_j2000
        + GMST_CORRECTION * centuries * centuries
        - centuries * centuries * centuries / GMST_CUBIC_DIVISOR;
    wrap_360(gmst_degrees)
}

/// Local Sidereal Time in degrees for an east-positive longitude
pub fn local_sidereal_time_deg(timestamp: OffsetDateTime, longitude_deg: f64) -> f64 {
    wrap_360(greenwich_mean_sidereal_time_deg(timestamp) + longitude_deg)
}

fn wrap_360(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Sidereal time source for a single observer
///
/// The only place the viewer turns a UTC instant into an LST.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiderealClock {
    observer: ObserverLocation,
}

impl SiderealClock {
    pub fn new(observer: ObserverLocation) -> Self {
        Self { observer }
    }

    pub fn observer(&self) -> &ObserverLocation {
        &self.observer
    }

    /// Local Sidereal Time in degrees at `timestamp`
    pub fn lst_deg(&self, timestamp: OffsetDateTime) -> f64 {
        local_sidereal_time_deg(timestamp, self.observer.longitude_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use time::macros::datetime;

    #[test]
    fn test_julian_date_j2000() {
        let jd = julian_date(datetime!(2000-01-01 12:00 UTC));
        assert_relative_eq!(jd, JULIAN_DATE_J2000, epsilon = 1e-9);
    }

    #[test]
    fn test_julian_date_unix_epoch() {
        assert_relative_eq!(
            julian_date(OffsetDateTime::UNIX_EPOCH),
            JULIAN_DATE_UNIX_EPOCH,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_gmst_at_j2000() {
        let gmst = greenwich_mean_sidereal_time_deg(datetime!(2000-01-01 12:00 UTC));
        assert_relative_eq!(gmst, GMST_BASE_DEG, epsilon = 1e-6);
    }

    #[test]
    fn test_gmst_reference_instant() {
        // 1987 April 10, 19h21m00s UT: GMST = 8h34m57.0896s = 128.7378734°
        let gmst = greenwich_mean_sidereal_time_deg(datetime!(1987-04-10 19:21 UTC));
        assert_relative_eq!(gmst, 128.737_873_4, epsilon = 1e-4);
    }

    #[test]
    fn test_lst_adds_east_longitude() {
        let t = datetime!(2024-03-20 03:00 UTC);
        let gmst = greenwich_mean_sidereal_time_deg(t);
        let lst = local_sidereal_time_deg(t, -75.0);
        assert_relative_eq!(lst, wrap_360(gmst - 75.0), epsilon = 1e-9);
        assert!((0.0..360.0).contains(&lst));
    }

    #[test]
    fn test_sidereal_day_returns_to_same_lst() {
        let clock = SiderealClock::new(ObserverLocation::new(51.5, -0.1));
        let t0 = datetime!(2024-06-01 00:00 UTC);
        // One sidereal day is 86164.0905 s
        let t1 = t0 + time::Duration::seconds_f64(86_164.090_5);
        let a = clock.lst_deg(t0);
        let b = clock.lst_deg(t1);
        let diff = (a - b).abs();
        assert!(diff.min(360.0 - diff) < 1e-3, "lst drifted {a} -> {b}");
    }
}

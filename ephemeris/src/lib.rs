//! Reference frame and ephemeris interfaces for the sky viewer
//!
//! This crate provides the time and coordinate foundations shared by every
//! consumer of sky positions: Julian Dates, Greenwich and Local Sidereal Time,
//! equatorial coordinates, observer locations, and the provider trait through
//! which moving bodies receive updated positions.

use std::collections::HashMap;

use thiserror::Error;
use time::OffsetDateTime;

pub mod coordinates;
pub mod observer;
pub mod time_utils;

pub use coordinates::Equatorial;
pub use observer::ObserverLocation;
pub use time_utils::{
    greenwich_mean_sidereal_time_deg, julian_date, local_sidereal_time_deg, SiderealClock,
};

/// Error types for ephemeris calculations
#[derive(Debug, Error)]
pub enum EphemerisError {
    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(u32),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

pub type Result<T> = std::result::Result<T, EphemerisError>;

/// Source of positions for bodies that move against the stars
///
/// The viewer performs no orbital mechanics itself; planets, moons and the
/// sun get their equatorial position for a timestamp from an implementation
/// of this trait.
pub trait EphemerisProvider {
    /// Get the position of the body with catalog id `body_id` at `time`
    fn position_at(&self, body_id: u32, time: OffsetDateTime) -> Result<Equatorial>;
}

/// A tabulated linear track: a position at an epoch plus a constant drift
#[derive(Debug, Clone, Copy)]
pub struct LinearTrack {
    /// Position at `epoch`
    pub position: Equatorial,
    /// Reference time for `position`
    pub epoch: OffsetDateTime,
    /// Right ascension drift in degrees per day
    pub ra_rate_deg_per_day: f64,
    /// Declination drift in degrees per day
    pub dec_rate_deg_per_day: f64,
}

/// Table-backed ephemeris returning linearly drifting positions
///
/// Good enough for demos and tests where only the plumbing of position
/// updates matters, not their physical accuracy.
#[derive(Debug, Clone, Default)]
pub struct FixedEphemeris {
    tracks: HashMap<u32, LinearTrack>,
}

impl FixedEphemeris {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a body that never moves
    pub fn with_fixed(mut self, body_id: u32, position: Equatorial) -> Self {
        self.tracks.insert(
            body_id,
            LinearTrack {
                position,
                epoch: OffsetDateTime::UNIX_EPOCH,
                ra_rate_deg_per_day: 0.0,
                dec_rate_deg_per_day: 0.0,
            },
        );
        self
    }

    /// Register a body drifting at a constant rate from `track.epoch`
    pub fn with_track(mut self, body_id: u32, track: LinearTrack) -> Self {
        self.tracks.insert(body_id, track);
        self
    }
}

impl EphemerisProvider for FixedEphemeris {
    fn position_at(&self, body_id: u32, time: OffsetDateTime) -> Result<Equatorial> {
        let track = self
            .tracks
            .get(&body_id)
            .ok_or(EphemerisError::ObjectNotFound(body_id))?;

        let days = (time - track.epoch).as_seconds_f64() / time_utils::SECONDS_PER_DAY;
        if !days.is_finite() {
            return Err(EphemerisError::InvalidTime(format!("{time}")));
        }

        let ra_deg = track.position.ra_degrees() + track.ra_rate_deg_per_day * days;
        let dec_deg = track.position.dec_degrees() + track.dec_rate_deg_per_day * days;
        Ok(Equatorial::from_degrees(ra_deg, dec_deg.clamp(-90.0, 90.0)))
    }
}

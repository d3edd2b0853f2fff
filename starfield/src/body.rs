//! Celestial body records and their resolved form

use std::fmt;

use ephemeris::Equatorial;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Stable catalog identifier
///
/// Ordering matters: overlap avoidance always moves the higher id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Harvard spectral class, used for star tint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpectralClass {
    O,
    B,
    A,
    F,
    G,
    K,
    M,
    Unknown,
}

impl SpectralClass {
    /// Parse from the leading letter of a catalog string such as "G2V"
    pub fn parse(s: &str) -> Self {
        match s.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('O') => SpectralClass::O,
            Some('B') => SpectralClass::B,
            Some('A') => SpectralClass::A,
            Some('F') => SpectralClass::F,
            Some('G') => SpectralClass::G,
            Some('K') => SpectralClass::K,
            Some('M') => SpectralClass::M,
            _ => SpectralClass::Unknown,
        }
    }
}

/// Kind of body with per-kind payload, resolved once when the catalog is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Star { spectral_class: SpectralClass },
    Planet,
    Moon { parent: BodyId },
    Sun,
}

impl BodyKind {
    pub fn label(&self) -> &'static str {
        match self {
            BodyKind::Star { .. } => "star",
            BodyKind::Planet => "planet",
            BodyKind::Moon { .. } => "moon",
            BodyKind::Sun => "sun",
        }
    }

    /// Whether the ephemeris provider supplies this body's position
    pub fn is_moving(&self) -> bool {
        !matches!(self, BodyKind::Star { .. })
    }
}

/// Untyped kind tag as it appears in catalog data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Star,
    Planet,
    Moon,
    Sun,
}

/// A catalog entry as supplied by a catalog provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub kind: RecordKind,
    pub ra_deg: f64,
    pub dec_deg: f64,
    pub magnitude: f64,
    #[serde(default)]
    pub spectral_class: Option<String>,
    /// Parent planet id, required for moons
    #[serde(default)]
    pub parent: Option<u32>,
}

/// A resolved catalog body
///
/// Screen position is deliberately absent: it is recomputed from camera state
/// every frame and never stored with the body.
#[derive(Debug, Clone, PartialEq)]
pub struct CelestialBody {
    pub id: BodyId,
    pub name: String,
    pub kind: BodyKind,
    pub position: Equatorial,
    /// Unit vector of `position`, precomputed at build time
    pub unit: Vector3<f64>,
    pub magnitude: f64,
}

impl CelestialBody {
    pub fn new(
        id: BodyId,
        name: impl Into<String>,
        kind: BodyKind,
        position: Equatorial,
        magnitude: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            unit: position.to_unit_vector(),
            position,
            magnitude,
        }
    }

    pub fn star(id: u32, name: &str, ra_deg: f64, dec_deg: f64, magnitude: f64) -> Self {
        Self::new(
            BodyId(id),
            name,
            BodyKind::Star {
                spectral_class: SpectralClass::Unknown,
            },
            Equatorial::from_degrees(ra_deg, dec_deg),
            magnitude,
        )
    }

    pub fn planet(id: u32, name: &str, ra_deg: f64, dec_deg: f64, magnitude: f64) -> Self {
        Self::new(
            BodyId(id),
            name,
            BodyKind::Planet,
            Equatorial::from_degrees(ra_deg, dec_deg),
            magnitude,
        )
    }

    /// Same body at a new sky position
    pub fn moved_to(&self, position: Equatorial) -> Self {
        Self {
            position,
            unit: position.to_unit_vector(),
            ..self.clone()
        }
    }

    pub fn parent(&self) -> Option<BodyId> {
        match self.kind {
            BodyKind::Moon { parent } => Some(parent),
            _ => None,
        }
    }
}

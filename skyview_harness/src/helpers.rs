//! Helper functions for skyview harness sessions
//!
//! Provides a small built-in sky: the brightest stars, the sun, a few
//! planets with moons, a matching ephemeris, and an Orion artwork with its
//! focus region.

use std::sync::Arc;

use ephemeris::{Equatorial, FixedEphemeris, LinearTrack};
use nalgebra::Point2;
use skyview::{AnchorPoint, ArtworkAnchor, FocusRegion};
use starfield::{BodyId, CatalogError, CatalogRecord, CatalogSnapshot, RecordKind, SkyCatalog};
use time::macros::datetime;

pub const SUN: u32 = 1000;
pub const JUPITER: u32 = 1001;
pub const SATURN: u32 = 1002;
pub const MARS: u32 = 1003;
pub const IO: u32 = 1101;
pub const EUROPA: u32 = 1102;
pub const TITAN: u32 = 1201;

pub const BETELGEUSE: u32 = 3;
pub const RIGEL: u32 = 4;
pub const BELLATRIX: u32 = 5;
pub const MINTAKA: u32 = 6;
pub const ALNILAM: u32 = 7;
pub const ALNITAK: u32 = 8;
pub const SAIPH: u32 = 9;

/// (id, name, ra, dec, magnitude, spectral type)
const BRIGHT_STARS: &[(u32, &str, f64, f64, f64, &str)] = &[
    (1, "Sirius", 101.287, -16.716, -1.46, "A1V"),
    (2, "Canopus", 95.988, -52.696, -0.74, "A9II"),
    (BETELGEUSE, "Betelgeuse", 88.793, 7.407, 0.50, "M1Ia"),
    (RIGEL, "Rigel", 78.634, -8.202, 0.13, "B8Ia"),
    (BELLATRIX, "Bellatrix", 81.283, 6.350, 1.64, "B2III"),
    (MINTAKA, "Mintaka", 83.002, -0.299, 2.23, "O9II"),
    (ALNILAM, "Alnilam", 84.053, -1.202, 1.69, "B0Ia"),
    (ALNITAK, "Alnitak", 85.190, -1.943, 1.77, "O9Ib"),
    (SAIPH, "Saiph", 86.939, -9.670, 2.09, "B0Ia"),
    (10, "Vega", 279.234, 38.784, 0.03, "A0V"),
    (11, "Arcturus", 213.915, 19.182, -0.05, "K1III"),
    (12, "Capella", 79.172, 45.998, 0.08, "G3III"),
    (13, "Polaris", 37.955, 89.264, 1.98, "F7Ib"),
    (14, "Aldebaran", 68.980, 16.509, 0.87, "K5III"),
    (15, "Antares", 247.352, -26.432, 1.09, "M1Ib"),
    (16, "Spica", 201.298, -11.161, 0.97, "B1V"),
    (17, "Deneb", 310.358, 45.280, 1.25, "A2Ia"),
    (18, "Altair", 297.696, 8.868, 0.77, "A7V"),
    (19, "Regulus", 152.093, 11.967, 1.40, "B8IV"),
    (20, "Procyon", 114.825, 5.225, 0.34, "F5IV"),
];

/// (id, name, kind, ra, dec, magnitude, parent)
const SOLAR_SYSTEM: &[(u32, &str, RecordKind, f64, f64, f64, Option<u32>)] = &[
    (SUN, "Sun", RecordKind::Sun, 158.0, 9.0, -26.7, None),
    (JUPITER, "Jupiter", RecordKind::Planet, 76.5, 22.1, -2.4, None),
    (SATURN, "Saturn", RecordKind::Planet, 350.2, -6.9, 0.7, None),
    (MARS, "Mars", RecordKind::Planet, 96.0, 24.0, 0.9, None),
    (IO, "Io", RecordKind::Moon, 76.51, 22.1, 5.0, Some(JUPITER)),
    (EUROPA, "Europa", RecordKind::Moon, 76.49, 22.11, 5.3, Some(JUPITER)),
    (TITAN, "Titan", RecordKind::Moon, 350.21, -6.9, 8.4, Some(SATURN)),
];

/// Catalog records for the built-in sky
pub fn bright_sky_records() -> Vec<CatalogRecord> {
    let stars = BRIGHT_STARS
        .iter()
        .map(|&(id, name, ra_deg, dec_deg, magnitude, class)| CatalogRecord {
            id,
            name: name.to_string(),
            kind: RecordKind::Star,
            ra_deg,
            dec_deg,
            magnitude,
            spectral_class: Some(class.to_string()),
            parent: None,
        });
    let solar = SOLAR_SYSTEM
        .iter()
        .map(|&(id, name, kind, ra_deg, dec_deg, magnitude, parent)| CatalogRecord {
            id,
            name: name.to_string(),
            kind,
            ra_deg,
            dec_deg,
            magnitude,
            spectral_class: None,
            parent,
        });
    stars.chain(solar).collect()
}

/// Live catalog holding the built-in sky
pub fn create_bright_sky_catalog() -> Result<Arc<SkyCatalog>, CatalogError> {
    let snapshot = CatalogSnapshot::from_records(&bright_sky_records())?;
    Ok(Arc::new(SkyCatalog::new(snapshot)))
}

/// Ephemeris moving the built-in solar-system bodies at rough daily rates
pub fn create_demo_ephemeris() -> FixedEphemeris {
    let epoch = datetime!(2024-01-01 00:00 UTC);
    let track = |ra: f64, dec: f64, ra_rate: f64, dec_rate: f64| LinearTrack {
        position: Equatorial::from_degrees(ra, dec),
        epoch,
        ra_rate_deg_per_day: ra_rate,
        dec_rate_deg_per_day: dec_rate,
    };
    FixedEphemeris::new()
        .with_track(SUN, track(281.3, -23.0, 0.9856, 0.0))
        .with_track(JUPITER, track(36.0, 13.0, 0.083, 0.02))
        .with_track(SATURN, track(331.0, -12.5, 0.033, 0.01))
        .with_track(MARS, track(268.0, -24.0, 0.52, 0.05))
        .with_track(IO, track(36.01, 13.0, 0.083, 0.02))
        .with_track(EUROPA, track(35.99, 13.01, 0.083, 0.02))
        .with_track(TITAN, track(331.01, -12.5, 0.033, 0.01))
}

/// Right ascension and declination of a built-in star
pub fn star_position(id: u32) -> Option<Equatorial> {
    BRIGHT_STARS
        .iter()
        .find(|s| s.0 == id)
        .map(|s| Equatorial::from_degrees(s.2, s.3))
}

/// Orion figure anchored on its four corner stars, with the belt and body lines
pub fn create_orion_artwork() -> ArtworkAnchor {
    let anchor = |star: u32, x: f64, y: f64| AnchorPoint {
        star: BodyId(star),
        image_px: Point2::new(x, y),
    };
    ArtworkAnchor::new(
        "Orion",
        512.0,
        768.0,
        vec![
            anchor(BETELGEUSE, 120.0, 180.0),
            anchor(BELLATRIX, 390.0, 210.0),
            anchor(SAIPH, 150.0, 640.0),
            anchor(RIGEL, 420.0, 610.0),
        ],
    )
    .with_lines(
        [
            vec![BETELGEUSE, ALNITAK, ALNILAM, MINTAKA, BELLATRIX],
            vec![ALNITAK, SAIPH],
            vec![MINTAKA, RIGEL],
        ]
        .into_iter()
        .map(|line| line.into_iter().map(BodyId).collect())
        .collect(),
    )
}

/// Focus region centered on Orion's main stars
pub fn create_orion_focus() -> Option<FocusRegion> {
    let units: Vec<_> = [BETELGEUSE, RIGEL, BELLATRIX, SAIPH, ALNILAM]
        .into_iter()
        .filter_map(star_position)
        .map(|p| p.to_unit_vector())
        .collect();
    FocusRegion::from_stars("Orion", units.iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use starfield::BodyCatalog;

    #[test]
    fn test_built_in_catalog_is_valid() {
        let catalog = create_bright_sky_catalog().unwrap();
        let snapshot = catalog.snapshot();
        assert_eq!(snapshot.len(), BRIGHT_STARS.len() + SOLAR_SYSTEM.len());
        assert_eq!(snapshot.get(BodyId(IO)).unwrap().parent(), Some(BodyId(JUPITER)));
    }

    #[test]
    fn test_orion_references_known_stars() {
        let art = create_orion_artwork();
        for id in art.star_ids() {
            assert!(star_position(id.0).is_some(), "unknown star {id}");
        }
        assert_eq!(art.anchors().len(), 4);
    }

    #[test]
    fn test_orion_focus_near_belt() {
        let focus = create_orion_focus().unwrap();
        let belt = star_position(ALNILAM).unwrap().to_unit_vector();
        let angle = focus.center().angle(&belt).to_degrees();
        assert!(angle < 5.0);
    }

    #[test]
    fn test_demo_ephemeris_places_every_moving_body() {
        use ephemeris::EphemerisProvider;
        let ephemeris = create_demo_ephemeris();
        let when = datetime!(2024-06-01 00:00 UTC);
        for &(id, ..) in SOLAR_SYSTEM {
            assert!(ephemeris.position_at(id, when).is_ok());
        }
    }
}

//! Catalog snapshots and atomic whole-list replacement
//!
//! A [`CatalogSnapshot`] never changes after it is built. [`SkyCatalog`] holds
//! the current snapshot behind a lock and hands out `Arc` clones, so a frame
//! that started on one snapshot finishes on it even if the list is swapped
//! mid-frame, and nothing keeps a reference into a removed body.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use ephemeris::EphemerisProvider;
use thiserror::Error;
use time::OffsetDateTime;

use crate::body::{BodyId, BodyKind, CatalogRecord, CelestialBody, RecordKind, SpectralClass};
use ephemeris::Equatorial;

/// Errors raised while building a catalog snapshot
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    #[error("duplicate body id {0}")]
    DuplicateId(BodyId),

    #[error("moon {0} has no parent planet")]
    MoonWithoutParent(BodyId),

    #[error("moon {moon} references missing parent {parent}")]
    MissingParent { moon: BodyId, parent: BodyId },

    #[error("moon {moon} references {parent}, which is not a planet")]
    ParentNotPlanet { moon: BodyId, parent: BodyId },

    #[error("body {0} has non-finite coordinates")]
    InvalidCoordinates(BodyId),
}

/// Generic trait for read access to a body catalog
pub trait BodyCatalog {
    /// Get a body by its identifier
    fn get(&self, id: BodyId) -> Option<&CelestialBody>;

    /// Iterate bodies in stable catalog order
    fn bodies(&self) -> impl Iterator<Item = &CelestialBody>;

    /// Get the number of bodies in the catalog
    fn len(&self) -> usize;

    /// Check if the catalog is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Filter bodies based on a predicate
    fn filter<F>(&self, predicate: F) -> Vec<&CelestialBody>
    where
        F: Fn(&CelestialBody) -> bool,
    {
        self.bodies().filter(|b| predicate(b)).collect()
    }
}

/// An immutable, id-indexed list of bodies
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    bodies: Vec<CelestialBody>,
    index: HashMap<BodyId, usize>,
}

impl CatalogSnapshot {
    /// Build a snapshot from resolved bodies, validating ids and moon parents
    pub fn from_bodies(bodies: Vec<CelestialBody>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(bodies.len());
        for (i, body) in bodies.iter().enumerate() {
            if !(body.position.ra.is_finite() && body.position.dec.is_finite()) {
                return Err(CatalogError::InvalidCoordinates(body.id));
            }
            if index.insert(body.id, i).is_some() {
                return Err(CatalogError::DuplicateId(body.id));
            }
        }

        for body in &bodies {
            if let BodyKind::Moon { parent } = body.kind {
                match index.get(&parent).map(|&i| &bodies[i].kind) {
                    Some(BodyKind::Planet) => {}
                    Some(_) => {
                        return Err(CatalogError::ParentNotPlanet {
                            moon: body.id,
                            parent,
                        })
                    }
                    None => {
                        return Err(CatalogError::MissingParent {
                            moon: body.id,
                            parent,
                        })
                    }
                }
            }
        }

        Ok(Self { bodies, index })
    }

    /// Resolve provider records into bodies and build a snapshot
    ///
    /// Kind dispatch happens here, once; frames only ever see [`BodyKind`].
    pub fn from_records(records: &[CatalogRecord]) -> Result<Self, CatalogError> {
        let bodies = records
            .iter()
            .map(resolve_record)
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| log::warn!("Rejected catalog records: {e}"))?;
        Self::from_bodies(bodies).inspect_err(|e| log::warn!("Rejected catalog records: {e}"))
    }

    /// New snapshot with moving bodies repositioned for `time`
    ///
    /// Bodies the provider cannot place keep their previous position.
    pub fn with_positions_at<P: EphemerisProvider + ?Sized>(
        &self,
        provider: &P,
        time: OffsetDateTime,
    ) -> (Self, usize) {
        let mut updated = 0;
        let bodies = self
            .bodies
            .iter()
            .map(|body| {
                if !body.kind.is_moving() {
                    return body.clone();
                }
                match provider.position_at(body.id.0, time) {
                    Ok(position) => {
                        updated += 1;
                        body.moved_to(position)
                    }
                    Err(e) => {
                        log::warn!("Keeping previous position for {} ({}): {e}", body.name, body.id);
                        body.clone()
                    }
                }
            })
            .collect();

        (
            Self {
                bodies,
                index: self.index.clone(),
            },
            updated,
        )
    }

    pub fn as_slice(&self) -> &[CelestialBody] {
        &self.bodies
    }
}

impl BodyCatalog for CatalogSnapshot {
    fn get(&self, id: BodyId) -> Option<&CelestialBody> {
        self.index.get(&id).map(|&i| &self.bodies[i])
    }

    fn bodies(&self) -> impl Iterator<Item = &CelestialBody> {
        self.bodies.iter()
    }

    fn len(&self) -> usize {
        self.bodies.len()
    }
}

fn resolve_record(record: &CatalogRecord) -> Result<CelestialBody, CatalogError> {
    let id = BodyId(record.id);
    if !(record.ra_deg.is_finite() && record.dec_deg.is_finite()) {
        return Err(CatalogError::InvalidCoordinates(id));
    }

    let kind = match record.kind {
        RecordKind::Star => BodyKind::Star {
            spectral_class: record
                .spectral_class
                .as_deref()
                .map(SpectralClass::parse)
                .unwrap_or(SpectralClass::Unknown),
        },
        RecordKind::Planet => BodyKind::Planet,
        RecordKind::Sun => BodyKind::Sun,
        RecordKind::Moon => BodyKind::Moon {
            parent: BodyId(record.parent.ok_or(CatalogError::MoonWithoutParent(id))?),
        },
    };

    Ok(CelestialBody::new(
        id,
        record.name.clone(),
        kind,
        Equatorial::from_degrees(record.ra_deg, record.dec_deg),
        record.magnitude,
    ))
}

/// The live catalog: a swappable pointer to the current snapshot
#[derive(Debug, Default)]
pub struct SkyCatalog {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl SkyCatalog {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot in effect right now
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in a whole new list
    pub fn replace(&self, snapshot: CatalogSnapshot) {
        let count = snapshot.len();
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
        log::info!("Catalog replaced ({count} bodies)");
    }

    /// Reposition moving bodies from `provider` and swap the result in
    ///
    /// The provider is queried with no lock held, so readers never wait on
    /// it. If the list was replaced in the meantime the refresh is dropped
    /// and zero is returned; otherwise the number of bodies whose position
    /// was updated.
    pub fn refresh_positions<P: EphemerisProvider + ?Sized>(
        &self,
        provider: &P,
        time: OffsetDateTime,
    ) -> usize {
        let base = self.snapshot();
        let (next, updated) = base.with_positions_at(provider, time);

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if !Arc::ptr_eq(&*guard, &base) {
            log::debug!("Catalog replaced during ephemeris refresh, discarding it");
            return 0;
        }
        *guard = Arc::new(next);
        log::debug!("Ephemeris refresh moved {updated} bodies");
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ephemeris::FixedEphemeris;
    use std::sync::Barrier;

    fn record(id: u32, kind: RecordKind, parent: Option<u32>) -> CatalogRecord {
        CatalogRecord {
            id,
            name: format!("body-{id}"),
            kind,
            ra_deg: id as f64,
            dec_deg: 0.0,
            magnitude: 1.0,
            spectral_class: Some("K0III".to_string()),
            parent,
        }
    }

    #[test]
    fn test_records_resolve_kinds_once() {
        let snapshot = CatalogSnapshot::from_records(&[
            record(1, RecordKind::Star, None),
            record(2, RecordKind::Planet, None),
            record(3, RecordKind::Moon, Some(2)),
        ])
        .unwrap();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(
            snapshot.get(BodyId(1)).unwrap().kind,
            BodyKind::Star {
                spectral_class: SpectralClass::K
            }
        );
        assert_eq!(snapshot.get(BodyId(3)).unwrap().parent(), Some(BodyId(2)));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = CatalogSnapshot::from_records(&[
            record(1, RecordKind::Star, None),
            record(1, RecordKind::Planet, None),
        ])
        .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateId(BodyId(1)));
    }

    #[test]
    fn test_moon_parent_checks() {
        let err = CatalogSnapshot::from_records(&[record(3, RecordKind::Moon, None)]).unwrap_err();
        assert_eq!(err, CatalogError::MoonWithoutParent(BodyId(3)));

        let err =
            CatalogSnapshot::from_records(&[record(3, RecordKind::Moon, Some(9))]).unwrap_err();
        assert!(matches!(err, CatalogError::MissingParent { .. }));

        let err = CatalogSnapshot::from_records(&[
            record(1, RecordKind::Star, None),
            record(3, RecordKind::Moon, Some(1)),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::ParentNotPlanet { .. }));
    }

    #[test]
    fn test_replace_does_not_disturb_held_snapshots() {
        let catalog = SkyCatalog::new(
            CatalogSnapshot::from_records(&[record(1, RecordKind::Star, None)]).unwrap(),
        );
        let held = catalog.snapshot();

        catalog.replace(CatalogSnapshot::from_records(&[record(2, RecordKind::Planet, None)]).unwrap());

        assert!(held.get(BodyId(1)).is_some());
        assert!(catalog.snapshot().get(BodyId(1)).is_none());
        assert!(catalog.snapshot().get(BodyId(2)).is_some());
    }

    #[test]
    fn test_refresh_moves_only_known_moving_bodies() {
        let catalog = SkyCatalog::new(
            CatalogSnapshot::from_records(&[
                record(1, RecordKind::Star, None),
                record(2, RecordKind::Planet, None),
                record(4, RecordKind::Planet, None),
            ])
            .unwrap(),
        );
        let eph = FixedEphemeris::new()
            .with_fixed(1, Equatorial::from_degrees(200.0, 0.0))
            .with_fixed(2, Equatorial::from_degrees(100.0, 10.0));

        let updated = catalog.refresh_positions(&eph, OffsetDateTime::UNIX_EPOCH);
        let snapshot = catalog.snapshot();

        assert_eq!(updated, 1);
        // Stars ignore the provider even when it knows them
        assert_relative_eq!(snapshot.get(BodyId(1)).unwrap().position.ra_degrees(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(snapshot.get(BodyId(2)).unwrap().position.ra_degrees(), 100.0, epsilon = 1e-9);
        // Unknown to the provider: unchanged
        assert_relative_eq!(snapshot.get(BodyId(4)).unwrap().position.ra_degrees(), 4.0, epsilon = 1e-9);
    }

    /// Blocks inside `position_at` until told to continue
    struct GatedEphemeris {
        entered: Barrier,
        release: Barrier,
    }

    impl EphemerisProvider for GatedEphemeris {
        fn position_at(
            &self,
            _body_id: u32,
            _time: OffsetDateTime,
        ) -> ephemeris::Result<Equatorial> {
            self.entered.wait();
            self.release.wait();
            Ok(Equatorial::from_degrees(50.0, 5.0))
        }
    }

    #[test]
    fn test_readers_not_blocked_by_slow_provider() {
        let catalog = SkyCatalog::new(
            CatalogSnapshot::from_records(&[record(2, RecordKind::Planet, None)]).unwrap(),
        );
        let provider = GatedEphemeris {
            entered: Barrier::new(2),
            release: Barrier::new(2),
        };

        let updated = std::thread::scope(|s| {
            let refresh =
                s.spawn(|| catalog.refresh_positions(&provider, OffsetDateTime::UNIX_EPOCH));
            provider.entered.wait();
            // The provider is mid-call; reading must not wait for it
            let during = catalog.snapshot();
            let before = during.get(BodyId(2)).unwrap().position.ra_degrees();
            assert_relative_eq!(before, 2.0, epsilon = 1e-9);
            provider.release.wait();
            refresh.join().unwrap()
        });

        assert_eq!(updated, 1);
        assert_relative_eq!(
            catalog.snapshot().get(BodyId(2)).unwrap().position.ra_degrees(),
            50.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_refresh_discarded_after_concurrent_replace() {
        let catalog = SkyCatalog::new(
            CatalogSnapshot::from_records(&[record(2, RecordKind::Planet, None)]).unwrap(),
        );
        let provider = GatedEphemeris {
            entered: Barrier::new(2),
            release: Barrier::new(2),
        };

        let updated = std::thread::scope(|s| {
            let refresh =
                s.spawn(|| catalog.refresh_positions(&provider, OffsetDateTime::UNIX_EPOCH));
            provider.entered.wait();
            let star = CatalogSnapshot::from_records(&[record(7, RecordKind::Star, None)]).unwrap();
            catalog.replace(star);
            provider.release.wait();
            refresh.join().unwrap()
        });

        assert_eq!(updated, 0);
        let snapshot = catalog.snapshot();
        assert!(snapshot.get(BodyId(7)).is_some());
        assert!(snapshot.get(BodyId(2)).is_none());
    }
}

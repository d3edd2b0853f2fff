//! Catalog of celestial bodies for the sky viewer
//!
//! Bodies arrive from a catalog provider as loosely typed [`CatalogRecord`]s
//! and are resolved once, at build time, into [`CelestialBody`] values with a
//! closed [`BodyKind`]. Catalogs are immutable snapshots; replacing the list
//! (time travel, tiered loading) swaps the whole snapshot atomically.

pub mod body;
pub mod catalogs;

pub use body::{BodyId, BodyKind, CatalogRecord, CelestialBody, RecordKind, SpectralClass};
pub use catalogs::{BodyCatalog, CatalogError, CatalogSnapshot, SkyCatalog};
pub use ephemeris::Equatorial;

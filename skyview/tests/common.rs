//! Common utilities for skyview integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ephemeris::{ObserverLocation, SiderealClock};
use skyview::{SkyConfig, SkyEvent, SkyView};
use starfield::{CatalogSnapshot, CelestialBody, SkyCatalog};
use time::macros::datetime;
use time::OffsetDateTime;

pub const UTC: OffsetDateTime = datetime!(2024-09-01 03:30 UTC);
pub const WIDTH: f64 = 1000.0;
pub const HEIGHT: f64 = 800.0;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

pub fn equator() -> ObserverLocation {
    ObserverLocation::new(0.0, 0.0)
}

/// Right ascension currently on the meridian for an equatorial observer
pub fn zenith_ra() -> f64 {
    SiderealClock::new(equator()).lst_deg(UTC)
}

/// Engine on the equator, looking straight up, in a fixed-size viewport
pub fn zenith_view(bodies: Vec<CelestialBody>) -> SkyView {
    zenith_view_with(SkyConfig::default(), bodies)
}

pub fn zenith_view_with(config: SkyConfig, bodies: Vec<CelestialBody>) -> SkyView {
    init_logging();
    let snapshot = CatalogSnapshot::from_bodies(bodies).expect("valid test catalog");
    let mut view = SkyView::new(config, Arc::new(SkyCatalog::new(snapshot)), equator())
        .expect("valid default config");
    view.set_viewport(WIDTH, HEIGHT);
    view.look_at(0.0, 90.0);
    view
}

/// Collects every callback event in order
pub fn record_events(view: &SkyView) -> Arc<Mutex<Vec<SkyEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    view.register_callback(move |event| sink.lock().unwrap().push(event.clone()));
    events
}

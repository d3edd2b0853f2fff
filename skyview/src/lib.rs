//! SKYVIEW - interactive sky viewer core
//!
//! Turns a catalog of celestial bodies, an observer, a clock and a stream of
//! sensor and touch input into per-frame screen positions, detail tiers,
//! artwork placements and focus opacities. One tick per rendered frame:
//! drain input, move the camera, compute LST, project everything once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crossbeam_channel::Receiver;
use ephemeris::{EphemerisProvider, Equatorial, ObserverLocation, SiderealClock};
use nalgebra::{Point2, Vector3};
use starfield::{BodyCatalog, BodyId, BodyKind, CatalogRecord, CatalogSnapshot, SkyCatalog};
use time::OffsetDateTime;

pub mod artwork;
pub mod callback;
pub mod config;
pub mod controllers;
pub mod error;
pub mod frame;
pub mod gesture;
pub mod hit_test;
pub mod input;
pub mod lod;
pub mod overlap;
pub mod projector;
pub mod state;

use crate::callback::{CallbackId, SkyCallback};
use crate::controllers::{CameraController, FocusFadeController, InertiaStep};
use crate::gesture::{GestureOutput, GestureTracker};
use crate::hit_test::CrosshairThrottle;
use crate::input::{InputCommand, SkyHandle};
use crate::lod::LodSelector;
use crate::projector::{Projector, ScreenPoint, ViewTransform, Viewport};

// Re-export commonly used types for external use
pub use crate::artwork::{AnchorPoint, ArtworkAnchor, ArtworkOutcome, SkipReason};
pub use crate::callback::SkyEvent;
pub use crate::config::SkyConfig;
pub use crate::controllers::FocusRegion;
pub use crate::error::SkyError;
pub use crate::frame::{ArtworkFrame, FocusFrame, Frame, RenderedBody};
pub use crate::gesture::TouchEvent;
pub use crate::hit_test::Hit;
pub use crate::lod::DetailTier;
pub use crate::state::{CameraMode, CameraState, CameraTelemetry, OrientationSample};

/// Viewport used until the host reports its surface size
const DEFAULT_VIEWPORT: (f64, f64) = (1280.0, 720.0);

/// The sky view engine
///
/// Owns the camera state and is the only writer to it. Input threads talk to
/// it through a [`SkyHandle`]; the render loop calls [`SkyView::tick`].
pub struct SkyView {
    config: SkyConfig,
    catalog: Arc<SkyCatalog>,
    clock: SiderealClock,
    viewport: Viewport,
    camera: CameraController,
    gestures: GestureTracker,
    lod: LodSelector,
    fade: FocusFadeController,
    artworks: Vec<ArtworkAnchor>,
    crosshair: CrosshairThrottle,
    /// Output of the most recent tick
    frame: Frame,
    handle: SkyHandle,
    inbox: Receiver<InputCommand>,
    /// Registered callbacks
    callbacks: Arc<Mutex<HashMap<CallbackId, SkyCallback>>>,
    /// Next callback ID
    next_callback_id: Arc<Mutex<CallbackId>>,
}

impl SkyView {
    /// Create an engine in sensor mode, facing north on the horizon
    ///
    /// # Errors
    /// Returns [`SkyError::InvalidConfig`] if the configuration fails
    /// validation.
    pub fn new(
        config: SkyConfig,
        catalog: Arc<SkyCatalog>,
        observer: ObserverLocation,
    ) -> Result<Self, SkyError> {
        config.validate()?;

        let camera = CameraController::new(config.camera.clone(), CameraMode::Sensor);
        let telemetry = CameraTelemetry::from(camera.state());
        let (handle, inbox) = input::channel(telemetry);

        log::info!(
            "Sky view started at lat {:.3} lon {:.3} with {} bodies",
            observer.latitude_deg,
            observer.longitude_deg,
            catalog.snapshot().len()
        );

        Ok(Self {
            clock: SiderealClock::new(observer),
            viewport: Viewport::new(DEFAULT_VIEWPORT.0, DEFAULT_VIEWPORT.1),
            gestures: GestureTracker::new(&config.camera),
            lod: LodSelector::new(config.scale.clone()),
            fade: FocusFadeController::new(config.fade.clone()),
            artworks: Vec::new(),
            crosshair: CrosshairThrottle::new(config.hit.crosshair_interval()),
            frame: Frame::empty(telemetry),
            handle,
            inbox,
            callbacks: Arc::new(Mutex::new(HashMap::new())),
            next_callback_id: Arc::new(Mutex::new(0)),
            camera,
            catalog,
            config,
        })
    }

    /// Handle for sensor and input threads
    pub fn handle(&self) -> SkyHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> &SkyConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<SkyCatalog> {
        &self.catalog
    }

    pub fn camera(&self) -> &CameraState {
        self.camera.state()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Output of the most recent tick
    pub fn last_frame(&self) -> &Frame {
        &self.frame
    }

    /// Register a callback for sky view events
    pub fn register_callback<F>(&self, callback: F) -> CallbackId
    where
        F: Fn(&SkyEvent) + Send + Sync + 'static,
    {
        let mut callbacks = self.callbacks.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next_id = self
            .next_callback_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let callback_id = *next_id;
        *next_id += 1;

        callbacks.insert(callback_id, Arc::new(callback));
        callback_id
    }

    /// Deregister a callback
    pub fn deregister_callback(&self, callback_id: CallbackId) -> bool {
        let mut callbacks = self.callbacks.lock().unwrap_or_else(PoisonError::into_inner);
        callbacks.remove(&callback_id).is_some()
    }

    /// Get the number of registered callbacks
    pub fn callback_count(&self) -> usize {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Emit an event to all registered callbacks
    fn emit_event(&self, event: &SkyEvent) {
        let callbacks = self.callbacks.lock().unwrap_or_else(PoisonError::into_inner);
        for callback in callbacks.values() {
            callback(event);
        }
    }

    /// Resize the drawable surface; sizes below one pixel are raised to one
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Viewport::new(width, height);
        self.crosshair.invalidate();
    }

    pub fn set_user_scale(&mut self, user_scale: f64) {
        self.lod.set_user_scale(user_scale);
    }

    pub fn add_artwork(&mut self, artwork: ArtworkAnchor) {
        log::debug!("Artwork {} added", artwork.name());
        self.artworks.push(artwork);
    }

    pub fn add_focus_region(&mut self, region: FocusRegion) {
        log::debug!("Focus region {} added", region.name());
        self.fade.add_region(region);
    }

    /// Point the camera directly, e.g. from a search result
    pub fn look_at(&mut self, azimuth_deg: f64, altitude_deg: f64) {
        self.camera.set_orientation(azimuth_deg, altitude_deg);
    }

    pub fn set_fov(&mut self, fov_deg: f64) {
        self.camera.set_fov(fov_deg);
    }

    /// Swap in a new body list
    ///
    /// Returns the number of bodies now in the catalog. On error the previous
    /// list stays in effect.
    pub fn replace_catalog(&mut self, records: &[CatalogRecord]) -> Result<usize, SkyError> {
        let snapshot = CatalogSnapshot::from_records(records)?;
        let bodies = snapshot.len();
        self.catalog.replace(snapshot);
        self.crosshair.invalidate();
        self.emit_event(&SkyEvent::CatalogReplaced { bodies });
        Ok(bodies)
    }

    /// Reposition moving bodies for `utc`; returns how many were updated
    pub fn refresh_ephemeris<P: EphemerisProvider + ?Sized>(
        &mut self,
        provider: &P,
        utc: OffsetDateTime,
    ) -> usize {
        let updated = self.catalog.refresh_positions(provider, utc);
        self.crosshair.invalidate();
        updated
    }

    /// Advance one frame
    ///
    /// # Arguments
    /// * `utc` - Wall-clock instant the frame represents
    /// * `dt` - Time since the previous tick
    pub fn tick(&mut self, utc: OffsetDateTime, dt: Duration) -> &Frame {
        self.drain_input();

        if self.camera.mode() == CameraMode::Sensor {
            if let Some(sample) = self.handle.shared.orientation() {
                self.camera.apply_sensor(&sample, dt);
            }
        }
        if self.camera.step_inertia(dt) == InertiaStep::Stopped {
            self.emit_event(&SkyEvent::InertiaStopped);
        }

        let revision = self.frame.revision + 1;
        let state = self.camera.state().clone();
        let lst_deg = self.clock.lst_deg(utc);
        let transform = ViewTransform::new(
            lst_deg,
            self.clock.observer().latitude_deg,
            state.azimuth_deg,
            state.altitude_deg,
        );
        let projector = Projector::new(self.viewport, state.fov_deg, &self.config.projection);

        let bodies = self.render_bodies(&transform, &projector, state.fov_deg);

        let screen_by_id: HashMap<BodyId, ScreenPoint> =
            bodies.iter().map(|b| (b.id, b.screen)).collect();
        let screen_of = |id: BodyId| screen_by_id.get(&id).copied();
        let artworks = self
            .artworks
            .iter_mut()
            .map(|art| ArtworkFrame {
                name: art.name().to_string(),
                outcome: art.placement(screen_of, &self.config.artwork),
                lines: art.line_paths(screen_of),
            })
            .collect();

        self.fade.update(&transform, dt);
        let focus = self
            .fade
            .regions()
            .iter()
            .map(|r| FocusFrame {
                name: r.name().to_string(),
                opacity: r.opacity(),
            })
            .collect();

        let telemetry = CameraTelemetry::from(&state);
        self.handle.shared.publish_telemetry(telemetry);

        self.frame = Frame {
            revision,
            lst_deg,
            camera: telemetry,
            bodies,
            artworks,
            focus,
        };
        &self.frame
    }

    /// Nearest body to a tapped point in the last frame
    pub fn query_tap(&self, point: Point2<f64>) -> Option<Hit> {
        hit_test::pick(&self.frame.bodies, &point, &self.config.hit)
    }

    /// Body under the viewport center, re-evaluated at most once per interval
    ///
    /// `now` is a monotonic timestamp supplied by the caller.
    pub fn query_crosshair(&mut self, now: Duration) -> Option<Hit> {
        let center = self.viewport.center();
        let bodies = &self.frame.bodies;
        let config = &self.config.hit;
        self.crosshair
            .query(now, || hit_test::pick(bodies, &center, config))
    }

    /// Equatorial coordinates under a screen point, as of the last frame
    ///
    /// Feeds coordinate readouts such as the RA/Dec under the crosshair.
    pub fn sky_position_at(&self, point: Point2<f64>) -> Option<Equatorial> {
        let camera = &self.frame.camera;
        let transform = ViewTransform::new(
            self.frame.lst_deg,
            self.clock.observer().latitude_deg,
            camera.azimuth_deg,
            camera.altitude_deg,
        );
        let projector = Projector::new(self.viewport, camera.fov_deg, &self.config.projection);
        let ray = projector.unproject(&point);
        Equatorial::from_unit_vector(&(transform.rotation().transpose() * ray))
    }

    /// Stop accepting input; pending handle calls become no-ops
    pub fn shutdown(self) {
        drop(self);
    }

    fn drain_input(&mut self) {
        while let Ok(command) = self.inbox.try_recv() {
            match command {
                InputCommand::SetMode(mode) => self.switch_mode(mode),
                InputCommand::Touch(event) => {
                    let output = self.gestures.handle(event);
                    self.apply_gesture(output);
                }
            }
        }
    }

    fn switch_mode(&mut self, mode: CameraMode) {
        let from = self.camera.mode();
        let was_coasting = self.camera.is_coasting();
        let changed = self.camera.set_mode(mode);
        if was_coasting {
            self.emit_event(&SkyEvent::InertiaStopped);
        }
        if changed {
            self.gestures.reset();
            self.emit_event(&SkyEvent::ModeChanged { from, to: mode });
        }
    }

    fn apply_gesture(&mut self, output: GestureOutput) {
        match output {
            GestureOutput::None | GestureOutput::Cancelled => {}
            GestureOutput::Began => {
                if self.camera.cancel_inertia() {
                    self.emit_event(&SkyEvent::InertiaStopped);
                }
            }
            GestureOutput::DragDelta(delta) => self.camera.apply_drag(delta),
            GestureOutput::Zoom(factor) => self.camera.apply_pinch(factor),
            GestureOutput::Tap(point) => {
                let hit = self.query_tap(point);
                self.emit_event(&SkyEvent::TapResolved { point, hit });
            }
            GestureOutput::Released(velocity) => {
                if let Some(velocity) = self.camera.start_inertia(velocity) {
                    self.emit_event(&SkyEvent::InertiaStarted { velocity });
                }
            }
        }
    }

    /// Project every body for this frame
    ///
    /// Non-star bodies are separated before projection. Moons are dropped
    /// entirely while gated out.
    fn render_bodies(
        &self,
        transform: &ViewTransform,
        projector: &Projector,
        fov_deg: f64,
    ) -> Vec<RenderedBody> {
        let snapshot = self.catalog.snapshot();
        let moons_visible = self.lod.moons_visible(fov_deg);
        let drawn = |kind: &BodyKind| moons_visible || !matches!(kind, BodyKind::Moon { .. });

        let mut separated: Vec<(BodyId, Vector3<f64>)> = snapshot
            .bodies()
            .filter(|b| b.kind.is_moving() && drawn(&b.kind))
            .map(|b| (b.id, b.unit))
            .collect();
        let pushes = overlap::separate_overlaps(
            &mut separated,
            self.config.scale.min_separation,
            self.config.scale.push_separation,
        );
        if pushes > 0 {
            log::trace!("Separated {pushes} overlapping bodies");
        }
        let separated: HashMap<BodyId, Vector3<f64>> = separated.into_iter().collect();

        snapshot
            .bodies()
            .filter_map(|body| {
                let choice = self.lod.select(&body.kind, fov_deg)?;
                let position = separated.get(&body.id).unwrap_or(&body.unit);
                Some(RenderedBody {
                    id: body.id,
                    kind: body.kind,
                    screen: projector.project(transform, position),
                    scale: choice.scale,
                    tier: choice.tier,
                })
            })
            .collect()
    }
}

impl Drop for SkyView {
    fn drop(&mut self) {
        self.handle.shared.close();
        log::info!("Sky view shut down");
    }
}

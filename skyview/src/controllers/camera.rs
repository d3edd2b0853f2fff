//! Camera orientation and zoom controller
//!
//! Owns the single [`CameraState`] of the view. Sensor samples are smoothed
//! toward; drags and pinches are applied directly; a released drag may coast
//! under friction. Every mutation leaves azimuth wrapped into [0, 360),
//! altitude in [-90, 90] and FOV within the configured limits.

use std::time::Duration;

use nalgebra::Vector2;
use sky_math::{clamp_altitude, clamp_or, friction_over, low_pass, low_pass_angle_deg, wrap_degrees};

use crate::config::CameraConfig;
use crate::state::{CameraMode, CameraState, MotionPhase, OrientationSample};

/// Sensor smoothing is tuned per frame at this rate
const SMOOTHING_REFERENCE_HZ: f64 = 60.0;

/// Result of one inertia step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InertiaStep {
    /// Nothing was coasting
    Idle,
    /// Still coasting after this step
    Coasting,
    /// Velocity fell below the threshold on this step
    Stopped,
}

/// Controller for the camera state machine
#[derive(Debug, Clone)]
pub struct CameraController {
    config: CameraConfig,
    state: CameraState,
}

impl CameraController {
    /// Create a controller facing north on the horizon at the initial FOV
    pub fn new(config: CameraConfig, mode: CameraMode) -> Self {
        let state = CameraState {
            azimuth_deg: 0.0,
            altitude_deg: 0.0,
            fov_deg: config.initial_fov_deg,
            velocity: Vector2::zeros(),
            mode,
            phase: MotionPhase::Idle,
        };
        Self { config, state }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn mode(&self) -> CameraMode {
        self.state.mode
    }

    pub fn is_coasting(&self) -> bool {
        self.state.phase == MotionPhase::Coasting
    }

    /// Switch mode, cancelling inertia and zeroing velocity in the same step
    ///
    /// Returns true when the mode actually changed.
    pub fn set_mode(&mut self, mode: CameraMode) -> bool {
        self.stop_motion();
        if self.state.mode == mode {
            return false;
        }
        log::info!("Camera mode {:?} -> {:?}", self.state.mode, mode);
        self.state.mode = mode;
        true
    }

    /// Point the camera directly, bypassing smoothing
    pub fn set_orientation(&mut self, azimuth_deg: f64, altitude_deg: f64) {
        self.state.azimuth_deg = wrap_degrees(azimuth_or_current(azimuth_deg, self.state.azimuth_deg));
        self.state.altitude_deg = clamp_altitude(altitude_deg);
    }

    /// Set the field of view, clamped to the configured limits
    pub fn set_fov(&mut self, fov_deg: f64) {
        self.state.fov_deg = clamp_or(
            fov_deg,
            self.config.min_fov_deg,
            self.config.max_fov_deg,
            self.state.fov_deg,
        );
    }

    /// One smoothing step toward a sensor reading
    ///
    /// Ignored outside [`CameraMode::Sensor`]. The blend factor is the
    /// configured per-frame smoothing factor rescaled to `dt`.
    pub fn apply_sensor(&mut self, sample: &OrientationSample, dt: Duration) {
        if self.state.mode != CameraMode::Sensor {
            return;
        }
        if !(sample.azimuth_deg.is_finite() && sample.altitude_deg.is_finite()) {
            log::trace!("Dropping non-finite orientation sample");
            return;
        }
        let alpha = sky_math::decay_factor(
            self.config.smoothing_factor,
            dt.as_secs_f64(),
            SMOOTHING_REFERENCE_HZ,
        );
        self.state.azimuth_deg = low_pass_angle_deg(self.state.azimuth_deg, sample.azimuth_deg, alpha);
        self.state.altitude_deg = clamp_altitude(low_pass(
            self.state.altitude_deg,
            clamp_altitude(sample.altitude_deg),
            alpha,
        ));
    }

    /// Rotate the view by a drag displacement in pixels
    ///
    /// Dragging right turns the view left (azimuth decreases); dragging down
    /// raises it. Ignored outside [`CameraMode::Touch`].
    pub fn apply_drag(&mut self, delta_px: Vector2<f64>) {
        if self.state.mode != CameraMode::Touch {
            return;
        }
        self.rotate_by_pixels(delta_px);
    }

    /// Zoom by a pinch factor: spreading fingers (factor > 1) narrows the FOV
    pub fn apply_pinch(&mut self, factor: f64) {
        if self.state.mode != CameraMode::Touch || !(factor.is_finite() && factor > 0.0) {
            return;
        }
        self.set_fov(self.state.fov_deg / factor);
    }

    /// Begin coasting from a measured release velocity (pixels per second)
    ///
    /// Returns the inertia velocity when coasting started; `None` when the
    /// scaled velocity is below the threshold or the camera is not in touch
    /// mode.
    pub fn start_inertia(&mut self, release_velocity: Vector2<f64>) -> Option<Vector2<f64>> {
        if self.state.mode != CameraMode::Touch {
            return None;
        }
        let velocity = release_velocity * self.config.velocity_scale;
        if !(velocity.x.is_finite() && velocity.y.is_finite())
            || velocity.norm() < self.config.min_velocity_px_per_s
        {
            self.stop_motion();
            return None;
        }
        log::debug!(
            "Inertia started at ({:.1}, {:.1}) px/s",
            velocity.x,
            velocity.y
        );
        self.state.velocity = velocity;
        self.state.phase = MotionPhase::Coasting;
        Some(velocity)
    }

    /// Stop any inertia; returns true if something was coasting
    pub fn cancel_inertia(&mut self) -> bool {
        let was_coasting = self.is_coasting();
        self.stop_motion();
        if was_coasting {
            log::debug!("Inertia preempted");
        }
        was_coasting
    }

    /// Advance inertia by one frame
    ///
    /// Moves by velocity × `dt`, then decays velocity by friction rescaled to
    /// `dt`. Stops once the speed falls below the minimum velocity.
    pub fn step_inertia(&mut self, dt: Duration) -> InertiaStep {
        if self.state.phase != MotionPhase::Coasting {
            return InertiaStep::Idle;
        }
        let dt_s = dt.as_secs_f64();
        self.rotate_by_pixels(self.state.velocity * dt_s);
        self.state.velocity *= friction_over(
            self.config.friction,
            dt_s,
            self.config.friction_reference().as_secs_f64(),
        );

        if self.state.velocity.norm() < self.config.min_velocity_px_per_s {
            self.stop_motion();
            log::debug!("Inertia stopped");
            InertiaStep::Stopped
        } else {
            InertiaStep::Coasting
        }
    }

    fn rotate_by_pixels(&mut self, delta_px: Vector2<f64>) {
        let sensitivity = self.config.touch_sensitivity_deg_per_px;
        let azimuth = self.state.azimuth_deg - delta_px.x * sensitivity;
        let altitude = self.state.altitude_deg + delta_px.y * sensitivity;
        self.set_orientation(azimuth, altitude);
    }

    fn stop_motion(&mut self) {
        self.state.velocity = Vector2::zeros();
        self.state.phase = MotionPhase::Idle;
    }
}

fn azimuth_or_current(azimuth: f64, current: f64) -> f64 {
    if azimuth.is_finite() {
        azimuth
    } else {
        current
    }
}

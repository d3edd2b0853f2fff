use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Where orientation comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraMode {
    /// Device orientation sensor drives the view
    Sensor,
    /// Drag, pinch and inertia drive the view
    Touch,
}

/// Inertial sub-state of the camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionPhase {
    /// No inertia in flight
    Idle,
    /// Decelerating after a drag release
    Coasting,
}

/// Orientation reading from a device sensor, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    pub azimuth_deg: f64,
    pub altitude_deg: f64,
    /// Accepted but unused: the view keeps the horizon level
    pub roll_deg: Option<f64>,
}

impl OrientationSample {
    pub fn new(azimuth_deg: f64, altitude_deg: f64) -> Self {
        Self {
            azimuth_deg,
            altitude_deg,
            roll_deg: None,
        }
    }
}

/// Complete camera state owned by the tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    /// Always in [0, 360)
    pub azimuth_deg: f64,
    /// Always in [-90, 90]
    pub altitude_deg: f64,
    /// Always within the configured FOV limits
    pub fov_deg: f64,
    /// Inertia velocity in screen pixels per second
    pub velocity: Vector2<f64>,
    pub mode: CameraMode,
    pub phase: MotionPhase,
}

/// Read-only snapshot for coordinate readouts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraTelemetry {
    pub azimuth_deg: f64,
    pub altitude_deg: f64,
    pub fov_deg: f64,
    pub mode: CameraMode,
    pub coasting: bool,
}

impl From<&CameraState> for CameraTelemetry {
    fn from(state: &CameraState) -> Self {
        Self {
            azimuth_deg: state.azimuth_deg,
            altitude_deg: state.altitude_deg,
            fov_deg: state.fov_deg,
            mode: state.mode,
            coasting: state.phase == MotionPhase::Coasting,
        }
    }
}

use std::sync::Arc;

use nalgebra::{Point2, Vector2};

use crate::hit_test::Hit;
use crate::state::CameraMode;

/// Events emitted for external callbacks
#[derive(Debug, Clone, PartialEq)]
pub enum SkyEvent {
    /// Camera switched between sensor and touch control
    ModeChanged { from: CameraMode, to: CameraMode },
    /// A tap was classified and resolved against the last frame
    TapResolved {
        point: Point2<f64>,
        hit: Option<Hit>,
    },
    /// A drag release started inertial scrolling
    InertiaStarted {
        /// Pixels per second, after the configured velocity scale
        velocity: Vector2<f64>,
    },
    /// Inertia ran out or was preempted
    InertiaStopped,
    /// The body list was swapped wholesale
    CatalogReplaced { bodies: usize },
}

/// Callback ID for registration/deregistration
pub type CallbackId = u64;

/// Callback function type
pub type SkyCallback = Arc<dyn Fn(&SkyEvent) + Send + Sync>;

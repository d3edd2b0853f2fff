//! Stateful controllers driven once per tick
//!
//! The camera controller owns orientation, zoom and inertia; the fade
//! controller owns the animated opacity of focus regions.

mod camera;
mod fade;

pub use camera::{CameraController, InertiaStep};
pub use fade::{target_opacity, FocusFadeController, FocusRegion};

//! Skyview harness for simulation and demonstration
//!
//! Drives the sky view engine with synthetic sensor motion and scripted
//! gestures, using a small built-in sky, so whole sessions can be run and
//! inspected without a device.

pub mod helpers;
pub mod motion_profiles;
pub mod runner;
pub mod scripts;

pub use helpers::{
    bright_sky_records, create_bright_sky_catalog, create_demo_ephemeris, create_orion_artwork,
    create_orion_focus,
};
pub use motion_profiles::{OrientationMotion, TestMotions};
pub use runner::{run_session, run_session_with_callback, SessionResults};
pub use scripts::GestureScript;

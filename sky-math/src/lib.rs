//! sky-math - Numerical helpers for the interactive sky viewer
//!
//! This crate collects the small pieces of math that the projection and
//! interaction engine leans on every frame:
//!
//! - **Angles** - wrapping, shortest-arc differences and clamping in degrees
//! - **Smoothing** - exponential low-pass filters and frame-rate independent decay
//! - **Matrix** - checked 2x2 inversion, solving and basis construction
//!
//! # Example
//!
//! ```text
//! use sky_math::{shortest_arc_deg, low_pass_angle_deg};
//!
//! // Crossing north never takes the long way round
//! assert_eq!(shortest_arc_deg(350.0, 10.0), 20.0);
//! let next = low_pass_angle_deg(350.0, 10.0, 0.5);
//! assert!((next - 0.0).abs() < 1e-9);
//! ```

pub mod angles;
pub mod matrix2;
pub mod smoothing;

// Re-export commonly used items
pub use angles::{clamp_altitude, clamp_or, shortest_arc_deg, wrap_degrees, wrap_signed_degrees};
pub use matrix2::{
    angle_between_vectors, basis_from_columns, invert_matrix, similarity_matrix, singular_values,
    solve_2x2, DegenerateVectorsError, SingularMatrixError,
};
pub use smoothing::{decay_factor, friction_over, low_pass, low_pass_angle_deg, ticks_until_below};

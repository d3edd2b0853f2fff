//! 2x2 matrix utilities using nalgebra
//!
//! Checked linear algebra for fitting flat artwork onto tracked star
//! positions. Anchor configurations can collapse (collinear anchors, anchors
//! converging near the camera plane), so every operation that would divide by
//! a vanishing quantity reports an error instead.

use nalgebra::{Matrix2, Vector2};
use thiserror::Error;

/// Error when matrix inversion fails due to a singular matrix
#[derive(Error, Debug, Clone, PartialEq)]
#[error("singular matrix: determinant={determinant:.6e}")]
pub struct SingularMatrixError {
    /// The determinant value (zero or near-zero relative to the column norms)
    pub determinant: f64,
}

/// Error when two basis vectors are nearly parallel (degenerate configuration)
#[derive(Error, Debug, Clone, PartialEq)]
#[error("degenerate vectors: angle between them is {angle_degrees:.2}°")]
pub struct DegenerateVectorsError {
    /// The angle between vectors in degrees
    pub angle_degrees: f64,
}

/// Relative threshold for treating a determinant as zero.
///
/// Compared against `det / (|c1| * |c2|)`, i.e. the sine of the angle between
/// the columns, so it is independent of pixel scale.
const RELATIVE_DETERMINANT_EPSILON: f64 = 1e-9;

/// Invert a 2x2 matrix, rejecting singular or nearly singular input
///
/// # Arguments
/// * `matrix` - The 2x2 matrix to invert
///
/// # Returns
/// * `Ok(Matrix2<f64>)` - The inverse matrix
/// * `Err(SingularMatrixError)` - If the columns are (nearly) linearly dependent
pub fn invert_matrix(matrix: &Matrix2<f64>) -> Result<Matrix2<f64>, SingularMatrixError> {
    let det = matrix.determinant();
    let norms = matrix.column(0).norm() * matrix.column(1).norm();

    if !det.is_finite() || norms < f64::EPSILON || (det / norms).abs() < RELATIVE_DETERMINANT_EPSILON
    {
        return Err(SingularMatrixError { determinant: det });
    }

    matrix
        .try_inverse()
        .ok_or(SingularMatrixError { determinant: det })
}

/// Solve `matrix * x = rhs` for `x`
///
/// The artwork solver calls this once per destination axis with the same
/// anchor basis, so a single failing basis rejects both axes consistently.
pub fn solve_2x2(
    matrix: &Matrix2<f64>,
    rhs: &Vector2<f64>,
) -> Result<Vector2<f64>, SingularMatrixError> {
    Ok(invert_matrix(matrix)? * rhs)
}

/// Compute the angle between two 2D vectors in degrees
///
/// # Returns
/// Angle between vectors in degrees (0 to 180); 0 if either vector is zero
pub fn angle_between_vectors(v1: &Vector2<f64>, v2: &Vector2<f64>) -> f64 {
    let mag1 = v1.norm();
    let mag2 = v2.norm();

    if mag1 < f64::EPSILON || mag2 < f64::EPSILON {
        return 0.0;
    }

    let cos_angle = (v1.dot(v2) / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

/// Build a 2x2 basis from two column vectors, rejecting near-parallel columns
///
/// # Arguments
/// * `col1` - First basis vector
/// * `col2` - Second basis vector
/// * `min_angle_degrees` - Minimum separation from 0° and 180° to accept
///
/// # Returns
/// * `Ok(Matrix2<f64>)` - Matrix with col1 and col2 as columns
/// * `Err(DegenerateVectorsError)` - If the vectors are nearly collinear
pub fn basis_from_columns(
    col1: Vector2<f64>,
    col2: Vector2<f64>,
    min_angle_degrees: f64,
) -> Result<Matrix2<f64>, DegenerateVectorsError> {
    let angle = angle_between_vectors(&col1, &col2);
    let valid_angle_range = min_angle_degrees..=(180.0 - min_angle_degrees);

    if !valid_angle_range.contains(&angle) {
        return Err(DegenerateVectorsError {
            angle_degrees: angle,
        });
    }

    Ok(Matrix2::from_columns(&[col1, col2]))
}

/// Rotation by `angle_rad` (counter-clockwise) combined with uniform `scale`
pub fn similarity_matrix(angle_rad: f64, scale: f64) -> Matrix2<f64> {
    let c = angle_rad.cos() * scale;
    let s = angle_rad.sin() * scale;
    Matrix2::new(c, -s, s, c)
}

/// Singular values of a 2x2 matrix, largest first
///
/// These are the principal stretch factors of the linear map, which is what
/// the artwork distortion guard bounds.
pub fn singular_values(matrix: &Matrix2<f64>) -> (f64, f64) {
    let svd = matrix.svd(false, false);
    let a = svd.singular_values[0];
    let b = svd.singular_values[1];
    if a >= b {
        (a, b)
    } else {
        (b, a)
    }
}

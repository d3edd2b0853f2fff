//! Equatorial unit vector to screen pixel projection.
//!
//! Implements the rotation chain from the celestial sphere into the camera
//! frame of a hand-held viewer, followed by a pinhole (gnomonic) projection
//! onto the viewport. The full rotation is built once per frame as a
//! [`ViewTransform`] and shared by every body, the artwork anchors and the
//! focus regions, so nothing on screen can disagree about where the camera
//! points.

use nalgebra::{Matrix3, Point2, Vector3};

use crate::config::ProjectionConfig;

/// Viewport dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    /// Pixel position of the optical axis
    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Projected screen position with visibility
///
/// Always a definite value. When `visible` is false the coordinates are
/// either off-screen or, for points behind the camera, the viewport center,
/// and must not be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub visible: bool,
}

impl ScreenPoint {
    pub fn point(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

/// Rotation from equatorial coordinates into the camera frame.
///
/// # Coordinate System Convention
/// - **Input**: equatorial unit vector, x toward RA 0h, z toward the north
///   celestial pole
/// - **Horizon frame**: east, north, up for an observer at the configured
///   latitude and the given Local Sidereal Time
/// - **Camera frame**: x to screen right, y along the view axis (forward),
///   z to screen up; right-handed
///
/// Azimuth is measured from north through east; altitude upward from the
/// horizon. Roll is fixed at zero so the horizon stays level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    rotation: Matrix3<f64>,
    lst_deg: f64,
}

impl ViewTransform {
    /// Build the full chain for one frame.
    ///
    /// # Arguments
    /// * `lst_deg` - Local Sidereal Time in degrees
    /// * `latitude_deg` - Observer latitude, north positive
    /// * `azimuth_deg` - Camera heading from north through east
    /// * `altitude_deg` - Camera elevation above the horizon
    pub fn new(lst_deg: f64, latitude_deg: f64, azimuth_deg: f64, altitude_deg: f64) -> Self {
        let rotation = Self::camera_from_horizon(azimuth_deg, altitude_deg)
            * Self::horizon_from_equatorial(lst_deg, latitude_deg);
        Self { rotation, lst_deg }
    }

    /// Equatorial to east/north/up.
    ///
    /// Rotating by −LST about the polar axis puts the local meridian in the
    /// x-z plane; tilting by (90° − latitude) about the east axis then brings
    /// the zenith onto the up axis.
    pub fn horizon_from_equatorial(lst_deg: f64, latitude_deg: f64) -> Matrix3<f64> {
        let (sin_l, cos_l) = lst_deg.to_radians().sin_cos();
        let (sin_p, cos_p) = latitude_deg.to_radians().sin_cos();

        #[rustfmt::skip]
        let meridian = Matrix3::new(
             cos_l, sin_l, 0.0,
            -sin_l, cos_l, 0.0,
               0.0,   0.0, 1.0,
        );

        #[rustfmt::skip]
        let zenith = Matrix3::new(
              0.0, 1.0,   0.0,
           -sin_p, 0.0, cos_p,
            cos_p, 0.0, sin_p,
        );

        zenith * meridian
    }

    /// East/north/up to camera right/forward/up.
    pub fn camera_from_horizon(azimuth_deg: f64, altitude_deg: f64) -> Matrix3<f64> {
        let (sin_a, cos_a) = azimuth_deg.to_radians().sin_cos();
        let (sin_h, cos_h) = altitude_deg.to_radians().sin_cos();

        let right = Vector3::new(cos_a, -sin_a, 0.0);
        let forward = Vector3::new(cos_h * sin_a, cos_h * cos_a, sin_h);
        let up = Vector3::new(-sin_h * sin_a, -sin_h * cos_a, cos_h);

        Matrix3::from_rows(&[right.transpose(), forward.transpose(), up.transpose()])
    }

    /// Rotate an equatorial vector into the camera frame
    pub fn to_view(&self, equatorial: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * equatorial
    }

    /// Equatorial unit vector along the view axis
    pub fn view_direction(&self) -> Vector3<f64> {
        self.rotation.transpose() * Vector3::y()
    }

    /// Angle in radians between an equatorial direction and the view axis
    ///
    /// Zero-length input yields π, i.e. as far from view as possible.
    pub fn angle_from_view_axis(&self, equatorial: &Vector3<f64>) -> f64 {
        let view = self.to_view(equatorial);
        let norm = view.norm();
        if norm < f64::EPSILON {
            return std::f64::consts::PI;
        }
        (view.y / norm).clamp(-1.0, 1.0).acos()
    }

    pub fn lst_deg(&self) -> f64 {
        self.lst_deg
    }

    pub fn rotation(&self) -> &Matrix3<f64> {
        &self.rotation
    }
}

/// Pinhole projection of camera-frame vectors onto the viewport.
///
/// Immutable after construction and cheap to rebuild, so the engine creates a
/// fresh one every frame from the current FOV and viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    viewport: Viewport,
    /// Pixels per unit of tangent-plane offset: `width / (2 tan(fov / 2))`
    scale: f64,
    margin_px: f64,
    forward_epsilon: f64,
}

impl Projector {
    /// Create a projector for the current zoom and viewport.
    ///
    /// # Arguments
    /// * `viewport` - Screen size in pixels
    /// * `fov_deg` - Horizontal field of view, already clamped by the camera
    /// * `config` - Margin and behind-camera epsilon
    pub fn new(viewport: Viewport, fov_deg: f64, config: &ProjectionConfig) -> Self {
        let half_fov = (fov_deg.clamp(f64::EPSILON, 179.0) / 2.0).to_radians();
        Self {
            viewport,
            scale: viewport.width / (2.0 * half_fov.tan()),
            margin_px: config.margin_px,
            forward_epsilon: config.forward_epsilon,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Project an equatorial unit vector through `transform`
    pub fn project(&self, transform: &ViewTransform, equatorial: &Vector3<f64>) -> ScreenPoint {
        self.project_view(&transform.to_view(equatorial))
    }

    /// Project a camera-frame vector
    ///
    /// Points at or behind the camera plane are invisible; points in front
    /// are visible while inside the viewport grown by the margin.
    pub fn project_view(&self, view: &Vector3<f64>) -> ScreenPoint {
        let center = self.viewport.center();
        match self.project_unbounded(view) {
            Some(p) => ScreenPoint {
                x: p.x,
                y: p.y,
                visible: self.within_margin(&p),
            },
            None => ScreenPoint {
                x: center.x,
                y: center.y,
                visible: false,
            },
        }
    }

    /// Tangent-plane projection without bounds checking
    ///
    /// Returns `None` only for points at or behind the camera plane. Used by
    /// the artwork mapper, which may extrapolate beyond the screen.
    pub fn project_unbounded(&self, view: &Vector3<f64>) -> Option<Point2<f64>> {
        let forward = view.y;
        if !forward.is_finite() || forward <= self.forward_epsilon {
            return None;
        }
        let center = self.viewport.center();
        Some(Point2::new(
            center.x + (view.x / forward) * self.scale,
            center.y - (view.z / forward) * self.scale,
        ))
    }

    /// Camera-frame unit vector through a screen pixel
    pub fn unproject(&self, point: &Point2<f64>) -> Vector3<f64> {
        let center = self.viewport.center();
        Vector3::new(
            (point.x - center.x) / self.scale,
            1.0,
            (center.y - point.y) / self.scale,
        )
        .normalize()
    }

    fn within_margin(&self, p: &Point2<f64>) -> bool {
        let m = self.margin_px;
        p.x >= -m && p.x <= self.viewport.width + m && p.y >= -m && p.y <= self.viewport.height + m
    }
}

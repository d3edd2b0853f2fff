//! Focus region fading
//!
//! A focus region (typically a constellation) is fully opaque while the view
//! axis is close to its center and fades out as the view turns away. The
//! opacity eases toward its target with frame-rate independent exponential
//! decay, faster on the way in than on the way out.

use std::time::Duration;

use nalgebra::Vector3;
use sky_math::decay_factor;

use crate::config::FadeConfig;
use crate::projector::ViewTransform;

/// A labeled region with a fixed direction on the sky
#[derive(Debug, Clone, PartialEq)]
pub struct FocusRegion {
    name: String,
    /// Equatorial unit vector
    center: Vector3<f64>,
    opacity: f64,
    /// Center in the camera frame as of the last update
    view_center: Option<Vector3<f64>>,
}

impl FocusRegion {
    /// Region centered on `center`; returns `None` for a zero vector
    pub fn new(name: impl Into<String>, center: Vector3<f64>) -> Option<Self> {
        let center = center.try_normalize(f64::EPSILON)?;
        Some(Self {
            name: name.into(),
            center,
            opacity: 0.0,
            view_center: None,
        })
    }

    /// Region centered on the normalized centroid of its anchor stars
    ///
    /// Returns `None` when there are no stars or they cancel out.
    pub fn from_stars<'a>(
        name: impl Into<String>,
        stars: impl IntoIterator<Item = &'a Vector3<f64>>,
    ) -> Option<Self> {
        let sum = stars
            .into_iter()
            .fold(Vector3::zeros(), |acc: Vector3<f64>, v| acc + v);
        Self::new(name, sum)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn center(&self) -> &Vector3<f64> {
        &self.center
    }

    /// Current animated opacity in [0, 1]
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn view_center(&self) -> Option<&Vector3<f64>> {
        self.view_center.as_ref()
    }
}

/// Target opacity for a center already in the camera frame
///
/// Zero behind the camera regardless of angle; otherwise 1 within the full
/// angle, 0 beyond the zero angle and linear in between.
pub fn target_opacity(view_center: &Vector3<f64>, config: &FadeConfig) -> f64 {
    let norm = view_center.norm();
    if view_center.y <= 0.0 || norm < f64::EPSILON {
        return 0.0;
    }
    let angle = (view_center.y / norm).clamp(-1.0, 1.0).acos().to_degrees();

    if angle <= config.full_angle_deg {
        1.0
    } else if angle >= config.zero_angle_deg {
        0.0
    } else {
        1.0 - (angle - config.full_angle_deg) / (config.zero_angle_deg - config.full_angle_deg)
    }
}

/// Drives the opacity of every registered focus region
#[derive(Debug, Clone)]
pub struct FocusFadeController {
    config: FadeConfig,
    regions: Vec<FocusRegion>,
}

impl FocusFadeController {
    pub fn new(config: FadeConfig) -> Self {
        Self {
            config,
            regions: Vec::new(),
        }
    }

    pub fn add_region(&mut self, region: FocusRegion) {
        self.regions.push(region);
    }

    pub fn regions(&self) -> &[FocusRegion] {
        &self.regions
    }

    /// Ease every region toward its target for this frame
    ///
    /// # Arguments
    /// * `transform` - This frame's view transform
    /// * `dt` - Time since the previous frame
    pub fn update(&mut self, transform: &ViewTransform, dt: Duration) {
        let dt_s = dt.as_secs_f64();
        for region in &mut self.regions {
            let view_center = transform.to_view(&region.center);
            let target = target_opacity(&view_center, &self.config);
            let rate = if target > region.opacity {
                self.config.fade_in_rate
            } else {
                self.config.fade_out_rate
            };
            let factor = decay_factor(rate, dt_s, self.config.reference_hz);
            region.opacity = (region.opacity + (target - region.opacity) * factor).clamp(0.0, 1.0);
            region.view_center = Some(view_center);
        }
    }
}

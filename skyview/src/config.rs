//! Engine configuration
//!
//! Every tunable of the sky view lives here with a serde representation so a
//! deployment can ship a JSON file and override only what it needs. Defaults
//! are the values the engine was tuned with on phones at 60 Hz.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SkyError;

/// Camera smoothing, limits and gesture tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Fraction of the gap to a sensor sample closed per 60 Hz frame
    pub smoothing_factor: f64,
    /// Narrowest field of view in degrees
    pub min_fov_deg: f64,
    /// Widest field of view in degrees
    pub max_fov_deg: f64,
    /// Field of view at startup in degrees
    pub initial_fov_deg: f64,
    /// Degrees of rotation per pixel of drag
    pub touch_sensitivity_deg_per_px: f64,
    /// Inertia velocity multiplier per reference frame
    pub friction: f64,
    /// Reference frame length the friction was tuned at (milliseconds)
    pub friction_reference_ms: f64,
    /// Inertia stops once the release velocity falls below this (pixels/second)
    pub min_velocity_px_per_s: f64,
    /// Multiplier from measured release velocity to inertia velocity
    pub velocity_scale: f64,
    /// Only motion samples this recent contribute to the release velocity (milliseconds)
    pub velocity_window_ms: f64,
    /// Longest touch sequence that can still count as a tap (milliseconds)
    pub tap_max_duration_ms: f64,
    /// Largest displacement from touch-down that can still count as a tap (pixels)
    pub tap_max_movement_px: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.15,
            min_fov_deg: 1.0,
            max_fov_deg: 120.0,
            initial_fov_deg: 75.0,
            touch_sensitivity_deg_per_px: 0.15,
            friction: 0.92,
            friction_reference_ms: 16.0,
            min_velocity_px_per_s: 20.0,
            velocity_scale: 0.5,
            velocity_window_ms: 100.0,
            tap_max_duration_ms: 200.0,
            tap_max_movement_px: 10.0,
        }
    }
}

impl CameraConfig {
    pub fn friction_reference(&self) -> Duration {
        Duration::from_secs_f64(self.friction_reference_ms / 1000.0)
    }

    pub fn velocity_window(&self) -> Duration {
        Duration::from_secs_f64(self.velocity_window_ms / 1000.0)
    }

    pub fn tap_max_duration(&self) -> Duration {
        Duration::from_secs_f64(self.tap_max_duration_ms / 1000.0)
    }
}

/// Screen projection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Points this far outside the viewport still count as visible (pixels)
    pub margin_px: f64,
    /// Minimum forward component for a point to be in front of the camera
    pub forward_epsilon: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            margin_px: 50.0,
            forward_epsilon: 1e-6,
        }
    }
}

/// One step of the field-of-view scale curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FovBreakpoint {
    pub fov_deg: f64,
    pub multiplier: f64,
}

impl FovBreakpoint {
    pub const fn new(fov_deg: f64, multiplier: f64) -> Self {
        Self {
            fov_deg,
            multiplier,
        }
    }
}

/// Field-of-view thresholds for the detail tiers of one body kind
///
/// A tier applies once the FOV drops strictly below its threshold. A
/// threshold of zero disables the tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LodThresholds {
    pub billboard_below_fov_deg: f64,
    pub sphere_below_fov_deg: f64,
    pub detailed_below_fov_deg: f64,
}

impl LodThresholds {
    pub const fn new(billboard: f64, sphere: f64, detailed: f64) -> Self {
        Self {
            billboard_below_fov_deg: billboard,
            sphere_below_fov_deg: sphere,
            detailed_below_fov_deg: detailed,
        }
    }
}

/// Visual scale, detail tiers and overlap avoidance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    pub star_base_scale: f64,
    pub planet_base_scale: f64,
    pub sun_base_scale: f64,
    /// User preference multiplier applied to every body
    pub user_scale: f64,
    /// Scale curve, widest FOV first
    pub fov_breakpoints: Vec<FovBreakpoint>,
    /// Gain of the logarithmic term below the narrowest breakpoint
    pub log_gain: f64,
    /// Hard cap on the FOV-driven multiplier
    pub max_fov_scale: f64,
    /// Moons render only below this FOV (degrees)
    pub moon_visible_below_fov_deg: f64,
    /// Moon size relative to its parent planet
    pub moon_multiplier: f64,
    /// Moons read the scale curve at `fov / moon_fov_divisor`
    pub moon_fov_divisor: f64,
    pub star_tiers: LodThresholds,
    pub planet_tiers: LodThresholds,
    pub sun_tiers: LodThresholds,
    /// Non-star bodies closer than this on the unit sphere get pushed apart
    pub min_separation: f64,
    /// Distance the higher-id body is placed at after a push
    pub push_separation: f64,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            star_base_scale: 1.0,
            planet_base_scale: 1.6,
            sun_base_scale: 2.4,
            user_scale: 1.0,
            fov_breakpoints: vec![
                FovBreakpoint::new(75.0, 1.0),
                FovBreakpoint::new(40.0, 1.25),
                FovBreakpoint::new(15.0, 1.75),
                FovBreakpoint::new(5.0, 2.5),
            ],
            log_gain: 0.35,
            max_fov_scale: 4.0,
            moon_visible_below_fov_deg: 10.0,
            moon_multiplier: 0.35,
            moon_fov_divisor: 2.0,
            star_tiers: LodThresholds::new(30.0, 0.0, 0.0),
            planet_tiers: LodThresholds::new(90.0, 30.0, 5.0),
            sun_tiers: LodThresholds::new(180.0, 20.0, 2.0),
            min_separation: 0.08,
            push_separation: 0.10,
        }
    }
}

/// Hit-test radii and crosshair throttle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitConfig {
    pub star_radius_px: f64,
    /// Used for planets, moons and the sun
    pub planet_radius_px: f64,
    /// Minimum time between crosshair evaluations (milliseconds)
    pub crosshair_interval_ms: f64,
}

impl Default for HitConfig {
    fn default() -> Self {
        Self {
            star_radius_px: 30.0,
            planet_radius_px: 50.0,
            crosshair_interval_ms: 100.0,
        }
    }
}

impl HitConfig {
    pub fn crosshair_interval(&self) -> Duration {
        Duration::from_secs_f64(self.crosshair_interval_ms / 1000.0)
    }
}

/// Focus region fade ramp and rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeConfig {
    /// Full opacity within this angle of the view axis (degrees)
    pub full_angle_deg: f64,
    /// Zero opacity beyond this angle (degrees)
    pub zero_angle_deg: f64,
    /// Per-reference-frame rate when opacity rises
    pub fade_in_rate: f64,
    /// Per-reference-frame rate when opacity falls
    pub fade_out_rate: f64,
    pub reference_hz: f64,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            full_angle_deg: 20.0,
            zero_angle_deg: 45.0,
            fade_in_rate: 0.12,
            fade_out_rate: 0.05,
            reference_hz: 60.0,
        }
    }
}

/// Artwork solver limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtworkConfig {
    /// Anchor basis vectors closer than this to parallel are degenerate (degrees)
    pub min_anchor_angle_deg: f64,
    /// Smallest accepted stretch of the image-to-screen map
    pub min_scale: f64,
    /// Largest accepted stretch of the image-to-screen map
    pub max_scale: f64,
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            min_anchor_angle_deg: 2.0,
            min_scale: 0.02,
            max_scale: 8.0,
        }
    }
}

/// Configuration for the sky view engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyConfig {
    pub camera: CameraConfig,
    pub projection: ProjectionConfig,
    pub scale: ScaleConfig,
    pub hit: HitConfig,
    pub fade: FadeConfig,
    pub artwork: ArtworkConfig,
}

impl SkyConfig {
    /// Load and validate a JSON configuration file
    ///
    /// Missing sections and fields fall back to their defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SkyError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&text)?;
        log::info!("Loaded sky configuration from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SkyError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section, naming the first offending field
    pub fn validate(&self) -> Result<(), SkyError> {
        self.validate_camera()?;
        self.validate_projection()?;
        self.validate_scale()?;
        self.validate_hit()?;
        self.validate_fade()?;
        self.validate_artwork()
    }

    fn validate_camera(&self) -> Result<(), SkyError> {
        let c = &self.camera;
        ensure(
            c.smoothing_factor > 0.0 && c.smoothing_factor <= 1.0,
            "camera.smoothing_factor must be in (0, 1]",
        )?;
        ensure(
            c.min_fov_deg > 0.0 && c.min_fov_deg < c.max_fov_deg && c.max_fov_deg < 180.0,
            "camera.min_fov_deg/max_fov_deg must satisfy 0 < min < max < 180",
        )?;
        ensure(
            (c.min_fov_deg..=c.max_fov_deg).contains(&c.initial_fov_deg),
            "camera.initial_fov_deg must lie within the FOV limits",
        )?;
        ensure(
            c.touch_sensitivity_deg_per_px > 0.0,
            "camera.touch_sensitivity_deg_per_px must be positive",
        )?;
        ensure(
            c.friction > 0.0 && c.friction < 1.0,
            "camera.friction must be in (0, 1)",
        )?;
        ensure(
            c.friction_reference_ms > 0.0,
            "camera.friction_reference_ms must be positive",
        )?;
        ensure(
            c.min_velocity_px_per_s > 0.0,
            "camera.min_velocity_px_per_s must be positive",
        )?;
        ensure(
            c.velocity_scale >= 0.0,
            "camera.velocity_scale must not be negative",
        )?;
        ensure(
            c.velocity_window_ms > 0.0,
            "camera.velocity_window_ms must be positive",
        )?;
        ensure(
            c.tap_max_duration_ms >= 0.0 && c.tap_max_movement_px >= 0.0,
            "camera tap limits must not be negative",
        )
    }

    fn validate_projection(&self) -> Result<(), SkyError> {
        ensure(
            self.projection.margin_px >= 0.0,
            "projection.margin_px must not be negative",
        )?;
        ensure(
            self.projection.forward_epsilon >= 0.0,
            "projection.forward_epsilon must not be negative",
        )
    }

    fn validate_scale(&self) -> Result<(), SkyError> {
        let s = &self.scale;
        ensure(
            s.star_base_scale > 0.0 && s.planet_base_scale > 0.0 && s.sun_base_scale > 0.0,
            "scale base scales must be positive",
        )?;
        ensure(s.user_scale > 0.0, "scale.user_scale must be positive")?;
        ensure(
            !s.fov_breakpoints.is_empty(),
            "scale.fov_breakpoints must not be empty",
        )?;
        ensure(s.max_fov_scale > 0.0, "scale.max_fov_scale must be positive")?;
        for pair in s.fov_breakpoints.windows(2) {
            ensure(
                pair[1].fov_deg < pair[0].fov_deg,
                "scale.fov_breakpoints must be ordered widest FOV first",
            )?;
            ensure(
                pair[1].multiplier >= pair[0].multiplier,
                "scale.fov_breakpoints multipliers must not decrease as FOV narrows",
            )?;
        }
        for bp in &s.fov_breakpoints {
            ensure(
                bp.fov_deg > 0.0 && bp.multiplier > 0.0,
                "scale.fov_breakpoints entries must be positive",
            )?;
            ensure(
                bp.multiplier <= s.max_fov_scale,
                "scale.fov_breakpoints multipliers must not exceed scale.max_fov_scale",
            )?;
        }
        ensure(s.log_gain >= 0.0, "scale.log_gain must not be negative")?;
        ensure(
            s.moon_multiplier > 0.0 && s.moon_fov_divisor >= 1.0,
            "scale.moon_multiplier must be positive and scale.moon_fov_divisor at least 1",
        )?;
        for (name, tiers) in [
            ("scale.star_tiers", &s.star_tiers),
            ("scale.planet_tiers", &s.planet_tiers),
            ("scale.sun_tiers", &s.sun_tiers),
        ] {
            if !(tiers.billboard_below_fov_deg >= tiers.sphere_below_fov_deg
                && tiers.sphere_below_fov_deg >= tiers.detailed_below_fov_deg
                && tiers.detailed_below_fov_deg >= 0.0)
            {
                return Err(SkyError::InvalidConfig(format!(
                    "{name} thresholds must not increase from billboard to detailed"
                )));
            }
        }
        ensure(
            s.min_separation >= 0.0 && s.push_separation >= s.min_separation,
            "scale.push_separation must be at least scale.min_separation",
        )
    }

    fn validate_hit(&self) -> Result<(), SkyError> {
        ensure(
            self.hit.star_radius_px >= 0.0 && self.hit.planet_radius_px >= 0.0,
            "hit radii must not be negative",
        )?;
        ensure(
            self.hit.crosshair_interval_ms >= 0.0,
            "hit.crosshair_interval_ms must not be negative",
        )
    }

    fn validate_fade(&self) -> Result<(), SkyError> {
        let f = &self.fade;
        ensure(
            f.full_angle_deg >= 0.0 && f.zero_angle_deg > f.full_angle_deg,
            "fade.zero_angle_deg must exceed fade.full_angle_deg",
        )?;
        ensure(
            f.fade_in_rate > 0.0 && f.fade_in_rate <= 1.0,
            "fade.fade_in_rate must be in (0, 1]",
        )?;
        ensure(
            f.fade_out_rate > 0.0 && f.fade_out_rate <= 1.0,
            "fade.fade_out_rate must be in (0, 1]",
        )?;
        ensure(f.reference_hz > 0.0, "fade.reference_hz must be positive")
    }

    fn validate_artwork(&self) -> Result<(), SkyError> {
        let a = &self.artwork;
        ensure(
            (0.0..90.0).contains(&a.min_anchor_angle_deg),
            "artwork.min_anchor_angle_deg must be in [0, 90)",
        )?;
        ensure(
            a.min_scale > 0.0 && a.max_scale > a.min_scale,
            "artwork.max_scale must exceed artwork.min_scale > 0",
        )
    }
}

fn ensure(condition: bool, message: &str) -> Result<(), SkyError> {
    if condition {
        Ok(())
    } else {
        Err(SkyError::InvalidConfig(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        SkyConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            SkyConfig::from_json_str(r#"{"camera": {"max_fov_deg": 100.0}, "hit": {}}"#).unwrap();
        assert_eq!(config.camera.max_fov_deg, 100.0);
        assert_eq!(config.camera.min_fov_deg, 1.0);
        assert_eq!(config.hit, HitConfig::default());
    }

    #[test]
    fn test_non_monotonic_breakpoints_rejected() {
        let mut config = SkyConfig::default();
        config.scale.fov_breakpoints = vec![
            FovBreakpoint::new(60.0, 1.0),
            FovBreakpoint::new(20.0, 2.0),
            FovBreakpoint::new(10.0, 1.5),
        ];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must not decrease"), "{err}");
    }

    #[test]
    fn test_uncapped_breakpoint_rejected() {
        let mut config = SkyConfig::default();
        config.scale.max_fov_scale = 2.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_fov_scale"), "{err}");
    }

    #[test]
    fn test_inverted_fade_ramp_rejected() {
        let mut config = SkyConfig::default();
        config.fade.zero_angle_deg = config.fade.full_angle_deg;
        assert!(matches!(
            config.validate(),
            Err(SkyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            SkyConfig::from_json_str("{not json"),
            Err(SkyError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            SkyConfig::load_from_file("/definitely/not/here.json"),
            Err(SkyError::ConfigIo(_))
        ));
    }

    #[test]
    fn test_serde_roundtrip_preserves_config() {
        let mut config = SkyConfig::default();
        config.scale.user_scale = 1.5;
        let json = serde_json::to_string(&config).unwrap();
        let back = SkyConfig::from_json_str(&json).unwrap();
        assert_eq!(back, config);
    }
}

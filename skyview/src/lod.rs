//! Level-of-detail tiers and visual scale
//!
//! Everything here is a pure function of the current field of view and the
//! body kind. Tiers switch discretely at configured thresholds; the scale is
//! continuous in FOV so zooming never makes a body pop.

use serde::{Deserialize, Serialize};
use starfield::BodyKind;

use crate::config::{LodThresholds, ScaleConfig};

/// Smallest FOV fed to the logarithmic term
const MIN_LOG_FOV_DEG: f64 = 1e-9;

/// Render detail, coarsest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DetailTier {
    Point,
    Billboard,
    Sphere,
    Detailed,
}

/// Tier and scale chosen for one body this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodChoice {
    pub tier: DetailTier,
    pub scale: f64,
}

/// Per-kind tier and scale selection
#[derive(Debug, Clone)]
pub struct LodSelector {
    config: ScaleConfig,
}

impl LodSelector {
    pub fn new(config: ScaleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScaleConfig {
        &self.config
    }

    /// Change the user scale preference; non-positive values are ignored
    pub fn set_user_scale(&mut self, user_scale: f64) {
        if user_scale.is_finite() && user_scale > 0.0 {
            self.config.user_scale = user_scale;
        }
    }

    /// FOV-driven size multiplier
    ///
    /// Constant at the widest breakpoint and above, linear between
    /// breakpoints, then grows logarithmically below the narrowest one. The
    /// result never exceeds `max_fov_scale`.
    pub fn fov_scale(&self, fov_deg: f64) -> f64 {
        let cap = self.config.max_fov_scale;
        let breakpoints = &self.config.fov_breakpoints;
        let (Some(widest), Some(narrowest)) = (breakpoints.first(), breakpoints.last()) else {
            return 1.0_f64.min(cap);
        };

        if fov_deg >= widest.fov_deg {
            return widest.multiplier.min(cap);
        }

        for pair in breakpoints.windows(2) {
            let (wide, narrow) = (pair[0], pair[1]);
            if fov_deg >= narrow.fov_deg {
                let t = (wide.fov_deg - fov_deg) / (wide.fov_deg - narrow.fov_deg);
                return (wide.multiplier + t * (narrow.multiplier - wide.multiplier)).min(cap);
            }
        }

        let ratio = narrowest.fov_deg / fov_deg.max(MIN_LOG_FOV_DEG);
        (narrowest.multiplier * (1.0 + self.config.log_gain * ratio.ln())).min(cap)
    }

    /// Scale curve read at a narrower effective FOV, so moons grow faster
    pub fn moon_fov_scale(&self, fov_deg: f64) -> f64 {
        self.fov_scale(fov_deg / self.config.moon_fov_divisor)
    }

    /// Detail tier for a body kind at this FOV
    pub fn tier(&self, kind: &BodyKind, fov_deg: f64) -> DetailTier {
        tier_for(self.thresholds(kind), fov_deg)
    }

    /// Whether moons are drawn at this FOV
    pub fn moons_visible(&self, fov_deg: f64) -> bool {
        fov_deg < self.config.moon_visible_below_fov_deg
    }

    /// Tier and scale for a body, `None` for a moon that is gated out
    pub fn select(&self, kind: &BodyKind, fov_deg: f64) -> Option<LodChoice> {
        let tier = self.tier(kind, fov_deg);
        let scale = match kind {
            BodyKind::Moon { .. } => {
                if !self.moons_visible(fov_deg) {
                    return None;
                }
                self.planet_scale(fov_deg)
                    * self.config.moon_multiplier
                    * self.moon_fov_scale(fov_deg)
            }
            BodyKind::Star { .. } => {
                self.config.star_base_scale * self.config.user_scale * self.fov_scale(fov_deg)
            }
            BodyKind::Planet => self.planet_scale(fov_deg),
            BodyKind::Sun => {
                self.config.sun_base_scale * self.config.user_scale * self.fov_scale(fov_deg)
            }
        };
        Some(LodChoice { tier, scale })
    }

    fn planet_scale(&self, fov_deg: f64) -> f64 {
        self.config.planet_base_scale * self.config.user_scale * self.fov_scale(fov_deg)
    }

    fn thresholds(&self, kind: &BodyKind) -> &LodThresholds {
        match kind {
            BodyKind::Star { .. } => &self.config.star_tiers,
            BodyKind::Planet | BodyKind::Moon { .. } => &self.config.planet_tiers,
            BodyKind::Sun => &self.config.sun_tiers,
        }
    }
}

fn tier_for(thresholds: &LodThresholds, fov_deg: f64) -> DetailTier {
    if fov_deg < thresholds.detailed_below_fov_deg {
        DetailTier::Detailed
    } else if fov_deg < thresholds.sphere_below_fov_deg {
        DetailTier::Sphere
    } else if fov_deg < thresholds.billboard_below_fov_deg {
        DetailTier::Billboard
    } else {
        DetailTier::Point
    }
}

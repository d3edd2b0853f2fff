//! Nearest-object queries against the last rendered frame
//!
//! Taps are resolved synchronously. The crosshair readout at the viewport
//! center asks the same question continuously, so it goes through a throttle
//! that reuses the previous answer between evaluations.

use std::time::Duration;

use nalgebra::Point2;
use starfield::{BodyId, BodyKind};

use crate::config::HitConfig;
use crate::frame::RenderedBody;

/// The body found at a query point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub id: BodyId,
    pub kind: BodyKind,
    /// Screen position of the body
    pub position: Point2<f64>,
    /// Distance from the query point in pixels
    pub distance_px: f64,
}

/// Closest visible body within `radius_px` of `query`
///
/// Linear scan. Invisible bodies are skipped. A body exactly on the radius
/// matches. On equal distances the earlier body wins.
pub fn nearest_within<'a>(
    bodies: impl IntoIterator<Item = &'a RenderedBody>,
    query: &Point2<f64>,
    radius_px: f64,
) -> Option<Hit> {
    let mut best: Option<Hit> = None;
    for body in bodies {
        if !body.is_visible() {
            continue;
        }
        let position = body.screen.point();
        let distance_px = (position - query).norm();
        if distance_px > radius_px {
            continue;
        }
        if best.map_or(true, |b| distance_px < b.distance_px) {
            best = Some(Hit {
                id: body.id,
                kind: body.kind,
                position,
                distance_px,
            });
        }
    }
    best
}

/// Resolve a query point, planets first
///
/// Planets, moons and the sun are searched with the planet radius; stars
/// are only considered when none of those is in range.
pub fn pick(bodies: &[RenderedBody], query: &Point2<f64>, config: &HitConfig) -> Option<Hit> {
    let is_star = |b: &&RenderedBody| matches!(b.kind, BodyKind::Star { .. });

    nearest_within(
        bodies.iter().filter(|b| !is_star(b)),
        query,
        config.planet_radius_px,
    )
    .or_else(|| nearest_within(bodies.iter().filter(is_star), query, config.star_radius_px))
}

/// Rate limit for ambient crosshair queries
#[derive(Debug, Clone)]
pub struct CrosshairThrottle {
    interval: Duration,
    last_evaluated: Option<Duration>,
    cached: Option<Hit>,
}

impl CrosshairThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_evaluated: None,
            cached: None,
        }
    }

    /// Evaluate at most once per interval, otherwise return the cached answer
    ///
    /// `now` is a monotonic timestamp; a timestamp earlier than the last
    /// evaluation forces a fresh evaluation.
    pub fn query(&mut self, now: Duration, evaluate: impl FnOnce() -> Option<Hit>) -> Option<Hit> {
        let due = match self.last_evaluated {
            None => true,
            Some(last) => now < last || now - last >= self.interval,
        };
        if due {
            self.cached = evaluate();
            self.last_evaluated = Some(now);
        }
        self.cached
    }

    /// Forget the cached answer, e.g. after a catalog swap
    pub fn invalidate(&mut self) {
        self.last_evaluated = None;
        self.cached = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lod::DetailTier;
    use crate::projector::ScreenPoint;
    use starfield::SpectralClass;

    fn body(id: u32, kind: BodyKind, x: f64, y: f64, visible: bool) -> RenderedBody {
        RenderedBody {
            id: BodyId(id),
            kind,
            screen: ScreenPoint { x, y, visible },
            scale: 1.0,
            tier: DetailTier::Point,
        }
    }

    fn star(id: u32, x: f64, y: f64) -> RenderedBody {
        body(
            id,
            BodyKind::Star {
                spectral_class: SpectralClass::A,
            },
            x,
            y,
            true,
        )
    }

    #[test]
    fn test_exact_hit_and_radius_edge() {
        let bodies = [star(1, 300.0, 400.0)];
        let hit = nearest_within(&bodies, &Point2::new(300.0, 400.0), 50.0).unwrap();
        assert_eq!(hit.id, BodyId(1));
        assert_eq!(hit.distance_px, 0.0);

        assert!(nearest_within(&bodies, &Point2::new(350.0, 400.0), 50.0).is_some());
        assert!(nearest_within(&bodies, &Point2::new(351.0, 400.0), 50.0).is_none());
    }

    #[test]
    fn test_nearest_wins_and_ties_keep_first() {
        let bodies = [star(1, 0.0, 10.0), star(2, 0.0, -10.0), star(3, 0.0, 4.0)];
        let hit = nearest_within(&bodies, &Point2::origin(), 50.0).unwrap();
        assert_eq!(hit.id, BodyId(3));

        let tied = [star(1, 0.0, 10.0), star(2, 0.0, -10.0)];
        let hit = nearest_within(&tied, &Point2::origin(), 50.0).unwrap();
        assert_eq!(hit.id, BodyId(1));
    }

    #[test]
    fn test_invisible_bodies_skipped() {
        let bodies = [
            body(1, BodyKind::Planet, 0.0, 0.0, false),
            star(2, 20.0, 0.0),
        ];
        let hit = nearest_within(&bodies, &Point2::origin(), 50.0).unwrap();
        assert_eq!(hit.id, BodyId(2));
    }

    #[test]
    fn test_planets_take_precedence_over_closer_stars() {
        let bodies = [star(1, 0.0, 0.0), body(2, BodyKind::Planet, 40.0, 0.0, true)];
        let hit = pick(&bodies, &Point2::origin(), &HitConfig::default()).unwrap();
        assert_eq!(hit.id, BodyId(2));
        assert_eq!(hit.kind, BodyKind::Planet);

        // Planet out of its radius: fall back to stars
        let bodies = [star(1, 0.0, 0.0), body(2, BodyKind::Planet, 80.0, 0.0, true)];
        let hit = pick(&bodies, &Point2::origin(), &HitConfig::default()).unwrap();
        assert_eq!(hit.id, BodyId(1));
    }

    #[test]
    fn test_star_radius_smaller_than_planet_radius() {
        let bodies = [star(1, 40.0, 0.0)];
        assert!(pick(&bodies, &Point2::origin(), &HitConfig::default()).is_none());
    }

    #[test]
    fn test_crosshair_throttle_reuses_answer() {
        let mut throttle = CrosshairThrottle::new(Duration::from_millis(100));
        let mut evaluations = 0;
        let ms = Duration::from_millis;

        for t in [0, 30, 60, 99, 100, 150, 210] {
            throttle.query(ms(t), || {
                evaluations += 1;
                None
            });
        }
        // Evaluated at 0, 100 and 210
        assert_eq!(evaluations, 3);

        throttle.invalidate();
        throttle.query(ms(211), || {
            evaluations += 1;
            None
        });
        assert_eq!(evaluations, 4);
    }
}

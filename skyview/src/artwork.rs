//! Flat artwork anchored to tracked stars
//!
//! Each artwork image carries fixed pixel positions for a few of its stars.
//! Every frame the image is fitted onto where those stars currently project:
//! a similarity transform from two visible anchors, a full affine transform
//! from three. Fits that would divide by a vanishing determinant, or that
//! stretch the image absurdly, are skipped for the frame rather than drawn.

use nalgebra::{Matrix2, Point2, Vector2};
use serde::{Deserialize, Serialize};
use sky_math::{basis_from_columns, similarity_matrix, singular_values, solve_2x2};
use starfield::BodyId;

use crate::config::ArtworkConfig;
use crate::projector::ScreenPoint;

/// A star whose screen position pins one pixel of the image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorPoint {
    pub star: BodyId,
    /// Fixed position in image pixels
    pub image_px: Point2<f64>,
}

/// Image-to-screen map `p ↦ linear · p + translation`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageTransform {
    pub linear: Matrix2<f64>,
    pub translation: Vector2<f64>,
}

impl ImageTransform {
    pub fn apply(&self, image_px: &Point2<f64>) -> Point2<f64> {
        Point2::from(self.linear * image_px.coords + self.translation)
    }

    /// Principal stretch factors, largest first
    pub fn stretch(&self) -> (f64, f64) {
        singular_values(&self.linear)
    }
}

/// Why an artwork was not drawn this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    /// Fewer than two anchors currently on screen
    NotEnoughAnchors { visible: usize },
    /// Anchors coincide or are collinear in the image or on screen
    Degenerate,
    /// The fit stretches the image outside the accepted bounds
    Distorted { major: f64, minor: f64 },
}

/// A drawable placement of the image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArtworkPlacement {
    pub transform: ImageTransform,
    /// Image corners in screen pixels: top-left, top-right, bottom-right, bottom-left
    pub corners: [Point2<f64>; 4],
}

/// Per-frame result of fitting an artwork
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArtworkOutcome {
    Draw(ArtworkPlacement),
    Skip(SkipReason),
}

impl ArtworkOutcome {
    pub fn placement(&self) -> Option<&ArtworkPlacement> {
        match self {
            ArtworkOutcome::Draw(p) => Some(p),
            ArtworkOutcome::Skip(_) => None,
        }
    }

    pub fn is_drawn(&self) -> bool {
        matches!(self, ArtworkOutcome::Draw(_))
    }
}

/// Similarity transform carrying two image points onto two screen points
pub fn solve_similarity(
    image: [Point2<f64>; 2],
    screen: [Point2<f64>; 2],
) -> Result<ImageTransform, SkipReason> {
    let u = image[1] - image[0];
    let v = screen[1] - screen[0];
    if u.norm() < f64::EPSILON || v.norm() < f64::EPSILON {
        return Err(SkipReason::Degenerate);
    }

    let scale = v.norm() / u.norm();
    let angle = v.y.atan2(v.x) - u.y.atan2(u.x);
    let linear = similarity_matrix(angle, scale);
    Ok(ImageTransform {
        linear,
        translation: screen[0].coords - linear * image[0].coords,
    })
}

/// Affine transform carrying three image points onto three screen points
///
/// The image offsets of the second and third anchor from the first form the
/// basis. Each screen axis is then solved independently: the row `r` of the
/// linear part must satisfy `r · u = Δx₁` and `r · w = Δx₂` (and likewise for
/// y), i.e. `Bᵀ rᵀ = Δ` with `B = [u w]`.
pub fn solve_affine(
    image: [Point2<f64>; 3],
    screen: [Point2<f64>; 3],
    min_angle_deg: f64,
) -> Result<ImageTransform, SkipReason> {
    let u = image[1] - image[0];
    let w = image[2] - image[0];
    let basis = basis_from_columns(u, w, min_angle_deg).map_err(|e| {
        log::trace!("Artwork anchors degenerate: {e}");
        SkipReason::Degenerate
    })?;
    let system = basis.transpose();

    let d1 = screen[1] - screen[0];
    let d2 = screen[2] - screen[0];
    let row_x = solve_2x2(&system, &Vector2::new(d1.x, d2.x)).map_err(|_| SkipReason::Degenerate)?;
    let row_y = solve_2x2(&system, &Vector2::new(d1.y, d2.y)).map_err(|_| SkipReason::Degenerate)?;

    let linear = Matrix2::new(row_x.x, row_x.y, row_y.x, row_y.y);
    Ok(ImageTransform {
        linear,
        translation: screen[0].coords - linear * image[0].coords,
    })
}

/// An artwork image, its anchors and the constellation lines drawn with it
#[derive(Debug, Clone)]
pub struct ArtworkAnchor {
    name: String,
    image_size: Vector2<f64>,
    anchors: Vec<AnchorPoint>,
    /// Star id sequences, each drawn as a polyline
    lines: Vec<Vec<BodyId>>,
    /// Last fit, keyed on the anchors' visible screen points it was made from
    cache: Option<(Vec<Option<Point2<f64>>>, ArtworkOutcome)>,
}

impl ArtworkAnchor {
    pub fn new(
        name: impl Into<String>,
        image_width: f64,
        image_height: f64,
        anchors: Vec<AnchorPoint>,
    ) -> Self {
        Self {
            name: name.into(),
            image_size: Vector2::new(image_width, image_height),
            anchors,
            lines: Vec::new(),
            cache: None,
        }
    }

    pub fn with_lines(mut self, lines: Vec<Vec<BodyId>>) -> Self {
        self.lines = lines;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn anchors(&self) -> &[AnchorPoint] {
        &self.anchors
    }

    /// Every star the artwork refers to, anchors first
    pub fn star_ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.anchors
            .iter()
            .map(|a| a.star)
            .chain(self.lines.iter().flatten().copied())
    }

    /// Fit the image for a frame
    ///
    /// `screen_of` returns where a star projects this frame; a star missing
    /// from the catalog counts as not visible. The fit is redone only when an
    /// anchor's visible screen position differs from the previous call, so a
    /// still camera reuses it. `config` is assumed fixed between calls.
    pub fn placement(
        &mut self,
        screen_of: impl Fn(BodyId) -> Option<ScreenPoint>,
        config: &ArtworkConfig,
    ) -> ArtworkOutcome {
        let key: Vec<Option<Point2<f64>>> = self
            .anchors
            .iter()
            .map(|a| screen_of(a.star).filter(|s| s.visible).map(|s| s.point()))
            .collect();
        if let Some((cached_key, outcome)) = &self.cache {
            if *cached_key == key {
                return *outcome;
            }
        }
        let outcome = self.fit(&key, config);
        if let ArtworkOutcome::Skip(reason) = outcome {
            log::trace!("Skipping artwork {}: {reason:?}", self.name);
        }
        self.cache = Some((key, outcome));
        outcome
    }

    /// Screen polylines for the constellation lines
    ///
    /// A line breaks wherever a star is missing or not visible, so a single
    /// star sequence may yield several polylines. Fragments shorter than two
    /// points are dropped.
    pub fn line_paths(
        &self,
        screen_of: impl Fn(BodyId) -> Option<ScreenPoint>,
    ) -> Vec<Vec<Point2<f64>>> {
        let mut paths = Vec::new();
        for line in &self.lines {
            let mut current: Vec<Point2<f64>> = Vec::new();
            for star in line {
                match screen_of(*star).filter(|s| s.visible) {
                    Some(s) => current.push(s.point()),
                    None => {
                        if current.len() >= 2 {
                            paths.push(std::mem::take(&mut current));
                        } else {
                            current.clear();
                        }
                    }
                }
            }
            if current.len() >= 2 {
                paths.push(current);
            }
        }
        paths
    }

    /// `screens` holds one entry per anchor, `None` where it is not visible
    fn fit(&self, screens: &[Option<Point2<f64>>], config: &ArtworkConfig) -> ArtworkOutcome {
        let visible: Vec<(Point2<f64>, Point2<f64>)> = self
            .anchors
            .iter()
            .zip(screens)
            .filter_map(|(a, screen)| screen.map(|s| (a.image_px, s)))
            .collect();

        let solved = match visible.as_slice() {
            [a, b, c, ..] => solve_affine([a.0, b.0, c.0], [a.1, b.1, c.1], config.min_anchor_angle_deg),
            [a, b] => solve_similarity([a.0, b.0], [a.1, b.1]),
            _ => Err(SkipReason::NotEnoughAnchors {
                visible: visible.len(),
            }),
        };

        let transform = match solved {
            Ok(t) => t,
            Err(reason) => return ArtworkOutcome::Skip(reason),
        };

        let (major, minor) = transform.stretch();
        if !(major.is_finite() && minor >= config.min_scale && major <= config.max_scale) {
            return ArtworkOutcome::Skip(SkipReason::Distorted { major, minor });
        }

        let (w, h) = (self.image_size.x, self.image_size.y);
        let corners = [
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ]
        .map(|c| transform.apply(&c));

        ArtworkOutcome::Draw(ArtworkPlacement { transform, corners })
    }
}

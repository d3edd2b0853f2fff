//! Per-tick output handed to the renderer

use nalgebra::Point2;
use starfield::{BodyId, BodyKind};

use crate::artwork::ArtworkOutcome;
use crate::lod::DetailTier;
use crate::projector::ScreenPoint;
use crate::state::CameraTelemetry;

/// A body as it should be drawn this frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBody {
    pub id: BodyId,
    pub kind: BodyKind,
    pub screen: ScreenPoint,
    pub scale: f64,
    pub tier: DetailTier,
}

impl RenderedBody {
    pub fn is_visible(&self) -> bool {
        self.screen.visible
    }
}

/// Placement of one artwork overlay this frame
#[derive(Debug, Clone, PartialEq)]
pub struct ArtworkFrame {
    pub name: String,
    pub outcome: ArtworkOutcome,
    /// Constellation line polylines in screen pixels
    pub lines: Vec<Vec<Point2<f64>>>,
}

/// Animated opacity of one focus region
#[derive(Debug, Clone, PartialEq)]
pub struct FocusFrame {
    pub name: String,
    pub opacity: f64,
}

/// Everything the renderer needs for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Increments every tick
    pub revision: u64,
    pub lst_deg: f64,
    pub camera: CameraTelemetry,
    /// Catalog order; gated moons are omitted
    pub bodies: Vec<RenderedBody>,
    pub artworks: Vec<ArtworkFrame>,
    pub focus: Vec<FocusFrame>,
}

impl Frame {
    /// A frame with nothing in it, used before the first tick
    pub fn empty(camera: CameraTelemetry) -> Self {
        Self {
            revision: 0,
            lst_deg: 0.0,
            camera,
            bodies: Vec::new(),
            artworks: Vec::new(),
            focus: Vec::new(),
        }
    }

    pub fn body(&self, id: BodyId) -> Option<&RenderedBody> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn visible_bodies(&self) -> impl Iterator<Item = &RenderedBody> {
        self.bodies.iter().filter(|b| b.is_visible())
    }

    pub fn artwork(&self, name: &str) -> Option<&ArtworkFrame> {
        self.artworks.iter().find(|a| a.name == name)
    }

    pub fn focus_opacity(&self, name: &str) -> Option<f64> {
        self.focus.iter().find(|f| f.name == name).map(|f| f.opacity)
    }
}

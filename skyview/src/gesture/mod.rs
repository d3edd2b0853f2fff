//! Touch sequence classification
//!
//! Raw touch and pinch events are folded into one gesture per sequence
//! (touch-down to lift): a tap, a drag or a pinch. The classification is
//! sticky. Once a sequence has pinched it never drags again, and once it has
//! moved beyond the tap radius it can no longer be a tap.

pub mod history;

use std::time::Duration;

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::config::CameraConfig;
pub use history::{MotionHistory, MotionSample};

/// Raw input events, each stamped with a monotonic timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TouchEvent {
    Down { x: f64, y: f64, at: Duration },
    Move { x: f64, y: f64, at: Duration },
    Up { x: f64, y: f64, at: Duration },
    PinchStart { at: Duration },
    /// Cumulative scale since the pinch started
    Pinch { scale: f64, at: Duration },
    PinchEnd { at: Duration },
    Cancel { at: Duration },
}

impl TouchEvent {
    pub fn at(&self) -> Duration {
        match *self {
            TouchEvent::Down { at, .. }
            | TouchEvent::Move { at, .. }
            | TouchEvent::Up { at, .. }
            | TouchEvent::PinchStart { at }
            | TouchEvent::Pinch { at, .. }
            | TouchEvent::PinchEnd { at }
            | TouchEvent::Cancel { at } => at,
        }
    }
}

/// Classification of the sequence in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    /// Still within tap limits
    Pending,
    Drag,
    Pinch,
}

/// What the camera should do in response to one event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutput {
    None,
    /// A new sequence started; any inertia must stop now
    Began,
    /// Pixel displacement to apply to the view
    DragDelta(Vector2<f64>),
    /// Incremental pinch factor since the previous pinch event
    Zoom(f64),
    Tap(Point2<f64>),
    /// Drag released with this measured velocity (pixels per second)
    Released(Vector2<f64>),
    Cancelled,
}

#[derive(Debug, Clone)]
struct Sequence {
    kind: GestureKind,
    started_at: Duration,
    start: Point2<f64>,
    last: Point2<f64>,
    /// Cumulative scale reported by the last pinch event
    pinch_scale: f64,
    /// Started by a pinch with no pointer down, ends at pinch end
    pinch_only: bool,
}

/// Folds touch events into taps, drags and pinches
#[derive(Debug, Clone)]
pub struct GestureTracker {
    tap_max_duration: Duration,
    tap_max_movement_px: f64,
    velocity_window: Duration,
    sequence: Option<Sequence>,
    history: MotionHistory,
}

impl GestureTracker {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            tap_max_duration: config.tap_max_duration(),
            tap_max_movement_px: config.tap_max_movement_px,
            velocity_window: config.velocity_window(),
            sequence: None,
            history: MotionHistory::default(),
        }
    }

    /// Classification of the active sequence, if any
    pub fn kind(&self) -> Option<GestureKind> {
        self.sequence.as_ref().map(|s| s.kind)
    }

    /// Drop any sequence in progress
    pub fn reset(&mut self) {
        self.sequence = None;
        self.history.clear();
    }

    /// Consume one event
    pub fn handle(&mut self, event: TouchEvent) -> GestureOutput {
        match event {
            TouchEvent::Down { x, y, at } => self.on_down(Point2::new(x, y), at),
            TouchEvent::Move { x, y, at } => self.on_move(Point2::new(x, y), at),
            TouchEvent::Up { x, y, at } => self.on_up(Point2::new(x, y), at),
            TouchEvent::PinchStart { at } => self.on_pinch_start(at),
            TouchEvent::Pinch { scale, .. } => self.on_pinch(scale),
            TouchEvent::PinchEnd { .. } => self.on_pinch_end(),
            TouchEvent::Cancel { .. } => {
                self.reset();
                GestureOutput::Cancelled
            }
        }
    }

    fn on_down(&mut self, point: Point2<f64>, at: Duration) -> GestureOutput {
        self.history.clear();
        self.history.push(at, point);
        self.sequence = Some(Sequence {
            kind: GestureKind::Pending,
            started_at: at,
            start: point,
            last: point,
            pinch_scale: 1.0,
            pinch_only: false,
        });
        GestureOutput::Began
    }

    fn on_move(&mut self, point: Point2<f64>, at: Duration) -> GestureOutput {
        let Some(seq) = self.sequence.as_mut() else {
            return GestureOutput::None;
        };
        self.history.push(at, point);

        match seq.kind {
            GestureKind::Pinch => GestureOutput::None,
            GestureKind::Pending => {
                if (point - seq.start).norm() <= self.tap_max_movement_px {
                    return GestureOutput::None;
                }
                // Crossing the tap radius releases everything held back so far
                seq.kind = GestureKind::Drag;
                seq.last = point;
                log::debug!("Touch sequence classified as drag");
                GestureOutput::DragDelta(point - seq.start)
            }
            GestureKind::Drag => {
                let delta = point - seq.last;
                seq.last = point;
                GestureOutput::DragDelta(delta)
            }
        }
    }

    fn on_up(&mut self, point: Point2<f64>, at: Duration) -> GestureOutput {
        let Some(seq) = self.sequence.take() else {
            return GestureOutput::None;
        };
        self.history.push(at, point);

        let output = match seq.kind {
            GestureKind::Pinch => GestureOutput::None,
            GestureKind::Pending
                if at.saturating_sub(seq.started_at) < self.tap_max_duration
                    && (point - seq.start).norm() <= self.tap_max_movement_px =>
            {
                log::debug!("Touch sequence classified as tap");
                GestureOutput::Tap(seq.start)
            }
            GestureKind::Pending | GestureKind::Drag => {
                GestureOutput::Released(self.history.velocity_over(self.velocity_window))
            }
        };
        self.history.clear();
        output
    }

    fn on_pinch_start(&mut self, at: Duration) -> GestureOutput {
        match self.sequence.as_mut() {
            Some(seq) => {
                seq.kind = GestureKind::Pinch;
                seq.pinch_scale = 1.0;
                GestureOutput::None
            }
            None => {
                self.history.clear();
                self.sequence = Some(Sequence {
                    kind: GestureKind::Pinch,
                    started_at: at,
                    start: Point2::origin(),
                    last: Point2::origin(),
                    pinch_scale: 1.0,
                    pinch_only: true,
                });
                GestureOutput::Began
            }
        }
    }

    fn on_pinch(&mut self, scale: f64) -> GestureOutput {
        let Some(seq) = self.sequence.as_mut() else {
            return GestureOutput::None;
        };
        if seq.kind != GestureKind::Pinch || !(scale.is_finite() && scale > 0.0) {
            return GestureOutput::None;
        }
        let step = scale / seq.pinch_scale;
        seq.pinch_scale = scale;
        GestureOutput::Zoom(step)
    }

    fn on_pinch_end(&mut self) -> GestureOutput {
        if self.sequence.as_ref().is_some_and(|s| s.pinch_only) {
            self.reset();
        }
        GestureOutput::None
    }
}

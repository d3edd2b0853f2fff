//! Fixed-capacity history of recent pointer positions.
//!
//! Keeps a sliding window of the most recent touch samples so the release
//! velocity of a drag can be measured over a short time window rather than
//! from the last two (noisy) events alone.

use std::collections::VecDeque;
use std::time::Duration;

use nalgebra::{Point2, Vector2};

/// A pointer position at a monotonic timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub at: Duration,
    pub position: Point2<f64>,
}

/// A fixed-capacity buffer that evicts the oldest sample when full.
#[derive(Debug, Clone)]
pub struct MotionHistory {
    samples: VecDeque<MotionSample>,
    capacity: usize,
}

impl MotionHistory {
    /// Creates a new history holding at most `capacity` samples.
    ///
    /// A zero capacity is raised to two, the minimum that can yield a velocity.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Pushes a sample, evicting the oldest if the buffer is at capacity.
    pub fn push(&mut self, at: Duration, position: Point2<f64>) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(MotionSample { at, position });
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Returns the most recent sample, if any.
    pub fn latest(&self) -> Option<&MotionSample> {
        self.samples.back()
    }

    /// Average velocity over the samples no older than `window` before the latest
    ///
    /// Measured between the oldest sample inside the window and the latest
    /// one, in pixels per second. Zero when fewer than two samples qualify or
    /// no time elapsed between them.
    pub fn velocity_over(&self, window: Duration) -> Vector2<f64> {
        let Some(latest) = self.samples.back() else {
            return Vector2::zeros();
        };
        let cutoff = latest.at.saturating_sub(window);
        let Some(oldest) = self.samples.iter().find(|s| s.at >= cutoff) else {
            return Vector2::zeros();
        };

        let elapsed = latest.at.saturating_sub(oldest.at).as_secs_f64();
        if elapsed <= 0.0 {
            return Vector2::zeros();
        }
        (latest.position - oldest.position) / elapsed
    }
}

impl Default for MotionHistory {
    fn default() -> Self {
        Self::new(32)
    }
}

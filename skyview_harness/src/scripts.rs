//! Scripted touch input for simulated sessions
//!
//! A script is a time-ordered list of inputs. Builders expand taps, drags and
//! pinches into the individual touch events a real touch screen would report.

use std::time::Duration;

use skyview::{CameraMode, TouchEvent};

/// How long a scripted finger stays down for a tap
const TAP_HOLD: Duration = Duration::from_millis(80);

/// One input delivered to the engine's handle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptedInput {
    Touch(TouchEvent),
    SetMode { at: Duration, mode: CameraMode },
}

impl ScriptedInput {
    pub fn at(&self) -> Duration {
        match self {
            ScriptedInput::Touch(event) => event.at(),
            ScriptedInput::SetMode { at, .. } => *at,
        }
    }
}

/// Time-ordered touch and mode inputs
#[derive(Debug, Clone, Default)]
pub struct GestureScript {
    inputs: Vec<ScriptedInput>,
}

impl GestureScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inputs(&self) -> &[ScriptedInput] {
        &self.inputs
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Time of the last input, zero for an empty script
    pub fn end(&self) -> Duration {
        self.inputs.last().map_or(Duration::ZERO, ScriptedInput::at)
    }

    pub fn set_mode(mut self, at: Duration, mode: CameraMode) -> Self {
        self.push(ScriptedInput::SetMode { at, mode });
        self
    }

    /// Quick touch without movement
    pub fn tap(mut self, at: Duration, x: f64, y: f64) -> Self {
        self.push(ScriptedInput::Touch(TouchEvent::Down { x, y, at }));
        self.push(ScriptedInput::Touch(TouchEvent::Up {
            x,
            y,
            at: at + TAP_HOLD,
        }));
        self
    }

    /// Straight-line drag from `from` to `to`, released at the end
    ///
    /// # Arguments
    /// * `at` - Time of the touch-down
    /// * `from` - Touch-down position in pixels
    /// * `to` - Release position in pixels
    /// * `duration` - Time between touch-down and release
    /// * `steps` - Number of move events in between (at least one)
    pub fn drag(
        mut self,
        at: Duration,
        from: (f64, f64),
        to: (f64, f64),
        duration: Duration,
        steps: u32,
    ) -> Self {
        let steps = steps.max(1);
        self.push(ScriptedInput::Touch(TouchEvent::Down {
            x: from.0,
            y: from.1,
            at,
        }));
        for i in 1..=steps {
            let f = f64::from(i) / f64::from(steps);
            self.push(ScriptedInput::Touch(TouchEvent::Move {
                x: from.0 + (to.0 - from.0) * f,
                y: from.1 + (to.1 - from.1) * f,
                at: at + duration.mul_f64(f),
            }));
        }
        self.push(ScriptedInput::Touch(TouchEvent::Up {
            x: to.0,
            y: to.1,
            at: at + duration,
        }));
        self
    }

    /// Two-finger pinch reaching cumulative `scale` (above one zooms in)
    pub fn pinch(mut self, at: Duration, scale: f64, duration: Duration, steps: u32) -> Self {
        let steps = steps.max(1);
        self.push(ScriptedInput::Touch(TouchEvent::PinchStart { at }));
        for i in 1..=steps {
            let f = f64::from(i) / f64::from(steps);
            self.push(ScriptedInput::Touch(TouchEvent::Pinch {
                scale: scale.powf(f),
                at: at + duration.mul_f64(f),
            }));
        }
        self.push(ScriptedInput::Touch(TouchEvent::PinchEnd { at: at + duration }));
        self
    }

    /// Keep inputs sorted; equal times stay in insertion order
    fn push(&mut self, input: ScriptedInput) {
        let index = self.inputs.partition_point(|i| i.at() <= input.at());
        self.inputs.insert(index, input);
    }
}

/// Walks a script in time order
#[derive(Debug)]
pub struct ScriptCursor<'a> {
    inputs: &'a [ScriptedInput],
    next: usize,
}

impl<'a> ScriptCursor<'a> {
    pub fn new(script: &'a GestureScript) -> Self {
        Self {
            inputs: script.inputs(),
            next: 0,
        }
    }

    /// Inputs due at or before `now` that have not been returned yet
    pub fn due(&mut self, now: Duration) -> &'a [ScriptedInput] {
        let start = self.next;
        while self.next < self.inputs.len() && self.inputs[self.next].at() <= now {
            self.next += 1;
        }
        &self.inputs[start..self.next]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_tap_expands_to_down_up() {
        let script = GestureScript::new().tap(ms(100), 10.0, 20.0);
        assert_eq!(
            script.inputs(),
            &[
                ScriptedInput::Touch(TouchEvent::Down {
                    x: 10.0,
                    y: 20.0,
                    at: ms(100)
                }),
                ScriptedInput::Touch(TouchEvent::Up {
                    x: 10.0,
                    y: 20.0,
                    at: ms(180)
                }),
            ]
        );
    }

    #[test]
    fn test_drag_moves_linearly() {
        let script = GestureScript::new().drag(ms(0), (0.0, 0.0), (100.0, 50.0), ms(100), 4);
        let inputs = script.inputs();
        assert_eq!(inputs.len(), 6);
        assert_eq!(
            inputs[2],
            ScriptedInput::Touch(TouchEvent::Move {
                x: 50.0,
                y: 25.0,
                at: ms(50)
            })
        );
        assert_eq!(script.end(), ms(100));
    }

    #[test]
    fn test_pinch_reaches_scale() {
        let script = GestureScript::new().pinch(ms(0), 4.0, ms(200), 2);
        match script.inputs()[2] {
            ScriptedInput::Touch(TouchEvent::Pinch { scale, at }) => {
                assert!((scale - 4.0).abs() < 1e-12);
                assert_eq!(at, ms(200));
            }
            other => panic!("unexpected input {other:?}"),
        }
    }

    #[test]
    fn test_inputs_sorted_across_builders() {
        let script = GestureScript::new()
            .tap(ms(500), 1.0, 1.0)
            .set_mode(ms(0), CameraMode::Touch)
            .drag(ms(100), (0.0, 0.0), (10.0, 0.0), ms(100), 1);
        let times: Vec<_> = script.inputs().iter().map(ScriptedInput::at).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
        assert!(matches!(script.inputs()[0], ScriptedInput::SetMode { .. }));
    }

    #[test]
    fn test_cursor_returns_each_input_once() {
        let script = GestureScript::new().tap(ms(0), 0.0, 0.0).tap(ms(300), 5.0, 5.0);
        let mut cursor = ScriptCursor::new(&script);
        assert_eq!(cursor.due(ms(50)).len(), 1);
        assert_eq!(cursor.due(ms(50)).len(), 0);
        assert_eq!(cursor.due(ms(400)).len(), 3);
        assert!(cursor.due(ms(10_000)).is_empty());
    }
}

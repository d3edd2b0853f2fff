//! Cross-thread input surface
//!
//! Sensor callbacks and touch handlers run on their own threads. They never
//! touch camera state directly: orientation goes into a single slot where the
//! newest sample replaces any unread one, and touch events and mode changes
//! go through an ordered channel that the tick drains before doing anything
//! else.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::{Receiver, Sender};

use crate::gesture::TouchEvent;
use crate::state::{CameraMode, CameraTelemetry, OrientationSample};

/// Commands applied in arrival order at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputCommand {
    Touch(TouchEvent),
    SetMode(CameraMode),
}

/// State shared between the engine and its handles
#[derive(Debug)]
pub(crate) struct SharedInput {
    alive: AtomicBool,
    orientation: Mutex<Option<OrientationSample>>,
    telemetry: Mutex<CameraTelemetry>,
}

impl SharedInput {
    pub(crate) fn new(telemetry: CameraTelemetry) -> Self {
        Self {
            alive: AtomicBool::new(true),
            orientation: Mutex::new(None),
            telemetry: Mutex::new(telemetry),
        }
    }

    pub(crate) fn close(&self) {
        self.alive.store(false, Ordering::Release);
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Latest sensor sample, left in place so smoothing keeps converging
    pub(crate) fn orientation(&self) -> Option<OrientationSample> {
        *self
            .orientation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn publish_telemetry(&self, telemetry: CameraTelemetry) {
        *self.telemetry.lock().unwrap_or_else(PoisonError::into_inner) = telemetry;
    }
}

/// Create the shared state plus the engine's end of the command channel
pub(crate) fn channel(telemetry: CameraTelemetry) -> (SkyHandle, Receiver<InputCommand>) {
    let (commands, inbox) = crossbeam_channel::unbounded();
    let handle = SkyHandle {
        shared: Arc::new(SharedInput::new(telemetry)),
        commands,
    };
    (handle, inbox)
}

/// Cloneable handle for input threads
///
/// Every push returns `false` once the engine has shut down; nothing is
/// queued after that point.
#[derive(Debug, Clone)]
pub struct SkyHandle {
    pub(crate) shared: Arc<SharedInput>,
    commands: Sender<InputCommand>,
}

impl SkyHandle {
    /// Store a sensor sample, replacing any sample not yet consumed
    pub fn push_orientation(&self, sample: OrientationSample) -> bool {
        if !self.shared.is_alive() {
            return false;
        }
        *self
            .shared
            .orientation
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(sample);
        true
    }

    /// Queue a touch event
    pub fn push_touch(&self, event: TouchEvent) -> bool {
        self.send(InputCommand::Touch(event))
    }

    /// Queue a mode switch; velocity and inertia reset when it is applied
    pub fn set_mode(&self, mode: CameraMode) -> bool {
        self.send(InputCommand::SetMode(mode))
    }

    /// Camera state as of the last completed tick
    pub fn telemetry(&self) -> CameraTelemetry {
        *self
            .shared
            .telemetry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_alive(&self) -> bool {
        self.shared.is_alive()
    }

    fn send(&self, command: InputCommand) -> bool {
        self.shared.is_alive() && self.commands.send(command).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn telemetry() -> CameraTelemetry {
        CameraTelemetry {
            azimuth_deg: 0.0,
            altitude_deg: 0.0,
            fov_deg: 75.0,
            mode: CameraMode::Touch,
            coasting: false,
        }
    }

    #[test]
    fn test_orientation_slot_keeps_latest() {
        let (handle, _inbox) = channel(telemetry());
        assert!(handle.push_orientation(OrientationSample::new(10.0, 5.0)));
        assert!(handle.push_orientation(OrientationSample::new(20.0, 6.0)));
        assert_eq!(
            handle.shared.orientation(),
            Some(OrientationSample::new(20.0, 6.0))
        );
        // Reading does not consume
        assert!(handle.shared.orientation().is_some());
    }

    #[test]
    fn test_commands_preserve_order() {
        let (handle, inbox) = channel(telemetry());
        let down = TouchEvent::Down {
            x: 1.0,
            y: 2.0,
            at: Duration::ZERO,
        };
        handle.set_mode(CameraMode::Sensor);
        handle.push_touch(down);

        let received: Vec<_> = inbox.try_iter().collect();
        assert_eq!(
            received,
            vec![
                InputCommand::SetMode(CameraMode::Sensor),
                InputCommand::Touch(down)
            ]
        );
    }

    #[test]
    fn test_closed_handle_is_a_no_op() {
        let (handle, inbox) = channel(telemetry());
        let clone = handle.clone();
        handle.shared.close();

        assert!(!clone.is_alive());
        assert!(!clone.push_orientation(OrientationSample::new(1.0, 1.0)));
        assert!(!clone.set_mode(CameraMode::Sensor));
        assert!(inbox.try_recv().is_err());
        assert!(clone.shared.orientation().is_none());
    }

    #[test]
    fn test_send_fails_when_engine_dropped() {
        let (handle, inbox) = channel(telemetry());
        drop(inbox);
        assert!(!handle.set_mode(CameraMode::Touch));
    }
}

//! Runner for driving a sky view with synthetic input over time
//!
//! Feeds an orientation profile and a gesture script through the engine's
//! input handle at a fixed frame rate, ticking once per frame and collecting
//! what came out.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use skyview::{CameraTelemetry, Frame, SkyEvent, SkyView};
use time::OffsetDateTime;

use crate::motion_profiles::OrientationMotion;
use crate::scripts::{GestureScript, ScriptCursor, ScriptedInput};

/// Results from a session run
#[derive(Debug, Clone)]
pub struct SessionResults {
    /// Total frames ticked
    pub frames_rendered: usize,
    /// Visible bodies in each frame
    pub visible_per_frame: Vec<usize>,
    /// Artwork placements drawn, summed over frames
    pub artwork_draws: usize,
    /// Artwork placements skipped, summed over frames
    pub artwork_skips: usize,
    /// Camera state after each frame, with the session time of the frame
    pub telemetry: Vec<(Duration, CameraTelemetry)>,
    /// All events emitted during the run
    pub events: Vec<SkyEvent>,
}

impl SessionResults {
    pub fn final_camera(&self) -> Option<&CameraTelemetry> {
        self.telemetry.last().map(|(_, t)| t)
    }

    pub fn taps(&self) -> impl Iterator<Item = &SkyEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, SkyEvent::TapResolved { .. }))
    }
}

/// Run a session for the specified duration
///
/// # Arguments
/// * `view` - Engine to drive; its callbacks stay registered
/// * `motion` - Orientation reported by the simulated sensor every frame
/// * `script` - Touch and mode inputs, delivered when their time comes
/// * `start` - Wall-clock time of the first frame
/// * `duration` - Total session time
/// * `frame_interval` - Time between frames
pub fn run_session(
    view: &mut SkyView,
    motion: &dyn OrientationMotion,
    script: &GestureScript,
    start: OffsetDateTime,
    duration: Duration,
    frame_interval: Duration,
) -> SessionResults {
    run_session_with_callback(
        view,
        motion,
        script,
        start,
        duration,
        frame_interval,
        |_, _, _| {},
    )
}

/// Extended runner with a per-frame callback
///
/// `callback` is called after each tick with (frame number, frame, session
/// time).
pub fn run_session_with_callback<F>(
    view: &mut SkyView,
    motion: &dyn OrientationMotion,
    script: &GestureScript,
    start: OffsetDateTime,
    duration: Duration,
    frame_interval: Duration,
    mut callback: F,
) -> SessionResults
where
    F: FnMut(usize, &Frame, Duration),
{
    let mut results = SessionResults {
        frames_rendered: 0,
        visible_per_frame: Vec::new(),
        artwork_draws: 0,
        artwork_skips: 0,
        telemetry: Vec::new(),
        events: Vec::new(),
    };

    // Set up event collection
    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    let callback_id = view.register_callback(move |event| {
        events_clone
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    });

    let num_frames = if frame_interval.is_zero() {
        0
    } else {
        (duration.as_nanos() / frame_interval.as_nanos()) as usize
    };
    log::info!(
        "Running session: {num_frames} frames, {} script inputs",
        script.inputs().len()
    );

    let handle = view.handle();
    let mut cursor = ScriptCursor::new(script);

    for frame_num in 0..num_frames {
        let session_time = frame_interval * frame_num as u32;

        handle.push_orientation(motion.sample_at(session_time));
        for input in cursor.due(session_time) {
            match *input {
                ScriptedInput::Touch(event) => handle.push_touch(event),
                ScriptedInput::SetMode { mode, .. } => handle.set_mode(mode),
            };
        }

        let frame = view.tick(start + session_time, frame_interval);

        results.frames_rendered += 1;
        results.visible_per_frame.push(frame.visible_bodies().count());
        for art in &frame.artworks {
            if art.outcome.is_drawn() {
                results.artwork_draws += 1;
            } else {
                results.artwork_skips += 1;
            }
        }
        results.telemetry.push((session_time, frame.camera));

        callback(frame_num, frame, session_time);
    }

    // Deregister the callback to avoid leaking resources
    view.deregister_callback(callback_id);

    results.events = std::mem::take(&mut *events.lock().unwrap_or_else(PoisonError::into_inner));
    results
}

//! Input handles used from sensor and touch threads

mod common;

use std::thread;

use approx::assert_relative_eq;
use common::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skyview::{CameraMode, OrientationSample, SkyEvent, TouchEvent};

#[test]
fn test_latest_orientation_wins_across_threads() {
    let mut view = zenith_view(vec![]);
    view.look_at(0.0, 0.0);

    let writers: Vec<_> = (0..4u64)
        .map(|seed| {
            let handle = view.handle();
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(42 + seed);
                for _ in 0..200 {
                    let sample = OrientationSample::new(
                        rng.gen_range(0.0..360.0),
                        rng.gen_range(-90.0..90.0),
                    );
                    assert!(handle.push_orientation(sample));
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    view.handle()
        .push_orientation(OrientationSample::new(120.0, 35.0));
    for _ in 0..300 {
        view.tick(UTC, ms(16));
    }
    assert_relative_eq!(view.camera().azimuth_deg, 120.0, epsilon = 1e-6);
    assert_relative_eq!(view.camera().altitude_deg, 35.0, epsilon = 1e-6);

    let telemetry = view.handle().telemetry();
    assert_eq!(telemetry.mode, CameraMode::Sensor);
    assert_relative_eq!(telemetry.azimuth_deg, 120.0, epsilon = 1e-6);
}

#[test]
fn test_touch_down_from_input_thread_preempts_inertia() {
    let mut view = zenith_view(vec![]);
    view.look_at(0.0, 0.0);
    let events = record_events(&view);

    let handle = view.handle();
    handle.set_mode(CameraMode::Touch);
    for event in [
        TouchEvent::Down {
            x: 100.0,
            y: 300.0,
            at: ms(0),
        },
        TouchEvent::Move {
            x: 200.0,
            y: 300.0,
            at: ms(40),
        },
        TouchEvent::Up {
            x: 300.0,
            y: 300.0,
            at: ms(80),
        },
    ] {
        handle.push_touch(event);
    }
    view.tick(UTC, ms(16));
    assert!(view.handle().telemetry().coasting);

    let toucher = view.handle();
    thread::spawn(move || {
        toucher.push_touch(TouchEvent::Down {
            x: 500.0,
            y: 500.0,
            at: ms(500),
        })
    })
    .join()
    .unwrap();

    view.tick(UTC, ms(16));
    let state = view.camera();
    assert_eq!(state.velocity.norm(), 0.0);
    assert!(!view.handle().telemetry().coasting);
    assert_eq!(events.lock().unwrap().last(), Some(&SkyEvent::InertiaStopped));
}

#[test]
fn test_mode_switch_resets_velocity_in_one_step() {
    let mut view = zenith_view(vec![]);
    let handle = view.handle();
    handle.set_mode(CameraMode::Touch);
    handle.push_touch(TouchEvent::Down {
        x: 0.0,
        y: 0.0,
        at: ms(0),
    });
    handle.push_touch(TouchEvent::Move {
        x: 150.0,
        y: 0.0,
        at: ms(30),
    });
    handle.push_touch(TouchEvent::Up {
        x: 300.0,
        y: 0.0,
        at: ms(60),
    });
    view.tick(UTC, ms(16));
    assert!(view.camera().velocity.norm() > 0.0);

    handle.set_mode(CameraMode::Sensor);
    view.tick(UTC, ms(16));
    assert_eq!(view.camera().velocity.norm(), 0.0);
    assert_eq!(view.camera().mode, CameraMode::Sensor);
}

#[test]
fn test_pushes_after_shutdown_are_no_ops() {
    let view = zenith_view(vec![]);
    let handle = view.handle();
    assert!(handle.is_alive());

    view.shutdown();

    let late = handle.clone();
    let accepted = thread::spawn(move || {
        late.push_orientation(OrientationSample::new(10.0, 10.0))
            || late.push_touch(TouchEvent::Cancel { at: ms(0) })
            || late.set_mode(CameraMode::Touch)
    })
    .join()
    .unwrap();

    assert!(!accepted);
    assert!(!handle.is_alive());
}

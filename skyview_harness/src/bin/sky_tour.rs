use std::time::Duration;

use clap::Parser;
use ephemeris::ObserverLocation;
use skyview::{CameraMode, SkyConfig, SkyEvent, SkyView};
use skyview_harness::{
    create_bright_sky_catalog, create_demo_ephemeris, create_orion_artwork, create_orion_focus,
    motion_profiles::TestMotions, run_session_with_callback, GestureScript,
};
use starfield::BodyCatalog;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Command line arguments for the sky tour
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Simulated sky viewer session with synthetic sensor motion"
)]
struct Args {
    /// Observer latitude in degrees, north positive
    #[arg(long, default_value_t = 40.7, allow_hyphen_values = true)]
    latitude: f64,

    /// Observer longitude in degrees, east positive
    #[arg(long, default_value_t = -74.0, allow_hyphen_values = true)]
    longitude: f64,

    /// Start time as RFC 3339 (defaults to now)
    #[arg(long)]
    start: Option<String>,

    /// Session duration in seconds
    #[arg(short = 't', long, default_value_t = 10.0)]
    duration: f64,

    /// Frame rate in Hz
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Motion pattern (static, pan, nod, circle, jitter)
    #[arg(short, long, default_value = "pan")]
    motion: String,

    /// Starting azimuth of the motion in degrees
    #[arg(long, default_value_t = 180.0)]
    azimuth: f64,

    /// Starting altitude of the motion in degrees
    #[arg(long, default_value_t = 30.0)]
    altitude: f64,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Switch to touch mode halfway and fling the view
    #[arg(long)]
    fling: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    if !(args.fps > 0.0 && args.duration >= 0.0) {
        return Err("fps must be positive and duration non-negative".into());
    }

    let config = match &args.config {
        Some(path) => SkyConfig::load_from_file(path)?,
        None => SkyConfig::default(),
    };
    let start = match &args.start {
        Some(text) => OffsetDateTime::parse(text, &Rfc3339)?,
        None => OffsetDateTime::now_utc(),
    };
    let motion = TestMotions::new(args.azimuth, args.altitude)
        .get_motion(&args.motion)
        .ok_or_else(|| format!("Unknown motion type: {}", args.motion))?;

    println!("Sky Tour");
    println!("========");
    println!("Observer: lat {:.3}, lon {:.3}", args.latitude, args.longitude);
    println!("Start: {}", start.format(&Rfc3339)?);
    println!("Motion: {}", motion.description());
    println!("Duration: {} seconds at {} Hz", args.duration, args.fps);

    let catalog = create_bright_sky_catalog()?;
    let updated = catalog.refresh_positions(&create_demo_ephemeris(), start);
    log::info!("Ephemeris placed {updated} moving bodies");

    let observer = ObserverLocation::new(args.latitude, args.longitude);
    let mut view = SkyView::new(config, catalog.clone(), observer)?;
    view.set_viewport(1080.0, 1920.0);
    view.add_artwork(create_orion_artwork());
    if let Some(region) = create_orion_focus() {
        view.add_focus_region(region);
    }

    let verbose = args.verbose;
    view.register_callback(move |event| match event {
        SkyEvent::InertiaStarted { velocity } if verbose => {
            println!("  inertia started at ({:.0}, {:.0}) px/s", velocity.x, velocity.y)
        }
        SkyEvent::ModeChanged { from, to } => println!("  mode {from:?} -> {to:?}"),
        _ => {}
    });

    let duration = Duration::from_secs_f64(args.duration);
    let frame_interval = Duration::from_secs_f64(1.0 / args.fps);
    let script = if args.fling {
        let half = duration / 2;
        GestureScript::new()
            .set_mode(half, CameraMode::Touch)
            .drag(half, (300.0, 960.0), (780.0, 900.0), Duration::from_millis(120), 6)
    } else {
        GestureScript::new()
    };

    let snapshot = catalog.snapshot();
    let frames_per_second = args.fps.round().max(1.0) as usize;
    println!();
    println!("  time     az      alt     fov   visible  orion");

    let results = run_session_with_callback(
        &mut view,
        motion.as_ref(),
        &script,
        start,
        duration,
        frame_interval,
        |frame_num, frame, t| {
            if frame_num % frames_per_second != 0 {
                return;
            }
            let orion = frame
                .focus_opacity("Orion")
                .map_or_else(|| "-".to_string(), |o| format!("{o:.2}"));
            println!(
                "{:6.1}s {:7.2} {:7.2} {:6.1} {:8}  {}",
                t.as_secs_f64(),
                frame.camera.azimuth_deg,
                frame.camera.altitude_deg,
                frame.camera.fov_deg,
                frame.visible_bodies().count(),
                orion
            );
        },
    );

    println!();
    println!("Frames rendered: {}", results.frames_rendered);
    println!(
        "Artwork drawn in {} frames, skipped in {}",
        results.artwork_draws, results.artwork_skips
    );
    if let Some(camera) = results.final_camera() {
        println!(
            "Final camera: az {:.2}, alt {:.2}, fov {:.1} ({:?})",
            camera.azimuth_deg, camera.altitude_deg, camera.fov_deg, camera.mode
        );
    }

    let center_hit = view.query_tap(view.viewport().center());
    match center_hit.and_then(|hit| snapshot.get(hit.id)) {
        Some(body) => println!("At the crosshair: {} ({})", body.name, body.kind.label()),
        None => println!("At the crosshair: nothing"),
    }

    if let Some(position) = view.sky_position_at(view.viewport().center()) {
        println!(
            "Crosshair coordinates: RA {:.3}, Dec {:.3}",
            position.ra_degrees(),
            position.dec_degrees()
        );
    }

    view.shutdown();
    Ok(())
}

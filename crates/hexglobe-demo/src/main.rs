//! Headless globe runner.
//!
//! Configuration is loaded from `globe.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p hexglobe-demo -- --tiles tiles.json --frames 600`.
//! Frames are stepped on a fixed 60 Hz clock, so runs are reproducible for a
//! given seed.

mod scenario;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use hexglobe_config::{CliArgs, GlobeConfig};
use hexglobe_globe::{
    Globe, GlobeOptions, GlobeState, ManualClock, StaticFontLoader, StaticProbe, preflight,
};
use hexglobe_mesh::{Tile, parse_tiles};
use hexglobe_render::HeadlessRenderer;
use tracing::{error, info, warn};

/// Frame interval of the fixed clock.
const FRAME_MS: f64 = 1000.0 / 60.0;

const DEFAULT_FRAMES: u32 = 600;

fn load_tiles(path: Option<&Path>) -> Vec<Tile> {
    let Some(path) = path else {
        info!("No tile file given; the globe surface stays empty");
        return Vec::new();
    };
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|json| parse_tiles(&json).map_err(|e| e.to_string()));
    match parsed {
        Ok(tiles) => {
            info!(path = %path.display(), count = tiles.len(), "Loaded tiles");
            tiles
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to load tiles, continuing without");
            Vec::new()
        }
    }
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .unwrap_or_else(|| Path::new(".").to_path_buf())
            .join("hexglobe")
    });

    let mut config = GlobeConfig::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        GlobeConfig::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    hexglobe_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = preflight(&StaticProbe(true)) {
        error!(error = %e, "Environment cannot draw the globe");
        return ExitCode::FAILURE;
    }

    let tiles = load_tiles(args.tiles.as_deref());
    let (width, height) = (config.view.width, config.view.height);
    // Headless: the configured family is always considered installed.
    let mut fonts = StaticFontLoader::new([config.labels.font_family.clone()]);
    let options = GlobeOptions::new(config)
        .with_tiles(tiles)
        .with_data(scenario::intro_data());
    let clock = ManualClock::new(0.0);
    let mut globe =
        Globe::new(options, HeadlessRenderer::new(width, height)).with_clock(clock.clone());

    if let Err(e) = globe.load_fonts(&mut fonts) {
        error!(error = %e, "Globe did not start");
        return ExitCode::FAILURE;
    }
    if let Err(e) = scenario::populate(&mut globe) {
        error!(error = %e, "Failed to populate the scene");
        return ExitCode::FAILURE;
    }

    let frames = args.frames.unwrap_or(DEFAULT_FRAMES);
    for frame in 0..frames {
        globe.tick();
        clock.advance(FRAME_MS);
        if frame % 60 == 0 {
            let stats = globe.renderer().stats;
            info!(
                frame,
                nodes = stats.nodes,
                visible = stats.visible_nodes,
                pins = globe.pin_count(),
                pending = globe.pending_data(),
                trails = globe.trails().len(),
                "Frame"
            );
        }
    }

    globe.destroy(|| info!("Destroy callback fired"));
    while globe.state() == GlobeState::Destroying {
        globe.tick();
        clock.advance(FRAME_MS);
    }

    info!(
        frames = globe.renderer().stats.frames,
        run_ms = globe.total_run_ms(),
        state = ?globe.state(),
        "Globe runner finished"
    );
    ExitCode::SUCCESS
}

//! # Preloader Simulation
//!
//! Runs the preloader headless in real time: models and the font load on a
//! tokio runtime, frames go to a recording renderer, the enter button is
//! pressed as soon as it appears, and after navigation the drift scene runs
//! for a few seconds with a circling pointer.
//!
//! ```text
//! preloader_sim [config.toml]
//! RUST_LOG=aerostat=debug preloader_sim
//! ```

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use aerostat::{DriftScene, DriftStage, FrameOutcome, FrameScheduler, Preloader, PreloaderConfig, SchedulerConfig};
use aerostat_core::MonotonicClock;
use aerostat_rendering::{GlbAssetLoader, HeadlessRenderer};
use tracing_subscriber::EnvFilter;

/// Interval between simulated refreshes.
const REFRESH: Duration = Duration::from_micros(16_666);
/// Gives up if the preloader never navigates.
const MAX_PRELOADER_FRAMES: u64 = 60 * 60;
/// Length of the drift scene run.
const DRIFT_FRAMES: u64 = 60 * 5;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "Simulation failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => PreloaderConfig::load(path)?,
        None => PreloaderConfig::default(),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let handle = runtime.handle().clone();

    runtime.block_on(async move {
        let loader = Arc::new(GlbAssetLoader::new(&config.asset_root, config.decoder.clone()));
        let viewport = config.viewport.viewport();
        let drift_scene = DriftScene::new(config.drift.clone(), viewport, config.sub_seed(4));

        // === PRELOADER ===
        let mut preloader = Preloader::new(config);
        let balloon_loads = preloader.spawn_asset_loads(Arc::clone(&loader), &handle);
        preloader.spawn_font_load(&handle);

        let mut scheduler = FrameScheduler::new(
            MonotonicClock::new(),
            HeadlessRenderer::new(),
            SchedulerConfig::default(),
        );

        let mut frames = 0;
        while frames < MAX_PRELOADER_FRAMES {
            tokio::time::sleep(REFRESH).await;
            match scheduler.frame(&mut preloader) {
                FrameOutcome::Rendered(_) => frames += 1,
                FrameOutcome::Stopped => break,
            }
            if preloader.ui().button_visible && preloader.enter() {
                tracing::info!(frames, "Enter pressed by simulation");
            }
        }

        match balloon_loads.await {
            Ok(stats) => tracing::info!(
                launched = stats.launched,
                completed = stats.completed,
                peak_in_flight = stats.peak_in_flight,
                "Balloon loads finished"
            ),
            Err(error) => tracing::warn!(%error, "Balloon loader task failed"),
        }

        let preloader_stats = scheduler.stats();
        let render_stats = scheduler.renderer().stats();
        println!("preloader: {frames} frames, navigated to {:?}", preloader.ui().navigated_to);
        println!(
            "  worst frame {}us, {} over budget, {:.0} bytes uploaded per frame",
            preloader_stats.worst_frame_us,
            preloader_stats.frames_over_budget,
            render_stats.bytes_per_frame()
        );

        // === DRIFT SCENE ===
        let mut drift = DriftStage::new(drift_scene);
        drift.spawn_loads(loader, &handle);
        let mut scheduler = FrameScheduler::new(
            MonotonicClock::new(),
            HeadlessRenderer::new(),
            SchedulerConfig::default(),
        );
        let center = (viewport.width * 0.5, viewport.height * 0.5);
        for frame in 0..DRIFT_FRAMES {
            tokio::time::sleep(REFRESH).await;
            let angle = frame as f32 * 0.05;
            drift.pointer_moved(
                center.0 + angle.cos() * viewport.width * 0.25,
                center.1 + angle.sin() * viewport.height * 0.25,
            );
            scheduler.frame(&mut drift);
        }
        drift.stop();

        let follower = drift.scene().follower();
        println!(
            "drift: {} frames, follower at ({:.2}, {:.2})",
            scheduler.stats().total_frames,
            follower.position.x,
            follower.position.y
        );
    });

    Ok(())
}

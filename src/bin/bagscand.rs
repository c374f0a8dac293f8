//! bagscand - bag detection daemon.
//!
//! This daemon:
//! 1. Loads configuration (defaults, optional JSON file, env overrides)
//! 2. Opens the camera source and starts the pipeline controller
//! 3. Runs one capture-and-process cycle per frame period (~33ms at 30 fps)
//! 4. Logs a results line and the recommendation list for every gated
//!    detection cycle
//!
//! There is no GUI; the detection results land in the log. Ctrl-C stops the
//! loop, which stops the controller and releases the camera.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use bagscan::{DetectorConfig, PipelineController};

#[derive(Parser, Debug)]
#[command(name = "bagscand", version, about = "Heuristic bag detection daemon")]
struct Args {
    /// JSON configuration file.
    #[arg(long, env = "BAGSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Camera device node, index, or "stub://" for the synthetic source.
    #[arg(long, env = "BAGSCAN_DEVICE")]
    device: Option<String>,

    /// Stop after this many captured frames (0 = run until Ctrl-C).
    #[arg(long, default_value_t = 0)]
    max_frames: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config =
        DetectorConfig::load_from(args.config.as_deref()).context("load configuration")?;
    if let Some(device) = args.device {
        config.camera.device = device;
    }

    let period = config.camera.frame_period();
    let mut controller = PipelineController::new(config.clone()).context("open camera source")?;
    controller
        .start()
        .context("cannot access camera; check the connection and device path")?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            stop.store(true, Ordering::SeqCst);
        })
        .context("install Ctrl-C handler")?;
    }

    log::info!(
        "bagscand running: device={} period={}ms",
        config.camera.device,
        period.as_millis()
    );

    let mut last_health_log = Instant::now();
    while !stop.load(Ordering::SeqCst) {
        let cycle_start = Instant::now();

        if let Some(output) = controller.tick() {
            if let Some(summary) = output.summary {
                log::info!(
                    "result: type={} confidence={:.1}% objects={}",
                    summary.best.category.label(),
                    summary.best.confidence * 100.0,
                    summary.total
                );
                for product in summary.recommendations {
                    log::info!("  recommend: {} - ${}", product.name, product.price_usd);
                }
            }
        }

        if last_health_log.elapsed() >= Duration::from_secs(5) {
            let stats = controller.source_stats();
            log::info!(
                "camera health={} frames={} device={}",
                controller.source_healthy(),
                stats.frames_captured,
                stats.device
            );
            last_health_log = Instant::now();
        }

        if args.max_frames > 0 && controller.frame_count() >= args.max_frames {
            break;
        }

        // Fixed-period scheduling: sleep out the remainder of the frame slot.
        let elapsed = cycle_start.elapsed();
        if elapsed < period {
            std::thread::sleep(period - elapsed);
        }
    }

    controller.stop();
    let stats = controller.source_stats();
    log::info!("bagscand exiting: {} frames captured", stats.frames_captured);
    Ok(())
}

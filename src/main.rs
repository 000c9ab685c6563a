//! Burst Capture CLI
//!
//! Runs one burst against a mock camera, exercising the full facade:
//! camera attach, preview consumer setup, frame distributor, burst
//! start/stop, and session persistence.

use burst_capture::{
    capture::{lock, share, FramePump, MockCamera},
    session::FileCaptureSession,
    BurstController, BurstFacade, CaptureSession, FileConfig, SurfaceTexture,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "burst-capture", version, about = "Capture a burst from a mock camera")]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Burst length in captured frames.
    #[arg(short, long, default_value_t = 15)]
    frames: u32,

    /// Directory for intermediate burst files.
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// Directory finished bursts are moved into.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Preview size as WIDTHxHEIGHT.
    #[arg(long, value_parser = parse_size)]
    preview: Option<(u32, u32)>,
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width: u32 = width.trim().parse().map_err(|e| format!("width: {e}"))?;
    let height: u32 = height.trim().parse().map_err(|e| format!("height: {e}"))?;
    if width == 0 || height == 0 {
        return Err("preview size must be non-zero".to_string());
    }
    Ok((width, height))
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Burst Capture v{}", burst_capture::VERSION);

    let mut config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };
    if let Some(dir) = args.temp_dir {
        config.output.temp_dir = dir;
    }
    if let Some(dir) = args.output_dir {
        config.output.output_dir = dir;
    }
    if let Some((width, height)) = args.preview {
        config.preview.width = width;
        config.preview.height = height;
    }

    let camera = match MockCamera::opened(&config.capture) {
        Ok(camera) => share(camera),
        Err(e) => {
            eprintln!("Failed to open camera: {}", e);
            std::process::exit(1);
        }
    };

    let mut controller = BurstController::from_config(&config);

    #[cfg(feature = "metrics")]
    let metrics = start_metrics(config.output.metrics_port);

    // Viewfinder surface; nothing drains it here, so it keeps the newest frames.
    let display = SurfaceTexture::new(config.preview.width, config.preview.height, 2);
    controller.set_surface_texture(display.clone(), config.preview.width, config.preview.height);
    if let Err(e) =
        controller.initialize_surface_texture_consumer(config.preview.width, config.preview.height)
    {
        warn!("Preview disabled: {}", e);
    }
    controller.update_preview_buffer_size(config.capture.width, config.capture.height);
    controller.on_camera_attached(camera.clone());

    if let Err(e) = controller.initialize_and_start_frame_distributor() {
        eprintln!("Failed to start frame distributor: {}", e);
        std::process::exit(1);
    }
    let Some(input) = controller.input_surface_texture() else {
        eprintln!("Frame distributor has no input surface");
        std::process::exit(1);
    };

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = Arc::clone(&interrupted);
        if let Err(e) = ctrlc::set_handler(move || interrupted.store(true, Ordering::SeqCst)) {
            warn!("Failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut pump = match FramePump::start(camera.clone(), input, config.capture.fps) {
        Ok(pump) => pump,
        Err(e) => {
            eprintln!("Failed to start frame pump: {}", e);
            std::process::exit(1);
        }
    };

    let session = FileCaptureSession::timestamped(&config.output.output_dir);
    info!("Starting burst '{}'", session.title());
    if let Err(e) = controller.start_burst(Box::new(session), &config.output.temp_dir) {
        eprintln!("Failed to start burst: {}", e);
        std::process::exit(1);
    }

    let duration = Duration::from_secs(1) * args.frames.max(1) / config.capture.fps.max(1);
    let deadline = Instant::now() + duration;
    while Instant::now() < deadline && !interrupted.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(10));
        #[cfg(feature = "metrics")]
        publish_metrics(metrics.as_ref(), &controller);
    }
    if interrupted.load(Ordering::SeqCst) {
        warn!("Interrupted, stopping burst early");
    }

    let stopped = controller.stop_burst();
    pump.stop();
    controller.close_frame_distributor();
    controller.on_camera_detached();
    lock(&camera).close();

    let stats = controller.stats();
    #[cfg(feature = "metrics")]
    publish_metrics(metrics.as_ref(), &controller);

    info!(
        "Burst stopped={}: {} frames distributed, {} saved, {} evicted, {} preview frames",
        stopped,
        stats.frames_distributed,
        stats.frames_saved,
        stats.frames_evicted,
        controller.preview_frames_rendered().unwrap_or(0)
    );

    if stats.bursts_completed == 0 {
        eprintln!("Burst did not complete");
        std::process::exit(1);
    }
    println!(
        "Saved {} frames to {}",
        stats.frames_saved,
        config.output.output_dir.display()
    );
}

#[cfg(feature = "metrics")]
type SharedMetrics = Arc<tokio::sync::RwLock<burst_capture::metrics::MetricsState>>;

#[cfg(feature = "metrics")]
fn start_metrics(port: u16) -> Option<SharedMetrics> {
    use burst_capture::metrics::{MetricsRegistry, MetricsServer, MetricsServerConfig};

    if port == 0 {
        return None;
    }
    let registry = match MetricsRegistry::new() {
        Ok(registry) => registry,
        Err(e) => {
            warn!("Metrics disabled: {}", e);
            return None;
        }
    };
    let server = MetricsServer::new(MetricsServerConfig::with_port(port), registry);
    let state = server.state();
    match server.spawn() {
        Ok(_) => Some(state),
        Err(e) => {
            warn!("Metrics server failed to start: {}", e);
            None
        }
    }
}

/// Pushes the controller's current counters to the exporter.
#[cfg(feature = "metrics")]
fn publish_metrics(metrics: Option<&SharedMetrics>, controller: &BurstController) {
    if let Some(state) = metrics {
        state
            .blocking_read()
            .update(&burst_capture::metrics::MetricsSnapshot::from_stats(&controller.stats()));
    }
}

#[cfg(all(test, feature = "metrics"))]
mod tests {
    use super::*;
    use burst_capture::metrics::{MetricsRegistry, MetricsServer, MetricsServerConfig};

    #[test]
    fn test_metrics_reflect_running_distributor() {
        let server = MetricsServer::new(
            MetricsServerConfig::with_port(0),
            MetricsRegistry::new().unwrap(),
        );
        let state = server.state();
        let mut controller = BurstController::from_config(&FileConfig::default());
        controller.initialize_and_start_frame_distributor().unwrap();

        publish_metrics(Some(&state), &controller);
        let output = state.blocking_read().encode().unwrap();
        assert!(output.contains("burst_capture_distributor_running 1"));

        controller.close_frame_distributor();
        publish_metrics(Some(&state), &controller);
        let output = state.blocking_read().encode().unwrap();
        assert!(output.contains("burst_capture_distributor_running 0"));
    }
}

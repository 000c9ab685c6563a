//! Background thread feeding camera frames into a surface texture.

use super::camera::{lock, SharedCamera};
use crate::surface::SurfaceTexture;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Moves frames from a camera into a surface at a fixed rate.
///
/// The pump stops when [`stop`](FramePump::stop) is called, when it is
/// dropped, or when the target surface is released.
pub struct FramePump {
    running: Arc<AtomicBool>,
    pumped: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl FramePump {
    /// Starts pumping frames at `fps` frames per second.
    pub fn start(camera: SharedCamera, surface: SurfaceTexture, fps: u32) -> std::io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let pumped = Arc::new(AtomicU64::new(0));
        let interval = Duration::from_secs(1) / fps.max(1);

        let handle = {
            let running = Arc::clone(&running);
            let pumped = Arc::clone(&pumped);
            std::thread::Builder::new()
                .name("frame-pump".into())
                .spawn(move || run(camera, surface, interval, running, pumped))?
        };

        Ok(Self {
            running,
            pumped,
            handle: Some(handle),
        })
    }

    /// Frames successfully queued so far.
    pub fn frames_pumped(&self) -> u64 {
        self.pumped.load(Ordering::Relaxed)
    }

    /// Whether the pump thread is still moving frames.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stops the pump and waits for its thread to exit.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("frame pump thread panicked");
            }
        }
    }
}

impl Drop for FramePump {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    camera: SharedCamera,
    surface: SurfaceTexture,
    interval: Duration,
    running: Arc<AtomicBool>,
    pumped: Arc<AtomicU64>,
) {
    tracing::debug!(surface = surface.id(), ?interval, "frame pump started");

    while running.load(Ordering::Acquire) {
        let started = Instant::now();

        let captured = lock(&camera).capture();
        match captured {
            Ok(frame) => {
                if surface.queue_frame(frame).is_err() {
                    tracing::debug!(surface = surface.id(), "target surface released, pump exiting");
                    break;
                }
                pumped.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => tracing::warn!(error = %e, "frame capture failed"),
        }

        if let Some(remaining) = interval.checked_sub(started.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    running.store(false, Ordering::Release);
    tracing::debug!(frames = pumped.load(Ordering::Relaxed), "frame pump stopped");
}

//! Camera abstraction for frame capture.
//!
//! The burst controller never owns a camera. It holds a [`SharedCamera`]
//! reference between attach and detach and uses it to switch the device in
//! and out of burst mode.

use super::{CaptureConfig, Frame};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    /// No device matches the requested id.
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),
    /// The device could not be opened.
    #[error("failed to open camera: {0}")]
    OpenFailed(String),
    /// The device rejected a setting.
    #[error("failed to configure camera: {0}")]
    ConfigFailed(String),
    /// Reading a frame failed.
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    /// The camera has not been opened.
    #[error("camera not initialized")]
    NotInitialized,
}

/// Trait for camera implementations.
pub trait Camera {
    /// Opens and initializes the camera with the given configuration.
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError>;

    /// Captures a single frame.
    fn capture(&mut self) -> Result<Frame, CameraError>;

    /// Checks if the camera is currently open.
    fn is_open(&self) -> bool;

    /// Switches burst mode on or off.
    ///
    /// In burst mode the device keeps exposure and focus locked so that
    /// consecutive frames are comparable.
    fn set_burst_mode(&mut self, enabled: bool) -> Result<(), CameraError>;

    /// Returns whether burst mode is on.
    fn burst_mode(&self) -> bool;

    /// Closes the camera and releases resources.
    fn close(&mut self);
}

/// Camera reference handed to the burst controller.
pub type SharedCamera = Arc<Mutex<dyn Camera + Send>>;

/// Wraps a camera into a [`SharedCamera`].
pub fn share<C: Camera + Send + 'static>(camera: C) -> SharedCamera {
    Arc::new(Mutex::new(camera))
}

/// Locks a shared camera, recovering from a poisoned lock.
pub fn lock(camera: &SharedCamera) -> MutexGuard<'_, dyn Camera + Send + 'static> {
    camera.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("camera lock poisoned, recovering");
        poisoned.into_inner()
    })
}

/// Mock camera that generates synthetic gradient frames.
#[derive(Debug, Default)]
pub struct MockCamera {
    config: Option<CaptureConfig>,
    sequence: u64,
    burst_mode: bool,
    reject_burst_mode: bool,
}

impl MockCamera {
    /// Creates a closed mock camera.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a camera that is already open with `config`.
    pub fn opened(config: &CaptureConfig) -> Result<Self, CameraError> {
        let mut camera = Self::new();
        camera.open(config)?;
        Ok(camera)
    }

    /// Makes every `set_burst_mode(true)` call fail.
    pub fn rejecting_burst_mode(mut self) -> Self {
        self.reject_burst_mode = true;
        self
    }
}

impl Camera for MockCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;
        self.config = Some(config.clone());
        self.sequence = 0;
        tracing::info!(
            width = config.width,
            height = config.height,
            fps = config.fps,
            "MockCamera opened"
        );
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let config = self.config.as_ref().ok_or(CameraError::NotInitialized)?;

        // Diagonal gradient shifted by the sequence number so that
        // consecutive frames differ.
        let width = config.width as u64;
        let pixel_count = (config.width * config.height) as u64;
        let pixels: Vec<u8> = (0..pixel_count)
            .map(|i| ((i % width + i / width + self.sequence) % 256) as u8)
            .collect();

        self.sequence += 1;
        Ok(Frame::new(pixels, config.width, config.height, self.sequence))
    }

    fn is_open(&self) -> bool {
        self.config.is_some()
    }

    fn set_burst_mode(&mut self, enabled: bool) -> Result<(), CameraError> {
        if !self.is_open() {
            return Err(CameraError::NotInitialized);
        }
        if enabled && self.reject_burst_mode {
            return Err(CameraError::ConfigFailed(
                "burst mode not supported".to_string(),
            ));
        }
        self.burst_mode = enabled;
        tracing::debug!(enabled, "MockCamera burst mode changed");
        Ok(())
    }

    fn burst_mode(&self) -> bool {
        self.burst_mode
    }

    fn close(&mut self) {
        self.config = None;
        self.burst_mode = false;
        tracing::info!("MockCamera closed");
    }
}

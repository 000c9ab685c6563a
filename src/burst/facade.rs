//! The burst facade: a narrow interface over [`BurstController`].
//!
//! [`BurstController`]: super::BurstController

use super::BurstError;
use crate::capture::SharedCamera;
use crate::session::CaptureSession;
use crate::surface::SurfaceTexture;
use std::path::Path;

/// Simplified interface for driving bursts and the frame pipeline that
/// feeds them.
///
/// The expected call order for the pipeline is: [`set_surface_texture`],
/// [`initialize_surface_texture_consumer`],
/// [`initialize_and_start_frame_distributor`], any number of resize
/// calls, then [`close_frame_distributor`].
///
/// [`set_surface_texture`]: BurstFacade::set_surface_texture
/// [`initialize_surface_texture_consumer`]: BurstFacade::initialize_surface_texture_consumer
/// [`initialize_and_start_frame_distributor`]: BurstFacade::initialize_and_start_frame_distributor
/// [`close_frame_distributor`]: BurstFacade::close_frame_distributor
pub trait BurstFacade {
    /// Called when a camera becomes available.
    fn on_camera_attached(&mut self, camera: SharedCamera);

    /// Called when the camera becomes unavailable. A running burst is
    /// aborted and its session fails.
    fn on_camera_detached(&mut self);

    /// Starts a burst writing its intermediate files into `temp_dir`.
    fn start_burst(
        &mut self,
        session: Box<dyn CaptureSession>,
        temp_dir: &Path,
    ) -> Result<(), BurstError>;

    /// Whether another burst can be started.
    fn is_ready(&self) -> bool;

    /// Stops the burst. Returns false if no burst was running.
    fn stop_burst(&mut self) -> bool;

    /// Sets the surface the preview consumer renders into.
    fn set_surface_texture(&mut self, texture: SurfaceTexture, width: u32, height: u32);

    /// Initializes the preview consumer with the current surface texture.
    fn initialize_surface_texture_consumer(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<(), BurstError>;

    /// Initializes the preview consumer with the given surface texture.
    fn initialize_surface_texture_consumer_with(
        &mut self,
        texture: SurfaceTexture,
        width: u32,
        height: u32,
    ) -> Result<(), BurstError>;

    /// Updates the size of the input buffer.
    fn update_preview_buffer_size(&mut self, width: u32, height: u32);

    /// Creates a fresh input surface and starts distributing its frames.
    fn initialize_and_start_frame_distributor(&mut self) -> Result<(), BurstError>;

    /// Stops the frame distributor and releases its input surface.
    fn close_frame_distributor(&mut self);

    /// The distributor's input surface, or `None` before initialization
    /// and after close.
    fn input_surface_texture(&self) -> Option<SurfaceTexture>;

    /// Sets the output size (in pixels) of the preview consumer.
    fn set_preview_consumer_size(&mut self, width: u32, height: u32);
}

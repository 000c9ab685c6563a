//! Preview consumer rendering distributed frames onto a display surface.

use super::FrameConsumer;
use crate::capture::Frame;
use crate::surface::SurfaceTexture;
use image::imageops::{self, FilterType};

/// Scales every frame to the preview size and queues it on the display
/// surface.
#[derive(Debug)]
pub struct PreviewConsumer {
    output: SurfaceTexture,
    width: u32,
    height: u32,
    rendered: u64,
    skipped: u64,
}

impl PreviewConsumer {
    /// Creates a consumer rendering `width`x`height` frames onto `output`.
    pub fn new(output: SurfaceTexture, width: u32, height: u32) -> Self {
        Self {
            output,
            width: width.max(1),
            height: height.max(1),
            rendered: 0,
            skipped: 0,
        }
    }

    /// Changes the size of subsequently rendered frames.
    pub fn set_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            tracing::warn!(width, height, "ignoring empty preview size");
            return;
        }
        self.width = width;
        self.height = height;
        tracing::debug!(width, height, "preview size changed");
    }

    /// Redirects subsequent frames to another display surface.
    pub fn set_output(&mut self, output: SurfaceTexture) {
        tracing::debug!(from = self.output.id(), to = output.id(), "preview surface changed");
        self.output = output;
    }

    /// Current output size.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Display surface frames are queued on.
    pub fn output(&self) -> &SurfaceTexture {
        &self.output
    }

    /// Frames queued on the display surface.
    pub fn frames_rendered(&self) -> u64 {
        self.rendered
    }

    /// Frames that were malformed or could not be queued.
    pub fn frames_skipped(&self) -> u64 {
        self.skipped
    }

    fn render(&self, frame: &Frame) -> Option<Frame> {
        if !frame.is_valid() {
            return None;
        }
        if frame.dimensions() == (self.width, self.height) {
            return Some(frame.clone());
        }
        let source = frame.to_gray_image()?;
        let scaled = imageops::resize(&source, self.width, self.height, FilterType::Nearest);
        Some(Frame::from_gray_image(scaled, frame.sequence()))
    }
}

impl FrameConsumer for PreviewConsumer {
    fn on_start(&mut self) {
        tracing::debug!(
            surface = self.output.id(),
            width = self.width,
            height = self.height,
            "preview consumer started"
        );
    }

    fn on_new_frame(&mut self, frame: &Frame) {
        let Some(rendered) = self.render(frame) else {
            tracing::debug!(sequence = frame.sequence(), "skipping malformed frame");
            self.skipped += 1;
            return;
        };
        match self.output.queue_frame(rendered) {
            Ok(()) => self.rendered += 1,
            Err(e) => {
                tracing::debug!(error = %e, "preview frame not delivered");
                self.skipped += 1;
            }
        }
    }

    fn on_stop(&mut self) {
        tracing::debug!(
            rendered = self.rendered,
            skipped = self.skipped,
            "preview consumer stopped"
        );
    }
}

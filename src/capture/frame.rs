//! Frame type shared by every stage of the pipeline.

use image::GrayImage;
use std::sync::Arc;
use std::time::Instant;

/// A single grayscale frame produced by a camera.
///
/// Pixel data sits behind an `Arc` so that the distributor can hand the
/// same frame to the preview and burst consumers without copying.
#[derive(Clone)]
pub struct Frame {
    pixels: Arc<[u8]>,
    width: u32,
    height: u32,
    timestamp: Instant,
    /// Monotonic sequence number assigned by the producer.
    sequence: u64,
}

impl Frame {
    /// Creates a new frame stamped with the current instant.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self {
            pixels: pixels.into(),
            width,
            height,
            timestamp: Instant::now(),
            sequence,
        }
    }

    /// Builds a frame from an 8-bit grayscale image.
    pub fn from_gray_image(image: GrayImage, sequence: u64) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, sequence)
    }

    /// Row-major 8-bit grayscale pixels.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width and height.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// When the frame was captured.
    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Capture sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Validates that the pixel buffer size matches dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == self.pixel_count()
    }

    /// Copies the pixels into an image buffer.
    ///
    /// Returns `None` when the frame is not valid.
    pub fn to_gray_image(&self) -> Option<GrayImage> {
        GrayImage::from_raw(self.width, self.height, self.pixels.to_vec())
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sequence", &self.sequence)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}

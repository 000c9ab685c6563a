//! Frame consumer feeding the burst buffer.

use super::BurstBuffer;
use crate::capture::Frame;
use crate::distributor::FrameConsumer;

/// Buffers distributed frames while armed and ignores them otherwise.
#[derive(Debug)]
pub struct BurstConsumer {
    buffer: BurstBuffer,
    armed: bool,
    captured_total: u64,
    evicted_total: u64,
}

impl BurstConsumer {
    /// Creates a disarmed consumer keeping at most `max_frames`.
    pub fn new(max_frames: usize) -> Self {
        Self {
            buffer: BurstBuffer::new(max_frames),
            armed: false,
            captured_total: 0,
            evicted_total: 0,
        }
    }

    /// Starts buffering into an empty buffer.
    pub fn arm(&mut self) {
        self.buffer.clear();
        self.armed = true;
    }

    /// Stops buffering and hands back the buffered frames.
    pub fn disarm(&mut self) -> Vec<Frame> {
        self.armed = false;
        self.buffer.drain()
    }

    /// Whether frames are currently buffered.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Frames currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Frames buffered across all bursts.
    pub fn captured_total(&self) -> u64 {
        self.captured_total
    }

    /// Frames evicted across all bursts.
    pub fn evicted_total(&self) -> u64 {
        self.evicted_total
    }
}

impl FrameConsumer for BurstConsumer {
    fn on_new_frame(&mut self, frame: &Frame) {
        if !self.armed {
            return;
        }
        self.captured_total += 1;
        if let Some(evicted) = self.buffer.push(frame.clone()) {
            self.evicted_total += 1;
            tracing::trace!(sequence = evicted.sequence(), "burst buffer full, evicted frame");
        }
    }

    fn on_stop(&mut self) {
        if self.armed {
            tracing::debug!(
                buffered = self.buffer.len(),
                "frame source stopped during burst"
            );
        }
    }
}

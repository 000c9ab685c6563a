//! Bounded frame buffer holding the frames of the running burst.

use crate::capture::Frame;
use std::collections::VecDeque;

/// FIFO of burst frames that evicts the oldest frame when full.
///
/// Since the last [`clear`](Self::clear): `evicted() + len() == pushed()`.
#[derive(Debug)]
pub struct BurstBuffer {
    frames: VecDeque<Frame>,
    capacity: usize,
    pushed: u64,
    evicted: u64,
}

impl BurstBuffer {
    /// Creates a buffer. A zero `capacity` is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
            pushed: 0,
            evicted: 0,
        }
    }

    /// Appends a frame, returning the evicted frame if the buffer was full.
    pub fn push(&mut self, frame: Frame) -> Option<Frame> {
        let evicted = if self.frames.len() == self.capacity {
            self.evicted += 1;
            self.frames.pop_front()
        } else {
            None
        };
        self.frames.push_back(frame);
        self.pushed += 1;
        evicted
    }

    /// Removes and returns all frames in arrival order.
    pub fn drain(&mut self) -> Vec<Frame> {
        self.frames.drain(..).collect()
    }

    /// Empties the buffer and resets the counters.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.pushed = 0;
        self.evicted = 0;
    }

    /// Frames currently held.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no frame is held.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Maximum number of frames held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Frames pushed since creation.
    pub fn pushed(&self) -> u64 {
        self.pushed
    }

    /// Frames evicted since creation.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}

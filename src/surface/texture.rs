//! Bounded frame queue standing in for a GPU surface texture.

use crate::capture::Frame;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Errors raised by surface texture operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// The surface with this id was released.
    #[error("surface texture {0} has been released")]
    Released(u64),
    /// A width or height of zero.
    #[error("invalid buffer size {width}x{height}")]
    InvalidSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

struct Inner {
    id: u64,
    size: Mutex<(u32, u32)>,
    tx: Sender<Frame>,
    rx: Receiver<Frame>,
    released: AtomicBool,
    queued: AtomicU64,
    dropped: AtomicU64,
}

/// A frame source/sink with a default buffer size.
///
/// Clones share the same queue. Producers call [`queue_frame`], a single
/// consumer calls [`acquire_frame`]. When the queue is full the oldest
/// pending frame is discarded so the consumer always sees recent frames.
///
/// [`queue_frame`]: SurfaceTexture::queue_frame
/// [`acquire_frame`]: SurfaceTexture::acquire_frame
#[derive(Clone)]
pub struct SurfaceTexture {
    inner: Arc<Inner>,
}

impl SurfaceTexture {
    /// Creates a surface with the given default buffer size and queue depth.
    ///
    /// A zero `capacity` is raised to one.
    pub fn new(width: u32, height: u32, capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(id, width, height, "surface texture created");

        Self {
            inner: Arc::new(Inner {
                id,
                size: Mutex::new((width, height)),
                tx,
                rx,
                released: AtomicBool::new(false),
                queued: AtomicU64::new(0),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Unique identifier of the underlying surface.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Returns the default buffer size as `(width, height)`.
    pub fn default_buffer_size(&self) -> (u32, u32) {
        *self
            .inner
            .size
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Changes the size producers should render at.
    pub fn set_default_buffer_size(&self, width: u32, height: u32) -> Result<(), SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::InvalidSize { width, height });
        }
        *self
            .inner
            .size
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = (width, height);
        tracing::debug!(id = self.inner.id, width, height, "default buffer size updated");
        Ok(())
    }

    /// Queues a frame for the consumer, evicting the oldest pending frame
    /// if the queue is full.
    pub fn queue_frame(&self, frame: Frame) -> Result<(), SurfaceError> {
        if self.is_released() {
            return Err(SurfaceError::Released(self.inner.id));
        }

        let mut pending = frame;
        loop {
            match self.inner.tx.try_send(pending) {
                Ok(()) => {
                    self.inner.queued.fetch_add(1, Ordering::Relaxed);
                    return Ok(());
                }
                Err(TrySendError::Full(back)) => {
                    if self.inner.rx.try_recv().is_ok() {
                        self.inner.dropped.fetch_add(1, Ordering::Relaxed);
                        tracing::trace!(id = self.inner.id, "surface queue full, dropped oldest frame");
                    }
                    pending = back;
                }
                // Both ends live in `inner`, so the channel cannot disconnect.
                Err(TrySendError::Disconnected(_)) => {
                    return Err(SurfaceError::Released(self.inner.id));
                }
            }
        }
    }

    /// Waits up to `timeout` for the next frame.
    pub fn acquire_frame(&self, timeout: Duration) -> Option<Frame> {
        match self.inner.rx.recv_timeout(timeout) {
            Ok(frame) => Some(frame),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Returns a pending frame without waiting.
    pub fn try_acquire_frame(&self) -> Option<Frame> {
        self.inner.rx.try_recv().ok()
    }

    /// Number of frames waiting to be acquired.
    pub fn pending(&self) -> usize {
        self.inner.rx.len()
    }

    /// Releases the surface. Later `queue_frame` calls fail and pending
    /// frames are discarded.
    pub fn release(&self) {
        if !self.inner.released.swap(true, Ordering::AcqRel) {
            let discarded = self.inner.rx.try_iter().count();
            tracing::debug!(id = self.inner.id, discarded, "surface texture released");
        }
    }

    /// Whether `release` has been called.
    pub fn is_released(&self) -> bool {
        self.inner.released.load(Ordering::Acquire)
    }

    /// Total frames accepted by [`queue_frame`](Self::queue_frame).
    pub fn frames_queued(&self) -> u64 {
        self.inner.queued.load(Ordering::Relaxed)
    }

    /// Frames evicted because the queue was full.
    pub fn frames_dropped(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    /// Returns true if both handles refer to the same surface.
    pub fn same_surface(&self, other: &SurfaceTexture) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for SurfaceTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceTexture")
            .field("id", &self.inner.id)
            .field("size", &self.default_buffer_size())
            .field("pending", &self.pending())
            .field("released", &self.is_released())
            .finish()
    }
}

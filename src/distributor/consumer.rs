//! Frame consumer seam.

use crate::capture::Frame;
use std::sync::{Arc, Mutex, MutexGuard};

/// A sink receiving frames from the [`FrameDistributor`].
///
/// Callbacks run on the distributor's worker thread.
///
/// [`FrameDistributor`]: super::FrameDistributor
pub trait FrameConsumer {
    /// Called once before the first frame.
    fn on_start(&mut self) {}

    /// Called for every distributed frame.
    fn on_new_frame(&mut self, frame: &Frame);

    /// Called once after the last frame.
    fn on_stop(&mut self) {}
}

/// Consumer handle shared between its owner and the distributor.
pub type SharedConsumer = Arc<Mutex<dyn FrameConsumer + Send>>;

/// Locks a consumer, recovering from a poisoned lock.
pub(crate) fn lock_consumer<T: ?Sized>(consumer: &Mutex<T>) -> MutexGuard<'_, T> {
    consumer.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("frame consumer lock poisoned, recovering");
        poisoned.into_inner()
    })
}

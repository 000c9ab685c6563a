use crate::capture::CameraError;
use crate::distributor::DistributorError;
use thiserror::Error;

/// Errors reported by [`BurstFacade`](super::BurstFacade) operations.
#[derive(Debug, Error)]
pub enum BurstError {
    /// `start_burst` called while a burst runs.
    #[error("a burst is already in progress")]
    BurstInProgress,
    /// No camera is attached.
    #[error("no camera attached")]
    CameraUnavailable,
    /// The frame distributor has not been started.
    #[error("frame distributor is not running")]
    DistributorNotRunning,
    /// No display surface was set.
    #[error("no surface texture has been set")]
    NoSurfaceTexture,
    /// A width or height of zero.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// The camera refused a request.
    #[error("camera error: {0}")]
    Camera(#[from] CameraError),
    /// A distributor transition failed.
    #[error("distributor error: {0}")]
    Distributor(#[from] DistributorError),
    /// The temp directory could not be prepared.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<(), BurstError> {
    if width == 0 || height == 0 {
        return Err(BurstError::InvalidDimensions { width, height });
    }
    Ok(())
}

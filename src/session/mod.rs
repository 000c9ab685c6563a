//! Capture sessions: the destination of a burst's output.
//!
//! A session is created by the caller before a burst starts and handed to
//! the burst controller, which reports progress and artifacts to it and
//! finishes it exactly once when the burst ends.

mod file;

pub use file::FileCaptureSession;

use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors raised while finishing a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// `finish` called on a session that already ended.
    #[error("session already finished")]
    AlreadyFinished,
    /// An artifact could not be moved into the output directory.
    #[error("failed to persist {path}: {source}")]
    Persist {
        /// Artifact or directory that failed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting progress and artifacts.
    Active,
    /// Output persisted.
    Finished,
    /// Ended without usable output.
    Failed(String),
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Finished => f.write_str("finished"),
            Self::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

/// One user-initiated capture request and its output destination.
pub trait CaptureSession: Send {
    /// Human readable name of the capture.
    fn title(&self) -> &str;

    /// Reports progress in percent (clamped to 100).
    fn update_progress(&mut self, percent: u8);

    /// Registers an intermediate file produced for this session.
    fn add_artifact(&mut self, path: &Path);

    /// Persists the registered artifacts.
    fn finish(&mut self) -> Result<(), SessionError>;

    /// Ends the session without output.
    fn finish_with_failure(&mut self, reason: &str);

    /// Current lifecycle state.
    fn state(&self) -> SessionState;
}

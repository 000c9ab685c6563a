//! Capture session persisting artifacts into an output directory.

use super::{CaptureSession, SessionError, SessionState};
use chrono::Local;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Moves a burst's artifacts into `output_dir` when finished.
#[derive(Debug)]
pub struct FileCaptureSession {
    title: String,
    output_dir: PathBuf,
    artifacts: Vec<PathBuf>,
    persisted: Vec<PathBuf>,
    progress: u8,
    state: SessionState,
}

impl FileCaptureSession {
    /// Creates an active session persisting into `output_dir`.
    pub fn new(title: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            output_dir: output_dir.into(),
            artifacts: Vec::new(),
            persisted: Vec::new(),
            progress: 0,
            state: SessionState::Active,
        }
    }

    /// Creates a session titled after the local time, e.g. `BURST_20240101_120000`.
    pub fn timestamped(output_dir: impl Into<PathBuf>) -> Self {
        let title = Local::now().format("BURST_%Y%m%d_%H%M%S").to_string();
        Self::new(title, output_dir)
    }

    /// Directory artifacts are moved into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Last reported progress in percent.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Artifacts registered so far.
    pub fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }

    /// Final locations of the artifacts after a successful finish.
    pub fn persisted(&self) -> &[PathBuf] {
        &self.persisted
    }

    fn persist_all(&mut self) -> Result<(), SessionError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| SessionError::Persist {
            path: self.output_dir.display().to_string(),
            source,
        })?;

        for artifact in &self.artifacts {
            let target = match artifact.file_name() {
                Some(name) => self.output_dir.join(name),
                None => {
                    return Err(SessionError::Persist {
                        path: artifact.display().to_string(),
                        source: io::Error::new(io::ErrorKind::InvalidInput, "artifact has no file name"),
                    })
                }
            };
            if target.exists() {
                return Err(SessionError::Persist {
                    path: target.display().to_string(),
                    source: io::Error::new(io::ErrorKind::AlreadyExists, "target already exists"),
                });
            }
            move_file(artifact, &target).map_err(|source| SessionError::Persist {
                path: artifact.display().to_string(),
                source,
            })?;
            self.persisted.push(target);
        }
        Ok(())
    }
}

/// Renames `from` to `to`, copying when they sit on different filesystems.
/// Callers check that `to` does not exist.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}

impl CaptureSession for FileCaptureSession {
    fn title(&self) -> &str {
        &self.title
    }

    fn update_progress(&mut self, percent: u8) {
        self.progress = percent.min(100);
        tracing::trace!(title = %self.title, progress = self.progress, "session progress");
    }

    fn add_artifact(&mut self, path: &Path) {
        self.artifacts.push(path.to_path_buf());
    }

    fn finish(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Active {
            return Err(SessionError::AlreadyFinished);
        }

        match self.persist_all() {
            Ok(()) => {
                self.progress = 100;
                self.state = SessionState::Finished;
                tracing::info!(
                    title = %self.title,
                    artifacts = self.persisted.len(),
                    output = %self.output_dir.display(),
                    "capture session finished"
                );
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    fn finish_with_failure(&mut self, reason: &str) {
        if self.state != SessionState::Active {
            tracing::warn!(title = %self.title, state = %self.state, "session already finished");
            return;
        }
        self.state = SessionState::Failed(reason.to_string());
        tracing::warn!(title = %self.title, reason, "capture session failed");
    }

    fn state(&self) -> SessionState {
        self.state.clone()
    }
}

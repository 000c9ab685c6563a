//! Persists burst frames as PNG files.

use crate::capture::Frame;
use chrono::{DateTime, Local};
use image::{ImageError, ImageFormat};
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while writing burst frames.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The frame's pixel buffer does not match its dimensions.
    #[error("frame {sequence} has {actual} bytes, expected {expected}")]
    MalformedFrame {
        /// Sequence number of the rejected frame.
        sequence: u64,
        /// Bytes in the pixel buffer.
        actual: usize,
        /// Bytes its dimensions call for.
        expected: usize,
    },
    /// The target file could not be created or flushed. Existing files are
    /// never overwritten.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Target file.
        path: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// PNG encoding failed.
    #[error("failed to encode {path}: {source}")]
    Encode {
        /// Target file.
        path: String,
        /// Underlying error.
        #[source]
        source: ImageError,
    },
}

/// Writes the frames of one burst into a directory.
///
/// Files are named `burst_<YYYYmmdd_HHMMSS>_<BBBB>_<NNN>.png` after the
/// burst's start time, the burst's number and the frame's position in the
/// burst.
#[derive(Debug)]
pub struct BurstWriter {
    dir: PathBuf,
    prefix: String,
}

impl BurstWriter {
    /// Creates a writer for burst number `burst` started at `started_at`.
    pub fn new(dir: impl Into<PathBuf>, started_at: DateTime<Local>, burst: u64) -> Self {
        Self {
            dir: dir.into(),
            prefix: format!("{}_{:04}", started_at.format("burst_%Y%m%d_%H%M%S"), burst),
        }
    }

    /// Path of the `index`-th frame.
    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}_{:03}.png", self.prefix, index))
    }

    /// Directory frames are written into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes one frame and returns its path.
    pub fn write(&self, index: usize, frame: &Frame) -> Result<PathBuf, WriteError> {
        let image = frame.to_gray_image().ok_or(WriteError::MalformedFrame {
            sequence: frame.sequence(),
            actual: frame.pixels().len(),
            expected: frame.pixel_count(),
        })?;

        let path = self.path_for(index);
        let io_error = |source: io::Error| WriteError::Io {
            path: path.display().to_string(),
            source,
        };
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(io_error)?;

        let mut out = BufWriter::new(file);
        let written = image
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|source| WriteError::Encode {
                path: path.display().to_string(),
                source,
            })
            .and_then(|()| out.flush().map_err(io_error));
        if let Err(e) = written {
            drop(out);
            let _ = fs::remove_file(&path);
            return Err(e);
        }
        tracing::trace!(path = %path.display(), sequence = frame.sequence(), "burst frame written");
        Ok(path)
    }
}

//! Configuration file format.
//!
//! Every section is optional; missing sections and fields take their
//! defaults.
//!
//! ```toml
//! [capture]
//! width = 1280
//! height = 720
//! fps = 30
//!
//! [burst]
//! max_frames = 20
//!
//! [output]
//! output_dir = "bursts"
//! ```

use crate::burst::{BurstConfig, PreviewConfig};
use crate::capture::CaptureConfig;
use crate::distributor::DistributorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Width or height of zero.
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    /// Frame rate outside 1-120.
    #[error("invalid frame rate (must be 1-120 fps)")]
    InvalidFrameRate,
    /// Burst length outside 1-999.
    #[error("invalid burst length {0} (must be 1-999 frames)")]
    InvalidBurstLength(usize),
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The file is not valid TOML for this format.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Camera settings.
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Burst settings.
    #[serde(default)]
    pub burst: BurstConfig,
    /// Frame distributor settings.
    #[serde(default)]
    pub distributor: DistributorConfig,
    /// Preview consumer output size.
    #[serde(default)]
    pub preview: PreviewConfig,
    /// Output locations and exporter port.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for intermediate burst files.
    pub temp_dir: PathBuf,
    /// Directory finished bursts are moved into.
    pub output_dir: PathBuf,
    /// Metrics server port (0 to disable).
    pub metrics_port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir().join("burst-capture"),
            output_dir: PathBuf::from("bursts"),
            metrics_port: 9090,
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capture.validate()?;
        self.burst.validate()?;
        if self.preview.width == 0 || self.preview.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        Ok(())
    }
}

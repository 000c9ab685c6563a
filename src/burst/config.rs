//! Burst tuning.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Upper bound on frames kept for one burst.
pub const MAX_BURST_FRAMES: usize = 999;

/// Configuration for the burst controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    /// Frames kept per burst. Older frames are evicted past this.
    pub max_frames: usize,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self { max_frames: 30 }
    }
}

impl BurstConfig {
    /// Checks the burst length is within `1..=MAX_BURST_FRAMES`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_frames == 0 || self.max_frames > MAX_BURST_FRAMES {
            return Err(ConfigError::InvalidBurstLength(self.max_frames));
        }
        Ok(())
    }
}

/// Size of the preview consumer's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_length_bounds() {
        assert!(BurstConfig::default().validate().is_ok());
        assert!(BurstConfig { max_frames: 0 }.validate().is_err());
        assert!(BurstConfig {
            max_frames: MAX_BURST_FRAMES + 1
        }
        .validate()
        .is_err());
    }
}

//! Distributor tuning.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the frame distributor and its input surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributorConfig {
    /// Frames the input surface holds before dropping the oldest.
    pub queue_capacity: usize,
    /// How long the worker waits for a frame before rechecking for close.
    pub poll_interval_ms: u64,
}

impl Default for DistributorConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 4,
            poll_interval_ms: 10,
        }
    }
}

impl DistributorConfig {
    /// Worker wait per poll, at least one millisecond.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

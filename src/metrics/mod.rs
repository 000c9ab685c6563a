//! Prometheus metrics exporter for burst capture monitoring.
//!
//! # Metrics Exposed
//!
//! ## Burst Metrics
//! - `burst_capture_bursts_started_total` - Bursts started
//! - `burst_capture_bursts_completed_total` - Bursts whose session finished
//! - `burst_capture_bursts_failed_total` - Bursts whose session failed
//! - `burst_capture_frames_saved_total` - Frames persisted
//! - `burst_capture_frames_buffered` - Frames held by the running burst
//! - `burst_capture_frames_evicted_total` - Frames evicted from full buffers
//!
//! ## Distributor Metrics
//! - `burst_capture_distributor_frames_total` - Frames distributed
//! - `burst_capture_distributor_dropped_total` - Frames dropped at the input
//! - `burst_capture_distributor_running` - 1 while the distributor runs
//!
//! # Example
//!
//! ```no_run
//! use burst_capture::burst::{BurstConfig, BurstController};
//! use burst_capture::distributor::DistributorConfig;
//! use burst_capture::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let controller = BurstController::new(BurstConfig::default(), DistributorConfig::default());
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! registry.update(&MetricsSnapshot::from_stats(&controller.stats()));
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, MetricsState, ServerError};

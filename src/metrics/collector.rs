//! Metrics collection and registry.

use crate::burst::BurstStats;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registering or encoding a metric failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of controller state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Bursts started.
    pub bursts_started: u64,
    /// Bursts whose session finished.
    pub bursts_completed: u64,
    /// Bursts whose session failed.
    pub bursts_failed: u64,
    /// Frames persisted.
    pub frames_saved: u64,
    /// Frames held by the running burst.
    pub frames_buffered: u64,
    /// Frames evicted from full burst buffers.
    pub frames_evicted: u64,
    /// Frames distributed to consumers.
    pub frames_distributed: u64,
    /// Frames dropped at the input surface.
    pub frames_dropped: u64,
    /// Whether the distributor runs.
    pub distributor_running: bool,
}

impl MetricsSnapshot {
    /// Creates a snapshot from the burst controller's counters.
    pub fn from_stats(stats: &BurstStats) -> Self {
        Self {
            bursts_started: stats.bursts_started,
            bursts_completed: stats.bursts_completed,
            bursts_failed: stats.bursts_failed,
            frames_saved: stats.frames_saved,
            frames_buffered: stats.frames_buffered,
            frames_evicted: stats.frames_evicted,
            frames_distributed: stats.frames_distributed,
            frames_dropped: stats.frames_dropped,
            distributor_running: stats.distributor_running,
        }
    }
}

/// Prometheus metrics registry for burst capture monitoring.
pub struct MetricsRegistry {
    registry: Registry,

    // Burst metrics
    bursts_started: IntCounter,
    bursts_completed: IntCounter,
    bursts_failed: IntCounter,
    frames_saved: IntCounter,
    frames_buffered: IntGauge,
    frames_evicted: IntCounter,

    // Distributor metrics
    frames_distributed: IntCounter,
    frames_dropped: IntCounter,
    distributor_running: IntGauge,
}

/// Advances a counter to `target`; counters never move backwards.
fn advance(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all burst metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let bursts_started = IntCounter::new(
            "burst_capture_bursts_started_total",
            "Total number of bursts started",
        )?;
        let bursts_completed = IntCounter::new(
            "burst_capture_bursts_completed_total",
            "Total number of bursts whose session finished successfully",
        )?;
        let bursts_failed = IntCounter::new(
            "burst_capture_bursts_failed_total",
            "Total number of bursts whose session failed",
        )?;
        let frames_saved = IntCounter::new(
            "burst_capture_frames_saved_total",
            "Total frames persisted by completed bursts",
        )?;
        let frames_buffered = IntGauge::new(
            "burst_capture_frames_buffered",
            "Frames held by the running burst",
        )?;
        let frames_evicted = IntCounter::new(
            "burst_capture_frames_evicted_total",
            "Frames evicted from full burst buffers",
        )?;

        let frames_distributed = IntCounter::new(
            "burst_capture_distributor_frames_total",
            "Frames handed to consumers by the frame distributor",
        )?;
        let frames_dropped = IntCounter::new(
            "burst_capture_distributor_dropped_total",
            "Frames dropped at the input surface because the distributor lagged",
        )?;
        let distributor_running = IntGauge::new(
            "burst_capture_distributor_running",
            "Whether the frame distributor is running (1=running, 0=stopped)",
        )?;

        registry.register(Box::new(bursts_started.clone()))?;
        registry.register(Box::new(bursts_completed.clone()))?;
        registry.register(Box::new(bursts_failed.clone()))?;
        registry.register(Box::new(frames_saved.clone()))?;
        registry.register(Box::new(frames_buffered.clone()))?;
        registry.register(Box::new(frames_evicted.clone()))?;
        registry.register(Box::new(frames_distributed.clone()))?;
        registry.register(Box::new(frames_dropped.clone()))?;
        registry.register(Box::new(distributor_running.clone()))?;

        Ok(Self {
            registry,
            bursts_started,
            bursts_completed,
            bursts_failed,
            frames_saved,
            frames_buffered,
            frames_evicted,
            frames_distributed,
            frames_dropped,
            distributor_running,
        })
    }

    /// Updates all metrics from a snapshot.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        advance(&self.bursts_started, snapshot.bursts_started);
        advance(&self.bursts_completed, snapshot.bursts_completed);
        advance(&self.bursts_failed, snapshot.bursts_failed);
        advance(&self.frames_saved, snapshot.frames_saved);
        advance(&self.frames_evicted, snapshot.frames_evicted);
        advance(&self.frames_distributed, snapshot.frames_distributed);
        advance(&self.frames_dropped, snapshot.frames_dropped);

        self.frames_buffered.set(snapshot.frames_buffered as i64);
        self.distributor_running
            .set(if snapshot.distributor_running { 1 } else { 0 });
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

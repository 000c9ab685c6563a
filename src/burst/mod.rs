//! Burst capture.
//!
//! [`BurstFacade`] is the narrow interface a camera UI drives: camera
//! attach/detach notifications, burst start/stop, and the lifecycle of the
//! frame pipeline feeding the burst. [`BurstController`] implements it on
//! top of a [`FrameDistributor`](crate::distributor::FrameDistributor):
//!
//! ```text
//! input surface → distributor ─┬→ preview consumer → display surface
//!                              └→ burst consumer → burst buffer
//!                                                     ↓ stop_burst
//!                                  temp dir PNGs → capture session
//! ```

mod buffer;
mod config;
mod consumer;
mod controller;
mod error;
mod facade;
mod writer;

pub use buffer::BurstBuffer;
pub use config::{BurstConfig, PreviewConfig, MAX_BURST_FRAMES};
pub use consumer::BurstConsumer;
pub use controller::{BurstController, BurstStats};
pub use error::BurstError;
pub use facade::BurstFacade;
pub use writer::{BurstWriter, WriteError};

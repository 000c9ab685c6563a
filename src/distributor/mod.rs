//! Frame distribution.
//!
//! A [`FrameDistributor`] reads frames from one input [`SurfaceTexture`]
//! on a worker thread and fans them out to its consumers: typically a
//! [`PreviewConsumer`] for the viewfinder and the burst consumer that
//! buffers frames while a burst is running.
//!
//! [`SurfaceTexture`]: crate::surface::SurfaceTexture

mod config;
mod consumer;
mod frame_distributor;
mod preview;

pub use config::DistributorConfig;
pub use consumer::{FrameConsumer, SharedConsumer};
pub(crate) use consumer::lock_consumer;
pub use frame_distributor::{DistributorError, DistributorState, FrameDistributor};
pub use preview::PreviewConsumer;

//! Burst Capture Library
//!
//! A burst-capture controller for camera applications. A burst is a run
//! of consecutive frames captured in quick succession for later selection
//! or merging.
//!
//! # Architecture
//!
//! ```text
//! camera → frame pump → input surface → frame distributor ─┬→ preview consumer → display surface
//!                                                           └→ burst consumer → burst buffer
//!                                                                                 ↓ stop
//!                                                           temp dir → capture session → output dir
//! ```
//!
//! The [`BurstFacade`] trait is the single entry point a camera UI needs:
//! it is told when the camera comes and goes, starts and stops bursts,
//! and drives the lifecycle of the frame pipeline.
//!
//! # Example
//!
//! ```no_run
//! use burst_capture::{
//!     capture::{share, FramePump, MockCamera},
//!     session::FileCaptureSession,
//!     BurstController, BurstFacade, FileConfig,
//! };
//! use std::path::Path;
//!
//! let config = FileConfig::default();
//! let camera = share(MockCamera::opened(&config.capture).unwrap());
//!
//! let mut controller = BurstController::from_config(&config);
//! controller.on_camera_attached(camera.clone());
//! controller.initialize_and_start_frame_distributor().unwrap();
//!
//! let input = controller.input_surface_texture().unwrap();
//! let _pump = FramePump::start(camera, input, config.capture.fps).unwrap();
//!
//! let session = FileCaptureSession::timestamped("bursts");
//! controller
//!     .start_burst(Box::new(session), Path::new("/tmp/burst"))
//!     .unwrap();
//! std::thread::sleep(std::time::Duration::from_millis(500));
//! assert!(controller.stop_burst());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod burst;
pub mod capture;
pub mod config;
pub mod distributor;
pub mod metrics;
pub mod session;
pub mod surface;

// Re-export commonly used types at crate root
pub use burst::{BurstConfig, BurstController, BurstError, BurstFacade, BurstStats};
pub use capture::{Camera, CaptureConfig, Frame, FramePump, MockCamera, SharedCamera};
pub use config::{ConfigError, FileConfig};
pub use distributor::{DistributorState, FrameConsumer, FrameDistributor, PreviewConsumer};
pub use session::{CaptureSession, FileCaptureSession, SessionState};
pub use surface::SurfaceTexture;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

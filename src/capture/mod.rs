//! Camera input and frame handling.
//!
//! This module provides the camera abstraction the burst controller is
//! attached to, the frame type shared by the whole pipeline, and a pump
//! that moves camera frames into a surface texture.

mod camera;
mod config;
mod frame;
mod pump;

pub use camera::{lock, share, Camera, CameraError, MockCamera, SharedCamera};
pub use config::{CaptureConfig, MAX_FPS};
pub use frame::Frame;
pub use pump::FramePump;

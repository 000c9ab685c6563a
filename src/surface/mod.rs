//! Surface textures: the frame source/sink handles passed through the
//! burst facade.
//!
//! A surface texture has a default buffer size that producers are expected
//! to honour, and a short queue of frames. The frame distributor reads from
//! an input surface; the preview consumer writes into a display surface.

mod texture;

pub use texture::{SurfaceError, SurfaceTexture};

//! # camfeed media
//!
//! Camera acquisition and frame handling for camfeed. This crate covers
//! everything between the camera and an encoded JPEG data URL: media
//! constraints, camera backends, streams and tracks, the video surface a
//! stream plays into, and the canvas frames are drawn onto and encoded from.

#![warn(clippy::all)]

pub mod backend;
pub mod constraints;
pub mod encode;
pub mod error;
pub mod stream;
pub mod surface;

// Re-export main types
pub use backend::synthetic::{SyntheticCamera, SyntheticFailure};
pub use backend::{select_device, CameraBackend, VideoDevice};
pub use constraints::{FacingMode, MediaConstraints, VideoConstraints};
pub use encode::{
    decode_data_url, decode_frame, encode_jpeg, jpeg_data_url, JpegQuality,
    JPEG_DATA_URL_PREFIX,
};
pub use error::{ErrorCategory, MediaError, MediaResult};
pub use stream::{
    rgb_frame, FrameSource, MediaStream, MediaStreamTrack, TrackKind, TrackState, VideoResolution,
};
pub use surface::{canvas_size, CanvasSurface, SurfaceId, VideoSurface};

#[cfg(feature = "native")]
pub use backend::native::NativeCamera;

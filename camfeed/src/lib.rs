//! # camfeed - camera frames to an upload endpoint
//!
//! camfeed acquires a camera, samples its frames into a fixed-width canvas,
//! encodes each sample as a JPEG data URL and posts it to a server together
//! with a device token, roughly five times a second.
//!
//! ## Key Pieces
//!
//! - **Capture controller**: one camera, one upload loop, cooperative stop
//! - **Stream registry**: many camera streams keyed by token, acquisition and
//!   teardown only
//! - **Pluggable edges**: camera backends and frame uploaders are traits, with
//!   a synthetic camera and an HTTP uploader included
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use camfeed::{CaptureController, HttpUploader, SyntheticCamera, UploaderConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let uploader = HttpUploader::new(&UploaderConfig::default())?;
//!
//!     let controller = CaptureController::builder()
//!         .backend(Arc::new(SyntheticCamera::default()))
//!         .uploader(Arc::new(uploader))
//!         .token("3f1c9a...")
//!         .build()?;
//!
//!     controller.start().await?;
//!     tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//!     controller.stop();
//!     controller.join().await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

// Re-export core types for easy access
pub use camfeed_core::{
    AcquisitionKind, CamfeedError, FrameForm, FrameUploader, HttpUploader, ServerRoutes,
    TokenInput, UploadReceipt, UploaderConfig,
};

pub use camfeed_media::{
    CameraBackend, CanvasSurface, JpegQuality, MediaConstraints, MediaStream, MediaStreamTrack,
    SyntheticCamera, SyntheticFailure, VideoResolution, VideoSurface,
};

#[cfg(feature = "native")]
pub use camfeed_media::NativeCamera;

// Public API modules
pub mod config;
pub mod controller;
pub mod event;
pub mod logging;
pub mod registry;
pub mod upload_loop;

// Re-export main API types
pub use config::CaptureConfig;
pub use controller::{CaptureController, CaptureControllerBuilder};
pub use event::{SessionEvent, UploadStats};
pub use logging::{init_logging, DEFAULT_LOG_DIRECTIVE};
pub use registry::{StreamRegistry, StreamSession};
pub use upload_loop::{FrameSettings, LoopState, UploadLoop};

//! # camfeed core
//!
//! Shared building blocks for camfeed: the crate-wide error type, the token
//! input that every upload reads from, and the frame upload protocol spoken
//! with the receiving server.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod token;
pub mod upload;

// Re-export main types
pub use error::{AcquisitionKind, CamfeedError};
pub use token::TokenInput;
pub use upload::{
    FrameForm, FrameUploader, HttpUploader, ServerRoutes, UploadReceipt, UploaderConfig,
    FRAME_FIELD, TOKEN_FIELD, UPLOAD_FRAME_PATH,
};

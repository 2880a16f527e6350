//! Media error types and handling
//!
//! This module defines the error types used by camera backends, surfaces and
//! the frame encoder, and how they map onto the crate-wide [`CamfeedError`].

use camfeed_core::{AcquisitionKind, CamfeedError};
use thiserror::Error;

/// Main error type for media operations
#[derive(Error, Debug)]
pub enum MediaError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Invalid configuration provided
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message
        message: String,
    },

    /// Encoding operation failed
    #[error("Encoding failed: {codec} - {reason}")]
    EncodingFailed {
        /// Codec name
        codec: String,
        /// Failure reason
        reason: String,
    },

    /// Decoding operation failed
    #[error("Decoding failed: {codec} - {reason}")]
    DecodingFailed {
        /// Codec name
        codec: String,
        /// Failure reason
        reason: String,
    },

    /// Unsupported format error
    #[error("Unsupported format: {format}")]
    UnsupportedFormat {
        /// Format description
        format: String,
    },

    /// Invalid frame data error
    #[error("Invalid frame data: expected {expected} bytes, got {actual}")]
    InvalidFrameData {
        /// Expected data size
        expected: usize,
        /// Actual data size
        actual: usize,
    },

    /// Device enumeration failed
    #[error("Device enumeration failed: {reason}")]
    DeviceEnumerationFailed {
        /// Failure reason
        reason: String,
    },

    /// Device not found error
    #[error("Device not found: {device_id}")]
    DeviceNotFound {
        /// Device identifier
        device_id: String,
    },

    /// Device held by another owner
    #[error("Device busy: {device_id}")]
    DeviceBusy {
        /// Device identifier
        device_id: String,
    },

    /// Permission denied error
    #[error("Permission denied: {operation}")]
    PermissionDenied {
        /// Operation that was denied
        operation: String,
    },

    /// Capture not active error
    #[error("Capture not active")]
    CaptureNotActive,

    /// Invalid state for operation
    #[error("Invalid state: {message}")]
    InvalidState {
        /// State error message
        message: String,
    },

    /// Video specific errors
    #[error("Video error: {message}")]
    Video {
        /// Error message
        message: String,
    },
}

/// Result type alias for media operations
pub type MediaResult<T> = Result<T, MediaError>;

impl MediaError {
    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            MediaError::Io { .. } => true,
            MediaError::DeviceBusy { .. } => true,
            MediaError::EncodingFailed { .. } => true,
            MediaError::PermissionDenied { .. } => false,
            MediaError::DeviceNotFound { .. } => false,
            MediaError::UnsupportedFormat { .. } => false,
            _ => false,
        }
    }

    /// Get error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            MediaError::Io { .. } => ErrorCategory::System,
            MediaError::InvalidConfiguration { .. } => ErrorCategory::Configuration,
            MediaError::EncodingFailed { .. } => ErrorCategory::Codec,
            MediaError::DecodingFailed { .. } => ErrorCategory::Codec,
            MediaError::UnsupportedFormat { .. } => ErrorCategory::Format,
            MediaError::InvalidFrameData { .. } => ErrorCategory::Data,
            MediaError::DeviceEnumerationFailed { .. } => ErrorCategory::Device,
            MediaError::DeviceNotFound { .. } => ErrorCategory::Device,
            MediaError::DeviceBusy { .. } => ErrorCategory::Device,
            MediaError::PermissionDenied { .. } => ErrorCategory::System,
            MediaError::CaptureNotActive => ErrorCategory::State,
            MediaError::InvalidState { .. } => ErrorCategory::State,
            MediaError::Video { .. } => ErrorCategory::Video,
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// System-level errors (I/O, permissions, etc.)
    System,
    /// Configuration and parameter errors
    Configuration,
    /// Codec-related errors
    Codec,
    /// Format and data structure errors
    Format,
    /// Data validation errors
    Data,
    /// Device and hardware errors
    Device,
    /// State management errors
    State,
    /// Video-specific errors
    Video,
}

impl From<MediaError> for CamfeedError {
    fn from(error: MediaError) -> Self {
        let acquisition = |kind| CamfeedError::Acquisition {
            kind,
            reason: error.to_string(),
        };

        match &error {
            MediaError::PermissionDenied { .. } => acquisition(AcquisitionKind::PermissionDenied),
            MediaError::DeviceBusy { .. } => acquisition(AcquisitionKind::DeviceBusy),
            MediaError::DeviceNotFound { .. }
            | MediaError::DeviceEnumerationFailed { .. }
            | MediaError::Io { .. }
            | MediaError::Video { .. } => acquisition(AcquisitionKind::Unavailable),
            MediaError::EncodingFailed { .. }
            | MediaError::DecodingFailed { .. }
            | MediaError::InvalidFrameData { .. } => CamfeedError::Encoding {
                reason: error.to_string(),
            },
            MediaError::InvalidConfiguration { .. } | MediaError::UnsupportedFormat { .. } => {
                CamfeedError::InvalidConfiguration {
                    message: error.to_string(),
                }
            }
            MediaError::CaptureNotActive | MediaError::InvalidState { .. } => {
                CamfeedError::Initialization {
                    reason: error.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let io_error = MediaError::Io {
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        assert_eq!(io_error.category(), ErrorCategory::System);
        assert!(io_error.is_recoverable());

        let denied = MediaError::PermissionDenied {
            operation: "camera".to_string(),
        };
        assert_eq!(denied.category(), ErrorCategory::System);
        assert!(!denied.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let error = MediaError::InvalidFrameData {
            expected: 1024,
            actual: 512,
        };
        assert_eq!(
            error.to_string(),
            "Invalid frame data: expected 1024 bytes, got 512"
        );
    }

    #[test]
    fn test_acquisition_mapping() {
        let err: CamfeedError = MediaError::DeviceBusy {
            device_id: "0".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            CamfeedError::Acquisition {
                kind: AcquisitionKind::DeviceBusy,
                ..
            }
        ));

        let err: CamfeedError = MediaError::DeviceNotFound {
            device_id: "rear".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            CamfeedError::Acquisition {
                kind: AcquisitionKind::Unavailable,
                ..
            }
        ));

        let err: CamfeedError = MediaError::EncodingFailed {
            codec: "JPEG".to_string(),
            reason: "empty canvas".to_string(),
        }
        .into();
        assert!(matches!(err, CamfeedError::Encoding { .. }));
    }
}

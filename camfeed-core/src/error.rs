//! Error types for camfeed

use thiserror::Error;

/// Why a camera could not be acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionKind {
    /// The user or the platform refused camera access
    PermissionDenied,
    /// The device exists but another owner holds it
    DeviceBusy,
    /// No device matches the requested constraints
    Unavailable,
}

impl std::fmt::Display for AcquisitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcquisitionKind::PermissionDenied => write!(f, "permission denied"),
            AcquisitionKind::DeviceBusy => write!(f, "device busy"),
            AcquisitionKind::Unavailable => write!(f, "device unavailable"),
        }
    }
}

/// Main error type for camfeed operations
#[derive(Error, Debug)]
pub enum CamfeedError {
    /// Initialization error
    #[error("Initialization failed: {reason}")]
    Initialization {
        /// Reason for initialization failure
        reason: String,
    },

    /// Missing configuration error
    #[error("Missing required configuration: {field}")]
    MissingConfiguration {
        /// Missing configuration field
        field: String,
    },

    /// Invalid configuration provided
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message
        message: String,
    },

    /// Camera acquisition failed
    #[error("Camera acquisition failed ({kind}): {reason}")]
    Acquisition {
        /// Failure class
        kind: AcquisitionKind,
        /// Reason reported by the backend
        reason: String,
    },

    /// A capture loop is already running for this session
    #[error("Capture already running")]
    AlreadyRunning,

    /// A single frame upload failed
    #[error("Upload to {url} failed{}: {reason}", http_status(.status))]
    Upload {
        /// Target URL
        url: String,
        /// HTTP status, when the server answered
        status: Option<u16>,
        /// Failure reason
        reason: String,
    },

    /// Frame encoding failed
    #[error("Encoding failed: {reason}")]
    Encoding {
        /// Reason for failure
        reason: String,
    },
}

fn http_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {})", code),
        None => String::new(),
    }
}

impl CamfeedError {
    /// Get error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CamfeedError::Initialization { .. } => "INITIALIZATION_FAILED",
            CamfeedError::MissingConfiguration { .. } => "MISSING_CONFIGURATION",
            CamfeedError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            CamfeedError::Acquisition { .. } => "ACQUISITION_FAILED",
            CamfeedError::AlreadyRunning => "ALREADY_RUNNING",
            CamfeedError::Upload { .. } => "UPLOAD_FAILED",
            CamfeedError::Encoding { .. } => "ENCODING_FAILED",
        }
    }

    /// Errors that only affect a single loop iteration
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CamfeedError::Upload { .. } | CamfeedError::Encoding { .. }
        )
    }
}

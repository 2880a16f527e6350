//! Session events and upload statistics

use chrono::{DateTime, Utc};

/// Events emitted by a capture session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Camera acquired and playing
    Started {
        /// Label of the acquired camera
        device: String,
    },
    /// Canvas sized for the loop
    CanvasSized {
        /// Canvas width
        width: u32,
        /// Canvas height
        height: u32,
    },
    /// A frame reached the server
    FrameUploaded {
        /// Iteration number, starting at 1
        sequence: u64,
        /// Size of the data URL
        bytes: usize,
    },
    /// An iteration failed to encode or upload its frame
    UploadFailed {
        /// Iteration number, starting at 1
        sequence: u64,
        /// Failure reason
        reason: String,
    },
    /// Capture stopped and the camera released
    Stopped,
    /// The loop observed the cleared running flag and exited
    LoopFinished {
        /// Iterations completed
        iterations: u64,
    },
}

impl SessionEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::Started { .. } => "started",
            SessionEvent::CanvasSized { .. } => "canvas_sized",
            SessionEvent::FrameUploaded { .. } => "frame_uploaded",
            SessionEvent::UploadFailed { .. } => "upload_failed",
            SessionEvent::Stopped => "stopped",
            SessionEvent::LoopFinished { .. } => "loop_finished",
        }
    }

    /// Check if this is a per-iteration event
    pub fn is_frame_event(&self) -> bool {
        matches!(
            self,
            SessionEvent::FrameUploaded { .. } | SessionEvent::UploadFailed { .. }
        )
    }
}

/// Upload statistics for a capture controller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadStats {
    /// Frames the server accepted
    pub frames_sent: u64,
    /// Uploads that failed
    pub upload_failures: u64,
    /// Frames that could not be encoded
    pub encode_failures: u64,
    /// Total size of delivered data URLs
    pub bytes_sent: u64,
    /// Time of the last successful upload
    pub last_upload_at: Option<DateTime<Utc>>,
}

impl UploadStats {
    /// Iterations attempted so far
    pub fn attempts(&self) -> u64 {
        self.frames_sent + self.upload_failures + self.encode_failures
    }
}

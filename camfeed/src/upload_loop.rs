//! Frame capture and upload loop
//!
//! Each iteration draws the current video frame into the canvas, encodes it as
//! a JPEG data URL, posts it together with the current token, then sleeps for
//! the frame interval. The running flag is only consulted at the top of an
//! iteration, so an iteration that has begun always completes.

use crate::config::CaptureConfig;
use crate::event::{SessionEvent, UploadStats};
use camfeed_core::{CamfeedError, FrameForm, FrameUploader, TokenInput};
use camfeed_media::{canvas_size, CanvasSurface, JpegQuality, VideoSurface};
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Loop lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Iterations continue
    Running,
    /// The next iteration boundary ends the loop
    Stopped,
}

/// Per-frame settings resolved from a validated [`CaptureConfig`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSettings {
    /// Canvas width
    pub target_width: u32,
    /// Height / width ratio for unknown sources
    pub fallback_aspect_ratio: f64,
    /// JPEG quality
    pub quality: JpegQuality,
    /// Pause between iterations
    pub interval: Duration,
}

impl FrameSettings {
    /// Resolve settings, validating the configuration first
    pub fn from_config(config: &CaptureConfig) -> Result<Self, CamfeedError> {
        config.validate()?;

        Ok(Self {
            target_width: config.target_width,
            fallback_aspect_ratio: config.fallback_aspect_ratio,
            quality: JpegQuality::new(config.jpeg_quality)?,
            interval: config.frame_interval(),
        })
    }
}

/// One capture-and-upload loop bound to a session's surfaces
pub struct UploadLoop {
    running: Arc<AtomicBool>,
    video: Arc<VideoSurface>,
    canvas: Arc<CanvasSurface>,
    token: TokenInput,
    uploader: Arc<dyn FrameUploader>,
    settings: FrameSettings,
    events: broadcast::Sender<SessionEvent>,
    stats: Arc<RwLock<UploadStats>>,
}

impl UploadLoop {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        running: Arc<AtomicBool>,
        video: Arc<VideoSurface>,
        canvas: Arc<CanvasSurface>,
        token: TokenInput,
        uploader: Arc<dyn FrameUploader>,
        settings: FrameSettings,
        events: broadcast::Sender<SessionEvent>,
        stats: Arc<RwLock<UploadStats>>,
    ) -> Self {
        Self {
            running,
            video,
            canvas,
            token,
            uploader,
            settings,
            events,
            stats,
        }
    }

    /// Current state as seen by the next iteration
    pub fn state(&self) -> LoopState {
        if self.running.load(Ordering::Acquire) {
            LoopState::Running
        } else {
            LoopState::Stopped
        }
    }

    /// Run until the running flag is cleared; returns the iteration count
    pub async fn run(self) -> u64 {
        // Sized once; later source dimension changes are scaled into this canvas
        let size = canvas_size(
            self.video.resolution(),
            self.settings.target_width,
            self.settings.fallback_aspect_ratio,
        );
        self.canvas.resize(size);
        info!("Upload loop started with {}x{} canvas", size.width, size.height);
        let _ = self.events.send(SessionEvent::CanvasSized {
            width: size.width,
            height: size.height,
        });

        let mut sequence = 0u64;
        while self.state() == LoopState::Running {
            sequence += 1;
            self.iterate(sequence).await;
            tokio::time::sleep(self.settings.interval).await;
        }

        info!("Upload loop finished after {} iterations", sequence);
        let _ = self.events.send(SessionEvent::LoopFinished {
            iterations: sequence,
        });
        sequence
    }

    async fn iterate(&self, sequence: u64) {
        self.canvas.draw_video(&self.video);

        let frame_b64 = match self.canvas.to_data_url(self.settings.quality) {
            Ok(url) => url,
            Err(e) => {
                warn!(category = ?e.category(), "Frame {} encode error: {}", sequence, e);
                self.stats.write().encode_failures += 1;
                let _ = self.events.send(SessionEvent::UploadFailed {
                    sequence,
                    reason: e.to_string(),
                });
                return;
            }
        };

        let bytes = frame_b64.len();
        let form = FrameForm::new(frame_b64, self.token.value());

        match self.uploader.upload(form).await {
            Ok(()) => {
                debug!("Frame {} uploaded ({} bytes)", sequence, bytes);
                {
                    let mut stats = self.stats.write();
                    stats.frames_sent += 1;
                    stats.bytes_sent += bytes as u64;
                    stats.last_upload_at = Some(Utc::now());
                }
                let _ = self
                    .events
                    .send(SessionEvent::FrameUploaded { sequence, bytes });
            }
            Err(e) => {
                warn!("Upload error: {}", e);
                self.stats.write().upload_failures += 1;
                let _ = self.events.send(SessionEvent::UploadFailed {
                    sequence,
                    reason: e.to_string(),
                });
            }
        }
    }
}

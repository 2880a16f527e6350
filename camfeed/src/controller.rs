//! Single-stream capture controller
//!
//! [`CaptureController`] owns one capture session: the camera track, the video
//! and canvas surfaces, the token input and the running flag of its upload
//! loop. `start` acquires the rear camera and spawns the loop; `stop` clears
//! the flag and releases the camera without aborting an in-flight upload.

use crate::config::CaptureConfig;
use crate::event::{SessionEvent, UploadStats};
use crate::upload_loop::{FrameSettings, UploadLoop};
use camfeed_core::{AcquisitionKind, CamfeedError, FrameUploader, TokenInput};
use camfeed_media::{CameraBackend, CanvasSurface, MediaConstraints, MediaStreamTrack, VideoSurface};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Hardware and flag of the currently running capture
#[derive(Debug)]
struct ActiveCapture {
    running: Arc<AtomicBool>,
    track: MediaStreamTrack,
}

/// Fluent builder for a capture controller
#[derive(Default)]
pub struct CaptureControllerBuilder {
    backend: Option<Arc<dyn CameraBackend>>,
    uploader: Option<Arc<dyn FrameUploader>>,
    token: Option<TokenInput>,
    config: CaptureConfig,
}

impl CaptureControllerBuilder {
    /// Camera backend to acquire from (required)
    pub fn backend(mut self, backend: Arc<dyn CameraBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Destination for encoded frames (required)
    pub fn uploader(mut self, uploader: Arc<dyn FrameUploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    /// Share an existing token input
    pub fn token_input(mut self, token: TokenInput) -> Self {
        self.token = Some(token);
        self
    }

    /// Start with a fixed token value
    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(TokenInput::new(token));
        self
    }

    /// Capture loop settings
    pub fn config(mut self, config: CaptureConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the controller
    pub fn build(self) -> Result<CaptureController, CamfeedError> {
        let backend = self
            .backend
            .ok_or_else(|| CamfeedError::MissingConfiguration {
                field: "backend".to_string(),
            })?;
        let uploader = self
            .uploader
            .ok_or_else(|| CamfeedError::MissingConfiguration {
                field: "uploader".to_string(),
            })?;
        let settings = FrameSettings::from_config(&self.config)?;
        let (events, _) = broadcast::channel(self.config.event_capacity);

        Ok(CaptureController {
            backend,
            uploader,
            settings,
            token: self.token.unwrap_or_default(),
            video: Arc::new(VideoSurface::new()),
            canvas: Arc::new(CanvasSurface::new()),
            start_lock: tokio::sync::Mutex::new(()),
            active: Mutex::new(None),
            loop_task: Mutex::new(None),
            events,
            stats: Arc::new(RwLock::new(UploadStats::default())),
        })
    }
}

/// Controller for the single-stream capture-and-upload loop
pub struct CaptureController {
    backend: Arc<dyn CameraBackend>,
    uploader: Arc<dyn FrameUploader>,
    settings: FrameSettings,
    token: TokenInput,
    video: Arc<VideoSurface>,
    canvas: Arc<CanvasSurface>,
    start_lock: tokio::sync::Mutex<()>,
    active: Mutex<Option<ActiveCapture>>,
    loop_task: Mutex<Option<JoinHandle<u64>>>,
    events: broadcast::Sender<SessionEvent>,
    stats: Arc<RwLock<UploadStats>>,
}

impl CaptureController {
    /// Create a controller builder
    pub fn builder() -> CaptureControllerBuilder {
        CaptureControllerBuilder::default()
    }

    /// Acquire the rear camera and start the upload loop
    ///
    /// Fails with [`CamfeedError::AlreadyRunning`] while a loop is running, and
    /// with [`CamfeedError::Acquisition`] if the camera cannot be opened; in
    /// both cases no new loop is started.
    pub async fn start(&self) -> Result<(), CamfeedError> {
        let _starting = self.start_lock.lock().await;
        if self.is_running() {
            return Err(CamfeedError::AlreadyRunning);
        }

        let stream = self
            .backend
            .get_user_media(&MediaConstraints::rear_camera())
            .await
            .map_err(|e| {
                warn!(
                    category = ?e.category(),
                    recoverable = e.is_recoverable(),
                    "Camera acquisition failed: {}",
                    e
                );
                CamfeedError::from(e)
            })?;

        let Some(track) = stream.first_video_track() else {
            stream.stop_all();
            return Err(CamfeedError::Acquisition {
                kind: AcquisitionKind::Unavailable,
                reason: "stream has no video track".to_string(),
            });
        };

        self.video.set_src_object(Some(stream.clone()));
        if let Err(e) = self.video.play() {
            stream.stop_all();
            self.video.set_src_object(None);
            return Err(e.into());
        }

        // A fresh flag per run keeps a loop that is still finishing from resuming
        let running = Arc::new(AtomicBool::new(true));
        *self.active.lock() = Some(ActiveCapture {
            running: running.clone(),
            track: track.clone(),
        });

        info!("Capture started on {}", track.label());
        let _ = self.events.send(SessionEvent::Started {
            device: track.label().to_string(),
        });

        let upload_loop = UploadLoop::new(
            running,
            self.video.clone(),
            self.canvas.clone(),
            self.token.clone(),
            self.uploader.clone(),
            self.settings,
            self.events.clone(),
            self.stats.clone(),
        );
        *self.loop_task.lock() = Some(tokio::spawn(upload_loop.run()));

        Ok(())
    }

    /// Clear the running flag and release the camera
    ///
    /// Returns false when nothing was running. The loop exits at its next
    /// iteration boundary.
    pub fn stop(&self) -> bool {
        let Some(active) = self.active.lock().take() else {
            return false;
        };

        active.running.store(false, Ordering::Release);
        active.track.stop();
        info!("Capture stopped");
        let _ = self.events.send(SessionEvent::Stopped);
        true
    }

    /// Wait for the most recent loop to exit; returns its iteration count
    ///
    /// Only resolves after [`stop`](Self::stop) has been called.
    pub async fn join(&self) -> Result<Option<u64>, CamfeedError> {
        let handle = self.loop_task.lock().take();
        match handle {
            Some(handle) => handle
                .await
                .map(Some)
                .map_err(|e| CamfeedError::Initialization {
                    reason: format!("upload loop task failed: {}", e),
                }),
            None => Ok(None),
        }
    }

    /// Whether the running flag is set
    pub fn is_running(&self) -> bool {
        self.active
            .lock()
            .as_ref()
            .map(|a| a.running.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    /// Token input read by every upload
    pub fn token_input(&self) -> &TokenInput {
        &self.token
    }

    /// Surface the camera plays into
    pub fn video_surface(&self) -> &Arc<VideoSurface> {
        &self.video
    }

    /// Canvas frames are encoded from
    pub fn canvas_surface(&self) -> &Arc<CanvasSurface> {
        &self.canvas
    }

    /// Subscribe to session events
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Get current statistics
    pub fn stats(&self) -> UploadStats {
        self.stats.read().clone()
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        self.stop();
    }
}

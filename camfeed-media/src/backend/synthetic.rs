//! Synthetic camera backend
//!
//! Produces a moving gradient instead of real frames. Used by tests and by the
//! `camfeed` binary when no camera is attached. Failures and dimension changes
//! can be injected to exercise the capture paths.

use super::{select_device, CameraBackend, VideoDevice};
use crate::constraints::{FacingMode, MediaConstraints};
use crate::error::{MediaError, MediaResult};
use crate::stream::{FrameSource, MediaStream, MediaStreamTrack, TrackKind, VideoResolution};
use async_trait::async_trait;
use image::{Rgb, RgbImage};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Failure to report from the next acquisitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticFailure {
    PermissionDenied,
    DeviceBusy,
    NoDevice,
}

#[derive(Debug)]
struct SyntheticSource {
    resolution: RwLock<Option<VideoResolution>>,
    frames: AtomicU64,
    released: AtomicBool,
}

impl SyntheticSource {
    fn new(resolution: Option<VideoResolution>) -> Self {
        Self {
            resolution: RwLock::new(resolution),
            frames: AtomicU64::new(0),
            released: AtomicBool::new(false),
        }
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl FrameSource for SyntheticSource {
    fn resolution(&self) -> Option<VideoResolution> {
        *self.resolution.read()
    }

    fn latest_frame(&self) -> Option<RgbImage> {
        if self.is_released() {
            return None;
        }

        let resolution = (*self.resolution.read()).filter(|r| r.is_known())?;
        let tick = self.frames.fetch_add(1, Ordering::Relaxed);
        let (w, h) = (resolution.width, resolution.height);

        Some(RgbImage::from_fn(w, h, |x, y| {
            Rgb([
                (x * 255 / w) as u8,
                (y * 255 / h) as u8,
                (tick.wrapping_mul(8) % 256) as u8,
            ])
        }))
    }

    fn release(&self) {
        self.released.store(true, Ordering::Release);
    }
}

/// Camera backend backed by generated frames
#[derive(Debug)]
pub struct SyntheticCamera {
    devices: Vec<VideoDevice>,
    resolution: RwLock<Option<VideoResolution>>,
    failure: RwLock<Option<SyntheticFailure>>,
    acquisitions: AtomicUsize,
    sources: Mutex<Vec<Arc<SyntheticSource>>>,
}

impl SyntheticCamera {
    /// Camera producing frames of `resolution`
    pub fn new(resolution: VideoResolution) -> Self {
        Self::build(Some(resolution))
    }

    /// Camera that never reports its dimensions
    pub fn with_unknown_resolution() -> Self {
        Self::build(None)
    }

    fn build(resolution: Option<VideoResolution>) -> Self {
        let device = VideoDevice {
            id: "synthetic_camera_0".to_string(),
            name: "Synthetic Rear Camera".to_string(),
            description: "Generated test pattern".to_string(),
            facing: Some(FacingMode::Environment),
            supported_resolutions: resolution.into_iter().collect(),
        };

        Self {
            devices: vec![device],
            resolution: RwLock::new(resolution),
            failure: RwLock::new(None),
            acquisitions: AtomicUsize::new(0),
            sources: Mutex::new(Vec::new()),
        }
    }

    /// Make subsequent acquisitions fail (or succeed again with `None`)
    pub fn fail_with(&self, failure: Option<SyntheticFailure>) {
        *self.failure.write() = failure;
    }

    /// Change dimensions for new and already running streams
    pub fn set_resolution(&self, resolution: Option<VideoResolution>) {
        *self.resolution.write() = resolution;
        for source in self.sources.lock().iter() {
            *source.resolution.write() = resolution;
        }
    }

    /// Successful acquisitions so far
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    /// Tracks handed out and not yet released
    pub fn active_tracks(&self) -> usize {
        self.sources
            .lock()
            .iter()
            .filter(|s| !s.is_released())
            .count()
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new(VideoResolution::HD)
    }
}

#[async_trait]
impl CameraBackend for SyntheticCamera {
    fn enumerate_devices(&self) -> MediaResult<Vec<VideoDevice>> {
        if *self.failure.read() == Some(SyntheticFailure::NoDevice) {
            return Ok(Vec::new());
        }
        Ok(self.devices.clone())
    }

    async fn get_user_media(&self, constraints: &MediaConstraints) -> MediaResult<MediaStream> {
        constraints.validate()?;

        let devices = self.enumerate_devices()?;
        let device = select_device(&devices, constraints)?;

        match *self.failure.read() {
            Some(SyntheticFailure::PermissionDenied) => {
                return Err(MediaError::PermissionDenied {
                    operation: format!("open {}", device.id),
                })
            }
            Some(SyntheticFailure::DeviceBusy) => {
                return Err(MediaError::DeviceBusy {
                    device_id: device.id.clone(),
                })
            }
            _ => {}
        }

        let source = Arc::new(SyntheticSource::new(*self.resolution.read()));
        self.sources.lock().push(source.clone());
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        debug!("Synthetic camera acquired ({})", device.name);

        let track = MediaStreamTrack::new(TrackKind::Video, device.name.clone(), source);
        Ok(MediaStream::new(vec![track]))
    }
}

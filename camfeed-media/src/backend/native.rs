//! Native camera capture via nokhwa
//!
//! A nokhwa `Camera` is not `Send`, so each acquired stream gets a dedicated
//! capture thread that owns the camera and publishes decoded frames. Stopping
//! the track flags the thread, which closes the stream and exits.

use super::{select_device, CameraBackend, VideoDevice};
use crate::constraints::{FacingMode, MediaConstraints};
use crate::error::{MediaError, MediaResult};
use crate::stream::{
    rgb_frame, FrameSource, MediaStream, MediaStreamTrack, TrackKind, VideoResolution,
};
use async_trait::async_trait;
use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Frames published by a capture thread
#[derive(Debug, Default)]
struct NativeSource {
    resolution: RwLock<Option<VideoResolution>>,
    frame: RwLock<Option<RgbImage>>,
    released: AtomicBool,
}

impl NativeSource {
    fn publish(&self, frame: RgbImage) {
        if self.is_released() {
            return;
        }
        *self.resolution.write() = Some(VideoResolution::new(frame.width(), frame.height()));
        *self.frame.write() = Some(frame);
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl FrameSource for NativeSource {
    fn resolution(&self) -> Option<VideoResolution> {
        *self.resolution.read()
    }

    fn latest_frame(&self) -> Option<RgbImage> {
        self.frame.read().clone()
    }

    fn release(&self) {
        self.released.store(true, Ordering::Release);
        *self.frame.write() = None;
    }
}

/// Camera backend for attached hardware
#[derive(Debug, Clone, Default)]
pub struct NativeCamera {
    device_index: Option<u32>,
}

impl NativeCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always use the camera at `index`, ignoring facing preferences
    pub fn with_device_index(index: u32) -> Self {
        Self {
            device_index: Some(index),
        }
    }
}

fn map_nokhwa_error(device_id: &str, error: nokhwa::NokhwaError) -> MediaError {
    let message = error.to_string();
    let lower = message.to_lowercase();

    if lower.contains("permission") || lower.contains("denied") || lower.contains("not authorized")
    {
        MediaError::PermissionDenied {
            operation: format!("open camera {}: {}", device_id, message),
        }
    } else if lower.contains("busy") || lower.contains("in use") {
        MediaError::DeviceBusy {
            device_id: device_id.to_string(),
        }
    } else {
        MediaError::Video { message }
    }
}

#[async_trait]
impl CameraBackend for NativeCamera {
    fn enumerate_devices(&self) -> MediaResult<Vec<VideoDevice>> {
        let cameras = nokhwa::query(ApiBackend::Auto).map_err(|e| {
            MediaError::DeviceEnumerationFailed {
                reason: e.to_string(),
            }
        })?;

        // Only numerically indexed cameras can be reopened on the capture thread
        Ok(cameras
            .iter()
            .filter_map(|info| {
                let index = info.index().as_index().ok()?;
                Some(VideoDevice {
                    id: index.to_string(),
                    name: info.human_name(),
                    description: info.description().to_string(),
                    facing: FacingMode::from_label(&info.human_name()),
                    supported_resolutions: Vec::new(),
                })
            })
            .collect())
    }

    async fn get_user_media(&self, constraints: &MediaConstraints) -> MediaResult<MediaStream> {
        constraints.validate()?;

        let (index, label) = match self.device_index {
            Some(index) => (index, format!("Camera {}", index)),
            None => {
                let devices = self.enumerate_devices()?;
                let device = select_device(&devices, constraints)?;
                let index = device
                    .id
                    .parse::<u32>()
                    .map_err(|_| MediaError::DeviceNotFound {
                        device_id: device.id.clone(),
                    })?;
                (index, device.name.clone())
            }
        };

        let source = Arc::new(NativeSource::default());
        let (ready_tx, ready_rx) = oneshot::channel();
        let thread_source = source.clone();

        std::thread::Builder::new()
            .name(format!("camfeed-camera-{}", index))
            .spawn(move || capture_thread(index, thread_source, ready_tx))?;

        ready_rx.await.map_err(|_| MediaError::Video {
            message: "capture thread exited before the camera opened".to_string(),
        })??;

        info!("Camera {} opened: {}", index, label);
        let track = MediaStreamTrack::new(TrackKind::Video, label, source);
        Ok(MediaStream::new(vec![track]))
    }
}

fn capture_thread(index: u32, source: Arc<NativeSource>, ready: oneshot::Sender<MediaResult<()>>) {
    let device_id = index.to_string();
    let requested =
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);

    let mut camera = match Camera::new(CameraIndex::Index(index), requested) {
        Ok(camera) => camera,
        Err(e) => {
            let _ = ready.send(Err(map_nokhwa_error(&device_id, e)));
            return;
        }
    };

    if let Err(e) = camera.open_stream() {
        let _ = ready.send(Err(map_nokhwa_error(&device_id, e)));
        return;
    }

    let resolution = camera.resolution();
    *source.resolution.write() = Some(VideoResolution::new(
        resolution.width(),
        resolution.height(),
    ));

    if ready.send(Ok(())).is_err() {
        let _ = camera.stop_stream();
        return;
    }

    while !source.is_released() {
        let buffer = match camera.frame() {
            Ok(buffer) => buffer,
            Err(e) => {
                warn!("Camera {} frame read failed: {}", index, e);
                std::thread::sleep(Duration::from_millis(50));
                continue;
            }
        };

        // Rebuild through our own image types; nokhwa may link a different image version
        match buffer.decode_image::<RgbFormat>() {
            Ok(decoded) => {
                let (width, height) = (decoded.width(), decoded.height());
                match rgb_frame(width, height, decoded.into_raw()) {
                    Ok(frame) => source.publish(frame),
                    Err(e) => {
                        warn!(category = ?e.category(), "Camera {} dropped frame: {}", index, e)
                    }
                }
            }
            Err(e) => warn!("Camera {} frame decode failed: {}", index, e),
        }
    }

    if let Err(e) = camera.stop_stream() {
        warn!("Camera {} did not close cleanly: {}", index, e);
    }
    debug!("Camera {} capture thread exiting", index);
}

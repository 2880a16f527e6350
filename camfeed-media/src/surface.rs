//! Video and canvas surfaces
//!
//! [`VideoSurface`] is where an acquired stream plays: it holds the bound
//! stream and exposes the live frame and its dimensions. [`CanvasSurface`] is
//! an offscreen RGB buffer that frames are scaled into before encoding.

use crate::encode::{encode_jpeg, jpeg_data_url, JpegQuality};
use crate::error::{MediaError, MediaResult};
use crate::stream::{MediaStream, VideoResolution};
use image::imageops::{self, FilterType};
use image::RgbImage;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Identity of a surface, used for reverse lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(Uuid);

impl SurfaceId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Surface a media stream plays into
#[derive(Debug)]
pub struct VideoSurface {
    id: SurfaceId,
    source: RwLock<Option<MediaStream>>,
    playing: AtomicBool,
}

impl VideoSurface {
    pub fn new() -> Self {
        Self {
            id: SurfaceId::new(),
            source: RwLock::new(None),
            playing: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Bind a stream, or clear the binding with `None`. Playback stops either way.
    pub fn set_src_object(&self, stream: Option<MediaStream>) {
        self.playing.store(false, Ordering::Release);
        *self.source.write() = stream;
    }

    /// Currently bound stream
    pub fn src_object(&self) -> Option<MediaStream> {
        self.source.read().clone()
    }

    pub fn has_source(&self) -> bool {
        self.source.read().is_some()
    }

    /// Start playback of the bound stream
    pub fn play(&self) -> MediaResult<()> {
        let source = self.source.read();
        let stream = source.as_ref().ok_or_else(|| MediaError::InvalidState {
            message: "no stream bound to video surface".to_string(),
        })?;

        if !stream.video_tracks().any(|t| t.is_live()) {
            return Err(MediaError::CaptureNotActive);
        }

        self.playing.store(true, Ordering::Release);
        Ok(())
    }

    pub fn pause(&self) {
        self.playing.store(false, Ordering::Release);
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Dimensions of the playing video, `None` while unknown
    pub fn resolution(&self) -> Option<VideoResolution> {
        self.source
            .read()
            .as_ref()
            .and_then(|s| s.first_video_track())
            .and_then(|t| t.resolution())
    }

    /// Width of the playing video, 0 while unknown
    pub fn video_width(&self) -> u32 {
        self.resolution().map(|r| r.width).unwrap_or(0)
    }

    /// Height of the playing video, 0 while unknown
    pub fn video_height(&self) -> u32 {
        self.resolution().map(|r| r.height).unwrap_or(0)
    }

    /// Frame currently shown, if playing
    pub fn current_frame(&self) -> Option<RgbImage> {
        if !self.is_playing() {
            return None;
        }

        self.source
            .read()
            .as_ref()
            .and_then(|s| s.first_video_track())
            .and_then(|t| t.latest_frame())
    }
}

impl Default for VideoSurface {
    fn default() -> Self {
        Self::new()
    }
}

/// Canvas size for a source: fixed width, height from the source aspect ratio
///
/// When the source dimensions are unknown the `fallback_ratio` (height / width)
/// is used instead.
pub fn canvas_size(
    source: Option<VideoResolution>,
    target_width: u32,
    fallback_ratio: f64,
) -> VideoResolution {
    let ratio = match source {
        Some(r) if r.is_known() => r.height as f64 / r.width as f64,
        _ => fallback_ratio,
    };

    let height = (target_width as f64 * ratio).round() as u32;
    VideoResolution::new(target_width, height.max(1))
}

/// Offscreen RGB drawing surface
#[derive(Debug)]
pub struct CanvasSurface {
    id: SurfaceId,
    pixels: RwLock<RgbImage>,
}

impl CanvasSurface {
    /// Default size of a fresh canvas
    pub const DEFAULT_SIZE: VideoResolution = VideoResolution::new(300, 150);

    pub fn new() -> Self {
        Self::with_size(Self::DEFAULT_SIZE)
    }

    pub fn with_size(size: VideoResolution) -> Self {
        Self {
            id: SurfaceId::new(),
            pixels: RwLock::new(RgbImage::new(size.width, size.height)),
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.pixels.read().width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.read().height()
    }

    pub fn resolution(&self) -> VideoResolution {
        let pixels = self.pixels.read();
        VideoResolution::new(pixels.width(), pixels.height())
    }

    /// Resize the canvas; this clears its contents
    pub fn resize(&self, size: VideoResolution) {
        *self.pixels.write() = RgbImage::new(size.width, size.height);
    }

    /// Draw `frame` stretched over the whole canvas
    pub fn draw_image(&self, frame: &RgbImage) {
        let mut pixels = self.pixels.write();
        let (width, height) = pixels.dimensions();

        if frame.dimensions() == (width, height) {
            pixels.copy_from_slice(frame.as_raw());
        } else {
            *pixels = imageops::resize(frame, width, height, FilterType::Triangle);
        }
    }

    /// Draw the current frame of `video`; returns false if it had none
    pub fn draw_video(&self, video: &VideoSurface) -> bool {
        match video.current_frame() {
            Some(frame) => {
                self.draw_image(&frame);
                true
            }
            None => false,
        }
    }

    /// Copy of the canvas contents
    pub fn snapshot(&self) -> RgbImage {
        self.pixels.read().clone()
    }

    /// Encode the canvas as JPEG
    pub fn to_jpeg(&self, quality: JpegQuality) -> MediaResult<Vec<u8>> {
        encode_jpeg(&self.pixels.read(), quality)
    }

    /// Encode the canvas as a JPEG data URL
    pub fn to_data_url(&self, quality: JpegQuality) -> MediaResult<String> {
        self.to_jpeg(quality).map(|jpeg| jpeg_data_url(&jpeg))
    }
}

impl Default for CanvasSurface {
    fn default() -> Self {
        Self::new()
    }
}

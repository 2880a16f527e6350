//! Media streams and tracks
//!
//! A [`MediaStream`] is what a backend hands out on successful acquisition. Each
//! [`MediaStreamTrack`] owns the hardware behind it through a [`FrameSource`];
//! stopping the track releases that hardware.

use crate::error::{MediaError, MediaResult};
use image::RgbImage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Video resolution information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VideoResolution {
    pub width: u32,
    pub height: u32,
}

impl VideoResolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const HD: Self = Self::new(1280, 720);
    pub const FULL_HD: Self = Self::new(1920, 1080);
    pub const VGA: Self = Self::new(640, 480);

    /// Whether both dimensions are known
    pub fn is_known(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Wrap a packed RGB24 buffer as a frame
pub fn rgb_frame(width: u32, height: u32, data: Vec<u8>) -> MediaResult<RgbImage> {
    let expected = width as usize * height as usize * 3;
    let actual = data.len();

    RgbImage::from_raw(width, height, data)
        .filter(|_| actual == expected)
        .ok_or(MediaError::InvalidFrameData { expected, actual })
}

/// Producer of frames behind a track
pub trait FrameSource: Send + Sync + std::fmt::Debug {
    /// Current frame dimensions, `None` until the device reports them
    fn resolution(&self) -> Option<VideoResolution>;

    /// Most recent frame, `None` if nothing was captured yet
    fn latest_frame(&self) -> Option<RgbImage>;

    /// Release the underlying device; called once per track
    fn release(&self);
}

/// Kind of media carried by a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

/// Track lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Live,
    Ended,
}

#[derive(Debug)]
struct TrackInner {
    id: Uuid,
    kind: TrackKind,
    label: String,
    ended: AtomicBool,
    source: Arc<dyn FrameSource>,
}

/// Handle to one captured track
///
/// Clones refer to the same track, so stopping any clone ends it everywhere.
#[derive(Debug, Clone)]
pub struct MediaStreamTrack {
    inner: Arc<TrackInner>,
}

impl MediaStreamTrack {
    /// Create a live track backed by `source`
    pub fn new(kind: TrackKind, label: impl Into<String>, source: Arc<dyn FrameSource>) -> Self {
        Self {
            inner: Arc::new(TrackInner {
                id: Uuid::new_v4(),
                kind,
                label: label.into(),
                ended: AtomicBool::new(false),
                source,
            }),
        }
    }

    /// Track ID
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Track kind
    pub fn kind(&self) -> TrackKind {
        self.inner.kind
    }

    /// Device label
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Current lifecycle state
    pub fn state(&self) -> TrackState {
        if self.inner.ended.load(Ordering::Acquire) {
            TrackState::Ended
        } else {
            TrackState::Live
        }
    }

    pub fn is_live(&self) -> bool {
        self.state() == TrackState::Live
    }

    /// Stop the track and release its device. Returns false if already stopped.
    pub fn stop(&self) -> bool {
        if self.inner.ended.swap(true, Ordering::AcqRel) {
            return false;
        }

        debug!("Stopping track {} ({})", self.inner.id, self.inner.label);
        self.inner.source.release();
        true
    }

    /// Frame dimensions while live
    pub fn resolution(&self) -> Option<VideoResolution> {
        if !self.is_live() {
            return None;
        }
        self.inner.source.resolution().filter(|r| r.is_known())
    }

    /// Latest frame while live
    pub fn latest_frame(&self) -> Option<RgbImage> {
        if !self.is_live() {
            return None;
        }
        self.inner.source.latest_frame()
    }
}

/// A set of tracks acquired together
#[derive(Debug, Clone)]
pub struct MediaStream {
    id: Uuid,
    tracks: Vec<MediaStreamTrack>,
}

impl MediaStream {
    pub fn new(tracks: Vec<MediaStreamTrack>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tracks,
        }
    }

    /// Stream ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// All tracks
    pub fn tracks(&self) -> &[MediaStreamTrack] {
        &self.tracks
    }

    /// Video tracks only
    pub fn video_tracks(&self) -> impl Iterator<Item = &MediaStreamTrack> {
        self.tracks.iter().filter(|t| t.kind() == TrackKind::Video)
    }

    /// First video track, if any
    pub fn first_video_track(&self) -> Option<MediaStreamTrack> {
        self.video_tracks().next().cloned()
    }

    /// Whether any track is still live
    pub fn is_active(&self) -> bool {
        self.tracks.iter().any(|t| t.is_live())
    }

    /// Stop every track; returns how many were live
    pub fn stop_all(&self) -> usize {
        self.tracks.iter().filter(|t| t.stop()).count()
    }
}

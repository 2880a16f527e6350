//! Multi-stream registry
//!
//! Tracks several simultaneous camera streams keyed by token, each bound to its
//! own video and canvas surface. The registry only acquires and tears down
//! streams; it never captures or uploads frames.

use camfeed_media::{
    CameraBackend, CanvasSurface, MediaConstraints, MediaStream, SurfaceId, VideoSurface,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// A camera stream registered under a token
#[derive(Debug, Clone)]
pub struct StreamSession {
    /// Token the stream is registered under
    pub token: String,
    /// Acquired stream
    pub stream: MediaStream,
    /// Surface the stream is bound to
    pub video: Arc<VideoSurface>,
    /// Canvas associated with the stream
    pub canvas: Arc<CanvasSurface>,
    /// Acquisition time
    pub started_at: DateTime<Utc>,
}

/// Token-keyed set of active camera streams
pub struct StreamRegistry {
    backend: Arc<dyn CameraBackend>,
    sessions: DashMap<String, StreamSession>,
}

impl StreamRegistry {
    pub fn new(backend: Arc<dyn CameraBackend>) -> Self {
        Self {
            backend,
            sessions: DashMap::new(),
        }
    }

    /// Acquire a camera, bind it to `video` and record it under `token`
    ///
    /// Acquisition errors are logged and nothing is recorded. An existing
    /// session under the same token is replaced and its tracks are stopped.
    pub async fn start_client_stream(
        &self,
        token: &str,
        video: Arc<VideoSurface>,
        canvas: Arc<CanvasSurface>,
    ) {
        let stream = match self
            .backend
            .get_user_media(&MediaConstraints::default_video())
            .await
        {
            Ok(stream) => stream,
            Err(e) => {
                error!(token, "Client stream acquisition failed: {}", e);
                return;
            }
        };

        video.set_src_object(Some(stream.clone()));
        let session = StreamSession {
            token: token.to_string(),
            stream,
            video: video.clone(),
            canvas,
            started_at: Utc::now(),
        };

        if let Some(previous) = self.sessions.insert(token.to_string(), session) {
            previous.stream.stop_all();
            if previous.video.id() != video.id() {
                previous.video.set_src_object(None);
            }
            debug!(token, "Replaced existing client stream");
        }

        info!(token, surface = %video.id(), "Client stream started");
    }

    /// Tear down the session bound to `video`
    ///
    /// Stops every track of that session, clears the surface and removes the
    /// entry. Returns the token that was removed, or `None` if no session uses
    /// this surface.
    pub fn stop_client_stream(&self, video: &VideoSurface) -> Option<String> {
        let (token, session) = loop {
            let token = self
                .sessions
                .iter()
                .find(|entry| entry.video.id() == video.id())
                .map(|entry| entry.key().clone())?;

            // The entry may have been replaced since the lookup
            if let Some(removed) = self.take_session(&token, video.id()) {
                break removed;
            }
        };

        let stopped = session.stream.stop_all();
        video.set_src_object(None);

        info!(token = token.as_str(), tracks = stopped, "Client stream stopped");
        Some(token)
    }

    fn take_session(&self, token: &str, surface: SurfaceId) -> Option<(String, StreamSession)> {
        self.sessions
            .remove_if(token, |_, session| session.video.id() == surface)
    }

    /// Stop and remove every session; returns how many were removed
    pub fn shutdown(&self) -> usize {
        let mut removed = 0;
        for token in self.tokens() {
            if let Some((_, session)) = self.sessions.remove(&token) {
                session.stream.stop_all();
                session.video.set_src_object(None);
                removed += 1;
            }
        }
        removed
    }

    /// Session registered under `token`
    pub fn session(&self, token: &str) -> Option<StreamSession> {
        self.sessions.get(token).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.sessions.contains_key(token)
    }

    /// Registered tokens, sorted
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self.sessions.iter().map(|e| e.key().clone()).collect();
        tokens.sort();
        tokens
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

//! Multi-stream registry behaviour

use camfeed::{CanvasSurface, StreamRegistry, SyntheticCamera, SyntheticFailure, VideoSurface};
use std::sync::Arc;

fn surfaces() -> (Arc<VideoSurface>, Arc<CanvasSurface>) {
    (Arc::new(VideoSurface::new()), Arc::new(CanvasSurface::new()))
}

#[tokio::test]
async fn test_start_records_session() {
    let camera = Arc::new(SyntheticCamera::default());
    let registry = StreamRegistry::new(camera.clone());
    let (video, canvas) = surfaces();

    registry
        .start_client_stream("alpha", video.clone(), canvas.clone())
        .await;

    assert_eq!(registry.len(), 1);
    assert!(registry.contains("alpha"));
    assert!(video.has_source());
    assert_eq!(camera.active_tracks(), 1);

    let session = registry.session("alpha").unwrap();
    assert_eq!(session.token, "alpha");
    assert_eq!(session.video.id(), video.id());
    assert_eq!(session.canvas.id(), canvas.id());
    assert!(session.stream.is_active());
}

#[tokio::test]
async fn test_acquisition_failure_records_nothing() {
    let camera = Arc::new(SyntheticCamera::default());
    camera.fail_with(Some(SyntheticFailure::PermissionDenied));
    let registry = StreamRegistry::new(camera.clone());
    let (video, canvas) = surfaces();

    registry.start_client_stream("alpha", video.clone(), canvas).await;

    assert!(registry.is_empty());
    assert!(!video.has_source());
    assert_eq!(camera.acquisitions(), 0);
}

#[tokio::test]
async fn test_stop_unknown_surface_is_noop() {
    let registry = StreamRegistry::new(Arc::new(SyntheticCamera::default()));
    let (video, canvas) = surfaces();
    registry.start_client_stream("alpha", video, canvas).await;

    let stranger = VideoSurface::new();
    assert_eq!(registry.stop_client_stream(&stranger), None);
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn test_stop_removes_only_matching_session() {
    let camera = Arc::new(SyntheticCamera::default());
    let registry = StreamRegistry::new(camera.clone());
    let (video_a, canvas_a) = surfaces();
    let (video_b, canvas_b) = surfaces();

    registry
        .start_client_stream("alpha", video_a.clone(), canvas_a)
        .await;
    registry
        .start_client_stream("beta", video_b.clone(), canvas_b)
        .await;
    assert_eq!(camera.active_tracks(), 2);

    let alpha = registry.session("alpha").unwrap();
    let beta = registry.session("beta").unwrap();

    assert_eq!(registry.stop_client_stream(&video_a), Some("alpha".to_string()));

    assert_eq!(registry.tokens(), vec!["beta".to_string()]);
    assert!(!alpha.stream.is_active());
    assert!(beta.stream.is_active());
    assert!(!video_a.has_source());
    assert!(video_b.has_source());
    assert_eq!(camera.active_tracks(), 1);

    // Second stop of the same surface finds nothing
    assert_eq!(registry.stop_client_stream(&video_a), None);
}

#[tokio::test]
async fn test_same_token_replaces_and_stops_previous() {
    let camera = Arc::new(SyntheticCamera::default());
    let registry = StreamRegistry::new(camera.clone());
    let (first_video, first_canvas) = surfaces();
    let (second_video, second_canvas) = surfaces();

    registry
        .start_client_stream("alpha", first_video.clone(), first_canvas)
        .await;
    let first = registry.session("alpha").unwrap();

    registry
        .start_client_stream("alpha", second_video.clone(), second_canvas)
        .await;

    assert_eq!(registry.len(), 1);
    assert!(!first.stream.is_active());
    assert!(!first_video.has_source());
    assert!(second_video.has_source());
    assert_eq!(camera.acquisitions(), 2);
    assert_eq!(camera.active_tracks(), 1);

    // The old surface no longer maps to any session
    assert_eq!(registry.stop_client_stream(&first_video), None);
}

#[tokio::test]
async fn test_shutdown_releases_everything() {
    let camera = Arc::new(SyntheticCamera::default());
    let registry = StreamRegistry::new(camera.clone());

    for token in ["alpha", "beta", "gamma"] {
        let (video, canvas) = surfaces();
        registry.start_client_stream(token, video, canvas).await;
    }
    assert_eq!(registry.tokens(), vec!["alpha", "beta", "gamma"]);

    assert_eq!(registry.shutdown(), 3);
    assert!(registry.is_empty());
    assert_eq!(camera.active_tracks(), 0);
    assert_eq!(registry.shutdown(), 0);
}

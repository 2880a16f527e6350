//! Integration tests for the HTTP frame uploader
//!
//! An in-process axum server stands in for the receiving server and records
//! the multipart fields of every frame it accepts.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
    Router,
};
use camfeed_core::*;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

const DATA_URL: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRg==";

type Fields = HashMap<String, String>;

#[derive(Clone)]
struct ServerState {
    status: StatusCode,
    body: &'static str,
    received: Arc<Mutex<Vec<Fields>>>,
}

async fn upload_frame(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> (StatusCode, &'static str) {
    let mut fields = Fields::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if let Ok(value) = field.text().await {
            fields.insert(name, value);
        }
    }

    state.received.lock().push(fields);
    (state.status, state.body)
}

/// Serve `/api/upload_frame/`, answering every frame with `status` and `body`
async fn spawn_server(
    status: StatusCode,
    body: &'static str,
) -> (String, Arc<Mutex<Vec<Fields>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = ServerState {
        status,
        body,
        received: received.clone(),
    };

    let app = Router::new()
        .route(UPLOAD_FRAME_PATH, post(upload_frame))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), received)
}

fn uploader_for(server_url: String) -> HttpUploader {
    HttpUploader::new(&UploaderConfig {
        server_url,
        request_timeout: Some(Duration::from_secs(5)),
        ..UploaderConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_upload_posts_multipart_fields() {
    let (url, received) = spawn_server(
        StatusCode::OK,
        r#"{"ok": true, "motion_score": 0.0, "person": false, "person_score": 0.0, "intrusion_saved": false}"#,
    )
    .await;
    let uploader = uploader_for(url);

    uploader
        .upload(FrameForm::new(DATA_URL, "device-token-1"))
        .await
        .unwrap();

    let received = received.lock();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].len(), 2);
    assert_eq!(received[0][FRAME_FIELD], DATA_URL);
    assert_eq!(received[0][TOKEN_FIELD], "device-token-1");
}

#[tokio::test]
async fn test_trailing_slash_in_server_url() {
    let (url, received) = spawn_server(StatusCode::OK, "{}").await;
    let uploader = uploader_for(format!("{}/", url));

    uploader.upload(FrameForm::new(DATA_URL, "t")).await.unwrap();
    assert_eq!(received.lock().len(), 1);
}

#[tokio::test]
async fn test_non_json_success_body_is_accepted() {
    let (url, received) = spawn_server(StatusCode::OK, "thanks").await;
    let uploader = uploader_for(url);

    assert!(uploader.upload(FrameForm::new(DATA_URL, "t")).await.is_ok());
    assert_eq!(received.lock().len(), 1);
}

#[tokio::test]
async fn test_rejected_upload_reports_status() {
    let (url, received) = spawn_server(StatusCode::BAD_REQUEST, "Invalid token\n").await;
    let uploader = uploader_for(url);

    let err = uploader
        .upload(FrameForm::new(DATA_URL, "unknown"))
        .await
        .unwrap_err();
    assert_eq!(received.lock()[0][TOKEN_FIELD], "unknown");
    assert!(err.to_string().contains("(HTTP 400)"));

    match err {
        CamfeedError::Upload { status, reason, .. } => {
            assert_eq!(status, Some(400));
            assert_eq!(reason, "Invalid token");
        }
        other => panic!("Expected Upload error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_with_empty_body() {
    let (url, _received) = spawn_server(StatusCode::INTERNAL_SERVER_ERROR, "").await;
    let uploader = uploader_for(url);

    let err = uploader
        .upload(FrameForm::new(DATA_URL, "t"))
        .await
        .unwrap_err();

    assert!(matches!(err, CamfeedError::Upload { status: Some(500), .. }));
    assert!(err.to_string().contains("(HTTP 500)"));
}

#[tokio::test]
async fn test_unreachable_server_is_an_upload_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let uploader = uploader_for(format!("http://{}", addr));
    let err = uploader
        .upload(FrameForm::new(DATA_URL, "t"))
        .await
        .unwrap_err();

    assert!(matches!(err, CamfeedError::Upload { status: None, .. }));
    assert!(err.is_transient());
}

#[test]
fn test_uploader_rejects_bad_config() {
    let result = HttpUploader::new(&UploaderConfig {
        server_url: "localhost:8000".to_string(),
        ..UploaderConfig::default()
    });
    assert!(matches!(
        result,
        Err(CamfeedError::InvalidConfiguration { .. })
    ));
}

//! camfeed console client
//!
//! Reads commands from stdin and drives a capture controller:
//!
//! - `start` acquire the camera and begin uploading
//! - `stop` stop uploading and release the camera
//! - `token <value>` change the token sent with the next upload
//! - `status` print upload statistics
//! - `pair` print the capture page URL for the current token
//! - `quit` stop and exit

use anyhow::{Context, Result};
use camfeed::{
    init_logging, CameraBackend, CaptureConfig, CaptureController, HttpUploader, ServerRoutes,
    SyntheticCamera, UploaderConfig, DEFAULT_LOG_DIRECTIVE,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Capture camera frames and upload them as JPEG data URLs")]
struct Args {
    /// Base URL of the receiving server
    #[arg(long, env = "CAMFEED_SERVER", default_value = "http://127.0.0.1:8000")]
    server: String,

    /// Device token sent with every frame
    #[arg(long, env = "CAMFEED_TOKEN", default_value = "")]
    token: String,

    /// Use the generated test pattern instead of a camera
    #[arg(long)]
    synthetic: bool,

    /// Camera index for native capture (default: prefer a rear camera)
    #[arg(long)]
    camera_index: Option<u32>,

    /// JSON capture configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start capturing immediately
    #[arg(long)]
    autostart: bool,
}

#[cfg(feature = "native")]
fn camera_backend(args: &Args) -> Arc<dyn CameraBackend> {
    if args.synthetic {
        return Arc::new(SyntheticCamera::default());
    }
    match args.camera_index {
        Some(index) => Arc::new(camfeed::NativeCamera::with_device_index(index)),
        None => Arc::new(camfeed::NativeCamera::new()),
    }
}

#[cfg(not(feature = "native"))]
fn camera_backend(args: &Args) -> Arc<dyn CameraBackend> {
    if !args.synthetic || args.camera_index.is_some() {
        warn!("Built without native camera support, using the synthetic camera");
    }
    Arc::new(SyntheticCamera::default())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(DEFAULT_LOG_DIRECTIVE)?;

    let config = match &args.config {
        Some(path) => CaptureConfig::from_json_file(path)?,
        None => CaptureConfig::default(),
    };

    let uploader = HttpUploader::new(&UploaderConfig {
        server_url: args.server.clone(),
        ..UploaderConfig::default()
    })?;
    let routes = ServerRoutes::new(&args.server);

    let controller = CaptureController::builder()
        .backend(camera_backend(&args))
        .uploader(Arc::new(uploader))
        .token(&args.token)
        .config(config)
        .build()?;

    info!("Uploading to {}", routes.upload_frame());

    if args.autostart {
        controller.start().await.context("starting capture")?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "" => {}
            "start" => {
                if let Err(e) = controller.start().await {
                    warn!("Start failed: {}", e);
                }
            }
            "stop" => {
                controller.stop();
            }
            "token" => {
                controller.token_input().set(rest.trim());
                info!("Token updated");
            }
            "status" => {
                let stats = controller.stats();
                println!(
                    "running={} sent={} failed={} encode_failed={} bytes={} last={}",
                    controller.is_running(),
                    stats.frames_sent,
                    stats.upload_failures,
                    stats.encode_failures,
                    stats.bytes_sent,
                    stats
                        .last_upload_at
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            "pair" => {
                println!("{}", routes.client_page(&controller.token_input().value()));
            }
            "quit" | "exit" => break,
            other => warn!("Unknown command: {}", other),
        }
    }

    if controller.stop() {
        controller.join().await?;
    }

    Ok(())
}

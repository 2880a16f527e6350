//! Frame upload protocol
//!
//! Frames travel to the server as a multipart form with two text fields:
//! `frame_b64`, a JPEG data URL, and `token`, the device token. The server
//! answers with a small JSON receipt that the client only logs.

use crate::error::CamfeedError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace};

/// Path of the frame upload endpoint
pub const UPLOAD_FRAME_PATH: &str = "/api/upload_frame/";

/// Form field carrying the encoded frame
pub const FRAME_FIELD: &str = "frame_b64";

/// Form field carrying the device token
pub const TOKEN_FIELD: &str = "token";

/// One frame upload, as sent to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameForm {
    /// JPEG data URL (`data:image/jpeg;base64,...`)
    pub frame_b64: String,
    /// Token value at the time the form was built
    pub token: String,
}

impl FrameForm {
    /// Build a form from an encoded frame and a token
    pub fn new(frame_b64: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            frame_b64: frame_b64.into(),
            token: token.into(),
        }
    }

    /// Convert into a reqwest multipart form
    pub fn into_multipart(self) -> reqwest::multipart::Form {
        reqwest::multipart::Form::new()
            .text(FRAME_FIELD, self.frame_b64)
            .text(TOKEN_FIELD, self.token)
    }
}

/// JSON receipt returned by the server after an upload
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UploadReceipt {
    /// Server accepted the frame
    #[serde(default)]
    pub ok: bool,
    /// Fraction of pixels that changed since the previous frame
    #[serde(default)]
    pub motion_score: f64,
    /// A person was detected
    #[serde(default)]
    pub person: bool,
    /// Person detector confidence
    #[serde(default)]
    pub person_score: f64,
    /// The server stored an intrusion snapshot for this frame
    #[serde(default)]
    pub intrusion_saved: bool,
}

/// URLs exposed by the receiving server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRoutes {
    base: String,
}

impl ServerRoutes {
    /// Routes relative to `base` (scheme, host and optional prefix)
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL without trailing slash
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Frame upload endpoint
    pub fn upload_frame(&self) -> String {
        format!("{}{}", self.base, UPLOAD_FRAME_PATH)
    }

    /// Browser capture page for a device token
    pub fn client_page(&self, token: &str) -> String {
        format!("{}/client/?token={}", self.base, token)
    }

    /// Most recent stored frame for a device token
    pub fn last_frame(&self, token: &str) -> String {
        format!("{}/api/last_frame/{}.jpg", self.base, token)
    }
}

/// Uploader configuration
#[derive(Debug, Clone)]
pub struct UploaderConfig {
    /// Server base URL
    pub server_url: String,
    /// Per-request timeout (None = wait for the OS)
    pub request_timeout: Option<Duration>,
    /// User agent header
    pub user_agent: String,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".to_string(),
            request_timeout: Some(Duration::from_secs(10)),
            user_agent: format!("camfeed/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl UploaderConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), CamfeedError> {
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(CamfeedError::InvalidConfiguration {
                message: format!("server url must be http(s): {}", self.server_url),
            });
        }

        if self.request_timeout == Some(Duration::ZERO) {
            return Err(CamfeedError::InvalidConfiguration {
                message: "request timeout must be > 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Sink for encoded frames
#[async_trait]
pub trait FrameUploader: Send + Sync {
    /// Deliver one frame; resolves once the server answered or the request failed
    async fn upload(&self, form: FrameForm) -> Result<(), CamfeedError>;
}

/// Uploads frames over HTTP
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: reqwest::Client,
    routes: ServerRoutes,
}

impl HttpUploader {
    /// Create an uploader for the given configuration
    pub fn new(config: &UploaderConfig) -> Result<Self, CamfeedError> {
        config.validate()?;

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| CamfeedError::Initialization {
            reason: format!("Failed to create HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            routes: ServerRoutes::new(&config.server_url),
        })
    }

    /// Server routes used by this uploader
    pub fn routes(&self) -> &ServerRoutes {
        &self.routes
    }
}

#[async_trait]
impl FrameUploader for HttpUploader {
    async fn upload(&self, form: FrameForm) -> Result<(), CamfeedError> {
        let url = self.routes.upload_frame();
        trace!(bytes = form.frame_b64.len(), "posting frame to {}", url);

        let response = self
            .client
            .post(&url)
            .multipart(form.into_multipart())
            .send()
            .await
            .map_err(|e| CamfeedError::Upload {
                url: url.clone(),
                status: e.status().map(|s| s.as_u16()),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CamfeedError::Upload {
                url,
                status: Some(status.as_u16()),
                reason: body.trim().to_string(),
            });
        }

        // Receipt is informational only
        match response.json::<UploadReceipt>().await {
            Ok(receipt) => debug!(
                motion = receipt.motion_score,
                person = receipt.person,
                intrusion = receipt.intrusion_saved,
                "frame accepted"
            ),
            Err(e) => trace!("upload response was not a receipt: {}", e),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_trim_trailing_slash() {
        let routes = ServerRoutes::new("http://cam.local:8000/");
        assert_eq!(routes.upload_frame(), "http://cam.local:8000/api/upload_frame/");
        assert_eq!(
            routes.client_page("9f2c"),
            "http://cam.local:8000/client/?token=9f2c"
        );
        assert_eq!(
            routes.last_frame("9f2c"),
            "http://cam.local:8000/api/last_frame/9f2c.jpg"
        );
    }

    #[test]
    fn test_config_validation() {
        assert!(UploaderConfig::default().validate().is_ok());

        let config = UploaderConfig {
            server_url: "ftp://example.com".to_string(),
            ..UploaderConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CamfeedError::InvalidConfiguration { .. })
        ));

        let config = UploaderConfig {
            request_timeout: Some(Duration::ZERO),
            ..UploaderConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_receipt_tolerates_missing_fields() {
        let receipt: UploadReceipt = serde_json::from_str(r#"{"ok": true}"#).unwrap();
        assert!(receipt.ok);
        assert!(!receipt.person);
        assert_eq!(receipt.motion_score, 0.0);
    }
}

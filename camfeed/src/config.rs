//! Configuration types and defaults

use camfeed_core::CamfeedError;
use camfeed_media::JpegQuality;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Capture loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Canvas width in pixels; height follows the source aspect ratio
    pub target_width: u32,
    /// JPEG compression factor (0.0 - 1.0)
    pub jpeg_quality: f32,
    /// Height / width ratio used while the source dimensions are unknown
    pub fallback_aspect_ratio: f64,
    /// Pause between two uploads in milliseconds
    pub frame_interval_ms: u64,
    /// Capacity of the session event channel
    pub event_capacity: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            target_width: 640,
            jpeg_quality: 0.6,
            fallback_aspect_ratio: 9.0 / 16.0,
            frame_interval_ms: 200,
            event_capacity: 100,
        }
    }
}

impl CaptureConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), CamfeedError> {
        if self.target_width == 0 {
            return Err(CamfeedError::InvalidConfiguration {
                message: "target width must be > 0".to_string(),
            });
        }

        JpegQuality::new(self.jpeg_quality)?;

        if !self.fallback_aspect_ratio.is_finite() || self.fallback_aspect_ratio <= 0.0 {
            return Err(CamfeedError::InvalidConfiguration {
                message: format!(
                    "fallback aspect ratio must be positive, got {}",
                    self.fallback_aspect_ratio
                ),
            });
        }

        if self.frame_interval_ms == 0 {
            return Err(CamfeedError::InvalidConfiguration {
                message: "frame interval must be > 0".to_string(),
            });
        }

        if self.event_capacity == 0 {
            return Err(CamfeedError::InvalidConfiguration {
                message: "event capacity must be > 0".to_string(),
            });
        }

        Ok(())
    }

    /// Pause between two uploads
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Parse and validate a JSON document; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, CamfeedError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| CamfeedError::InvalidConfiguration {
                message: format!("malformed capture config: {}", e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CamfeedError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| CamfeedError::InvalidConfiguration {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CaptureConfig::default();
        assert_eq!(config.target_width, 640);
        assert_eq!(config.jpeg_quality, 0.6);
        assert_eq!(config.frame_interval(), Duration::from_millis(200));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = CaptureConfig::from_json_str(r#"{"frame_interval_ms": 500}"#).unwrap();
        assert_eq!(config.frame_interval_ms, 500);
        assert_eq!(config.target_width, 640);
    }

    #[test]
    fn test_invalid_values() {
        assert!(CaptureConfig::from_json_str(r#"{"jpeg_quality": 1.5}"#).is_err());
        assert!(CaptureConfig::from_json_str(r#"{"target_width": 0}"#).is_err());
        assert!(CaptureConfig::from_json_str(r#"{"fallback_aspect_ratio": -1.0}"#).is_err());
        assert!(matches!(
            CaptureConfig::from_json_str("not json"),
            Err(CamfeedError::InvalidConfiguration { .. })
        ));
    }
}

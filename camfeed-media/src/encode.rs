//! JPEG encoding and data URLs

use crate::error::{MediaError, MediaResult};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};

/// Prefix of every frame data URL
pub const JPEG_DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Lossy compression factor in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JpegQuality(f32);

impl JpegQuality {
    /// Quality used for uploaded frames
    pub const DEFAULT: Self = Self(0.6);

    pub fn new(value: f32) -> MediaResult<Self> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(MediaError::InvalidConfiguration {
                message: format!("JPEG quality must be within 0.0..=1.0, got {}", value),
            });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    /// Encoder quality on the 1..=100 scale
    pub fn as_percent(&self) -> u8 {
        ((self.0 * 100.0).round() as u8).clamp(1, 100)
    }
}

impl Default for JpegQuality {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Encode an RGB image as baseline JPEG
pub fn encode_jpeg(image: &RgbImage, quality: JpegQuality) -> MediaResult<Vec<u8>> {
    if image.width() == 0 || image.height() == 0 {
        return Err(MediaError::EncodingFailed {
            codec: "JPEG".to_string(),
            reason: "image has no pixels".to_string(),
        });
    }

    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality.as_percent());
    encoder
        .encode_image(image)
        .map_err(|e| MediaError::EncodingFailed {
            codec: "JPEG".to_string(),
            reason: e.to_string(),
        })?;

    Ok(out)
}

/// Wrap JPEG bytes in a data URL
pub fn jpeg_data_url(jpeg: &[u8]) -> String {
    format!("{}{}", JPEG_DATA_URL_PREFIX, STANDARD.encode(jpeg))
}

/// Extract JPEG bytes from a data URL; a bare base64 payload is accepted too
pub fn decode_data_url(url: &str) -> MediaResult<Vec<u8>> {
    let payload = url.strip_prefix(JPEG_DATA_URL_PREFIX).unwrap_or(url);

    STANDARD
        .decode(payload)
        .map_err(|e| MediaError::DecodingFailed {
            codec: "base64".to_string(),
            reason: e.to_string(),
        })
}

/// Decode a frame data URL back into pixels
pub fn decode_frame(url: &str) -> MediaResult<RgbImage> {
    let bytes = decode_data_url(url)?;
    let image = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).map_err(|e| {
        MediaError::DecodingFailed {
            codec: "JPEG".to_string(),
            reason: e.to_string(),
        }
    })?;

    Ok(image.to_rgb8())
}

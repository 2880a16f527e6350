//! Tests for JPEG encoding and frame data URLs

use camfeed_media::*;
use image::{Rgb, RgbImage};

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

#[test]
fn test_encoded_frame_is_jpeg() {
    let jpeg = encode_jpeg(&gradient(64, 36), JpegQuality::DEFAULT).unwrap();

    // SOI marker
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
}

#[test]
fn test_lower_quality_is_smaller() {
    let image = gradient(320, 180);
    let low = encode_jpeg(&image, JpegQuality::new(0.1).unwrap()).unwrap();
    let high = encode_jpeg(&image, JpegQuality::new(1.0).unwrap()).unwrap();
    assert!(low.len() < high.len());
}

#[test]
fn test_data_url_matches_server_parsing() {
    let jpeg = encode_jpeg(&gradient(32, 18), JpegQuality::DEFAULT).unwrap();
    let url = jpeg_data_url(&jpeg);

    assert!(url.starts_with("data:image/jpeg;base64,"));
    assert_eq!(decode_data_url(&url).unwrap(), jpeg);

    // The receiving side also accepts the bare payload
    let bare = url.trim_start_matches(JPEG_DATA_URL_PREFIX);
    assert_eq!(decode_data_url(bare).unwrap(), jpeg);
}

#[test]
fn test_decode_rejects_non_jpeg_payload() {
    let url = format!("{}aGVsbG8=", JPEG_DATA_URL_PREFIX);
    assert!(matches!(
        decode_frame(&url),
        Err(MediaError::DecodingFailed { .. })
    ));
}

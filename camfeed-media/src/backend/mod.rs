//! Camera backends
//!
//! A backend enumerates cameras and turns a [`MediaConstraints`] request into a
//! live [`MediaStream`]. The synthetic backend is always available; the native
//! backend (nokhwa) is behind the `native` feature.

#[cfg(feature = "native")]
pub mod native;
pub mod synthetic;

use crate::constraints::{FacingMode, MediaConstraints};
use crate::error::{MediaError, MediaResult};
use crate::stream::{MediaStream, VideoResolution};
use async_trait::async_trait;

/// Video device information
#[derive(Debug, Clone)]
pub struct VideoDevice {
    pub id: String,
    pub name: String,
    pub description: String,
    pub facing: Option<FacingMode>,
    pub supported_resolutions: Vec<VideoResolution>,
}

/// Platform-specific camera backend
#[async_trait]
pub trait CameraBackend: Send + Sync {
    /// List cameras known to the backend
    fn enumerate_devices(&self) -> MediaResult<Vec<VideoDevice>>;

    /// Acquire a stream that satisfies `constraints`
    async fn get_user_media(&self, constraints: &MediaConstraints) -> MediaResult<MediaStream>;
}

/// Pick the device for a constraint set
///
/// A facing mode is a preference: a device facing the requested way wins,
/// otherwise the first device is used.
pub fn select_device<'a>(
    devices: &'a [VideoDevice],
    constraints: &MediaConstraints,
) -> MediaResult<&'a VideoDevice> {
    let first = devices.first().ok_or_else(|| MediaError::DeviceNotFound {
        device_id: "any camera".to_string(),
    })?;

    let preferred = constraints
        .facing_mode()
        .and_then(|mode| devices.iter().find(|d| d.facing == Some(mode)));

    Ok(preferred.unwrap_or(first))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: &str, facing: Option<FacingMode>) -> VideoDevice {
        VideoDevice {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            facing,
            supported_resolutions: vec![VideoResolution::VGA],
        }
    }

    #[test]
    fn test_select_prefers_facing() {
        let devices = vec![
            device("front", Some(FacingMode::User)),
            device("rear", Some(FacingMode::Environment)),
        ];

        let rear = select_device(&devices, &MediaConstraints::rear_camera()).unwrap();
        assert_eq!(rear.id, "rear");

        let any = select_device(&devices, &MediaConstraints::default_video()).unwrap();
        assert_eq!(any.id, "front");
    }

    #[test]
    fn test_select_falls_back_to_first() {
        let devices = vec![device("usb", None)];
        let chosen = select_device(&devices, &MediaConstraints::rear_camera()).unwrap();
        assert_eq!(chosen.id, "usb");

        assert!(matches!(
            select_device(&[], &MediaConstraints::rear_camera()),
            Err(MediaError::DeviceNotFound { .. })
        ));
    }
}

//! Media constraints passed to camera backends

use crate::error::{MediaError, MediaResult};

/// Which way a camera faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacingMode {
    /// Facing the user (front camera)
    User,
    /// Facing away from the user (rear camera)
    Environment,
}

impl FacingMode {
    /// Guess the facing mode from a device label
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        if ["back", "rear", "environment"]
            .iter()
            .any(|hint| label.contains(hint))
        {
            Some(FacingMode::Environment)
        } else if ["front", "user", "facetime"]
            .iter()
            .any(|hint| label.contains(hint))
        {
            Some(FacingMode::User)
        } else {
            None
        }
    }
}

/// Video part of a constraint set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoConstraints {
    /// No video requested
    Disabled,
    /// Any camera will do
    Any,
    /// Prefer a camera facing this way, fall back to any camera
    Facing(FacingMode),
}

/// Constraint set for camera acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    /// Video request
    pub video: VideoConstraints,
    /// Audio request (not supported by any backend)
    pub audio: bool,
}

impl MediaConstraints {
    /// Rear camera preferred, no audio
    pub const fn rear_camera() -> Self {
        Self {
            video: VideoConstraints::Facing(FacingMode::Environment),
            audio: false,
        }
    }

    /// Any camera, no audio
    pub const fn default_video() -> Self {
        Self {
            video: VideoConstraints::Any,
            audio: false,
        }
    }

    /// Preferred facing mode, if any
    pub fn facing_mode(&self) -> Option<FacingMode> {
        match self.video {
            VideoConstraints::Facing(mode) => Some(mode),
            _ => None,
        }
    }

    /// Validate constraints
    pub fn validate(&self) -> MediaResult<()> {
        if self.audio {
            return Err(MediaError::UnsupportedFormat {
                format: "audio capture".to_string(),
            });
        }

        if self.video == VideoConstraints::Disabled {
            return Err(MediaError::InvalidConfiguration {
                message: "at least one of audio or video must be requested".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self::default_video()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let rear = MediaConstraints::rear_camera();
        assert_eq!(rear.facing_mode(), Some(FacingMode::Environment));
        assert!(!rear.audio);

        let any = MediaConstraints::default_video();
        assert_eq!(any.facing_mode(), None);
        assert!(any.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let audio = MediaConstraints {
            video: VideoConstraints::Any,
            audio: true,
        };
        assert!(matches!(
            audio.validate(),
            Err(MediaError::UnsupportedFormat { .. })
        ));

        let nothing = MediaConstraints {
            video: VideoConstraints::Disabled,
            audio: false,
        };
        assert!(matches!(
            nothing.validate(),
            Err(MediaError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_facing_from_label() {
        assert_eq!(
            FacingMode::from_label("Back Camera"),
            Some(FacingMode::Environment)
        );
        assert_eq!(
            FacingMode::from_label("FaceTime HD Camera"),
            Some(FacingMode::User)
        );
        assert_eq!(FacingMode::from_label("USB2.0 HD UVC WebCam"), None);
    }
}

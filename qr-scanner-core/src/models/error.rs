use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors reported to the host as the failed result of a command.
///
/// The taxonomy is closed and each kind carries a stable numeric code that
/// host bridges rely on.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScannerError {
    #[error("unexpected error")]
    UnexpectedError,

    #[error("camera access denied")]
    CameraAccessDenied,

    #[error("camera access restricted")]
    CameraAccessRestricted,

    #[error("back camera unavailable")]
    BackCameraUnavailable,

    #[error("front camera unavailable")]
    FrontCameraUnavailable,

    #[error("camera unavailable")]
    CameraUnavailable,

    #[error("scan canceled")]
    ScanCanceled,

    #[error("light unavailable")]
    LightUnavailable,

    #[error("open settings unavailable")]
    OpenSettingsUnavailable,
}

impl ScannerError {
    pub const ALL: [ScannerError; 9] = [
        Self::UnexpectedError,
        Self::CameraAccessDenied,
        Self::CameraAccessRestricted,
        Self::BackCameraUnavailable,
        Self::FrontCameraUnavailable,
        Self::CameraUnavailable,
        Self::ScanCanceled,
        Self::LightUnavailable,
        Self::OpenSettingsUnavailable,
    ];

    /// Stable numeric code.
    pub fn code(self) -> u8 {
        match self {
            Self::UnexpectedError => 0,
            Self::CameraAccessDenied => 1,
            Self::CameraAccessRestricted => 2,
            Self::BackCameraUnavailable => 3,
            Self::FrontCameraUnavailable => 4,
            Self::CameraUnavailable => 5,
            Self::ScanCanceled => 6,
            Self::LightUnavailable => 7,
            Self::OpenSettingsUnavailable => 8,
        }
    }

    /// Stable snake_case kind name.
    pub fn name(self) -> &'static str {
        match self {
            Self::UnexpectedError => "unexpected_error",
            Self::CameraAccessDenied => "camera_access_denied",
            Self::CameraAccessRestricted => "camera_access_restricted",
            Self::BackCameraUnavailable => "back_camera_unavailable",
            Self::FrontCameraUnavailable => "front_camera_unavailable",
            Self::CameraUnavailable => "camera_unavailable",
            Self::ScanCanceled => "scan_canceled",
            Self::LightUnavailable => "light_unavailable",
            Self::OpenSettingsUnavailable => "open_settings_unavailable",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.code() == code)
    }
}

impl Serialize for ScannerError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ScannerError", 2)?;
        s.serialize_field("code", &self.code())?;
        s.serialize_field("name", self.name())?;
        s.end()
    }
}

/// Failures raised by a platform backend.
///
/// Never reaches the host directly: the session manager and torch
/// controller map each one onto a `ScannerError` kind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("input rejected: {0}")]
    InputRejected(String),

    #[error("device busy")]
    DeviceBusy,

    #[error("configuration lock failed: {0}")]
    LockFailed(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("backend error: {0}")]
    Other(String),
}

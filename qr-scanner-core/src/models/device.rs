use serde::{Deserialize, Serialize, Serializer};

use super::error::ScannerError;

/// Physical mounting position reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraPosition {
    Front,
    Back,
    Unspecified,
}

/// A camera device available for capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub id: String,
    pub name: String,
    pub position: CameraPosition,
    pub has_torch: bool,
}

impl CameraDevice {
    pub fn new(id: impl Into<String>, name: impl Into<String>, position: CameraPosition) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            has_torch: false,
        }
    }

    pub fn with_torch(mut self) -> Self {
        self.has_torch = true;
        self
    }
}

/// Which camera feeds the session. Host-facing index: back = 0, front = 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "u8")]
pub enum CameraFacing {
    #[default]
    Back,
    Front,
}

impl CameraFacing {
    pub fn index(self) -> u8 {
        match self {
            Self::Back => 0,
            Self::Front => 1,
        }
    }

    pub fn from_index(index: u64) -> Option<Self> {
        match index {
            0 => Some(Self::Back),
            1 => Some(Self::Front),
            _ => None,
        }
    }

    /// The error reported when this camera cannot feed the session.
    pub fn unavailable(self) -> ScannerError {
        match self {
            Self::Back => ScannerError::BackCameraUnavailable,
            Self::Front => ScannerError::FrontCameraUnavailable,
        }
    }

    pub fn position(self) -> CameraPosition {
        match self {
            Self::Back => CameraPosition::Back,
            Self::Front => CameraPosition::Front,
        }
    }
}

impl TryFrom<u8> for CameraFacing {
    type Error = String;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::from_index(u64::from(index)).ok_or_else(|| format!("invalid camera index: {}", index))
    }
}

impl Serialize for CameraFacing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.index())
    }
}

/// A classified camera: the device handle plus the role it fills.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSlot {
    pub role: CameraFacing,
    pub device: CameraDevice,
    pub torch_capable: bool,
}

impl DeviceSlot {
    pub fn new(role: CameraFacing, device: CameraDevice) -> Self {
        let torch_capable = device.has_torch;
        Self {
            role,
            device,
            torch_capable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorchMode {
    Off,
    On,
}

impl From<bool> for TorchMode {
    fn from(on: bool) -> Self {
        if on {
            Self::On
        } else {
            Self::Off
        }
    }
}

/// Lens focus behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMode {
    Locked,
    AutoFocus,
    /// Refocuses on its own as the scene changes. Used while scanning.
    ContinuousAutoFocus,
}

/// Rectangle, in host view coordinates, that the preview is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewFrame {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Default for PreviewFrame {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 640,
            height: 480,
        }
    }
}

use super::error::ScannerError;

/// Capture session state machine.
///
/// State transitions:
/// ```text
/// idle → preparing → running
///   ↑        ↓          ↓
///   └──── destroyed ←───┘
/// ```
///
/// A failed preparation returns straight to `Idle`. `Destroyed` lasts only
/// while teardown runs on the background worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Preparing,
    Running,
    Destroyed,
}

impl CaptureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_preparing(&self) -> bool {
        matches!(self, Self::Preparing)
    }

    /// Whether a fresh preparation may start from this state.
    pub fn can_prepare(&self) -> bool {
        matches!(self, Self::Idle | Self::Destroyed)
    }
}

/// Camera permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    Authorized,
    Denied,
    Restricted,
}

impl AuthorizationStatus {
    /// Maps a settled status onto the command outcome it implies.
    ///
    /// `NotDetermined` is not settled and yields `None`.
    pub fn settled(self) -> Option<Result<(), ScannerError>> {
        match self {
            Self::NotDetermined => None,
            Self::Authorized => Some(Ok(())),
            Self::Denied => Some(Err(ScannerError::CameraAccessDenied)),
            Self::Restricted => Some(Err(ScannerError::CameraAccessRestricted)),
        }
    }
}

use crate::models::device::{CameraDevice, FocusMode, TorchMode};
use crate::models::error::BackendError;
use crate::traits::capture_session::{CaptureInput, CaptureSession};

/// Platform camera stack: device discovery, session construction and
/// device-level configuration.
///
/// Implemented by:
/// - `VirtualCameraBackend` (qr-scanner-virtual)
pub trait CaptureBackend: Send + Sync {
    /// List the video devices currently present. May be slow.
    fn discover_devices(&self) -> Vec<CameraDevice>;

    /// Construct an empty capture session.
    fn open_session(&self) -> Result<Box<dyn CaptureSession>, BackendError>;

    /// Construct an input for `device`.
    fn open_input(&self, device: &CameraDevice) -> Result<Box<dyn CaptureInput>, BackendError>;

    /// Take the exclusive configuration lock on `device`.
    fn lock_for_configuration(&self, device: &CameraDevice) -> Result<(), BackendError>;

    fn unlock_for_configuration(&self, device: &CameraDevice);

    /// Change the torch mode. Requires the configuration lock.
    fn set_torch_mode(&self, device: &CameraDevice, mode: TorchMode) -> Result<(), BackendError>;

    /// Torch mode as currently reported by the hardware.
    fn torch_mode(&self, device: &CameraDevice) -> TorchMode;

    /// Whether the torch can be used right now (e.g. not thermally throttled).
    fn is_torch_available(&self, device: &CameraDevice) -> bool;

    fn is_focus_mode_supported(&self, device: &CameraDevice, mode: FocusMode) -> bool;

    /// Change the focus mode. Requires the configuration lock.
    fn set_focus_mode(&self, device: &CameraDevice, mode: FocusMode) -> Result<(), BackendError>;
}

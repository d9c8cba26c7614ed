use crate::models::device::{CameraDevice, FocusMode};
use crate::models::error::BackendError;
use crate::session::torch::ConfigurationLock;
use crate::traits::capture_backend::CaptureBackend;

/// Put `device` into continuous autofocus under its configuration lock.
///
/// A device without continuous autofocus is left alone. Errors are for the
/// caller to log: focus never fails a preparation or a camera switch.
pub fn enable_continuous_autofocus(
    backend: &dyn CaptureBackend,
    device: &CameraDevice,
) -> Result<(), BackendError> {
    let mode = FocusMode::ContinuousAutoFocus;
    if !backend.is_focus_mode_supported(device, mode) {
        log::debug!("{} has no continuous autofocus", device.id);
        return Ok(());
    }

    let lock = ConfigurationLock::acquire(backend, device)?;
    lock.set_focus_mode(mode)?;
    log::debug!("continuous autofocus on {}", device.id);
    Ok(())
}

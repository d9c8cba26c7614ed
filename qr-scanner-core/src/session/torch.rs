use std::sync::Arc;

use crate::models::device::{CameraDevice, CameraFacing, DeviceSlot, FocusMode, TorchMode};
use crate::models::error::{BackendError, ScannerError};
use crate::session::manager::SessionManager;
use crate::traits::capture_backend::CaptureBackend;

/// Exclusive configuration lock on a device, released on drop.
pub struct ConfigurationLock<'a> {
    backend: &'a dyn CaptureBackend,
    device: &'a CameraDevice,
}

impl<'a> ConfigurationLock<'a> {
    pub fn acquire(
        backend: &'a dyn CaptureBackend,
        device: &'a CameraDevice,
    ) -> Result<Self, BackendError> {
        backend.lock_for_configuration(device)?;
        Ok(Self { backend, device })
    }

    pub fn set_torch_mode(&self, mode: TorchMode) -> Result<(), BackendError> {
        self.backend.set_torch_mode(self.device, mode)
    }

    pub fn set_focus_mode(&self, mode: FocusMode) -> Result<(), BackendError> {
        self.backend.set_focus_mode(self.device, mode)
    }
}

impl Drop for ConfigurationLock<'_> {
    fn drop(&mut self) {
        self.backend.unlock_for_configuration(self.device);
    }
}

/// Drives the back camera's torch.
///
/// Holds no light state of its own: every read goes to the device, so a
/// mode change the hardware rejected never shows up as enabled.
pub struct TorchController {
    backend: Arc<dyn CaptureBackend>,
}

impl TorchController {
    pub fn new(backend: Arc<dyn CaptureBackend>) -> Self {
        Self { backend }
    }

    pub fn set_light(&self, session: &SessionManager, on: bool) -> Result<(), ScannerError> {
        if !session.is_running() {
            return Err(ScannerError::LightUnavailable);
        }
        let slot = Self::torch_slot(session).ok_or(ScannerError::LightUnavailable)?;
        if !self.backend.is_torch_available(&slot.device) {
            log::warn!("torch on {} is not available right now", slot.device.id);
            return Err(ScannerError::LightUnavailable);
        }

        let mode = TorchMode::from(on);
        let lock = ConfigurationLock::acquire(&*self.backend, &slot.device).map_err(|e| {
            log::warn!("could not lock {} for configuration: {}", slot.device.id, e);
            ScannerError::LightUnavailable
        })?;
        lock.set_torch_mode(mode).map_err(|e| {
            log::warn!("torch mode {:?} rejected by {}: {}", mode, slot.device.id, e);
            ScannerError::LightUnavailable
        })?;
        drop(lock);

        log::info!("torch {:?} on {}", self.backend.torch_mode(&slot.device), slot.device.id);
        Ok(())
    }

    /// Torch reads back `On` and the back camera is active.
    pub fn is_light_enabled(&self, session: &SessionManager) -> bool {
        session.active_camera() == CameraFacing::Back
            && Self::torch_slot(session)
                .map(|slot| self.backend.torch_mode(&slot.device) == TorchMode::On)
                .unwrap_or(false)
    }

    /// Back camera has a usable torch and is active.
    pub fn can_enable_light(&self, session: &SessionManager) -> bool {
        session.active_camera() == CameraFacing::Back
            && Self::torch_slot(session)
                .map(|slot| self.backend.is_torch_available(&slot.device))
                .unwrap_or(false)
    }

    fn torch_slot(session: &SessionManager) -> Option<&DeviceSlot> {
        session
            .slots()
            .and_then(|slots| slots.back.as_ref())
            .filter(|slot| slot.torch_capable)
    }
}

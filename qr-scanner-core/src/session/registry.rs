use crate::models::device::{CameraDevice, CameraFacing, CameraPosition, DeviceSlot};
use crate::models::error::ScannerError;
use crate::traits::capture_backend::CaptureBackend;

/// The classified cameras: at most one back and one front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSlots {
    pub back: Option<DeviceSlot>,
    pub front: Option<DeviceSlot>,
}

impl DeviceSlots {
    /// Classify devices by physical position. The first device found for a
    /// position wins; devices without a position are ignored.
    pub fn classify(devices: Vec<CameraDevice>) -> Self {
        let mut slots = Self::default();
        for device in devices {
            let (entry, role) = match device.position {
                CameraPosition::Back => (&mut slots.back, CameraFacing::Back),
                CameraPosition::Front => (&mut slots.front, CameraFacing::Front),
                CameraPosition::Unspecified => {
                    log::debug!("ignoring camera {} with no position", device.id);
                    continue;
                }
            };
            if entry.is_some() {
                log::debug!("ignoring duplicate {:?} camera {}", role, device.id);
                continue;
            }
            *entry = Some(DeviceSlot::new(role, device));
        }
        slots
    }

    pub fn slot(&self, facing: CameraFacing) -> Option<&DeviceSlot> {
        match facing {
            CameraFacing::Back => self.back.as_ref(),
            CameraFacing::Front => self.front.as_ref(),
        }
    }

    pub fn both_populated(&self) -> bool {
        self.back.is_some() && self.front.is_some()
    }

    /// The error for the first missing slot, back before front.
    pub fn missing(&self) -> Option<ScannerError> {
        if self.back.is_none() {
            Some(ScannerError::BackCameraUnavailable)
        } else if self.front.is_none() {
            Some(ScannerError::FrontCameraUnavailable)
        } else {
            None
        }
    }

    /// The camera a new session should start on: `preferred`, unless there
    /// is no back camera, in which case front.
    pub fn initial_facing(&self, preferred: CameraFacing) -> CameraFacing {
        if self.back.is_none() {
            CameraFacing::Front
        } else {
            preferred
        }
    }
}

/// Enumerates the cameras once per session lifetime and keeps the result.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    slots: Option<DeviceSlots>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run device discovery on `backend`. Slow; runs on the worker.
    pub fn discover(backend: &dyn CaptureBackend) -> DeviceSlots {
        let devices = backend.discover_devices();
        log::debug!("discovered {} camera device(s)", devices.len());
        DeviceSlots::classify(devices)
    }

    /// Cached slots, if enumeration already happened.
    pub fn slots(&self) -> Option<&DeviceSlots> {
        self.slots.as_ref()
    }

    /// Cache the result of an enumeration. A cache that is already
    /// populated is kept.
    pub fn install(&mut self, slots: DeviceSlots) -> &DeviceSlots {
        self.slots.get_or_insert(slots)
    }

    /// Drop the cached slots so the next preparation enumerates again.
    pub fn release(&mut self) -> Option<DeviceSlots> {
        self.slots.take()
    }
}

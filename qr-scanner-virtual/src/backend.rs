//! Scripted camera stack.
//!
//! Devices, failures, torch availability and focus support are set by the
//! caller; every device-level call is recorded so scenarios can assert on it.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use qr_scanner_core::models::device::{CameraDevice, CameraPosition, FocusMode, TorchMode};
use qr_scanner_core::models::error::BackendError;
use qr_scanner_core::traits::capture_backend::CaptureBackend;
use qr_scanner_core::traits::capture_session::{CaptureInput, CaptureSession};

use crate::session::{VirtualInput, VirtualSession, VirtualSessionHandle};

pub fn virtual_back_camera() -> CameraDevice {
    CameraDevice::new("virtual-back", "Virtual Back Camera", CameraPosition::Back).with_torch()
}

pub fn virtual_front_camera() -> CameraDevice {
    CameraDevice::new("virtual-front", "Virtual Front Camera", CameraPosition::Front)
}

pub struct VirtualCameraBackend {
    devices: Mutex<Vec<CameraDevice>>,
    discovery_delay: Mutex<Option<Duration>>,
    rejected_inputs: Mutex<HashSet<String>>,
    fail_session: AtomicBool,
    fail_start: AtomicBool,
    torch_available: AtomicBool,
    locks: Mutex<HashSet<String>>,
    torch: Mutex<HashMap<String, TorchMode>>,
    fixed_focus: Mutex<HashSet<String>>,
    focus: Mutex<HashMap<String, FocusMode>>,
    sessions: Mutex<Vec<VirtualSessionHandle>>,
    discoveries: AtomicUsize,
}

impl VirtualCameraBackend {
    pub fn new(devices: Vec<CameraDevice>) -> Self {
        Self {
            devices: Mutex::new(devices),
            discovery_delay: Mutex::new(None),
            rejected_inputs: Mutex::new(HashSet::new()),
            fail_session: AtomicBool::new(false),
            fail_start: AtomicBool::new(false),
            torch_available: AtomicBool::new(true),
            locks: Mutex::new(HashSet::new()),
            torch: Mutex::new(HashMap::new()),
            fixed_focus: Mutex::new(HashSet::new()),
            focus: Mutex::new(HashMap::new()),
            sessions: Mutex::new(Vec::new()),
            discoveries: AtomicUsize::new(0),
        }
    }

    /// A back camera with a torch and a front camera without one.
    pub fn standard() -> Self {
        Self::new(vec![virtual_back_camera(), virtual_front_camera()])
    }

    pub fn set_devices(&self, devices: Vec<CameraDevice>) {
        *self.devices.lock() = devices;
    }

    /// Make every enumeration take `delay`.
    pub fn set_discovery_delay(&self, delay: Duration) {
        *self.discovery_delay.lock() = Some(delay);
    }

    /// Refuse to build an input for `device_id`.
    pub fn reject_input(&self, device_id: &str) {
        self.rejected_inputs.lock().insert(device_id.to_string());
    }

    pub fn fail_session_construction(&self, fail: bool) {
        self.fail_session.store(fail, Ordering::SeqCst);
    }

    pub fn fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    pub fn set_torch_available(&self, available: bool) {
        self.torch_available.store(available, Ordering::SeqCst);
    }

    /// Report `device_id` as fixed-focus.
    pub fn set_fixed_focus(&self, device_id: &str) {
        self.fixed_focus.lock().insert(device_id.to_string());
    }

    pub fn discoveries(&self) -> usize {
        self.discoveries.load(Ordering::SeqCst)
    }

    pub fn sessions_opened(&self) -> usize {
        self.sessions.lock().len()
    }

    /// The most recently constructed session.
    pub fn latest_session(&self) -> Option<VirtualSessionHandle> {
        self.sessions.lock().last().cloned()
    }

    pub fn torch_mode_of(&self, device_id: &str) -> TorchMode {
        self.torch
            .lock()
            .get(device_id)
            .copied()
            .unwrap_or(TorchMode::Off)
    }

    /// Focus mode last applied to `device_id`; `Locked` if never changed.
    pub fn focus_mode_of(&self, device_id: &str) -> FocusMode {
        self.focus
            .lock()
            .get(device_id)
            .copied()
            .unwrap_or(FocusMode::Locked)
    }

    pub fn is_locked(&self, device_id: &str) -> bool {
        self.locks.lock().contains(device_id)
    }
}

impl CaptureBackend for VirtualCameraBackend {
    fn discover_devices(&self) -> Vec<CameraDevice> {
        self.discoveries.fetch_add(1, Ordering::SeqCst);
        let delay = *self.discovery_delay.lock();
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        let devices = self.devices.lock().clone();
        log::debug!("virtual backend enumerated {} device(s)", devices.len());
        devices
    }

    fn open_session(&self) -> Result<Box<dyn CaptureSession>, BackendError> {
        if self.fail_session.load(Ordering::SeqCst) {
            return Err(BackendError::Other("scripted session failure".into()));
        }
        let (session, handle) = VirtualSession::new(self.fail_start.load(Ordering::SeqCst));
        self.sessions.lock().push(handle);
        Ok(Box::new(session))
    }

    fn open_input(&self, device: &CameraDevice) -> Result<Box<dyn CaptureInput>, BackendError> {
        if self.rejected_inputs.lock().contains(&device.id) {
            return Err(BackendError::InputRejected(device.id.clone()));
        }
        if !self.devices.lock().iter().any(|d| d.id == device.id) {
            return Err(BackendError::DeviceNotFound(device.id.clone()));
        }
        Ok(Box::new(VirtualInput::new(&device.id)))
    }

    fn lock_for_configuration(&self, device: &CameraDevice) -> Result<(), BackendError> {
        if !self.locks.lock().insert(device.id.clone()) {
            return Err(BackendError::LockFailed(format!("{} already locked", device.id)));
        }
        Ok(())
    }

    fn unlock_for_configuration(&self, device: &CameraDevice) {
        self.locks.lock().remove(&device.id);
    }

    fn set_torch_mode(&self, device: &CameraDevice, mode: TorchMode) -> Result<(), BackendError> {
        if !self.is_locked(&device.id) {
            return Err(BackendError::LockFailed(format!("{} not locked", device.id)));
        }
        if !device.has_torch {
            return Err(BackendError::Unsupported(format!("{} has no torch", device.id)));
        }
        self.torch.lock().insert(device.id.clone(), mode);
        Ok(())
    }

    fn torch_mode(&self, device: &CameraDevice) -> TorchMode {
        self.torch_mode_of(&device.id)
    }

    fn is_torch_available(&self, device: &CameraDevice) -> bool {
        device.has_torch && self.torch_available.load(Ordering::SeqCst)
    }

    fn is_focus_mode_supported(&self, device: &CameraDevice, mode: FocusMode) -> bool {
        mode == FocusMode::Locked || !self.fixed_focus.lock().contains(&device.id)
    }

    fn set_focus_mode(&self, device: &CameraDevice, mode: FocusMode) -> Result<(), BackendError> {
        if !self.is_locked(&device.id) {
            return Err(BackendError::LockFailed(format!("{} not locked", device.id)));
        }
        if !self.is_focus_mode_supported(device, mode) {
            return Err(BackendError::Unsupported(format!("{} is fixed-focus", device.id)));
        }
        self.focus.lock().insert(device.id.clone(), mode);
        Ok(())
    }
}

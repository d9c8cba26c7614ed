//! Virtual capture session.
//!
//! The session lives inside the scanner; tests keep a `VirtualSessionHandle`
//! to observe it and to feed it decoded values or frames.

use std::sync::Arc;

use parking_lot::Mutex;

use qr_scanner_core::models::error::BackendError;
use qr_scanner_core::traits::capture_session::{
    CaptureInput, CaptureSession, DecodeCallback, Symbology,
};

use crate::frame::{decode_qr, LumaFrame};

pub struct VirtualInput {
    device_id: String,
}

impl VirtualInput {
    pub(crate) fn new(device_id: &str) -> Self {
        Self {
            device_id: device_id.to_string(),
        }
    }
}

impl CaptureInput for VirtualInput {
    fn device_id(&self) -> &str {
        &self.device_id
    }
}

#[derive(Default)]
struct SessionFields {
    input: Option<String>,
    running: bool,
    preview_enabled: bool,
    in_configuration: bool,
    commits: usize,
    symbologies: Vec<Symbology>,
    callback: Option<DecodeCallback>,
    fail_start: bool,
}

#[derive(Default)]
struct SessionShared {
    fields: Mutex<SessionFields>,
}

/// Observer and stimulus side of a `VirtualSession`.
#[derive(Clone)]
pub struct VirtualSessionHandle {
    shared: Arc<SessionShared>,
}

impl VirtualSessionHandle {
    pub fn is_running(&self) -> bool {
        self.shared.fields.lock().running
    }

    pub fn input(&self) -> Option<String> {
        self.shared.fields.lock().input.clone()
    }

    pub fn is_preview_enabled(&self) -> bool {
        self.shared.fields.lock().preview_enabled
    }

    /// Committed configuration transactions.
    pub fn commits(&self) -> usize {
        self.shared.fields.lock().commits
    }

    pub fn symbologies(&self) -> Vec<Symbology> {
        self.shared.fields.lock().symbologies.clone()
    }

    /// Act as if the decode output recognized `value`.
    ///
    /// Returns `false` when nothing was delivered: the session is stopped,
    /// has no input, is mid-configuration, or has no decode output.
    pub fn deliver_code(&self, value: &str) -> bool {
        let callback = {
            let f = self.shared.fields.lock();
            if !f.running || f.input.is_none() || f.in_configuration {
                return false;
            }
            match &f.callback {
                Some(callback) => Arc::clone(callback),
                None => return false,
            }
        };
        callback(value);
        true
    }

    /// Run `frame` through the QR decoder and deliver every value found.
    /// Returns how many values were delivered.
    pub fn deliver_frame(&self, frame: &LumaFrame) -> usize {
        if !self.shared.fields.lock().symbologies.contains(&Symbology::Qr) {
            return 0;
        }
        decode_qr(frame)
            .iter()
            .filter(|value| self.deliver_code(value))
            .count()
    }
}

pub struct VirtualSession {
    shared: Arc<SessionShared>,
}

impl VirtualSession {
    pub(crate) fn new(fail_start: bool) -> (Self, VirtualSessionHandle) {
        let shared = Arc::new(SessionShared::default());
        shared.fields.lock().fail_start = fail_start;
        let handle = VirtualSessionHandle {
            shared: Arc::clone(&shared),
        };
        (Self { shared }, handle)
    }
}

impl CaptureSession for VirtualSession {
    fn begin_configuration(&mut self) {
        self.shared.fields.lock().in_configuration = true;
    }

    fn commit_configuration(&mut self) {
        let mut f = self.shared.fields.lock();
        f.in_configuration = false;
        f.commits += 1;
    }

    fn add_input(&mut self, input: Box<dyn CaptureInput>) -> Result<(), BackendError> {
        let mut f = self.shared.fields.lock();
        if let Some(current) = &f.input {
            return Err(BackendError::InputRejected(format!(
                "session already bound to {}",
                current
            )));
        }
        f.input = Some(input.device_id().to_string());
        Ok(())
    }

    fn remove_input(&mut self) -> Option<Box<dyn CaptureInput>> {
        let id = self.shared.fields.lock().input.take()?;
        Some(Box::new(VirtualInput { device_id: id }))
    }

    fn current_input(&self) -> Option<String> {
        self.shared.fields.lock().input.clone()
    }

    fn set_decode_output(
        &mut self,
        symbologies: &[Symbology],
        callback: DecodeCallback,
    ) -> Result<(), BackendError> {
        if symbologies.is_empty() {
            return Err(BackendError::Unsupported("empty symbology list".into()));
        }
        let mut f = self.shared.fields.lock();
        f.symbologies = symbologies.to_vec();
        f.callback = Some(callback);
        Ok(())
    }

    fn start_running(&mut self) -> Result<(), BackendError> {
        let mut f = self.shared.fields.lock();
        if f.fail_start {
            return Err(BackendError::DeviceBusy);
        }
        if f.input.is_none() {
            return Err(BackendError::Other("no input".into()));
        }
        f.running = true;
        Ok(())
    }

    fn stop_running(&mut self) {
        self.shared.fields.lock().running = false;
    }

    fn is_running(&self) -> bool {
        self.shared.fields.lock().running
    }

    fn set_preview_enabled(&mut self, enabled: bool) {
        self.shared.fields.lock().preview_enabled = enabled;
    }

    fn is_preview_enabled(&self) -> bool {
        self.shared.fields.lock().preview_enabled
    }
}

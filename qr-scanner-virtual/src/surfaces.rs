//! Host-side collaborators: preview surface, settings link, response channel.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use qr_scanner_core::models::command::Response;
use qr_scanner_core::models::device::PreviewFrame;
use qr_scanner_core::models::error::BackendError;
use qr_scanner_core::traits::preview_sink::PreviewSink;
use qr_scanner_core::traits::response_sink::ResponseSink;
use qr_scanner_core::traits::settings_opener::SettingsOpener;

#[derive(Default)]
pub struct VirtualPreview {
    attached: Mutex<Option<PreviewFrame>>,
    visible: AtomicBool,
}

impl VirtualPreview {
    pub fn attached_frame(&self) -> Option<PreviewFrame> {
        *self.attached.lock()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }
}

impl PreviewSink for VirtualPreview {
    fn attach(&self, frame: PreviewFrame) {
        *self.attached.lock() = Some(frame);
    }

    fn detach(&self) {
        self.attached.lock().take();
    }

    fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }
}

pub struct VirtualSettings {
    available: AtomicBool,
    opened: AtomicUsize,
    open_delay: Mutex<Option<Duration>>,
}

impl VirtualSettings {
    pub fn new(available: bool) -> Self {
        Self {
            available: AtomicBool::new(available),
            opened: AtomicUsize::new(0),
            open_delay: Mutex::new(None),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Make every `open` block the calling thread for `delay`, as a host
    /// switching to its settings app can.
    pub fn set_open_delay(&self, delay: Duration) {
        *self.open_delay.lock() = Some(delay);
    }

    pub fn times_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl SettingsOpener for VirtualSettings {
    fn can_open(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn open(&self) -> Result<(), BackendError> {
        if !self.can_open() {
            return Err(BackendError::Unsupported("settings link".into()));
        }
        let delay = *self.open_delay.lock();
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Response sink backed by an in-process channel.
pub struct ChannelResponseSink {
    sender: Mutex<mpsc::Sender<Response>>,
    receiver: Mutex<mpsc::Receiver<Response>>,
}

impl Default for ChannelResponseSink {
    fn default() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender: Mutex::new(sender),
            receiver: Mutex::new(receiver),
        }
    }
}

impl ChannelResponseSink {
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Response> {
        self.receiver.lock().recv_timeout(timeout).ok()
    }

    /// Responses already delivered, without waiting.
    pub fn drain(&self) -> Vec<Response> {
        self.receiver.lock().try_iter().collect()
    }
}

impl ResponseSink for ChannelResponseSink {
    fn deliver(&self, response: Response) {
        if self.sender.lock().send(response).is_err() {
            log::warn!("response channel closed, dropping response");
        }
    }
}

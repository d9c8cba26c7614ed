//! # qr-scanner-virtual
//!
//! In-process virtual camera backend for qr-scanner.
//!
//! Provides:
//! - `VirtualCameraBackend` — scripted device list, failures and torch
//! - `VirtualSession` — capture session fed by `deliver_code` or by grayscale
//!   frames decoded with `rqrr`
//! - `VirtualAuthorizer` — permission prompt answered immediately or on demand
//! - `VirtualPreview`, `VirtualSettings`, `ChannelResponseSink` — host surfaces
//!
//! ## Usage
//! ```ignore
//! use qr_scanner_core::{Command, ScannerConfiguration};
//! use qr_scanner_virtual::VirtualPlatform;
//!
//! let platform = VirtualPlatform::standard();
//! let scanner = platform.build(ScannerConfiguration::default()).unwrap();
//! scanner.submit("req-1", Command::Scan);
//! platform.backend.latest_session().unwrap().deliver_code("ABC123");
//! ```

pub mod authorizer;
pub mod backend;
pub mod frame;
pub mod session;
pub mod surfaces;

#[cfg(test)]
mod scenarios;

use std::sync::Arc;

use qr_scanner_core::models::config::ScannerConfiguration;
use qr_scanner_core::models::error::ScannerError;
use qr_scanner_core::scanner::{Scanner, ScannerPlatform};

pub use authorizer::{PromptAnswer, VirtualAuthorizer};
pub use backend::{virtual_back_camera, virtual_front_camera, VirtualCameraBackend};
pub use frame::{decode_qr, FrameError, LumaFrame};
pub use session::{VirtualInput, VirtualSession, VirtualSessionHandle};
pub use surfaces::{ChannelResponseSink, VirtualPreview, VirtualSettings};

/// Every virtual collaborator, kept so the caller can script and observe
/// them while a `Scanner` runs on top.
#[derive(Clone)]
pub struct VirtualPlatform {
    pub backend: Arc<VirtualCameraBackend>,
    pub authorizer: Arc<VirtualAuthorizer>,
    pub preview: Arc<VirtualPreview>,
    pub settings: Arc<VirtualSettings>,
    pub responses: Arc<ChannelResponseSink>,
}

impl VirtualPlatform {
    pub fn new(backend: VirtualCameraBackend, authorizer: VirtualAuthorizer) -> Self {
        Self {
            backend: Arc::new(backend),
            authorizer: Arc::new(authorizer),
            preview: Arc::new(VirtualPreview::default()),
            settings: Arc::new(VirtualSettings::new(true)),
            responses: Arc::new(ChannelResponseSink::default()),
        }
    }

    /// Both cameras present, access already granted.
    pub fn standard() -> Self {
        Self::new(VirtualCameraBackend::standard(), VirtualAuthorizer::authorized())
    }

    pub fn scanner_platform(&self) -> ScannerPlatform {
        ScannerPlatform {
            backend: self.backend.clone(),
            authorizer: self.authorizer.clone(),
            preview: self.preview.clone(),
            settings: self.settings.clone(),
            responses: self.responses.clone(),
        }
    }

    pub fn build(&self, config: ScannerConfiguration) -> Result<Scanner, ScannerError> {
        Scanner::new(self.scanner_platform(), config)
    }
}

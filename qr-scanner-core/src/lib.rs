//! # qr-scanner-core
//!
//! Platform-agnostic QR scanning service.
//!
//! Owns the capture-session lifecycle, camera permission, device selection,
//! torch control, and the "next decoded value" scan contract. Platform
//! backends implement the traits in `traits/` and plug into `Scanner`.
//!
//! ## Architecture
//!
//! ```text
//! qr-scanner-core (this crate)
//! ├── traits/    ← CaptureBackend, CaptureSession, CameraAuthorizer, PreviewSink, SettingsOpener, ResponseSink
//! ├── models/    ← ScannerError, CaptureState, CameraFacing, StatusSnapshot, Command, ScannerConfiguration
//! ├── runtime/   ← SerialExecutor (worker / response threads), Reply (exactly-once responses)
//! ├── session/   ← SessionManager, DeviceRegistry, DecodeRelay, TorchController, autofocus
//! ├── scan/      ← ScanArbiter
//! └── scanner/   ← Scanner (command dispatch), AuthorizationGate, StatusView
//! ```

pub mod models;
pub mod runtime;
pub mod scan;
pub mod scanner;
pub mod session;
pub mod traits;


// Re-export key types at crate root for convenience.
pub use models::command::{Command, RequestId, Response, ResponsePayload};
pub use models::config::ScannerConfiguration;
pub use models::device::{
    CameraDevice, CameraFacing, CameraPosition, FocusMode, PreviewFrame, TorchMode,
};
pub use models::error::{BackendError, ScannerError};
pub use models::state::{AuthorizationStatus, CaptureState};
pub use models::status::StatusSnapshot;
pub use scanner::{Scanner, ScannerPlatform};
pub use traits::authorizer::{AccessCallback, CameraAuthorizer};
pub use traits::capture_backend::CaptureBackend;
pub use traits::capture_session::{CaptureInput, CaptureSession, DecodeCallback, Symbology};
pub use traits::preview_sink::PreviewSink;
pub use traits::response_sink::ResponseSink;
pub use traits::settings_opener::SettingsOpener;

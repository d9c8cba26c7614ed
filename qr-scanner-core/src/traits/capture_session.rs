use std::sync::Arc;

use crate::models::error::BackendError;

/// Machine-readable code formats the decode output can be asked to detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbology {
    Qr,
}

/// Callback invoked with each decoded value.
///
/// Fires on a platform-owned thread and must return quickly.
pub type DecodeCallback = Arc<dyn Fn(&str) + Send + Sync + 'static>;

/// A device input constructed for one camera.
pub trait CaptureInput: Send {
    /// Identifier of the device feeding this input.
    fn device_id(&self) -> &str;
}

/// A platform capture session binding one input, a decode output and the
/// preview connection.
///
/// All methods are called from the scanner's own execution contexts, never
/// concurrently.
pub trait CaptureSession: Send {
    /// Open a configuration transaction. Changes apply atomically on commit.
    fn begin_configuration(&mut self);

    fn commit_configuration(&mut self);

    fn add_input(&mut self, input: Box<dyn CaptureInput>) -> Result<(), BackendError>;

    /// Detach and return the current input, if any.
    fn remove_input(&mut self) -> Option<Box<dyn CaptureInput>>;

    /// Device id of the current input.
    fn current_input(&self) -> Option<String>;

    /// Install the decode output. Replaces any previously installed callback.
    fn set_decode_output(
        &mut self,
        symbologies: &[Symbology],
        callback: DecodeCallback,
    ) -> Result<(), BackendError>;

    fn start_running(&mut self) -> Result<(), BackendError>;

    fn stop_running(&mut self);

    fn is_running(&self) -> bool;

    /// Enable or disable the live preview connection without stopping capture.
    fn set_preview_enabled(&mut self, enabled: bool);

    fn is_preview_enabled(&self) -> bool;
}

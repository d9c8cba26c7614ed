use super::device::{CameraFacing, PreviewFrame};

/// Configuration for a scanner instance, supplied once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfiguration {
    /// Camera used by the first preparation and restored on destroy
    /// (default: back).
    pub initial_camera: CameraFacing,

    /// Rectangle handed to the preview sink when the session attaches it.
    pub preview_frame: PreviewFrame,

    /// Name of the background thread running session setup and teardown.
    pub worker_thread_name: String,

    /// Name of the thread delivering decode events and command results.
    pub response_thread_name: String,
}

impl ScannerConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.preview_frame.width == 0 || self.preview_frame.height == 0 {
            return Err(format!(
                "preview frame must have a non-zero size, got {}x{}",
                self.preview_frame.width, self.preview_frame.height
            ));
        }
        if self.worker_thread_name.trim().is_empty() {
            return Err("worker thread name must not be empty".into());
        }
        if self.response_thread_name.trim().is_empty() {
            return Err("response thread name must not be empty".into());
        }
        Ok(())
    }
}

impl Default for ScannerConfiguration {
    fn default() -> Self {
        Self {
            initial_camera: CameraFacing::Back,
            preview_frame: PreviewFrame::default(),
            worker_thread_name: "qr-scanner-worker".into(),
            response_thread_name: "qr-scanner-responses".into(),
        }
    }
}

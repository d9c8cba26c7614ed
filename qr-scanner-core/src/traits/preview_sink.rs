use crate::models::device::PreviewFrame;

/// The host's preview surface.
///
/// Owned by the host UI. The scanner only attaches the live preview to it,
/// detaches it, and toggles its visibility.
pub trait PreviewSink: Send + Sync {
    fn attach(&self, frame: PreviewFrame);

    fn detach(&self);

    /// Show or hide the surface (`show` / `hide` commands).
    fn set_visible(&self, visible: bool);
}

use crate::models::state::AuthorizationStatus;
use crate::models::status::StatusSnapshot;
use crate::scan::arbiter::ScanArbiter;
use crate::session::manager::SessionManager;
use crate::session::registry::DeviceSlots;
use crate::session::torch::TorchController;

/// Borrowed view over every component, reduced to a `StatusSnapshot`.
///
/// Reads in-memory state and the torch mode only: no enumeration, no
/// permission prompt, no waiting on the worker.
pub struct StatusView<'a> {
    pub authorization: AuthorizationStatus,
    pub session: &'a SessionManager,
    pub arbiter: &'a ScanArbiter,
    pub torch: &'a TorchController,
    pub showing: bool,
    pub can_open_settings: bool,
}

impl StatusView<'_> {
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            authorized: self.authorization == AuthorizationStatus::Authorized,
            denied: self.authorization == AuthorizationStatus::Denied,
            restricted: self.authorization == AuthorizationStatus::Restricted,
            prepared: self.session.is_running(),
            scanning: self.arbiter.is_scanning(),
            previewing: self.session.is_preview_enabled(),
            showing: self.showing,
            light_enabled: self.torch.is_light_enabled(self.session),
            can_open_settings: self.can_open_settings,
            can_enable_light: self.torch.can_enable_light(self.session),
            can_change_camera: self
                .session
                .slots()
                .map(DeviceSlots::both_populated)
                .unwrap_or(false),
            current_camera: self.session.active_camera(),
        }
    }
}

use serde::Serialize;

use super::device::CameraFacing;

/// Point-in-time summary of everything the host can observe.
///
/// Computed on demand by the status aggregator and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub authorized: bool,
    pub denied: bool,
    pub restricted: bool,
    pub prepared: bool,
    pub scanning: bool,
    pub previewing: bool,
    pub showing: bool,
    pub light_enabled: bool,
    pub can_open_settings: bool,
    pub can_enable_light: bool,
    pub can_change_camera: bool,
    pub current_camera: CameraFacing,
}

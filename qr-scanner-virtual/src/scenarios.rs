//! End-to-end scenarios: a real `Scanner` on the virtual platform.

use std::collections::HashMap;
use std::time::Duration;

use qr_scanner_core::models::command::{Command, Response};
use qr_scanner_core::models::config::ScannerConfiguration;
use qr_scanner_core::models::device::{CameraFacing, FocusMode, PreviewFrame, TorchMode};
use qr_scanner_core::models::error::ScannerError;
use qr_scanner_core::models::state::{AuthorizationStatus, CaptureState};
use qr_scanner_core::models::status::StatusSnapshot;
use qr_scanner_core::scanner::Scanner;

use crate::frame::render_qr;
use crate::{
    virtual_back_camera, virtual_front_camera, LumaFrame, PromptAnswer, VirtualAuthorizer,
    VirtualCameraBackend, VirtualPlatform, VirtualSessionHandle,
};

const TIMEOUT: Duration = Duration::from_secs(5);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct Rig {
    platform: VirtualPlatform,
    scanner: Scanner,
}

impl Rig {
    fn new(platform: VirtualPlatform) -> Self {
        init_logger();
        let scanner = platform
            .build(ScannerConfiguration::default())
            .expect("scanner");
        Self { platform, scanner }
    }

    fn standard() -> Self {
        Self::new(VirtualPlatform::standard())
    }

    fn send(&self, id: &str, command: Command) {
        self.scanner.submit(id, command);
    }

    fn next(&self) -> Response {
        self.platform
            .responses
            .recv_timeout(TIMEOUT)
            .expect("no response within timeout")
    }

    /// Send and wait for the response to this request.
    fn call(&self, id: &str, command: Command) -> Response {
        self.send(id, command);
        let response = self.next();
        assert_eq!(response.request_id.as_str(), id);
        response
    }

    fn status_of(&self, id: &str, command: Command) -> StatusSnapshot {
        let response = self.call(id, command);
        match response.status() {
            Some(status) => *status,
            None => panic!("{} failed: {:?}", id, response.outcome),
        }
    }

    fn session(&self) -> VirtualSessionHandle {
        self.platform.backend.latest_session().expect("session")
    }

    fn assert_quiet(&self) {
        let late = self.platform.responses.recv_timeout(Duration::from_millis(100));
        assert!(late.is_none(), "unexpected response: {:?}", late);
    }
}

#[test]
fn prepare_scan_destroy() {
    let rig = Rig::standard();

    let status = rig.status_of("prepare", Command::Prepare);
    assert!(status.authorized);
    assert!(status.prepared);
    assert!(status.previewing);
    assert!(status.can_change_camera);
    assert_eq!(status.current_camera, CameraFacing::Back);
    assert_eq!(rig.session().input().as_deref(), Some("virtual-back"));
    assert_eq!(rig.platform.preview.attached_frame(), Some(PreviewFrame::default()));

    rig.send("scan", Command::Scan);
    assert!(rig.session().deliver_code("ABC123"));
    let scanned = rig.next();
    assert_eq!(scanned.request_id.as_str(), "scan");
    assert_eq!(scanned.decoded(), Some("ABC123"));
    assert!(!rig.scanner.status().scanning);

    let status = rig.status_of("destroy", Command::Destroy);
    assert!(!status.prepared);
    assert!(!status.previewing);
    assert!(!status.showing);
    assert!(!rig.session().is_running());
    assert!(rig.session().input().is_none());
    assert!(rig.platform.preview.attached_frame().is_none());
    assert_eq!(rig.scanner.capture_state(), CaptureState::Idle);
    rig.assert_quiet();
}

#[test]
fn denied_access_fails_prepare() {
    let rig = Rig::new(VirtualPlatform::new(
        VirtualCameraBackend::standard(),
        VirtualAuthorizer::new(AuthorizationStatus::Denied, PromptAnswer::Grant),
    ));

    let response = rig.call("prepare", Command::Prepare);
    assert_eq!(response.error(), Some(ScannerError::CameraAccessDenied));

    let status = rig.status_of("status", Command::GetStatus);
    assert!(status.denied);
    assert!(!status.prepared);
    assert_eq!(rig.platform.authorizer.prompts(), 0);
    assert_eq!(rig.platform.backend.discoveries(), 0);
}

#[test]
fn refused_prompt_fails_scan() {
    let rig = Rig::new(VirtualPlatform::new(
        VirtualCameraBackend::standard(),
        VirtualAuthorizer::new(AuthorizationStatus::NotDetermined, PromptAnswer::Deny),
    ));

    let response = rig.call("scan", Command::Scan);
    assert_eq!(response.error(), Some(ScannerError::CameraAccessDenied));
    assert_eq!(rig.platform.authorizer.prompts(), 1);

    // the answer sticks; no second prompt
    let response = rig.call("prepare", Command::Prepare);
    assert_eq!(response.error(), Some(ScannerError::CameraAccessDenied));
    assert_eq!(rig.platform.authorizer.prompts(), 1);
}

#[test]
fn restricted_access_fails_prepare() {
    let rig = Rig::new(VirtualPlatform::new(
        VirtualCameraBackend::standard(),
        VirtualAuthorizer::new(AuthorizationStatus::Restricted, PromptAnswer::Grant),
    ));

    let response = rig.call("prepare", Command::Prepare);
    assert_eq!(response.error(), Some(ScannerError::CameraAccessRestricted));
    assert!(rig.scanner.status().restricted);
}

#[test]
fn missing_back_camera_forces_front() {
    let rig = Rig::new(VirtualPlatform::new(
        VirtualCameraBackend::new(vec![virtual_front_camera()]),
        VirtualAuthorizer::authorized(),
    ));

    let status = rig.status_of("prepare", Command::Prepare);
    assert_eq!(status.current_camera, CameraFacing::Front);
    assert!(!status.can_change_camera);
    assert!(!status.can_enable_light);

    let response = rig.call("back", Command::UseCamera(CameraFacing::Back));
    assert_eq!(response.error(), Some(ScannerError::BackCameraUnavailable));

    let status = rig.status_of("status", Command::GetStatus);
    assert_eq!(status.current_camera, CameraFacing::Front);
    assert!(status.prepared);
    assert_eq!(rig.session().input().as_deref(), Some("virtual-front"));
}

#[test]
fn no_cameras_at_all() {
    let rig = Rig::new(VirtualPlatform::new(
        VirtualCameraBackend::new(Vec::new()),
        VirtualAuthorizer::authorized(),
    ));

    let response = rig.call("prepare", Command::Prepare);
    assert_eq!(response.error(), Some(ScannerError::FrontCameraUnavailable));
    assert_eq!(rig.scanner.capture_state(), CaptureState::Idle);
}

#[test]
fn second_prepare_reuses_session() {
    let rig = Rig::standard();

    assert!(rig.status_of("first", Command::Prepare).prepared);
    assert!(rig.status_of("second", Command::Prepare).prepared);

    assert_eq!(rig.platform.backend.sessions_opened(), 1);
    assert_eq!(rig.platform.backend.discoveries(), 1);
}

#[test]
fn concurrent_prepares_build_one_session() {
    let rig = Rig::standard();
    rig.platform
        .backend
        .set_discovery_delay(Duration::from_millis(100));

    rig.send("a", Command::Prepare);
    rig.send("b", Command::Prepare);
    rig.send("c", Command::EnableLight);

    assert_eq!(rig.next().request_id.as_str(), "a");
    assert_eq!(rig.next().request_id.as_str(), "b");
    let light = rig.next();
    assert_eq!(light.request_id.as_str(), "c");
    assert!(light.status().map(|s| s.light_enabled).unwrap_or(false));
    assert_eq!(rig.platform.backend.sessions_opened(), 1);
}

#[test]
fn cancel_before_decode() {
    let rig = Rig::standard();
    rig.status_of("prepare", Command::Prepare);

    rig.send("scan", Command::Scan);
    rig.send("cancel", Command::CancelScan);

    let canceled = rig.next();
    assert_eq!(canceled.request_id.as_str(), "scan");
    assert_eq!(canceled.error(), Some(ScannerError::ScanCanceled));
    let status = rig.next();
    assert_eq!(status.request_id.as_str(), "cancel");
    assert!(!status.status().map(|s| s.scanning).unwrap_or(true));

    // a decode with nothing pending resolves nothing
    rig.session().deliver_code("LATE");
    rig.assert_quiet();
}

#[test]
fn cancel_without_scan_reports_status() {
    let rig = Rig::standard();
    let status = rig.status_of("cancel", Command::CancelScan);
    assert!(!status.scanning);
    assert!(!status.prepared);
}

#[test]
fn new_scan_supersedes_pending_one() {
    let rig = Rig::standard();
    rig.status_of("prepare", Command::Prepare);

    rig.send("first", Command::Scan);
    rig.send("second", Command::Scan);
    let superseded = rig.next();
    assert_eq!(superseded.request_id.as_str(), "first");
    assert_eq!(superseded.error(), Some(ScannerError::ScanCanceled));

    rig.session().deliver_code("QR-2");
    let scanned = rig.next();
    assert_eq!(scanned.request_id.as_str(), "second");
    assert_eq!(scanned.decoded(), Some("QR-2"));
}

#[test]
fn scan_prepares_implicitly() {
    let rig = Rig::standard();

    rig.send("scan", Command::Scan);
    // wait for the session to come up before feeding it
    for _ in 0..500 {
        if rig.scanner.status().scanning {
            break;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    assert!(rig.scanner.status().prepared);
    rig.session().deliver_code("IMPLICIT");

    assert_eq!(rig.next().decoded(), Some("IMPLICIT"));
}

#[test]
fn pause_and_resume_preview() {
    let rig = Rig::standard();
    rig.status_of("prepare", Command::Prepare);
    rig.send("scan", Command::Scan);

    let paused = rig.status_of("pause", Command::PausePreview);
    assert!(!paused.scanning);
    assert!(!paused.previewing);
    assert!(!rig.session().is_preview_enabled());
    assert!(rig.session().is_running());

    rig.session().deliver_code("WHILE-PAUSED");

    let resumed = rig.status_of("resume", Command::ResumePreview);
    assert!(resumed.scanning);
    assert!(resumed.previewing);

    rig.session().deliver_code("AFTER");
    let scanned = rig.next();
    assert_eq!(scanned.request_id.as_str(), "scan");
    assert_eq!(scanned.decoded(), Some("AFTER"));
}

#[test]
fn pause_without_scan_keeps_scanning_off() {
    let rig = Rig::standard();
    rig.status_of("prepare", Command::Prepare);

    assert!(!rig.status_of("pause", Command::PausePreview).previewing);
    let resumed = rig.status_of("resume", Command::ResumePreview);
    assert!(!resumed.scanning);
    assert!(resumed.previewing);
}

#[test]
fn scan_while_paused_resumes() {
    let rig = Rig::standard();
    rig.status_of("prepare", Command::Prepare);
    rig.send("first", Command::Scan);
    rig.status_of("pause", Command::PausePreview);

    rig.send("second", Command::Scan);
    assert_eq!(rig.next().error(), Some(ScannerError::ScanCanceled));

    let status = rig.scanner.status();
    assert!(status.scanning);
    assert!(status.previewing);
}

#[test]
fn switch_camera_and_back() {
    let rig = Rig::standard();
    rig.status_of("prepare", Command::Prepare);

    let front = rig.status_of("front", Command::UseCamera(CameraFacing::Front));
    assert_eq!(front.current_camera, CameraFacing::Front);
    assert!(!front.can_enable_light);
    assert_eq!(rig.session().input().as_deref(), Some("virtual-front"));
    assert_eq!(rig.session().commits(), 1);

    rig.send("scan", Command::Scan);
    rig.session().deliver_code("FROM-FRONT");
    assert_eq!(rig.next().decoded(), Some("FROM-FRONT"));

    let back = rig.status_of("back", Command::UseCamera(CameraFacing::Back));
    assert_eq!(back.current_camera, CameraFacing::Back);
    assert_eq!(rig.platform.backend.sessions_opened(), 1);
}

#[test]
fn failed_switch_keeps_running_input() {
    let rig = Rig::standard();
    rig.platform.backend.reject_input("virtual-front");
    rig.status_of("prepare", Command::Prepare);

    let response = rig.call("front", Command::UseCamera(CameraFacing::Front));
    assert_eq!(response.error(), Some(ScannerError::FrontCameraUnavailable));

    let status = rig.scanner.status();
    assert!(status.prepared);
    assert_eq!(status.current_camera, CameraFacing::Back);
    assert_eq!(rig.session().input().as_deref(), Some("virtual-back"));
    assert!(rig.session().is_running());
}

#[test]
fn use_current_camera_does_not_prepare() {
    let rig = Rig::standard();
    let status = rig.status_of("back", Command::UseCamera(CameraFacing::Back));
    assert!(!status.prepared);
    assert_eq!(rig.platform.backend.sessions_opened(), 0);
}

#[test]
fn use_camera_prepares_first() {
    let rig = Rig::standard();
    let status = rig.status_of("front", Command::UseCamera(CameraFacing::Front));
    assert!(status.prepared);
    assert_eq!(status.current_camera, CameraFacing::Front);
}

#[test]
fn torch_round_trip() {
    let rig = Rig::standard();

    let on = rig.status_of("on", Command::EnableLight);
    assert!(on.prepared);
    assert!(on.light_enabled);
    assert!(on.can_enable_light);
    assert_eq!(rig.platform.backend.torch_mode_of("virtual-back"), TorchMode::On);
    assert!(!rig.platform.backend.is_locked("virtual-back"));

    let off = rig.status_of("off", Command::DisableLight);
    assert!(!off.light_enabled);
    assert_eq!(rig.platform.backend.torch_mode_of("virtual-back"), TorchMode::Off);
}

#[test]
fn torch_unavailable_without_capable_back_camera() {
    let rig = Rig::new(VirtualPlatform::new(
        VirtualCameraBackend::new(vec![virtual_front_camera()]),
        VirtualAuthorizer::authorized(),
    ));

    let response = rig.call("on", Command::EnableLight);
    assert_eq!(response.error(), Some(ScannerError::LightUnavailable));
    // the implicit prepare still happened
    assert!(rig.scanner.status().prepared);
}

#[test]
fn throttled_torch_reported_unavailable() {
    let rig = Rig::standard();
    rig.platform.backend.set_torch_available(false);
    let status = rig.status_of("prepare", Command::Prepare);
    assert!(!status.can_enable_light);
}

#[test]
fn get_status_does_not_wait_for_preparation() {
    let rig = Rig::standard();
    rig.platform
        .backend
        .set_discovery_delay(Duration::from_millis(300));

    rig.send("prepare", Command::Prepare);
    rig.send("status", Command::GetStatus);

    let first = rig.next();
    assert_eq!(first.request_id.as_str(), "status");
    assert!(!first.status().map(|s| s.prepared).unwrap_or(true));
    assert!(!rig.scanner.status().prepared);

    let second = rig.next();
    assert_eq!(second.request_id.as_str(), "prepare");
    assert!(second.status().map(|s| s.prepared).unwrap_or(false));
}

#[test]
fn get_status_has_no_side_effects() {
    let rig = Rig::new(VirtualPlatform::new(
        VirtualCameraBackend::standard(),
        VirtualAuthorizer::new(AuthorizationStatus::NotDetermined, PromptAnswer::Grant),
    ));

    let status = rig.status_of("status", Command::GetStatus);
    assert!(!status.authorized && !status.denied && !status.restricted);
    assert_eq!(rig.platform.authorizer.prompts(), 0);
    assert_eq!(rig.platform.backend.discoveries(), 0);
}

#[test]
fn deferred_prompt_serves_every_waiting_command() {
    let rig = Rig::new(VirtualPlatform::new(
        VirtualCameraBackend::standard(),
        VirtualAuthorizer::new(AuthorizationStatus::NotDetermined, PromptAnswer::Defer),
    ));

    rig.send("prepare", Command::Prepare);
    rig.send("scan", Command::Scan);
    for _ in 0..500 {
        if rig.platform.authorizer.has_pending_prompt() {
            break;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    // other commands are still answered while the prompt is open
    assert!(!rig.status_of("status", Command::GetStatus).prepared);

    rig.platform.authorizer.answer_pending(true);
    let prepared = rig.next();
    assert_eq!(prepared.request_id.as_str(), "prepare");
    assert!(prepared.status().map(|s| s.authorized && s.prepared).unwrap_or(false));

    rig.session().deliver_code("AFTER-PROMPT");
    let scanned = rig.next();
    assert_eq!(scanned.request_id.as_str(), "scan");
    assert_eq!(scanned.decoded(), Some("AFTER-PROMPT"));
    assert_eq!(rig.platform.authorizer.prompts(), 1);
}

#[test]
fn destroy_cancels_pending_scan_first() {
    let rig = Rig::standard();
    rig.status_of("prepare", Command::Prepare);
    rig.send("scan", Command::Scan);
    rig.send("destroy", Command::Destroy);

    let canceled = rig.next();
    assert_eq!(canceled.request_id.as_str(), "scan");
    assert_eq!(canceled.error(), Some(ScannerError::ScanCanceled));
    let destroyed = rig.next();
    assert_eq!(destroyed.request_id.as_str(), "destroy");
    assert!(destroyed.is_success());
}

#[test]
fn destroy_overtakes_preparation() {
    let rig = Rig::standard();
    rig.platform
        .backend
        .set_discovery_delay(Duration::from_millis(200));

    rig.send("prepare", Command::Prepare);
    rig.send("destroy", Command::Destroy);

    let rejected = rig.next();
    assert_eq!(rejected.request_id.as_str(), "prepare");
    assert_eq!(rejected.error(), Some(ScannerError::CameraUnavailable));
    let destroyed = rig.next();
    assert_eq!(destroyed.request_id.as_str(), "destroy");
    assert!(!destroyed.status().map(|s| s.prepared).unwrap_or(true));

    // the session built by the overtaken preparation is released
    for _ in 0..500 {
        if rig.platform.backend.latest_session().map(|s| !s.is_running()).unwrap_or(false) {
            break;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    assert!(!rig.session().is_running());
    assert!(!rig.scanner.status().prepared);
    rig.assert_quiet();
}

#[test]
fn destroy_then_prepare_rebuilds() {
    let rig = Rig::standard();
    rig.status_of("prepare", Command::Prepare);
    rig.status_of("front", Command::UseCamera(CameraFacing::Front));
    let first = rig.session();

    let destroyed = rig.status_of("destroy", Command::Destroy);
    assert_eq!(destroyed.current_camera, CameraFacing::Back);

    // decodes from the dead session resolve nothing
    rig.send("scan", Command::Scan);
    let status = rig.status_of("again", Command::Prepare);
    assert!(status.prepared);
    assert!(!first.deliver_code("STALE"));

    assert_eq!(rig.platform.backend.sessions_opened(), 2);
    assert_eq!(rig.platform.backend.discoveries(), 2);
    assert_eq!(rig.session().input().as_deref(), Some("virtual-back"));

    rig.session().deliver_code("FRESH");
    let scanned = rig.next();
    assert_eq!(scanned.request_id.as_str(), "scan");
    assert_eq!(scanned.decoded(), Some("FRESH"));
}

#[test]
fn destroy_when_idle_reports_status() {
    let rig = Rig::standard();
    let status = rig.status_of("destroy", Command::Destroy);
    assert!(!status.prepared);
    assert_eq!(rig.platform.backend.sessions_opened(), 0);
}

#[test]
fn session_failure_leaves_idle() {
    let rig = Rig::standard();
    rig.platform.backend.fail_session_construction(true);

    let response = rig.call("prepare", Command::Prepare);
    assert_eq!(response.error(), Some(ScannerError::CameraUnavailable));
    assert_eq!(rig.scanner.capture_state(), CaptureState::Idle);

    rig.platform.backend.fail_session_construction(false);
    assert!(rig.status_of("retry", Command::Prepare).prepared);
}

#[test]
fn start_failure_detaches_preview() {
    let rig = Rig::standard();
    rig.platform.backend.fail_start(true);

    let response = rig.call("prepare", Command::Prepare);
    assert_eq!(response.error(), Some(ScannerError::CameraUnavailable));
    assert!(rig.platform.preview.attached_frame().is_none());
    assert!(!rig.scanner.status().previewing);
}

#[test]
fn show_and_hide() {
    let rig = Rig::standard();

    assert!(rig.status_of("show", Command::Show).showing);
    assert!(rig.platform.preview.is_visible());

    assert!(!rig.status_of("hide", Command::Hide).showing);
    assert!(!rig.platform.preview.is_visible());
}

#[test]
fn open_settings() {
    let rig = Rig::standard();
    assert!(rig.status_of("settings", Command::OpenSettings).can_open_settings);
    assert_eq!(rig.platform.settings.times_opened(), 1);

    rig.platform.settings.set_available(false);
    let response = rig.call("again", Command::OpenSettings);
    assert_eq!(response.error(), Some(ScannerError::OpenSettingsUnavailable));
    assert!(!rig.scanner.status().can_open_settings);
}

#[test]
fn bridge_actions() {
    let rig = Rig::standard();

    rig.scanner
        .submit_action("front", "useCamera", &serde_json::json!([1]));
    let response = rig.next();
    assert_eq!(response.request_id.as_str(), "front");
    assert_eq!(
        response.status().map(|s| s.current_camera),
        Some(CameraFacing::Front)
    );

    rig.scanner
        .submit_action("bad", "useCamera", &serde_json::json!(["left"]));
    assert_eq!(rig.next().error(), Some(ScannerError::UnexpectedError));
}

#[test]
fn blank_frames_resolve_nothing() {
    let rig = Rig::standard();
    rig.status_of("prepare", Command::Prepare);
    rig.send("scan", Command::Scan);

    let frame = LumaFrame::blank(320, 240).unwrap();
    assert_eq!(rig.session().deliver_frame(&frame), 0);
    assert!(rig.scanner.status().scanning);
    assert_eq!(rig.session().symbologies(), vec![qr_scanner_core::Symbology::Qr]);

    rig.status_of("cancel", Command::CancelScan);
}

#[test]
fn rendered_code_resolves_pending_scan() {
    let rig = Rig::standard();
    rig.status_of("prepare", Command::Prepare);
    rig.send("scan", Command::Scan);

    assert_eq!(rig.session().deliver_frame(&render_qr("TICKET-0042")), 1);
    let scanned = rig.next();
    assert_eq!(scanned.request_id.as_str(), "scan");
    assert_eq!(scanned.decoded(), Some("TICKET-0042"));
    assert!(!rig.scanner.status().scanning);

    // nothing is waiting, so a second frame resolves nothing
    rig.session().deliver_frame(&render_qr("TICKET-0043"));
    rig.assert_quiet();
}

#[test]
fn generated_ids_key_responses() {
    let rig = Rig::standard();

    let prepare = rig.scanner.submit_new(Command::Prepare);
    let response = rig.next();
    assert_eq!(response.request_id, prepare);
    assert!(response.status().map(|s| s.prepared).unwrap_or(false));

    let scan = rig.scanner.submit_new(Command::Scan);
    assert_ne!(scan, prepare);
    rig.session().deliver_code("GENERATED");
    let scanned = rig.next();
    assert_eq!(scanned.request_id, scan);
    assert_eq!(scanned.decoded(), Some("GENERATED"));
}

#[test]
fn active_camera_runs_continuous_autofocus() {
    let rig = Rig::standard();
    let backend = &rig.platform.backend;

    rig.status_of("prepare", Command::Prepare);
    assert_eq!(backend.focus_mode_of("virtual-back"), FocusMode::ContinuousAutoFocus);
    assert_eq!(backend.focus_mode_of("virtual-front"), FocusMode::Locked);

    rig.status_of("front", Command::UseCamera(CameraFacing::Front));
    assert_eq!(backend.focus_mode_of("virtual-front"), FocusMode::ContinuousAutoFocus);
    assert!(!backend.is_locked("virtual-back"));
    assert!(!backend.is_locked("virtual-front"));
}

#[test]
fn fixed_focus_camera_still_prepares() {
    let rig = Rig::standard();
    rig.platform.backend.set_fixed_focus("virtual-back");

    let status = rig.status_of("prepare", Command::Prepare);
    assert!(status.prepared);
    assert_eq!(rig.platform.backend.focus_mode_of("virtual-back"), FocusMode::Locked);

    // the torch can still take the configuration lock
    assert!(rig.status_of("on", Command::EnableLight).light_enabled);
}

#[test]
fn dropping_scanner_completes_queued_destroy() {
    let rig = Rig::standard();
    rig.status_of("prepare", Command::Prepare);
    let session = rig.session();

    rig.platform.settings.set_open_delay(Duration::from_millis(300));
    rig.send("settings", Command::OpenSettings);
    rig.send("destroy", Command::Destroy);

    let Rig { platform, scanner } = rig;
    drop(scanner);

    let responses = platform.responses.drain();
    let ids: Vec<&str> = responses.iter().map(|r| r.request_id.as_str()).collect();
    assert_eq!(ids, vec!["settings", "destroy"]);
    assert!(responses[0].is_success());
    assert!(responses[1].status().map(|s| !s.prepared).unwrap_or(false));
    assert!(!session.is_running());
    assert!(session.input().is_none());
    assert!(platform.preview.attached_frame().is_none());
}

#[test]
fn every_request_answered_exactly_once() {
    let rig = Rig::new(VirtualPlatform::new(
        VirtualCameraBackend::new(vec![virtual_back_camera(), virtual_front_camera()]),
        VirtualAuthorizer::new(AuthorizationStatus::NotDetermined, PromptAnswer::Grant),
    ));

    let commands = [
        Command::GetStatus,
        Command::Scan,
        Command::Prepare,
        Command::Scan,
        Command::PausePreview,
        Command::UseCamera(CameraFacing::Front),
        Command::ResumePreview,
        Command::EnableLight,
        Command::Show,
        Command::Scan,
        Command::CancelScan,
        Command::Scan,
        Command::DisableLight,
        Command::Destroy,
        Command::Prepare,
        Command::Hide,
        Command::Destroy,
        Command::GetStatus,
    ];
    for (i, command) in commands.iter().enumerate() {
        rig.send(&format!("req-{}", i), *command);
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    for _ in 0..commands.len() {
        *seen.entry(rig.next().request_id.to_string()).or_default() += 1;
    }
    assert_eq!(seen.len(), commands.len());
    assert!(seen.values().all(|&n| n == 1));
    rig.assert_quiet();
}

#[test]
fn dropping_scanner_answers_pending_scan() {
    let rig = Rig::standard();
    rig.status_of("prepare", Command::Prepare);
    rig.send("scan", Command::Scan);
    let session = rig.session();

    let Rig { platform, scanner } = rig;
    drop(scanner);

    let response = platform.responses.recv_timeout(TIMEOUT).expect("response");
    assert_eq!(response.request_id.as_str(), "scan");
    assert_eq!(response.error(), Some(ScannerError::ScanCanceled));
    assert!(!session.is_running());
}

//! Command dispatcher: routes each host command to the components and
//! guarantees it one response.

pub mod authorization;
pub mod status;

use std::mem;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use serde_json::Value;

use crate::models::command::{Command, RequestId, ResponsePayload};
use crate::models::config::ScannerConfiguration;
use crate::models::device::CameraFacing;
use crate::models::error::ScannerError;
use crate::models::state::CaptureState;
use crate::models::status::StatusSnapshot;
use crate::runtime::executor::SerialExecutor;
use crate::runtime::reply::Reply;
use crate::scan::arbiter::ScanArbiter;
use crate::session::manager::{PrepareOutcome, PrepareResolution, PrepareStep, SessionManager};
use crate::session::relay::DecodeRelay;
use crate::session::torch::TorchController;
use crate::traits::authorizer::CameraAuthorizer;
use crate::traits::capture_backend::CaptureBackend;
use crate::traits::capture_session::DecodeCallback;
use crate::traits::preview_sink::PreviewSink;
use crate::traits::response_sink::ResponseSink;
use crate::traits::settings_opener::SettingsOpener;

use authorization::AuthorizationGate;
use status::StatusView;

/// The platform collaborators a scanner is built from.
pub struct ScannerPlatform {
    pub backend: Arc<dyn CaptureBackend>,
    pub authorizer: Arc<dyn CameraAuthorizer>,
    pub preview: Arc<dyn PreviewSink>,
    pub settings: Arc<dyn SettingsOpener>,
    pub responses: Arc<dyn ResponseSink>,
}

/// Work to run once the session is prepared.
type Continuation = Box<dyn FnOnce(&Arc<Inner>, Reply) + Send + 'static>;

fn continuation<F>(f: F) -> Continuation
where
    F: FnOnce(&Arc<Inner>, Reply) + Send + 'static,
{
    Box::new(f)
}

/// A command parked until permission or preparation resolves.
struct Waiter {
    reply: Reply,
    then: Continuation,
}

impl Waiter {
    fn resume(self, inner: &Arc<Inner>) {
        (self.then)(inner, self.reply);
    }
}

struct ScannerState {
    gate: AuthorizationGate,
    session: SessionManager,
    arbiter: ScanArbiter,
    showing: bool,
    auth_waiters: Vec<Waiter>,
    prepare_waiters: Vec<Waiter>,
}

struct Inner {
    state: Mutex<ScannerState>,
    relay: Arc<DecodeRelay>,
    torch: TorchController,
    preview: Arc<dyn PreviewSink>,
    settings: Arc<dyn SettingsOpener>,
    responses: Arc<dyn ResponseSink>,
    worker: SerialExecutor,
    responder: SerialExecutor,
}

/// QR scanning service for one camera.
///
/// Commands are queued onto the response thread and answered through the
/// platform's `ResponseSink`, exactly once per request id. Session setup and
/// teardown run on a background worker, so a slow camera never holds up
/// other commands.
///
/// ```text
/// submit ─→ [response thread] ─→ AuthorizationGate ─→ SessionManager ─→ [worker]
///                 ↑                                                        │
///                 └──── prepare / teardown completion ─────────────────────┘
///                 ↑
/// decode ─→ DecodeRelay ─→ ScanArbiter ─→ ResponseSink
/// ```
pub struct Scanner {
    inner: Arc<Inner>,
}

impl Scanner {
    pub fn new(
        platform: ScannerPlatform,
        config: ScannerConfiguration,
    ) -> Result<Self, ScannerError> {
        config.validate().map_err(|e| {
            log::error!("invalid scanner configuration: {}", e);
            ScannerError::UnexpectedError
        })?;

        let worker = SerialExecutor::spawn(&config.worker_thread_name)?;
        let responder = SerialExecutor::spawn(&config.response_thread_name)?;

        let state = ScannerState {
            gate: AuthorizationGate::new(platform.authorizer),
            session: SessionManager::new(
                Arc::clone(&platform.backend),
                Arc::clone(&platform.preview),
                &config,
            ),
            arbiter: ScanArbiter::new(),
            showing: false,
            auth_waiters: Vec::new(),
            prepare_waiters: Vec::new(),
        };

        Ok(Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                relay: Arc::new(DecodeRelay::new()),
                torch: TorchController::new(platform.backend),
                preview: platform.preview,
                settings: platform.settings,
                responses: platform.responses,
                worker,
                responder,
            }),
        })
    }

    /// Queue `command`. Its result arrives on the response sink.
    pub fn submit(&self, request_id: impl Into<RequestId>, command: Command) {
        let reply = Reply::new(request_id.into(), Arc::clone(&self.inner.responses));
        log::debug!("received {} ({})", command.action(), reply.request_id());

        let inner = Arc::clone(&self.inner);
        self.inner
            .responder
            .execute(move || inner.dispatch(command, reply));
    }

    /// Queue `command` under a freshly generated request id, for hosts that
    /// do not assign their own. The id is returned to match the response.
    pub fn submit_new(&self, command: Command) -> RequestId {
        let request_id = RequestId::generate();
        self.submit(request_id.clone(), command);
        request_id
    }

    /// Queue a command given as a bridge action name and JSON arguments.
    /// Unparseable commands are answered with `unexpected_error`.
    pub fn submit_action(&self, request_id: impl Into<RequestId>, action: &str, args: &Value) {
        match Command::from_action(action, args) {
            Ok(command) => self.submit(request_id, command),
            Err(error) => {
                let reply = Reply::new(request_id.into(), Arc::clone(&self.inner.responses));
                self.inner.responder.execute(move || reply.fail(error));
            }
        }
    }

    /// Current status, computed on the calling thread. Never waits on the
    /// worker and has no side effects.
    pub fn status(&self) -> StatusSnapshot {
        self.inner.snapshot()
    }

    pub fn capture_state(&self) -> CaptureState {
        self.inner.state.lock().session.state()
    }
}

impl Drop for Scanner {
    fn drop(&mut self) {
        self.inner.shutdown();
    }
}

impl Inner {
    fn dispatch(self: &Arc<Self>, command: Command, reply: Reply) {
        log::debug!("dispatching {} ({})", command.action(), reply.request_id());

        match command {
            Command::Prepare => {
                self.with_session(reply, continuation(|inner, reply| inner.reply_status(reply)));
            }
            Command::Scan => {
                self.with_session(reply, continuation(|inner, reply| inner.begin_scan(reply)));
            }
            Command::CancelScan => self.cancel_scan(reply),
            Command::Show => self.set_showing(reply, true),
            Command::Hide => self.set_showing(reply, false),
            Command::PausePreview => self.set_paused(reply, true),
            Command::ResumePreview => self.set_paused(reply, false),
            Command::UseCamera(target) => self.use_camera(reply, target),
            Command::EnableLight => {
                self.with_session(reply, continuation(|inner, reply| inner.set_light(reply, true)));
            }
            Command::DisableLight => {
                self.with_session(reply, continuation(|inner, reply| inner.set_light(reply, false)));
            }
            Command::GetStatus => {
                self.state.lock().gate.refresh();
                self.reply_status(reply);
            }
            Command::Destroy => self.destroy(reply),
            Command::OpenSettings => self.open_settings(reply),
        }
    }

    // --- Preparation ---

    /// Run `then` once the session is running, preparing it (and asking for
    /// permission) first if needed.
    fn with_session(self: &Arc<Self>, reply: Reply, then: Continuation) {
        let waiter = Waiter { reply, then };
        let mut state = self.state.lock();

        if state.session.is_running() {
            drop(state);
            waiter.resume(self);
            return;
        }
        if state.session.state().is_preparing() {
            state.prepare_waiters.push(waiter);
            return;
        }
        if state.gate.is_prompt_pending() {
            state.auth_waiters.push(waiter);
            return;
        }

        let settled = state.gate.refresh().settled();
        match settled {
            Some(Ok(())) => self.start_prepare(state, vec![waiter]),
            Some(Err(error)) => {
                drop(state);
                waiter.reply.fail(error);
            }
            None => {
                state.auth_waiters.push(waiter);
                let authorizer = state.gate.begin_prompt();
                drop(state);
                if let Some(authorizer) = authorizer {
                    self.prompt(&*authorizer);
                }
            }
        }
    }

    fn prompt(self: &Arc<Self>, authorizer: &dyn CameraAuthorizer) {
        log::info!("requesting camera access");
        let weak = Arc::downgrade(self);
        authorizer.request_access(Box::new(move |granted| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let target = Arc::clone(&inner);
            inner
                .responder
                .execute(move || target.finish_prompt(granted));
        }));
    }

    fn finish_prompt(self: &Arc<Self>, granted: bool) {
        let mut state = self.state.lock();
        let outcome = state.gate.finish_prompt(granted);
        let waiters = mem::take(&mut state.auth_waiters);
        log::info!("camera access {}", if granted { "granted" } else { "denied" });

        match outcome {
            Ok(()) => self.start_prepare(state, waiters),
            Err(error) => {
                drop(state);
                for waiter in waiters {
                    waiter.reply.fail(error);
                }
            }
        }
    }

    fn start_prepare(self: &Arc<Self>, mut state: MutexGuard<'_, ScannerState>, waiters: Vec<Waiter>) {
        if waiters.is_empty() {
            return;
        }

        let decode = self.decode_callback(state.session.generation());
        let step = state.session.begin_prepare(decode);
        match step {
            PrepareStep::Running => {
                drop(state);
                for waiter in waiters {
                    waiter.resume(self);
                }
            }
            PrepareStep::InFlight => state.prepare_waiters.extend(waiters),
            PrepareStep::Started(job) => {
                state.prepare_waiters.extend(waiters);
                drop(state);

                let inner = Arc::clone(self);
                self.worker.execute_or_run(move || {
                    let outcome = job.run();
                    let target = Arc::clone(&inner);
                    inner
                        .responder
                        .execute_or_run(move || target.finish_prepare(outcome));
                });
            }
        }
    }

    fn finish_prepare(self: &Arc<Self>, outcome: PrepareOutcome) {
        let mut state = self.state.lock();
        let resolution = state.session.finish_prepare(outcome);

        match resolution {
            PrepareResolution::Installed => {
                let waiters = mem::take(&mut state.prepare_waiters);
                drop(state);
                for waiter in waiters {
                    waiter.resume(self);
                }
            }
            PrepareResolution::Failed(error) => {
                let waiters = mem::take(&mut state.prepare_waiters);
                drop(state);
                for waiter in waiters {
                    waiter.reply.fail(error);
                }
            }
            PrepareResolution::Stale(teardown) => {
                drop(state);
                if let Some(job) = teardown {
                    self.worker.execute_or_run(move || job.run());
                }
            }
        }
    }

    // --- Decoding ---

    /// Callback handed to the capture session. Stamps each event with the
    /// session generation and input epoch, then hops to the response thread.
    fn decode_callback(self: &Arc<Self>, generation: u64) -> DecodeCallback {
        let weak = Arc::downgrade(self);
        let relay = Arc::clone(&self.relay);

        Arc::new(move |value: &str| {
            if relay.is_suspended() {
                log::debug!("decode dropped: session reconfiguring");
                return;
            }
            let epoch = relay.epoch();
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let value = value.to_string();
            let target = Arc::clone(&inner);
            inner
                .responder
                .execute(move || target.handle_decode(&value, generation, epoch));
        })
    }

    fn handle_decode(&self, value: &str, generation: u64, epoch: u64) {
        let resolution = {
            let mut state = self.state.lock();
            if state.session.generation() != generation || !state.session.is_running() {
                log::debug!("decode dropped: session was destroyed");
                return;
            }
            if !self.relay.accepts(epoch) {
                log::debug!("decode dropped: produced by a removed input");
                return;
            }
            state.arbiter.on_decode(value)
        };

        if let Some(resolution) = resolution {
            log::info!("scan {} fulfilled", resolution.request_id());
            resolution.deliver();
        }
    }

    // --- Commands ---

    fn begin_scan(&self, reply: Reply) {
        let superseded = {
            let mut state = self.state.lock();
            if state.arbiter.is_paused() {
                state.session.set_preview_enabled(true);
            }
            state.arbiter.begin_scan(reply)
        };
        if let Some(resolution) = superseded {
            resolution.deliver();
        }
    }

    fn cancel_scan(&self, reply: Reply) {
        let (resolution, snapshot) = {
            let mut state = self.state.lock();
            let resolution = state.arbiter.cancel_scan();
            (resolution, self.snapshot_locked(&state))
        };

        if let Some(resolution) = resolution {
            log::info!("scan {} canceled", resolution.request_id());
            resolution.deliver();
        }
        reply.status(snapshot);
    }

    fn set_showing(&self, reply: Reply, visible: bool) {
        self.preview.set_visible(visible);
        let snapshot = {
            let mut state = self.state.lock();
            state.showing = visible;
            self.snapshot_locked(&state)
        };
        reply.status(snapshot);
    }

    fn set_paused(&self, reply: Reply, paused: bool) {
        let snapshot = {
            let mut state = self.state.lock();
            if paused {
                state.arbiter.pause();
            } else {
                state.arbiter.resume();
            }
            state.session.set_preview_enabled(!paused);
            self.snapshot_locked(&state)
        };
        reply.status(snapshot);
    }

    fn use_camera(self: &Arc<Self>, reply: Reply, target: CameraFacing) {
        if self.state.lock().session.active_camera() == target {
            self.reply_status(reply);
            return;
        }
        self.with_session(
            reply,
            continuation(move |inner, reply| inner.switch_camera(reply, target)),
        );
    }

    fn switch_camera(&self, reply: Reply, target: CameraFacing) {
        let result = {
            let mut state = self.state.lock();
            state
                .session
                .switch_camera(target, &self.relay)
                .map(|()| self.snapshot_locked(&state))
        };
        reply.resolve(result.map(ResponsePayload::Status));
    }

    fn set_light(&self, reply: Reply, on: bool) {
        let result = {
            let state = self.state.lock();
            self.torch
                .set_light(&state.session, on)
                .map(|()| self.snapshot_locked(&state))
        };
        reply.resolve(result.map(ResponsePayload::Status));
    }

    fn destroy(self: &Arc<Self>, reply: Reply) {
        let (cancelled, orphans, teardown) = {
            let mut state = self.state.lock();
            let cancelled = state.arbiter.cancel_scan();
            let mut orphans = mem::take(&mut state.prepare_waiters);
            orphans.append(&mut state.auth_waiters);
            state.showing = false;
            (cancelled, orphans, state.session.begin_teardown())
        };
        self.relay.retire_input();
        self.preview.set_visible(false);

        if let Some(resolution) = cancelled {
            log::info!("scan {} canceled by destroy", resolution.request_id());
            resolution.deliver();
        }
        for waiter in orphans {
            waiter.reply.fail(ScannerError::CameraUnavailable);
        }

        let Some(job) = teardown else {
            self.reply_status(reply);
            return;
        };

        let inner = Arc::clone(self);
        self.worker.execute_or_run(move || {
            job.run();
            let target = Arc::clone(&inner);
            inner.responder.execute_or_run(move || {
                target.state.lock().session.finish_teardown();
                log::info!("scanner destroyed");
                target.reply_status(reply);
            });
        });
    }

    fn open_settings(&self, reply: Reply) {
        if !self.settings.can_open() {
            reply.fail(ScannerError::OpenSettingsUnavailable);
            return;
        }
        match self.settings.open() {
            Ok(()) => self.reply_status(reply),
            Err(e) => {
                log::warn!("could not open settings: {}", e);
                reply.fail(ScannerError::OpenSettingsUnavailable);
            }
        }
    }

    // --- Status ---

    fn snapshot(&self) -> StatusSnapshot {
        let state = self.state.lock();
        self.snapshot_locked(&state)
    }

    fn snapshot_locked(&self, state: &ScannerState) -> StatusSnapshot {
        StatusView {
            authorization: state.gate.status(),
            session: &state.session,
            arbiter: &state.arbiter,
            torch: &self.torch,
            showing: state.showing,
            can_open_settings: self.settings.can_open(),
        }
        .snapshot()
    }

    fn reply_status(&self, reply: Reply) {
        let snapshot = self.snapshot();
        reply.status(snapshot);
    }

    /// Drain both threads, then release whatever session is left.
    ///
    /// The response thread drains first so that queued commands can still
    /// hand teardown work to the worker. Worker completions posted after
    /// that run inline on the worker.
    fn shutdown(&self) {
        self.responder.shutdown();
        self.worker.shutdown();

        let (cancelled, orphans, teardown) = {
            let mut state = self.state.lock();
            let cancelled = state.arbiter.cancel_scan();
            let mut orphans = mem::take(&mut state.prepare_waiters);
            orphans.append(&mut state.auth_waiters);
            (cancelled, orphans, state.session.begin_teardown())
        };

        if let Some(resolution) = cancelled {
            resolution.deliver();
        }
        for waiter in orphans {
            waiter.reply.fail(ScannerError::CameraUnavailable);
        }
        if let Some(job) = teardown {
            job.run();
            self.state.lock().session.finish_teardown();
        }
        log::debug!("scanner shut down");
    }
}

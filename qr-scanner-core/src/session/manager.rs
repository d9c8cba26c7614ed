use std::sync::Arc;

use crate::models::config::ScannerConfiguration;
use crate::models::device::{CameraFacing, PreviewFrame};
use crate::models::error::ScannerError;
use crate::models::state::CaptureState;
use crate::session::focus;
use crate::session::registry::{DeviceRegistry, DeviceSlots};
use crate::session::relay::DecodeRelay;
use crate::traits::capture_backend::CaptureBackend;
use crate::traits::capture_session::{CaptureSession, DecodeCallback, Symbology};
use crate::traits::preview_sink::PreviewSink;

/// What `begin_prepare` decided.
pub enum PrepareStep {
    /// Already running; nothing to do.
    Running,
    /// Another preparation is in flight; wait for it.
    InFlight,
    /// Run this job on the background worker, then hand its outcome to
    /// `finish_prepare`.
    Started(PrepareJob),
}

/// What `finish_prepare` did with an outcome.
pub enum PrepareResolution {
    Installed,
    Failed(ScannerError),
    /// The preparation was overtaken by a destroy. Any session it built must
    /// be torn down on the worker.
    Stale(Option<TeardownJob>),
}

/// Device enumeration and session construction, detached from the manager
/// so it can run on the background worker.
pub struct PrepareJob {
    generation: u64,
    backend: Arc<dyn CaptureBackend>,
    preview: Arc<dyn PreviewSink>,
    frame: PreviewFrame,
    cached_slots: Option<DeviceSlots>,
    preferred: CameraFacing,
    decode: DecodeCallback,
}

pub struct PrepareOutcome {
    generation: u64,
    slots: DeviceSlots,
    facing: CameraFacing,
    session: Result<Box<dyn CaptureSession>, ScannerError>,
}

impl PrepareJob {
    pub fn run(self) -> PrepareOutcome {
        let slots = match &self.cached_slots {
            Some(slots) => slots.clone(),
            None => DeviceRegistry::discover(&*self.backend),
        };
        let facing = slots.initial_facing(self.preferred);
        let session = self.build(&slots, facing);

        PrepareOutcome {
            generation: self.generation,
            slots,
            facing,
            session,
        }
    }

    fn build(
        &self,
        slots: &DeviceSlots,
        facing: CameraFacing,
    ) -> Result<Box<dyn CaptureSession>, ScannerError> {
        let slot = slots.slot(facing).ok_or_else(|| facing.unavailable())?;

        let mut session = self.backend.open_session().map_err(|e| {
            log::warn!("capture session construction failed: {}", e);
            ScannerError::CameraUnavailable
        })?;

        let input = self.backend.open_input(&slot.device).map_err(|e| {
            log::warn!("could not open input for {}: {}", slot.device.id, e);
            facing.unavailable()
        })?;
        session.add_input(input).map_err(|e| {
            log::warn!("session rejected input {}: {}", slot.device.id, e);
            facing.unavailable()
        })?;
        if let Err(e) = focus::enable_continuous_autofocus(&*self.backend, &slot.device) {
            log::warn!("autofocus not set on {}: {}", slot.device.id, e);
        }

        if let Err(e) = session.set_decode_output(&[Symbology::Qr], Arc::clone(&self.decode)) {
            log::warn!("could not attach decode output: {}", e);
            session.remove_input();
            return Err(ScannerError::CameraUnavailable);
        }

        session.set_preview_enabled(true);
        self.preview.attach(self.frame);

        if let Err(e) = session.start_running() {
            log::warn!("capture session failed to start: {}", e);
            self.preview.detach();
            session.remove_input();
            return Err(ScannerError::CameraUnavailable);
        }

        log::info!("capture session running on {} ({:?})", slot.device.name, facing);
        Ok(session)
    }
}

/// Session teardown, run on the background worker.
pub struct TeardownJob {
    session: Option<Box<dyn CaptureSession>>,
    preview: Option<Arc<dyn PreviewSink>>,
}

impl TeardownJob {
    fn retire(session: Box<dyn CaptureSession>) -> Self {
        Self {
            session: Some(session),
            preview: None,
        }
    }

    pub fn run(self) {
        let mut session = self.session;
        if let Some(session) = session.as_mut() {
            session.stop_running();
        }
        if let Some(preview) = &self.preview {
            preview.detach();
        }
        if let Some(mut session) = session {
            session.remove_input();
            log::debug!("capture session released");
        }
    }
}

/// Owns the capture session and the device slots, and drives the
/// `CaptureState` machine. No other component changes the state.
///
/// Slow steps are split into jobs: `begin_*` decides and returns a job,
/// the job runs on the worker, and `finish_*` applies the result.
pub struct SessionManager {
    backend: Arc<dyn CaptureBackend>,
    preview: Arc<dyn PreviewSink>,
    frame: PreviewFrame,
    initial_camera: CameraFacing,
    state: CaptureState,
    registry: DeviceRegistry,
    active_camera: CameraFacing,
    session: Option<Box<dyn CaptureSession>>,
    generation: u64,
}

impl SessionManager {
    pub fn new(
        backend: Arc<dyn CaptureBackend>,
        preview: Arc<dyn PreviewSink>,
        config: &ScannerConfiguration,
    ) -> Self {
        Self {
            backend,
            preview,
            frame: config.preview_frame,
            initial_camera: config.initial_camera,
            state: CaptureState::Idle,
            registry: DeviceRegistry::new(),
            active_camera: config.initial_camera,
            session: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Whether the live preview connection is enabled.
    pub fn is_preview_enabled(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.is_preview_enabled())
            .unwrap_or(false)
    }

    /// Device id of the input currently feeding the session.
    pub fn current_input(&self) -> Option<String> {
        self.session.as_ref().and_then(|s| s.current_input())
    }

    pub fn active_camera(&self) -> CameraFacing {
        self.active_camera
    }

    pub fn slots(&self) -> Option<&DeviceSlots> {
        self.registry.slots()
    }

    /// Advances on every destroy. Work started under an older generation
    /// must not touch the current session.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn begin_prepare(&mut self, decode: DecodeCallback) -> PrepareStep {
        match self.state {
            CaptureState::Running => PrepareStep::Running,
            CaptureState::Preparing => PrepareStep::InFlight,
            CaptureState::Idle | CaptureState::Destroyed => {
                log::debug!("capture state {:?} → Preparing", self.state);
                self.state = CaptureState::Preparing;
                PrepareStep::Started(PrepareJob {
                    generation: self.generation,
                    backend: Arc::clone(&self.backend),
                    preview: Arc::clone(&self.preview),
                    frame: self.frame,
                    cached_slots: self.registry.slots().cloned(),
                    preferred: self.active_camera,
                    decode,
                })
            }
        }
    }

    pub fn finish_prepare(&mut self, outcome: PrepareOutcome) -> PrepareResolution {
        if outcome.generation != self.generation || !self.state.is_preparing() {
            log::info!("discarding preparation overtaken by destroy");
            return PrepareResolution::Stale(outcome.session.ok().map(TeardownJob::retire));
        }

        self.registry.install(outcome.slots);
        self.active_camera = outcome.facing;

        match outcome.session {
            Ok(session) => {
                self.session = Some(session);
                self.state = CaptureState::Running;
                log::debug!("capture state Preparing → Running");
                PrepareResolution::Installed
            }
            Err(error) => {
                self.state = CaptureState::Idle;
                log::debug!("capture state Preparing → Idle ({})", error.name());
                PrepareResolution::Failed(error)
            }
        }
    }

    /// Swap the session input to `target` in one configuration transaction.
    ///
    /// Decode delivery is suspended for the duration. If the new input
    /// cannot be built, the previous input is put back.
    pub fn switch_camera(
        &mut self,
        target: CameraFacing,
        relay: &DecodeRelay,
    ) -> Result<(), ScannerError> {
        if target == self.active_camera {
            return Ok(());
        }
        let slots = self.registry.slots().ok_or_else(|| target.unavailable())?;
        if let Some(missing) = slots.missing() {
            return Err(missing);
        }
        let device = slots
            .slot(target)
            .map(|slot| slot.device.clone())
            .ok_or_else(|| target.unavailable())?;
        let session = self.session.as_mut().ok_or(ScannerError::CameraUnavailable)?;

        let _suspended = relay.suspend();
        session.begin_configuration();
        let previous = session.remove_input();

        let switched = self
            .backend
            .open_input(&device)
            .and_then(|input| session.add_input(input));

        match switched {
            Ok(()) => {
                session.commit_configuration();
                log::info!("switched camera {:?} → {:?}", self.active_camera, target);
                self.active_camera = target;
                if let Err(e) = focus::enable_continuous_autofocus(&*self.backend, &device) {
                    log::warn!("autofocus not set on {}: {}", device.id, e);
                }
                Ok(())
            }
            Err(e) => {
                log::warn!("camera switch to {:?} aborted: {}", target, e);
                if let Some(previous) = previous {
                    if let Err(e) = session.add_input(previous) {
                        log::error!("could not restore previous input: {}", e);
                    }
                }
                session.commit_configuration();
                Err(target.unavailable())
            }
        }
    }

    pub fn set_preview_enabled(&mut self, enabled: bool) {
        if let Some(session) = self.session.as_mut() {
            session.set_preview_enabled(enabled);
        }
    }

    /// Release the session and device slots and reset the camera selection.
    ///
    /// Returns the teardown to run on the worker, or `None` if nothing was
    /// prepared. The state stays `Destroyed` until `finish_teardown`.
    pub fn begin_teardown(&mut self) -> Option<TeardownJob> {
        self.generation += 1;
        self.active_camera = self.initial_camera;
        self.registry.release();
        let session = self.session.take();

        match self.state {
            CaptureState::Running | CaptureState::Preparing => {
                log::debug!("capture state {:?} → Destroyed", self.state);
                self.state = CaptureState::Destroyed;
                Some(TeardownJob {
                    session,
                    preview: Some(Arc::clone(&self.preview)),
                })
            }
            CaptureState::Idle | CaptureState::Destroyed => None,
        }
    }

    pub fn finish_teardown(&mut self) {
        if self.state == CaptureState::Destroyed {
            log::debug!("capture state Destroyed → Idle");
            self.state = CaptureState::Idle;
        }
    }

    #[cfg(test)]
    pub(crate) fn prepare_now(&mut self, decode: DecodeCallback) -> Result<(), ScannerError> {
        match self.begin_prepare(decode) {
            PrepareStep::Running => Ok(()),
            PrepareStep::InFlight => Err(ScannerError::UnexpectedError),
            PrepareStep::Started(job) => match self.finish_prepare(job.run()) {
                PrepareResolution::Installed => Ok(()),
                PrepareResolution::Failed(error) => Err(error),
                PrepareResolution::Stale(_) => Err(ScannerError::CameraUnavailable),
            },
        }
    }
}

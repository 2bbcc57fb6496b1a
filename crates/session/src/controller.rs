//! SessionController - initialization, release and device commands
//!
//! Every operation takes the session lock for its whole read-modify-write.
//! Two things never happen under that lock: the SDK initialization request
//! (its callback may run inline and needs the lock) and releases triggered
//! from a producer thread (handed to a fresh thread instead).

use std::sync::{Arc, Weak};
use std::thread;

use contracts::{
    BridgeConfig, BridgeError, CalibrationRun, CameraPosition, DisplayScale, ForcedOrientation,
    GazeTracker, Generation, InitializationResult, Rect, StatusErrorKind, TrackerOptions,
    TrackerSdk,
};
use event_bus::EventBus;
use observability::metrics::{
    record_init_attempt, record_session_active, record_session_released,
};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn, Span};

use crate::callback_adapter::{initialization_callback, CallbackAdapter};
use crate::pending::{InitOutcome, InitRequest, PendingInit};
use crate::state::{AttemptStart, SessionState};

/// Why a session was torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseCause {
    /// `release` was called
    Requested,
    /// The tracker stopped with a failure reason
    FatalStatus,
    /// The bridge is shutting down
    Shutdown,
}

impl ReleaseCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::FatalStatus => "fatal_status",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Controller settings derived from `BridgeConfig`
#[derive(Debug, Clone, Default)]
pub struct ControllerConfig {
    pub scale: DisplayScale,
    pub release_on_fatal_status: bool,
    /// Fills options the caller leaves unset
    pub default_options: TrackerOptions,
}

impl From<&BridgeConfig> for ControllerConfig {
    fn from(config: &BridgeConfig) -> Self {
        Self {
            scale: DisplayScale::new(config.display.density),
            release_on_fatal_status: config.session.release_on_fatal_status,
            default_options: config.tracker.to_options(),
        }
    }
}

pub(crate) struct Inner {
    sdk: Arc<dyn TrackerSdk>,
    bus: Arc<EventBus>,
    config: ControllerConfig,
    state: Mutex<SessionState>,
}

/// Owner of the single tracking session
///
/// Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    pub fn new(sdk: Arc<dyn TrackerSdk>, bus: Arc<EventBus>, config: ControllerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                sdk,
                bus,
                config,
                state: Mutex::new(SessionState::new()),
            }),
        }
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.inner.bus
    }

    pub fn display_scale(&self) -> DisplayScale {
        self.inner.config.scale
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.state.lock().is_initialized()
    }

    pub fn is_attempting(&self) -> bool {
        self.inner.state.lock().is_attempting()
    }

    /// Generation of the active session
    pub fn generation(&self) -> Option<Generation> {
        self.inner.state.lock().generation()
    }

    pub fn version_name(&self) -> String {
        self.inner.sdk.version_name()
    }

    // ===== Lifecycle =====

    /// Ask the SDK for a tracker
    ///
    /// Fails with `AlreadyAttempting` while another request is outstanding.
    /// Returns `AlreadyInitialized` without touching the SDK when a tracker
    /// exists.
    #[instrument(
        name = "session_initialize",
        skip(self, license, options),
        fields(generation = tracing::field::Empty)
    )]
    pub fn initialize(
        &self,
        license: &str,
        options: Option<TrackerOptions>,
    ) -> Result<InitRequest, BridgeError> {
        let started = self.inner.state.lock().begin_attempt();
        let (generation, rx) = match started {
            Ok(AttemptStart::Started { generation, rx }) => (generation, rx),
            Ok(AttemptStart::AlreadyInitialized) => {
                record_init_attempt("already_initialized");
                return Ok(InitRequest::AlreadyInitialized);
            }
            Err(e) => {
                record_init_attempt("already_attempting");
                return Err(e);
            }
        };
        Span::current().record("generation", generation.get());

        let options = options
            .unwrap_or_default()
            .or(&self.inner.config.default_options)
            .into_non_empty();
        debug!(has_options = options.is_some(), "Requesting tracker from SDK");
        record_init_attempt("accepted");

        // Session lock is released: the SDK may answer inline
        self.inner.sdk.initialize(
            license,
            options,
            initialization_callback(Arc::downgrade(&self.inner), generation),
        );

        Ok(InitRequest::Pending(PendingInit::new(generation, rx)))
    }

    /// Deliver an initialization result for `generation`
    ///
    /// Normally invoked by the SDK callback; results for any generation other
    /// than the in-flight attempt are discarded and their tracker released.
    pub fn on_initialization_complete(&self, generation: Generation, result: InitializationResult) {
        self.inner.on_initialization_complete(generation, result);
    }

    /// Tear down the session; no-op without one
    ///
    /// Returns whether a session was released.
    #[instrument(name = "session_release", skip(self))]
    pub fn release(&self) -> bool {
        let mut state = self.inner.state.lock();
        self.inner.release_locked(&mut state, ReleaseCause::Requested)
    }

    /// Release the session only if it still belongs to `generation`
    pub fn release_generation(&self, generation: Generation, cause: ReleaseCause) -> bool {
        self.inner.release_generation(generation, cause)
    }

    /// Abandon any in-flight attempt and release the session
    #[instrument(name = "session_shutdown", skip(self))]
    pub fn shutdown(&self) -> bool {
        let mut state = self.inner.state.lock();
        if let Some(generation) = state.abandon_attempt() {
            info!(generation = %generation, "In-flight initialization abandoned");
        }
        self.inner.release_locked(&mut state, ReleaseCause::Shutdown)
    }

    // ===== Tracking =====

    pub fn start_tracking(&self) -> Result<(), BridgeError> {
        self.with_tracker(|t| t.start_tracking())
    }

    pub fn stop_tracking(&self) -> Result<(), BridgeError> {
        self.with_tracker(|t| t.stop_tracking())
    }

    pub fn is_tracking(&self) -> Result<bool, BridgeError> {
        self.with_tracker(|t| t.is_tracking())
    }

    /// Returns whether the SDK applied the rate
    pub fn set_tracking_fps(&self, fps: i32) -> Result<bool, BridgeError> {
        self.with_tracker(|t| t.set_tracking_fps(fps))
    }

    // ===== Calibration =====

    /// Start a calibration run; the region is given in logical units
    pub fn start_calibration(&self, mut run: CalibrationRun) -> Result<bool, BridgeError> {
        let scale = self.inner.config.scale;
        run.region = run.region.map(|r| scale.rect_to_device(r));
        self.with_tracker(|t| t.start_calibration(&run))
    }

    pub fn stop_calibration(&self) -> Result<(), BridgeError> {
        self.with_tracker(|t| t.stop_calibration())
    }

    pub fn is_calibrating(&self) -> Result<bool, BridgeError> {
        self.with_tracker(|t| t.is_calibrating())
    }

    pub fn start_collect_samples(&self) -> Result<bool, BridgeError> {
        self.with_tracker(|t| t.start_collect_samples())
    }

    pub fn set_calibration_data(&self, data: &[f64]) -> Result<bool, BridgeError> {
        self.with_tracker(|t| t.set_calibration_data(data))
    }

    // ===== Attention region =====

    pub fn set_attention_region(&self, region: Rect) -> Result<(), BridgeError> {
        let device = self.inner.config.scale.rect_to_device(region);
        self.with_tracker(|t| t.set_attention_region(device))
    }

    /// Current region in logical units, `None` when unset
    pub fn attention_region(&self) -> Result<Option<Rect>, BridgeError> {
        let scale = self.inner.config.scale;
        self.with_tracker(|t| t.attention_region().map(|r| scale.rect_to_logical(r)))
    }

    pub fn remove_attention_region(&self) -> Result<(), BridgeError> {
        self.with_tracker(|t| t.remove_attention_region())
    }

    // ===== Camera positions =====

    pub fn add_camera_position(&self, position: CameraPosition) -> Result<(), BridgeError> {
        self.with_tracker(|t| t.add_camera_position(position))
    }

    pub fn camera_position(&self) -> Result<Option<CameraPosition>, BridgeError> {
        self.with_tracker(|t| t.camera_position())
    }

    pub fn camera_position_list(&self) -> Result<Vec<CameraPosition>, BridgeError> {
        self.with_tracker(|t| t.camera_position_list())
    }

    pub fn has_camera_positions(&self) -> Result<bool, BridgeError> {
        self.with_tracker(|t| t.has_camera_positions())
    }

    /// Select a registry entry; out-of-range indices are rejected
    pub fn select_camera_position(&self, index: i64) -> Result<(), BridgeError> {
        let mut state = self.inner.state.lock();
        let tracker = state.tracker_mut()?;
        let len = tracker.camera_position_list().len();
        let index = usize::try_from(index)
            .ok()
            .filter(|i| *i < len)
            .ok_or_else(|| {
                BridgeError::invalid_argument(
                    "index",
                    format!("index {index} out of range for {len} camera positions"),
                )
            })?;
        tracker.select_camera_position(index);
        Ok(())
    }

    // ===== Orientation =====

    pub fn set_forced_orientation(
        &self,
        orientation: ForcedOrientation,
    ) -> Result<bool, BridgeError> {
        self.with_tracker(|t| t.set_forced_orientation(orientation))
    }

    pub fn reset_forced_orientation(&self) -> Result<bool, BridgeError> {
        self.with_tracker(|t| t.reset_forced_orientation())
    }

    /// Run `f` against the tracker under the session lock
    fn with_tracker<R>(&self, f: impl FnOnce(&mut dyn GazeTracker) -> R) -> Result<R, BridgeError> {
        let mut state = self.inner.state.lock();
        let tracker = state.tracker_mut()?;
        Ok(f(tracker))
    }
}

impl Inner {
    #[instrument(
        name = "session_initialization_complete",
        skip(self, result),
        fields(generation = %generation, success = result.is_ok())
    )]
    pub(crate) fn on_initialization_complete(
        self: &Arc<Self>,
        generation: Generation,
        result: InitializationResult,
    ) {
        let mut state = self.state.lock();
        let Some(attempt) = state.take_attempt(generation) else {
            drop(state);
            warn!("Initialization result for a stale attempt discarded");
            record_init_attempt("stale");
            if let Ok(tracker) = result {
                self.sdk.release(tracker);
            }
            return;
        };

        match result {
            Ok(mut tracker) => {
                let adapter = CallbackAdapter::new(
                    generation,
                    Arc::clone(&self.bus),
                    self.config.scale,
                    Arc::downgrade(self),
                );
                tracker.set_listener(Arc::new(adapter));
                state.activate(generation, tracker);
                self.bus.activate(generation);
                drop(state);

                attempt.resolve(InitOutcome::succeeded());
                record_init_attempt("success");
                record_session_active(true);
                info!("Gaze tracker initialized");
            }
            Err(kind) => {
                drop(state);
                attempt.resolve(InitOutcome::failed(kind.as_str()));
                record_init_attempt("failure");
                warn!(error = %kind, "Gaze tracker initialization failed");
            }
        }
    }

    /// Stop, sever subscribers, hand the tracker back. Caller holds the lock.
    fn release_locked(&self, state: &mut SessionState, cause: ReleaseCause) -> bool {
        let Some(mut session) = state.take_active() else {
            debug!(cause = cause.as_str(), "Release without session ignored");
            return false;
        };

        session.tracker.stop_tracking();
        let signalled = self.bus.close_all();
        session.tracker.remove_listener();
        self.sdk.release(session.tracker);

        record_session_released(cause.as_str());
        info!(
            generation = %session.generation,
            cause = cause.as_str(),
            subscribers = signalled,
            "Gaze tracker released"
        );
        true
    }

    fn release_generation(&self, generation: Generation, cause: ReleaseCause) -> bool {
        let mut state = self.state.lock();
        if state.generation() != Some(generation) {
            debug!(generation = %generation, "Release for a stale generation ignored");
            return false;
        }
        self.release_locked(&mut state, cause)
    }

    /// A tracker stopped with a failure; called on the producer thread
    pub(crate) fn report_fatal_status(
        self: &Arc<Self>,
        generation: Generation,
        error: StatusErrorKind,
    ) {
        warn!(generation = %generation, error = %error, "Tracker stopped with failure");
        if !self.config.release_on_fatal_status {
            return;
        }

        let controller: Weak<Inner> = Arc::downgrade(self);
        thread::spawn(move || {
            if let Some(inner) = controller.upgrade() {
                inner.release_generation(generation, ReleaseCause::FatalStatus);
            }
        });
    }
}

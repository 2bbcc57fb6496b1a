//! Simulated tracker handle

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use contracts::{
    CalibrationMode, CalibrationRun, CameraPosition, ForcedOrientation, GazeTracker,
    MockTrackerConfig, Rect, StatusErrorKind, TrackerListener, TrackerOptions,
};
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::config::MockConfig;
use crate::frames::FrameGenerator;
use crate::stats::MockStats;

/// Progress callbacks per calibration target
const PROGRESS_STEPS: u32 = 5;
/// Poll interval while waiting for `start_collect_samples`
const COLLECT_POLL: Duration = Duration::from_millis(5);

/// State shared with the producer threads
struct Shared {
    listener: RwLock<Option<Arc<dyn TrackerListener>>>,
    tracking: AtomicBool,
    tracking_epoch: AtomicU64,
    calibrating: AtomicBool,
    calibration_epoch: AtomicU64,
    collecting: AtomicBool,
    fps: AtomicU32,
    stats: Arc<MockStats>,
}

impl Shared {
    /// Run `f` against the listener without holding any lock
    fn emit(&self, f: impl FnOnce(&dyn TrackerListener)) {
        let listener = self.listener.read().clone();
        if let Some(listener) = listener {
            f(listener.as_ref());
        }
    }

    fn is_tracking_epoch(&self, epoch: u64) -> bool {
        self.tracking.load(Ordering::SeqCst) && self.tracking_epoch.load(Ordering::SeqCst) == epoch
    }

    fn is_calibration_epoch(&self, epoch: u64) -> bool {
        self.calibrating.load(Ordering::SeqCst)
            && self.calibration_epoch.load(Ordering::SeqCst) == epoch
    }

    fn frame_interval(&self, default_hz: f64) -> Duration {
        let fps = self.fps.load(Ordering::Relaxed);
        let hz = if fps > 0 { fps as f64 } else { default_hz };
        Duration::from_secs_f64(1.0 / hz.max(1.0))
    }
}

/// Simulated gaze tracker
///
/// Tracking and calibration each run on a background thread gated by an
/// atomic flag. Stopping only clears the flag; the thread notices on its
/// next iteration and reports the stop itself.
pub struct MockGazeTracker {
    id: u64,
    shared: Arc<Shared>,
    settings: MockTrackerConfig,
    config: MockConfig,
    options: TrackerOptions,
    attention_region: Option<Rect>,
    camera_positions: Vec<CameraPosition>,
    selected_camera: Option<usize>,
    forced_orientation: Option<ForcedOrientation>,
    calibration_data: Vec<f64>,
}

impl MockGazeTracker {
    pub(crate) fn new(
        id: u64,
        settings: MockTrackerConfig,
        config: MockConfig,
        options: TrackerOptions,
        stats: Arc<MockStats>,
    ) -> Self {
        stats.tracker_created();
        let camera_positions = config.camera_positions.clone();
        Self {
            id,
            shared: Arc::new(Shared {
                listener: RwLock::new(None),
                tracking: AtomicBool::new(false),
                tracking_epoch: AtomicU64::new(0),
                calibrating: AtomicBool::new(false),
                calibration_epoch: AtomicU64::new(0),
                collecting: AtomicBool::new(false),
                fps: AtomicU32::new(0),
                stats,
            }),
            settings,
            config,
            options,
            attention_region: None,
            camera_positions,
            selected_camera: None,
            forced_orientation: None,
            calibration_data: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Options the tracker was initialized with
    pub fn options(&self) -> &TrackerOptions {
        &self.options
    }

    pub fn forced_orientation(&self) -> Option<ForcedOrientation> {
        self.forced_orientation
    }

    /// Calibration data last loaded through `set_calibration_data`
    pub fn calibration_data(&self) -> &[f64] {
        &self.calibration_data
    }

    fn spawn_tracking_worker(&self, epoch: u64) {
        let shared = Arc::clone(&self.shared);
        let default_hz = self.settings.frame_rate_hz;
        let interrupt_after = self.config.interrupt_after_frames;
        let mut generator = FrameGenerator::new(
            self.settings.screen_width,
            self.settings.screen_height,
            self.options.camera_preset.unwrap_or_default().frame_size(),
            self.options.use_blink.unwrap_or(false),
            self.options.use_user_status.unwrap_or(false),
        );
        let id = self.id;

        thread::spawn(move || {
            debug!(tracker = id, epoch, "mock tracking started");
            shared.emit(|l| l.on_started());

            let mut frames: u64 = 0;
            while shared.is_tracking_epoch(epoch) {
                let (gaze, face, blink, user_status) = generator.next_frame();
                shared.emit(|l| l.on_metrics(now_millis(), gaze, face, blink, user_status));
                shared.stats.inc_frames_emitted();
                frames += 1;
                trace!(tracker = id, frames, "mock frame emitted");

                if interrupt_after.is_some_and(|limit| frames >= limit) {
                    if shared.tracking_epoch.load(Ordering::SeqCst) == epoch {
                        shared.tracking.store(false, Ordering::SeqCst);
                    }
                    debug!(tracker = id, frames, "mock camera interrupted");
                    shared.emit(|l| l.on_stopped(StatusErrorKind::CameraInterrupt));
                    return;
                }

                thread::sleep(shared.frame_interval(default_hz));
            }

            debug!(tracker = id, frames, "mock tracking stopped");
            shared.emit(|l| l.on_stopped(StatusErrorKind::None));
        });
    }

    fn spawn_calibration_worker(&self, run: &CalibrationRun, epoch: u64) {
        let shared = Arc::clone(&self.shared);
        let region = run.region.unwrap_or(Rect::new(
            0.0,
            0.0,
            self.settings.screen_width,
            self.settings.screen_height,
        ));
        let targets = calibration_targets(run.mode, region);
        let step = Duration::from_millis(self.settings.calibration_point_ms)
            / PROGRESS_STEPS;
        let id = self.id;

        thread::spawn(move || {
            let total = targets.len() as f64;
            let mut collected = Vec::with_capacity(targets.len());

            for (index, &(x, y)) in targets.iter().enumerate() {
                shared.collecting.store(false, Ordering::SeqCst);
                if !shared.is_calibration_epoch(epoch) {
                    break;
                }
                shared.emit(|l| l.on_calibration_next_point(x, y));

                while !shared.collecting.load(Ordering::SeqCst) {
                    if !shared.is_calibration_epoch(epoch) {
                        break;
                    }
                    thread::sleep(COLLECT_POLL);
                }

                for n in 1..=PROGRESS_STEPS {
                    if !shared.is_calibration_epoch(epoch) {
                        break;
                    }
                    thread::sleep(step);
                    let progress =
                        (index as f64 + n as f64 / PROGRESS_STEPS as f64) / total;
                    shared.emit(|l| l.on_calibration_progress(progress));
                }

                if !shared.is_calibration_epoch(epoch) {
                    break;
                }
                collected.push((x, y));
            }

            let data = calibration_coefficients(&collected);
            let finished = collected.len() == targets.len()
                && shared
                    .calibrating
                    .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok();
            shared.collecting.store(false, Ordering::SeqCst);

            if finished {
                debug!(tracker = id, points = collected.len(), "mock calibration finished");
                shared.emit(|l| l.on_calibration_finished(data));
            } else {
                debug!(tracker = id, points = collected.len(), "mock calibration canceled");
                shared.emit(|l| l.on_calibration_canceled(data));
            }
        });
    }
}

impl GazeTracker for MockGazeTracker {
    fn set_listener(&mut self, listener: Arc<dyn TrackerListener>) {
        *self.shared.listener.write() = Some(listener);
    }

    fn remove_listener(&mut self) {
        self.shared.listener.write().take();
    }

    fn start_tracking(&mut self) {
        self.shared.stats.inc_start_tracking_calls();

        if self.config.fail_camera_start {
            let shared = Arc::clone(&self.shared);
            thread::spawn(move || shared.emit(|l| l.on_stopped(StatusErrorKind::CameraStart)));
            return;
        }

        if self.shared.tracking.swap(true, Ordering::SeqCst) {
            return;
        }
        let epoch = self.shared.tracking_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.spawn_tracking_worker(epoch);
    }

    fn stop_tracking(&mut self) {
        self.shared.stats.inc_stop_tracking_calls();
        self.shared.tracking.store(false, Ordering::SeqCst);
    }

    fn is_tracking(&self) -> bool {
        self.shared.tracking.load(Ordering::SeqCst)
    }

    fn set_tracking_fps(&mut self, fps: i32) -> bool {
        if !(1..=self.config.max_tracking_fps).contains(&fps) {
            return false;
        }
        self.shared.fps.store(fps as u32, Ordering::Relaxed);
        true
    }

    fn start_calibration(&mut self, run: &CalibrationRun) -> bool {
        self.shared.stats.inc_calibration_calls();
        if !self.is_tracking() || self.shared.calibrating.swap(true, Ordering::SeqCst) {
            return false;
        }
        let epoch = self.shared.calibration_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.spawn_calibration_worker(run, epoch);
        true
    }

    fn stop_calibration(&mut self) {
        self.shared.calibrating.store(false, Ordering::SeqCst);
    }

    fn is_calibrating(&self) -> bool {
        self.shared.calibrating.load(Ordering::SeqCst)
    }

    fn start_collect_samples(&mut self) -> bool {
        self.is_calibrating() && !self.shared.collecting.swap(true, Ordering::SeqCst)
    }

    fn set_calibration_data(&mut self, data: &[f64]) -> bool {
        if data.is_empty() {
            return false;
        }
        self.calibration_data = data.to_vec();
        true
    }

    fn set_attention_region(&mut self, region: Rect) {
        self.attention_region = Some(region);
    }

    fn attention_region(&self) -> Option<Rect> {
        self.attention_region
    }

    fn remove_attention_region(&mut self) {
        self.attention_region = None;
    }

    fn add_camera_position(&mut self, position: CameraPosition) {
        self.camera_positions.push(position);
    }

    fn camera_position(&self) -> Option<CameraPosition> {
        self.selected_camera
            .and_then(|index| self.camera_positions.get(index))
            .cloned()
    }

    fn camera_position_list(&self) -> Vec<CameraPosition> {
        self.camera_positions.clone()
    }

    fn select_camera_position(&mut self, index: usize) {
        if index < self.camera_positions.len() {
            self.selected_camera = Some(index);
        }
    }

    fn has_camera_positions(&self) -> bool {
        !self.camera_positions.is_empty()
    }

    fn set_forced_orientation(&mut self, orientation: ForcedOrientation) -> bool {
        if self.is_calibrating() {
            return false;
        }
        self.forced_orientation = Some(orientation);
        true
    }

    fn reset_forced_orientation(&mut self) -> bool {
        if self.is_calibrating() {
            return false;
        }
        self.forced_orientation = None;
        true
    }
}

impl Drop for MockGazeTracker {
    fn drop(&mut self) {
        self.shared.listener.write().take();
        self.shared.tracking.store(false, Ordering::SeqCst);
        self.shared.calibrating.store(false, Ordering::SeqCst);
        self.shared.stats.tracker_dropped();
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Target points in device pixels: the center first, then the inset corners
fn calibration_targets(mode: CalibrationMode, region: Rect) -> Vec<(f64, f64)> {
    let at = |fx: f64, fy: f64| {
        (
            region.left + region.width() * fx,
            region.top + region.height() * fy,
        )
    };
    match mode {
        CalibrationMode::OnePoint => vec![at(0.5, 0.5)],
        CalibrationMode::FivePoint => vec![
            at(0.5, 0.5),
            at(0.1, 0.1),
            at(0.9, 0.1),
            at(0.1, 0.9),
            at(0.9, 0.9),
        ],
    }
}

/// Opaque per-point coefficients, as the real SDK hands back
fn calibration_coefficients(points: &[(f64, f64)]) -> Vec<f64> {
    points
        .iter()
        .flat_map(|&(x, y)| [x, y, 1.0, (x * 0.001).sin() + (y * 0.001).cos()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{AccuracyCriteria, BlinkInfo, FaceInfo, GazeInfo, UserStatusInfo};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingListener {
        frames: AtomicU64,
        started: AtomicU64,
        stops: Mutex<Vec<StatusErrorKind>>,
        next_points: Mutex<Vec<(f64, f64)>>,
        finished: Mutex<Option<Vec<f64>>>,
        canceled: AtomicBool,
    }

    impl TrackerListener for RecordingListener {
        fn on_metrics(&self, _: i64, _: GazeInfo, _: FaceInfo, _: BlinkInfo, _: UserStatusInfo) {
            self.frames.fetch_add(1, Ordering::SeqCst);
        }
        fn on_started(&self) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }
        fn on_stopped(&self, error: StatusErrorKind) {
            self.stops.lock().push(error);
        }
        fn on_calibration_progress(&self, _: f64) {}
        fn on_calibration_next_point(&self, x: f64, y: f64) {
            self.next_points.lock().push((x, y));
        }
        fn on_calibration_finished(&self, data: Vec<f64>) {
            *self.finished.lock() = Some(data);
        }
        fn on_calibration_canceled(&self, _: Vec<f64>) {
            self.canceled.store(true, Ordering::SeqCst);
        }
    }

    fn tracker(config: MockConfig) -> (MockGazeTracker, Arc<RecordingListener>) {
        let settings = MockTrackerConfig {
            frame_rate_hz: 200.0,
            calibration_point_ms: 10,
            ..Default::default()
        };
        let mut tracker = MockGazeTracker::new(
            1,
            settings,
            config,
            TrackerOptions::default(),
            Arc::new(MockStats::default()),
        );
        let listener = Arc::new(RecordingListener::default());
        tracker.set_listener(listener.clone());
        (tracker, listener)
    }

    fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        for _ in 0..400 {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_tracking_emits_frames_and_stops() {
        let (mut tracker, listener) = tracker(MockConfig::default());
        tracker.start_tracking();
        assert!(tracker.is_tracking());
        assert!(wait_until(|| listener.frames.load(Ordering::SeqCst) > 3));

        tracker.stop_tracking();
        assert!(!tracker.is_tracking());
        assert!(wait_until(|| !listener.stops.lock().is_empty()));
        assert_eq!(listener.started.load(Ordering::SeqCst), 1);
        assert_eq!(listener.stops.lock()[0], StatusErrorKind::None);
    }

    #[test]
    fn test_camera_interrupt_stops_tracking() {
        let config = MockConfig {
            interrupt_after_frames: Some(3),
            ..Default::default()
        };
        let (mut tracker, listener) = tracker(config);
        tracker.start_tracking();

        assert!(wait_until(|| !listener.stops.lock().is_empty()));
        assert_eq!(listener.stops.lock()[0], StatusErrorKind::CameraInterrupt);
        assert!(!tracker.is_tracking());
    }

    #[test]
    fn test_calibration_requires_tracking() {
        let (mut tracker, _listener) = tracker(MockConfig::default());
        let run = CalibrationRun::new(CalibrationMode::OnePoint, AccuracyCriteria::Default);
        assert!(!tracker.start_calibration(&run));
        assert!(!tracker.is_calibrating());
    }

    #[test]
    fn test_one_point_calibration_finishes_after_collection() {
        let (mut tracker, listener) = tracker(MockConfig::default());
        tracker.start_tracking();

        let run = CalibrationRun::new(CalibrationMode::OnePoint, AccuracyCriteria::Default)
            .with_region(Rect::new(0.0, 0.0, 200.0, 100.0));
        assert!(tracker.start_calibration(&run));
        assert!(wait_until(|| !listener.next_points.lock().is_empty()));
        assert_eq!(listener.next_points.lock()[0], (100.0, 50.0));

        assert!(tracker.start_collect_samples());
        assert!(wait_until(|| listener.finished.lock().is_some()));
        assert!(!tracker.is_calibrating());
        assert_eq!(listener.finished.lock().as_ref().map(Vec::len), Some(4));
    }

    #[test]
    fn test_stop_calibration_cancels() {
        let (mut tracker, listener) = tracker(MockConfig::default());
        tracker.start_tracking();
        let run = CalibrationRun::new(CalibrationMode::FivePoint, AccuracyCriteria::High);
        assert!(tracker.start_calibration(&run));
        assert!(wait_until(|| !listener.next_points.lock().is_empty()));

        tracker.stop_calibration();
        assert!(wait_until(|| listener.canceled.load(Ordering::SeqCst)));
    }

    #[test]
    fn test_camera_position_selection() {
        let position = CameraPosition {
            model_name: "SM-T720".into(),
            screen_width: 1600.0,
            screen_height: 2560.0,
            screen_origin_x: -800.0,
            screen_origin_y: 0.0,
            camera_on_longer_axis: false,
        };
        let (mut tracker, _listener) = tracker(MockConfig::default());
        assert!(!tracker.has_camera_positions());
        assert!(tracker.camera_position().is_none());

        tracker.add_camera_position(position.clone());
        tracker.select_camera_position(0);
        assert_eq!(tracker.camera_position(), Some(position));
        assert_eq!(tracker.camera_position_list().len(), 1);
    }

    #[test]
    fn test_tracking_fps_bounds() {
        let (mut tracker, _listener) = tracker(MockConfig::default());
        assert!(tracker.set_tracking_fps(15));
        assert!(!tracker.set_tracking_fps(0));
        assert!(!tracker.set_tracking_fps(120));
    }
}

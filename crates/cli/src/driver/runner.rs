//! Driver - wires the bridge together and scripts one session.

use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, info, trace, warn};

use command_dispatcher::{keys, Arguments, CommandDispatcher, CommandReply, MethodCall, MethodName};
use contracts::{BridgeConfig, CalibrationEvent, StatusEvent, TrackerOptions, TrackingEvent};
use event_bus::{BusEvent, ChannelSink, EventBus, EventStream, LogSink};
use mock_tracker::MockTrackerSdk;
use session::{ControllerConfig, SessionController};

use super::RunStats;
use crate::error::CliError;

/// Driver configuration
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Loaded bridge configuration, CLI overrides applied
    pub bridge: BridgeConfig,

    /// License key for the SDK
    pub license: String,

    /// Per-call initialization options
    pub options: TrackerOptions,

    /// How long to track (None = until shutdown)
    pub duration: Option<Duration>,

    /// Calibration mode code to run after tracking starts
    pub calibration_mode: Option<i64>,

    /// Tracking FPS to request (None = SDK default)
    pub tracking_fps: Option<i32>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// Wrap the driver's streams in a `LogSink`
    pub log_events: bool,
}

/// Runs one session from initialization to release
pub struct Driver {
    config: DriverConfig,
    dispatcher: CommandDispatcher,
    stats: RunStats,
}

impl Driver {
    pub fn new(config: DriverConfig) -> Self {
        let bridge = &config.bridge;
        let sdk = Arc::new(MockTrackerSdk::new(bridge.mock.clone()));
        let bus = Arc::new(EventBus::new(&bridge.event_bus));
        let controller = SessionController::new(sdk, bus, ControllerConfig::from(bridge));
        let dispatcher = CommandDispatcher::new(controller, bridge.platform);

        Self {
            config,
            dispatcher,
            stats: RunStats::default(),
        }
    }

    /// Run the session until the duration elapses, the tracker stops, or
    /// `shutdown` resolves
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> Result<RunStats> {
        let start_time = Instant::now();

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let bus = self.dispatcher.controller().bus().clone();
        let mut tracking = self.listen::<TrackingEvent>(&bus, "cli-tracking");
        let mut status = self.listen::<StatusEvent>(&bus, "cli-status");
        let mut calibration = self.listen::<CalibrationEvent>(&bus, "cli-calibration");

        let version = self.send(MethodName::GetVersionName, Arguments::new()).await?;
        self.stats.version = version[keys::VERSION].as_str().unwrap_or_default().to_string();
        info!(
            version = %self.stats.version,
            platform = %self.dispatcher.platform(),
            "Tracker SDK loaded"
        );

        self.initialize().await?;
        self.send(MethodName::StartTracking, Arguments::new()).await?;

        if let Some(fps) = self.config.tracking_fps {
            let applied = self
                .send(
                    MethodName::SetTrackingFps,
                    Arguments::new().with(keys::TRACKING_FPS, fps),
                )
                .await?;
            info!(fps, applied = %applied, "Tracking FPS requested");
        }

        let duration = self.config.duration;
        let deadline = async move {
            match duration {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);
        tokio::pin!(shutdown);

        let mut calibration_requested = false;
        let mut status_open = true;
        let mut calibration_open = true;

        loop {
            // Calibration needs the tracker running, so wait for its start event
            if !calibration_requested && self.stats.events.status_counts.contains_key("start") {
                calibration_requested = true;
                if let Some(mode) = self.config.calibration_mode {
                    self.start_calibration(mode).await?;
                }
            }

            tokio::select! {
                _ = &mut deadline => {
                    info!("Run duration elapsed");
                    break;
                }
                _ = &mut shutdown => {
                    warn!("Received shutdown signal, stopping session...");
                    break;
                }
                event = tracking.recv() => match event {
                    Some(event) => {
                        trace!(
                            timestamp = event.timestamp,
                            state = %event.tracking_state,
                            "Tracking event"
                        );
                        self.stats.events.update(&event);
                    }
                    None => {
                        warn!("Tracking stream ended");
                        break;
                    }
                },
                event = status.recv(), if status_open => match event {
                    Some(event) => {
                        self.stats.events.update_status(&event);
                        if let StatusEvent::Stop { failed_reason } = event {
                            warn!(reason = %failed_reason, "Tracker stopped");
                            self.stats.stopped_reason = Some(failed_reason);
                            break;
                        }
                    }
                    None => status_open = false,
                },
                event = calibration.recv(), if calibration_open => match event {
                    Some(event) => self.on_calibration(event).await?,
                    None => calibration_open = false,
                },
            }
        }

        info!("Shutting down session...");
        if self.dispatcher.controller().is_initialized() {
            self.send(MethodName::StopTracking, Arguments::new()).await?;
        }
        self.send(MethodName::ReleaseGazeTracker, Arguments::new()).await?;
        self.dispatcher.shutdown();

        // Release ends every stream; count what was still queued
        for event in tracking.drain() {
            self.stats.events.update(&event);
        }
        for event in status.drain() {
            self.stats.events.update_status(&event);
        }

        self.stats.duration = start_time.elapsed();
        info!(
            duration_secs = self.stats.duration.as_secs_f64(),
            frames = self.stats.events.total_frames,
            fps = format!("{:.2}", self.stats.fps()),
            "Session shutdown complete"
        );

        Ok(self.stats)
    }

    /// Subscribe a bounded stream, logged when `log_events` is set
    fn listen<E>(&self, bus: &EventBus, name: &str) -> EventStream<E>
    where
        E: BusEvent + Debug + Send + 'static,
    {
        let (sink, stream) = ChannelSink::new(name, bus.queue_capacity(E::CATEGORY));
        if self.config.log_events {
            let logged = LogSink::new(format!("{name}-log"))
                .forward_to(Arc::new(sink));
            bus.subscribe::<E>(Arc::new(logged));
        } else {
            bus.subscribe::<E>(Arc::new(sink));
        }
        stream
    }

    async fn initialize(&mut self) -> Result<()> {
        let options = &self.config.options;
        let mut args = Arguments::new().with(keys::LICENSE, self.config.license.as_str());
        if let Some(use_blink) = options.use_blink {
            args = args.with(keys::USE_BLINK, use_blink);
        }
        if let Some(use_user_status) = options.use_user_status {
            args = args.with(keys::USE_USER_STATUS, use_user_status);
        }
        if let Some(preset) = options.camera_preset {
            args = args.with(keys::CAMERA_PRESET, preset.as_str());
        }

        let reply = self.send(MethodName::InitGazeTracker, args).await?;
        if reply[keys::INITIALIZED_RESULT].as_bool() != Some(true) {
            let message = reply[keys::INITIALIZED_MESSAGE]
                .as_str()
                .unwrap_or_default()
                .to_string();
            return Err(CliError::initialization(message).into());
        }
        info!("Gaze tracker initialized");
        Ok(())
    }

    async fn start_calibration(&mut self, mode: i64) -> Result<()> {
        let started = self
            .send(
                MethodName::StartCalibration,
                Arguments::new().with(keys::CALIBRATION_MODE, mode),
            )
            .await?;
        if started.as_bool() == Some(true) {
            info!(mode, "Calibration started");
        } else {
            warn!(mode, "Tracker refused to start calibration");
        }
        Ok(())
    }

    async fn on_calibration(&mut self, event: CalibrationEvent) -> Result<()> {
        self.stats.events.update_calibration(&event);
        match event {
            CalibrationEvent::NextPoint { x, y } => {
                info!(x = format!("{x:.1}"), y = format!("{y:.1}"), "Calibration point shown");
                self.send(MethodName::StartCollectSamples, Arguments::new())
                    .await?;
            }
            CalibrationEvent::Progress { progress } => {
                debug!(progress = format!("{progress:.2}"), "Calibration progress");
            }
            CalibrationEvent::Finished { data } => {
                info!(coefficients = data.len(), "Calibration finished");
                self.stats.calibration_coefficients = Some(data.len());
                let applied = self
                    .send(
                        MethodName::SetCalibrationData,
                        Arguments::new().with(keys::CALIBRATION_DATA, data),
                    )
                    .await?;
                debug!(applied = %applied, "Calibration data loaded");
            }
            CalibrationEvent::Canceled { data } => {
                warn!(coefficients = data.len(), "Calibration canceled");
            }
        }
        Ok(())
    }

    /// Send one command through the dispatcher
    async fn send(&mut self, method: MethodName, args: Arguments) -> Result<Value> {
        self.stats.commands_sent += 1;
        let reply = self
            .dispatcher
            .handle(MethodCall::new(method.as_str(), args))
            .await
            .map_err(|e| CliError::command(method.as_str(), e))?;
        match reply {
            CommandReply::Success(value) => Ok(value),
            CommandReply::NotImplemented => {
                anyhow::bail!("command '{method}' is not implemented")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::MockTrackerConfig;

    fn driver_config(log_events: bool) -> DriverConfig {
        let mut bridge = BridgeConfig::default();
        bridge.mock = MockTrackerConfig {
            init_delay_ms: 0,
            frame_rate_hz: 200.0,
            calibration_point_ms: 10,
            ..Default::default()
        };
        DriverConfig {
            bridge,
            license: "dev-license".to_string(),
            options: TrackerOptions::default(),
            duration: Some(Duration::from_millis(200)),
            calibration_mode: None,
            tracking_fps: None,
            metrics_port: None,
            log_events,
        }
    }

    #[tokio::test]
    async fn test_logged_session_still_feeds_stats() {
        let stats = Driver::new(driver_config(true))
            .run(std::future::pending())
            .await
            .unwrap();

        assert!(stats.events.total_frames > 0);
        assert!(stats.stopped_reason.is_none());
        assert!(stats.version.starts_with("mock-"));
    }

    #[tokio::test]
    async fn test_shutdown_signal_ends_session() {
        let mut config = driver_config(false);
        config.duration = None;
        let stats = Driver::new(config)
            .run(tokio::time::sleep(Duration::from_millis(50)))
            .await
            .unwrap();

        // version, init, start, stop, release
        assert_eq!(stats.commands_sent, 5);
    }
}

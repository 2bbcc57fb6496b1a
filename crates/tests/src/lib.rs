//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Wire-format snapshots of the event contracts
//! - Full command flows against the simulated SDK
//! - Session teardown and subscriber behaviour under concurrency

#[cfg(test)]
mod support {
    use std::sync::Arc;
    use std::time::Duration;

    use command_dispatcher::{
        keys, Arguments, CommandDispatcher, CommandReply, MethodCall, Platform,
    };
    use contracts::{DisplayScale, MockTrackerConfig};
    use event_bus::{EventBus, EventStream};
    use mock_tracker::{MockConfig, MockTrackerSdk};
    use serde_json::Value;
    use session::{ControllerConfig, SessionController};

    pub struct Bridge {
        pub dispatcher: CommandDispatcher,
        pub sdk: Arc<MockTrackerSdk>,
        pub bus: Arc<EventBus>,
    }

    pub fn settings() -> MockTrackerConfig {
        MockTrackerConfig {
            init_delay_ms: 0,
            frame_rate_hz: 200.0,
            calibration_point_ms: 10,
            ..Default::default()
        }
    }

    pub fn bridge_with(config: MockConfig, density: f64, release_on_fatal_status: bool) -> Bridge {
        let sdk = Arc::new(MockTrackerSdk::with_config(settings(), config));
        let bus = Arc::new(EventBus::default());
        let controller = SessionController::new(
            sdk.clone(),
            bus.clone(),
            ControllerConfig {
                scale: DisplayScale::new(density),
                release_on_fatal_status,
                ..Default::default()
            },
        );
        Bridge {
            dispatcher: CommandDispatcher::new(controller, Platform::Android),
            sdk,
            bus,
        }
    }

    pub fn bridge() -> Bridge {
        bridge_with(MockConfig::default(), 1.0, true)
    }

    pub fn init_call() -> MethodCall {
        MethodCall::new("initGazeTracker", Arguments::new().with(keys::LICENSE, "L"))
    }

    impl Bridge {
        pub async fn call(&self, call: MethodCall) -> Value {
            match self.dispatcher.handle(call).await {
                Ok(CommandReply::Success(value)) => value,
                other => panic!("unexpected reply: {other:?}"),
            }
        }

        pub async fn bare(&self, method: &str) -> Value {
            self.call(MethodCall::bare(method)).await
        }
    }

    /// Next event, failing the test after two seconds
    pub async fn next<E>(stream: &mut EventStream<E>) -> Option<E> {
        tokio::time::timeout(Duration::from_secs(2), stream.recv())
            .await
            .expect("timed out waiting for an event")
    }

    pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
        for _ in 0..400 {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }
}

#[cfg(test)]
mod contract_tests {
    use contracts::{CalibrationEvent, StatusEvent, TrackingEvent};
    use serde_json::json;

    use crate::support::*;

    #[tokio::test]
    async fn test_tracking_event_keys() {
        let bridge = bridge();
        let mut tracking = bridge.bus.listen::<TrackingEvent>("tracking");
        bridge.call(init_call()).await;
        bridge.bare("startTracking").await;

        let event = next(&mut tracking).await.unwrap();
        let json = serde_json::to_value(event).unwrap();
        let object = json.as_object().unwrap();
        for key in [
            "timestamp",
            "gazeX",
            "gazeY",
            "fixationX",
            "fixationY",
            "trackingState",
            "eyeMovementState",
            "screenState",
            "faceScore",
            "isBlink",
            "leftOpenness",
            "isDrowsy",
            "drowsinessIntensity",
            "attentionScore",
        ] {
            assert!(object.contains_key(key), "missing key {key}");
        }
    }

    #[test]
    fn test_status_and_calibration_wire_form() {
        assert_eq!(
            serde_json::to_value(StatusEvent::Stop {
                failed_reason: "ERROR_CAMERA_INTERRUPT".into()
            })
            .unwrap(),
            json!({ "statusEventType": "stop", "statusFailedReason": "ERROR_CAMERA_INTERRUPT" })
        );
        assert_eq!(
            serde_json::to_value(CalibrationEvent::Finished { data: vec![0.5] }).unwrap(),
            json!({ "calibrationType": "onCalibrationFinished", "calibrationData": [0.5] })
        );
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use command_dispatcher::{keys, Arguments, CommandError, MethodCall};
    use contracts::{
        CalibrationEvent, EventCategory, Generation, InitializationErrorKind, StatusEvent,
        TrackingEvent,
    };
    use event_bus::{CallbackSink, EventBus};
    use mock_tracker::MockConfig;
    use serde_json::json;

    use crate::support::*;

    /// End-to-end: init -> start -> stream frames -> release -> streams end
    #[tokio::test]
    async fn test_e2e_tracking_session() {
        let bridge = bridge();
        let mut tracking = bridge.bus.listen::<TrackingEvent>("tracking");
        let mut status = bridge.bus.listen::<StatusEvent>("status");

        let reply = bridge.call(init_call()).await;
        assert_eq!(reply[keys::INITIALIZED_RESULT], json!(true));
        assert_eq!(
            reply[keys::INITIALIZED_MESSAGE],
            json!(InitializationErrorKind::None.as_str())
        );

        bridge.bare("startTracking").await;
        assert_eq!(next(&mut status).await, Some(StatusEvent::Start));

        for _ in 0..5 {
            let event = next(&mut tracking).await.unwrap();
            assert!(!event.tracking_state.is_empty());
        }
        assert_eq!(bridge.bare("isTracking").await, json!(true));

        assert_eq!(bridge.bare("releaseGazeTracker").await, json!(keys::RELEASED));

        // Queued events may remain, then the stream ends
        while next(&mut tracking).await.is_some() {}
        while next(&mut status).await.is_some() {}
        assert!(tracking.is_closed());

        let err = bridge
            .dispatcher
            .handle(MethodCall::bare("isTracking"))
            .await
            .unwrap_err();
        assert_eq!(err.code, CommandError::NOT_INITIALIZED);
    }

    #[tokio::test]
    async fn test_failed_initialization_reply() {
        let bridge = bridge_with(
            MockConfig::failing_init(InitializationErrorKind::AuthExpiredKey),
            1.0,
            true,
        );
        let reply = bridge.call(init_call()).await;
        assert_eq!(reply[keys::INITIALIZED_RESULT], json!(false));
        assert_eq!(
            reply[keys::INITIALIZED_MESSAGE],
            json!(InitializationErrorKind::AuthExpiredKey.as_str())
        );
        assert!(!bridge.dispatcher.controller().is_initialized());

        // A later attempt is allowed
        assert!(!bridge.dispatcher.controller().is_attempting());
    }

    /// Concurrent initialization: exactly one request reaches the SDK
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_initialize() {
        let bridge = Arc::new(bridge_with(MockConfig::deferred(), 1.0, true));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let bridge = Arc::clone(&bridge);
            handles.push(tokio::spawn(async move { bridge.call(init_call()).await }));
        }

        assert!(eventually(|| bridge.sdk.pending_count() == 1).await);
        // Every other caller is turned away while the SDK holds the request
        assert!(eventually(|| handles.iter().filter(|h| h.is_finished()).count() == 7).await);
        assert_eq!(bridge.sdk.pending_count(), 1);

        assert!(bridge.sdk.complete_pending());
        let mut replies = Vec::new();
        for handle in handles {
            replies.push(handle.await.unwrap());
        }

        let accepted = replies
            .iter()
            .filter(|r| r[keys::INITIALIZED_RESULT] == json!(true))
            .count();
        assert_eq!(accepted, 1);
        for reply in replies
            .iter()
            .filter(|r| r[keys::INITIALIZED_RESULT] == json!(false))
        {
            assert_eq!(reply[keys::INITIALIZED_MESSAGE], json!(keys::ALREADY_ATTEMPTING));
        }
        assert_eq!(bridge.sdk.stats().init_calls(), 1);
        assert!(!bridge.sdk.complete_pending());
    }

    #[tokio::test]
    async fn test_release_twice_is_noop() {
        let bridge = bridge();
        bridge.call(init_call()).await;

        bridge.bare("releaseGazeTracker").await;
        bridge.bare("releaseGazeTracker").await;

        assert_eq!(bridge.sdk.stats().release_calls(), 1);
        assert_eq!(bridge.sdk.stats().live_trackers(), 0);
        assert!(!bridge.dispatcher.controller().is_initialized());
    }

    /// Every active subscriber gets exactly one end-of-stream and nothing after it
    #[tokio::test]
    async fn test_release_ends_each_subscriber_once() {
        let bridge = bridge();
        let ends = Arc::new(AtomicUsize::new(0));
        let late_events = Arc::new(AtomicUsize::new(0));
        let released = Arc::new(std::sync::atomic::AtomicBool::new(false));

        {
            let ends = Arc::clone(&ends);
            let late_events = Arc::clone(&late_events);
            let released = Arc::clone(&released);
            let sink = CallbackSink::new("status", move |_: StatusEvent| {
                if released.load(Ordering::SeqCst) {
                    late_events.fetch_add(1, Ordering::SeqCst);
                }
            })
            .on_end(move || {
                ends.fetch_add(1, Ordering::SeqCst);
            });
            bridge.bus.subscribe::<StatusEvent>(Arc::new(sink));
        }
        let mut tracking = bridge.bus.listen::<TrackingEvent>("tracking");

        bridge.call(init_call()).await;
        let generation = bridge.dispatcher.controller().generation().unwrap();
        bridge.bare("startTracking").await;
        next(&mut tracking).await.unwrap();

        bridge.bare("releaseGazeTracker").await;
        released.store(true, Ordering::SeqCst);

        // A callback from the released session is dropped
        assert!(!bridge.bus.publish(generation, StatusEvent::Start));
        bridge.bare("releaseGazeTracker").await;

        // A delivery still in flight hands the end signal to the producer
        assert!(eventually(|| ends.load(Ordering::SeqCst) == 1).await);
        assert_eq!(ends.load(Ordering::SeqCst), 1);
        assert_eq!(late_events.load(Ordering::SeqCst), 0);
        assert!(!bridge.bus.has_subscriber(EventCategory::Status));
    }

    #[test]
    fn test_unsubscribe_then_publish_delivers_nothing() {
        let bus = EventBus::default();
        let generation = Generation::new(3);
        bus.activate(generation);

        let mut stream = bus.listen::<CalibrationEvent>("calibration");
        assert!(bus.unsubscribe(EventCategory::Calibration));
        assert!(!bus.unsubscribe(EventCategory::Calibration));

        assert!(!bus.publish(generation, CalibrationEvent::Progress { progress: 0.5 }));
        assert!(stream.try_recv().is_err());
    }

    #[test]
    fn test_replacing_subscriber_routes_to_new_one() {
        let bus = EventBus::default();
        let generation = Generation::new(1);
        bus.activate(generation);

        let mut first = bus.listen::<StatusEvent>("first");
        assert!(bus.publish(generation, StatusEvent::Start));
        let mut second = bus.listen::<StatusEvent>("second");
        let stop = StatusEvent::Stop {
            failed_reason: "ERROR_NONE".into(),
        };
        assert!(bus.publish(generation, stop.clone()));

        assert_eq!(first.drain(), vec![StatusEvent::Start]);
        assert_eq!(second.drain(), vec![stop]);
    }

    /// Calibration flow with density 2.0: next point arrives in logical units
    #[tokio::test]
    async fn test_e2e_one_point_calibration() {
        let bridge = bridge_with(MockConfig::default(), 2.0, true);
        let mut status = bridge.bus.listen::<StatusEvent>("status");
        let mut calibration = bridge.bus.listen::<CalibrationEvent>("calibration");

        bridge.call(init_call()).await;
        bridge.bare("startTracking").await;
        assert_eq!(next(&mut status).await, Some(StatusEvent::Start));

        let started = bridge
            .call(MethodCall::new(
                "startCalibration",
                Arguments::new().with(keys::CALIBRATION_MODE, 1),
            ))
            .await;
        assert_eq!(started, json!(true));
        assert_eq!(bridge.bare("isCalibrating").await, json!(true));

        let settings = settings();
        match next(&mut calibration).await {
            Some(CalibrationEvent::NextPoint { x, y }) => {
                assert!((x - settings.screen_width / 4.0).abs() < 1e-9);
                assert!((y - settings.screen_height / 4.0).abs() < 1e-9);
            }
            other => panic!("expected next point, got {other:?}"),
        }
        assert_eq!(bridge.bare("startCollectSamples").await, json!(true));

        let data = loop {
            match next(&mut calibration).await {
                Some(CalibrationEvent::Progress { progress }) => {
                    assert!((0.0..=1.0).contains(&progress));
                }
                Some(CalibrationEvent::Finished { data }) => break data,
                other => panic!("unexpected calibration event {other:?}"),
            }
        };
        assert_eq!(data.len(), 4);

        let applied = bridge
            .call(MethodCall::new(
                "setCalibrationData",
                Arguments::new().with(keys::CALIBRATION_DATA, data),
            ))
            .await;
        assert_eq!(applied, json!(true));
    }

    /// A camera failure mid-session releases the session
    #[tokio::test]
    async fn test_fatal_status_releases_session() {
        let config = MockConfig {
            interrupt_after_frames: Some(5),
            ..Default::default()
        };
        let bridge = bridge_with(config, 1.0, true);
        let mut status = bridge.bus.listen::<StatusEvent>("status");
        let mut tracking = bridge.bus.listen::<TrackingEvent>("tracking");

        bridge.call(init_call()).await;
        bridge.bare("startTracking").await;

        assert_eq!(next(&mut status).await, Some(StatusEvent::Start));
        assert_eq!(
            next(&mut status).await,
            Some(StatusEvent::Stop {
                failed_reason: "ERROR_CAMERA_INTERRUPT".into()
            })
        );

        let controller = bridge.dispatcher.controller().clone();
        assert!(eventually(|| !controller.is_initialized()).await);
        while next(&mut tracking).await.is_some() {}
        assert_eq!(bridge.sdk.stats().release_calls(), 1);

        // The bridge can be initialized again
        let reply = bridge.call(init_call()).await;
        assert_eq!(reply[keys::INITIALIZED_RESULT], json!(true));
    }

    #[tokio::test]
    async fn test_shutdown_abandons_pending_initialization() {
        let bridge = Arc::new(bridge_with(MockConfig::deferred(), 1.0, true));
        let first = {
            let bridge = Arc::clone(&bridge);
            tokio::spawn(async move { bridge.call(init_call()).await })
        };
        assert!(eventually(|| bridge.sdk.pending_count() == 1).await);

        assert!(!bridge.dispatcher.shutdown());
        let reply = first.await.unwrap();
        assert_eq!(reply[keys::INITIALIZED_RESULT], json!(false));

        // The late SDK answer is released straight back
        assert!(bridge.sdk.complete_pending());
        assert!(!bridge.dispatcher.controller().is_initialized());
        assert_eq!(bridge.sdk.stats().release_calls(), 1);
    }

    /// A TOML document drives the whole bridge: platform, density, mock timing
    #[tokio::test]
    async fn test_bridge_from_config_document() {
        use command_dispatcher::CommandDispatcher;
        use config_loader::{ConfigFormat, ConfigLoader};
        use mock_tracker::MockTrackerSdk;
        use session::{ControllerConfig, SessionController};

        let config = ConfigLoader::load_from_str(
            r#"
platform = "ios"

[display]
density = 2.0

[mock]
init_delay_ms = 0
frame_rate_hz = 200.0
"#,
            ConfigFormat::Toml,
        )
        .unwrap();

        let sdk = Arc::new(MockTrackerSdk::new(config.mock.clone()));
        let bus = Arc::new(EventBus::new(&config.event_bus));
        let controller = SessionController::new(sdk, bus.clone(), ControllerConfig::from(&config));
        let dispatcher = CommandDispatcher::new(controller, config.platform);

        // Camera position commands are Android-only
        let reply = dispatcher
            .handle(MethodCall::bare("getCameraPositionList"))
            .await
            .unwrap();
        assert_eq!(reply.value(), Some(&json!(keys::IOS_NOT_SUPPORTED)));

        dispatcher.handle(init_call()).await.unwrap();
        let region = Arguments::new()
            .with(keys::ATTENTION_REGION_LEFT, 10.0)
            .with(keys::ATTENTION_REGION_TOP, 20.0)
            .with(keys::ATTENTION_REGION_RIGHT, 110.0)
            .with(keys::ATTENTION_REGION_BOTTOM, 220.0);
        dispatcher
            .handle(MethodCall::new("setAttentionRegion", region))
            .await
            .unwrap();
        let reply = dispatcher
            .handle(MethodCall::bare("getAttentionRegion"))
            .await
            .unwrap();
        let value = reply.value().cloned().unwrap();
        assert!((value[keys::ATTENTION_REGION_RIGHT].as_f64().unwrap() - 110.0).abs() < 1e-9);
        assert!((value[keys::ATTENTION_REGION_BOTTOM].as_f64().unwrap() - 220.0).abs() < 1e-9);

        assert!(dispatcher.shutdown());
        assert!(!bus.is_open());
    }
}

//! CommandDispatcher - routes named commands onto the session

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument, warn};

use contracts::{BridgeError, CameraPosition, ForcedOrientation, Platform, Rect};
use observability::record_command;
use session::{InitRequest, SessionController};

use crate::arguments::Arguments;
use crate::keys;
use crate::method::MethodName;
use crate::permission::{AlwaysGranted, PermissionGate};
use crate::reply::{CommandError, CommandReply};

const ATTENTION_REGION_KEYS: [&str; 4] = [
    keys::ATTENTION_REGION_LEFT,
    keys::ATTENTION_REGION_TOP,
    keys::ATTENTION_REGION_RIGHT,
    keys::ATTENTION_REGION_BOTTOM,
];

/// One incoming command
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Arguments,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: impl Into<Arguments>) -> Self {
        Self {
            method: method.into(),
            arguments: arguments.into(),
        }
    }

    /// Command without arguments
    pub fn bare(method: impl Into<String>) -> Self {
        Self::new(method, Arguments::new())
    }
}

/// The command surface of one bridge instance
#[derive(Clone)]
pub struct CommandDispatcher {
    controller: SessionController,
    platform: Platform,
    permission: Arc<dyn PermissionGate>,
}

impl CommandDispatcher {
    pub fn new(controller: SessionController, platform: Platform) -> Self {
        Self {
            controller,
            platform,
            permission: Arc::new(AlwaysGranted),
        }
    }

    pub fn with_permission_gate(mut self, gate: Arc<dyn PermissionGate>) -> Self {
        self.permission = gate;
        self
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Handle one command, producing exactly one reply or error
    #[instrument(
        name = "dispatcher_handle",
        skip(self, call),
        fields(command = %call.method, platform = %self.platform)
    )]
    pub async fn handle(&self, call: MethodCall) -> Result<CommandReply, CommandError> {
        let Some(method) = MethodName::parse(&call.method) else {
            debug!("Unknown command");
            record_command("unknown", "not_implemented");
            return Ok(CommandReply::NotImplemented);
        };

        let result = self
            .dispatch(method, &call.arguments)
            .await
            .map_err(CommandError::from);

        match &result {
            Ok(_) => record_command(method.as_str(), "ok"),
            Err(e) => {
                warn!(code = e.code, error = %e.message, "Command failed");
                record_command(method.as_str(), e.status());
            }
        }
        result
    }

    /// Release the session along with any in-flight initialization
    ///
    /// Called when the host detaches the bridge.
    #[instrument(name = "dispatcher_shutdown", skip(self))]
    pub fn shutdown(&self) -> bool {
        let released = self.controller.shutdown();
        info!(released, "Command dispatcher shut down");
        released
    }

    async fn dispatch(
        &self,
        method: MethodName,
        args: &Arguments,
    ) -> Result<CommandReply, BridgeError> {
        if let Some(platform) = method.platform() {
            if platform != self.platform {
                return Ok(CommandReply::from(json!(self.unsupported_message())));
            }
        }
        if method.requires_permission() && !self.permission.camera_permission_granted() {
            return Err(BridgeError::PermissionDenied);
        }

        let controller = &self.controller;
        let value = match method {
            // ===== Lifecycle =====
            MethodName::InitGazeTracker => return self.init_gaze_tracker(args).await,
            MethodName::ReleaseGazeTracker => {
                controller.release();
                json!(keys::RELEASED)
            }
            MethodName::GetVersionName => {
                object([(keys::VERSION, json!(controller.version_name()))])
            }

            // ===== Tracking =====
            MethodName::StartTracking => {
                controller.start_tracking()?;
                Value::Null
            }
            MethodName::StopTracking => {
                controller.stop_tracking()?;
                Value::Null
            }
            MethodName::IsTracking => json!(controller.is_tracking()?),
            MethodName::SetTrackingFps => {
                let fps = args.require_i64(keys::TRACKING_FPS)?;
                let fps = i32::try_from(fps).map_err(|_| {
                    BridgeError::invalid_argument(keys::TRACKING_FPS, "out of range")
                })?;
                json!(controller.set_tracking_fps(fps)?)
            }

            // ===== Camera position =====
            MethodName::HasCameraPositions => json!(controller.has_camera_positions()?),
            MethodName::AddCameraPosition => {
                let position = args.camera_position()?;
                controller.add_camera_position(position)?;
                Value::Null
            }
            MethodName::GetCameraPosition => match controller.camera_position()? {
                Some(position) => camera_position_value(&position),
                None => json!(keys::CAMERA_POSITION_NULL),
            },
            MethodName::GetCameraPositionList => Value::Array(
                controller
                    .camera_position_list()?
                    .iter()
                    .map(camera_position_value)
                    .collect(),
            ),
            MethodName::SelectCameraPosition => {
                let index = args.require_i64(keys::CAMERA_POSITION_INDEX)?;
                controller.select_camera_position(index)?;
                Value::Null
            }

            // ===== Calibration =====
            MethodName::StartCalibration => {
                let run = args.calibration_run(self.platform == Platform::Ios)?;
                json!(controller.start_calibration(run)?)
            }
            MethodName::StopCalibration => {
                controller.stop_calibration()?;
                Value::Null
            }
            MethodName::IsCalibrating => json!(controller.is_calibrating()?),
            MethodName::StartCollectSamples => json!(controller.start_collect_samples()?),
            MethodName::SetCalibrationData => {
                let data = args.require_f64_list(keys::CALIBRATION_DATA)?;
                json!(controller.set_calibration_data(&data)?)
            }

            // ===== Attention region =====
            MethodName::SetAttentionRegion => {
                let region = args.rect(ATTENTION_REGION_KEYS)?;
                controller.set_attention_region(region)?;
                Value::Null
            }
            MethodName::GetAttentionRegion => match controller.attention_region()? {
                Some(region) => attention_region_value(region),
                None => Value::Null,
            },
            MethodName::RemoveAttentionRegion => {
                controller.remove_attention_region()?;
                Value::Null
            }

            // ===== Orientation =====
            MethodName::SetForcedOrientation => {
                let orientation = args
                    .require_str(keys::ORIENTATION)?
                    .parse::<ForcedOrientation>()
                    .unwrap_or_default();
                json!(controller.set_forced_orientation(orientation)?)
            }
            MethodName::ResetForcedOrientation => json!(controller.reset_forced_orientation()?),
        };
        Ok(CommandReply::Success(value))
    }

    /// Initialization replies are structured, never errors, for the
    /// already-attempting and already-initialized cases
    async fn init_gaze_tracker(&self, args: &Arguments) -> Result<CommandReply, BridgeError> {
        let license = args.require_str(keys::LICENSE)?;
        let options = args.tracker_options()?;

        let reply = match self.controller.initialize(license, options) {
            Ok(InitRequest::Pending(pending)) => {
                let generation = pending.generation();
                let outcome = pending.await;
                info!(
                    generation = %generation,
                    success = outcome.success,
                    "Initialization resolved"
                );
                init_reply(outcome.success, &outcome.message)
            }
            Ok(InitRequest::AlreadyInitialized) => init_reply(false, keys::ALREADY_INITIALIZED),
            Err(BridgeError::AlreadyAttempting) => init_reply(false, keys::ALREADY_ATTEMPTING),
            Err(e) => return Err(e),
        };
        Ok(CommandReply::Success(reply))
    }

    fn unsupported_message(&self) -> &'static str {
        match self.platform {
            Platform::Android => keys::ANDROID_NOT_SUPPORTED,
            Platform::Ios => keys::IOS_NOT_SUPPORTED,
        }
    }
}

fn object<const N: usize>(entries: [(&str, Value); N]) -> Value {
    let map: Map<String, Value> = entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();
    Value::Object(map)
}

fn init_reply(success: bool, message: &str) -> Value {
    object([
        (keys::INITIALIZED_RESULT, json!(success)),
        (keys::INITIALIZED_MESSAGE, json!(message)),
    ])
}

fn camera_position_value(position: &CameraPosition) -> Value {
    object([
        (keys::MODEL_NAME, json!(position.model_name)),
        (keys::SCREEN_WIDTH, json!(position.screen_width)),
        (keys::SCREEN_HEIGHT, json!(position.screen_height)),
        (keys::SCREEN_ORIGIN_X, json!(position.screen_origin_x)),
        (keys::SCREEN_ORIGIN_Y, json!(position.screen_origin_y)),
        (keys::CAMERA_ON_LONGER_AXIS, json!(position.camera_on_longer_axis)),
    ])
}

fn attention_region_value(region: Rect) -> Value {
    let [left, top, right, bottom] = ATTENTION_REGION_KEYS;
    object([
        (left, json!(region.left)),
        (top, json!(region.top)),
        (right, json!(region.right)),
        (bottom, json!(region.bottom)),
    ])
}

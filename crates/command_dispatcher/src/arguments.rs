//! Typed access to a command's argument map

use contracts::{
    AccuracyCriteria, BridgeError, CalibrationMode, CalibrationRun, CameraPosition, CameraPreset,
    Rect, TrackerOptions,
};
use serde_json::{Map, Value};

use crate::keys;

/// Argument map of one command call
///
/// Absent keys and explicit `null` are treated the same.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for hosts and tests
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    // ===== Optional getters =====

    pub fn str(&self, key: &str) -> Result<Option<&str>, BridgeError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(BridgeError::invalid_argument(key, "expected a string")),
        }
    }

    pub fn bool(&self, key: &str) -> Result<Option<bool>, BridgeError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(BridgeError::invalid_argument(key, "expected a boolean")),
        }
    }

    /// Integer argument; integral floats are accepted
    pub fn i64(&self, key: &str) -> Result<Option<i64>, BridgeError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        if let Some(n) = value.as_i64() {
            return Ok(Some(n));
        }
        match value.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
            _ => Err(BridgeError::invalid_argument(key, "expected an integer")),
        }
    }

    pub fn f64(&self, key: &str) -> Result<Option<f64>, BridgeError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| BridgeError::invalid_argument(key, "expected a number")),
        }
    }

    pub fn f64_list(&self, key: &str) -> Result<Option<Vec<f64>>, BridgeError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let Value::Array(items) = value else {
            return Err(BridgeError::invalid_argument(key, "expected a list of numbers"));
        };
        items
            .iter()
            .map(|item| {
                item.as_f64()
                    .ok_or_else(|| BridgeError::invalid_argument(key, "expected a list of numbers"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    // ===== Required getters =====

    pub fn require_str(&self, key: &str) -> Result<&str, BridgeError> {
        self.str(key)?
            .ok_or_else(|| BridgeError::missing_argument(key))
    }

    pub fn require_bool(&self, key: &str) -> Result<bool, BridgeError> {
        self.bool(key)?
            .ok_or_else(|| BridgeError::missing_argument(key))
    }

    pub fn require_i64(&self, key: &str) -> Result<i64, BridgeError> {
        self.i64(key)?
            .ok_or_else(|| BridgeError::missing_argument(key))
    }

    pub fn require_f64(&self, key: &str) -> Result<f64, BridgeError> {
        self.f64(key)?
            .ok_or_else(|| BridgeError::missing_argument(key))
    }

    pub fn require_f64_list(&self, key: &str) -> Result<Vec<f64>, BridgeError> {
        self.f64_list(key)?
            .ok_or_else(|| BridgeError::missing_argument(key))
    }

    // ===== Composite arguments =====

    /// Initialization options; `None` when no option key is present
    pub fn tracker_options(&self) -> Result<Option<TrackerOptions>, BridgeError> {
        let max_concurrency = match self.i64(keys::MAX_CONCURRENCY)? {
            Some(n) => Some(u32::try_from(n).map_err(|_| {
                BridgeError::invalid_argument(
                    keys::MAX_CONCURRENCY,
                    "must be a non-negative integer",
                )
            })?),
            None => None,
        };
        let camera_preset = match self.str(keys::CAMERA_PRESET)? {
            Some(s) => Some(
                s.parse::<CameraPreset>()
                    .map_err(|e| BridgeError::invalid_argument(keys::CAMERA_PRESET, e))?,
            ),
            None => None,
        };
        let options = TrackerOptions {
            use_blink: self.bool(keys::USE_BLINK)?,
            use_user_status: self.bool(keys::USE_USER_STATUS)?,
            use_gaze_filter: self.bool(keys::USE_GAZE_FILTER)?,
            max_concurrency,
            camera_preset,
        };
        Ok(options.into_non_empty())
    }

    pub fn camera_position(&self) -> Result<CameraPosition, BridgeError> {
        Ok(CameraPosition {
            model_name: self.require_str(keys::MODEL_NAME)?.to_string(),
            screen_width: self.require_f64(keys::SCREEN_WIDTH)?,
            screen_height: self.require_f64(keys::SCREEN_HEIGHT)?,
            screen_origin_x: self.require_f64(keys::SCREEN_ORIGIN_X)?,
            screen_origin_y: self.require_f64(keys::SCREEN_ORIGIN_Y)?,
            camera_on_longer_axis: self.bool(keys::CAMERA_ON_LONGER_AXIS)?.unwrap_or(false),
        })
    }

    /// Rectangle from four edge keys, all required
    pub fn rect(&self, edges: [&str; 4]) -> Result<Rect, BridgeError> {
        let [left, top, right, bottom] = edges;
        Ok(Rect::new(
            self.require_f64(left)?,
            self.require_f64(top)?,
            self.require_f64(right)?,
            self.require_f64(bottom)?,
        ))
    }

    /// Rectangle from four edge keys; `None` unless all four are present
    pub fn optional_rect(&self, edges: [&str; 4]) -> Result<Option<Rect>, BridgeError> {
        if edges.iter().all(|key| self.contains(key)) {
            self.rect(edges).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Calibration request; missing mode or criteria take their defaults
    pub fn calibration_run(&self, honor_previous: bool) -> Result<CalibrationRun, BridgeError> {
        let mode = self
            .i64(keys::CALIBRATION_MODE)?
            .map(CalibrationMode::from_code)
            .unwrap_or_default();
        let criteria = self
            .i64(keys::CALIBRATION_CRITERIA)?
            .map(AccuracyCriteria::from_code)
            .unwrap_or_default();

        let mut run = CalibrationRun::new(mode, criteria);
        if let Some(region) = self.optional_rect([
            keys::CALIBRATION_REGION_LEFT,
            keys::CALIBRATION_REGION_TOP,
            keys::CALIBRATION_REGION_RIGHT,
            keys::CALIBRATION_REGION_BOTTOM,
        ])? {
            run = run.with_region(region);
        }
        if honor_previous {
            run.use_previous_calibration =
                self.bool(keys::USE_PREVIOUS_CALIBRATION)?.unwrap_or(false);
        }
        Ok(run)
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Value> for Arguments {
    /// Non-object values yield an empty map
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_is_missing() {
        let args = Arguments::from(json!({ "license": null }));
        let err = args.require_str(keys::LICENSE).unwrap_err();
        assert!(
            matches!(err, BridgeError::InvalidArgument { ref field, .. } if field == "license")
        );
    }

    #[test]
    fn test_wrong_type_is_invalid() {
        let args = Arguments::from(json!({ "trackingFPS": "thirty" }));
        assert!(args.require_i64(keys::TRACKING_FPS).is_err());

        let args = Arguments::from(json!({ "trackingFPS": 30.0 }));
        assert_eq!(args.require_i64(keys::TRACKING_FPS).unwrap(), 30);
    }

    #[test]
    fn test_tracker_options_absent_is_none() {
        let args = Arguments::new().with(keys::LICENSE, "key");
        assert_eq!(args.tracker_options().unwrap(), None);
    }

    #[test]
    fn test_tracker_options_parsed() {
        let args = Arguments::from(json!({
            "useBlink": true,
            "maxConcurrency": 2,
            "cameraPreset": "HD1280x720",
        }));
        let options = args.tracker_options().unwrap().unwrap();
        assert_eq!(options.use_blink, Some(true));
        assert_eq!(options.use_user_status, None);
        assert_eq!(options.max_concurrency, Some(2));
        assert_eq!(options.camera_preset, Some(CameraPreset::Hd1280x720));
    }

    #[test]
    fn test_tracker_options_rejects_bad_preset() {
        let args = Arguments::from(json!({ "cameraPreset": "4k" }));
        assert!(args.tracker_options().is_err());
    }

    #[test]
    fn test_calibration_run_encodings() {
        let args = Arguments::from(json!({
            "calibrationMode": 1,
            "calibrationCriteria": -3,
            "usePreviousCalibration": true,
        }));
        let run = args.calibration_run(false).unwrap();
        assert_eq!(run.mode, CalibrationMode::OnePoint);
        assert_eq!(run.criteria, AccuracyCriteria::Low);
        assert_eq!(run.region, None);
        assert!(!run.use_previous_calibration);

        assert!(args.calibration_run(true).unwrap().use_previous_calibration);
    }

    #[test]
    fn test_partial_region_means_full_screen() {
        let args = Arguments::from(json!({
            "calibrationRegionLeft": 0.0,
            "calibrationRegionTop": 0.0,
            "calibrationRegionRight": 100.0,
        }));
        assert_eq!(args.calibration_run(false).unwrap().region, None);
    }

    #[test]
    fn test_calibration_data_list() {
        let args = Arguments::from(json!({ "calibrationData": [0.5, 1, -2.25] }));
        assert_eq!(
            args.require_f64_list(keys::CALIBRATION_DATA).unwrap(),
            vec![0.5, 1.0, -2.25]
        );

        let args = Arguments::from(json!({ "calibrationData": [0.5, "x"] }));
        assert!(args.require_f64_list(keys::CALIBRATION_DATA).is_err());
    }
}

//! Calibration run parameters

use serde::{Deserialize, Serialize};

use crate::Rect;

/// Number of targets shown during calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationMode {
    OnePoint,
    #[default]
    FivePoint,
}

impl CalibrationMode {
    /// `1` selects one-point; every other code selects five-point
    pub fn from_code(code: i64) -> Self {
        if code == 1 {
            Self::OnePoint
        } else {
            Self::FivePoint
        }
    }

    pub fn point_count(&self) -> usize {
        match self {
            Self::OnePoint => 1,
            Self::FivePoint => 5,
        }
    }
}

/// Accuracy required before a calibration point is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyCriteria {
    Low,
    #[default]
    Default,
    High,
}

impl AccuracyCriteria {
    /// Negative codes select low, zero default, positive high
    pub fn from_code(code: i64) -> Self {
        match code.signum() {
            -1 => Self::Low,
            0 => Self::Default,
            _ => Self::High,
        }
    }
}

/// One calibration run
///
/// `region` is `None` for the full screen. The hardware side always sees
/// device pixels; the session controller converts before handing it over.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalibrationRun {
    pub mode: CalibrationMode,
    pub criteria: AccuracyCriteria,
    pub region: Option<Rect>,
    /// Only honoured on iOS; ignored elsewhere
    pub use_previous_calibration: bool,
}

impl CalibrationRun {
    pub fn new(mode: CalibrationMode, criteria: AccuracyCriteria) -> Self {
        Self {
            mode,
            criteria,
            region: None,
            use_previous_calibration: false,
        }
    }

    pub fn with_region(mut self, region: Rect) -> Self {
        self.region = Some(region);
        self
    }
}

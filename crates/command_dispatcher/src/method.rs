//! Closed table of command names

use std::fmt;

use contracts::Platform;

/// Every command the bridge understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodName {
    InitGazeTracker,
    ReleaseGazeTracker,
    GetVersionName,
    StartTracking,
    StopTracking,
    IsTracking,
    HasCameraPositions,
    AddCameraPosition,
    GetCameraPosition,
    GetCameraPositionList,
    SelectCameraPosition,
    SetTrackingFps,
    StartCalibration,
    StopCalibration,
    IsCalibrating,
    StartCollectSamples,
    SetCalibrationData,
    SetAttentionRegion,
    GetAttentionRegion,
    RemoveAttentionRegion,
    SetForcedOrientation,
    ResetForcedOrientation,
}

impl MethodName {
    pub const ALL: [MethodName; 22] = [
        Self::InitGazeTracker,
        Self::ReleaseGazeTracker,
        Self::GetVersionName,
        Self::StartTracking,
        Self::StopTracking,
        Self::IsTracking,
        Self::HasCameraPositions,
        Self::AddCameraPosition,
        Self::GetCameraPosition,
        Self::GetCameraPositionList,
        Self::SelectCameraPosition,
        Self::SetTrackingFps,
        Self::StartCalibration,
        Self::StopCalibration,
        Self::IsCalibrating,
        Self::StartCollectSamples,
        Self::SetCalibrationData,
        Self::SetAttentionRegion,
        Self::GetAttentionRegion,
        Self::RemoveAttentionRegion,
        Self::SetForcedOrientation,
        Self::ResetForcedOrientation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitGazeTracker => "initGazeTracker",
            Self::ReleaseGazeTracker => "releaseGazeTracker",
            Self::GetVersionName => "getVersionName",
            Self::StartTracking => "startTracking",
            Self::StopTracking => "stopTracking",
            Self::IsTracking => "isTracking",
            Self::HasCameraPositions => "hasCameraPositions",
            Self::AddCameraPosition => "addCameraPosition",
            Self::GetCameraPosition => "getCameraPosition",
            Self::GetCameraPositionList => "getCameraPositionList",
            Self::SelectCameraPosition => "selectCameraPosition",
            Self::SetTrackingFps => "setTrackingFPS",
            Self::StartCalibration => "startCalibration",
            Self::StopCalibration => "stopCalibration",
            Self::IsCalibrating => "isCalibrating",
            Self::StartCollectSamples => "startCollectSamples",
            Self::SetCalibrationData => "setCalibrationData",
            Self::SetAttentionRegion => "setAttentionRegion",
            Self::GetAttentionRegion => "getAttentionRegion",
            Self::RemoveAttentionRegion => "removeAttentionRegion",
            Self::SetForcedOrientation => "setForcedOrientation",
            Self::ResetForcedOrientation => "resetForcedOrientation",
        }
    }

    /// Look up a command by its wire name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }

    /// Platform the command is restricted to, if any
    pub fn platform(&self) -> Option<Platform> {
        match self {
            Self::HasCameraPositions
            | Self::AddCameraPosition
            | Self::GetCameraPosition
            | Self::GetCameraPositionList
            | Self::SelectCameraPosition => Some(Platform::Android),
            Self::SetForcedOrientation | Self::ResetForcedOrientation => Some(Platform::Ios),
            _ => None,
        }
    }

    /// Whether the camera permission must be granted first
    pub fn requires_permission(&self) -> bool {
        matches!(
            self,
            Self::InitGazeTracker
                | Self::ReleaseGazeTracker
                | Self::StartTracking
                | Self::StopTracking
        )
    }
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_name() {
        for method in MethodName::ALL {
            assert_eq!(MethodName::parse(method.as_str()), Some(method));
        }
        assert_eq!(MethodName::parse("setTrackingFps"), None);
        assert_eq!(MethodName::parse("openCamera"), None);
    }

    #[test]
    fn test_platform_restrictions() {
        assert_eq!(
            MethodName::SelectCameraPosition.platform(),
            Some(Platform::Android)
        );
        assert_eq!(
            MethodName::ResetForcedOrientation.platform(),
            Some(Platform::Ios)
        );
        assert_eq!(MethodName::StartTracking.platform(), None);
    }
}

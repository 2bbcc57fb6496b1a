//! Configuration parsing
//!
//! TOML is the primary format; JSON is accepted as well.

use contracts::{BridgeConfig, BridgeError};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn parse_toml(content: &str) -> Result<BridgeConfig, BridgeError> {
    toml::from_str(content).map_err(|e| BridgeError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse_json(content: &str) -> Result<BridgeConfig, BridgeError> {
    serde_json::from_str(content).map_err(|e| BridgeError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse(content: &str, format: ConfigFormat) -> Result<BridgeConfig, BridgeError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Platform;

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "platform": "android",
            "display": { "density": 3.0 },
            "session": { "release_on_fatal_status": false }
        }"#;
        let config = parse_json(content).unwrap();
        assert_eq!(config.platform, Platform::Android);
        assert_eq!(config.display.density, 3.0);
        assert!(!config.session.release_on_fatal_status);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let err = parse_toml("invalid toml [[[").unwrap_err();
        assert!(matches!(err, BridgeError::ConfigParse { .. }));
    }

    #[test]
    fn test_unknown_platform_is_parse_error() {
        let err = parse_toml("platform = \"web\"").unwrap_err();
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("TOML"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for a search environment and the engine it talks to.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Steps per episode before it is reported done.
    pub max_steps: u64,
    /// Base URL of the geometry engine's command endpoint.
    pub engine_url: String,
    /// Target design to load when the environment starts.
    pub target_file: Option<PathBuf>,
    /// Address the environment server listens on.
    pub listen_addr: String,
    pub request_timeout_secs: u64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            max_steps: 10,
            engine_url: "http://127.0.0.1:8080".to_string(),
            target_file: None,
            listen_addr: "127.0.0.1:3000".to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl EnvConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_steps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_steps".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.engine_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "engine_url".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = EnvConfig::from_json_str(r#"{"max_steps": 3}"#).unwrap();
        assert_eq!(config.max_steps, 3);
        assert_eq!(config.engine_url, EnvConfig::default().engine_url);
        assert!(config.target_file.is_none());
    }

    #[test]
    fn test_zero_steps_rejected() {
        let err = EnvConfig::from_json_str(r#"{"max_steps": 0}"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for max_steps: must be at least 1");
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            EnvConfig::from_json_str("{max_steps: 3"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = EnvConfig::from_path(Path::new("/nonexistent/extrude.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

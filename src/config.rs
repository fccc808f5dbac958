//! Director configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable that forces debug output on
pub const DEBUG_ENV: &str = "ENSHUTSU_DEBUG";

/// A non-player character the model may bring on stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcProfile {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Configuration of the director pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    /// Number of choices the model is asked to offer
    pub choice_count: usize,
    /// Upper bound on choices kept from a directive
    pub max_choices: usize,
    /// Seconds a choice session waits for the user
    pub choice_timeout_secs: u64,
    /// Expression used when the classifier cannot answer
    pub fallback_expression: String,
    /// Ask the classifier for missing expressions of speaking characters
    pub classify_expressions: bool,
    /// Milliseconds an asset lookup may take before degrading to empty
    pub asset_timeout_ms: u64,
    /// Known non-player characters
    pub npcs: Vec<NpcProfile>,
    /// Enable debug output
    pub debug: bool,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            choice_count: 3,
            max_choices: 4,
            choice_timeout_secs: 60,
            fallback_expression: "neutral".to_string(),
            classify_expressions: true,
            asset_timeout_ms: 5000,
            npcs: Vec::new(),
            debug: std::env::var(DEBUG_ENV).is_ok(),
        }
    }
}

impl DirectorConfig {
    /// Parse and validate a JSON configuration; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_choices == 0 {
            return Err(ConfigError::invalid("max_choices must be at least 1"));
        }
        if self.choice_timeout_secs == 0 {
            return Err(ConfigError::invalid("choice_timeout_secs must be at least 1"));
        }
        Ok(())
    }

    pub fn choice_timeout(&self) -> Duration {
        Duration::from_secs(self.choice_timeout_secs)
    }

    pub fn asset_timeout(&self) -> Duration {
        Duration::from_millis(self.asset_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = DirectorConfig::default();
        assert_eq!(config.choice_count, 3);
        assert_eq!(config.max_choices, 4);
        assert_eq!(config.choice_timeout(), Duration::from_secs(60));
        assert_eq!(config.fallback_expression, "neutral");
        assert!(config.npcs.is_empty());
    }

    #[test]
    fn partial_json_takes_defaults() {
        let config = DirectorConfig::from_json(
            r#"{"choice_count": 2, "npcs": [{"name": "Luna", "description": "a witch"}]}"#,
        )
        .unwrap();
        assert_eq!(config.choice_count, 2);
        assert_eq!(config.max_choices, 4);
        assert_eq!(config.npcs[0].name, "Luna");
    }

    #[test]
    fn zero_max_choices_is_rejected() {
        let result = DirectorConfig::from_json(r#"{"max_choices": 0}"#);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = DirectorConfig::from_json("{choice_count: }");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"choice_timeout_secs": 5}}"#).unwrap();
        let config = DirectorConfig::load(file.path()).unwrap();
        assert_eq!(config.choice_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let result = DirectorConfig::load("/definitely/not/here.json");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}

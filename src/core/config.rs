/// Engine configuration, loaded from RON or built in code.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for the time simulation and scene defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Granularity of passive depletion, in seconds.
    pub tick_seconds: u64,
    /// Size of one chunk of a chunked wait, in minutes.
    pub wait_chunk_minutes: u64,
    /// Day of week at clock zero (0 or 7 = Sunday).
    pub epoch_weekday: u32,
    /// Clock value a new game starts at.
    pub start_seconds: u64,
    /// Label of the option appended when pending pages remain.
    pub continue_label: String,
    /// Display color of interpolation error markers.
    pub error_color: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 900,
            wait_chunk_minutes: 10,
            epoch_weekday: 1,
            start_seconds: 8 * 3600,
            continue_label: "Continue".to_string(),
            error_color: "red".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn load_from_ron(path: &Path) -> Result<EngineConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<EngineConfig, ConfigError> {
        let config: EngineConfig = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_seconds == 0 {
            return Err(ConfigError::Invalid("tick_seconds must be positive".into()));
        }
        if self.wait_chunk_minutes == 0 {
            return Err(ConfigError::Invalid(
                "wait_chunk_minutes must be positive".into(),
            ));
        }
        if self.epoch_weekday > 7 {
            return Err(ConfigError::Invalid("epoch_weekday must be 0..=7".into()));
        }
        Ok(())
    }
}

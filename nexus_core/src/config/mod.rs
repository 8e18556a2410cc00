//! Configuration loading from TOML files

mod constants;
mod content;

pub use constants::{
    CombatConstants, EconomyConstants, HeroConstants, NexusConstants, SimConstants,
    SpawnerConstants, TimingConstants,
};
pub use content::{load_content, parse_content, Content, ContentFile};

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Load a TOML file and deserialize it
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Load a TOML string and deserialize it
pub fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    let config: T = toml::from_str(content)?;
    Ok(config)
}

/// Load simulation constants, validating the values the tick loop divides by
pub fn load_constants(path: &Path) -> Result<SimConstants, ConfigError> {
    let constants: SimConstants = load_toml(path)?;
    validate_constants(&constants)?;
    Ok(constants)
}

pub fn validate_constants(constants: &SimConstants) -> Result<(), ConfigError> {
    if constants.timing.frame_ms <= 0.0 {
        return Err(ConfigError::ValidationError(
            "timing.frame_ms must be positive".to_string(),
        ));
    }
    if constants.spawners.interval <= 0.0 {
        return Err(ConfigError::ValidationError(
            "spawners.interval must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_is_reported() {
        let result: Result<SimConstants, _> = parse_toml("timing = 3");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_zero_frame_rejected() {
        let mut constants = SimConstants::default();
        constants.timing.frame_ms = 0.0;
        assert!(validate_constants(&constants).is_err());
        assert!(validate_constants(&SimConstants::default()).is_ok());
    }

    #[test]
    fn test_missing_file() {
        let result = load_constants(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}

//! Simulation configuration
//!
//! Tunables that vary between runs. Fixed physical constants live in
//! [`crate::consts`]; everything here can be overridden from a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading or validating a [`SimConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("substeps must be at least 1")]
    ZeroSubsteps,
    #[error("projectile pool must hold at least one sphere")]
    EmptyPool,
    #[error("max frame delta must be positive and finite, got {0}")]
    InvalidFrameClamp(f32),
    #[error("mission clock must start above zero")]
    ZeroMissionTime,
}

/// Run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for buff selection
    pub seed: u64,
    /// Mission countdown start (seconds)
    pub mission_seconds: u32,
    /// Time bonus per defused bomb (seconds)
    pub defuse_bonus_seconds: u32,
    /// Power-up duration (seconds)
    pub buff_duration_seconds: u32,
    /// Physics substeps per rendered frame
    pub substeps: u32,
    /// Longest frame delta fed to physics; longer stalls are clamped
    pub max_frame_delta: f32,
    /// Projectile pool capacity
    pub pool_size: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            mission_seconds: MISSION_SECONDS,
            defuse_bonus_seconds: DEFUSE_BONUS_SECONDS,
            buff_duration_seconds: BUFF_DURATION_SECONDS,
            substeps: STEPS_PER_FRAME,
            max_frame_delta: MAX_FRAME_DELTA,
            pool_size: NUM_SPHERES,
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Check invariants the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.substeps == 0 {
            return Err(ConfigError::ZeroSubsteps);
        }
        if self.pool_size == 0 {
            return Err(ConfigError::EmptyPool);
        }
        if !(self.max_frame_delta.is_finite() && self.max_frame_delta > 0.0) {
            return Err(ConfigError::InvalidFrameClamp(self.max_frame_delta));
        }
        if self.mission_seconds == 0 {
            return Err(ConfigError::ZeroMissionTime);
        }
        Ok(())
    }

    /// Serialize to pretty JSON (for writing a starter config)
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip() {
        let config = SimConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(SimConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let config = SimConfig::from_json(r#"{ "mission_seconds": 90 }"#).unwrap();
        assert_eq!(config.mission_seconds, 90);
        assert_eq!(config.substeps, STEPS_PER_FRAME);
        assert_eq!(config.pool_size, NUM_SPHERES);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            SimConfig::from_json(r#"{ "substeps": 0 }"#),
            Err(ConfigError::ZeroSubsteps)
        ));
        assert!(matches!(
            SimConfig::from_json(r#"{ "pool_size": 0 }"#),
            Err(ConfigError::EmptyPool)
        ));
        assert!(matches!(
            SimConfig::from_json(r#"{ "max_frame_delta": -1.0 }"#),
            Err(ConfigError::InvalidFrameClamp(_))
        ));
        assert!(matches!(
            SimConfig::from_json(r#"{ "mission_seconds": 0 }"#),
            Err(ConfigError::ZeroMissionTime)
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SimConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SimConfig::load("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}

use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};

/// Audio engine settings that tables and recorders need to know about.
///
/// The engine owns these values; they are handed to constructors explicitly
/// instead of being read from global state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Frames delivered per processing callback.
    pub block_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            block_size: 256,
        }
    }
}

impl EngineConfig {
    pub fn new(sample_rate: f64, block_size: usize) -> Result<Self> {
        let config = Self { sample_rate, block_size };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document such as
    /// `{"sample_rate": 48000, "block_size": 128}`. Missing fields take defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(TableError::InvalidEngineConfig("sample rate must be positive and finite"));
        }
        if self.block_size == 0 {
            return Err(TableError::InvalidEngineConfig("block size must be at least one frame"));
        }
        Ok(())
    }

    /// Number of whole samples covering `seconds` at this rate.
    #[inline]
    pub fn seconds_to_samples(&self, seconds: f64) -> usize {
        (seconds * self.sample_rate).round().max(0.0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_fills_defaults() {
        let config = EngineConfig::from_json(r#"{"sample_rate": 48000}"#).unwrap();
        assert_eq!(config.sample_rate, 48000.0);
        assert_eq!(config.block_size, 256);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(EngineConfig::new(0.0, 64).is_err());
        assert!(EngineConfig::new(f64::NAN, 64).is_err());
        assert!(EngineConfig::new(48000.0, 0).is_err());
        assert!(matches!(
            EngineConfig::from_json("{not json"),
            Err(TableError::Config(_))
        ));
    }

    #[test]
    fn test_seconds_to_samples_rounds() {
        let config = EngineConfig::new(48000.0, 64).unwrap();
        assert_eq!(config.seconds_to_samples(1.0), 48000);
        assert_eq!(config.seconds_to_samples(0.05), 2400);
        assert_eq!(config.seconds_to_samples(-1.0), 0);
    }
}

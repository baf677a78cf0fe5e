use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Sizes and bounds of the render harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Frames per render quantum.
    pub quantum_size: usize,
    /// Output channels; every channel receives the same samples.
    pub channels: usize,
    pub sample_rate: u32,
    /// Bound of the control -> render queue.
    pub control_capacity: usize,
    /// Bound of the render <-> loader queues.
    pub loader_capacity: usize,
    /// Bound of the render -> control acknowledgment queue.
    pub event_capacity: usize,
    pub render_priority: u8,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            quantum_size: DEFAULT_QUANTUM_SIZE,
            channels: DEFAULT_CHANNELS,
            sample_rate: DEFAULT_SAMPLE_RATE,
            control_capacity: DEFAULT_CONTROL_CAPACITY,
            loader_capacity: DEFAULT_LOADER_CAPACITY,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            render_priority: DEFAULT_RENDER_PRIORITY,
        }
    }
}

impl RuntimeConfig {
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(text).map_err(|source| ConfigError::Toml {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_toml_str(&text, &display)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quantum_size == 0 {
            return Err(ConfigError::Invalid("quantum_size must be positive".into()));
        }
        if self.channels == 0 {
            return Err(ConfigError::Invalid("channels must be positive".into()));
        }
        if self.control_capacity == 0 || self.loader_capacity == 0 || self.event_capacity == 0 {
            return Err(ConfigError::Invalid("queue capacities must be positive".into()));
        }
        if self.render_priority > 99 {
            return Err(ConfigError::Invalid("render_priority must be within 0..=99".into()));
        }
        Ok(())
    }

    /// Size in bytes of the per-quantum scratch buffer in module memory.
    pub fn scratch_bytes(&self) -> usize {
        self.quantum_size * SAMPLE_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "quantum_size = 64\nchannels = 1").unwrap();

        let config = RuntimeConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.quantum_size, 64);
        assert_eq!(config.channels, 1);
        assert_eq!(config.sample_rate, DEFAULT_SAMPLE_RATE);
        assert_eq!(config.scratch_bytes(), 256);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RuntimeConfig::from_toml_file(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_rejects_zero_quantum() {
        let err = RuntimeConfig::from_toml_str("quantum_size = 0", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_toml() {
        let err = RuntimeConfig::from_toml_str("channels = \"two\"", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }
}

//! Codec configuration
//!
//! Loaded from a TOML file; every key is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::callback::MIN_FRAME_LEN;
use crate::error::{CodecError, Result};

/// Callback data budget of the messaging transport
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 64;

/// Upper bound on inflated payloads
pub const DEFAULT_MAX_INFLATED_LEN: usize = 4096;

/// Highest zlib compression level
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// zlib level used for the compressed candidate (0-9)
    pub compression_level: u32,
    /// Largest payload `pack` will hand out
    pub max_payload_len: usize,
    /// Largest payload `unpack` will inflate to
    pub max_inflated_len: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            compression_level: MAX_COMPRESSION_LEVEL,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
            max_inflated_len: DEFAULT_MAX_INFLATED_LEN,
        }
    }
}

impl CodecConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| CodecError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded codec config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(CodecError::Config(format!(
                "compression_level must be 0..={}, got {}",
                MAX_COMPRESSION_LEVEL, self.compression_level
            )));
        }
        if self.max_payload_len < MIN_FRAME_LEN {
            return Err(CodecError::Config(format!(
                "max_payload_len must be at least {}, got {}",
                MIN_FRAME_LEN, self.max_payload_len
            )));
        }
        if self.max_inflated_len < MIN_FRAME_LEN {
            return Err(CodecError::Config(format!(
                "max_inflated_len must be at least {}, got {}",
                MIN_FRAME_LEN, self.max_inflated_len
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = CodecConfig::from_toml_str("").unwrap();
        assert_eq!(config, CodecConfig::default());
        assert_eq!(config.compression_level, 9);
        assert_eq!(config.max_payload_len, 64);
    }

    #[test]
    fn test_partial_override() {
        let config = CodecConfig::from_toml_str("max_payload_len = 128\n").unwrap();
        assert_eq!(config.max_payload_len, 128);
        assert_eq!(config.compression_level, 9);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            CodecConfig::from_toml_str("compression_level = 10"),
            Err(CodecError::Config(_))
        ));
        assert!(matches!(
            CodecConfig::from_toml_str("max_payload_len = 2"),
            Err(CodecError::Config(_))
        ));
        assert!(matches!(
            CodecConfig::from_toml_str("unknown_key = true"),
            Err(CodecError::Config(_))
        ));
    }
}

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Frame rate used when the caller supplies none, or an unparseable value.
pub const DEFAULT_FPS: u32 = 30;

/// Main configuration for the Contour-Compositor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output encoding settings
    pub output: OutputConfig,

    /// Frame/mask discovery settings
    pub discovery: DiscoveryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            discovery: DiscoveryConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|_| ConfigError::ParseFailed {
            path: path.display().to_string(),
        })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.output.validate()?;
        self.discovery.validate()?;
        Ok(())
    }
}

/// Output encoding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Frames per second for the output video (must be positive)
    pub fps: u32,

    /// Video codec passed to the encoder
    pub codec: String,

    /// Quality setting (0-100, higher is better)
    pub quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            codec: "libx264".to_string(),
            quality: 85,
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(ConfigError::InvalidValue {
                key: "output.fps".to_string(),
                value: self.fps.to_string(),
            }
            .into());
        }

        if self.quality > 100 {
            return Err(ConfigError::InvalidValue {
                key: "output.quality".to_string(),
                value: self.quality.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Frame/mask discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// File extension of frame images
    pub frame_extension: String,

    /// File extension of mask images
    pub mask_extension: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            frame_extension: "jpg".to_string(),
            mask_extension: "png".to_string(),
        }
    }
}

impl DiscoveryConfig {
    fn validate(&self) -> Result<()> {
        if self.frame_extension.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "discovery.frame_extension".to_string(),
                value: self.frame_extension.clone(),
            }
            .into());
        }

        if self.mask_extension.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "discovery.mask_extension".to_string(),
                value: self.mask_extension.clone(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.output.fps, DEFAULT_FPS);
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");

        let mut original_config = Config::default();
        original_config.output.fps = 24;
        original_config.discovery.mask_extension = "bmp".to_string();

        original_config.save_to_file(&file_path).unwrap();
        let loaded_config = Config::from_file(&file_path).unwrap();

        assert_eq!(loaded_config.output.fps, 24);
        assert_eq!(loaded_config.output.codec, original_config.output.codec);
        assert_eq!(loaded_config.discovery.mask_extension, "bmp");
    }

    #[test]
    fn test_zero_fps_is_invalid() {
        let mut config = Config::default();
        config.output.fps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_extension_is_invalid() {
        let mut config = Config::default();
        config.discovery.frame_extension = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(Config::from_file("no/such/config.toml").is_err());
    }
}

//! Application settings configuration
//!
//! Defines conversion defaults and source discovery settings.

use crate::utils::ConfigError;
use serde::Deserialize;
use std::path::Path;

/// Conversion settings
#[derive(Debug, Clone, Deserialize)]
pub struct ConversionSettings {
    #[serde(default = "default_include_chain")]
    pub include_chain: bool,
    #[serde(default)]
    pub max_password_attempts: Option<u32>,
}

fn default_include_chain() -> bool {
    true
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            include_chain: true,
            max_password_attempts: None,
        }
    }
}

/// Source discovery settings
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySettings {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec![".pfx".to_string(), ".key".to_string()]
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

/// Application settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub conversion: ConversionSettings,
    #[serde(default)]
    pub discovery: DiscoverySettings,
}

impl Settings {
    /// Load settings from the default config file
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_path = Path::new("config/default.toml");
        if config_path.exists() {
            Self::load_from_file(config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        Self::from_toml(&content)
    }

    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }
}

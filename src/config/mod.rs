//! Configuration module for cert-convert
//!
//! Handles loading settings from TOML files.

pub mod settings;

pub use settings::{ConversionSettings, DiscoverySettings, Settings};

use crate::utils::ConfigError;
use std::path::Path;

/// Load settings from an explicit file, or from the default path when none is given
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    match path {
        Some(path) => Settings::load_from_file(path),
        None => Settings::load_default(),
    }
}

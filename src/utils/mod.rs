//! Utility modules for cert-convert
//!
//! This module contains the error types shared by the library and the CLI.

pub mod error;

pub use error::{ConfigError, ConvertError, Result};

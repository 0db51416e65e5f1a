//! Custom error types for cert-convert
//!
//! This module defines domain-specific error types using `thiserror` for
//! the failure modes of reading, pairing, and re-encoding certificate/key
//! bundles.

use thiserror::Error;

/// Errors produced while reading, validating, or writing a bundle
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Unable to read source {path}: {message}")]
    Io { path: String, message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("The container requires a password")]
    PasswordRequired,

    #[error("Incorrect container password")]
    IncorrectPassword,

    #[error("The container does not hold a private key")]
    NoPrivateKey,

    #[error("Private key does NOT match the certificate")]
    KeyMismatch,

    #[error("No conversion handler for source {path}")]
    UnsupportedSource { path: String },

    #[error("Unsupported conversion target: {label}")]
    UnsupportedTarget { label: String },

    #[error("Failed to encode {message}")]
    Encode { message: String },

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    #[error("Prompt failed: {message}")]
    Prompt { message: String },
}

impl ConvertError {
    /// True for the outcomes that the caller recovers from by asking for
    /// another password.
    pub fn needs_password(&self) -> bool {
        matches!(
            self,
            ConvertError::PasswordRequired | ConvertError::IncorrectPassword
        )
    }

    pub(crate) fn parse(message: impl Into<String>) -> Self {
        ConvertError::Parse {
            message: message.into(),
        }
    }

    pub(crate) fn encode(message: impl Into<String>) -> Self {
        ConvertError::Encode {
            message: message.into(),
        }
    }
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ParseError { message: String },
}

/// Result type alias using ConvertError
pub type Result<T> = std::result::Result<T, ConvertError>;

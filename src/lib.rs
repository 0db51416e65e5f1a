//! cert-convert library
//!
//! Repackages an issued certificate and its private key between:
//! - PKCS#12 containers (`.pfx`), password protected, with chain and friendly name
//! - split files: a DER certificate (`.cer`) and a PEM private key (`.key`)
//!
//! Every conversion goes through a [`Bundle`], which can only exist when the
//! private key belongs to the certificate.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cert_convert::cert_ops::{pfx, split};
//!
//! let bundle = pfx::read_pfx(&std::fs::read("site.pfx")?, Some("hunter2"))?;
//! let files = split::write_split(&bundle)?;
//! std::fs::write("site.cer", &files.certificate)?;
//! std::fs::write("site.key", &files.private_key)?;
//! ```

pub mod cert_ops;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use cert_ops::{Bundle, Format};
pub use cli::Cli;
pub use config::Settings;
pub use utils::{ConvertError, Result};

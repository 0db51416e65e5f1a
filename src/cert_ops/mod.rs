//! Certificate file operations module
//!
//! Reads certificate/key pairs from PKCS#12 containers or split .cer/.key
//! files into a [`Bundle`], checks that the key belongs to the certificate,
//! and writes the bundle back out in the other format.

pub mod bundle;
pub mod certificate;
pub mod discovery;
pub mod key;
pub mod pfx;
pub mod registry;
pub mod runner;
mod safe_bags;
pub mod split;

pub use bundle::Bundle;
pub use certificate::Certificate;
pub use key::{KeyAlgorithm, PrivateKey};
pub use registry::{ExportOptions, Format, OutputFile};
pub use runner::{convert, read_bundle, ConvertOutcome, ConvertRequest, Prompter};
pub use split::SplitFiles;

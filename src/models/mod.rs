//! Data models for cert-convert
//!
//! Serialisable views of bundles for display and JSON output.

pub mod summary;

pub use summary::{BundleSummary, CertificateSummary};

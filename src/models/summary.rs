//! Bundle summary types

use crate::cert_ops::{Bundle, Certificate};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Display fields of one certificate
#[derive(Debug, Clone, Serialize)]
pub struct CertificateSummary {
    pub subject: String,
    pub issuer: String,
    pub serial: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub public_key_algorithm: String,
    pub sha256_fingerprint: String,
}

impl From<&Certificate> for CertificateSummary {
    fn from(cert: &Certificate) -> Self {
        Self {
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            serial: cert.serial().to_string(),
            not_before: cert.not_before(),
            not_after: cert.not_after(),
            public_key_algorithm: cert.public_key_algorithm().to_string(),
            sha256_fingerprint: cert.sha256_fingerprint(),
        }
    }
}

/// What `inspect` reports about a bundle. Never includes key material.
#[derive(Debug, Clone, Serialize)]
pub struct BundleSummary {
    /// Registry label of the source format
    pub format: String,
    pub friendly_name: Option<String>,
    pub key_algorithm: String,
    pub certificate: CertificateSummary,
    pub chain: Vec<CertificateSummary>,
}

impl BundleSummary {
    pub fn new(format: &str, bundle: &Bundle) -> Self {
        Self {
            format: format.to_string(),
            friendly_name: bundle.friendly_name().map(str::to_string),
            key_algorithm: bundle.private_key().algorithm().to_string(),
            certificate: CertificateSummary::from(bundle.certificate()),
            chain: bundle.chain().iter().map(CertificateSummary::from).collect(),
        }
    }

    /// True when the leaf certificate's validity window contains `now`
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.certificate.not_before <= now && now <= self.certificate.not_after
    }
}

//! X.509 certificate parsing
//!
//! Accepts one certificate in PEM or DER form and keeps the DER bytes next to
//! the fields needed for key pairing and display.

use crate::utils::{ConvertError, Result};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use x509_parser::prelude::*;

const OID_RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
const OID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
const OID_ED25519: &str = "1.3.101.112";

/// A parsed end-entity or chain certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
    subject: String,
    issuer: String,
    serial: String,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    public_key_algorithm: String,
    public_key_spki: Vec<u8>,
}

impl Certificate {
    /// Parse a single DER-encoded certificate. Trailing bytes are rejected.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let (rest, cert) = X509Certificate::from_der(der).map_err(|e| {
            ConvertError::parse(format!("Failed to parse DER certificate: {:?}", e))
        })?;

        if !rest.is_empty() {
            return Err(ConvertError::parse(format!(
                "{} trailing bytes after DER certificate",
                rest.len()
            )));
        }

        let validity = cert.validity();
        let not_before = to_utc(validity.not_before)?;
        let not_after = to_utc(validity.not_after)?;

        let spki = cert.public_key();
        let public_key_algorithm = match spki.algorithm.algorithm.to_id_string().as_str() {
            OID_RSA_ENCRYPTION => "RSA".to_string(),
            OID_EC_PUBLIC_KEY => "EC".to_string(),
            OID_ED25519 => "Ed25519".to_string(),
            other => other.to_string(),
        };

        Ok(Self {
            der: der.to_vec(),
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            serial: cert.raw_serial_as_string(),
            not_before,
            not_after,
            public_key_algorithm,
            public_key_spki: spki.raw.to_vec(),
        })
    }

    /// Parse a certificate file that may be PEM or DER.
    ///
    /// PEM input uses the first `CERTIFICATE` block.
    pub fn from_pem_or_der(data: &[u8]) -> Result<Self> {
        if !is_pem(data) {
            return Self::from_der(data);
        }

        let pems = ::pem::parse_many(data)
            .map_err(|e| ConvertError::parse(format!("Failed to parse PEM: {}", e)))?;

        let cert_pem = pems
            .into_iter()
            .find(|p| p.tag() == "CERTIFICATE")
            .ok_or_else(|| ConvertError::parse("No CERTIFICATE block found in PEM data"))?;

        Self::from_der(cert_pem.contents())
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// Short algorithm name ("RSA", "EC", ...) or the dotted OID when unknown
    pub fn public_key_algorithm(&self) -> &str {
        &self.public_key_algorithm
    }

    /// Raw SubjectPublicKeyInfo bytes as stored in the certificate
    pub fn public_key_spki(&self) -> &[u8] {
        &self.public_key_spki
    }

    /// Lowercase hex SHA-256 over the DER encoding
    pub fn sha256_fingerprint(&self) -> String {
        hex::encode(Sha256::digest(&self.der))
    }
}

/// True when the bytes look like PEM text
pub(crate) fn is_pem(data: &[u8]) -> bool {
    std::str::from_utf8(data)
        .map(|text| text.contains("-----BEGIN "))
        .unwrap_or(false)
}

fn to_utc(time: ASN1Time) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(time.timestamp(), 0)
        .ok_or_else(|| ConvertError::parse("Certificate validity is out of range"))
}

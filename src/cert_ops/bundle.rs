//! Certificate/key bundle
//!
//! The pivot value between formats: a leaf certificate, its issuer chain,
//! the matching private key and an optional friendly name.

use crate::cert_ops::certificate::Certificate;
use crate::cert_ops::key::PrivateKey;
use crate::utils::{ConvertError, Result};

/// A complete certificate/key pair ready to be re-encoded.
///
/// A `Bundle` can only be built through [`Bundle::new`], which refuses keys
/// whose public half differs from the certificate's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    certificate: Certificate,
    chain: Vec<Certificate>,
    private_key: PrivateKey,
    friendly_name: Option<String>,
}

impl Bundle {
    pub fn new(
        certificate: Certificate,
        chain: Vec<Certificate>,
        private_key: PrivateKey,
        friendly_name: Option<String>,
    ) -> Result<Self> {
        if !private_key.matches(&certificate) {
            tracing::debug!(
                "Key ({}) does not match certificate {}",
                private_key.algorithm(),
                certificate.subject()
            );
            return Err(ConvertError::KeyMismatch);
        }

        Ok(Self {
            certificate,
            chain,
            private_key,
            friendly_name: friendly_name.filter(|name| !name.is_empty()),
        })
    }

    /// The end-entity certificate
    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// Issuer certificates, leaf-to-root as stored in the source
    pub fn chain(&self) -> &[Certificate] {
        &self.chain
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn friendly_name(&self) -> Option<&str> {
        self.friendly_name.as_deref()
    }
}

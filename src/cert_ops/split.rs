//! Split certificate/key files (.cer + .key)
//!
//! The certificate file holds one DER (or PEM) certificate, the key file an
//! unencrypted PEM (or DER) private key. No chain travels in this format.

use crate::cert_ops::bundle::Bundle;
use crate::cert_ops::certificate::Certificate;
use crate::cert_ops::key::PrivateKey;
use crate::utils::{ConvertError, Result};
use std::path::{Path, PathBuf};

pub const CER_EXTENSION: &str = ".cer";
pub const KEY_EXTENSION: &str = ".key";

/// Encoded output of a split conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitFiles {
    /// DER bytes of the leaf certificate
    pub certificate: Vec<u8>,
    /// PEM text of the private key in its native encoding
    pub private_key: Vec<u8>,
}

/// Build a bundle from certificate and key bytes
pub fn read_split(cert_data: &[u8], key_data: &[u8]) -> Result<Bundle> {
    let certificate = Certificate::from_pem_or_der(cert_data)?;
    let private_key = PrivateKey::from_pem_or_der(key_data)?;
    Bundle::new(certificate, Vec::new(), private_key, None)
}

/// Read the certificate and key files and build a bundle
pub fn read_split_files(cert_path: &Path, key_path: &Path) -> Result<Bundle> {
    let cert_data = read_file(cert_path)?;
    let key_data = read_file(key_path)?;
    read_split(&cert_data, &key_data)
}

/// Encode the leaf certificate and the key. Chain certificates are dropped.
pub fn write_split(bundle: &Bundle) -> Result<SplitFiles> {
    if !bundle.chain().is_empty() {
        tracing::debug!(
            "Dropping {} chain certificate(s) for split output",
            bundle.chain().len()
        );
    }

    Ok(SplitFiles {
        certificate: bundle.certificate().der().to_vec(),
        private_key: bundle.private_key().to_pem()?.into_bytes(),
    })
}

/// Resolve a split-format source into its `(certificate, key)` paths.
///
/// Either half may be given: `site.key` pairs with `site.cer` and the other
/// way round. Extension matching is case-insensitive.
pub fn resolve_pair(source: &Path) -> Result<(PathBuf, PathBuf)> {
    let text = source.to_string_lossy();

    if let Some(stem) = strip_suffix_ignore_case(&text, KEY_EXTENSION) {
        return Ok((
            PathBuf::from(format!("{}{}", stem, CER_EXTENSION)),
            source.to_path_buf(),
        ));
    }

    if let Some(stem) = strip_suffix_ignore_case(&text, CER_EXTENSION) {
        return Ok((
            source.to_path_buf(),
            PathBuf::from(format!("{}{}", stem, KEY_EXTENSION)),
        ));
    }

    Err(ConvertError::Io {
        path: source.display().to_string(),
        message: format!(
            "expected a {} or {} file",
            KEY_EXTENSION, CER_EXTENSION
        ),
    })
}

pub(crate) fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let split_at = text.len().checked_sub(suffix.len())?;
    if !text.is_char_boundary(split_at) {
        return None;
    }
    let (head, tail) = text.split_at(split_at);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| ConvertError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE_CER: &[u8] = include_bytes!("../../tests/fixtures/site.cer");
    const SITE_KEY: &[u8] = include_bytes!("../../tests/fixtures/site.key");
    const WRONG_KEY: &[u8] = include_bytes!("../../tests/fixtures/wrong.key");
    const CHAINED_PFX: &[u8] = include_bytes!("../../tests/fixtures/chained.pfx");

    #[test]
    fn test_resolve_from_key() {
        let (cer, key) = resolve_pair(Path::new("certs/site.key")).unwrap();
        assert_eq!(cer, PathBuf::from("certs/site.cer"));
        assert_eq!(key, PathBuf::from("certs/site.key"));
    }

    #[test]
    fn test_resolve_case_insensitive() {
        let (cer, key) = resolve_pair(Path::new("SITE.KEY")).unwrap();
        assert_eq!(cer, PathBuf::from("SITE.cer"));
        assert_eq!(key, PathBuf::from("SITE.KEY"));
    }

    #[test]
    fn test_resolve_from_cer() {
        let (cer, key) = resolve_pair(Path::new("site.Cer")).unwrap();
        assert_eq!(cer, PathBuf::from("site.Cer"));
        assert_eq!(key, PathBuf::from("site.key"));
    }

    #[test]
    fn test_resolve_other_extension() {
        assert!(resolve_pair(Path::new("site.pfx")).is_err());
    }

    #[test]
    fn test_round_trip() {
        let bundle = read_split(SITE_CER, SITE_KEY).unwrap();
        let files = write_split(&bundle).unwrap();
        assert_eq!(files.certificate, SITE_CER);

        let again = read_split(&files.certificate, &files.private_key).unwrap();
        assert_eq!(again, bundle);
        assert!(again.chain().is_empty());
    }

    #[test]
    fn test_mismatch() {
        assert!(matches!(
            read_split(SITE_CER, WRONG_KEY),
            Err(ConvertError::KeyMismatch)
        ));
    }

    #[test]
    fn test_chain_dropped() {
        let bundle = crate::cert_ops::pfx::read_pfx(CHAINED_PFX, Some("chainpass")).unwrap();
        assert_eq!(bundle.chain().len(), 1);

        let files = write_split(&bundle).unwrap();
        assert_eq!(files.certificate, bundle.certificate().der());
        let again = read_split(&files.certificate, &files.private_key).unwrap();
        assert!(again.chain().is_empty());
    }

    #[test]
    fn test_missing_file_is_io() {
        let result = read_split_files(
            Path::new("does-not-exist.cer"),
            Path::new("does-not-exist.key"),
        );
        assert!(matches!(result, Err(ConvertError::Io { .. })));
    }

    #[test]
    fn test_strip_suffix_ignore_case() {
        assert_eq!(strip_suffix_ignore_case("a.KEY", ".key"), Some("a"));
        assert_eq!(strip_suffix_ignore_case("key", ".key"), None);
        assert_eq!(strip_suffix_ignore_case("a.pfx", ".key"), None);
    }
}

//! PKCS#12 (.pfx) container reading and writing
//!
//! Reading walks every safe bag in stored order and distinguishes
//! malformed or unsupported containers from password failures so the
//! caller only re-prompts when a password can help. Writing always produces a password-protected
//! container; an absent password means empty-string protection.

use crate::cert_ops::bundle::Bundle;
use crate::cert_ops::certificate::Certificate;
use crate::cert_ops::key::PrivateKey;
use crate::cert_ops::safe_bags::{self, BagError, SafeBags};
use crate::utils::{ConvertError, Result};
use p12_keystore::{KeyStore, KeyStoreEntry, PrivateKeyChain};
use sha2::{Digest, Sha256};

/// Read a bundle from PKCS#12 bytes.
///
/// With no password the empty password is tried; if that fails the result
/// is [`ConvertError::PasswordRequired`]. A supplied password that fails
/// yields [`ConvertError::IncorrectPassword`]. A container that cannot be
/// decoded, or that uses a MAC or cipher this tool does not implement, is a
/// [`ConvertError::Parse`] whatever the password. Each call is independent.
pub fn read_pfx(data: &[u8], password: Option<&str>) -> Result<Bundle> {
    let bags = safe_bags::decode(data, password.unwrap_or("")).map_err(|e| match e {
        BagError::BadPassword if password.is_some() => {
            tracing::debug!("PKCS#12 open failed with supplied password");
            ConvertError::IncorrectPassword
        }
        BagError::BadPassword => {
            tracing::debug!("PKCS#12 open failed with empty password");
            ConvertError::PasswordRequired
        }
        other => ConvertError::parse(format!("Failed to read PKCS#12 container: {}", other)),
    })?;

    bundle_from_bags(bags)
}

/// Pick the key and assemble the bundle.
///
/// The first key bag in stored order wins. The leaf is the certificate
/// sharing its localKeyId, or failing that any certificate whose public key
/// matches. Every other certificate bag becomes the chain in stored order.
/// The friendly name comes from the key bag only.
fn bundle_from_bags(bags: SafeBags) -> Result<Bundle> {
    let SafeBags { keys, certs } = bags;

    if keys.len() > 1 {
        tracing::warn!(
            "PKCS#12 container holds {} private keys, using the first one stored",
            keys.len()
        );
    }

    let stored_key = keys.into_iter().next().ok_or(ConvertError::NoPrivateKey)?;
    let private_key = PrivateKey::from_pkcs8_der(&stored_key.pkcs8_der)?;

    let mut certificates = certs
        .iter()
        .map(|c| Certificate::from_der(&c.der))
        .collect::<Result<Vec<_>>>()?;

    let by_key_id = stored_key.local_key_id.as_ref().and_then(|id| {
        certs
            .iter()
            .zip(&certificates)
            .position(|(stored, cert)| {
                stored.local_key_id.as_ref() == Some(id) && private_key.matches(cert)
            })
    });
    let leaf_index = by_key_id
        .or_else(|| certificates.iter().position(|c| private_key.matches(c)))
        .ok_or(ConvertError::KeyMismatch)?;
    let certificate = certificates.remove(leaf_index);

    let mut chain: Vec<Certificate> = Vec::new();
    for cert in certificates {
        if cert.der() == certificate.der() || chain.iter().any(|c| c.der() == cert.der()) {
            continue;
        }
        chain.push(cert);
    }

    tracing::debug!(
        "PKCS#12 key bag '{}': {} with {} chain certificate(s)",
        stored_key.friendly_name.as_deref().unwrap_or(""),
        certificate.subject(),
        chain.len()
    );

    Bundle::new(certificate, chain, private_key, stored_key.friendly_name)
}

/// Encode a bundle as a PKCS#12 container.
///
/// The leaf certificate always goes in; the chain only when `include_chain`
/// is set. The key bag always carries a friendlyName attribute: the bundle's
/// friendly name, or an empty string when it has none, which [`read_pfx`]
/// reads back as no name. Certificate bags are named after their subject.
pub fn write_pfx(bundle: &Bundle, include_chain: bool, password: Option<&str>) -> Result<Vec<u8>> {
    let pwd = password.unwrap_or("");

    let mut ders: Vec<&[u8]> = vec![bundle.certificate().der()];
    if include_chain {
        ders.extend(bundle.chain().iter().map(|c| c.der()));
    }

    let certs: std::result::Result<Vec<p12_keystore::Certificate>, _> = ders
        .into_iter()
        .map(p12_keystore::Certificate::from_der)
        .collect();

    let certs = certs.map_err(|e| {
        ConvertError::encode(format!("certificate for PKCS#12: {}", e))
    })?;

    let local_key_id = {
        let mut hasher = Sha256::new();
        hasher.update(bundle.certificate().der());
        hasher.finalize().to_vec()
    };

    let chain = PrivateKeyChain::new(
        bundle.private_key().pkcs8_der().to_vec(),
        &local_key_id,
        certs,
    );

    let mut keystore = KeyStore::new();
    keystore.add_entry(
        bundle.friendly_name().unwrap_or(""),
        KeyStoreEntry::PrivateKeyChain(chain),
    );

    keystore
        .writer(pwd)
        .write()
        .map_err(|e| ConvertError::encode(format!("PKCS#12 container: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE_PFX: &[u8] = include_bytes!("../../tests/fixtures/site.pfx");
    const SITE_CER: &[u8] = include_bytes!("../../tests/fixtures/site.cer");
    const SITE_KEY: &[u8] = include_bytes!("../../tests/fixtures/site.key");
    const CHAINED_PFX: &[u8] = include_bytes!("../../tests/fixtures/chained.pfx");
    const CA_CER: &[u8] = include_bytes!("../../tests/fixtures/ca.cer");
    const CERT_ONLY_PFX: &[u8] = include_bytes!("../../tests/fixtures/certonly.pfx");
    const SHA512_MAC_PFX: &[u8] = include_bytes!("../../tests/fixtures/sha512mac.pfx");
    const MD5_MAC_PFX: &[u8] = include_bytes!("../../tests/fixtures/md5mac.pfx");
    const LEGACY_3DES_PFX: &[u8] = include_bytes!("../../tests/fixtures/legacy-3des.pfx");
    const NO_MAC_PFX: &[u8] = include_bytes!("../../tests/fixtures/nomac.pfx");
    const NO_NAME_PFX: &[u8] = include_bytes!("../../tests/fixtures/noname.pfx");
    const EXTRA_CERTS_PFX: &[u8] = include_bytes!("../../tests/fixtures/extra-certs.pfx");
    const EC_CER: &[u8] = include_bytes!("../../tests/fixtures/ec.cer");
    const EC_KEY: &[u8] = include_bytes!("../../tests/fixtures/ec.key");

    fn site_bundle(name: Option<&str>) -> Bundle {
        Bundle::new(
            Certificate::from_der(SITE_CER).unwrap(),
            Vec::new(),
            PrivateKey::from_pem_or_der(SITE_KEY).unwrap(),
            name.map(str::to_string),
        )
        .unwrap()
    }

    #[test]
    fn test_read_requires_password() {
        assert!(matches!(
            read_pfx(SITE_PFX, None),
            Err(ConvertError::PasswordRequired)
        ));
    }

    #[test]
    fn test_read_wrong_password() {
        assert!(matches!(
            read_pfx(SITE_PFX, Some("hunter3")),
            Err(ConvertError::IncorrectPassword)
        ));
    }

    #[test]
    fn test_read_correct_password() {
        let bundle = read_pfx(SITE_PFX, Some("hunter2")).unwrap();
        assert_eq!(bundle.certificate().der(), SITE_CER);
        assert!(bundle.chain().is_empty());
        assert_eq!(bundle.friendly_name(), Some("site"));

        let again = read_pfx(SITE_PFX, Some("hunter2")).unwrap();
        assert_eq!(bundle, again);
    }

    #[test]
    fn test_read_chain() {
        let bundle = read_pfx(CHAINED_PFX, Some("chainpass")).unwrap();
        assert!(bundle.certificate().subject().contains("leaf.example.com"));
        assert_eq!(bundle.chain().len(), 1);
        assert_eq!(bundle.chain()[0].der(), CA_CER);
        assert_eq!(bundle.friendly_name(), Some("leaf"));
    }

    #[test]
    fn test_read_without_key() {
        assert!(matches!(
            read_pfx(CERT_ONLY_PFX, Some("hunter2")),
            Err(ConvertError::NoPrivateKey)
        ));
    }

    #[test]
    fn test_malformed_is_parse_error() {
        assert!(matches!(
            read_pfx(b"definitely not a pfx", None),
            Err(ConvertError::Parse { .. })
        ));
        // A bare certificate is well-formed DER but not a PFX
        assert!(matches!(
            read_pfx(SITE_CER, Some("hunter2")),
            Err(ConvertError::Parse { .. })
        ));
    }

    #[test]
    fn test_truncated_is_parse_error() {
        assert!(matches!(
            read_pfx(&SITE_PFX[..SITE_PFX.len() / 2], Some("hunter2")),
            Err(ConvertError::Parse { .. })
        ));
    }

    #[test]
    fn test_write_then_read() {
        let bundle = site_bundle(Some("My Site"));
        let pfx = write_pfx(&bundle, true, Some("new-pass")).unwrap();

        let read = read_pfx(&pfx, Some("new-pass")).unwrap();
        assert_eq!(read, bundle);
        assert!(matches!(
            read_pfx(&pfx, Some("old-pass")),
            Err(ConvertError::IncorrectPassword)
        ));
        assert!(matches!(
            read_pfx(&pfx, None),
            Err(ConvertError::PasswordRequired)
        ));
    }

    #[test]
    fn test_write_without_password_or_name() {
        let bundle = site_bundle(None);
        let pfx = write_pfx(&bundle, true, None).unwrap();

        let read = read_pfx(&pfx, None).unwrap();
        assert_eq!(read.friendly_name(), None);
        assert_eq!(read.certificate(), bundle.certificate());
        assert_eq!(read.private_key(), bundle.private_key());
    }

    #[test]
    fn test_write_chain_flag() {
        let source = read_pfx(CHAINED_PFX, Some("chainpass")).unwrap();

        let with_chain = write_pfx(&source, true, Some("x")).unwrap();
        assert_eq!(read_pfx(&with_chain, Some("x")).unwrap().chain().len(), 1);

        let without_chain = write_pfx(&source, false, Some("x")).unwrap();
        assert!(read_pfx(&without_chain, Some("x")).unwrap().chain().is_empty());
    }

    #[test]
    fn test_sha512_mac() {
        let bundle = read_pfx(SHA512_MAC_PFX, Some("hunter2")).unwrap();
        assert_eq!(bundle.certificate().der(), SITE_CER);
        assert_eq!(bundle.friendly_name(), Some("site"));
        assert!(matches!(
            read_pfx(SHA512_MAC_PFX, Some("hunter3")),
            Err(ConvertError::IncorrectPassword)
        ));
        assert!(matches!(
            read_pfx(SHA512_MAC_PFX, None),
            Err(ConvertError::PasswordRequired)
        ));
    }

    #[test]
    fn test_unsupported_mac_is_parse_error() {
        for password in [None, Some("hunter2"), Some("hunter3")] {
            assert!(matches!(
                read_pfx(MD5_MAC_PFX, password),
                Err(ConvertError::Parse { .. })
            ));
        }
    }

    #[test]
    fn test_legacy_3des_container() {
        let bundle = read_pfx(LEGACY_3DES_PFX, Some("hunter2")).unwrap();
        assert_eq!(bundle.certificate().der(), SITE_CER);
        assert!(matches!(
            read_pfx(LEGACY_3DES_PFX, Some("hunter3")),
            Err(ConvertError::IncorrectPassword)
        ));
    }

    #[test]
    fn test_container_without_mac() {
        assert!(matches!(
            read_pfx(NO_MAC_PFX, None),
            Err(ConvertError::PasswordRequired)
        ));
        assert!(matches!(
            read_pfx(NO_MAC_PFX, Some("hunter3")),
            Err(ConvertError::IncorrectPassword)
        ));
        let bundle = read_pfx(NO_MAC_PFX, Some("hunter2")).unwrap();
        assert_eq!(bundle.certificate().der(), SITE_CER);
    }

    #[test]
    fn test_missing_friendly_name_stays_absent() {
        let bundle = read_pfx(NO_NAME_PFX, Some("hunter2")).unwrap();
        assert_eq!(bundle.friendly_name(), None);

        let copy = write_pfx(&bundle, true, Some("hunter2")).unwrap();
        assert_eq!(read_pfx(&copy, Some("hunter2")).unwrap().friendly_name(), None);
    }

    #[test]
    fn test_extra_certificates_kept_in_stored_order() {
        let bundle = read_pfx(EXTRA_CERTS_PFX, Some("hunter2")).unwrap();
        assert_eq!(bundle.certificate().der(), SITE_CER);
        let chain: Vec<&[u8]> = bundle.chain().iter().map(|c| c.der()).collect();
        assert_eq!(chain, vec![EC_CER, CA_CER]);
    }

    #[test]
    fn test_first_stored_key_wins() {
        let entry = |cer: &[u8], key: &[u8]| {
            let key = PrivateKey::from_pem_or_der(key).unwrap();
            let cert = p12_keystore::Certificate::from_der(cer).unwrap();
            KeyStoreEntry::PrivateKeyChain(PrivateKeyChain::new(
                key.pkcs8_der().to_vec(),
                cer.len().to_be_bytes(),
                vec![cert],
            ))
        };

        let mut keystore = KeyStore::new();
        keystore.add_entry("b", entry(SITE_CER, SITE_KEY));
        keystore.add_entry("a", entry(EC_CER, EC_KEY));
        let pfx = keystore.writer("two-keys").write().unwrap();

        let bundle = read_pfx(&pfx, Some("two-keys")).unwrap();
        assert_eq!(bundle.friendly_name(), Some("a"));
        assert_eq!(bundle.certificate().der(), EC_CER);
        assert!(bundle.chain().iter().all(|c| c.der() != EC_CER));
    }
}

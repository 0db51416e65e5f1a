//! PKCS#12 safe bag decoding
//!
//! Opens a PFX with a password and returns every key and certificate bag in
//! the order the container stores them, with their friendlyName and
//! localKeyId attributes. When the container carries a MAC only the MAC
//! decides whether the password is right; without one a failed decryption
//! does.

use cbc::cipher::{
    block_padding::Pkcs7, BlockCipher, BlockDecrypt, BlockDecryptMut, BlockEncrypt, KeyInit,
    KeyIvInit,
};
use cms::cert::x509::spki::AlgorithmIdentifierOwned;
use cms::content_info::ContentInfo;
use cms::encrypted_data::EncryptedData;
use der::asn1::{BmpString, ContextSpecific, ObjectIdentifier, OctetString};
use der::{Any, Decode, Encode};
use hmac::{digest::Digest, Mac};
use pkcs12::cert_type::CertBag;
use pkcs12::kdf::{self, Pkcs12KeyType};
use pkcs12::mac_data::MacData;
use pkcs12::pbe_params::{EncryptedPrivateKeyInfo, Pkcs12PbeParams};
use pkcs12::pfx::Pfx;
use pkcs12::safe_bag::{SafeBag, SafeContents};
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use thiserror::Error;

const CONTENT_DATA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.1");
const CONTENT_ENCRYPTED_DATA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.6");

const KEY_BAG: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.12.10.1.1");
const SHROUDED_KEY_BAG: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.12.10.1.2");
const CERT_BAG: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.12.10.1.3");
const X509_CERTIFICATE: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.22.1");

const FRIENDLY_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.20");
const LOCAL_KEY_ID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.21");

const PBES2: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.5.13");
const PBE_SHA1_RC2_128: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.12.1.5");
const PBE_SHA1_RC2_40: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.12.1.6");
const PBE_SHA1_3DES: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.12.1.3");

const SHA1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.14.3.2.26");
const SHA224: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.4");
const SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.1");
const SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.2");
const SHA512: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.3");

/// Why a container could not be opened
#[derive(Debug, Error)]
pub(crate) enum BagError {
    #[error("the password does not open the container")]
    BadPassword,

    #[error("{0}")]
    Malformed(String),

    #[error("unsupported {0}")]
    Unsupported(String),
}

impl From<der::Error> for BagError {
    fn from(e: der::Error) -> Self {
        BagError::Malformed(e.to_string())
    }
}

/// A decrypted private key bag
pub(crate) struct StoredKey {
    pub friendly_name: Option<String>,
    pub local_key_id: Option<Vec<u8>>,
    /// Unencrypted PKCS#8 DER
    pub pkcs8_der: Vec<u8>,
}

/// An X.509 certificate bag
pub(crate) struct StoredCert {
    pub friendly_name: Option<String>,
    pub local_key_id: Option<Vec<u8>>,
    pub der: Vec<u8>,
}

/// Every key and certificate bag, in stored order
#[derive(Default)]
pub(crate) struct SafeBags {
    pub keys: Vec<StoredKey>,
    pub certs: Vec<StoredCert>,
}

/// Decode a DER PFX and all of its bags using `password`
pub(crate) fn decode(data: &[u8], password: &str) -> Result<SafeBags, BagError> {
    let pfx = Pfx::from_der(data).map_err(|e| {
        BagError::Malformed(format!("not a DER-encoded PKCS#12 container: {}", e))
    })?;

    if pfx.auth_safe.content_type != CONTENT_DATA {
        return Err(BagError::Unsupported(format!(
            "authSafe content type {}",
            pfx.auth_safe.content_type
        )));
    }

    let verified = match &pfx.mac_data {
        Some(mac_data) => {
            verify_mac(mac_data, password, pfx.auth_safe.content.value())?;
            true
        }
        None => {
            tracing::debug!("PKCS#12 container has no MAC");
            false
        }
    };

    let auth_safe = OctetString::from_der(&pfx.auth_safe.content.to_der()?)?;
    let safes = Vec::<ContentInfo>::from_der(auth_safe.as_bytes())?;

    let reader = BagReader { password, verified };
    let mut bags = SafeBags::default();
    for safe in &safes {
        reader.read_safe(safe, &mut bags)?;
    }

    tracing::debug!(
        "PKCS#12 container: {} key bag(s), {} certificate bag(s)",
        bags.keys.len(),
        bags.certs.len()
    );
    Ok(bags)
}

macro_rules! mac_matches {
    ($digest:ty, $pass:expr, $mac_data:expr, $content:expr) => {{
        let key = kdf::derive_key::<$digest>(
            $pass,
            $mac_data.mac_salt.as_bytes(),
            Pkcs12KeyType::Mac,
            $mac_data.iterations,
            <$digest as Digest>::output_size(),
        );
        let mut mac = <hmac::Hmac<$digest> as Mac>::new_from_slice(&key)
            .map_err(|_| BagError::Malformed("invalid MAC key length".to_string()))?;
        mac.update($content);
        mac.verify_slice($mac_data.mac.digest.as_bytes()).is_ok()
    }};
}

fn verify_mac(mac_data: &MacData, password: &str, content: &[u8]) -> Result<(), BagError> {
    let mut candidates = vec![bmp_password(password)?];
    // Some writers encode the empty password without its terminator
    if password.is_empty() {
        candidates.push(Vec::new());
    }

    for pass in &candidates {
        let matched = match mac_data.mac.algorithm.oid {
            SHA1 => mac_matches!(Sha1, pass, mac_data, content),
            SHA224 => mac_matches!(Sha224, pass, mac_data, content),
            SHA256 => mac_matches!(Sha256, pass, mac_data, content),
            SHA384 => mac_matches!(Sha384, pass, mac_data, content),
            SHA512 => mac_matches!(Sha512, pass, mac_data, content),
            other => return Err(BagError::Unsupported(format!("MAC algorithm {}", other))),
        };
        if matched {
            return Ok(());
        }
    }

    Err(BagError::BadPassword)
}

/// BMPString bytes plus the two-byte terminator
fn bmp_password(password: &str) -> Result<Vec<u8>, BagError> {
    let mut bytes = Vec::from(BmpString::from_utf8(password)?.into_bytes());
    bytes.extend([0u8; 2]);
    Ok(bytes)
}

struct BagReader<'a> {
    password: &'a str,
    /// The MAC already proved the password
    verified: bool,
}

impl BagReader<'_> {
    fn read_safe(&self, safe: &ContentInfo, bags: &mut SafeBags) -> Result<(), BagError> {
        let (contents, decrypted) = match safe.content_type {
            CONTENT_DATA => (
                OctetString::from_der(&safe.content.to_der()?)?.into_bytes(),
                false,
            ),
            CONTENT_ENCRYPTED_DATA => {
                let encrypted = EncryptedData::from_der(&safe.content.to_der()?)?;
                let info = &encrypted.enc_content_info;
                match info.encrypted_content.as_ref() {
                    Some(ciphertext) => {
                        (self.decrypt(&info.content_enc_alg, ciphertext.as_bytes())?, true)
                    }
                    None => return Ok(()),
                }
            }
            other => {
                return Err(BagError::Unsupported(format!(
                    "safe content type {}",
                    other
                )))
            }
        };

        let safe_bags = SafeContents::from_der(&contents).map_err(|e| {
            if decrypted && !self.verified {
                BagError::BadPassword
            } else {
                e.into()
            }
        })?;

        for bag in safe_bags {
            self.read_bag(bag, bags)?;
        }
        Ok(())
    }

    fn read_bag(&self, bag: SafeBag, bags: &mut SafeBags) -> Result<(), BagError> {
        let friendly_name = bag_attribute(&bag, FRIENDLY_NAME)
            .and_then(|value| BmpString::from_der(&value).ok())
            .map(|name| name.to_string());
        let local_key_id = bag_attribute(&bag, LOCAL_KEY_ID)
            .and_then(|value| OctetString::from_der(&value).ok())
            .map(OctetString::into_bytes);

        match bag.bag_id {
            CERT_BAG => {
                let cert_bag: ContextSpecific<CertBag> = ContextSpecific::from_der(&bag.bag_value)?;
                if cert_bag.value.cert_id != X509_CERTIFICATE {
                    tracing::debug!("Skipping certificate bag of type {}", cert_bag.value.cert_id);
                    return Ok(());
                }
                bags.certs.push(StoredCert {
                    friendly_name,
                    local_key_id,
                    der: cert_bag.value.cert_value.into_bytes(),
                });
            }
            SHROUDED_KEY_BAG => {
                let info: ContextSpecific<EncryptedPrivateKeyInfo> =
                    ContextSpecific::from_der(&bag.bag_value)?;
                let pkcs8_der = self.decrypt(
                    &info.value.encryption_algorithm,
                    info.value.encrypted_data.as_bytes(),
                )?;

                if pkcs8::PrivateKeyInfo::try_from(pkcs8_der.as_slice()).is_err() {
                    return Err(if self.verified {
                        BagError::Malformed("decrypted key bag is not PKCS#8".to_string())
                    } else {
                        BagError::BadPassword
                    });
                }

                bags.keys.push(StoredKey {
                    friendly_name,
                    local_key_id,
                    pkcs8_der,
                });
            }
            KEY_BAG => {
                let key: ContextSpecific<Any> = ContextSpecific::from_der(&bag.bag_value)?;
                bags.keys.push(StoredKey {
                    friendly_name,
                    local_key_id,
                    pkcs8_der: key.value.to_der()?,
                });
            }
            other => tracing::debug!("Skipping safe bag of type {}", other),
        }
        Ok(())
    }

    fn decrypt(&self, alg: &AlgorithmIdentifierOwned, ciphertext: &[u8]) -> Result<Vec<u8>, BagError> {
        let params = alg
            .parameters
            .as_ref()
            .ok_or_else(|| BagError::Malformed(format!("no parameters for {}", alg.oid)))?
            .to_der()?;

        let result = match alg.oid {
            PBES2 => {
                let scheme = pkcs5::pbes2::Parameters::from_der(&params)?;
                scheme
                    .decrypt(self.password.as_bytes(), ciphertext)
                    .map_err(|e| match e {
                        pkcs5::Error::DecryptFailed => BagError::BadPassword,
                        other => BagError::Unsupported(format!("PBES2 scheme: {}", other)),
                    })
            }
            PBE_SHA1_3DES => pbes1_decrypt::<des::TdesEde3>(&params, ciphertext, self.password, 24),
            PBE_SHA1_RC2_128 => pbes1_decrypt::<rc2::Rc2>(&params, ciphertext, self.password, 16),
            PBE_SHA1_RC2_40 => pbes1_decrypt::<rc2::Rc2>(&params, ciphertext, self.password, 5),
            other => Err(BagError::Unsupported(format!("encryption scheme {}", other))),
        };

        result.map_err(|e| match e {
            BagError::BadPassword if self.verified => {
                BagError::Malformed("decryption failed although the MAC matched".to_string())
            }
            other => other,
        })
    }
}

/// PKCS#12 PBE (RFC 7292 appendix C) decryption in CBC mode
fn pbes1_decrypt<C>(
    params: &[u8],
    ciphertext: &[u8],
    password: &str,
    key_len: usize,
) -> Result<Vec<u8>, BagError>
where
    C: KeyInit + BlockCipher + BlockEncrypt + BlockDecrypt,
{
    let params = Pkcs12PbeParams::from_der(params)?;
    let salt = params.salt.as_bytes();

    let key = kdf::derive_key_utf8::<Sha1>(
        password,
        salt,
        Pkcs12KeyType::EncryptionKey,
        params.iterations,
        key_len,
    )?;
    let iv = kdf::derive_key_utf8::<Sha1>(password, salt, Pkcs12KeyType::Iv, params.iterations, 8)?;

    cbc::Decryptor::<C>::new_from_slices(&key, &iv)
        .map_err(|_| BagError::Malformed("invalid cipher key length".to_string()))?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| BagError::BadPassword)
}

fn bag_attribute(bag: &SafeBag, oid: ObjectIdentifier) -> Option<Vec<u8>> {
    bag.bag_attributes
        .as_ref()?
        .iter()
        .find(|attr| attr.oid == oid)
        .and_then(|attr| attr.values.iter().next())
        .and_then(|value| value.to_der().ok())
}

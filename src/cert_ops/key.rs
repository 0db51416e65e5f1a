//! Private key parsing, normalisation and certificate/key pair matching
//!
//! Supports RSA, EC P-256, and EC P-384 keys in PKCS#8, PKCS#1, and SEC1
//! formats. Every key is normalised to unencrypted PKCS#8 on the way in and
//! written back out in its native encoding (PKCS#1 for RSA, SEC1 for EC).

use crate::cert_ops::certificate::{is_pem, Certificate};
use crate::utils::{ConvertError, Result};
use std::fmt;

/// Algorithm of a parsed private key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Rsa,
    EcP256,
    EcP384,
}

impl KeyAlgorithm {
    /// PEM label used for the algorithm's native private key encoding
    pub fn pem_tag(&self) -> &'static str {
        match self {
            KeyAlgorithm::Rsa => "RSA PRIVATE KEY",
            KeyAlgorithm::EcP256 | KeyAlgorithm::EcP384 => "EC PRIVATE KEY",
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAlgorithm::Rsa => write!(f, "RSA"),
            KeyAlgorithm::EcP256 => write!(f, "EC P-256"),
            KeyAlgorithm::EcP384 => write!(f, "EC P-384"),
        }
    }
}

#[derive(Clone)]
enum KeyMaterial {
    Rsa(rsa::RsaPrivateKey),
    P256(p256::SecretKey),
    P384(p384::SecretKey),
}

/// A private key with its PKCS#8 encoding and derived SubjectPublicKeyInfo
#[derive(Clone)]
pub struct PrivateKey {
    material: KeyMaterial,
    pkcs8_der: Vec<u8>,
    public_key_spki: Vec<u8>,
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm())
            .finish_non_exhaustive()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.pkcs8_der == other.pkcs8_der
    }
}

impl Eq for PrivateKey {}

impl PrivateKey {
    /// Parse a private key file (PEM or DER)
    pub fn from_pem_or_der(data: &[u8]) -> Result<Self> {
        if is_pem(data) {
            return Self::from_pem(data);
        }
        Self::from_der(data)
    }

    /// Parse a PEM-encoded private key, using the first recognised block
    fn from_pem(data: &[u8]) -> Result<Self> {
        let pems = ::pem::parse_many(data)
            .map_err(|e| ConvertError::parse(format!("Failed to parse key PEM: {}", e)))?;

        for p in &pems {
            match p.tag() {
                "PRIVATE KEY" => return Self::from_pkcs8_der(p.contents()),
                "RSA PRIVATE KEY" => return Self::from_pkcs1_der(p.contents()),
                "EC PRIVATE KEY" => return Self::from_sec1_der(p.contents()),
                "ENCRYPTED PRIVATE KEY" => {
                    return Err(ConvertError::parse(
                        "Encrypted private key files are not supported",
                    ))
                }
                _ => continue,
            }
        }

        Err(ConvertError::parse(
            "No recognized private key block found in key file",
        ))
    }

    /// Parse a DER-encoded private key (try PKCS#8 first, then PKCS#1, then SEC1)
    fn from_der(data: &[u8]) -> Result<Self> {
        Self::from_pkcs8_der(data)
            .or_else(|_| Self::from_pkcs1_der(data))
            .or_else(|_| Self::from_sec1_der(data))
            .map_err(|_| ConvertError::parse("Could not parse DER private key"))
    }

    /// Parse an unencrypted PKCS#8 private key
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        use pkcs8::DecodePrivateKey;

        if let Ok(rsa_key) = rsa::RsaPrivateKey::from_pkcs8_der(der) {
            return Self::from_material(KeyMaterial::Rsa(rsa_key));
        }

        if let Ok(ec_key) = p256::SecretKey::from_pkcs8_der(der) {
            return Self::from_material(KeyMaterial::P256(ec_key));
        }

        if let Ok(ec_key) = p384::SecretKey::from_pkcs8_der(der) {
            return Self::from_material(KeyMaterial::P384(ec_key));
        }

        Err(ConvertError::parse(
            "Unsupported key type in PKCS#8 container",
        ))
    }

    /// Parse a PKCS#1 RSA private key
    fn from_pkcs1_der(der: &[u8]) -> Result<Self> {
        use rsa::pkcs1::DecodeRsaPrivateKey;

        let rsa_key = rsa::RsaPrivateKey::from_pkcs1_der(der)
            .map_err(|e| ConvertError::parse(format!("Failed to parse PKCS#1 RSA key: {}", e)))?;

        Self::from_material(KeyMaterial::Rsa(rsa_key))
    }

    /// Parse a SEC1 EC private key
    fn from_sec1_der(der: &[u8]) -> Result<Self> {
        if let Ok(ec_key) = p256::SecretKey::from_sec1_der(der) {
            return Self::from_material(KeyMaterial::P256(ec_key));
        }

        if let Ok(ec_key) = p384::SecretKey::from_sec1_der(der) {
            return Self::from_material(KeyMaterial::P384(ec_key));
        }

        Err(ConvertError::parse(
            "Unsupported EC curve (only P-256 and P-384 are supported)",
        ))
    }

    fn from_material(material: KeyMaterial) -> Result<Self> {
        use pkcs8::{EncodePrivateKey, EncodePublicKey};

        let (pkcs8_der, spki) = match &material {
            KeyMaterial::Rsa(key) => {
                let public_key = rsa::RsaPublicKey::from(key);
                (
                    key.to_pkcs8_der().map_err(|e| {
                        ConvertError::encode(format!("RSA key as PKCS#8: {}", e))
                    })?,
                    public_key.to_public_key_der().map_err(|e| {
                        ConvertError::encode(format!("RSA public key: {}", e))
                    })?,
                )
            }
            KeyMaterial::P256(key) => (
                key.to_pkcs8_der().map_err(|e| {
                    ConvertError::encode(format!("EC P-256 key as PKCS#8: {}", e))
                })?,
                key.public_key().to_public_key_der().map_err(|e| {
                    ConvertError::encode(format!("EC P-256 public key: {}", e))
                })?,
            ),
            KeyMaterial::P384(key) => (
                key.to_pkcs8_der().map_err(|e| {
                    ConvertError::encode(format!("EC P-384 key as PKCS#8: {}", e))
                })?,
                key.public_key().to_public_key_der().map_err(|e| {
                    ConvertError::encode(format!("EC P-384 public key: {}", e))
                })?,
            ),
        };

        Ok(Self {
            material,
            pkcs8_der: pkcs8_der.as_bytes().to_vec(),
            public_key_spki: spki.as_ref().to_vec(),
        })
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        match self.material {
            KeyMaterial::Rsa(_) => KeyAlgorithm::Rsa,
            KeyMaterial::P256(_) => KeyAlgorithm::EcP256,
            KeyMaterial::P384(_) => KeyAlgorithm::EcP384,
        }
    }

    /// Unencrypted PKCS#8 DER encoding
    pub fn pkcs8_der(&self) -> &[u8] {
        &self.pkcs8_der
    }

    /// The SubjectPublicKeyInfo bytes derived from the private key
    pub fn public_key_spki(&self) -> &[u8] {
        &self.public_key_spki
    }

    /// Check if this key matches a certificate by comparing SubjectPublicKeyInfo
    pub fn matches(&self, certificate: &Certificate) -> bool {
        certificate.public_key_spki() == self.public_key_spki.as_slice()
    }

    /// DER in the algorithm's native encoding (PKCS#1 or SEC1)
    pub fn to_native_der(&self) -> Result<Vec<u8>> {
        match &self.material {
            KeyMaterial::Rsa(key) => {
                use rsa::pkcs1::EncodeRsaPrivateKey;
                key.to_pkcs1_der()
                    .map(|doc| doc.as_bytes().to_vec())
                    .map_err(|e| ConvertError::encode(format!("RSA key as PKCS#1: {}", e)))
            }
            KeyMaterial::P256(key) => key
                .to_sec1_der()
                .map(|der| der.to_vec())
                .map_err(|e| ConvertError::encode(format!("EC P-256 key as SEC1: {}", e))),
            KeyMaterial::P384(key) => key
                .to_sec1_der()
                .map(|der| der.to_vec())
                .map_err(|e| ConvertError::encode(format!("EC P-384 key as SEC1: {}", e))),
        }
    }

    /// PEM text in the algorithm's native encoding
    pub fn to_pem(&self) -> Result<String> {
        let block = ::pem::Pem::new(self.algorithm().pem_tag(), self.to_native_der()?);
        let config = ::pem::EncodeConfig::new().set_line_ending(::pem::LineEnding::LF);
        Ok(::pem::encode_config(&block, config))
    }
}

//! Verifying keys for the three supported families.

use ed25519_dalek::{Signature as Ed25519Signature, VerifyingKey as Ed25519VerifyingKey};
use error_stack::Report;
use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature as EcSignature, VerifyingKey as EcVerifyingKey};
use p256::pkcs8::der::Decode;
use p256::pkcs8::spki::SubjectPublicKeyInfoRef;
use p256::pkcs8::{DecodePublicKey, ObjectIdentifier};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs1v15::{Signature as RsaSignature, VerifyingKey as RsaVerifyingKey};
use rsa::sha2::Sha256;
use rsa::RsaPublicKey;

use crate::error::TokenError;
use crate::keys::normalize::KeyFamily;
use crate::keys::pem;
use crate::token::Algorithm;

const OID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const OID_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const OID_ED25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");

pub const LABEL_PUBLIC_KEY: &str = "PUBLIC KEY";
pub const LABEL_RSA_PUBLIC_KEY: &str = "RSA PUBLIC KEY";

#[derive(Debug, Clone, PartialEq)]
pub enum PublicKey {
    Ec(EcVerifyingKey),
    Rsa(RsaPublicKey),
    Ed25519(Ed25519VerifyingKey),
}

impl PublicKey {
    #[must_use]
    pub fn family(&self) -> KeyFamily {
        match self {
            Self::Ec(_) => KeyFamily::Ec,
            Self::Rsa(_) => KeyFamily::Rsa,
            Self::Ed25519(_) => KeyFamily::Ed25519,
        }
    }

    /// Parses a `PUBLIC KEY` (SPKI) or `RSA PUBLIC KEY` (PKCS#1) PEM.
    ///
    /// # Errors
    ///
    /// - [`TokenError::InvalidKeyFormat`] if there is no PEM envelope or the
    ///   body cannot be decoded
    /// - [`TokenError::UnsupportedKeyFamily`] for any other label or algorithm
    pub fn from_pem(text: &str) -> Result<Self, Report<TokenError>> {
        let blocks = pem::parse_blocks(text);
        let block = blocks
            .iter()
            .find(|b| b.label == LABEL_PUBLIC_KEY || b.label == LABEL_RSA_PUBLIC_KEY);

        match block {
            Some(block) if block.label == LABEL_RSA_PUBLIC_KEY => {
                let der = block.decode()?;
                RsaPublicKey::from_pkcs1_der(&der)
                    .map(Self::Rsa)
                    .map_err(|e| invalid_public_key(KeyFamily::Rsa, &e))
            }
            Some(block) => Self::from_spki_der(&block.decode()?),
            None => match blocks.first() {
                Some(other) => Err(Report::new(TokenError::UnsupportedKeyFamily {
                    found: format!("PEM label '{}'", other.label),
                })),
                None => Err(Report::new(TokenError::InvalidKeyFormat {
                    message: "No PEM envelope found in public key".into(),
                })),
            },
        }
    }

    /// Parses DER `SubjectPublicKeyInfo`, selecting the family from its OID.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidKeyFormat`] for malformed DER and
    /// [`TokenError::UnsupportedKeyFamily`] for unknown algorithms.
    pub fn from_spki_der(der: &[u8]) -> Result<Self, Report<TokenError>> {
        let info = SubjectPublicKeyInfoRef::from_der(der).map_err(|e| {
            Report::new(TokenError::InvalidKeyFormat {
                message: format!("Not a SubjectPublicKeyInfo: {e}"),
            })
        })?;
        let oid = info.algorithm.oid;

        if oid == OID_EC_PUBLIC_KEY {
            EcVerifyingKey::from_public_key_der(der)
                .map(Self::Ec)
                .map_err(|e| invalid_public_key(KeyFamily::Ec, &e))
        } else if oid == OID_RSA_ENCRYPTION {
            RsaPublicKey::from_public_key_der(der)
                .map(Self::Rsa)
                .map_err(|e| invalid_public_key(KeyFamily::Rsa, &e))
        } else if oid == OID_ED25519 {
            Ed25519VerifyingKey::from_public_key_der(der)
                .map(Self::Ed25519)
                .map_err(|e| invalid_public_key(KeyFamily::Ed25519, &e))
        } else {
            Err(Report::new(TokenError::UnsupportedKeyFamily {
                found: format!("algorithm {oid}"),
            }))
        }
    }

    /// Checks `signature` over `message` under `algorithm`.
    ///
    /// A key whose family does not match `algorithm` never verifies.
    #[must_use]
    pub fn verify(&self, algorithm: Algorithm, message: &[u8], signature: &[u8]) -> bool {
        match (self, algorithm) {
            (Self::Ec(key), Algorithm::Es256) => EcSignature::from_slice(signature)
                .is_ok_and(|sig| key.verify(message, &sig).is_ok()),
            (Self::Rsa(key), Algorithm::Rs256) => {
                let verifying_key = RsaVerifyingKey::<Sha256>::new(key.clone());
                RsaSignature::try_from(signature)
                    .is_ok_and(|sig| verifying_key.verify(message, &sig).is_ok())
            }
            (Self::Ed25519(key), Algorithm::EdDsa) => Ed25519Signature::from_slice(signature)
                .is_ok_and(|sig| key.verify(message, &sig).is_ok()),
            _ => false,
        }
    }
}

fn invalid_public_key(family: KeyFamily, e: &dyn core::fmt::Display) -> Report<TokenError> {
    Report::new(TokenError::InvalidKeyFormat {
        message: format!("{family} public key rejected: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::NormalizedKey;
    use crate::test_support::tests::{
        EC_PUBLIC_PEM, ED25519_PKCS8_PEM, ED25519_PUBLIC_PEM, RSA_PKCS1_PEM, RSA_PUBLIC_PEM,
    };

    #[test]
    fn test_from_pem_detects_family() {
        assert_eq!(
            PublicKey::from_pem(EC_PUBLIC_PEM).unwrap().family(),
            KeyFamily::Ec
        );
        assert_eq!(
            PublicKey::from_pem(RSA_PUBLIC_PEM).unwrap().family(),
            KeyFamily::Rsa
        );
        assert_eq!(
            PublicKey::from_pem(ED25519_PUBLIC_PEM).unwrap().family(),
            KeyFamily::Ed25519
        );
    }

    #[test]
    fn test_ed25519_published_key_matches_derived() {
        let derived = NormalizedKey::from_pem(ED25519_PKCS8_PEM)
            .unwrap()
            .public_key()
            .unwrap();

        assert_eq!(PublicKey::from_pem(ED25519_PUBLIC_PEM).unwrap(), derived);
    }

    #[test]
    fn test_rsa_pkcs1_public_key() {
        let derived = NormalizedKey::from_pem(RSA_PKCS1_PEM)
            .unwrap()
            .public_key()
            .unwrap();
        let PublicKey::Rsa(rsa_key) = &derived else {
            panic!("Expected RSA key");
        };

        let der = rsa::pkcs1::EncodeRsaPublicKey::to_pkcs1_der(rsa_key).unwrap();
        let pkcs1_pem = pem::encode(LABEL_RSA_PUBLIC_KEY, der.as_bytes());

        assert_eq!(PublicKey::from_pem(&pkcs1_pem).unwrap(), derived);
    }

    #[test]
    fn test_private_key_pem_is_rejected() {
        let err = PublicKey::from_pem(ED25519_PKCS8_PEM).unwrap_err();
        assert!(matches!(
            err.current_context(),
            TokenError::UnsupportedKeyFamily { .. }
        ));
    }

    #[test]
    fn test_no_envelope_is_invalid_format() {
        let err = PublicKey::from_pem("not a key").unwrap_err();
        assert!(matches!(
            err.current_context(),
            TokenError::InvalidKeyFormat { .. }
        ));
    }

    #[test]
    fn test_family_mismatch_never_verifies() {
        let key = PublicKey::from_pem(EC_PUBLIC_PEM).unwrap();
        assert!(!key.verify(Algorithm::Rs256, b"message", &[0u8; 256]));
        assert!(!key.verify(Algorithm::EdDsa, b"message", &[0u8; 64]));
    }

    #[test]
    fn test_wrong_length_signature_never_verifies() {
        let key = PublicKey::from_pem(ED25519_PUBLIC_PEM).unwrap();
        assert!(!key.verify(Algorithm::EdDsa, b"message", &[0u8; 10]));
    }
}

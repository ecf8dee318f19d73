//! Typed signing keys parsed from [`NormalizedKey`] DER.

use ed25519_dalek::SigningKey as Ed25519SigningKey;
use error_stack::Report;
use p256::ecdsa::{SigningKey as EcSigningKey, VerifyingKey as EcVerifyingKey};
use p256::pkcs8::DecodePrivateKey;
use rsa::pkcs1v15::SigningKey as RsaSigningKey;
use rsa::sha2::Sha256;
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::error::TokenError;
use crate::keys::normalize::{KeyFamily, NormalizedKey};
use crate::keys::public::PublicKey;

pub(crate) enum PrivateKey {
    Ec(EcSigningKey),
    Rsa {
        signing_key: RsaSigningKey<Sha256>,
        public_key: RsaPublicKey,
    },
    Ed25519(Ed25519SigningKey),
}

impl PrivateKey {
    pub(crate) fn from_normalized(key: &NormalizedKey) -> Result<Self, Report<TokenError>> {
        let der = key.der();
        let invalid = |e: &dyn core::fmt::Display| {
            Report::new(TokenError::InvalidKeyFormat {
                message: format!("{} key rejected: {}", key.family(), e),
            })
        };

        match key.family() {
            KeyFamily::Ec => EcSigningKey::from_pkcs8_der(der)
                .map(Self::Ec)
                .map_err(|e| invalid(&e)),
            KeyFamily::Rsa => {
                let private = RsaPrivateKey::from_pkcs8_der(der).map_err(|e| invalid(&e))?;
                let public_key = RsaPublicKey::from(&private);
                Ok(Self::Rsa {
                    signing_key: RsaSigningKey::<Sha256>::new(private),
                    public_key,
                })
            }
            KeyFamily::Ed25519 => Ed25519SigningKey::from_pkcs8_der(der)
                .map(Self::Ed25519)
                .map_err(|e| invalid(&e)),
        }
    }

    pub(crate) fn public_key(&self) -> PublicKey {
        match self {
            Self::Ec(signing_key) => PublicKey::Ec(EcVerifyingKey::from(signing_key)),
            Self::Rsa { public_key, .. } => PublicKey::Rsa(public_key.clone()),
            Self::Ed25519(signing_key) => PublicKey::Ed25519(signing_key.verifying_key()),
        }
    }
}

//! JSON Web Key conversions for publishing verifying keys.

use error_stack::Report;
use jose_jwk::{
    jose_jwa::{Algorithm as JwaAlgorithm, Signing},
    Ec, EcCurves, Jwk, JwkSet, Key, Okp, OkpCurves, Parameters, Rsa,
};
use p256::ecdsa::VerifyingKey as EcVerifyingKey;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPublicKey};

use crate::error::TokenError;
use crate::keys::PublicKey;
use crate::token::Algorithm;

impl PublicKey {
    /// Public JWK carrying `kid` and the family's `alg`.
    #[must_use]
    pub fn to_jwk(&self, kid: impl Into<String>) -> Jwk {
        let key = match self {
            Self::Ec(verifying_key) => {
                let point = verifying_key.to_encoded_point(false);
                Key::Ec(Ec {
                    crv: EcCurves::P256,
                    x: point.x().map(|x| x.to_vec()).unwrap_or_default().into(),
                    y: point.y().map(|y| y.to_vec()).unwrap_or_default().into(),
                    d: None,
                })
            }
            Self::Rsa(public_key) => Key::Rsa(Rsa {
                n: public_key.n().to_bytes_be().into(),
                e: public_key.e().to_bytes_be().into(),
                prv: None,
            }),
            Self::Ed25519(verifying_key) => Key::Okp(Okp {
                crv: OkpCurves::Ed25519,
                x: verifying_key.as_bytes().to_vec().into(),
                d: None,
            }),
        };

        Jwk {
            key,
            prm: Parameters {
                kid: Some(kid.into()),
                alg: Some(jwa_algorithm(self.family().algorithm())),
                ..Default::default()
            },
        }
    }
}

impl TryFrom<&Jwk> for PublicKey {
    type Error = Report<TokenError>;

    fn try_from(jwk: &Jwk) -> Result<Self, Self::Error> {
        match &jwk.key {
            Key::Ec(ec) if ec.crv == EcCurves::P256 => {
                let mut sec1 = Vec::with_capacity(1 + ec.x.len() + ec.y.len());
                sec1.push(0x04);
                sec1.extend_from_slice(&ec.x);
                sec1.extend_from_slice(&ec.y);
                EcVerifyingKey::from_sec1_bytes(&sec1)
                    .map(Self::Ec)
                    .map_err(|e| invalid_jwk("EC", &e))
            }
            Key::Rsa(rsa) => RsaPublicKey::new(
                BigUint::from_bytes_be(&rsa.n),
                BigUint::from_bytes_be(&rsa.e),
            )
            .map(Self::Rsa)
            .map_err(|e| invalid_jwk("RSA", &e)),
            Key::Okp(okp) if okp.crv == OkpCurves::Ed25519 => {
                let x: &[u8] = &okp.x;
                let bytes: [u8; 32] = x.try_into().map_err(|_| {
                    Report::new(TokenError::InvalidKeyFormat {
                        message: "Ed25519 JWK 'x' must be 32 bytes".into(),
                    })
                })?;
                ed25519_dalek::VerifyingKey::from_bytes(&bytes)
                    .map(Self::Ed25519)
                    .map_err(|e| invalid_jwk("Ed25519", &e))
            }
            Key::Ec(ec) => Err(Report::new(TokenError::UnsupportedKeyFamily {
                found: format!("JWK EC curve {:?}", ec.crv),
            })),
            Key::Okp(okp) => Err(Report::new(TokenError::UnsupportedKeyFamily {
                found: format!("JWK OKP curve {:?}", okp.crv),
            })),
            _ => Err(Report::new(TokenError::UnsupportedKeyFamily {
                found: "JWK key type".into(),
            })),
        }
    }
}

fn jwa_algorithm(algorithm: Algorithm) -> JwaAlgorithm {
    JwaAlgorithm::Signing(match algorithm {
        Algorithm::Es256 => Signing::Es256,
        Algorithm::Rs256 => Signing::Rs256,
        Algorithm::EdDsa => Signing::EdDsa,
    })
}

fn invalid_jwk(family: &str, e: &dyn core::fmt::Display) -> Report<TokenError> {
    Report::new(TokenError::InvalidKeyFormat {
        message: format!("{family} JWK rejected: {e}"),
    })
}

/// Serializes `keys` as a JWKS document, `{"keys":[...]}`.
///
/// # Errors
///
/// Returns [`TokenError::SigningError`] if serialization fails.
pub fn jwks_document(keys: &[Jwk]) -> Result<String, Report<TokenError>> {
    let set = JwkSet {
        keys: keys.to_vec(),
    };
    serde_json::to_string(&set).map_err(|e| {
        Report::new(TokenError::SigningError {
            message: format!("Failed to serialize JWKS: {e}"),
        })
    })
}

/// Parses a JWKS document and returns the key whose `kid` matches, or
/// `None` when no key carries it.
///
/// # Errors
///
/// - [`TokenError::InvalidKeyFormat`] if `document` is not a JWKS
/// - any error of converting the matching JWK
pub fn find_public_key(
    document: &str,
    kid: &str,
) -> Result<Option<PublicKey>, Report<TokenError>> {
    let set: JwkSet = serde_json::from_str(document).map_err(|e| {
        Report::new(TokenError::InvalidKeyFormat {
            message: format!("Not a JWKS document: {e}"),
        })
    })?;

    set.keys
        .iter()
        .find(|jwk| jwk.prm.kid.as_deref() == Some(kid))
        .map(PublicKey::try_from)
        .transpose()
}

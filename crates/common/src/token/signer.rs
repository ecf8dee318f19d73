//! Compact token signing.

use core::fmt;

use base64::{engine::general_purpose, Engine};
use error_stack::Report;
use p256::ecdsa::signature::Signer;
use rsa::signature::SignatureEncoding;
use serde::Serialize;

use crate::error::TokenError;
use crate::keys::private::PrivateKey;
use crate::keys::{NormalizedKey, PublicKey};
use crate::token::claims::{Claims, Header, SigningContext};

/// A signed compact token, `header.payload.signature`.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token")
            .field(&format_args!("<{} chars>", self.0.len()))
            .finish()
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Signs tokens with one key under one [`SigningContext`].
///
/// The typed key is parsed once in [`TokenSigner::new`]; a signer is
/// immutable afterwards and can be shared across threads.
pub struct TokenSigner {
    key: PrivateKey,
    public_key: PublicKey,
    context: SigningContext,
}

impl TokenSigner {
    /// # Errors
    ///
    /// - [`TokenError::KeyAlgorithmMismatch`] if the key family cannot
    ///   produce the context's algorithm
    /// - [`TokenError::InvalidKeyFormat`] if the key DER is rejected by the
    ///   signing primitive
    pub fn new(key: &NormalizedKey, context: SigningContext) -> Result<Self, Report<TokenError>> {
        let algorithm = context.algorithm();
        if key.family() != algorithm.family() {
            return Err(Report::new(TokenError::KeyAlgorithmMismatch {
                key_family: key.family().to_string(),
                algorithm: algorithm.to_string(),
            }));
        }

        let key = PrivateKey::from_normalized(key)?;
        let public_key = key.public_key();

        Ok(Self {
            key,
            public_key,
            context,
        })
    }

    #[must_use]
    pub fn context(&self) -> &SigningContext {
        &self.context
    }

    /// The verifying half of the signing key.
    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Issues a token whose `iat` is `issued_at` (unix seconds).
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::SigningError`] if serialization or the signing
    /// primitive fails, or the expiry overflows.
    pub fn sign(&self, issued_at: i64) -> Result<Token, Report<TokenError>> {
        let header = Header::for_context(&self.context);
        let claims = Claims::build(&self.context, issued_at)?;

        let mut token = format!("{}.{}", encode_segment(&header)?, encode_segment(&claims)?);
        let signature = self.signature(token.as_bytes())?;
        token.push('.');
        token.push_str(&general_purpose::URL_SAFE_NO_PAD.encode(signature));

        log::debug!(
            "Issued token kid={} alg={} iat={} exp={}",
            header.kid,
            header.alg,
            claims.iat,
            claims.exp
        );

        Ok(Token(token))
    }

    fn signature(&self, signing_input: &[u8]) -> Result<Vec<u8>, Report<TokenError>> {
        let failed = |e: &dyn fmt::Display| {
            Report::new(TokenError::SigningError {
                message: format!("{} signing failed: {e}", self.context.algorithm()),
            })
        };

        match &self.key {
            PrivateKey::Ec(signing_key) => {
                let signature: p256::ecdsa::Signature =
                    signing_key.try_sign(signing_input).map_err(|e| failed(&e))?;
                Ok(signature.to_bytes().to_vec())
            }
            PrivateKey::Rsa { signing_key, .. } => {
                let signature: rsa::pkcs1v15::Signature =
                    signing_key.try_sign(signing_input).map_err(|e| failed(&e))?;
                Ok(signature.to_vec())
            }
            PrivateKey::Ed25519(signing_key) => {
                let signature: ed25519_dalek::Signature =
                    signing_key.try_sign(signing_input).map_err(|e| failed(&e))?;
                Ok(signature.to_bytes().to_vec())
            }
        }
    }
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// One-shot signing: parses `key`, checks it against `context` and signs.
///
/// # Errors
///
/// See [`TokenSigner::new`] and [`TokenSigner::sign`].
pub fn sign(
    key: &NormalizedKey,
    context: &SigningContext,
    issued_at: i64,
) -> Result<Token, Report<TokenError>> {
    TokenSigner::new(key, context.clone())?.sign(issued_at)
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, Report<TokenError>> {
    let json = serde_json::to_vec(value).map_err(|e| {
        Report::new(TokenError::SigningError {
            message: format!("Failed to serialize token segment: {e}"),
        })
    })?;
    Ok(general_purpose::URL_SAFE_NO_PAD.encode(json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Algorithm;
    use crate::test_support::tests::{ED25519_PKCS8_PEM, EC_SEC1_PEM, RSA_PKCS1_PEM};

    fn context(algorithm: Algorithm) -> SigningContext {
        SigningContext::new(
            "db01bea4-d823-4643-ae9d-e3a5b9ad85e4",
            "https://example/",
            "cbe-1762998726956-hu7b87",
            algorithm,
            600,
        )
        .unwrap()
    }

    fn segments(token: &Token) -> Vec<Vec<u8>> {
        token
            .as_str()
            .split('.')
            .map(|s| general_purpose::URL_SAFE_NO_PAD.decode(s).unwrap())
            .collect()
    }

    #[test]
    fn test_es256_signature_is_raw_64_bytes() {
        let key = NormalizedKey::from_pem(EC_SEC1_PEM).unwrap();
        let token = sign(&key, &context(Algorithm::Es256), 1_763_672_624).unwrap();

        let parts = segments(&token);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].len(), 64, "ES256 must be r || s, never DER");
    }

    #[test]
    fn test_rs256_signature_is_modulus_sized() {
        let key = NormalizedKey::from_pem(RSA_PKCS1_PEM).unwrap();
        let token = sign(&key, &context(Algorithm::Rs256), 1_763_672_624).unwrap();

        assert_eq!(segments(&token)[2].len(), 256);
    }

    #[test]
    fn test_eddsa_is_deterministic() {
        let key = NormalizedKey::from_pem(ED25519_PKCS8_PEM).unwrap();
        let signer = TokenSigner::new(&key, context(Algorithm::EdDsa)).unwrap();

        let first = signer.sign(1_763_672_624).unwrap();
        let second = signer.sign(1_763_672_624).unwrap();
        assert_eq!(first, second);
        assert_eq!(segments(&first)[2].len(), 64);
    }

    #[test]
    fn test_header_and_payload_segments() {
        let key = NormalizedKey::from_pem(EC_SEC1_PEM).unwrap();
        let token = sign(&key, &context(Algorithm::Es256), 1_763_672_624).unwrap();
        let parts = segments(&token);

        assert_eq!(
            parts[0],
            br#"{"alg":"ES256","kid":"cbe-1762998726956-hu7b87","typ":"JWT"}"#
        );
        let payload: serde_json::Value = serde_json::from_slice(&parts[1]).unwrap();
        assert_eq!(payload["iss"], "bank:db01bea4-d823-4643-ae9d-e3a5b9ad85e4");
        assert_eq!(payload["sub"], payload["iss"]);
        assert_eq!(payload["iat"], 1_763_672_624);
        assert_eq!(payload["exp"], 1_763_673_224);
    }

    #[test]
    fn test_no_padding_in_segments() {
        let key = NormalizedKey::from_pem(RSA_PKCS1_PEM).unwrap();
        let token = sign(&key, &context(Algorithm::Rs256), 1).unwrap();

        assert!(!token.as_str().contains('='));
        assert!(!token.as_str().contains('+'));
        assert!(!token.as_str().contains('/'));
    }

    #[test]
    fn test_family_mismatch_is_rejected() {
        let key = NormalizedKey::from_pem(RSA_PKCS1_PEM).unwrap();
        let err = TokenSigner::new(&key, context(Algorithm::Es256)).unwrap_err();

        assert_eq!(
            err.current_context(),
            &TokenError::KeyAlgorithmMismatch {
                key_family: "RSA".into(),
                algorithm: "ES256".into(),
            }
        );
    }

    #[test]
    fn test_signer_exposes_matching_public_key() {
        let key = NormalizedKey::from_pem(EC_SEC1_PEM).unwrap();
        let signer = TokenSigner::new(&key, context(Algorithm::Es256)).unwrap();

        assert_eq!(signer.public_key(), &key.public_key().unwrap());
    }

    #[test]
    fn test_signer_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TokenSigner>();
    }

    #[test]
    fn test_debug_hides_token_text() {
        let key = NormalizedKey::from_pem(ED25519_PKCS8_PEM).unwrap();
        let token = sign(&key, &context(Algorithm::EdDsa), 1).unwrap();

        assert!(!format!("{token:?}").contains(token.as_str()));
    }
}

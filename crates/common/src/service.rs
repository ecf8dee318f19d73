//! Issuance and verification entry points used by the mediation layer.

use chrono::Utc;
use error_stack::{Report, ResultExt};
use jose_jwk::Jwk;
use serde::{Deserialize, Serialize};

use crate::constants::TOKEN_TYPE_BEARER;
use crate::error::TokenError;
use crate::keys::{normalize, NormalizedKey, PublicKey};
use crate::settings::Settings;
use crate::token::{verify, SigningContext, Token, TokenSigner, VerificationResult};

/// Body returned to callers that request a token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub expires_in: u32,
    pub token_type: String,
}

/// Body returned by a verification request; `reason` is omitted when valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VerifyTokenResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&VerificationResult> for VerifyTokenResponse {
    fn from(result: &VerificationResult) -> Self {
        Self {
            valid: result.is_valid(),
            reason: result.failure_reason(),
        }
    }
}

/// A signer and its verifying key, built once at startup.
#[derive(Debug)]
pub struct TokenService {
    signer: TokenSigner,
}

impl TokenService {
    /// # Errors
    ///
    /// See [`TokenSigner::new`].
    pub fn new(key: &NormalizedKey, context: SigningContext) -> Result<Self, Report<TokenError>> {
        Ok(Self {
            signer: TokenSigner::new(key, context)?,
        })
    }

    /// Loads and normalizes the configured key and builds the signing context.
    ///
    /// # Errors
    ///
    /// Any error of key loading, normalization, [`Settings::signing_context`]
    /// or [`TokenSigner::new`].
    pub fn from_settings(settings: &Settings) -> Result<Self, Report<TokenError>> {
        let context = settings.signing_context()?;
        let material = settings.key_loader().load()?;
        let key = normalize(&material)?;

        let service = Self::new(&key, context)
            .attach(format!("while preparing signer for key from {}", material.origin()))?;
        log::info!(
            "Token service ready: kid={} alg={} ttl={}s",
            service.context().key_id(),
            service.context().algorithm(),
            service.context().ttl_seconds()
        );
        Ok(service)
    }

    #[must_use]
    pub fn context(&self) -> &SigningContext {
        self.signer.context()
    }

    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        self.signer.public_key()
    }

    /// The verifying key as a JWK under the configured `kid`.
    #[must_use]
    pub fn public_jwk(&self) -> Jwk {
        self.public_key().to_jwk(self.context().key_id())
    }

    /// Issues a token valid from now.
    ///
    /// # Errors
    ///
    /// See [`TokenSigner::sign`].
    pub fn issue_token(&self) -> Result<Token, Report<TokenError>> {
        self.issue_token_at(Utc::now().timestamp())
    }

    /// # Errors
    ///
    /// See [`TokenSigner::sign`].
    pub fn issue_token_at(&self, now: i64) -> Result<Token, Report<TokenError>> {
        self.signer.sign(now)
    }

    /// Issues a token and wraps it in a [`TokenResponse`].
    ///
    /// # Errors
    ///
    /// See [`TokenSigner::sign`].
    pub fn issue_response(&self) -> Result<TokenResponse, Report<TokenError>> {
        let token = self.issue_token()?;
        Ok(TokenResponse {
            token: token.into_string(),
            expires_in: self.context().ttl_seconds(),
            token_type: TOKEN_TYPE_BEARER.to_string(),
        })
    }

    /// Verifies a token (optionally `Bearer `-prefixed) against this
    /// service's own key, now.
    #[must_use]
    pub fn verify_token(
        &self,
        token: &str,
        expected_issuer: &str,
        expected_audience: &str,
    ) -> VerificationResult {
        self.verify_token_at(
            token,
            expected_issuer,
            expected_audience,
            Utc::now().timestamp(),
        )
    }

    #[must_use]
    pub fn verify_token_at(
        &self,
        token: &str,
        expected_issuer: &str,
        expected_audience: &str,
        now: i64,
    ) -> VerificationResult {
        verify(
            strip_bearer(token),
            self.public_key(),
            expected_issuer,
            expected_audience,
            now,
        )
    }
}

/// Removes a leading `Bearer` scheme (any case) and surrounding whitespace.
#[must_use]
pub fn strip_bearer(value: &str) -> &str {
    let value = value.trim();
    match value.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case(TOKEN_TYPE_BEARER) => rest.trim(),
        _ => value,
    }
}

/// `Authorization` header value for an outbound call.
#[must_use]
pub fn bearer_header_value(token: &Token) -> String {
    format!("{TOKEN_TYPE_BEARER} {token}")
}

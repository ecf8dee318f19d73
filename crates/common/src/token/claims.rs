//! Signing context plus the header and payload built from it.
//!
//! Field order of [`Header`] and [`Claims`] is the serialized order:
//!
//! ```text
//! {"alg":"ES256","kid":"<kid>","typ":"JWT"}
//! {"iss":"bank:<id>","sub":"bank:<id>","aud":"<aud>","iat":<t>,"exp":<t + ttl>}
//! ```

use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::constants::{ISSUER_PREFIX, TOKEN_TYPE_JWT};
use crate::error::TokenError;
use crate::token::Algorithm;

/// Per-issuance configuration: who signs, for whom, with which key and for how long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    issuer_id: String,
    audience: String,
    key_id: String,
    algorithm: Algorithm,
    ttl_seconds: u32,
}

impl SigningContext {
    /// # Errors
    ///
    /// Returns [`TokenError::Configuration`] if `issuer_id`, `audience` or
    /// `key_id` is empty, or `ttl_seconds` is zero.
    pub fn new(
        issuer_id: impl Into<String>,
        audience: impl Into<String>,
        key_id: impl Into<String>,
        algorithm: Algorithm,
        ttl_seconds: u32,
    ) -> Result<Self, Report<TokenError>> {
        let context = Self {
            issuer_id: issuer_id.into(),
            audience: audience.into(),
            key_id: key_id.into(),
            algorithm,
            ttl_seconds,
        };

        for (field, value) in [
            ("issuer_id", &context.issuer_id),
            ("audience", &context.audience),
            ("key_id", &context.key_id),
        ] {
            if value.is_empty() {
                return Err(Report::new(TokenError::Configuration {
                    message: format!("Signing context field '{field}' must not be empty"),
                }));
            }
        }
        if ttl_seconds == 0 {
            return Err(Report::new(TokenError::Configuration {
                message: "Signing context ttl_seconds must be greater than zero".into(),
            }));
        }

        Ok(context)
    }

    /// Like [`SigningContext::new`], parsing the algorithm name.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::UnsupportedAlgorithm`] for an unknown name, or
    /// any error of [`SigningContext::new`].
    pub fn with_algorithm_name(
        issuer_id: impl Into<String>,
        audience: impl Into<String>,
        key_id: impl Into<String>,
        algorithm: &str,
        ttl_seconds: u32,
    ) -> Result<Self, Report<TokenError>> {
        let algorithm = algorithm.parse::<Algorithm>()?;
        Self::new(issuer_id, audience, key_id, algorithm, ttl_seconds)
    }

    #[must_use]
    pub fn issuer_id(&self) -> &str {
        &self.issuer_id
    }

    /// The `iss`/`sub` claim value, `bank:<issuer_id>`.
    #[must_use]
    pub fn issuer(&self) -> String {
        format!("{ISSUER_PREFIX}{}", self.issuer_id)
    }

    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }

    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> u32 {
        self.ttl_seconds
    }
}

/// The `iss` value a verifier should expect for `issuer`.
///
/// Accepts a bare issuer id or a full `bank:` claim; values already carrying
/// the prefix are returned unchanged. Issuance always prefixes, see
/// [`SigningContext::issuer`].
#[must_use]
pub fn issuer_claim(issuer: &str) -> String {
    if issuer.starts_with(ISSUER_PREFIX) {
        issuer.to_string()
    } else {
        format!("{ISSUER_PREFIX}{issuer}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub alg: Algorithm,
    pub kid: String,
    pub typ: String,
}

impl Header {
    #[must_use]
    pub fn for_context(context: &SigningContext) -> Self {
        Self {
            alg: context.algorithm(),
            kid: context.key_id().to_string(),
            typ: TOKEN_TYPE_JWT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Builds the payload for a token issued at `issued_at` (unix seconds).
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::SigningError`] if `issued_at + ttl` overflows.
    pub fn build(context: &SigningContext, issued_at: i64) -> Result<Self, Report<TokenError>> {
        let expires_at = issued_at
            .checked_add(i64::from(context.ttl_seconds()))
            .ok_or_else(|| {
                Report::new(TokenError::SigningError {
                    message: format!("Expiry overflows for iat {issued_at}"),
                })
            })?;
        let issuer = context.issuer();

        Ok(Self {
            sub: issuer.clone(),
            iss: issuer,
            aud: context.audience().to_string(),
            iat: issued_at,
            exp: expires_at,
        })
    }
}

//! Compact token verification.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. structure: three non-empty segments, decodable header and payload
//!    carrying `alg`, `iss`, `aud` and `exp` ([`FailureKind::Malformed`])
//! 2. signature over the first two segments as received
//!    ([`FailureKind::BadSignature`])
//! 3. `exp > now` ([`FailureKind::Expired`])
//! 4. `iss`, then `aud` ([`FailureKind::ClaimMismatch`])
//!
//! Verification never returns an error or panics; every outcome is a
//! [`VerificationResult`].

use base64::{engine::general_purpose, Engine};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::keys::PublicKey;
use crate::token::claims::issuer_claim;
use crate::token::Algorithm;

type JsonObject = Map<String, Value>;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    #[display("malformed")]
    Malformed,
    #[display("bad_signature")]
    BadSignature,
    #[display("expired")]
    Expired,
    #[display("claim_mismatch")]
    ClaimMismatch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    outcome: Result<JsonObject, FailureKind>,
}

impl VerificationResult {
    fn valid(claims: JsonObject) -> Self {
        Self {
            outcome: Ok(claims),
        }
    }

    fn invalid(kind: FailureKind) -> Self {
        log::debug!("Token verification failed: {}", kind);
        Self {
            outcome: Err(kind),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The verified payload, present only when valid.
    #[must_use]
    pub fn claims(&self) -> Option<&JsonObject> {
        self.outcome.as_ref().ok()
    }

    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.outcome.as_ref().err().copied()
    }

    /// Wire form of the failure kind, e.g. `"bad_signature"`.
    #[must_use]
    pub fn failure_reason(&self) -> Option<String> {
        self.failure_kind().map(|kind| kind.to_string())
    }
}

struct ParsedToken<'a> {
    signing_input: &'a str,
    signature: &'a str,
    algorithm: Algorithm,
    claims: JsonObject,
    issuer: String,
    audience: Vec<String>,
    expires_at: i64,
}

fn split_segments(token: &str) -> Option<[&str; 3]> {
    let mut parts = token.split('.');
    let segments = [parts.next()?, parts.next()?, parts.next()?];
    if parts.next().is_some() || segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(segments)
}

fn decode_object(segment: &str) -> Option<JsonObject> {
    let bytes = general_purpose::URL_SAFE_NO_PAD.decode(segment).ok()?;
    match serde_json::from_slice(&bytes).ok()? {
        Value::Object(object) => Some(object),
        _ => None,
    }
}

fn audience_values(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(single) => Some(vec![single.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

fn parse(token: &str) -> Option<ParsedToken<'_>> {
    let [header_segment, payload_segment, signature] = split_segments(token)?;
    let signing_input = &token[..header_segment.len() + 1 + payload_segment.len()];

    let header = decode_object(header_segment)?;
    let algorithm = header.get("alg")?.as_str()?.parse::<Algorithm>().ok()?;

    let claims = decode_object(payload_segment)?;
    let issuer = claims.get("iss")?.as_str()?.to_string();
    let audience = audience_values(claims.get("aud")?)?;
    let expires_at = claims.get("exp")?.as_i64()?;

    Some(ParsedToken {
        signing_input,
        signature,
        algorithm,
        claims,
        issuer,
        audience,
        expires_at,
    })
}

/// Verifies `token` against `public_key` and the expected claims at `now`.
///
/// `expected_issuer` may be the bare issuer id or the full `bank:<id>` value.
#[must_use]
pub fn verify(
    token: &str,
    public_key: &PublicKey,
    expected_issuer: &str,
    expected_audience: &str,
    now: i64,
) -> VerificationResult {
    let Some(parsed) = parse(token) else {
        return VerificationResult::invalid(FailureKind::Malformed);
    };

    let signature_ok = general_purpose::URL_SAFE_NO_PAD
        .decode(parsed.signature)
        .is_ok_and(|signature| {
            public_key.verify(
                parsed.algorithm,
                parsed.signing_input.as_bytes(),
                &signature,
            )
        });
    if !signature_ok {
        return VerificationResult::invalid(FailureKind::BadSignature);
    }

    if parsed.expires_at <= now {
        return VerificationResult::invalid(FailureKind::Expired);
    }
    if parsed.issuer != issuer_claim(expected_issuer) {
        return VerificationResult::invalid(FailureKind::ClaimMismatch);
    }
    if !parsed.audience.iter().any(|aud| aud == expected_audience) {
        return VerificationResult::invalid(FailureKind::ClaimMismatch);
    }

    VerificationResult::valid(parsed.claims)
}

/// Reads the header `kid` without verifying anything.
///
/// Used to pick a public key before calling [`verify`].
#[must_use]
pub fn peek_key_id(token: &str) -> Option<String> {
    let [header_segment, _, _] = split_segments(token)?;
    let header = decode_object(header_segment)?;
    header.get("kid")?.as_str().map(str::to_string)
}

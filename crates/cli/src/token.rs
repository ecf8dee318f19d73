//! Token issuance and verification commands.

use std::path::{Path, PathBuf};

use bank_token_common::keys::PublicKey;
use bank_token_common::settings::Settings;
use bank_token_common::service::{strip_bearer, TokenResponse, TokenService, VerifyTokenResponse};
use bank_token_common::token::{find_public_key, peek_key_id, verify as verify_token, FailureKind};
use chrono::Utc;

use crate::config::load_settings;
use crate::error::CliError;

/// Where the verifying key comes from.
pub enum KeySelection {
    /// Derived from the configured private key
    Configured,
    /// A `PUBLIC KEY` or `RSA PUBLIC KEY` PEM file
    PublicKeyFile(PathBuf),
    /// A JWKS document; the token's `kid` selects the key
    Jwks(PathBuf),
}

pub struct VerifyOptions {
    pub config: PathBuf,
    pub key: KeySelection,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub token: String,
}

/// Issue a token with the configured key and context.
pub fn issue(config: &Path) -> Result<TokenResponse, CliError> {
    let settings = load_settings(config)?;
    let service = TokenService::from_settings(&settings)?;
    Ok(service.issue_response()?)
}

fn resolve_public_key(
    settings: &Settings,
    key: &KeySelection,
    token: &str,
) -> Result<Option<PublicKey>, CliError> {
    match key {
        KeySelection::Configured => {
            let service = TokenService::from_settings(settings)?;
            Ok(Some(service.public_key().clone()))
        }
        KeySelection::PublicKeyFile(path) => {
            let pem = std::fs::read_to_string(path)?;
            Ok(Some(PublicKey::from_pem(&pem)?))
        }
        KeySelection::Jwks(path) => {
            let Some(kid) = peek_key_id(token) else {
                log::debug!("Token header carries no readable kid");
                return Ok(None);
            };
            let document = std::fs::read_to_string(path)?;
            log::debug!("Selecting JWK with kid {}", kid);
            let public_key = find_public_key(&document, &kid)?;
            if public_key.is_none() {
                log::debug!("No JWK with kid {}", kid);
            }
            Ok(public_key)
        }
    }
}

/// Verify a token now against the selected public key.
///
/// Expected issuer and audience default to the configured values.
pub fn verify(options: &VerifyOptions) -> Result<VerifyTokenResponse, CliError> {
    let settings = load_settings(&options.config)?;
    let token = strip_bearer(&options.token);

    let issuer = options
        .issuer
        .as_deref()
        .unwrap_or(settings.token.issuer_id.as_str());
    let audience = options
        .audience
        .as_deref()
        .unwrap_or(settings.token.audience.as_str());

    let Some(public_key) = resolve_public_key(&settings, &options.key, token)? else {
        return Ok(VerifyTokenResponse {
            valid: false,
            reason: Some(FailureKind::Malformed.to_string()),
        });
    };

    let result = verify_token(
        token,
        &public_key,
        issuer,
        audience,
        Utc::now().timestamp(),
    );
    Ok(VerifyTokenResponse::from(&result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::{fixture, write_settings};

    fn options(config: PathBuf, key: KeySelection, token: String) -> VerifyOptions {
        VerifyOptions {
            config,
            key,
            issuer: None,
            audience: None,
            token,
        }
    }

    #[test]
    fn test_issue_then_verify_with_configured_key() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_settings(dir.path(), "ES256", "ec_sec1.pem");

        let response = issue(&config).unwrap();
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 600);

        let verified = verify(&options(config, KeySelection::Configured, response.token)).unwrap();
        assert!(verified.valid);
        assert_eq!(verified.reason, None);
    }

    #[test]
    fn test_verify_with_public_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_settings(dir.path(), "RS256", "rsa_pkcs1.pem");
        let token = issue(&config).unwrap().token;

        let verified = verify(&options(
            config,
            KeySelection::PublicKeyFile(fixture("rsa_public.pem").into()),
            format!("Bearer {token}"),
        ))
        .unwrap();
        assert!(verified.valid);
    }

    #[test]
    fn test_verify_with_jwks_selects_by_kid() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_settings(dir.path(), "EdDSA", "ed25519_pkcs8.pem");
        let token = issue(&config).unwrap().token;

        let jwks_path = dir.path().join("jwks.json");
        std::fs::write(&jwks_path, crate::key::jwks(&config).unwrap()).unwrap();

        let verified =
            verify(&options(config, KeySelection::Jwks(jwks_path), token)).unwrap();
        assert!(verified.valid);
    }

    #[test]
    fn test_jwks_kid_lookup_failures_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_settings(dir.path(), "EdDSA", "ed25519_pkcs8.pem");
        let token = issue(&config).unwrap().token;

        let jwks_path = dir.path().join("jwks.json");
        let document = crate::key::jwks(&config)
            .unwrap()
            .replace("\"kid\":\"", "\"kid\":\"retired-");
        std::fs::write(&jwks_path, document).unwrap();

        let unknown_kid = verify(&options(
            config.clone(),
            KeySelection::Jwks(jwks_path.clone()),
            token,
        ))
        .unwrap();
        let no_kid = verify(&options(
            config,
            KeySelection::Jwks(jwks_path),
            "e30.e30.AAAA".into(),
        ))
        .unwrap();

        for verified in [unknown_kid, no_kid] {
            assert!(!verified.valid);
            assert_eq!(verified.reason.as_deref(), Some("malformed"));
        }
    }

    #[test]
    fn test_verify_reports_audience_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_settings(dir.path(), "ES256", "ec_sec1.pem");
        let token = issue(&config).unwrap().token;

        let mut opts = options(config, KeySelection::Configured, token);
        opts.audience = Some("https://someone-else.example/".into());

        let verified = verify(&opts).unwrap();
        assert!(!verified.valid);
        assert_eq!(verified.reason.as_deref(), Some("claim_mismatch"));
    }

    #[test]
    fn test_verify_garbage_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_settings(dir.path(), "ES256", "ec_sec1.pem");

        let verified = verify(&options(
            config,
            KeySelection::Configured,
            "not-a-token".into(),
        ))
        .unwrap();
        assert_eq!(verified.reason.as_deref(), Some("malformed"));
    }
}

//! Key inspection commands.

use std::path::Path;

use bank_token_common::keys::{normalize as normalize_key, PrivateKeyMaterial};
use bank_token_common::service::TokenService;
use bank_token_common::token::jwks_document;

use crate::config::load_settings;
use crate::error::CliError;

/// Convert a private key PEM of any supported envelope to `PRIVATE KEY` PEM.
pub fn normalize(file: &Path) -> Result<String, CliError> {
    let text = std::fs::read_to_string(file)?;
    let material = PrivateKeyMaterial::from_pem(text, file.display().to_string())?;
    let key = normalize_key(&material)?;

    log::info!(
        "Normalized {} key from {}",
        key.family(),
        file.display()
    );
    Ok(key.to_pem())
}

/// JWKS document holding the configured key's public half under its `kid`.
pub fn jwks(config: &Path) -> Result<String, CliError> {
    let settings = load_settings(config)?;
    let service = TokenService::from_settings(&settings)?;
    Ok(jwks_document(&[service.public_jwk()])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::{fixture, write_settings};

    #[test]
    fn test_normalize_pkcs1_matches_openssl_pkcs8() {
        let normalized = normalize(Path::new(&fixture("rsa_pkcs1.pem"))).unwrap();
        let expected = std::fs::read_to_string(fixture("rsa_pkcs8.pem")).unwrap();

        assert_eq!(normalized.trim(), expected.trim());
    }

    #[test]
    fn test_normalize_rejects_public_key() {
        let err = normalize(Path::new(&fixture("ec_public.pem"))).unwrap_err();
        assert!(matches!(err, CliError::Token(_)));
    }

    #[test]
    fn test_jwks_document() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_settings(dir.path(), "ES256", "ec_sec1.pem");

        let document: serde_json::Value = serde_json::from_str(&jwks(&config).unwrap()).unwrap();
        let key = &document["keys"][0];
        assert_eq!(key["kty"], "EC");
        assert_eq!(key["crv"], "P-256");
        assert_eq!(key["kid"], "cbe-1762998726956-hu7b87");
        assert_eq!(key["alg"], "ES256");
    }
}

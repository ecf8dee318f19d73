//! Configuration commands.
//!
//! Settings are loaded from a TOML file and merged with environment variables
//! prefixed with `BANK_TOKEN__`. For example, `BANK_TOKEN__TOKEN__AUDIENCE`
//! overrides `token.audience` in the TOML file.

use std::fmt::Write as _;
use std::path::Path;

use bank_token_common::settings::Settings;

use crate::error::CliError;

/// Load settings from a TOML file, merged with `BANK_TOKEN__` overrides.
pub(crate) fn load_settings(file: &Path) -> Result<Settings, CliError> {
    log::debug!("Environment variables with BANK_TOKEN__ prefix will be merged");
    Ok(Settings::from_file(file)?)
}

/// Validate a settings file and summarize the effective configuration.
pub fn validate(file: &Path) -> Result<String, CliError> {
    let settings = load_settings(file)?;
    let context = settings.signing_context()?;

    let mut summary = String::from("Configuration is valid\n");
    let _ = writeln!(summary, "  File: {}", file.display());
    let _ = writeln!(summary, "  Issuer: {}", context.issuer());
    let _ = writeln!(summary, "  Audience: {}", context.audience());
    let _ = writeln!(summary, "  Key id: {}", context.key_id());
    let _ = writeln!(summary, "  Algorithm: {}", context.algorithm());
    let _ = writeln!(summary, "  TTL: {}s", context.ttl_seconds());
    let _ = writeln!(summary, "  Key candidates:");
    for candidate in &settings.key.candidates {
        let _ = writeln!(summary, "    - {}", candidate);
    }

    Ok(summary)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use super::*;

    pub(crate) fn fixture(name: &str) -> String {
        format!("{}/../common/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    pub(crate) fn write_settings(dir: &Path, algorithm: &str, key_fixture: &str) -> PathBuf {
        let path = dir.join("bank-token.toml");
        let toml_str = format!(
            r#"
            [token]
            issuer_id = "db01bea4-d823-4643-ae9d-e3a5b9ad85e4"
            audience = "https://api.test-bank.example/"
            key_id = "cbe-1762998726956-hu7b87"
            algorithm = "{algorithm}"

            [key]
            candidates = ["{missing}", "{key}"]
            "#,
            missing = dir.join("missing.pem").display(),
            key = fixture(key_fixture),
        );
        std::fs::write(&path, toml_str).unwrap();
        path
    }

    #[test]
    fn test_validate_summarizes_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(dir.path(), "ES256", "ec_sec1.pem");

        let summary = validate(&path).unwrap();
        assert!(summary.starts_with("Configuration is valid"));
        assert!(summary.contains("Issuer: bank:db01bea4-d823-4643-ae9d-e3a5b9ad85e4"));
        assert!(summary.contains("Algorithm: ES256"));
        assert!(summary.contains("TTL: 600s"));
    }

    #[test]
    fn test_validate_rejects_unknown_algorithm() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(dir.path(), "HS256", "ec_sec1.pem");

        let err = validate(&path).unwrap_err();
        assert!(matches!(err, CliError::Token(msg) if msg.contains("HS256")));
    }

    #[test]
    fn test_validate_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}

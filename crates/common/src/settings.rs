use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use error_stack::{Report, ResultExt};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{DEFAULT_ALGORITHM, DEFAULT_TTL_SECONDS, ENV_PREFIX};
use crate::error::TokenError;
use crate::keys::KeyMaterialLoader;
use crate::token::SigningContext;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct TokenSettings {
    #[validate(length(min = 1))]
    pub issuer_id: String,
    #[validate(length(min = 1))]
    pub audience: String,
    #[validate(length(min = 1))]
    pub key_id: String,
    #[serde(default = "default_algorithm")]
    #[validate(length(min = 1))]
    pub algorithm: String,
    #[serde(default = "default_ttl_seconds")]
    #[validate(range(min = 1))]
    pub ttl_seconds: u32,
}

fn default_algorithm() -> String {
    DEFAULT_ALGORITHM.to_string()
}

fn default_ttl_seconds() -> u32 {
    DEFAULT_TTL_SECONDS
}

/// Candidate private key locations, tried in order.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KeySettings {
    #[serde(default)]
    pub candidates: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub token: TokenSettings,
    #[serde(default)]
    pub key: KeySettings,
}

impl Settings {
    /// Parses TOML settings, applies `BANK_TOKEN__SECTION__FIELD` environment
    /// overrides and validates the result.
    ///
    /// `BANK_TOKEN__KEY__CANDIDATES` takes a comma separated list.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Configuration`] if the TOML is invalid, a
    /// required field is missing, or validation fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, Report<TokenError>> {
        let environment = Environment::default()
            .prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("key.candidates");

        let toml = File::from_str(toml_str, FileFormat::Toml);
        let config = Config::builder()
            .add_source(toml)
            .add_source(environment)
            .build()
            .change_context(TokenError::Configuration {
                message: "Failed to build settings".to_string(),
            })?;

        let settings: Self =
            config
                .try_deserialize()
                .change_context(TokenError::Configuration {
                    message: "Failed to deserialize settings".to_string(),
                })?;

        settings
            .validate()
            .change_context(TokenError::Configuration {
                message: "Settings validation failed".to_string(),
            })?;

        Ok(settings)
    }

    /// Reads and parses a settings file.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Configuration`] if the file cannot be read, or
    /// any error of [`Settings::from_toml`].
    pub fn from_file(path: &Path) -> Result<Self, Report<TokenError>> {
        let toml_str = std::fs::read_to_string(path).change_context(TokenError::Configuration {
            message: format!("Failed to read settings file {}", path.display()),
        })?;

        log::info!("Loading settings from {}", path.display());
        Self::from_toml(&toml_str).attach(format!("while loading {}", path.display()))
    }

    /// The signing context described by the `[token]` section.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::UnsupportedAlgorithm`] for an unknown algorithm
    /// name, or [`TokenError::Configuration`] for invalid values.
    pub fn signing_context(&self) -> Result<SigningContext, Report<TokenError>> {
        SigningContext::with_algorithm_name(
            self.token.issuer_id.as_str(),
            self.token.audience.as_str(),
            self.token.key_id.as_str(),
            &self.token.algorithm,
            self.token.ttl_seconds,
        )
    }

    /// A loader over the `[key]` candidates, in order.
    #[must_use]
    pub fn key_loader(&self) -> KeyMaterialLoader {
        KeyMaterialLoader::from_paths(&self.key.candidates)
    }
}

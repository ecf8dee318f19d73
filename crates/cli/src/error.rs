//! CLI error types.

use std::fmt;

use bank_token_common::error::TokenError;
use error_stack::Report;

#[derive(Debug)]
pub enum CliError {
    /// Settings could not be loaded or validated
    Config(String),
    /// Key loading, normalization or signing failed
    Token(String),
    /// A token was checked and found invalid
    Rejected(String),
    /// IO error
    Io(std::io::Error),
    /// JSON serialization error
    Json(String),
    /// Logger could not be installed
    Logging(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Token(msg) => write!(f, "Token error: {}", msg),
            CliError::Rejected(reason) => write!(f, "Token rejected: {}", reason),
            CliError::Io(err) => write!(f, "IO error: {}", err),
            CliError::Json(msg) => write!(f, "JSON error: {}", msg),
            CliError::Logging(msg) => write!(f, "Logging error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Json(err.to_string())
    }
}

impl From<Report<TokenError>> for CliError {
    fn from(report: Report<TokenError>) -> Self {
        match report.current_context() {
            TokenError::Configuration { .. } => CliError::Config(format!("{:?}", report)),
            _ => CliError::Token(format!("{:?}", report)),
        }
    }
}

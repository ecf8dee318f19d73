//! Error types for key loading, normalization and token issuance.
//!
//! Issuance-side failures are returned as [`error_stack::Report`]s over
//! [`TokenError`]. Verification never produces a `TokenError`; it reports
//! through [`crate::token::VerificationResult`] instead.

use core::error::Error;

use derive_more::Display;

/// Failures that abort key loading or token issuance.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// None of the candidate key sources existed.
    #[display("Key material not found; attempted: [{}]", attempted.join(", "))]
    KeyNotFound { attempted: Vec<String> },

    /// Key text had no PEM envelope, bad base64, or DER the primitive rejected.
    #[display("Invalid key format: {message}")]
    InvalidKeyFormat { message: String },

    /// The PEM label or the PKCS#8 algorithm names no supported key family.
    #[display("Unsupported key family: {found}")]
    UnsupportedKeyFamily { found: String },

    /// The algorithm name is not one of `ES256`, `RS256`, `EdDSA`.
    #[display("Unsupported algorithm: {name}")]
    UnsupportedAlgorithm { name: String },

    /// The key family cannot produce signatures for the requested algorithm.
    #[display("Key family {key_family} cannot sign {algorithm}")]
    KeyAlgorithmMismatch {
        key_family: String,
        algorithm: String,
    },

    /// The signing primitive or header/payload serialization failed.
    #[display("Signing error: {message}")]
    SigningError { message: String },

    /// Settings were missing, unreadable or failed validation.
    #[display("Configuration error: {message}")]
    Configuration { message: String },
}

impl Error for TokenError {}

//! Bearer token engine for bank service-to-service authentication.
//!
//! This crate loads a bank's private key from ordered candidate locations,
//! normalizes whatever PEM envelope it arrives in to PKCS#8, and issues and
//! verifies compact signed tokens (ES256, RS256, EdDSA).
//!
//! # Modules
//!
//! - [`constants`]: Claim prefixes, token types and settings defaults
//! - [`error`]: Error types for issuance and key handling
//! - [`keys`]: Key sources, PEM/DER handling and key normalization
//! - [`service`]: Issuance and verification entry points
//! - [`settings`]: Configuration management and validation
//! - [`test_support`]: Fixtures and helpers for tests
//! - [`token`]: Claims, signing, verification and JWKS conversion

pub mod constants;
pub mod error;
pub mod keys;
pub mod service;
pub mod settings;
pub mod token;

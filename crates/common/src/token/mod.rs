//! Compact token issuance and verification.
//!
//! Tokens are three base64url segments (`header.payload.signature`) signed
//! with ES256, RS256 or EdDSA.

pub mod algorithm;
pub mod claims;
pub mod jwks;
pub mod signer;
pub mod verifier;

pub use algorithm::*;
pub use claims::*;
pub use jwks::*;
pub use signer::*;
pub use verifier::*;

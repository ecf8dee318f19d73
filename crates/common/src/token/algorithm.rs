use core::fmt;
use core::str::FromStr;

use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::error::TokenError;
use crate::keys::KeyFamily;

/// Signature algorithm carried in the `alg` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// ECDSA P-256 with SHA-256, 64-byte `r || s` signature.
    #[serde(rename = "ES256")]
    Es256,
    /// RSASSA-PKCS1-v1_5 with SHA-256.
    #[serde(rename = "RS256")]
    Rs256,
    /// Ed25519 over the raw signing input.
    #[serde(rename = "EdDSA")]
    EdDsa,
}

impl Algorithm {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Es256 => "ES256",
            Self::Rs256 => "RS256",
            Self::EdDsa => "EdDSA",
        }
    }

    /// The key family able to produce this algorithm's signatures.
    #[must_use]
    pub fn family(self) -> KeyFamily {
        match self {
            Self::Es256 => KeyFamily::Ec,
            Self::Rs256 => KeyFamily::Rsa,
            Self::EdDsa => KeyFamily::Ed25519,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Report<TokenError>;

    /// Exact, case-sensitive match on the JOSE algorithm names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ES256" => Ok(Self::Es256),
            "RS256" => Ok(Self::Rs256),
            "EdDSA" => Ok(Self::EdDsa),
            other => Err(Report::new(TokenError::UnsupportedAlgorithm {
                name: other.to_string(),
            })),
        }
    }
}

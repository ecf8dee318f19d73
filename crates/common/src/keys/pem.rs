//! PEM envelope parsing and armoring.

use base64::{engine::general_purpose, Engine};
use error_stack::Report;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::TokenError;

/// Matches one `-----BEGIN X-----` ... `-----END Y-----` block.
///
/// The regex engine has no backreferences, so the END label is captured
/// separately and compared in [`parse_blocks`].
static PEM_BLOCK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)-----BEGIN ([A-Z0-9 ]+)-----(.*?)-----END ([A-Z0-9 ]+)-----")
        .expect("PEM block regex should compile")
});

const LINE_WIDTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PemBlock {
    pub label: String,
    body: String,
}

impl PemBlock {
    /// Decodes the base64 body, ignoring line breaks and other whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidKeyFormat`] if the body is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, Report<TokenError>> {
        let compact: String = self.body.split_whitespace().collect();

        general_purpose::STANDARD.decode(compact).map_err(|e| {
            Report::new(TokenError::InvalidKeyFormat {
                message: format!("Failed to decode base64 body of '{}' block: {}", self.label, e),
            })
        })
    }
}

/// Returns every well-formed block in `text`, in order of appearance.
///
/// A block whose END label differs from its BEGIN label is skipped.
#[must_use]
pub fn parse_blocks(text: &str) -> Vec<PemBlock> {
    PEM_BLOCK_PATTERN
        .captures_iter(text)
        .filter(|caps| caps[1] == caps[3])
        .map(|caps| PemBlock {
            label: caps[1].to_string(),
            body: caps[2].to_string(),
        })
        .collect()
}

/// Armors `der` under `label` with 64-column base64 lines.
#[must_use]
pub fn encode(label: &str, der: &[u8]) -> String {
    let body = general_purpose::STANDARD.encode(der);

    let mut out = format!("-----BEGIN {label}-----\n");
    for line in body.as_bytes().chunks(LINE_WIDTH) {
        // base64 output is ASCII, so any chunk boundary is a char boundary
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    out.push_str(&format!("-----END {label}-----\n"));
    out
}

//! Places private key text can be read from.
//!
//! The loader only needs "read text from a source"; where the text lives is
//! up to the [`KeySource`] implementation:
//! - [`FileKeySource`]: a PEM file on disk
//! - [`EmbeddedKeySource`]: a PEM compiled into the binary with `include_str!`

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use error_stack::Report;

use crate::error::TokenError;

/// A candidate location for private key text.
pub trait KeySource: Send + Sync {
    /// Human-readable location, reported in [`TokenError::KeyNotFound`].
    fn describe(&self) -> String;

    /// Reads the key text.
    ///
    /// Returns `Ok(Some(text))` if the source exists,
    /// `Ok(None)` if it doesn't,
    /// or `Err` if it exists but its content cannot be used.
    ///
    /// # Errors
    ///
    /// Returns an error if the source exists but cannot be turned into text.
    fn read(&self) -> Result<Option<String>, Report<TokenError>>;
}

#[derive(Debug, Clone)]
pub struct FileKeySource {
    path: PathBuf,
}

impl FileKeySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeySource for FileKeySource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<Option<String>, Report<TokenError>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                // Unreadable counts as absent so the next candidate gets a chance.
                log::warn!("Skipping unreadable key file {}: {}", self.describe(), e);
                return Ok(None);
            }
        };

        String::from_utf8(bytes).map(Some).map_err(|_| {
            Report::new(TokenError::InvalidKeyFormat {
                message: format!("Key file {} is not valid UTF-8", self.describe()),
            })
        })
    }
}

/// Key text bundled into the binary.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedKeySource {
    name: &'static str,
    contents: &'static str,
}

impl EmbeddedKeySource {
    #[must_use]
    pub const fn new(name: &'static str, contents: &'static str) -> Self {
        Self { name, contents }
    }
}

impl KeySource for EmbeddedKeySource {
    fn describe(&self) -> String {
        format!("embedded:{}", self.name)
    }

    fn read(&self) -> Result<Option<String>, Report<TokenError>> {
        Ok(Some(self.contents.to_string()))
    }
}

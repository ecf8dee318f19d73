//! Loading private key PEM from an ordered list of candidate sources.

use std::path::PathBuf;

use error_stack::{Report, ResultExt};

use crate::error::TokenError;
use crate::keys::normalize::{KeyFamily, KeyFormat};
use crate::keys::pem::{self, PemBlock};
use crate::keys::source::{FileKeySource, KeySource};

/// PEM text as read from a source, with its detected envelope.
#[derive(Clone)]
pub struct PrivateKeyMaterial {
    pem: String,
    origin: String,
    block: PemBlock,
    format: Option<KeyFormat>,
}

impl PrivateKeyMaterial {
    /// Accepts PEM text containing at least one complete envelope.
    ///
    /// When several blocks are present (for example `EC PARAMETERS` followed
    /// by `EC PRIVATE KEY`) the first block labelled `... PRIVATE KEY` is the
    /// key; otherwise the first block is.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidKeyFormat`] if no matching
    /// `-----BEGIN X-----`/`-----END X-----` pair is present.
    pub fn from_pem(
        pem: impl Into<String>,
        origin: impl Into<String>,
    ) -> Result<Self, Report<TokenError>> {
        let pem = pem.into();
        let origin = origin.into();

        let mut blocks = pem::parse_blocks(&pem);
        if blocks.is_empty() {
            return Err(Report::new(TokenError::InvalidKeyFormat {
                message: format!("No PEM envelope found in key from {origin}"),
            }));
        }

        let index = blocks
            .iter()
            .position(|b| b.label.ends_with("PRIVATE KEY"))
            .unwrap_or(0);
        let block = blocks.swap_remove(index);
        let format = KeyFormat::from_label(&block.label);

        Ok(Self {
            pem,
            origin,
            block,
            format,
        })
    }

    #[must_use]
    pub fn pem(&self) -> &str {
        &self.pem
    }

    /// Where the text was read from, as reported by [`KeySource::describe`].
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// `None` when the label is none of the three recognized envelopes.
    #[must_use]
    pub fn format(&self) -> Option<KeyFormat> {
        self.format
    }

    /// Known for separated envelopes; a wrapped key's family is only known
    /// after normalization reads its algorithm identifier.
    #[must_use]
    pub fn key_family(&self) -> Option<KeyFamily> {
        self.format.and_then(KeyFormat::implied_family)
    }

    pub(crate) fn key_block(&self) -> &PemBlock {
        &self.block
    }
}

impl std::fmt::Debug for PrivateKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKeyMaterial")
            .field("origin", &self.origin)
            .field("label", &self.block.label)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

/// Tries each source in order; the first one that exists wins.
pub struct KeyMaterialLoader {
    sources: Vec<Box<dyn KeySource>>,
}

impl KeyMaterialLoader {
    #[must_use]
    pub fn new(sources: Vec<Box<dyn KeySource>>) -> Self {
        Self { sources }
    }

    /// Builds a loader over file paths, in the given order.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let sources = paths
            .into_iter()
            .map(|p| Box::new(FileKeySource::new(p)) as Box<dyn KeySource>)
            .collect();
        Self::new(sources)
    }

    /// Appends a lower-priority source.
    #[must_use]
    pub fn with_source(mut self, source: impl KeySource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Reads the first existing source.
    ///
    /// # Errors
    ///
    /// - [`TokenError::KeyNotFound`] listing every attempted location if no
    ///   source exists (including when there are no sources)
    /// - [`TokenError::InvalidKeyFormat`] if the first existing source holds
    ///   no PEM envelope
    /// - any error a source reports while reading
    pub fn load(&self) -> Result<PrivateKeyMaterial, Report<TokenError>> {
        let mut attempted = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            let location = source.describe();

            match source
                .read()
                .attach(format!("while reading key from {location}"))?
            {
                Some(text) => {
                    log::info!("Loading private key from {}", location);
                    return PrivateKeyMaterial::from_pem(text, location);
                }
                None => {
                    log::debug!("No private key at {}", location);
                    attempted.push(location);
                }
            }
        }

        Err(Report::new(TokenError::KeyNotFound { attempted }))
    }
}

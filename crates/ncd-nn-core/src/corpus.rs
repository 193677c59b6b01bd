//! The in-memory corpus.
//!
//! A [`Corpus`] is built once from `(identity, content)` pairs and is
//! read-only afterwards. Building computes every item's solo compressed size
//! through the oracle; the sizes are memoized on the items and reused for
//! every pair evaluation.
//!
//! Load order is the order of the input pairs. The engine's tie-break
//! depends on it, so callers that need reproducible reports across
//! platforms should pass entries in a deterministic order.

use std::collections::HashSet;

use rayon::prelude::*;
use thiserror::Error;

use crate::compress::{CompressError, Compressor};
use crate::models::Item;

/// Errors raised while building a corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("duplicate item identity: {0}")]
    DuplicateIdentity(String),
    #[error("failed to compress {identity}: {source}")]
    Compression {
        identity: String,
        #[source]
        source: CompressError,
    },
}

/// Immutable, ordered collection of [`Item`]s for one run.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    items: Vec<Item>,
}

impl Corpus {
    /// Build a corpus, computing each item's solo size.
    ///
    /// Solo sizes are computed in parallel on the current rayon pool; item
    /// order follows `entries`. Fails on the first duplicate identity (before
    /// any compression) or on the first compression error.
    pub fn build<C: Compressor>(
        entries: Vec<(String, Vec<u8>)>,
        compressor: &C,
    ) -> Result<Self, CorpusError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for (identity, _) in &entries {
            if !seen.insert(identity.as_str()) {
                return Err(CorpusError::DuplicateIdentity(identity.clone()));
            }
        }

        let items = entries
            .into_par_iter()
            .map(|(identity, content)| match compressor.compressed_len(&content) {
                Ok(solo_size) => Ok(Item {
                    identity,
                    content,
                    solo_size,
                }),
                Err(source) => Err(CorpusError::Compression { identity, source }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { items })
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total bytes of raw content held in memory.
    pub fn content_bytes(&self) -> u64 {
        self.items.iter().map(|i| i.content.len() as u64).sum()
    }
}

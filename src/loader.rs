//! Corpus loader: scanned paths → in-memory corpus.
//!
//! Every file is read in full before any pair is compared. An unreadable
//! file aborts the run; nothing is skipped silently.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ncd_nn_core::compress::Compressor;
use ncd_nn_core::corpus::Corpus;
use ncd_nn_core::dispatch::Dispatcher;

use crate::error::RunError;
use crate::progress::{ProgressEvent, ProgressReporter};

/// Read every path into an `(identity, content)` pair, preserving order.
///
/// The identity is the path as discovered (data directory joined with the
/// relative path), converted lossily to UTF-8. Bytes that are not valid
/// UTF-8 become U+FFFD, so two file names that differ only in such bytes
/// map to the same identity and the corpus build fails with a
/// duplicate-identity error naming it.
pub fn read_entries(
    paths: &[PathBuf],
    progress: &dyn ProgressReporter,
) -> Result<Vec<(String, Vec<u8>)>, RunError> {
    let total = paths.len() as u64;
    let mut entries = Vec::with_capacity(paths.len());
    for (i, path) in paths.iter().enumerate() {
        let content = std::fs::read(path).map_err(|source| RunError::Read {
            path: path.clone(),
            source,
        })?;
        entries.push((path.to_string_lossy().into_owned(), content));
        progress.report(ProgressEvent::Loading {
            n: i as u64 + 1,
            total,
        });
    }
    Ok(entries)
}

/// Read `paths` and build the corpus on the dispatcher's pool.
pub fn load_corpus<C: Compressor>(
    paths: &[PathBuf],
    dispatcher: &Dispatcher,
    compressor: &C,
    progress: &dyn ProgressReporter,
) -> Result<Corpus> {
    let entries = read_entries(paths, progress)?;
    let corpus = dispatcher
        .build_corpus(entries, compressor)
        .context("Failed to build corpus")?;
    Ok(corpus)
}

//! Pairwise distance engine.
//!
//! # Distance
//!
//! ```text
//! ncd(a, b) = (C(ab) - min(C(a), C(b))) / max(C(a), C(b))
//! ```
//!
//! `C(a)` and `C(b)` are the memoized solo sizes; only `C(ab)` is computed
//! per pair. The value is not clamped: real compressors can push it slightly
//! above `1.0` for unrelated inputs.
//!
//! # Pair rule
//!
//! Each unordered pair is evaluated once, from the task whose identity is
//! strictly less than the counterpart's. A task therefore only discovers
//! neighbors with a greater identity, and the identity-maximal item never
//! finds one.
//!
//! # Selection
//!
//! A task keeps a running `(best_distance, best_neighbor)` starting at
//! `(0.0, None)` and replaces it when a distance is strictly smaller or no
//! neighbor has been chosen yet. Exact ties keep the candidate met first in
//! corpus load order.

use thiserror::Error;

use crate::compress::{CompressError, Compressor};
use crate::corpus::Corpus;
use crate::models::{Item, NeighborResult, PairDistance};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to compress pair ({a}, {b}): {source}")]
    Pair {
        a: String,
        b: String,
        #[source]
        source: CompressError,
    },
    #[error("item index {index} out of range for corpus of {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// NCD from a joint size and two solo sizes.
///
/// Returns `0.0` when both solo sizes are zero.
pub fn ncd(joint_size: u64, solo_a: u64, solo_b: u64) -> f64 {
    let min = solo_a.min(solo_b) as f64;
    let max = solo_a.max(solo_b) as f64;
    if max == 0.0 {
        return 0.0;
    }
    (joint_size as f64 - min) / max
}

/// Compress `a ++ b` and derive the NCD.
pub fn pair_distance<C: Compressor>(
    compressor: &C,
    a: &Item,
    b: &Item,
) -> Result<PairDistance, EngineError> {
    let joint_size = compressor
        .compressed_len_chain(&[&a.content, &b.content])
        .map_err(|source| EngineError::Pair {
            a: a.identity.clone(),
            b: b.identity.clone(),
            source,
        })?;
    Ok(PairDistance {
        joint_size,
        ncd: ncd(joint_size, a.solo_size, b.solo_size),
    })
}

/// Every pair the task for `index` is allowed to evaluate, in load order.
///
/// Returns `(counterpart_index, ncd)` for each counterpart whose identity is
/// strictly greater than the item's own.
pub fn candidate_pairs<C: Compressor>(
    corpus: &Corpus,
    compressor: &C,
    index: usize,
) -> Result<Vec<(usize, f64)>, EngineError> {
    let a = item_at(corpus, index)?;
    let mut pairs = Vec::new();
    for (j, b) in corpus.items().iter().enumerate() {
        if a.identity < b.identity {
            pairs.push((j, pair_distance(compressor, a, b)?.ncd));
        }
    }
    Ok(pairs)
}

/// Nearest neighbor of the item at `index` under the ascending pair rule.
pub fn nearest_neighbor<C: Compressor>(
    corpus: &Corpus,
    compressor: &C,
    index: usize,
) -> Result<NeighborResult, EngineError> {
    let a = item_at(corpus, index)?;
    let mut best_distance = 0.0;
    let mut best: Option<&Item> = None;

    for b in corpus.items() {
        if a.identity < b.identity {
            let d = pair_distance(compressor, a, b)?.ncd;
            if d < best_distance || best.is_none() {
                best_distance = d;
                best = Some(b);
            }
        }
    }

    Ok(NeighborResult {
        identity: a.identity.clone(),
        neighbor: best.map(|b| b.identity.clone()),
        distance: best_distance,
    })
}

fn item_at(corpus: &Corpus, index: usize) -> Result<&Item, EngineError> {
    corpus.get(index).ok_or(EngineError::IndexOutOfRange {
        index,
        len: corpus.len(),
    })
}

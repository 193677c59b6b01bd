//! Core data models shared by the engine, dispatcher, and reducer.

use serde::Serialize;

/// One unit of the corpus.
///
/// `solo_size` is computed once when the corpus is built and never
/// recomputed; items are never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Item {
    /// Stable, totally ordered key (the discovered path string).
    pub identity: String,
    /// Raw payload.
    pub content: Vec<u8>,
    /// Compressed length of `content` alone.
    pub solo_size: u64,
}

/// Joint compressed size of a pair and the NCD derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairDistance {
    pub joint_size: u64,
    pub ncd: f64,
}

/// Nearest-neighbor outcome for one item.
///
/// `neighbor` is `None` when no eligible counterpart exists; `distance` is
/// then `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborResult {
    pub identity: String,
    pub neighbor: Option<String>,
    pub distance: f64,
}

/// A reduced row handed to report output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub identity: String,
    pub neighbor: String,
    pub distance: f64,
}

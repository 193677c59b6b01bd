//! Parallel dispatcher.
//!
//! Maps the engine over every item of a [`Corpus`] on a bounded rayon
//! thread pool. The corpus is shared by reference; tasks never write to it.
//! Results are collected in corpus order, so the output is the same for any
//! worker count.
//!
//! The first task that fails aborts the whole run: a partial result set is
//! never returned.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use thiserror::Error;

use crate::compress::Compressor;
use crate::corpus::{Corpus, CorpusError};
use crate::engine::{self, EngineError};
use crate::models::NeighborResult;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("worker pool size must be at least 1")]
    NoWorkers,
    #[error("failed to start worker pool: {0}")]
    Pool(#[from] ThreadPoolBuildError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// How pair evaluations are turned into per-item neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairPolicy {
    /// A pair only informs the endpoint with the smaller identity.
    #[default]
    Ascending,
    /// A pair informs both endpoints. Same number of compressions.
    Symmetric,
}

/// Number of logical CPUs, or 1 if it cannot be determined.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Bounded worker pool running one nearest-neighbor task per item.
pub struct Dispatcher {
    pool: ThreadPool,
    workers: usize,
    policy: PairPolicy,
}

impl Dispatcher {
    pub fn new(workers: usize, policy: PairPolicy) -> Result<Self, DispatchError> {
        if workers == 0 {
            return Err(DispatchError::NoWorkers);
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("ncd-worker-{}", i))
            .build()?;
        Ok(Self {
            pool,
            workers,
            policy,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn policy(&self) -> PairPolicy {
        self.policy
    }

    /// Build a corpus on this pool, so solo sizes use the same workers.
    pub fn build_corpus<C: Compressor>(
        &self,
        entries: Vec<(String, Vec<u8>)>,
        compressor: &C,
    ) -> Result<Corpus, CorpusError> {
        self.pool.install(|| Corpus::build(entries, compressor))
    }

    pub fn run<C: Compressor>(
        &self,
        corpus: &Corpus,
        compressor: &C,
    ) -> Result<Vec<NeighborResult>, DispatchError> {
        self.run_with_progress(corpus, compressor, |_, _| {})
    }

    /// Like [`Dispatcher::run`], calling `on_task(done, total)` after each
    /// task finishes. Calls arrive from worker threads in completion order.
    pub fn run_with_progress<C, F>(
        &self,
        corpus: &Corpus,
        compressor: &C,
        on_task: F,
    ) -> Result<Vec<NeighborResult>, DispatchError>
    where
        C: Compressor,
        F: Fn(usize, usize) + Sync,
    {
        let total = corpus.len();
        let done = AtomicUsize::new(0);
        let tick = || {
            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            on_task(n, total);
        };

        match self.policy {
            PairPolicy::Ascending => self.pool.install(|| {
                (0..total)
                    .into_par_iter()
                    .map(|i| {
                        let result = engine::nearest_neighbor(corpus, compressor, i);
                        tick();
                        result
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(DispatchError::from)
            }),
            PairPolicy::Symmetric => {
                let pairs = self.pool.install(|| {
                    (0..total)
                        .into_par_iter()
                        .map(|i| {
                            let result = engine::candidate_pairs(corpus, compressor, i);
                            tick();
                            result
                        })
                        .collect::<Result<Vec<_>, _>>()
                })?;
                Ok(symmetrize(corpus, &pairs))
            }
        }
    }
}

/// Offer every evaluated pair to both endpoints.
///
/// Smaller distance wins; an exact tie goes to the counterpart with the
/// smaller load index, matching the single-task scan.
fn symmetrize(corpus: &Corpus, pairs: &[Vec<(usize, f64)>]) -> Vec<NeighborResult> {
    let mut best: Vec<Option<(usize, f64)>> = vec![None; corpus.len()];

    for (i, row) in pairs.iter().enumerate() {
        for &(j, d) in row {
            offer(&mut best[i], j, d);
            offer(&mut best[j], i, d);
        }
    }

    corpus
        .items()
        .iter()
        .zip(best)
        .map(|(item, slot)| match slot {
            Some((j, d)) => NeighborResult {
                identity: item.identity.clone(),
                neighbor: Some(corpus.items()[j].identity.clone()),
                distance: d,
            },
            None => NeighborResult {
                identity: item.identity.clone(),
                neighbor: None,
                distance: 0.0,
            },
        })
        .collect()
}

fn offer(slot: &mut Option<(usize, f64)>, other: usize, distance: f64) {
    let replace = match *slot {
        None => true,
        Some((current, best)) => distance < best || (distance == best && other < current),
    };
    if replace {
        *slot = Some((other, distance));
    }
}

//! # ncd-nn Core
//!
//! Filesystem-free logic for nearest-neighbor search under the Normalized
//! Compression Distance: data models, the compression oracle, the pairwise
//! distance engine, the parallel dispatcher, and the result reducer.
//!
//! The calling application is responsible for discovering and reading
//! files; this crate starts from `(identity, content)` pairs.
//!
//! ```rust
//! use ncd_nn_core::compress::{Codec, CodecKind};
//! use ncd_nn_core::corpus::Corpus;
//! use ncd_nn_core::dispatch::{Dispatcher, PairPolicy};
//! use ncd_nn_core::reduce::reduce;
//!
//! let codec = Codec::new(CodecKind::Zstd, Some(3)).unwrap();
//! let corpus = Corpus::build(
//!     vec![
//!         ("a.txt".to_string(), b"aaaa".to_vec()),
//!         ("b.txt".to_string(), b"aaab".to_vec()),
//!     ],
//!     &codec,
//! )
//! .unwrap();
//! let dispatcher = Dispatcher::new(2, PairPolicy::Ascending).unwrap();
//! let results = dispatcher.run(&corpus, &codec).unwrap();
//! let rows = reduce(results);
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].neighbor, "b.txt");
//! ```

pub mod compress;
pub mod corpus;
pub mod dispatch;
pub mod engine;
pub mod models;
pub mod reduce;

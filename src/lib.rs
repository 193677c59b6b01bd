//! # ncd-nn
//!
//! Nearest-neighbor search over a text corpus using the Normalized
//! Compression Distance (NCD).
//!
//! Every file is compressed alone once; every unordered pair is compressed
//! jointly once; each file is assigned the counterpart with the smallest
//! distance. Pair work is spread across a bounded worker pool.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌─────────────────────┐   ┌──────────┐
//! │   Scan   │──▶│  Loader  │──▶│ Dispatcher (rayon)  │──▶│  Report  │
//! │ walkdir  │   │ solo C(x)│   │ engine per item     │   │ text/json│
//! └──────────┘   └──────────┘   └─────────────────────┘   └──────────┘
//! ```
//!
//! The algorithmic pieces (oracle, engine, dispatcher, reducer) live in the
//! `ncd-nn-core` crate; this crate adds filesystem access, configuration,
//! progress output, and the CLI.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`cli`] | Command-line flags |
//! | [`config`] | TOML configuration and flag merging |
//! | [`error`] | Run error taxonomy |
//! | [`scan`] | Directory walk and extension filter |
//! | [`loader`] | File contents → corpus |
//! | [`progress`] | Progress reporting |
//! | [`report`] | Report rendering and writing |
//! | [`run`] | Pipeline orchestration |

pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod progress;
pub mod report;
pub mod run;
pub mod scan;

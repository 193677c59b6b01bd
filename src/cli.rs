//! Command-line surface.
//!
//! Parsing only. Defaults that depend on a config file are applied in
//! [`crate::config::resolve`]; usage text and exit codes are decided in
//! `main`.

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use ncd_nn_core::compress::CodecKind;

use crate::progress::ProgressMode;
use crate::report::ReportFormat;

/// Nearest-neighbor search over a text corpus using Normalized Compression
/// Distance.
///
/// Every file under the data directory is compressed alone and paired with
/// every other file; each file's closest counterpart is written to the
/// report, ordered by ascending distance.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ncd-nn",
    version,
    about = "Nearest-neighbor search over text files using Normalized Compression Distance",
    long_about = "For each file in a corpus, finds the file with the smallest Normalized \
    Compression Distance, (C(ab) - min(C(a), C(b))) / max(C(a), C(b)), where C is the \
    compressed size. Pairs are evaluated once, from the file with the smaller path; results \
    are written one per line as `<file> , <neighbor> : <distance>`."
)]
pub struct Cli {
    /// Emit progress messages on standard output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Worker pool size. Defaults to the number of logical CPUs.
    #[arg(short = 'n', long = "nproc", value_name = "NUM")]
    pub nproc: Option<usize>,

    /// Corpus root directory. Defaults to `data/`.
    #[arg(short, long, value_name = "DIR")]
    pub datadir: Option<PathBuf>,

    /// Report output path. Defaults to `nn-report.txt`.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Comma-separated extension allow-list, case-insensitive (e.g. `.txt,.md`).
    /// An empty list disables filtering. Defaults to `.txt`.
    #[arg(short, long, value_name = ".a,.b")]
    pub extensions: Option<String>,

    /// Optional TOML configuration file. Command-line flags override it.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Glob (relative to the data directory) of files to skip. Repeatable.
    #[arg(short = 'x', long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Compressor used as the information-content proxy.
    #[arg(long, value_name = "zstd|bzip2|deflate", value_parser = parse_codec)]
    pub compressor: Option<CodecKind>,

    /// Compression level (zstd: 1-22, bzip2: 1-9, deflate: 0-9).
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub level: Option<i32>,

    /// Offer every evaluated pair to both files, so every file gets a neighbor.
    #[arg(long)]
    pub symmetric: bool,

    /// Report format.
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub format: Option<ReportFormat>,

    /// Progress style. `-v` alone selects `human`.
    #[arg(long, value_enum, value_name = "MODE")]
    pub progress: Option<ProgressMode>,

    /// Follow symbolic links while walking the data directory.
    #[arg(long)]
    pub follow_symlinks: bool,
}

impl Cli {
    /// Effective progress mode.
    pub fn progress_mode(&self) -> ProgressMode {
        match (self.progress, self.verbose) {
            (Some(mode), _) => mode,
            (None, true) => ProgressMode::Human,
            (None, false) => ProgressMode::Off,
        }
    }
}

/// One-line usage string, printed alongside configuration errors.
pub fn usage() -> String {
    Cli::command().render_usage().to_string()
}

fn parse_codec(s: &str) -> Result<CodecKind, String> {
    s.parse::<CodecKind>().map_err(|e| e.to_string())
}

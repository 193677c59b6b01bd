//! Run configuration.
//!
//! Settings come from three layers, highest precedence first: command-line
//! flags, an optional TOML file (`--config`), and built-in defaults.
//!
//! ```toml
//! [corpus]
//! datadir = "data/"
//! extensions = [".txt"]
//! exclude_globs = []
//! follow_symlinks = false
//!
//! [compression]
//! codec = "zstd"
//! level = 19
//!
//! [run]
//! nproc = 8
//! symmetric = false
//!
//! [report]
//! output = "nn-report.txt"
//! format = "text"
//! ```
//!
//! Every key is optional. All validation happens in [`resolve`], before any
//! file in the corpus is touched; failures are [`RunError::Config`] or
//! [`RunError::MissingDataDir`].

use std::path::{Path, PathBuf};

use ncd_nn_core::compress::{Codec, CodecKind};
use ncd_nn_core::dispatch::{default_workers, PairPolicy};
use serde::Deserialize;

use crate::cli::Cli;
use crate::error::RunError;
use crate::progress::ProgressMode;
use crate::report::ReportFormat;
use crate::scan::{self, ScanOptions};

pub const DEFAULT_DATADIR: &str = "data/";
pub const DEFAULT_OUTPUT: &str = "nn-report.txt";
pub const DEFAULT_EXTENSIONS: &[&str] = &[".txt"];

/// Contents of the TOML configuration file.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub compression: CompressionConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CorpusConfig {
    pub datadir: Option<PathBuf>,
    pub extensions: Option<Vec<String>>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CompressionConfig {
    pub codec: Option<CodecKind>,
    pub level: Option<i32>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RunConfig {
    pub nproc: Option<usize>,
    #[serde(default)]
    pub symmetric: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReportConfig {
    pub output: Option<PathBuf>,
    pub format: Option<ReportFormat>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub scan: ScanOptions,
    pub codec: Codec,
    pub nproc: usize,
    pub policy: PairPolicy,
    pub output: PathBuf,
    pub format: ReportFormat,
    pub progress: ProgressMode,
}

pub fn load_config(path: &Path) -> Result<FileConfig, RunError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        RunError::config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;
    toml::from_str(&content).map_err(|e| {
        RunError::config(format!(
            "Failed to parse config file {}: {}",
            path.display(),
            e
        ))
    })
}

/// Merge CLI flags over the file config and validate the result.
pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Settings, RunError> {
    let datadir = cli
        .datadir
        .clone()
        .or(file.corpus.datadir)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATADIR));
    let root = scan::resolve_root(&datadir)?;
    if !root.is_dir() {
        return Err(RunError::config(format!(
            "data directory is not a directory: {}",
            root.display()
        )));
    }

    let extensions = match (&cli.extensions, &file.corpus.extensions) {
        (Some(list), _) => scan::parse_extensions(list),
        (None, Some(list)) => scan::normalize_extensions(list.iter().map(String::as_str)),
        (None, None) => scan::normalize_extensions(DEFAULT_EXTENSIONS.iter().copied()),
    };

    let mut exclude_globs = file.corpus.exclude_globs;
    exclude_globs.extend(cli.exclude.iter().cloned());

    let nproc = cli
        .nproc
        .or(file.run.nproc)
        .unwrap_or_else(default_workers);
    if nproc == 0 {
        return Err(RunError::config("nproc must be >= 1"));
    }

    let kind = cli.compressor.or(file.compression.codec).unwrap_or_default();
    let level = cli.level.or(file.compression.level);
    let codec = Codec::new(kind, level).map_err(|e| RunError::config(e.to_string()))?;

    let policy = if cli.symmetric || file.run.symmetric {
        PairPolicy::Symmetric
    } else {
        PairPolicy::Ascending
    };

    Ok(Settings {
        scan: ScanOptions {
            root,
            extensions,
            exclude_globs,
            follow_symlinks: cli.follow_symlinks || file.corpus.follow_symlinks,
        },
        codec,
        nproc,
        policy,
        output: cli
            .output
            .clone()
            .or(file.report.output)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
        format: cli.format.or(file.report.format).unwrap_or_default(),
        progress: cli.progress_mode(),
    })
}

/// Load the file named by `--config` (if any) and resolve settings.
pub fn settings_from_cli(cli: &Cli) -> Result<Settings, RunError> {
    let file = match &cli.config {
        Some(path) => load_config(path)?,
        None => FileConfig::default(),
    };
    resolve(cli, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ncd-nn").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().to_str().unwrap();
        let s = resolve(&cli(&["-d", dir]), FileConfig::default()).unwrap();
        assert_eq!(s.scan.extensions, vec![".txt"]);
        assert_eq!(s.output, PathBuf::from("nn-report.txt"));
        assert_eq!(s.format, ReportFormat::Text);
        assert_eq!(s.policy, PairPolicy::Ascending);
        assert_eq!(s.codec, Codec::default());
        assert_eq!(s.nproc, default_workers());
        assert_eq!(s.progress, ProgressMode::Off);
    }

    #[test]
    fn test_missing_datadir_is_config_error() {
        let err = resolve(&cli(&["-d", "/no/such/ncd/dir"]), FileConfig::default()).unwrap_err();
        assert!(matches!(err, RunError::MissingDataDir(_)));
        assert!(err.is_config());
    }

    #[test]
    fn test_datadir_must_be_directory() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let err = resolve(&cli(&["-d", file.to_str().unwrap()]), FileConfig::default())
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_zero_nproc_rejected() {
        let tmp = TempDir::new().unwrap();
        let err = resolve(
            &cli(&["-d", tmp.path().to_str().unwrap(), "-n", "0"]),
            FileConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("nproc"));
    }

    #[test]
    fn test_invalid_level_rejected() {
        let tmp = TempDir::new().unwrap();
        let err = resolve(
            &cli(&["-d", tmp.path().to_str().unwrap(), "--level", "40"]),
            FileConfig::default(),
        )
        .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_empty_extension_list_disables_filter() {
        let tmp = TempDir::new().unwrap();
        let s = resolve(
            &cli(&["-d", tmp.path().to_str().unwrap(), "-e", ""]),
            FileConfig::default(),
        )
        .unwrap();
        assert!(s.scan.extensions.is_empty());
    }

    #[test]
    fn test_file_config_and_cli_precedence() {
        let tmp = TempDir::new().unwrap();
        let data = tmp.path().join("corpus");
        fs::create_dir_all(&data).unwrap();
        let config_path = tmp.path().join("ncd.toml");
        fs::write(
            &config_path,
            format!(
                r#"[corpus]
datadir = "{}"
extensions = [".MD", "txt"]
exclude_globs = ["drafts/**"]

[compression]
codec = "zstd"
level = 5

[run]
nproc = 3
symmetric = true

[report]
output = "from-file.txt"
format = "json"
"#,
                data.display().to_string().replace('\\', "\\\\")
            ),
        )
        .unwrap();
        let file = load_config(&config_path).unwrap();

        let s = resolve(&cli(&["-x", "tmp/**"]), file.clone()).unwrap();
        assert_eq!(s.scan.root, data);
        assert_eq!(s.scan.extensions, vec![".md", ".txt"]);
        assert_eq!(s.scan.exclude_globs, vec!["drafts/**", "tmp/**"]);
        assert_eq!(s.codec, Codec::new(CodecKind::Zstd, Some(5)).unwrap());
        assert_eq!(s.nproc, 3);
        assert_eq!(s.policy, PairPolicy::Symmetric);
        assert_eq!(s.output, PathBuf::from("from-file.txt"));
        assert_eq!(s.format, ReportFormat::Json);

        let s = resolve(
            &cli(&["-n", "1", "-o", "cli.txt", "--format", "text", "-e", ".txt"]),
            file,
        )
        .unwrap();
        assert_eq!(s.nproc, 1);
        assert_eq!(s.output, PathBuf::from("cli.txt"));
        assert_eq!(s.format, ReportFormat::Text);
        assert_eq!(s.scan.extensions, vec![".txt"]);
    }

    #[test]
    fn test_unparsable_config_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "[run]\nnproc = \"lots\"\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_missing_config_file() {
        let err = load_config(Path::new("/no/such/ncd.toml")).unwrap_err();
        assert!(err.is_config());
    }
}

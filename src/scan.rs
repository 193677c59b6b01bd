//! Filesystem discovery.
//!
//! Walks the data directory and returns the files that pass the extension
//! allow-list and the exclude globs, sorted by path so load order does not
//! depend on the platform's directory iteration order.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::error::RunError;

/// What to walk and what to keep.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub root: PathBuf,
    /// Normalized extensions (lower case, leading dot). Empty keeps all.
    pub extensions: Vec<String>,
    pub exclude_globs: Vec<String>,
    pub follow_symlinks: bool,
}

/// Return `root` if it exists, else its `~`-expanded form if that exists.
pub fn resolve_root(root: &Path) -> Result<PathBuf, RunError> {
    if root.exists() {
        return Ok(root.to_path_buf());
    }
    let expanded = expand_tilde(root);
    if expanded.is_dir() {
        return Ok(expanded);
    }
    Err(RunError::MissingDataDir(root.to_path_buf()))
}

/// Expand `~` at the start of a path to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if s.starts_with("~/") || s == "~" {
        if let Some(home) = home_dir() {
            return home.join(s.strip_prefix("~/").unwrap_or(""));
        }
    }
    path.to_path_buf()
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Normalize a comma-separated extension list.
///
/// Entries are trimmed, lower-cased, and given a leading dot; empty entries
/// are dropped.
pub fn parse_extensions(list: &str) -> Vec<String> {
    normalize_extensions(list.split(','))
}

pub fn normalize_extensions<'a>(entries: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for entry in entries {
        let e = entry.trim().to_lowercase();
        if e.is_empty() || e == "." {
            continue;
        }
        let e = if e.starts_with('.') { e } else { format!(".{}", e) };
        if !out.contains(&e) {
            out.push(e);
        }
    }
    out
}

/// True if `path`'s extension is in `extensions` (or the list is empty).
///
/// A file name with only a leading dot (`.bashrc`) has no extension.
pub fn matches_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    match path.extension() {
        Some(ext) => {
            let ext = format!(".{}", ext.to_string_lossy().to_lowercase());
            extensions.contains(&ext)
        }
        None => false,
    }
}

/// Walk `opts.root` and return matching regular files, sorted by path.
pub fn scan_files(opts: &ScanOptions) -> Result<Vec<PathBuf>, RunError> {
    let exclude_set = build_globset(&opts.exclude_globs)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(&opts.root).follow_links(opts.follow_symlinks) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !matches_extension(path, &opts.extensions) {
            continue;
        }

        let relative = path.strip_prefix(&opts.root).unwrap_or(path);
        if exclude_set.is_match(relative) {
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, RunError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| RunError::config(format!("invalid exclude glob '{}': {}", pattern, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| RunError::config(format!("invalid exclude globs: {}", e)))
}

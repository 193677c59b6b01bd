//! Report output.
//!
//! The text format is one line per row, no header:
//!
//! ```text
//! <file> , <neighbor> : <distance>
//! ```
//!
//! with the distance printed to six decimal places. The JSON format wraps
//! the same rows with the corpus size.

use std::path::Path;

use clap::ValueEnum;
use ncd_nn_core::models::Neighbor;
use serde::{Deserialize, Serialize};

use crate::error::RunError;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    items: usize,
    neighbors: &'a [Neighbor],
}

pub fn render_text(rows: &[Neighbor]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&format!(
            "{} , {} : {:.6}\n",
            row.identity, row.neighbor, row.distance
        ));
    }
    out
}

pub fn render_json(rows: &[Neighbor], items: usize) -> Result<String, serde_json::Error> {
    let mut json = serde_json::to_string_pretty(&JsonReport {
        items,
        neighbors: rows,
    })?;
    json.push('\n');
    Ok(json)
}

/// Render `rows` and write them to `path`, creating parent directories.
pub fn write_report(
    path: &Path,
    format: ReportFormat,
    rows: &[Neighbor],
    items: usize,
) -> Result<(), RunError> {
    let body = match format {
        ReportFormat::Text => render_text(rows),
        ReportFormat::Json => render_json(rows, items).map_err(|e| RunError::Write {
            path: path.to_path_buf(),
            source: e.into(),
        })?,
    };

    let io_err = |source| RunError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    std::fs::write(path, body).map_err(io_err)
}

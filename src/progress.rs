//! Run progress reporting.
//!
//! Reports what is being scanned, how many files have been loaded, the
//! corpus and pool a comparison runs on, and how many nearest-neighbor
//! tasks have finished. Progress goes to **stdout**
//! and only when asked for (`-v`); errors go to stderr from `main`.
//!
//! Comparing events arrive from worker threads, so reporters are
//! `Send + Sync` and write whole lines under the stdout lock.

use std::io::Write;
use std::path::PathBuf;

use clap::ValueEnum;

/// A single progress event.
#[derive(Clone, Debug)]
pub enum ProgressEvent {
    /// Walking the data directory. Total unknown.
    Discovering { root: PathBuf },
    /// `n` of `total` files read into memory.
    Loading { n: u64, total: u64 },
    /// Corpus built (solo sizes computed); comparison about to start.
    Loaded {
        items: u64,
        bytes: u64,
        workers: u64,
        codec: String,
        symmetric: bool,
    },
    /// `n` of `total` nearest-neighbor tasks finished.
    Comparing { n: u64, total: u64 },
    /// Report written.
    Finished { rows: u64, output: PathBuf },
}

/// Receives progress events from the run pipeline.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress: "comparing  1,234 / 5,000 files".
///
/// When stdout is a terminal, counters rewrite a single line; otherwise
/// every event is a separate line.
pub struct HumanProgress {
    in_place: bool,
}

impl HumanProgress {
    pub fn new() -> Self {
        Self {
            in_place: atty::is(atty::Stream::Stdout),
        }
    }
}

impl Default for HumanProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for HumanProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::Discovering { root } => {
                format!("discovering files under {}\n", root.display())
            }
            ProgressEvent::Loading { n, total } => {
                counter_line("loading", *n, *total, self.in_place)
            }
            ProgressEvent::Loaded {
                items,
                bytes,
                workers,
                codec,
                symmetric,
            } => loaded_line(*items, *bytes, *workers, codec, *symmetric),
            ProgressEvent::Comparing { n, total } => {
                counter_line("comparing", *n, *total, self.in_place)
            }
            ProgressEvent::Finished { rows, output } => format!(
                "wrote {} rows to {}\n",
                format_number(*rows),
                output.display()
            ),
        };
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(line.as_bytes());
        let _ = out.flush();
    }
}

fn counter_line(phase: &str, n: u64, total: u64, in_place: bool) -> String {
    let body = format!(
        "{:<10} {} / {} files",
        phase,
        format_number(n),
        format_number(total)
    );
    if !in_place {
        return format!("{}\n", body);
    }
    if n >= total {
        format!("\r{}\n", body)
    } else {
        format!("\r{}", body)
    }
}

fn loaded_line(items: u64, bytes: u64, workers: u64, codec: &str, symmetric: bool) -> String {
    format!(
        "loaded {} files ({} bytes); {} on {} workers{}\n",
        format_number(items),
        format_number(bytes),
        codec,
        workers,
        if symmetric { ", symmetric" } else { "" }
    )
}

/// Machine-readable progress: one JSON object per line on stdout.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let obj = match &event {
            ProgressEvent::Discovering { root } => serde_json::json!({
                "event": "progress",
                "phase": "discovering",
                "root": root.display().to_string()
            }),
            ProgressEvent::Loading { n, total } => serde_json::json!({
                "event": "progress",
                "phase": "loading",
                "n": n,
                "total": total
            }),
            ProgressEvent::Loaded {
                items,
                bytes,
                workers,
                codec,
                symmetric,
            } => serde_json::json!({
                "event": "progress",
                "phase": "loaded",
                "items": items,
                "bytes": bytes,
                "workers": workers,
                "codec": codec,
                "symmetric": symmetric
            }),
            ProgressEvent::Comparing { n, total } => serde_json::json!({
                "event": "progress",
                "phase": "comparing",
                "n": n,
                "total": total
            }),
            ProgressEvent::Finished { rows, output } => serde_json::json!({
                "event": "finished",
                "rows": rows,
                "output": output.display().to_string()
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut out = std::io::stdout().lock();
            let _ = writeln!(out, "{}", line);
            let _ = out.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode: off, human, or JSON.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(HumanProgress::new()),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

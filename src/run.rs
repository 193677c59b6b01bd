//! Run orchestration.
//!
//! Coordinates the full flow: scan → load → parallel nearest-neighbor →
//! reduce → report. Any failure aborts the run before the report is
//! written, so a report on disk is always complete.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ncd_nn_core::dispatch::{Dispatcher, PairPolicy};
use ncd_nn_core::reduce::reduce;

use crate::config::Settings;
use crate::loader;
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::report;
use crate::scan;

/// Counts from a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Files loaded into the corpus.
    pub items: usize,
    /// Rows written to the report.
    pub rows: usize,
    pub output: PathBuf,
}

pub fn run(settings: &Settings, progress: &dyn ProgressReporter) -> Result<RunSummary> {
    progress.report(ProgressEvent::Discovering {
        root: settings.scan.root.clone(),
    });
    let paths = scan::scan_files(&settings.scan)?;

    let dispatcher = Dispatcher::new(settings.nproc, settings.policy)
        .context("Failed to start worker pool")?;

    let corpus = loader::load_corpus(&paths, &dispatcher, &settings.codec, progress)?;
    progress.report(ProgressEvent::Loaded {
        items: corpus.len() as u64,
        bytes: corpus.content_bytes(),
        workers: dispatcher.workers() as u64,
        codec: format!("{}-{}", settings.codec.kind(), settings.codec.level()),
        symmetric: dispatcher.policy() == PairPolicy::Symmetric,
    });

    let results = dispatcher
        .run_with_progress(&corpus, &settings.codec, |n, total| {
            progress.report(ProgressEvent::Comparing {
                n: n as u64,
                total: total as u64,
            })
        })
        .context("Nearest-neighbor search failed")?;

    let rows = reduce(results);
    report::write_report(&settings.output, settings.format, &rows, corpus.len())?;

    progress.report(ProgressEvent::Finished {
        rows: rows.len() as u64,
        output: settings.output.clone(),
    });

    Ok(RunSummary {
        items: corpus.len(),
        rows: rows.len(),
        output: settings.output.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::config::{resolve, FileConfig};
    use crate::progress::NoProgress;
    use clap::Parser;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn settings(data: &std::path::Path, out: &std::path::Path, extra: &[&str]) -> Settings {
        let mut args = vec![
            "ncd-nn".to_string(),
            "-d".to_string(),
            data.display().to_string(),
            "-o".to_string(),
            out.display().to_string(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        resolve(&Cli::try_parse_from(args).unwrap(), FileConfig::default()).unwrap()
    }

    fn abc_corpus() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let data = tmp.path().join("data");
        fs::create_dir_all(&data).unwrap();
        fs::write(data.join("A.txt"), "aaaa").unwrap();
        fs::write(data.join("B.txt"), "aaab").unwrap();
        fs::write(data.join("C.txt"), "zzzz").unwrap();
        tmp
    }

    fn rows(report: &str) -> Vec<(String, String, f64)> {
        report
            .lines()
            .map(|line| {
                let (pair, dist) = line.rsplit_once(" : ").unwrap();
                let (a, b) = pair.split_once(" , ").unwrap();
                (a.to_string(), b.to_string(), dist.parse().unwrap())
            })
            .collect()
    }

    #[test]
    fn test_abc_scenario() {
        let tmp = abc_corpus();
        let data = tmp.path().join("data");
        let out = tmp.path().join("nn-report.txt");

        let summary = run(&settings(&data, &out, &[]), &NoProgress).unwrap();
        assert_eq!(summary.items, 3);
        assert_eq!(summary.rows, 2);

        let report = fs::read_to_string(&out).unwrap();
        let rows = rows(&report);
        let a = rows.iter().find(|r| r.0.ends_with("A.txt")).unwrap();
        assert!(a.1.ends_with("B.txt"));
        let b = rows.iter().find(|r| r.0.ends_with("B.txt")).unwrap();
        assert!(b.1.ends_with("C.txt"));
        assert!(!rows.iter().any(|r| r.0.ends_with("C.txt")));
        assert!(a.2 <= b.2);
        for pair in rows.windows(2) {
            assert!(pair[0].2 <= pair[1].2);
        }
    }

    #[test]
    fn test_nproc_invariance_and_rerun() {
        let tmp = abc_corpus();
        let data = tmp.path().join("data");
        fs::write(data.join("D.txt"), "aaaazzzz").unwrap();
        fs::write(data.join("E.txt"), "the lazy dog").unwrap();
        let out1 = tmp.path().join("one.txt");
        let outn = tmp.path().join("many.txt");
        let again = tmp.path().join("again.txt");

        run(&settings(&data, &out1, &["-n", "1"]), &NoProgress).unwrap();
        run(&settings(&data, &outn, &["-n", "6"]), &NoProgress).unwrap();
        run(&settings(&data, &again, &["-n", "6"]), &NoProgress).unwrap();

        let one = fs::read(&out1).unwrap();
        assert_eq!(one, fs::read(&outn).unwrap());
        assert_eq!(one, fs::read(&again).unwrap());
    }

    #[test]
    fn test_singleton_empty_report() {
        let tmp = TempDir::new().unwrap();
        let data = tmp.path().join("data");
        fs::create_dir_all(&data).unwrap();
        fs::write(data.join("only.txt"), "solo").unwrap();
        let out = tmp.path().join("r.txt");

        let summary = run(&settings(&data, &out, &[]), &NoProgress).unwrap();
        assert_eq!(summary.items, 1);
        assert_eq!(summary.rows, 0);
        assert_eq!(fs::read_to_string(&out).unwrap(), "");
    }

    #[test]
    fn test_symmetric_includes_every_item() {
        let tmp = abc_corpus();
        let data = tmp.path().join("data");
        let out = tmp.path().join("r.txt");
        let summary = run(&settings(&data, &out, &["--symmetric"]), &NoProgress).unwrap();
        assert_eq!(summary.rows, 3);
    }

    #[test]
    fn test_progress_events_in_phase_order() {
        struct Recorder(Mutex<Vec<&'static str>>);
        impl ProgressReporter for Recorder {
            fn report(&self, event: ProgressEvent) {
                let phase = match event {
                    ProgressEvent::Discovering { .. } => "discovering",
                    ProgressEvent::Loading { .. } => "loading",
                    ProgressEvent::Loaded { .. } => "loaded",
                    ProgressEvent::Comparing { .. } => "comparing",
                    ProgressEvent::Finished { .. } => "finished",
                };
                self.0.lock().unwrap().push(phase);
            }
        }

        let tmp = abc_corpus();
        let data = tmp.path().join("data");
        let out = tmp.path().join("r.txt");
        let recorder = Recorder(Mutex::new(Vec::new()));
        run(&settings(&data, &out, &["-n", "2"]), &recorder).unwrap();

        let phases = recorder.0.into_inner().unwrap();
        assert_eq!(
            phases,
            vec![
                "discovering",
                "loading",
                "loading",
                "loading",
                "loaded",
                "comparing",
                "comparing",
                "comparing",
                "finished"
            ]
        );
    }
}

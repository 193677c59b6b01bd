//! # ncd-nn CLI
//!
//! ```bash
//! ncd-nn                                  # data/ → nn-report.txt
//! ncd-nn -d ~/corpus -e .txt,.md -n 8 -v
//! ncd-nn --config ./ncd.toml --format json -o report.json
//! ```
//!
//! Exit status is 0 on success (including an empty report) and 1 on any
//! error. Usage errors and configuration errors also print usage.

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;

use ncd_nn::cli::{self, Cli};
use ncd_nn::config;
use ncd_nn::error::is_config_error;
use ncd_nn::run;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => {
                    if !e.render().to_string().contains("Usage:") {
                        eprintln!("\n{}", cli::usage());
                    }
                    ExitCode::from(1)
                }
            };
        }
    };

    match run_cli(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            if is_config_error(&err) {
                eprintln!("\n{}", cli::usage());
            }
            ExitCode::from(1)
        }
    }
}

fn run_cli(cli: &Cli) -> anyhow::Result<()> {
    let settings = config::settings_from_cli(cli)?;
    let reporter = settings.progress.reporter();
    run::run(&settings, reporter.as_ref())?;
    Ok(())
}

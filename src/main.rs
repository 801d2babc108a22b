//! Batch converter for Alma acquisitions invoice exports.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use bannerfeed::FeedError;
use bannerfeed::job::{self, RunConfig};

/// Convert an Alma XML invoice export into a Banner CSV feed.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory holding the pending Alma export (exactly one XML file)
    #[arg(long, default_value = ".")]
    export_dir: PathBuf,

    /// Directory the Banner CSV is written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Directory consumed exports are archived to
    #[arg(long, default_value = ".")]
    archive_dir: PathBuf,

    /// Number of archived exports to keep
    #[arg(long, default_value_t = 3)]
    keep: usize,

    /// Write the log to a dated file in this directory instead of stderr
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(log_dir: Option<&Path>, run_date: NaiveDate, verbose: bool) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    match log_dir {
        Some(dir) => {
            let file = std::fs::File::create(dir.join(format!("{}.log", run_date.format("%Y%m%d"))))?;
            builder.with_writer(Arc::new(file)).with_ansi(false).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let run_date = chrono::Local::now().date_naive();

    if let Err(e) = init_logging(args.log_dir.as_deref(), run_date, args.verbose) {
        eprintln!("cannot open log file: {e}");
        return ExitCode::FAILURE;
    }

    let config = RunConfig {
        export_dir: args.export_dir,
        output_dir: args.output_dir,
        archive_dir: args.archive_dir,
        retention: args.keep,
        run_date,
    };

    match job::run(&config) {
        Ok(_) => ExitCode::SUCCESS,
        // An empty export directory is the normal idle state for a scheduled
        // run, not a failure.
        Err(FeedError::InputNotFound { dir }) => {
            warn!(dir = %dir.display(), "no pending export, nothing to do");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "feed run aborted");
            ExitCode::FAILURE
        }
    }
}

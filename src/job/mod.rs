//! Batch run orchestration: export discovery, feed emission, file rotation.
//!
//! One run is strictly sequential: locate the single pending export, parse
//! it, write the dated Banner CSV, archive the consumed export, prune the
//! archive down to the retention count. Failure at any step aborts the run;
//! because the CSV writer flushes and closes on every exit path, a failed run
//! leaves a syntactically valid file truncated at the last written row.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::alma;
use crate::banner;
use crate::core::FeedError;

/// Configuration for one feed run.
///
/// Every path the run touches is explicit; nothing is resolved from ambient
/// process state. `run_date` names the dated output, archive, and log files,
/// and is injectable so tests are deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Directory holding exactly one pending Alma export.
    pub export_dir: PathBuf,
    /// Directory the Banner CSV is written to.
    pub output_dir: PathBuf,
    /// Directory consumed exports are archived to. Keep this separate from
    /// `export_dir`, or the archived copy becomes next run's ambiguous input.
    pub archive_dir: PathBuf,
    /// Number of archived exports to keep.
    pub retention: usize,
    /// Date used for dated file names.
    pub run_date: NaiveDate,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            archive_dir: PathBuf::from("."),
            retention: 3,
            run_date: chrono::Local::now().date_naive(),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// The export file that was consumed.
    pub export: PathBuf,
    /// The CSV file that was produced.
    pub output: PathBuf,
    /// Where the consumed export was moved.
    pub archived_to: PathBuf,
    /// Invoices found in the export.
    pub invoices: usize,
    /// Data rows written to the feed.
    pub rows_written: usize,
    /// Lines dropped by the payment-method filter.
    pub rows_skipped: usize,
}

/// Resolve the single pending export in `dir`.
pub fn find_export(dir: &Path) -> Result<PathBuf, FeedError> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension() == Some(OsStr::new("xml")) {
            candidates.push(path);
        }
    }
    candidates.sort();
    match candidates.len() {
        0 => Err(FeedError::InputNotFound {
            dir: dir.to_path_buf(),
        }),
        1 => Ok(candidates.swap_remove(0)),
        _ => Err(FeedError::AmbiguousInput {
            dir: dir.to_path_buf(),
            candidates: candidates
                .iter()
                .map(|p| {
                    p.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default()
                })
                .collect(),
        }),
    }
}

/// Move a consumed export into the archive under its dated name.
pub fn archive(export: &Path, archive_dir: &Path, run_date: NaiveDate) -> Result<PathBuf, FeedError> {
    let target = archive_dir.join(format!("{}.xml", run_date.format("%Y%m%d")));
    fs::rename(export, &target)?;
    Ok(target)
}

/// Delete archived exports beyond the newest `keep`, oldest first.
///
/// Only `.xml` files are considered, so a shared directory never loses
/// feeds or logs to rotation. Returns the deleted paths.
pub fn prune(archive_dir: &Path, keep: usize) -> Result<Vec<PathBuf>, FeedError> {
    let mut files: Vec<(std::time::SystemTime, PathBuf)> = Vec::new();
    for entry in fs::read_dir(archive_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension() == Some(OsStr::new("xml")) {
            files.push((entry.metadata()?.modified()?, path));
        }
    }
    files.sort();

    let excess = files.len().saturating_sub(keep);
    let mut deleted = Vec::with_capacity(excess);
    for (_, path) in files.drain(..excess) {
        fs::remove_file(&path)?;
        deleted.push(path);
    }
    Ok(deleted)
}

/// Execute one feed run: locate, parse, emit, archive, prune.
pub fn run(config: &RunConfig) -> Result<RunReport, FeedError> {
    let export = find_export(&config.export_dir)?;
    info!(export = %export.display(), "processing Alma export");

    let xml = fs::read_to_string(&export)?;
    let invoices = alma::parse_export(&xml)?;
    let total_lines: usize = invoices.iter().map(|i| i.lines.len()).sum();

    let output = config
        .output_dir
        .join(format!("alma_invoice_{}.csv", config.run_date.format("%Y%m%d")));
    let rows_written = banner::write_feed(&invoices, File::create(&output)?)?;
    let rows_skipped = total_lines - rows_written;

    let archived_to = archive(&export, &config.archive_dir, config.run_date)?;
    for path in prune(&config.archive_dir, config.retention)? {
        info!(file = %path.display(), "pruned archived export");
    }

    info!(
        invoices = invoices.len(),
        rows = rows_written,
        skipped = rows_skipped,
        output = %output.display(),
        "feed complete"
    );

    Ok(RunReport {
        export,
        output,
        archived_to,
        invoices: invoices.len(),
        rows_written,
        rows_skipped,
    })
}

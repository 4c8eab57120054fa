//! Batch orchestration: one exclusive pipeline per input file, fanned out
//! on the blocking thread pool, merged by concatenation in input order.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;
use tracing::{info, warn};

use breathscan_core::{process_one_file, BreathingPause, DetectorConfig};

use crate::output;

/// Whether a failed file aborts the whole batch or is skipped.
///
/// The policy belongs to the orchestrator, not the per-file pipeline:
/// the pipeline always fails the single file and isolates the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ErrorPolicy {
    /// Log the failure and continue with the remaining files.
    Skip,
    /// Stop at the first failed file.
    Abort,
}

pub async fn run(
    input: &Path,
    output_path: &Path,
    config: &DetectorConfig,
    policy: ErrorPolicy,
) -> anyhow::Result<()> {
    let paths = read_path_list(input)?;
    info!(files = paths.len(), input = %input.display(), "starting batch screening");

    let mut workers = Vec::with_capacity(paths.len());
    for path in paths {
        let config = config.clone();
        let worker_path = path.clone();
        workers.push((
            path,
            tokio::task::spawn_blocking(move || process_one_file(&worker_path, &config)),
        ));
    }

    let mut merged: Vec<BreathingPause> = Vec::new();
    for (path, worker) in workers {
        match worker.await.context("file pipeline worker panicked")? {
            Ok(pauses) => {
                info!(path = %path.display(), pauses = pauses.len(), "detected pauses");
                merged.extend(pauses);
            }
            Err(e) => match policy {
                ErrorPolicy::Abort => {
                    return Err(anyhow::Error::new(e))
                        .with_context(|| format!("batch aborted at {}", path.display()));
                }
                ErrorPolicy::Skip => {
                    warn!(path = %path.display(), error = %e, "skipping file after pipeline failure");
                }
            },
        }
    }

    output::write_report(output_path, &merged)?;
    info!(pauses = merged.len(), output = %output_path.display(), "report written");
    Ok(())
}

/// Reads the input path list: header line skipped, first comma-separated
/// column of each row taken as a path, blank rows ignored.
fn read_path_list(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let file =
        File::open(path).with_context(|| format!("cannot open input list {}", path.display()))?;

    let mut paths = Vec::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("cannot read input list {}", path.display()))?;
        if line_no == 0 {
            continue; // header row
        }
        let first = line.split(',').next().unwrap_or("").trim();
        if first.is_empty() {
            continue;
        }
        paths.push(PathBuf::from(first));
    }
    Ok(paths)
}

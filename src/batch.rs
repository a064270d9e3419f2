//! Batch Driver
//!
//! Runs the decode -> repair -> encode -> atomic replace pipeline over many
//! files. Each file is independent: failures are recorded and the batch moves
//! on. Files run concurrently on a dedicated rayon pool.

use log::{debug, error, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use crate::config::Settings;
use crate::discovery::Targets;
use crate::error::{PrismError, Result};
use crate::fill::{fill_transparent, FillReport};
use crate::{codec, writer};

// ============================================================================
// RESULTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Transparent pixels were repainted and the file rewritten
    Repaired,
    /// No opaque/transparent edge; file left alone
    Unchanged,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
    pub report: FillReport,
    /// SHA-256 of the encoded output, when one was produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_sha256: Option<String>,
    /// False for unchanged files and dry runs
    pub written: bool,
}

#[derive(Debug, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: PrismError,
}

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    /// RFC 3339 timestamp of when the batch finished
    pub generated_at: String,
    pub outcomes: Vec<FileOutcome>,
    pub failures: Vec<FileFailure>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.len()
    }

    pub fn repaired(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == FileStatus::Repaired)
            .count()
    }

    pub fn unchanged(&self) -> usize {
        self.succeeded() - self.repaired()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn pixels_modified(&self) -> usize {
        self.outcomes.iter().map(|o| o.report.pixels_modified).sum()
    }

    /// Save the summary as pretty-printed JSON
    pub fn write_report(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// SHA-256 of encoded image bytes as lowercase hex
pub fn hash_bytes(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Repair one file in place
pub fn process_file(path: &Path, settings: &Settings) -> Result<FileOutcome> {
    info!("Processing: {}", path.display());

    let mut buffer = codec::decode(path)?;
    let (width, height) = buffer.dimensions();
    debug!("Dimensions: {}x{}", width, height);

    let report = fill_transparent(&mut buffer, &settings.fill);

    if report.is_noop() {
        info!("No transparency edges detected, skipping {}", path.display());
        return Ok(FileOutcome {
            path: path.to_path_buf(),
            status: FileStatus::Unchanged,
            report,
            output_sha256: None,
            written: false,
        });
    }

    debug!("Collected {} seed points", report.seed_count);
    info!("Replaced {} transparent pixels in {}", report.pixels_modified, path.display());

    let bytes = codec::encode(&buffer)?;
    drop(buffer);
    let output_sha256 = Some(hash_bytes(&bytes));

    let written = if settings.dry_run {
        info!("Dry run, not writing {}", path.display());
        false
    } else {
        writer::atomic_replace(path, &bytes)?;
        true
    };

    Ok(FileOutcome {
        path: path.to_path_buf(),
        status: FileStatus::Repaired,
        report,
        output_sha256,
        written,
    })
}

/// Process every target, collecting outcomes and failures in target order
pub fn run_batch(targets: Targets, settings: &Settings) -> BatchSummary {
    let mut failures: Vec<FileFailure> = targets
        .rejected
        .into_iter()
        .map(|(path, error)| {
            warn!("Skipping invalid or non-PNG file {}: {}", path.display(), error);
            FileFailure { path, error }
        })
        .collect();

    let process_all = || -> Vec<(PathBuf, Result<FileOutcome>)> {
        targets
            .paths
            .par_iter()
            .map(|path| (path.clone(), process_file(path, settings)))
            .collect()
    };

    let results = match rayon::ThreadPoolBuilder::new().num_threads(settings.jobs).build() {
        Ok(pool) => pool.install(process_all),
        Err(e) => {
            warn!("Could not build a {}-thread pool ({}), using the global pool", settings.jobs, e);
            process_all()
        }
    };

    let mut outcomes = Vec::with_capacity(results.len());
    for (path, result) in results {
        match result {
            Ok(outcome) => {
                if outcome.written {
                    info!("Fixed and saved: {}", path.display());
                }
                outcomes.push(outcome);
            }
            Err(e) => {
                error!("Failed to process {}: {}", path.display(), e);
                failures.push(FileFailure { path, error: e });
            }
        }
    }

    BatchSummary {
        generated_at: chrono::Utc::now().to_rfc3339(),
        outcomes,
        failures,
    }
}

// ============================================================================
// TESTS
// ============================================================================

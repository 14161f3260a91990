//! fio result loading
//!
//! Scans a results directory (non-recursively) for `*.json` files and turns
//! each into at most one [`MetricRecord`]. A bad file is logged and skipped;
//! only a directory that cannot be listed at all fails the load.

pub mod documents;

use crate::error::LoadError;
use crate::stats::MetricRecord;
use anyhow::{Context, Result};
use documents::recover_documents;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Load every parseable result in `dir`
///
/// Records come back in file name order. Per-file failures are reported
/// with `warn!` and never abort the load.
pub fn load_results(dir: &Path) -> Result<Vec<MetricRecord>> {
    let files = result_files(dir)?;
    info!("Found {} result files in {}", files.len(), dir.display());

    let mut records = Vec::with_capacity(files.len());
    for path in &files {
        match load_result_file(path) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => warn!("Skipping result file: {}", e),
        }
    }

    info!("Loaded {} records", records.len());
    Ok(records)
}

/// List `*.json` entries directly inside `dir` that are not directories, sorted by path
pub fn result_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read results directory: {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        // Dangling links stay in the list so the read failure gets reported
        let path = entry.path();
        if !path.is_dir() && path.extension().map_or(false, |ext| ext == "json") {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Load one result file
///
/// Returns `Ok(None)` when the file is readable but holds nothing we can
/// turn into a record (no objects, or the latest object has no jobs).
pub fn load_result_file(path: &Path) -> std::result::Result<Option<MetricRecord>, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let identifier = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    parse_result(&identifier, path, &content)
}

/// Build a record from the text of a result file
///
/// The last recovered object is authoritative since fio appends newer runs
/// to the end of the file.
pub fn parse_result(
    identifier: &str,
    path: &Path,
    content: &str,
) -> std::result::Result<Option<MetricRecord>, LoadError> {
    let recovered = recover_documents(content);

    if recovered.objects.is_empty() {
        return match recovered.error {
            Some(source) => Err(LoadError::NoDocuments {
                path: path.to_path_buf(),
                source,
            }),
            None => {
                debug!("{}: no JSON objects, skipping", path.display());
                Ok(None)
            }
        };
    }

    if let Some(ref e) = recovered.error {
        debug!(
            "{}: ignoring trailing data after {} document(s): {}",
            path.display(),
            recovered.objects.len(),
            e
        );
    }

    let Some(document) = recovered.latest() else {
        return Ok(None);
    };

    let Some(job) = document
        .get("jobs")
        .and_then(Value::as_array)
        .and_then(|jobs| jobs.first())
    else {
        debug!("{}: latest document has no jobs, skipping", path.display());
        return Ok(None);
    };

    Ok(Some(MetricRecord::from_job(
        identifier,
        path.display().to_string(),
        job,
    )))
}

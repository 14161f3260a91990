//! JSON output formatting
//!
//! Serializes the complete [`Analysis`] together with the thresholds it was
//! rated against, so downstream tooling can consume every view without
//! scraping the text report. Figures that could not be computed are `null`.

use crate::config::Thresholds;
use crate::stats::aggregator::Analysis;
use crate::Result;
use anyhow::Context;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Top-level JSON document
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    /// RFC 3339 time the report was produced
    pub generated_at: String,
    /// Directory the results were loaded from
    pub results_dir: String,
    pub thresholds: &'a Thresholds,
    #[serde(flatten)]
    pub analysis: &'a Analysis,
}

/// Build the JSON document for an analysis
pub fn build_json_report<'a>(
    results_dir: &Path,
    analysis: &'a Analysis,
    thresholds: &'a Thresholds,
) -> JsonReport<'a> {
    JsonReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        results_dir: results_dir.display().to_string(),
        thresholds,
        analysis,
    }
}

/// Render the report as pretty-printed JSON
pub fn to_json_string(report: &JsonReport<'_>) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize JSON report")
}

/// Write JSON output to file
pub fn write_json_output(output_path: &Path, report: &JsonReport<'_>) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create JSON output: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}

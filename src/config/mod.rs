//! Configuration module
//!
//! Handles CLI argument parsing, the optional TOML configuration file, and
//! validation of the rating thresholds used by the aggregator.

pub mod cli;
pub mod toml;
pub mod validator;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Complete analysis configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Boundaries used to turn derived figures into ratings
///
/// Every comparison is strict (`<`), so a value sitting exactly on a
/// boundary falls into the worse bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// |first→last phase change| below this is "excellent" (percent)
    pub stability_excellent_pct: f64,
    /// |first→last phase change| below this is "good" (percent)
    pub stability_good_pct: f64,
    /// |ratio − 1| below this is excellent fairness
    pub fairness_excellent: f64,
    /// |ratio − 1| below this is good fairness
    pub fairness_good: f64,
    /// Pagecache benefit below this hurts significantly (percent)
    pub benefit_hurts_pct: f64,
    /// Pagecache benefit below this is only modest (percent)
    pub benefit_modest_pct: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            stability_excellent_pct: 1.0,
            stability_good_pct: 5.0,
            fairness_excellent: 0.1,
            fairness_good: 0.5,
            benefit_hurts_pct: -10.0,
            benefit_modest_pct: 10.0,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Report format
    #[serde(default)]
    pub format: OutputFormat,
    /// Write the report here instead of stdout
    pub path: Option<PathBuf>,
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable Markdown report
    #[default]
    Text,
    /// Machine-readable dump of every computed view
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

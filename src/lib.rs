//! fairness-report - Cached vs direct IO analysis of fio results
//!
//! Reads a directory of fio JSON result files produced by the fairness and
//! sequential benchmark drivers, and reports how the page cache changes
//! throughput, how stable each run is across phases, and how fairly two
//! concurrent clients share the device.
//!
//! # Architecture
//!
//! - **Loader**: recovers fio JSON documents (including appended runs) and
//!   extracts a fixed-shape metric record per file
//! - **Classifier**: parses workload, cache mode, client and phase out of
//!   the result file name
//! - **Aggregator**: computes comparisons, stability, fairness, variance
//!   and pagecache benefit as plain data
//! - **Output**: renders the computed analysis as text or JSON

pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod stats;

// Re-export commonly used types
pub use config::Config;
pub use error::LoadError;
pub use stats::aggregator::{analyze, Analysis};
pub use stats::MetricRecord;

/// Result type used throughout fairness-report
pub type Result<T> = anyhow::Result<T>;

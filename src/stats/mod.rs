//! Benchmark metrics
//!
//! A [`MetricRecord`] is the flat, fixed-shape view of one fio result file.
//! Records are built once by the loader and never mutated afterwards.
//!
//! fio reports read and write sides separately. Most of the workloads we
//! analyze are single-direction, so every single-valued view on the record
//! (IOPS, bandwidth, latency) dispatches on the *active direction*: read if
//! any read IOPS were recorded, write otherwise.
//!
//! # Example
//!
//! ```
//! use fairness_report::stats::{Direction, MetricRecord};
//! use serde_json::json;
//!
//! let job = json!({
//!     "write": { "iops": 2500.0, "bw_bytes": 10485760, "lat_ns": { "mean": 400000.0 } }
//! });
//! let record = MetricRecord::from_job("seq_write_direct", "results/seq_write_direct.json", &job);
//!
//! assert_eq!(record.direction(), Direction::Write);
//! assert_eq!(record.iops(), 2500.0);
//! assert_eq!(record.bw_mb_s(), 10.0);
//! assert_eq!(record.latency_avg_us(), 400.0);
//! ```

pub mod aggregator;
pub mod classify;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Bytes per MiB, used to convert fio's `bw_bytes` into MB/s
const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Nanoseconds per microsecond, used to convert fio's `lat_ns` values
const NS_PER_US: f64 = 1000.0;

/// fio's key for the 99th percentile latency bucket
const P99_KEY: &str = "99.000000";

/// IO direction a record's single-valued views report on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Read,
    Write,
}

/// Metrics extracted from one fio result file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// File stem of the result file, drives classification
    pub identifier: String,
    /// Where the record was loaded from
    pub source_path: String,

    pub read_iops: f64,
    pub write_iops: f64,
    pub total_iops: f64,
    /// Active-direction IOPS minimum
    pub iops_min: f64,
    /// Active-direction IOPS maximum
    pub iops_max: f64,
    /// Active-direction IOPS standard deviation
    pub iops_stddev: f64,

    pub read_bw_mb_s: f64,
    pub write_bw_mb_s: f64,
    pub total_bw_mb_s: f64,

    pub read_latency_avg_us: f64,
    pub write_latency_avg_us: f64,
    pub read_latency_p99_us: f64,
    pub write_latency_p99_us: f64,
}

impl MetricRecord {
    /// Build a record from one element of fio's `jobs` array
    ///
    /// Nothing is rejected. Any field that is missing or not a number
    /// becomes 0, and a missing `read`/`write` side is treated as empty.
    pub fn from_job(identifier: impl Into<String>, source_path: impl Into<String>, job: &Value) -> Self {
        let read = side(job, "read");
        let write = side(job, "write");

        let read_iops = number(read, "iops");
        let write_iops = number(write, "iops");

        // min/max/stddev are only meaningful for the side doing the work
        let active = if read_iops > 0.0 { read } else { write };

        let read_bw_bytes = number(read, "bw_bytes");
        let write_bw_bytes = number(write, "bw_bytes");

        Self {
            identifier: identifier.into(),
            source_path: source_path.into(),
            read_iops,
            write_iops,
            total_iops: read_iops + write_iops,
            iops_min: number(active, "iops_min"),
            iops_max: number(active, "iops_max"),
            iops_stddev: number(active, "iops_stddev"),
            read_bw_mb_s: read_bw_bytes / BYTES_PER_MIB,
            write_bw_mb_s: write_bw_bytes / BYTES_PER_MIB,
            total_bw_mb_s: (read_bw_bytes + write_bw_bytes) / BYTES_PER_MIB,
            read_latency_avg_us: latency_mean_ns(read) / NS_PER_US,
            write_latency_avg_us: latency_mean_ns(write) / NS_PER_US,
            read_latency_p99_us: latency_p99_ns(read) / NS_PER_US,
            write_latency_p99_us: latency_p99_ns(write) / NS_PER_US,
        }
    }

    /// Direction the single-valued views report on
    #[inline]
    pub fn direction(&self) -> Direction {
        if self.read_iops > 0.0 {
            Direction::Read
        } else {
            Direction::Write
        }
    }

    /// Active-direction IOPS
    pub fn iops(&self) -> f64 {
        match self.direction() {
            Direction::Read => self.read_iops,
            Direction::Write => self.write_iops,
        }
    }

    /// Active-direction bandwidth in MB/s
    pub fn bw_mb_s(&self) -> f64 {
        match self.direction() {
            Direction::Read => self.read_bw_mb_s,
            Direction::Write => self.write_bw_mb_s,
        }
    }

    /// Active-direction mean latency in microseconds
    pub fn latency_avg_us(&self) -> f64 {
        match self.direction() {
            Direction::Read => self.read_latency_avg_us,
            Direction::Write => self.write_latency_avg_us,
        }
    }

    /// Active-direction p99 latency in microseconds
    pub fn latency_p99_us(&self) -> f64 {
        match self.direction() {
            Direction::Read => self.read_latency_p99_us,
            Direction::Write => self.write_latency_p99_us,
        }
    }
}

/// Percentage change from `base` to `value`, `None` when `base` is 0
///
/// Every derived percentage goes through here so a zero denominator is
/// reported as "not computed" instead of infinity or NaN.
pub fn percent_change(value: f64, base: f64) -> Option<f64> {
    ratio(value - base, base).map(|r| r * 100.0)
}

/// `numerator / denominator`, `None` when the denominator is 0
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let r = numerator / denominator;
    r.is_finite().then_some(r)
}

/// Arithmetic mean, 0 for an empty input
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn side<'a>(job: &'a Value, key: &str) -> Option<&'a Value> {
    job.get(key).filter(|v| v.is_object())
}

fn number(side: Option<&Value>, key: &str) -> f64 {
    side.and_then(|s| s.get(key))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

fn latency_mean_ns(side: Option<&Value>) -> f64 {
    side.and_then(|s| s.pointer("/lat_ns/mean"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

fn latency_p99_ns(side: Option<&Value>) -> f64 {
    side.and_then(|s| s.get("lat_ns"))
        .and_then(|lat| lat.get("percentile"))
        .and_then(|p| p.get(P99_KEY))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

//! Result file naming convention
//!
//! The benchmark drivers name every fio output after the workload it ran:
//!
//! ```text
//! <workload>_cached.json
//! <workload>_direct.json
//! <group>_<cached|direct>_phase<N>.json
//! ```
//!
//! where `<group>` is either a workload name or, in dual-client runs, the
//! literal `client1` / `client2`. This module parses that grammar and
//! nothing more. Names outside it are [`Classification::Unclassified`].

use serde::{Deserialize, Serialize};
use std::fmt;

const PHASE_MARKER: &str = "_phase";

/// Page cache mode a test ran with
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Buffered IO through the page cache
    Cached,
    /// O_DIRECT, bypassing the page cache
    Direct,
}

impl CacheMode {
    pub const ALL: [CacheMode; 2] = [CacheMode::Cached, CacheMode::Direct];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheMode::Cached => "cached",
            CacheMode::Direct => "direct",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "cached" => Some(CacheMode::Cached),
            "direct" => Some(CacheMode::Direct),
            _ => None,
        }
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// What a result file's name says about the test it holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    /// One run of a workload in one cache mode
    Simple { workload: &'a str, mode: CacheMode },
    /// One phase of a multi-phase run
    Phased {
        group: &'a str,
        mode: CacheMode,
        phase: &'a str,
    },
    /// Not a result name we understand
    Unclassified,
}

/// Classify a result identifier (file stem)
///
/// Names containing `_phase` are always treated as phased, even if they
/// also end in a cache mode suffix.
///
/// # Examples
///
/// ```
/// use fairness_report::stats::classify::{classify, CacheMode, Classification};
///
/// assert_eq!(
///     classify("client1_cached_phase2"),
///     Classification::Phased { group: "client1", mode: CacheMode::Cached, phase: "phase2" }
/// );
/// assert_eq!(
///     classify("seq_read_d32_direct"),
///     Classification::Simple { workload: "seq_read_d32", mode: CacheMode::Direct }
/// );
/// assert_eq!(classify("summary"), Classification::Unclassified);
/// ```
pub fn classify(identifier: &str) -> Classification<'_> {
    if identifier.contains(PHASE_MARKER) {
        return classify_phased(identifier);
    }

    match identifier.rsplit_once('_') {
        Some((workload, suffix)) if !workload.is_empty() => match CacheMode::from_token(suffix) {
            Some(mode) => Classification::Simple { workload, mode },
            None => Classification::Unclassified,
        },
        _ => Classification::Unclassified,
    }
}

/// `<group>_<mode>_<phase>`, the group may itself contain underscores
fn classify_phased(identifier: &str) -> Classification<'_> {
    let Some((rest, phase)) = identifier.rsplit_once('_') else {
        return Classification::Unclassified;
    };
    let Some((group, mode_token)) = rest.rsplit_once('_') else {
        return Classification::Unclassified;
    };
    let Some(mode) = CacheMode::from_token(mode_token) else {
        return Classification::Unclassified;
    };
    if group.is_empty() || phase.is_empty() {
        return Classification::Unclassified;
    }

    Classification::Phased { group, mode, phase }
}

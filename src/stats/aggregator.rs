//! Result aggregation
//!
//! Turns the flat list of [`MetricRecord`]s into every derived view the
//! report needs. Aggregation is a pure function of the records and the
//! rating thresholds: nothing here prints, and nothing is mutated once the
//! [`Analysis`] is built.
//!
//! # Views
//!
//! - **Workload comparisons**: cached vs direct deltas for simple workloads
//! - **Phase groups**: group → cache mode → phase → record
//! - **Stability ranking**: first vs last phase IOPS change per series
//! - **Fairness**: client1 vs client2 average IOPS ratio per cache mode
//! - **Intra-phase variance**: coefficient of variation per phase
//! - **Pagecache benefit**: cached vs direct average IOPS per group
//! - **Category summaries and extremes** over the workload comparisons
//!
//! Any figure whose denominator is 0 is `None` ("not computed").
//!
//! # Example
//!
//! ```
//! use fairness_report::config::Thresholds;
//! use fairness_report::stats::MetricRecord;
//! use fairness_report::stats::aggregator::Aggregator;
//! use serde_json::json;
//!
//! let mut aggregator = Aggregator::new(Thresholds::default());
//! aggregator.add_record(MetricRecord::from_job(
//!     "rand_read_direct", "rand_read_direct.json", &json!({ "read": { "iops": 1000.0 } }),
//! ));
//! aggregator.add_record(MetricRecord::from_job(
//!     "rand_read_cached", "rand_read_cached.json", &json!({ "read": { "iops": 1200.0 } }),
//! ));
//!
//! let analysis = aggregator.analyze();
//! assert_eq!(analysis.comparisons.len(), 1);
//! assert_eq!(analysis.comparisons[0].iops_improvement_pct, Some(20.0));
//! ```

use crate::config::Thresholds;
use crate::stats::classify::{classify, CacheMode, Classification};
use crate::stats::{mean, percent_change, ratio, MetricRecord};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

/// Group names that mark a dual-client run
pub const CLIENT1: &str = "client1";
pub const CLIENT2: &str = "client2";

/// Active-direction figures of one record, as shown in the report
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModeMetrics {
    pub iops: f64,
    pub bw_mb_s: f64,
    pub latency_avg_us: f64,
    pub latency_p99_us: f64,
}

impl From<&MetricRecord> for ModeMetrics {
    fn from(record: &MetricRecord) -> Self {
        Self {
            iops: record.iops(),
            bw_mb_s: record.bw_mb_s(),
            latency_avg_us: record.latency_avg_us(),
            latency_p99_us: record.latency_p99_us(),
        }
    }
}

/// The cached and direct runs of one simple workload
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkloadModes {
    pub cached: Option<MetricRecord>,
    pub direct: Option<MetricRecord>,
}

impl WorkloadModes {
    fn slot(&mut self, mode: CacheMode) -> &mut Option<MetricRecord> {
        match mode {
            CacheMode::Cached => &mut self.cached,
            CacheMode::Direct => &mut self.direct,
        }
    }
}

/// Cached vs direct deltas for a workload with both modes present
#[derive(Debug, Clone, Serialize)]
pub struct WorkloadComparison {
    pub workload: String,
    pub cached: ModeMetrics,
    pub direct: ModeMetrics,
    /// (cached − direct) / direct IOPS, percent
    pub iops_improvement_pct: Option<f64>,
    /// (cached − direct) / direct bandwidth, percent
    pub bw_improvement_pct: Option<f64>,
    /// (direct − cached) / direct latency, percent (positive is better)
    pub latency_improvement_pct: Option<f64>,
}

impl WorkloadComparison {
    /// Compare a workload's two modes, `None` unless both are present
    pub fn from_modes(workload: &str, modes: &WorkloadModes) -> Option<Self> {
        let cached = ModeMetrics::from(modes.cached.as_ref()?);
        let direct = ModeMetrics::from(modes.direct.as_ref()?);

        Some(Self {
            workload: workload.to_string(),
            cached,
            direct,
            iops_improvement_pct: percent_change(cached.iops, direct.iops),
            bw_improvement_pct: percent_change(cached.bw_mb_s, direct.bw_mb_s),
            latency_improvement_pct: ratio(
                direct.latency_avg_us - cached.latency_avg_us,
                direct.latency_avg_us,
            )
            .map(|r| r * 100.0),
        })
    }
}

/// Phases of one (group, cache mode) series, ordered by phase id
///
/// Phase ids sort as strings (`phase1 < phase2 < …`).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct PhaseSeries {
    pub phases: BTreeMap<String, MetricRecord>,
}

impl PhaseSeries {
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn get(&self, phase: &str) -> Option<&MetricRecord> {
        self.phases.get(phase)
    }

    /// Mean active-direction IOPS across phases, 0 with no phases
    pub fn average_iops(&self) -> f64 {
        mean(self.phases.values().map(MetricRecord::iops))
    }

    /// First and last phase in sort order, `None` with fewer than two
    pub fn endpoints(&self) -> Option<((&str, &MetricRecord), (&str, &MetricRecord))> {
        if self.phases.len() < 2 {
            return None;
        }
        let (first_id, first) = self.phases.iter().next()?;
        let (last_id, last) = self.phases.iter().next_back()?;
        Some(((first_id.as_str(), first), (last_id.as_str(), last)))
    }
}

/// Phase series of one group, keyed by cache mode
pub type PhaseGroup = BTreeMap<CacheMode, PhaseSeries>;

/// Cached vs direct for a single phase of a phased group
#[derive(Debug, Clone, Serialize)]
pub struct PhaseComparison {
    pub group: String,
    pub phase: String,
    pub cached: Option<ModeMetrics>,
    pub direct: Option<ModeMetrics>,
    /// (cached − direct) / direct IOPS, percent
    pub improvement_pct: Option<f64>,
}

/// Stability rating of a first→last phase change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityRating {
    Excellent,
    Good,
    Poor,
}

impl StabilityRating {
    pub fn from_change(change_pct: f64, t: &Thresholds) -> Self {
        let magnitude = change_pct.abs();
        if magnitude < t.stability_excellent_pct {
            StabilityRating::Excellent
        } else if magnitude < t.stability_good_pct {
            StabilityRating::Good
        } else {
            StabilityRating::Poor
        }
    }
}

impl fmt::Display for StabilityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StabilityRating::Excellent => write!(f, "excellent"),
            StabilityRating::Good => write!(f, "good"),
            StabilityRating::Poor => write!(f, "poor"),
        }
    }
}

/// First vs last phase change of one (group, cache mode) series
#[derive(Debug, Clone, Serialize)]
pub struct StabilityEntry {
    pub group: String,
    pub mode: CacheMode,
    pub first_phase: String,
    pub last_phase: String,
    pub first_iops: f64,
    pub last_iops: f64,
    pub change_pct: f64,
    pub rating: StabilityRating,
}

impl StabilityEntry {
    /// Compute the change for a series, `None` with fewer than two phases
    /// or a zero first-phase IOPS
    pub fn from_series(group: &str, mode: CacheMode, series: &PhaseSeries, t: &Thresholds) -> Option<Self> {
        let ((first_phase, first), (last_phase, last)) = series.endpoints()?;
        let first_iops = first.iops();
        let last_iops = last.iops();
        let change_pct = percent_change(last_iops, first_iops)?;

        Some(Self {
            group: group.to_string(),
            mode,
            first_phase: first_phase.to_string(),
            last_phase: last_phase.to_string(),
            first_iops,
            last_iops,
            change_pct,
            rating: StabilityRating::from_change(change_pct, t),
        })
    }

    pub fn abs_change(&self) -> f64 {
        self.change_pct.abs()
    }
}

/// Fairness rating of a client1/client2 ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FairnessRating {
    Excellent,
    Good,
    Unfair,
}

impl FairnessRating {
    pub fn from_ratio(ratio: f64, t: &Thresholds) -> Self {
        let skew = (ratio - 1.0).abs();
        if skew < t.fairness_excellent {
            FairnessRating::Excellent
        } else if skew < t.fairness_good {
            FairnessRating::Good
        } else {
            FairnessRating::Unfair
        }
    }
}

impl fmt::Display for FairnessRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FairnessRating::Excellent => write!(f, "excellent fairness"),
            FairnessRating::Good => write!(f, "good fairness"),
            FairnessRating::Unfair => write!(f, "unfair"),
        }
    }
}

/// client1 vs client2 average IOPS in one cache mode
#[derive(Debug, Clone, Serialize)]
pub struct FairnessEntry {
    pub mode: CacheMode,
    pub client1_avg_iops: f64,
    pub client2_avg_iops: f64,
    /// client1 / client2, `None` when client2 averaged 0
    pub ratio: Option<f64>,
    pub rating: Option<FairnessRating>,
}

/// Coefficient of variation of one phase record
#[derive(Debug, Clone, Serialize)]
pub struct PhaseVariance {
    pub group: String,
    pub mode: CacheMode,
    pub phase: String,
    pub iops: f64,
    pub iops_stddev: f64,
    /// stddev / iops, percent
    pub cov_pct: f64,
}

/// Rating of a pagecache benefit percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitRating {
    HurtsSignificantly,
    SlightlyDegrades,
    ModestBenefit,
    StrongBenefit,
}

impl BenefitRating {
    pub fn from_benefit(benefit_pct: f64, t: &Thresholds) -> Self {
        if benefit_pct < t.benefit_hurts_pct {
            BenefitRating::HurtsSignificantly
        } else if benefit_pct < 0.0 {
            BenefitRating::SlightlyDegrades
        } else if benefit_pct < t.benefit_modest_pct {
            BenefitRating::ModestBenefit
        } else {
            BenefitRating::StrongBenefit
        }
    }
}

impl fmt::Display for BenefitRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenefitRating::HurtsSignificantly => write!(f, "hurts significantly"),
            BenefitRating::SlightlyDegrades => write!(f, "slightly degrades"),
            BenefitRating::ModestBenefit => write!(f, "modest benefit"),
            BenefitRating::StrongBenefit => write!(f, "strong benefit"),
        }
    }
}

/// Cached vs direct average IOPS of one phased group
#[derive(Debug, Clone, Serialize)]
pub struct PagecacheBenefit {
    pub group: String,
    pub cached_avg_iops: f64,
    pub direct_avg_iops: f64,
    /// (cached − direct) / direct, percent; `None` when direct averaged 0
    pub benefit_pct: Option<f64>,
    pub rating: Option<BenefitRating>,
}

/// Workload name categories used for the insight summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Steady,
    Bursty,
    Reader,
    Writer,
    Depth1,
    Depth32,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Steady,
        Category::Bursty,
        Category::Reader,
        Category::Writer,
        Category::Depth1,
        Category::Depth32,
    ];

    /// Substring a workload name must contain to belong here
    pub fn marker(&self) -> &'static str {
        match self {
            Category::Steady => "steady",
            Category::Bursty => "bursty",
            Category::Reader => "reader",
            Category::Writer => "writer",
            Category::Depth1 => "d1",
            Category::Depth32 => "d32",
        }
    }

    pub fn matches(&self, workload: &str) -> bool {
        workload.contains(self.marker())
    }
}

/// Average IOPS improvement of the comparisons in one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub workloads: usize,
    pub average_iops_improvement_pct: f64,
}

/// A workload and its IOPS improvement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadImprovement {
    pub workload: String,
    pub iops_improvement_pct: f64,
}

/// Best, worst and mean IOPS improvement across all comparisons
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extremes {
    pub best: WorkloadImprovement,
    pub worst: WorkloadImprovement,
    pub overall_average_pct: f64,
}

/// Everything derived from one results directory
#[derive(Debug, Clone, Default, Serialize)]
pub struct Analysis {
    /// Every loaded record, classified or not
    pub records: Vec<MetricRecord>,
    /// Simple workloads by name, including unpaired ones
    pub workloads: BTreeMap<String, WorkloadModes>,
    /// Paired workloads, by workload name
    pub comparisons: Vec<WorkloadComparison>,
    /// Phased records: group → cache mode → phase → record
    pub phases: BTreeMap<String, PhaseGroup>,
    /// Per-phase cached vs direct, by group then phase
    pub phase_comparisons: Vec<PhaseComparison>,
    /// Stability entries, most unstable first
    pub stability: Vec<StabilityEntry>,
    /// client1 vs client2 per cache mode (empty unless both clients ran)
    pub fairness: Vec<FairnessEntry>,
    /// CoV per phase record with nonzero IOPS
    pub variance: Vec<PhaseVariance>,
    /// Pagecache benefit per phased group with both modes
    pub pagecache_benefit: Vec<PagecacheBenefit>,
    /// Category averages, categories without matches omitted
    pub categories: Vec<CategorySummary>,
    pub extremes: Option<Extremes>,
}

impl Analysis {
    /// Both dual-client groups are present
    pub fn is_dual_client(&self) -> bool {
        self.phases.contains_key(CLIENT1) && self.phases.contains_key(CLIENT2)
    }
}

/// Collects records and computes the [`Analysis`]
#[derive(Debug)]
pub struct Aggregator {
    records: Vec<MetricRecord>,
    thresholds: Thresholds,
}

impl Aggregator {
    /// Create an aggregator rating results against `thresholds`
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            records: Vec::new(),
            thresholds,
        }
    }

    pub fn add_record(&mut self, record: MetricRecord) {
        self.records.push(record);
    }

    pub fn num_records(&self) -> usize {
        self.records.len()
    }

    /// Compute every derived view
    pub fn analyze(&self) -> Analysis {
        let t = &self.thresholds;
        let (workloads, phases) = classify_records(&self.records);

        let comparisons = compare_workloads(&workloads);
        let categories = category_summaries(&comparisons);
        let extremes = extremes(&comparisons);

        Analysis {
            records: self.records.clone(),
            phase_comparisons: compare_phases(&phases),
            stability: stability_ranking(&phases, t),
            fairness: fairness(&phases, t),
            variance: intra_phase_variance(&phases),
            pagecache_benefit: pagecache_benefit(&phases, t),
            workloads,
            comparisons,
            phases,
            categories,
            extremes,
        }
    }
}

impl Extend<MetricRecord> for Aggregator {
    fn extend<I: IntoIterator<Item = MetricRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

/// Analyze `records` in one call
pub fn analyze(records: Vec<MetricRecord>, thresholds: Thresholds) -> Analysis {
    let mut aggregator = Aggregator::new(thresholds);
    aggregator.extend(records);
    aggregator.analyze()
}

/// Split records into simple workloads and phase groups
///
/// Unclassified names are dropped. A later record with the same
/// classification replaces an earlier one.
pub fn classify_records(
    records: &[MetricRecord],
) -> (BTreeMap<String, WorkloadModes>, BTreeMap<String, PhaseGroup>) {
    let mut workloads: BTreeMap<String, WorkloadModes> = BTreeMap::new();
    let mut phases: BTreeMap<String, PhaseGroup> = BTreeMap::new();

    for record in records {
        match classify(&record.identifier) {
            Classification::Simple { workload, mode } => {
                *workloads.entry(workload.to_string()).or_default().slot(mode) = Some(record.clone());
            }
            Classification::Phased { group, mode, phase } => {
                phases
                    .entry(group.to_string())
                    .or_default()
                    .entry(mode)
                    .or_default()
                    .phases
                    .insert(phase.to_string(), record.clone());
            }
            Classification::Unclassified => {
                debug!("{}: unrecognised result name, excluded", record.identifier);
            }
        }
    }

    (workloads, phases)
}

/// Comparisons for every workload with both modes, by workload name
pub fn compare_workloads(workloads: &BTreeMap<String, WorkloadModes>) -> Vec<WorkloadComparison> {
    workloads
        .iter()
        .filter_map(|(name, modes)| WorkloadComparison::from_modes(name, modes))
        .collect()
}

/// Cached vs direct for every phase id seen in either mode of each group
pub fn compare_phases(phases: &BTreeMap<String, PhaseGroup>) -> Vec<PhaseComparison> {
    let mut out = Vec::new();

    for (group, modes) in phases {
        let cached = modes.get(&CacheMode::Cached);
        let direct = modes.get(&CacheMode::Direct);

        let phase_ids: BTreeSet<&String> = modes.values().flat_map(|s| s.phases.keys()).collect();

        for phase in phase_ids {
            let c = cached.and_then(|s| s.get(phase)).map(ModeMetrics::from);
            let d = direct.and_then(|s| s.get(phase)).map(ModeMetrics::from);
            let improvement_pct = match (c, d) {
                (Some(c), Some(d)) => percent_change(c.iops, d.iops),
                _ => None,
            };

            out.push(PhaseComparison {
                group: group.clone(),
                phase: phase.clone(),
                cached: c,
                direct: d,
                improvement_pct,
            });
        }
    }

    out
}

/// Stability entries for every series with a computable change,
/// sorted by descending |change|
pub fn stability_ranking(phases: &BTreeMap<String, PhaseGroup>, t: &Thresholds) -> Vec<StabilityEntry> {
    let mut entries: Vec<StabilityEntry> = phases
        .iter()
        .flat_map(|(group, modes)| {
            modes
                .iter()
                .filter_map(move |(mode, series)| StabilityEntry::from_series(group, *mode, series, t))
        })
        .collect();

    // Stable sort keeps group/mode order among equal changes
    entries.sort_by(|a, b| b.abs_change().total_cmp(&a.abs_change()));
    entries
}

/// Fairness per cache mode, empty unless both client groups exist
pub fn fairness(phases: &BTreeMap<String, PhaseGroup>, t: &Thresholds) -> Vec<FairnessEntry> {
    let (Some(client1), Some(client2)) = (phases.get(CLIENT1), phases.get(CLIENT2)) else {
        return Vec::new();
    };

    CacheMode::ALL
        .iter()
        .filter_map(|mode| {
            let c1 = client1.get(mode)?.average_iops();
            let c2 = client2.get(mode)?.average_iops();
            let r = ratio(c1, c2);

            Some(FairnessEntry {
                mode: *mode,
                client1_avg_iops: c1,
                client2_avg_iops: c2,
                ratio: r,
                rating: r.map(|r| FairnessRating::from_ratio(r, t)),
            })
        })
        .collect()
}

/// CoV for every phase record with nonzero active-direction IOPS
///
/// Uses the record's `iops_stddev`, which the loader takes from the active
/// direction.
pub fn intra_phase_variance(phases: &BTreeMap<String, PhaseGroup>) -> Vec<PhaseVariance> {
    let mut out = Vec::new();

    for (group, modes) in phases {
        for (mode, series) in modes {
            for (phase, record) in &series.phases {
                let iops = record.iops();
                let Some(cov) = ratio(record.iops_stddev, iops) else {
                    continue;
                };

                out.push(PhaseVariance {
                    group: group.clone(),
                    mode: *mode,
                    phase: phase.clone(),
                    iops,
                    iops_stddev: record.iops_stddev,
                    cov_pct: cov * 100.0,
                });
            }
        }
    }

    out
}

/// Pagecache benefit for every group with both cache modes
pub fn pagecache_benefit(phases: &BTreeMap<String, PhaseGroup>, t: &Thresholds) -> Vec<PagecacheBenefit> {
    phases
        .iter()
        .filter_map(|(group, modes)| {
            let cached = modes.get(&CacheMode::Cached)?.average_iops();
            let direct = modes.get(&CacheMode::Direct)?.average_iops();
            let benefit_pct = percent_change(cached, direct);

            Some(PagecacheBenefit {
                group: group.clone(),
                cached_avg_iops: cached,
                direct_avg_iops: direct,
                benefit_pct,
                rating: benefit_pct.map(|b| BenefitRating::from_benefit(b, t)),
            })
        })
        .collect()
}

/// Average IOPS improvement per category
///
/// Only comparisons with a computed IOPS improvement count. Categories
/// with no matching workload are left out.
pub fn category_summaries(comparisons: &[WorkloadComparison]) -> Vec<CategorySummary> {
    Category::ALL
        .iter()
        .filter_map(|category| {
            let matching: Vec<f64> = improvements(comparisons)
                .filter(|(name, _)| category.matches(name))
                .map(|(_, pct)| pct)
                .collect();

            if matching.is_empty() {
                return None;
            }

            Some(CategorySummary {
                category: *category,
                workloads: matching.len(),
                average_iops_improvement_pct: mean(matching),
            })
        })
        .collect()
}

/// Best and worst workloads by IOPS improvement, plus the overall mean
///
/// Ties go to the earliest workload in name order.
pub fn extremes(comparisons: &[WorkloadComparison]) -> Option<Extremes> {
    let mut iter = improvements(comparisons);
    let (first_name, first_pct) = iter.next()?;

    let mut best = (first_name, first_pct);
    let mut worst = (first_name, first_pct);
    let mut sum = first_pct;
    let mut count = 1usize;

    for (name, pct) in iter {
        if pct > best.1 {
            best = (name, pct);
        }
        if pct < worst.1 {
            worst = (name, pct);
        }
        sum += pct;
        count += 1;
    }

    Some(Extremes {
        best: WorkloadImprovement {
            workload: best.0.to_string(),
            iops_improvement_pct: best.1,
        },
        worst: WorkloadImprovement {
            workload: worst.0.to_string(),
            iops_improvement_pct: worst.1,
        },
        overall_average_pct: sum / count as f64,
    })
}

fn improvements(comparisons: &[WorkloadComparison]) -> impl Iterator<Item = (&str, f64)> {
    comparisons
        .iter()
        .filter_map(|c| c.iops_improvement_pct.map(|pct| (c.workload.as_str(), pct)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read_record(identifier: &str, iops: f64) -> MetricRecord {
        MetricRecord::from_job(
            identifier,
            format!("{}.json", identifier),
            &json!({ "read": { "iops": iops, "bw_bytes": iops * 4096.0, "lat_ns": { "mean": 100000.0 } } }),
        )
    }

    fn phase_record(identifier: &str, iops: f64, stddev: f64) -> MetricRecord {
        MetricRecord::from_job(
            identifier,
            format!("{}.json", identifier),
            &json!({ "read": { "iops": iops, "iops_stddev": stddev } }),
        )
    }

    fn run(records: Vec<MetricRecord>) -> Analysis {
        analyze(records, Thresholds::default())
    }

    #[test]
    fn test_empty_input() {
        let analysis = run(Vec::new());
        assert!(analysis.records.is_empty());
        assert!(analysis.comparisons.is_empty());
        assert!(analysis.phases.is_empty());
        assert!(analysis.categories.is_empty());
        assert!(analysis.extremes.is_none());
        assert!(!analysis.is_dual_client());
    }

    #[test]
    fn test_workload_pairing_improvement() {
        let analysis = run(vec![read_record("w_direct", 1000.0), read_record("w_cached", 1200.0)]);

        assert_eq!(analysis.comparisons.len(), 1);
        let cmp = &analysis.comparisons[0];
        assert_eq!(cmp.workload, "w");
        assert_eq!(cmp.iops_improvement_pct, Some(20.0));
        assert_eq!(cmp.bw_improvement_pct, Some(20.0));
        assert_eq!(cmp.latency_improvement_pct, Some(0.0));
    }

    #[test]
    fn test_latency_improvement_positive_when_cached_faster() {
        let cached = MetricRecord::from_job(
            "w_cached",
            "w_cached.json",
            &json!({ "read": { "iops": 100.0, "lat_ns": { "mean": 50000.0 } } }),
        );
        let direct = MetricRecord::from_job(
            "w_direct",
            "w_direct.json",
            &json!({ "read": { "iops": 100.0, "lat_ns": { "mean": 200000.0 } } }),
        );

        let analysis = run(vec![cached, direct]);
        assert_eq!(analysis.comparisons[0].latency_improvement_pct, Some(75.0));
    }

    #[test]
    fn test_unpaired_workload_kept_without_comparison() {
        let analysis = run(vec![read_record("lonely_cached", 500.0)]);

        assert_eq!(analysis.workloads.len(), 1);
        assert!(analysis.workloads["lonely"].cached.is_some());
        assert!(analysis.workloads["lonely"].direct.is_none());
        assert!(analysis.comparisons.is_empty());
    }

    #[test]
    fn test_zero_direct_iops_not_computed() {
        let analysis = run(vec![read_record("w_cached", 1200.0), read_record("w_direct", 0.0)]);

        let cmp = &analysis.comparisons[0];
        assert_eq!(cmp.iops_improvement_pct, None);
        assert_eq!(cmp.bw_improvement_pct, None);
        assert_eq!(cmp.latency_improvement_pct, None);
        assert!(analysis.extremes.is_none());
        assert!(analysis.categories.is_empty());
    }

    #[test]
    fn test_bw_and_latency_guarded_independently() {
        let direct = MetricRecord::from_job(
            "steady_reader_direct",
            "steady_reader_direct.json",
            &json!({ "read": { "iops": 1000.0, "bw_bytes": 0 } }),
        );
        let analysis = run(vec![read_record("steady_reader_cached", 1500.0), direct]);

        let cmp = &analysis.comparisons[0];
        assert_eq!(cmp.iops_improvement_pct, Some(50.0));
        assert_eq!(cmp.bw_improvement_pct, None);
        assert_eq!(cmp.latency_improvement_pct, None);

        let steady = analysis
            .categories
            .iter()
            .find(|c| c.category == Category::Steady)
            .unwrap();
        assert_eq!(steady.workloads, 1);
        assert_eq!(steady.average_iops_improvement_pct, 50.0);

        let extremes = analysis.extremes.as_ref().unwrap();
        assert_eq!(extremes.best.workload, "steady_reader");
        assert_eq!(extremes.overall_average_pct, 50.0);
    }

    #[test]
    fn test_unclassified_records_excluded_from_views() {
        let analysis = run(vec![read_record("summary", 1.0), read_record("w_buffered", 1.0)]);

        assert_eq!(analysis.records.len(), 2);
        assert!(analysis.workloads.is_empty());
        assert!(analysis.phases.is_empty());
    }

    #[test]
    fn test_phase_grouping_orders_phases() {
        let analysis = run(vec![
            phase_record("client1_cached_phase2", 900.0, 0.0),
            phase_record("client1_cached_phase1", 1000.0, 0.0),
            phase_record("client1_direct_phase1", 400.0, 0.0),
        ]);

        let group = &analysis.phases["client1"];
        let cached = &group[&CacheMode::Cached];
        let ids: Vec<_> = cached.phases.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["phase1", "phase2"]);
        assert_eq!(group[&CacheMode::Direct].len(), 1);
        assert!(analysis.workloads.is_empty());
    }

    #[test]
    fn test_average_iops() {
        let mut series = PhaseSeries::default();
        assert_eq!(series.average_iops(), 0.0);

        series.phases.insert("phase1".into(), phase_record("a", 1000.0, 0.0));
        series.phases.insert("phase2".into(), phase_record("b", 3000.0, 0.0));
        assert_eq!(series.average_iops(), 2000.0);
    }

    #[test]
    fn test_stability_flat_is_excellent() {
        let analysis = run(vec![
            phase_record("client1_cached_phase1", 1000.0, 0.0),
            phase_record("client1_cached_phase2", 1000.0, 0.0),
        ]);

        assert_eq!(analysis.stability.len(), 1);
        let entry = &analysis.stability[0];
        assert_eq!(entry.change_pct, 0.0);
        assert_eq!(entry.rating, StabilityRating::Excellent);
        assert_eq!(entry.first_phase, "phase1");
        assert_eq!(entry.last_phase, "phase2");
    }

    #[test]
    fn test_stability_needs_two_phases_and_nonzero_first() {
        let analysis = run(vec![
            phase_record("a_cached_phase1", 1000.0, 0.0),
            phase_record("b_direct_phase1", 0.0, 0.0),
            phase_record("b_direct_phase2", 100.0, 0.0),
        ]);

        assert!(analysis.stability.is_empty());
    }

    #[test]
    fn test_stability_ranking_by_abs_change() {
        let analysis = run(vec![
            phase_record("client1_cached_phase1", 1000.0, 0.0),
            phase_record("client1_cached_phase2", 1030.0, 0.0),
            phase_record("client1_direct_phase1", 1000.0, 0.0),
            phase_record("client1_direct_phase2", 900.0, 0.0),
            phase_record("client2_cached_phase1", 1000.0, 0.0),
            phase_record("client2_cached_phase2", 1005.0, 0.0),
        ]);

        let order: Vec<_> = analysis
            .stability
            .iter()
            .map(|e| (e.group.as_str(), e.mode, e.rating))
            .collect();
        assert_eq!(
            order,
            vec![
                ("client1", CacheMode::Direct, StabilityRating::Poor),
                ("client1", CacheMode::Cached, StabilityRating::Good),
                ("client2", CacheMode::Cached, StabilityRating::Excellent),
            ]
        );
        assert!((analysis.stability[0].change_pct + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_stability_compares_first_and_last_sorted_phase() {
        let analysis = run(vec![
            phase_record("w_cached_phase3", 1100.0, 0.0),
            phase_record("w_cached_phase1", 1000.0, 0.0),
            phase_record("w_cached_phase2", 5000.0, 0.0),
        ]);

        let entry = &analysis.stability[0];
        assert_eq!(entry.last_phase, "phase3");
        assert!((entry.change_pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_fairness_unfair_ratio() {
        let analysis = run(vec![
            phase_record("client1_cached_phase1", 1000.0, 0.0),
            phase_record("client2_cached_phase1", 500.0, 0.0),
        ]);

        assert!(analysis.is_dual_client());
        assert_eq!(analysis.fairness.len(), 1);
        let entry = &analysis.fairness[0];
        assert_eq!(entry.mode, CacheMode::Cached);
        assert_eq!(entry.ratio, Some(2.0));
        assert_eq!(entry.rating, Some(FairnessRating::Unfair));
    }

    #[test]
    fn test_fairness_ratings() {
        let t = Thresholds::default();
        assert_eq!(FairnessRating::from_ratio(1.05, &t), FairnessRating::Excellent);
        assert_eq!(FairnessRating::from_ratio(0.95, &t), FairnessRating::Excellent);
        assert_eq!(FairnessRating::from_ratio(1.3, &t), FairnessRating::Good);
        assert_eq!(FairnessRating::from_ratio(0.5, &t), FairnessRating::Unfair);
    }

    #[test]
    fn test_fairness_requires_both_clients_and_mode() {
        let analysis = run(vec![
            phase_record("client1_cached_phase1", 1000.0, 0.0),
            phase_record("client2_direct_phase1", 500.0, 0.0),
        ]);
        assert!(analysis.fairness.is_empty());

        let analysis = run(vec![phase_record("client1_cached_phase1", 1000.0, 0.0)]);
        assert!(analysis.fairness.is_empty());
        assert!(!analysis.is_dual_client());
    }

    #[test]
    fn test_fairness_zero_client2_not_computed() {
        let analysis = run(vec![
            phase_record("client1_direct_phase1", 1000.0, 0.0),
            phase_record("client2_direct_phase1", 0.0, 0.0),
        ]);

        let entry = &analysis.fairness[0];
        assert_eq!(entry.ratio, None);
        assert_eq!(entry.rating, None);
    }

    #[test]
    fn test_intra_phase_variance() {
        let analysis = run(vec![
            phase_record("client1_cached_phase1", 1000.0, 50.0),
            phase_record("client1_cached_phase2", 0.0, 10.0),
        ]);

        assert_eq!(analysis.variance.len(), 1);
        let v = &analysis.variance[0];
        assert_eq!(v.phase, "phase1");
        assert_eq!(v.cov_pct, 5.0);
    }

    #[test]
    fn test_variance_uses_active_side_stddev() {
        let write_phase = MetricRecord::from_job(
            "client2_direct_phase1",
            "client2_direct_phase1.json",
            &json!({ "write": { "iops": 200.0, "iops_stddev": 20.0 } }),
        );
        let analysis = run(vec![write_phase]);

        assert_eq!(analysis.variance[0].cov_pct, 10.0);
    }

    #[test]
    fn test_pagecache_benefit() {
        let analysis = run(vec![
            phase_record("client1_cached_phase1", 1500.0, 0.0),
            phase_record("client1_direct_phase1", 1000.0, 0.0),
            phase_record("client2_cached_phase1", 800.0, 0.0),
            phase_record("client2_direct_phase1", 1000.0, 0.0),
        ]);

        let benefits: Vec<_> = analysis
            .pagecache_benefit
            .iter()
            .map(|b| (b.group.as_str(), b.benefit_pct, b.rating))
            .collect();
        assert_eq!(
            benefits,
            vec![
                ("client1", Some(50.0), Some(BenefitRating::StrongBenefit)),
                ("client2", Some(-20.0), Some(BenefitRating::HurtsSignificantly)),
            ]
        );
    }

    #[test]
    fn test_pagecache_benefit_zero_direct_not_computed() {
        let analysis = run(vec![
            phase_record("client1_cached_phase1", 1500.0, 0.0),
            phase_record("client1_direct_phase1", 0.0, 0.0),
        ]);

        let b = &analysis.pagecache_benefit[0];
        assert_eq!(b.benefit_pct, None);
        assert_eq!(b.rating, None);
    }

    #[test]
    fn test_benefit_ratings() {
        let t = Thresholds::default();
        assert_eq!(BenefitRating::from_benefit(-10.5, &t), BenefitRating::HurtsSignificantly);
        assert_eq!(BenefitRating::from_benefit(-10.0, &t), BenefitRating::SlightlyDegrades);
        assert_eq!(BenefitRating::from_benefit(-0.1, &t), BenefitRating::SlightlyDegrades);
        assert_eq!(BenefitRating::from_benefit(0.0, &t), BenefitRating::ModestBenefit);
        assert_eq!(BenefitRating::from_benefit(10.0, &t), BenefitRating::StrongBenefit);
    }

    #[test]
    fn test_stability_ratings_boundaries() {
        let t = Thresholds::default();
        assert_eq!(StabilityRating::from_change(-0.99, &t), StabilityRating::Excellent);
        assert_eq!(StabilityRating::from_change(1.0, &t), StabilityRating::Good);
        assert_eq!(StabilityRating::from_change(-4.9, &t), StabilityRating::Good);
        assert_eq!(StabilityRating::from_change(5.0, &t), StabilityRating::Poor);
    }

    #[test]
    fn test_phase_comparisons_union_of_phases() {
        let analysis = run(vec![
            phase_record("mix_cached_phase1", 1500.0, 0.0),
            phase_record("mix_direct_phase1", 1000.0, 0.0),
            phase_record("mix_direct_phase2", 1000.0, 0.0),
        ]);

        assert_eq!(analysis.phase_comparisons.len(), 2);
        let p1 = &analysis.phase_comparisons[0];
        assert_eq!(p1.phase, "phase1");
        assert_eq!(p1.improvement_pct, Some(50.0));
        let p2 = &analysis.phase_comparisons[1];
        assert_eq!(p2.phase, "phase2");
        assert!(p2.cached.is_none());
        assert_eq!(p2.improvement_pct, None);
    }

    fn categorized() -> Vec<MetricRecord> {
        vec![
            read_record("steady_1g_reader_d1_cached", 1500.0),
            read_record("steady_1g_reader_d1_direct", 1000.0),
            read_record("bursty_16g_writer_d32_cached", 900.0),
            read_record("bursty_16g_writer_d32_direct", 1000.0),
            read_record("steady_1g_writer_d32_cached", 1300.0),
            read_record("steady_1g_writer_d32_direct", 1000.0),
        ]
    }

    #[test]
    fn test_category_summaries() {
        let analysis = run(categorized());

        let summary: Vec<_> = analysis
            .categories
            .iter()
            .map(|c| (c.category, c.workloads))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Category::Steady, 2),
                (Category::Bursty, 1),
                (Category::Reader, 1),
                (Category::Writer, 2),
                (Category::Depth1, 1),
                (Category::Depth32, 2),
            ]
        );

        let steady = &analysis.categories[0];
        assert!((steady.average_iops_improvement_pct - 40.0).abs() < 1e-9);
        let writer = &analysis.categories[3];
        assert!((writer.average_iops_improvement_pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_categories_omitted() {
        let analysis = run(vec![read_record("rand_read_cached", 2.0), read_record("rand_read_direct", 1.0)]);
        assert!(analysis.categories.is_empty());
        assert!(analysis.extremes.is_some());
    }

    #[test]
    fn test_category_summaries_idempotent() {
        let analysis = run(categorized());
        assert_eq!(category_summaries(&analysis.comparisons), analysis.categories);
        assert_eq!(
            category_summaries(&analysis.comparisons),
            category_summaries(&analysis.comparisons)
        );
    }

    #[test]
    fn test_extremes() {
        let analysis = run(categorized());
        let extremes = analysis.extremes.unwrap();

        assert_eq!(extremes.best.workload, "steady_1g_reader_d1");
        assert!((extremes.best.iops_improvement_pct - 50.0).abs() < 1e-9);
        assert_eq!(extremes.worst.workload, "bursty_16g_writer_d32");
        assert!((extremes.worst.iops_improvement_pct + 10.0).abs() < 1e-9);
        assert!((extremes.overall_average_pct - 70.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_later_duplicate_replaces_earlier() {
        let analysis = run(vec![
            read_record("w_cached", 100.0),
            read_record("w_cached", 300.0),
            read_record("w_direct", 100.0),
        ]);
        assert_eq!(analysis.comparisons[0].iops_improvement_pct, Some(200.0));
    }

    #[test]
    fn test_aggregator_accumulates() {
        let mut aggregator = Aggregator::new(Thresholds::default());
        assert_eq!(aggregator.num_records(), 0);

        aggregator.add_record(read_record("w_cached", 1.0));
        aggregator.extend(vec![read_record("w_direct", 1.0)]);
        assert_eq!(aggregator.num_records(), 2);

        let analysis = aggregator.analyze();
        assert_eq!(analysis.records.len(), 2);
        assert_eq!(analysis.comparisons.len(), 1);
    }
}

//! Human-readable text report
//!
//! Renders an [`Analysis`] as a Markdown report. Nothing here computes a
//! figure; every number comes straight from the analysis.

use crate::config::Thresholds;
use crate::stats::aggregator::{
    Analysis, BenefitRating, Category, FairnessRating, ModeMetrics, StabilityEntry, StabilityRating,
    CLIENT1, CLIENT2,
};
use crate::stats::classify::CacheMode;
use std::fmt::{self, Display, Formatter};

const CLIENTS: [&str; 2] = [CLIENT1, CLIENT2];

/// Text report for one analysis
///
/// ```
/// use fairness_report::config::Thresholds;
/// use fairness_report::output::text::TextReport;
/// use fairness_report::stats::aggregator::Analysis;
///
/// let analysis = Analysis::default();
/// let thresholds = Thresholds::default();
/// let report = TextReport::new(&analysis, &thresholds).to_string();
/// assert!(report.contains("No results found!"));
/// ```
pub struct TextReport<'a> {
    analysis: &'a Analysis,
    thresholds: &'a Thresholds,
}

impl<'a> TextReport<'a> {
    pub fn new(analysis: &'a Analysis, thresholds: &'a Thresholds) -> Self {
        Self { analysis, thresholds }
    }

    fn workloads(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let a = self.analysis;
        if a.comparisons.is_empty() {
            return Ok(());
        }

        writeln!(f, "## 📊 WORKLOAD PERFORMANCE COMPARISON")?;
        writeln!(f)?;
        writeln!(f, "{:<20} {:<8} {:<12} {:<10} {:<10}", "Workload", "Mode", "IOPS", "BW(MB/s)", "Lat(μs)")?;
        writeln!(f, "{}", "-".repeat(65))?;

        // Paired workloads only; unpaired ones stay in the JSON report
        for c in &a.comparisons {
            let mut label = c.workload.as_str();
            for (mode, m) in [(CacheMode::Cached, &c.cached), (CacheMode::Direct, &c.direct)] {
                writeln!(
                    f,
                    "{:<20} {:<8} {:<12.0} {:<10.1} {:<10.1}",
                    label, mode, m.iops, m.bw_mb_s, m.latency_avg_us
                )?;
                label = "";
            }

            if let Some(iops) = c.iops_improvement_pct {
                writeln!(
                    f,
                    "{:20} {:<8} {:<+12.1}% {} {}",
                    "",
                    "improve",
                    iops,
                    signed_pct(c.bw_improvement_pct, 9, 1),
                    signed_pct(c.latency_improvement_pct, 9, 1)
                )?;
            }
            writeln!(f, "{}", "-".repeat(65))?;
        }

        Ok(())
    }

    fn insights(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let a = self.analysis;
        let Some(ref extremes) = a.extremes else {
            return Ok(());
        };

        writeln!(f)?;
        writeln!(f, "## 🔍 KEY INSIGHTS")?;
        writeln!(f)?;

        let groups: [(&str, [Category; 2]); 3] = [
            ("By Workload Type", [Category::Steady, Category::Bursty]),
            ("By I/O Pattern", [Category::Reader, Category::Writer]),
            ("By I/O Depth", [Category::Depth1, Category::Depth32]),
        ];
        for (i, (title, categories)) in groups.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "### {}:", title)?;
            for summary in a.categories.iter().filter(|s| categories.contains(&s.category)) {
                writeln!(
                    f,
                    "- **{}:** {:+.1}% average IOPS improvement",
                    category_label(summary.category),
                    summary.average_iops_improvement_pct
                )?;
            }
        }

        writeln!(f)?;
        writeln!(f, "### Performance Extremes:")?;
        writeln!(
            f,
            "- **Best pagecache benefit:** {} ({:+.1}% IOPS)",
            extremes.best.workload, extremes.best.iops_improvement_pct
        )?;
        writeln!(
            f,
            "- **Least pagecache benefit:** {} ({:+.1}% IOPS)",
            extremes.worst.workload, extremes.worst.iops_improvement_pct
        )?;
        writeln!(f, "- **Overall average:** {:+.1}% IOPS improvement", extremes.overall_average_pct)
    }

    fn phases(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let a = self.analysis;
        if a.phases.is_empty() {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "## 🔄 MULTI-PHASE WORKLOAD ANALYSIS")?;
        writeln!(f)?;

        for group in a.phases.keys() {
            writeln!(f, "### {} (Phase-by-Phase)", group)?;
            writeln!(f)?;

            for phase in a.phase_comparisons.iter().filter(|p| &p.group == group) {
                writeln!(f, "**{}:**", phase.phase.to_uppercase())?;
                if let Some(ref m) = phase.cached {
                    phase_metrics(f, m, "Cached:")?;
                }
                if let Some(ref m) = phase.direct {
                    phase_metrics(f, m, "Direct:")?;
                }
                if let Some(pct) = phase.improvement_pct {
                    writeln!(f, "- Improvement: {:+.1}%", pct)?;
                }
                writeln!(f)?;
            }

            // Client groups get the full breakdown in the dual-client section
            if a.is_dual_client() && CLIENTS.contains(&group.as_str()) {
                continue;
            }

            let mut summarized = false;
            for entry in a.stability.iter().filter(|e| &e.group == group) {
                writeln!(
                    f,
                    "- {} stability ({} → {}): {:+.2}% ({})",
                    title_case(entry.mode.as_str()),
                    entry.first_phase,
                    entry.last_phase,
                    entry.change_pct,
                    entry.rating
                )?;
                summarized = true;
            }
            for benefit in a.pagecache_benefit.iter().filter(|b| &b.group == group) {
                match (benefit.benefit_pct, benefit.rating) {
                    (Some(pct), Some(rating)) => {
                        writeln!(f, "- Pagecache benefit (phase average): {:+.2}% ({})", pct, rating)?
                    }
                    _ => writeln!(f, "- Pagecache benefit (phase average): not computed (direct averaged 0 IOPS)")?,
                }
                summarized = true;
            }
            if summarized {
                writeln!(f)?;
            }
        }

        Ok(())
    }

    fn dual_client(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let a = self.analysis;
        if !a.is_dual_client() {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "## ⚖️  DUAL-CLIENT FAIRNESS & STABILITY ANALYSIS")?;
        writeln!(f, "{}", "=".repeat(75))?;

        self.stability(f)?;
        self.fairness(f)?;
        self.variance(f)?;
        self.benefit(f)
    }

    fn stability(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let t = self.thresholds;
        let client_entries: Vec<&StabilityEntry> = self
            .analysis
            .stability
            .iter()
            .filter(|e| CLIENTS.contains(&e.group.as_str()))
            .collect();

        writeln!(f)?;
        writeln!(f, "### Phase Stability Analysis")?;
        writeln!(f, "{}", "-".repeat(75))?;

        for client in CLIENTS {
            for mode in CacheMode::ALL {
                let Some(entry) = client_entries.iter().find(|e| e.group == client && e.mode == mode) else {
                    continue;
                };

                writeln!(f)?;
                writeln!(f, "**{} {}:**", client.to_uppercase(), mode.as_str().to_uppercase())?;
                writeln!(f, "  {}: {:>12} IOPS", title_case(&entry.first_phase), format_number(entry.first_iops))?;
                writeln!(f, "  {}: {:>12} IOPS", title_case(&entry.last_phase), format_number(entry.last_iops))?;
                writeln!(f, "  Change: {:>12.2}%", entry.change_pct)?;
                match entry.rating {
                    StabilityRating::Excellent => writeln!(
                        f,
                        "  ✅ Excellent stability (< {}% variation)",
                        t.stability_excellent_pct
                    )?,
                    StabilityRating::Good => {
                        writeln!(f, "  ✓ Good stability (< {}% variation)", t.stability_good_pct)?
                    }
                    StabilityRating::Poor => {
                        writeln!(f, "  ⚠️  Poor stability (> {}% variation)", t.stability_good_pct)?
                    }
                }
            }
        }

        if client_entries.is_empty() {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "### Stability Ranking (Most Unstable → Most Stable)")?;
        writeln!(f, "{}", "-".repeat(75))?;
        // Already ranked by the aggregator
        for (i, entry) in client_entries.iter().enumerate() {
            let name = format!("{} {}", title_case(&entry.group), title_case(entry.mode.as_str()));
            writeln!(
                f,
                "{}. {} {:25}: {:+7.2}%",
                i + 1,
                stability_marker(entry.rating),
                name,
                entry.change_pct
            )?;
        }

        Ok(())
    }

    fn fairness(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f)?;
        writeln!(f, "### Client Fairness Comparison")?;
        writeln!(f, "{}", "-".repeat(75))?;

        for entry in &self.analysis.fairness {
            writeln!(f)?;
            writeln!(f, "**{} MODE:**", entry.mode.as_str().to_uppercase())?;
            writeln!(f, "  Client1 avg: {:>12} IOPS", format_number(entry.client1_avg_iops))?;
            writeln!(f, "  Client2 avg: {:>12} IOPS", format_number(entry.client2_avg_iops))?;

            let (Some(ratio), Some(rating)) = (entry.ratio, entry.rating) else {
                writeln!(f, "  Ratio:       not computed (client2 averaged 0 IOPS)")?;
                continue;
            };
            writeln!(f, "  Ratio:       {:>12.2}x", ratio)?;
            match rating {
                FairnessRating::Excellent => writeln!(f, "  ✅ Excellent fairness (~1:1 ratio)")?,
                FairnessRating::Good => writeln!(f, "  ✓ Good fairness")?,
                FairnessRating::Unfair => writeln!(f, "  ⚠️  Unfair resource distribution")?,
            }
        }

        Ok(())
    }

    fn variance(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let a = self.analysis;

        writeln!(f)?;
        writeln!(f)?;
        writeln!(f, "### Intra-Phase Variance Analysis")?;
        writeln!(f, "{}", "-".repeat(75))?;
        writeln!(f, "Measures performance consistency WITHIN each phase")?;
        writeln!(f)?;

        for client in CLIENTS {
            let Some(modes) = a.phases.get(client) else {
                continue;
            };

            writeln!(f)?;
            writeln!(f, "**{}:**", client.to_uppercase())?;

            for mode in modes.keys() {
                writeln!(f, "  {}:", title_case(mode.as_str()))?;
                for v in a.variance.iter().filter(|v| v.group == client && v.mode == *mode) {
                    writeln!(
                        f,
                        "    {}: CoV = {:>5.2}% (σ={:>8} IOPS)",
                        v.phase,
                        v.cov_pct,
                        format_number(v.iops_stddev)
                    )?;
                }
            }
        }

        Ok(())
    }

    fn benefit(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f)?;
        writeln!(f, "### Pagecache Benefit Analysis")?;
        writeln!(f, "{}", "-".repeat(75))?;

        for client in CLIENTS {
            let Some(b) = self.analysis.pagecache_benefit.iter().find(|b| b.group == client) else {
                continue;
            };

            writeln!(f)?;
            writeln!(f, "**{}:**", client.to_uppercase())?;
            writeln!(f, "  Cached avg:  {:>12} IOPS", format_number(b.cached_avg_iops))?;
            writeln!(f, "  Direct avg:  {:>12} IOPS", format_number(b.direct_avg_iops))?;
            let (Some(pct), Some(rating)) = (b.benefit_pct, b.rating) else {
                writeln!(f, "  Benefit:     not computed (direct averaged 0 IOPS)")?;
                continue;
            };
            writeln!(f, "  Benefit:     {:>12.2}%", pct)?;
            match rating {
                BenefitRating::HurtsSignificantly => writeln!(f, "  ⚠️  Pagecache HURTS performance significantly")?,
                BenefitRating::SlightlyDegrades => writeln!(f, "  ⚠️  Pagecache slightly degrades performance")?,
                BenefitRating::ModestBenefit => writeln!(f, "  ✓ Modest pagecache benefit")?,
                BenefitRating::StrongBenefit => writeln!(f, "  ✅ Strong pagecache benefit")?,
            }
        }

        Ok(())
    }
}

impl Display for TextReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "# 🎯 FAIRNESS BENCHMARK ANALYSIS")?;
        writeln!(f, "{}", "=".repeat(50))?;

        if self.analysis.records.is_empty() {
            return writeln!(f, "No results found!");
        }

        writeln!(f, "**Total Tests:** {}", self.analysis.records.len())?;
        writeln!(f)?;

        self.workloads(f)?;
        self.insights(f)?;
        self.phases(f)?;
        self.dual_client(f)?;
        writeln!(f)
    }
}

fn phase_metrics(f: &mut Formatter<'_>, m: &ModeMetrics, label: &str) -> fmt::Result {
    writeln!(
        f,
        "- {:<7} {:>10.0} IOPS, {:>7.1} MB/s, {:>7.1}μs avg, {:>7.1}μs p99",
        label, m.iops, m.bw_mb_s, m.latency_avg_us, m.latency_p99_us
    )
}

fn category_label(category: Category) -> &'static str {
    match category {
        Category::Steady => "Steady (1G file)",
        Category::Bursty => "Bursty (16G file)",
        Category::Reader => "Readers",
        Category::Writer => "Writers",
        Category::Depth1 => "Depth=1",
        Category::Depth32 => "Depth=32",
    }
}

fn stability_marker(rating: StabilityRating) -> &'static str {
    match rating {
        StabilityRating::Excellent => "✅",
        StabilityRating::Good => "✓",
        StabilityRating::Poor => "⚠️ ",
    }
}

/// Left-aligned signed percentage, `n/a` when not computed
fn signed_pct(value: Option<f64>, width: usize, precision: usize) -> String {
    match value {
        Some(v) => format!("{:<+width$.precision$}%", v, width = width, precision = precision),
        None => format!("{:<width$}", "n/a", width = width + 1),
    }
}

/// Upper-case the first character
fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Round to a whole number and add thousands separators
fn format_number(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut result = String::new();
    for (count, c) in digits.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    if rounded < 0.0 {
        result.push('-');
    }

    result.chars().rev().collect()
}

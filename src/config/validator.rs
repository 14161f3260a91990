//! Configuration validation

use super::*;
use anyhow::Result;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_thresholds(&config.thresholds)?;
    Ok(())
}

/// Validate rating thresholds
pub fn validate_thresholds(t: &Thresholds) -> Result<()> {
    let all = [
        ("stability_excellent_pct", t.stability_excellent_pct),
        ("stability_good_pct", t.stability_good_pct),
        ("fairness_excellent", t.fairness_excellent),
        ("fairness_good", t.fairness_good),
        ("benefit_hurts_pct", t.benefit_hurts_pct),
        ("benefit_modest_pct", t.benefit_modest_pct),
    ];
    for (name, value) in all {
        if !value.is_finite() {
            anyhow::bail!("{} must be a finite number, got {}", name, value);
        }
    }

    if t.stability_excellent_pct <= 0.0 || t.stability_excellent_pct >= t.stability_good_pct {
        anyhow::bail!(
            "stability thresholds must satisfy 0 < stability_excellent_pct ({}) < stability_good_pct ({})",
            t.stability_excellent_pct,
            t.stability_good_pct
        );
    }

    if t.fairness_excellent <= 0.0 || t.fairness_excellent >= t.fairness_good {
        anyhow::bail!(
            "fairness thresholds must satisfy 0 < fairness_excellent ({}) < fairness_good ({})",
            t.fairness_excellent,
            t.fairness_good
        );
    }

    if t.benefit_hurts_pct >= 0.0 || t.benefit_modest_pct < 0.0 {
        anyhow::bail!(
            "benefit thresholds must satisfy benefit_hurts_pct ({}) < 0 <= benefit_modest_pct ({})",
            t.benefit_hurts_pct,
            t.benefit_modest_pct
        );
    }

    Ok(())
}

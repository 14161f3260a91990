//! fairness-report CLI entry point

use anyhow::{Context, Result};
use fairness_report::config::{self, cli::Cli, Config, OutputFormat};
use fairness_report::loader;
use fairness_report::output::{json, text::TextReport};
use fairness_report::stats::aggregator::{Aggregator, Analysis};
use std::fs;
use tracing::info;

fn main() -> Result<()> {
    // Usage errors exit here, before any file is touched
    let cli = Cli::parse_args();

    init_logging(&cli);

    let config = config::toml::load_config(&cli)?;
    config::validator::validate_config(&config)
        .context("Configuration validation failed")?;

    let records = loader::load_results(&cli.results_dir)?;

    let mut aggregator = Aggregator::new(config.thresholds.clone());
    aggregator.extend(records);
    let analysis = aggregator.analyze();
    info!(
        "Analyzed {} records: {} workload comparisons, {} phase groups",
        analysis.records.len(),
        analysis.comparisons.len(),
        analysis.phases.len()
    );

    emit_report(&cli, &config, &analysis)
}

/// Send log output to stderr so stdout carries only the report
fn init_logging(cli: &Cli) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::new(format!("fairness_report={}", cli.log_level()));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn emit_report(cli: &Cli, config: &Config, analysis: &Analysis) -> Result<()> {
    match config.output.format {
        OutputFormat::Text => {
            let report = TextReport::new(analysis, &config.thresholds).to_string();
            match config.output.path {
                Some(ref path) => {
                    fs::write(path, report)
                        .with_context(|| format!("Failed to write report: {}", path.display()))?;
                    info!("Report written to {}", path.display());
                }
                None => print!("{}", report),
            }
        }
        OutputFormat::Json => {
            let report = json::build_json_report(&cli.results_dir, analysis, &config.thresholds);
            match config.output.path {
                Some(ref path) => {
                    json::write_json_output(path, &report)?;
                    info!("JSON report written to {}", path.display());
                }
                None => println!("{}", json::to_json_string(&report)?),
            }
        }
    }

    Ok(())
}

//! CLI argument parsing using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Markdown report for humans (default)
    Text,
    /// Every computed view as JSON
    Json,
}

/// fairness-report - cached vs direct IO analysis of fio results
#[derive(Parser, Debug)]
#[command(name = "fairness-report")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory containing fio JSON result files
    #[arg(value_name = "RESULTS_DIR")]
    pub results_dir: PathBuf,

    /// TOML file overriding rating thresholds
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report format (overrides the config file)
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<Format>,

    /// Write the report to a file instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parse CLI arguments, exiting with a usage message on error
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Log filter directive for the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_dir_required() {
        let err = Cli::try_parse_from(["fairness-report"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["fairness-report", "results/"]).unwrap();
        assert_eq!(cli.results_dir, PathBuf::from("results/"));
        assert!(cli.config.is_none());
        assert!(cli.format.is_none());
        assert!(cli.output.is_none());
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn test_all_options() {
        let cli = Cli::try_parse_from([
            "fairness-report",
            "--format",
            "json",
            "-c",
            "thresholds.toml",
            "-o",
            "report.json",
            "-vv",
            "out",
        ])
        .unwrap();

        assert_eq!(cli.format, Some(Format::Json));
        assert_eq!(cli.config, Some(PathBuf::from("thresholds.toml")));
        assert_eq!(cli.output, Some(PathBuf::from("report.json")));
        assert_eq!(cli.log_level(), "debug");
    }
}

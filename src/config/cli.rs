//! CLI argument parsing using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecutionMode {
    /// Single estimation run with a fixed worker count
    Run,
    /// Scaling test (default) - one run process per worker count
    Scale,
}

/// piscale - Monte Carlo pi estimation and parallel scaling test
#[derive(Parser, Debug)]
#[command(name = "piscale")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Execution mode: run or scale
    #[arg(long, value_enum, default_value = "scale")]
    pub mode: ExecutionMode,

    /// TOML configuration file (CLI options override its values)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    // === Run Options ===
    /// Total number of samples (e.g., 10M, 500k, 1_000_000)
    #[arg(short = 'n', long)]
    pub samples: Option<String>,

    /// Number of worker threads (run mode)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Base seed; worker i uses seed + i
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the run result as JSON to this path (run mode)
    #[arg(long)]
    pub report: Option<PathBuf>,

    // === Scaling Options ===
    /// Comma-separated worker counts to test (e.g., "1,2,4,8")
    #[arg(long)]
    pub worker_counts: Option<String>,

    /// Per-run time budget (e.g., 600s, 10m)
    #[arg(long)]
    pub timeout: Option<String>,

    /// Program to launch for each run (defaults to this executable)
    #[arg(long)]
    pub program: Option<PathBuf>,

    /// JSON scaling report output file
    #[arg(long)]
    pub json_output: Option<PathBuf>,

    /// CSV scaling table output file
    #[arg(long)]
    pub csv_output: Option<PathBuf>,

    // === Runtime Options ===
    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate CLI arguments
    ///
    /// Only catches misuse visible from the flags alone; value ranges are
    /// checked on the merged configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.mode {
            ExecutionMode::Run => {
                if self.worker_counts.is_some() {
                    anyhow::bail!("--worker-counts only applies to scale mode; use --workers");
                }
                if self.json_output.is_some() || self.csv_output.is_some() {
                    anyhow::bail!(
                        "--json-output/--csv-output only apply to scale mode; use --report"
                    );
                }
            }
            ExecutionMode::Scale => {
                if self.workers.is_some() {
                    anyhow::bail!("--workers only applies to run mode; use --worker-counts");
                }
                if self.report.is_some() {
                    anyhow::bail!("--report only applies to run mode");
                }
            }
        }

        Ok(())
    }
}

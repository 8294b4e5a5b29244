//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;

use crate::harness::{HarnessSettings, DEFAULT_RUN_TIMEOUT, DEFAULT_WORKER_COUNTS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Complete configuration for a run or a scaling test
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub harness: HarnessConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// Parameters of a single estimation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Total samples across all workers
    #[serde(default = "default_samples")]
    pub samples: u64,
    /// Worker count for `--mode run`
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Base seed; worker `i` uses `seed + i`
    #[serde(default)]
    pub seed: u64,
}

fn default_samples() -> u64 {
    10_000_000
}

fn default_workers() -> usize {
    1
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            workers: default_workers(),
            seed: 0,
        }
    }
}

/// Scaling test configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Worker counts to test
    #[serde(default = "default_worker_counts")]
    pub worker_counts: Vec<usize>,
    /// Per-run budget in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Program to launch for each run (defaults to the current executable)
    pub program: Option<PathBuf>,
}

fn default_worker_counts() -> Vec<usize> {
    DEFAULT_WORKER_COUNTS.to_vec()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_RUN_TIMEOUT.as_secs()
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            worker_counts: default_worker_counts(),
            timeout_secs: default_timeout_secs(),
            program: None,
        }
    }
}

impl HarnessConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON run report written by `--mode run`
    pub report: Option<PathBuf>,
    /// JSON scaling report
    pub json_output: Option<PathBuf>,
    /// CSV scaling table
    pub csv_output: Option<PathBuf>,
}

/// Runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Enable debug logging
    #[serde(default)]
    pub debug: bool,
}

impl Config {
    /// Settings for the scaling harness
    pub fn harness_settings(&self) -> HarnessSettings {
        HarnessSettings {
            worker_counts: self.harness.worker_counts.clone(),
            total_samples: self.run.samples,
            seed: self.run.seed,
            timeout: self.harness.timeout(),
        }
    }
}

// Display trait implementations

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration:")?;
        writeln!(f, "  Run: {}", self.run)?;
        writeln!(f, "  Harness: {}", self.harness)?;
        writeln!(f, "  Output: {}", self.output)?;
        Ok(())
    }
}

impl fmt::Display for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "samples={}, workers={}, seed={}",
            self.samples, self.workers, self.seed
        )
    }
}

impl fmt::Display for HarnessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = self
            .worker_counts
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "worker_counts=[{}], timeout={}s", counts, self.timeout_secs)?;
        if let Some(ref program) = self.program {
            write!(f, ", program={}", program.display())?;
        }
        Ok(())
    }
}

impl fmt::Display for OutputConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref path) = self.report {
            parts.push(format!("report={}", path.display()));
        }
        if let Some(ref path) = self.json_output {
            parts.push(format!("json={}", path.display()));
        }
        if let Some(ref path) = self.csv_output {
            parts.push(format!("csv={}", path.display()));
        }
        if parts.is_empty() {
            write!(f, "text only")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.run.samples, 10_000_000);
        assert_eq!(config.run.workers, 1);
        assert_eq!(config.harness.worker_counts, vec![1, 2, 4, 8]);
        assert_eq!(config.harness.timeout(), Duration::from_secs(600));
    }

    #[test]
    fn test_harness_settings() {
        let mut config = Config::default();
        config.run.samples = 5_000;
        config.run.seed = 7;
        config.harness.worker_counts = vec![1, 3];
        config.harness.timeout_secs = 30;

        let settings = config.harness_settings();
        assert_eq!(settings.total_samples, 5_000);
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.worker_counts, vec![1, 3]);
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_display() {
        let text = Config::default().to_string();
        assert!(text.contains("samples=10000000, workers=1, seed=0"));
        assert!(text.contains("worker_counts=[1,2,4,8], timeout=600s"));
        assert!(text.contains("Output: text only"));
    }
}

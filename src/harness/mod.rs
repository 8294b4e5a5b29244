//! Scaling harness
//!
//! Runs the full estimation once per worker count, each run in its own OS
//! process, and derives speedup and efficiency from the reported timings.
//!
//! # Architecture
//!
//! - **ScalingHarness**: control flow and the per-run state machine
//! - **RunLauncher**: the process boundary (`process::ProcessLauncher` in production)
//! - **ReportParser**: timing extraction from captured output (`parser`)
//! - **metrics**: speedup/efficiency derivation and the final report
//!
//! Runs execute strictly one after another so they never compete for CPUs.
//! A failed, unparsable or timed-out run is recorded and the harness moves on
//! to the next worker count; only a test with no successful run at all fails.

pub mod metrics;
pub mod parser;
pub mod process;

use crate::error::PiError;
use crate::stats::RunResult;
use crate::util::time::serde_secs;
use metrics::{derive_rows, efficiency_percent, speedup, Measurement, ScalingReport};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::time::Duration;

/// Default worker counts for a scaling test
pub const DEFAULT_WORKER_COUNTS: [usize; 4] = [1, 2, 4, 8];

/// Default wall-clock budget per run
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(600);

/// State of one attempted run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    Pending,
    Running,
    Succeeded {
        #[serde(rename = "elapsed_secs", with = "serde_secs")]
        elapsed: Duration,
    },
    Failed {
        cause: String,
    },
    TimedOut,
}

impl RunState {
    pub fn is_success(&self) -> bool {
        matches!(self, RunState::Succeeded { .. })
    }

    /// Whether the run has reached a terminal state
    pub fn is_finished(&self) -> bool {
        !matches!(self, RunState::Pending | RunState::Running)
    }
}

/// One worker-count configuration and what happened to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunAttempt {
    pub worker_count: usize,
    #[serde(flatten)]
    pub state: RunState,
}

/// Parameters for a single launched run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchSpec {
    pub worker_count: usize,
    pub total_samples: u64,
    pub seed: u64,
    pub timeout: Duration,
}

/// What a successful run reported
#[derive(Debug, Clone)]
pub struct RunSuccess {
    /// Elapsed time parsed from the run's output
    pub elapsed: Duration,
    /// Structured result, if the run produced a readable report
    pub result: Option<RunResult>,
    /// Captured standard output
    pub output: String,
}

/// Launches one end-to-end run
///
/// Implementations must enforce `spec.timeout` and report `PiError::TimedOut`
/// when it is exceeded.
#[allow(async_fn_in_trait)]
pub trait RunLauncher {
    async fn launch(&self, spec: &LaunchSpec) -> Result<RunSuccess, PiError>;
}

/// Harness settings
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessSettings {
    pub worker_counts: Vec<usize>,
    pub total_samples: u64,
    pub seed: u64,
    pub timeout: Duration,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            worker_counts: DEFAULT_WORKER_COUNTS.to_vec(),
            total_samples: 10_000_000,
            seed: 0,
            timeout: DEFAULT_RUN_TIMEOUT,
        }
    }
}

/// Drives a scaling test through a `RunLauncher`
pub struct ScalingHarness<L> {
    launcher: L,
    settings: HarnessSettings,
}

impl<L: RunLauncher> ScalingHarness<L> {
    pub fn new(launcher: L, settings: HarnessSettings) -> Self {
        Self { launcher, settings }
    }

    /// Run every configuration in ascending worker-count order
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` for zero samples, an empty worker-count list or
    ///   a zero worker count, before anything is launched
    /// - `NoSuccessfulRuns` if every configuration failed
    pub async fn run(&self) -> Result<ScalingReport, PiError> {
        let worker_counts = self.validated_worker_counts()?;

        let mut attempts: Vec<RunAttempt> = worker_counts
            .iter()
            .map(|&worker_count| RunAttempt {
                worker_count,
                state: RunState::Pending,
            })
            .collect();
        let mut measurements: Vec<Measurement> = Vec::new();

        for attempt in attempts.iter_mut() {
            let spec = LaunchSpec {
                worker_count: attempt.worker_count,
                total_samples: self.settings.total_samples,
                seed: self.settings.seed,
                timeout: self.settings.timeout,
            };

            attempt.state = RunState::Running;
            log::info!("Launching run with {} worker(s)", spec.worker_count);
            print!("Running with {} worker(s)... ", spec.worker_count);
            let _ = std::io::stdout().flush();

            attempt.state = match self.launcher.launch(&spec).await {
                Ok(success) => {
                    let measurement = Measurement {
                        worker_count: spec.worker_count,
                        elapsed: success.elapsed,
                        pi_estimate: success.result.as_ref().map(|r| r.pi_estimate),
                    };
                    print_progress_success(&measurement, measurements.first());
                    measurements.push(measurement);
                    RunState::Succeeded {
                        elapsed: success.elapsed,
                    }
                }
                Err(PiError::TimedOut { budget }) => {
                    println!("✗ Timed out after {:.0}s", budget.as_secs_f64());
                    RunState::TimedOut
                }
                Err(PiError::UnparsableOutput { output }) => {
                    println!("✗ Failed");
                    println!(
                        "Could not parse time for {} worker(s); run output:",
                        spec.worker_count
                    );
                    println!("{}", output);
                    RunState::Failed {
                        cause: "unparsable output".to_string(),
                    }
                }
                Err(e) => {
                    println!("✗ Failed ({})", e);
                    RunState::Failed { cause: e.to_string() }
                }
            };
        }

        if measurements.is_empty() {
            return Err(PiError::NoSuccessfulRuns { attempts });
        }

        let rows = derive_rows(&measurements);
        Ok(ScalingReport::new(self.settings.total_samples, rows, attempts))
    }

    /// Sorted, de-duplicated worker counts
    fn validated_worker_counts(&self) -> Result<Vec<usize>, PiError> {
        if self.settings.total_samples == 0 {
            return Err(PiError::invalid("total sample count must be at least 1"));
        }
        if self.settings.worker_counts.is_empty() {
            return Err(PiError::invalid("at least one worker count is required"));
        }
        if self.settings.worker_counts.contains(&0) {
            return Err(PiError::invalid("worker counts must be at least 1"));
        }

        let mut counts = self.settings.worker_counts.clone();
        counts.sort_unstable();
        counts.dedup();

        let cpus = num_cpus::get();
        if let Some(&max) = counts.last() {
            if max > cpus {
                log::warn!(
                    "Largest worker count ({}) exceeds available CPUs ({}); efficiency will drop",
                    max,
                    cpus
                );
            }
        }

        Ok(counts)
    }
}

/// Progress line for a successful run, relative to the baseline seen so far
fn print_progress_success(measurement: &Measurement, baseline: Option<&Measurement>) {
    let baseline = baseline.map(|b| b.elapsed).unwrap_or(measurement.elapsed);
    let speedup = speedup(baseline, measurement.elapsed);
    println!(
        "✓ {:.3}s (speedup: {:.2}x, efficiency: {:.1}%)",
        measurement.elapsed.as_secs_f64(),
        speedup,
        efficiency_percent(speedup, measurement.worker_count)
    );
}

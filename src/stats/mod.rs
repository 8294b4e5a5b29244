//! Run statistics
//!
//! `WorkerResult` is what a single worker reports when it finishes its share.
//! `RunResult` is the reduced view of a whole run: the global inside count,
//! the pi estimate and the run's wall-clock time (its slowest worker).

pub mod aggregator;

use crate::util::time::{calculate_rate, serde_secs};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of one worker's sampling pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerResult {
    /// Index of the worker that produced this result
    pub worker_index: usize,
    /// Number of points the worker drew
    pub samples: u64,
    /// Number of points inside the circle
    pub inside_count: u64,
    /// Time from start-gate release to the end of sampling
    pub elapsed: Duration,
}

/// Reduced result of one end-to-end run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub worker_count: usize,
    pub total_samples: u64,
    pub inside_count: u64,
    pub pi_estimate: f64,
    /// Wall-clock of the run, bounded by its slowest worker
    #[serde(rename = "elapsed_secs", with = "serde_secs")]
    pub elapsed: Duration,
}

impl RunResult {
    /// Points that fell outside the circle
    pub fn outside_count(&self) -> u64 {
        self.total_samples - self.inside_count
    }

    /// Absolute distance between the estimate and pi
    pub fn abs_error(&self) -> f64 {
        (self.pi_estimate - std::f64::consts::PI).abs()
    }

    /// Absolute error as a percentage of pi
    pub fn error_percent(&self) -> f64 {
        self.abs_error() / std::f64::consts::PI * 100.0
    }

    /// Aggregate sampling rate
    pub fn samples_per_sec(&self) -> f64 {
        calculate_rate(self.total_samples, self.elapsed)
    }

    /// Sampling rate normalized by worker count
    pub fn samples_per_sec_per_worker(&self) -> f64 {
        self.samples_per_sec() / self.worker_count as f64
    }
}

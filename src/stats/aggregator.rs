//! Result reduction
//!
//! Combines per-worker results into a single `RunResult`. Inside counts are
//! summed and elapsed times take the maximum, so the reduction is commutative
//! and associative: workers may report in any order.
//!
//! # Example
//!
//! ```
//! use piscale::stats::WorkerResult;
//! use piscale::stats::aggregator::reduce;
//! use std::time::Duration;
//!
//! let results = vec![
//!     WorkerResult {
//!         worker_index: 0,
//!         samples: 50,
//!         inside_count: 30,
//!         elapsed: Duration::from_millis(1000),
//!     },
//!     WorkerResult {
//!         worker_index: 1,
//!         samples: 50,
//!         inside_count: 40,
//!         elapsed: Duration::from_millis(1500),
//!     },
//! ];
//!
//! let run = reduce(&results).unwrap();
//! assert_eq!(run.inside_count, 70);
//! assert_eq!(run.elapsed, Duration::from_millis(1500));
//! assert!((run.pi_estimate - 2.8).abs() < 1e-12);
//! ```

use super::{RunResult, WorkerResult};
use crate::error::PiError;
use std::collections::BTreeMap;
use std::time::Duration;

/// Reduce worker results into a run result
///
/// # Errors
///
/// - `EmptyResultSet` if `results` is empty
/// - `SampleCountZero` if the workers drew no samples in total
pub fn reduce(results: &[WorkerResult]) -> Result<RunResult, PiError> {
    if results.is_empty() {
        return Err(PiError::EmptyResultSet);
    }

    let mut total_samples = 0u64;
    let mut inside_count = 0u64;
    let mut elapsed = Duration::ZERO;

    for result in results {
        debug_assert!(result.inside_count <= result.samples);
        total_samples += result.samples;
        inside_count += result.inside_count;
        elapsed = elapsed.max(result.elapsed);
    }

    if total_samples == 0 {
        return Err(PiError::SampleCountZero);
    }

    Ok(RunResult {
        worker_count: results.len(),
        total_samples,
        inside_count,
        pi_estimate: 4.0 * inside_count as f64 / total_samples as f64,
        elapsed,
    })
}

/// Collects worker results as they arrive and reduces them on demand
///
/// Results are keyed by worker index, so arrival order does not matter and a
/// worker reporting twice replaces its earlier result.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    workers: BTreeMap<usize, WorkerResult>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a worker's result
    pub fn add_worker(&mut self, result: WorkerResult) {
        self.workers.insert(result.worker_index, result);
    }

    /// Number of workers that have reported
    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Result reported by a specific worker
    pub fn worker_result(&self, worker_index: usize) -> Option<&WorkerResult> {
        self.workers.get(&worker_index)
    }

    /// Reported results in worker-index order
    pub fn into_results(self) -> Vec<WorkerResult> {
        self.workers.into_values().collect()
    }
}

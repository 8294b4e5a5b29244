//! Scaling metrics
//!
//! Turns successful (worker count, elapsed) measurements into speedup and
//! efficiency rows. The baseline is the measurement with the smallest worker
//! count, which is not necessarily a single-worker run if that one failed.

use super::RunAttempt;
use crate::util::time::serde_secs;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing of one successful run, as seen by the harness
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub worker_count: usize,
    pub elapsed: Duration,
    /// Estimate from the run's structured report, when available
    pub pi_estimate: Option<f64>,
}

/// One row of the scaling table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingRow {
    pub worker_count: usize,
    #[serde(rename = "elapsed_secs", with = "serde_secs")]
    pub elapsed: Duration,
    pub speedup: f64,
    pub efficiency_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pi_estimate: Option<f64>,
}

/// `baseline / elapsed`
///
/// A zero elapsed time gives an infinite speedup, unless the baseline is
/// also zero, in which case the two runs are considered equal.
pub fn speedup(baseline: Duration, elapsed: Duration) -> f64 {
    if elapsed.is_zero() {
        return if baseline.is_zero() { 1.0 } else { f64::INFINITY };
    }
    baseline.as_secs_f64() / elapsed.as_secs_f64()
}

/// `100 * speedup / worker_count`
pub fn efficiency_percent(speedup: f64, worker_count: usize) -> f64 {
    100.0 * speedup / worker_count as f64
}

/// Derive rows in ascending worker-count order
///
/// Returns an empty table when there are no measurements.
pub fn derive_rows(measurements: &[Measurement]) -> Vec<ScalingRow> {
    let mut sorted = measurements.to_vec();
    sorted.sort_by_key(|m| m.worker_count);

    let Some(baseline) = sorted.first().map(|m| m.elapsed) else {
        return Vec::new();
    };

    sorted
        .iter()
        .map(|m| {
            let speedup = speedup(baseline, m.elapsed);
            ScalingRow {
                worker_count: m.worker_count,
                elapsed: m.elapsed,
                speedup,
                efficiency_percent: efficiency_percent(speedup, m.worker_count),
                pi_estimate: m.pi_estimate,
            }
        })
        .collect()
}

/// Mean efficiency across rows, or `None` for an empty table
pub fn mean_efficiency(rows: &[ScalingRow]) -> Option<f64> {
    if rows.is_empty() {
        return None;
    }
    Some(rows.iter().map(|r| r.efficiency_percent).sum::<f64>() / rows.len() as f64)
}

/// Final output of a scaling test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingReport {
    pub total_samples: u64,
    pub rows: Vec<ScalingRow>,
    /// Every attempted configuration, including failures
    pub attempts: Vec<RunAttempt>,
    pub mean_efficiency_percent: f64,
    pub generated_at: DateTime<Utc>,
    pub host: String,
}

impl ScalingReport {
    /// Build a report from successful rows and all attempts
    pub fn new(total_samples: u64, rows: Vec<ScalingRow>, attempts: Vec<RunAttempt>) -> Self {
        let mean_efficiency_percent = mean_efficiency(&rows).unwrap_or(0.0);
        let host = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            total_samples,
            rows,
            attempts,
            mean_efficiency_percent,
            generated_at: Utc::now(),
            host,
        }
    }
}

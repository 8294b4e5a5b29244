//! Error taxonomy for runs and scaling tests
//!
//! Run-level errors (`WorkerFailure`, `EmptyResultSet`, `SampleCountZero`) abort a
//! single run. Harness-level errors (`UnparsableOutput`, `TimedOut`) mark one
//! configuration as failed and the harness moves on. `NoSuccessfulRuns` is the
//! only terminal harness error.

use std::time::Duration;
use thiserror::Error;

use crate::harness::RunAttempt;

/// Errors produced by the partition/sample/reduce pipeline and the scaling harness
#[derive(Debug, Error)]
pub enum PiError {
    /// Zero workers or zero samples requested
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A worker's sampler invocation failed; the whole run is aborted
    #[error("worker {index} failed: {cause}")]
    WorkerFailure { index: usize, cause: String },

    #[error("cannot reduce an empty result set")]
    EmptyResultSet,

    #[error("total sample count is zero")]
    SampleCountZero,

    /// The run's report did not contain a recognizable timing line
    #[error("could not parse elapsed time from run output")]
    UnparsableOutput { output: String },

    /// The run process could not be started or exited unsuccessfully
    #[error("run failed: {0}")]
    RunFailed(String),

    #[error("run exceeded its time budget of {}s", budget.as_secs_f64())]
    TimedOut { budget: Duration },

    /// Every configuration failed; the attempts are kept for diagnosis
    #[error("no successful runs ({} attempted)", attempts.len())]
    NoSuccessfulRuns { attempts: Vec<RunAttempt> },
}

impl PiError {
    /// Shorthand for building an `InvalidConfiguration` error
    pub fn invalid(msg: impl Into<String>) -> Self {
        PiError::InvalidConfiguration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_failure_message() {
        let err = PiError::WorkerFailure {
            index: 3,
            cause: "sampler exploded".to_string(),
        };
        assert_eq!(err.to_string(), "worker 3 failed: sampler exploded");
    }

    #[test]
    fn test_timed_out_message() {
        let err = PiError::TimedOut {
            budget: Duration::from_secs(600),
        };
        assert_eq!(err.to_string(), "run exceeded its time budget of 600s");
    }

    #[test]
    fn test_no_successful_runs_message() {
        let err = PiError::NoSuccessfulRuns { attempts: vec![] };
        assert_eq!(err.to_string(), "no successful runs (0 attempted)");
    }
}

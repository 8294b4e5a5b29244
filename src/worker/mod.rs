//! Worker implementation
//!
//! A `Worker` owns one `SampleRequest` and a handle to the shared sampler. It
//! blocks on the run's start gate, samples its share, and reports how many
//! points landed inside the circle together with its own elapsed time.
//!
//! Workers share no mutable state. Each one produces exactly one
//! `WorkerResult`, which the coordinator hands to the reducer.
//!
//! # Example
//!
//! ```
//! use piscale::coordinator::gate::StartGate;
//! use piscale::partition::SampleRequest;
//! use piscale::sampler::mock::FixedSampler;
//! use piscale::worker::Worker;
//! use std::sync::Arc;
//!
//! let request = SampleRequest { worker_index: 0, sample_count: 100, seed: 0 };
//! let worker = Worker::new(request, Arc::new(FixedSampler::all_inside()));
//!
//! let gate = StartGate::new(1);
//! gate.open();
//!
//! let result = worker.run(&gate)?.expect("gate was opened");
//! assert_eq!(result.inside_count, 100);
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::coordinator::gate::StartGate;
use crate::partition::SampleRequest;
use crate::sampler::Sampler;
use crate::stats::WorkerResult;
use crate::util::time::{format_duration, Timestamp};
use crate::Result;
use std::sync::Arc;

/// Executes one worker's share of a run
pub struct Worker {
    request: SampleRequest,
    sampler: Arc<dyn Sampler>,
}

impl Worker {
    pub fn new(request: SampleRequest, sampler: Arc<dyn Sampler>) -> Self {
        Self { request, sampler }
    }

    /// Index of the worker within its run
    pub fn index(&self) -> usize {
        self.request.worker_index
    }

    /// Wait for the start gate, then sample
    ///
    /// Returns `Ok(None)` if the gate was aborted before opening, in which
    /// case no sampling happens.
    ///
    /// # Errors
    ///
    /// Propagates the sampler's error.
    pub fn run(self, gate: &StartGate) -> Result<Option<WorkerResult>> {
        if !gate.arrive_and_wait() {
            log::debug!("Worker {}: start gate aborted", self.request.worker_index);
            return Ok(None);
        }

        let start = Timestamp::now();
        let inside_count = self.sampler.sample(self.request.sample_count, self.request.seed)?;
        let elapsed = start.elapsed();

        if inside_count > self.request.sample_count {
            anyhow::bail!(
                "sampler '{}' reported {} inside points for {} samples",
                self.sampler.name(),
                inside_count,
                self.request.sample_count
            );
        }

        log::debug!(
            "Worker {}: {} / {} inside in {}",
            self.request.worker_index,
            inside_count,
            self.request.sample_count,
            format_duration(elapsed)
        );

        Ok(Some(WorkerResult {
            worker_index: self.request.worker_index,
            samples: self.request.sample_count,
            inside_count,
            elapsed,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::mock::{FailingSampler, FixedSampler};
    use crate::sampler::Sampler;

    fn request(worker_index: usize, sample_count: u64, seed: u64) -> SampleRequest {
        SampleRequest { worker_index, sample_count, seed }
    }

    fn open_gate() -> StartGate {
        let gate = StartGate::new(1);
        gate.open();
        gate
    }

    #[test]
    fn test_worker_reports_share() {
        let worker = Worker::new(request(3, 40, 0), Arc::new(FixedSampler::with_ratio(1, 2)));
        assert_eq!(worker.index(), 3);

        let result = worker.run(&open_gate()).unwrap().unwrap();
        assert_eq!(result.worker_index, 3);
        assert_eq!(result.samples, 40);
        assert_eq!(result.inside_count, 20);
    }

    #[test]
    fn test_worker_propagates_sampler_error() {
        let worker = Worker::new(request(0, 10, 5), Arc::new(FailingSampler::on_seeds(vec![5])));
        assert!(worker.run(&open_gate()).is_err());
    }

    #[test]
    fn test_worker_skips_on_abort() {
        let gate = StartGate::new(1);
        gate.abort();

        let worker = Worker::new(request(0, 10, 0), Arc::new(FixedSampler::all_inside()));
        assert!(worker.run(&gate).unwrap().is_none());
    }

    struct OvercountingSampler;

    impl Sampler for OvercountingSampler {
        fn sample(&self, count: u64, _seed: u64) -> Result<u64> {
            Ok(count + 1)
        }

        fn name(&self) -> &'static str {
            "overcounting"
        }
    }

    #[test]
    fn test_worker_rejects_impossible_count() {
        let worker = Worker::new(request(0, 10, 0), Arc::new(OvercountingSampler));
        assert!(worker.run(&open_gate()).is_err());
    }
}

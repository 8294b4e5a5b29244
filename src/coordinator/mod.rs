//! Coordinator module
//!
//! Runs one worker thread per sample request and enforces the two
//! synchronization points of a run:
//!
//! 1. **Start gate**: every worker is spawned and parked before any of them
//!    samples, so early workers get no head start.
//! 2. **Completion gate**: the run ends only when every worker has reported
//!    a result or a failure over the completion channel.
//!
//! A single failed or panicking worker fails the whole run; partial counts
//! are never reduced.

pub mod gate;

use crate::error::PiError;
use crate::partition::{build_requests, SampleRequest};
use crate::sampler::Sampler;
use crate::stats::aggregator::{reduce, ResultAggregator};
use crate::stats::{RunResult, WorkerResult};
use crate::util::time::{format_duration, Timestamp};
use crate::worker::Worker;
use crossbeam::channel;
use gate::StartGate;
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Per-worker outcome sent over the completion channel
type WorkerReport = (usize, std::result::Result<WorkerResult, String>);

/// Results of a coordinated run, in worker-index order
#[derive(Debug, Clone)]
pub struct CoordinatedRun {
    pub results: Vec<WorkerResult>,
    /// From start-gate release to the last completion report
    pub wall_elapsed: Duration,
}

/// Body of one worker thread
type WorkerJob = Box<dyn FnOnce() + Send + 'static>;

/// Starts a named worker thread
type SpawnFn = fn(String, WorkerJob) -> io::Result<thread::JoinHandle<()>>;

fn spawn_named(name: String, job: WorkerJob) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new().name(name).spawn(job)
}

/// Dispatches sample requests to worker threads
pub struct WorkerCoordinator {
    sampler: Arc<dyn Sampler>,
    spawn: SpawnFn,
}

impl WorkerCoordinator {
    pub fn new(sampler: Arc<dyn Sampler>) -> Self {
        Self {
            sampler,
            spawn: spawn_named,
        }
    }

    #[cfg(test)]
    fn with_spawn(mut self, spawn: SpawnFn) -> Self {
        self.spawn = spawn;
        self
    }

    /// Run every request on its own thread
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if `requests` is empty or a thread cannot be spawned
    /// - `WorkerFailure` for the lowest-indexed worker that failed or panicked
    pub fn run(&self, requests: Vec<SampleRequest>) -> Result<CoordinatedRun, PiError> {
        let num_workers = requests.len();
        if num_workers == 0 {
            return Err(PiError::invalid("at least one sample request is required"));
        }

        let gate = Arc::new(StartGate::new(num_workers));
        let (tx, rx) = channel::bounded::<WorkerReport>(num_workers);
        let mut handles = Vec::with_capacity(num_workers);

        for request in requests {
            let worker = Worker::new(request, Arc::clone(&self.sampler));
            let index = worker.index();
            let worker_gate = Arc::clone(&gate);
            let tx = tx.clone();

            let job: WorkerJob = Box::new(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| worker.run(&worker_gate)));
                let report = match outcome {
                    Ok(Ok(Some(result))) => Ok(result),
                    // Aborted before sampling; the coordinator is not listening
                    Ok(Ok(None)) => return,
                    Ok(Err(e)) => Err(format!("{:#}", e)),
                    Err(payload) => {
                        Err(format!("panicked: {}", panic_message(payload.as_ref())))
                    }
                };
                let _ = tx.send((index, report));
            });
            let spawned = (self.spawn)(format!("piscale-worker-{}", index), job);

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    gate.abort();
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(PiError::invalid(format!(
                        "failed to spawn worker {}: {}",
                        index, e
                    )));
                }
            }
        }
        drop(tx);

        log::debug!("Dispatched {} workers, waiting at start gate", num_workers);
        gate.wait_for_arrivals();
        gate.open();
        let start = Timestamp::now();

        let mut aggregator = ResultAggregator::new();
        let mut failures: Vec<(usize, String)> = Vec::new();

        for _ in 0..num_workers {
            match rx.recv() {
                Ok((_, Ok(result))) => aggregator.add_worker(result),
                Ok((index, Err(cause))) => failures.push((index, cause)),
                // All senders gone: remaining workers exited without reporting
                Err(_) => break,
            }
        }
        let wall_elapsed = start.elapsed();

        for handle in handles {
            let _ = handle.join();
        }

        if let Some((index, cause)) = failures.into_iter().min_by_key(|(index, _)| *index) {
            log::debug!("Worker {} failed: {}", index, cause);
            return Err(PiError::WorkerFailure { index, cause });
        }

        if aggregator.num_workers() != num_workers {
            let index = (0..num_workers)
                .find(|i| aggregator.worker_result(*i).is_none())
                .unwrap_or(0);
            return Err(PiError::WorkerFailure {
                index,
                cause: "worker exited without reporting".to_string(),
            });
        }

        log::debug!("All {} workers reported in {}", num_workers, format_duration(wall_elapsed));

        Ok(CoordinatedRun {
            results: aggregator.into_results(),
            wall_elapsed,
        })
    }
}

/// Partition, sample and reduce one run
///
/// Validates the inputs before any thread is spawned.
///
/// # Errors
///
/// `InvalidConfiguration` for zero workers or zero samples, otherwise any
/// error from the coordinator or reducer.
///
/// # Example
///
/// ```
/// use piscale::coordinator::run_estimate;
/// use piscale::sampler::XoshiroSampler;
/// use std::sync::Arc;
///
/// let run = run_estimate(100_000, 4, 0, Arc::new(XoshiroSampler::new())).unwrap();
/// assert_eq!(run.worker_count, 4);
/// assert_eq!(run.total_samples, 100_000);
/// assert!(run.pi_estimate > 3.0 && run.pi_estimate < 3.3);
/// ```
pub fn run_estimate(
    total_samples: u64,
    workers: usize,
    base_seed: u64,
    sampler: Arc<dyn Sampler>,
) -> Result<RunResult, PiError> {
    if workers == 0 {
        return Err(PiError::invalid("worker count must be at least 1"));
    }
    if total_samples == 0 {
        return Err(PiError::invalid("total sample count must be at least 1"));
    }

    let requests = build_requests(total_samples, workers, base_seed)?;
    log::debug!(
        "Running {} samples on {} workers with sampler '{}'",
        total_samples,
        workers,
        sampler.name()
    );

    let run = WorkerCoordinator::new(sampler).run(requests)?;
    reduce(&run.results)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::mock::{FailingSampler, FixedSampler, PanickingSampler, SleepingSampler};
    use crate::sampler::XoshiroSampler;

    #[test]
    fn test_run_preserves_order() {
        let coordinator = WorkerCoordinator::new(Arc::new(FixedSampler::all_inside()));
        let requests = build_requests(10, 3, 0).unwrap();

        let run = coordinator.run(requests).unwrap();
        let counts: Vec<(usize, u64)> = run
            .results
            .iter()
            .map(|r| (r.worker_index, r.inside_count))
            .collect();
        assert_eq!(counts, vec![(0, 4), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_run_empty_requests() {
        let coordinator = WorkerCoordinator::new(Arc::new(FixedSampler::all_inside()));
        assert!(matches!(coordinator.run(vec![]), Err(PiError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_single_failure_fails_run() {
        // Seeds are base_seed + index, so seed 2 is worker 2
        let sampler = FailingSampler::on_seeds(vec![2]).with_message("disk on fire");
        let coordinator = WorkerCoordinator::new(Arc::new(sampler));

        match coordinator.run(build_requests(100, 4, 0).unwrap()) {
            Err(PiError::WorkerFailure { index, cause }) => {
                assert_eq!(index, 2);
                assert!(cause.contains("disk on fire"));
            }
            other => panic!("Expected WorkerFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_lowest_failed_index_reported() {
        let sampler = FailingSampler::on_seeds(vec![1, 3]);
        let coordinator = WorkerCoordinator::new(Arc::new(sampler));

        match coordinator.run(build_requests(100, 4, 0).unwrap()) {
            Err(PiError::WorkerFailure { index, .. }) => assert_eq!(index, 1),
            other => panic!("Expected WorkerFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_panic_becomes_worker_failure() {
        let coordinator = WorkerCoordinator::new(Arc::new(PanickingSampler::on_seed(1)));

        match coordinator.run(build_requests(100, 3, 0).unwrap()) {
            Err(PiError::WorkerFailure { index, cause }) => {
                assert_eq!(index, 1);
                assert!(cause.contains("panicked"));
            }
            other => panic!("Expected WorkerFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_workers_start_together() {
        // Each share sleeps 10ms; every worker must start well before any finishes
        let sampler = SleepingSampler::new(Duration::from_micros(100));
        let coordinator = WorkerCoordinator::new(Arc::new(sampler.clone()));

        let run = coordinator.run(build_requests(400, 4, 0).unwrap()).unwrap();
        let starts = sampler.starts();
        assert_eq!(starts.len(), 4);

        let first = *starts.iter().min().unwrap();
        let last = *starts.iter().max().unwrap();
        assert!(last.duration_since(first) < Duration::from_millis(10));
        assert!(run.wall_elapsed >= Duration::from_millis(10));
    }

    #[test]
    fn test_wall_clock_is_parallel() {
        // 4 workers x 100 samples x 1ms = 100ms each; serial would be 400ms
        let sampler = SleepingSampler::new(Duration::from_millis(1));
        let coordinator = WorkerCoordinator::new(Arc::new(sampler));

        let run = coordinator.run(build_requests(400, 4, 0).unwrap()).unwrap();
        assert!(run.wall_elapsed >= Duration::from_millis(100));
        assert!(run.wall_elapsed < Duration::from_millis(350));

        let slowest = run.results.iter().map(|r| r.elapsed).max().unwrap();
        assert!(slowest <= run.wall_elapsed);
    }

    fn fail_third_spawn(name: String, job: WorkerJob) -> io::Result<thread::JoinHandle<()>> {
        if name.ends_with("-2") {
            return Err(io::Error::new(io::ErrorKind::Other, "thread limit reached"));
        }
        spawn_named(name, job)
    }

    #[test]
    fn test_spawn_failure_aborts_dispatched_workers() {
        let sampler = SleepingSampler::new(Duration::from_millis(1));
        let coordinator =
            WorkerCoordinator::new(Arc::new(sampler.clone())).with_spawn(fail_third_spawn);

        match coordinator.run(build_requests(400, 4, 0).unwrap()) {
            Err(PiError::InvalidConfiguration(msg)) => {
                assert!(msg.contains("failed to spawn worker 2"));
                assert!(msg.contains("thread limit reached"));
            }
            other => panic!("Expected InvalidConfiguration, got {:?}", other),
        }

        // Workers 0 and 1 were parked at the gate and released without sampling
        assert!(sampler.starts().is_empty());
    }

    #[test]
    fn test_run_estimate_deterministic() {
        let a = run_estimate(50_000, 4, 7, Arc::new(XoshiroSampler::new())).unwrap();
        let b = run_estimate(50_000, 4, 7, Arc::new(XoshiroSampler::new())).unwrap();
        assert_eq!(a.inside_count, b.inside_count);
        assert_eq!(a.pi_estimate, b.pi_estimate);
        assert!(a.inside_count <= a.total_samples);
        assert!(a.pi_estimate >= 0.0 && a.pi_estimate <= 4.0);
    }

    #[test]
    fn test_run_estimate_rejects_zero_workers() {
        let err = run_estimate(100, 0, 0, Arc::new(XoshiroSampler::new())).unwrap_err();
        assert!(matches!(err, PiError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_run_estimate_rejects_zero_samples() {
        let err = run_estimate(0, 4, 0, Arc::new(XoshiroSampler::new())).unwrap_err();
        assert!(matches!(err, PiError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_zero_share_workers_still_reduce() {
        let run = run_estimate(2, 4, 0, Arc::new(FixedSampler::all_inside())).unwrap();
        assert_eq!(run.worker_count, 4);
        assert_eq!(run.total_samples, 2);
        assert_eq!(run.pi_estimate, 4.0);
    }

    #[test]
    fn test_scaling_soft_monotonicity() {
        // Sleep-based work removes CPU contention from the comparison
        let sampler: Arc<dyn Sampler> = Arc::new(SleepingSampler::new(Duration::from_micros(500)));
        let one = run_estimate(400, 1, 0, sampler.clone()).unwrap();
        let four = run_estimate(400, 4, 0, sampler).unwrap();

        assert!(four.elapsed <= one.elapsed.mul_f64(1.5));
    }
}

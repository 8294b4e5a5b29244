//! piscale - Monte Carlo pi estimation and parallel scaling test
//!
//! A run splits a total sample count across worker threads, releases them
//! together from a start gate, and reduces their inside-circle counts into a
//! single estimate. A scaling test repeats that run as a separate process for
//! each worker count and derives speedup and efficiency from the timings.
//!
//! # Architecture
//!
//! - **Partitioning**: exact, deterministic split of samples with per-worker seeds
//! - **Sampling**: pure `(count, seed) -> inside` samplers behind a trait
//! - **Coordination**: start gate, completion channel, all-or-nothing failure
//! - **Reduction**: commutative sum of counts, max of worker times
//! - **Scaling harness**: sequential subprocess runs with timeouts and metrics

pub mod config;
pub mod coordinator;
pub mod error;
pub mod harness;
pub mod output;
pub mod partition;
pub mod sampler;
pub mod stats;
pub mod util;
pub mod worker;

// Re-export commonly used types
pub use config::Config;
pub use coordinator::{run_estimate, WorkerCoordinator};
pub use error::PiError;
pub use sampler::{Sampler, XoshiroSampler};
pub use stats::{RunResult, WorkerResult};

/// Result type used for glue code throughout piscale
pub type Result<T> = anyhow::Result<T>;

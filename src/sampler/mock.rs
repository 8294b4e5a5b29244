//! Mock samplers for testing
//!
//! These samplers return predictable counts, fail or panic on demand, or
//! simulate work by sleeping. They let coordinator and pipeline tests exercise
//! failure paths and timing behaviour without depending on real sampling cost.
//!
//! # Example
//!
//! ```
//! use piscale::sampler::Sampler;
//! use piscale::sampler::mock::FixedSampler;
//!
//! let sampler = FixedSampler::with_ratio(3, 4);
//! assert_eq!(sampler.sample(100, 0).unwrap(), 75);
//! ```

use super::Sampler;
use crate::Result;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Sampler that reports a fixed fraction of points as inside
#[derive(Debug, Clone, Copy)]
pub struct FixedSampler {
    numerator: u64,
    denominator: u64,
}

impl FixedSampler {
    /// Every point lands inside the circle
    pub fn all_inside() -> Self {
        Self::with_ratio(1, 1)
    }

    /// `numerator / denominator` of the points land inside (rounded down)
    pub fn with_ratio(numerator: u64, denominator: u64) -> Self {
        assert!(denominator > 0, "denominator must be non-zero");
        assert!(numerator <= denominator, "ratio must not exceed 1");
        Self { numerator, denominator }
    }
}

impl Sampler for FixedSampler {
    fn sample(&self, count: u64, _seed: u64) -> Result<u64> {
        Ok(count * self.numerator / self.denominator)
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Sampler that returns an error for selected seeds
#[derive(Debug, Clone)]
pub struct FailingSampler {
    failing_seeds: Vec<u64>,
    message: String,
}

impl FailingSampler {
    /// Fail for each seed in `failing_seeds`; other seeds report all points inside
    pub fn on_seeds(failing_seeds: Vec<u64>) -> Self {
        Self {
            failing_seeds,
            message: "Mock sampler error".to_string(),
        }
    }

    /// Set the error message returned on failure
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl Sampler for FailingSampler {
    fn sample(&self, count: u64, seed: u64) -> Result<u64> {
        if self.failing_seeds.contains(&seed) {
            anyhow::bail!("{}", self.message);
        }
        Ok(count)
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Sampler that panics for one seed
#[derive(Debug, Clone, Copy)]
pub struct PanickingSampler {
    panic_seed: u64,
}

impl PanickingSampler {
    pub fn on_seed(panic_seed: u64) -> Self {
        Self { panic_seed }
    }
}

impl Sampler for PanickingSampler {
    fn sample(&self, count: u64, seed: u64) -> Result<u64> {
        if seed == self.panic_seed {
            panic!("mock sampler panic on seed {}", seed);
        }
        Ok(count)
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

/// Sampler that sleeps in proportion to its share and records start times
///
/// Elapsed time scales with `count`, which makes it useful for timing and
/// scaling assertions that must not depend on CPU speed.
#[derive(Debug, Clone)]
pub struct SleepingSampler {
    per_sample: Duration,
    starts: Arc<Mutex<Vec<Instant>>>,
}

impl SleepingSampler {
    pub fn new(per_sample: Duration) -> Self {
        Self {
            per_sample,
            starts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Instants at which each invocation started, in arrival order
    pub fn starts(&self) -> Vec<Instant> {
        self.starts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Sampler for SleepingSampler {
    fn sample(&self, count: u64, _seed: u64) -> Result<u64> {
        self.starts.lock().unwrap_or_else(|e| e.into_inner()).push(Instant::now());
        let nanos = self.per_sample.as_nanos() as u64 * count;
        std::thread::sleep(Duration::from_nanos(nanos));
        Ok(count / 2)
    }

    fn name(&self) -> &'static str {
        "sleeping"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_sampler() {
        assert_eq!(FixedSampler::all_inside().sample(10, 0).unwrap(), 10);
        assert_eq!(FixedSampler::with_ratio(1, 3).sample(10, 0).unwrap(), 3);
    }

    #[test]
    fn test_failing_sampler() {
        let sampler = FailingSampler::on_seeds(vec![2]).with_message("boom");
        assert_eq!(sampler.sample(5, 1).unwrap(), 5);
        let err = sampler.sample(5, 2).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_sleeping_sampler_records_starts() {
        let sampler = SleepingSampler::new(Duration::from_micros(10));
        sampler.sample(10, 0).unwrap();
        sampler.sample(10, 1).unwrap();
        assert_eq!(sampler.starts().len(), 2);
    }
}

//! Monte Carlo samplers
//!
//! A sampler draws `count` uniform points in the unit square and returns how
//! many fall inside the quarter circle `x² + y² ≤ 1`. Samplers are pure
//! functions of `(count, seed)`: the same arguments always produce the same
//! count, and no generator state survives between calls.
//!
//! # Example
//!
//! ```
//! use piscale::sampler::{Sampler, XoshiroSampler};
//!
//! let sampler = XoshiroSampler::new();
//! let a = sampler.sample(10_000, 7).unwrap();
//! let b = sampler.sample(10_000, 7).unwrap();
//! assert_eq!(a, b);
//! assert!(a <= 10_000);
//! ```

pub mod mock;

use crate::Result;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Inside-circle counter
///
/// Implementations must be deterministic in `(count, seed)` and must return a
/// value no greater than `count`. They are shared across worker threads, so
/// they hold no mutable state.
pub trait Sampler: Send + Sync {
    /// Count the points among `count` draws that land inside the circle
    fn sample(&self, count: u64, seed: u64) -> Result<u64>;

    /// Short name used in logs and reports
    fn name(&self) -> &'static str;
}

/// Default sampler backed by xoshiro256++
///
/// A fresh generator is seeded from `seed` on every call, so there is no
/// hidden state shared between workers or between runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct XoshiroSampler;

impl XoshiroSampler {
    pub fn new() -> Self {
        Self
    }
}

impl Sampler for XoshiroSampler {
    fn sample(&self, count: u64, seed: u64) -> Result<u64> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut inside = 0u64;

        for _ in 0..count {
            let x: f64 = rng.gen();
            let y: f64 = rng.gen();
            if x * x + y * y <= 1.0 {
                inside += 1;
            }
        }

        Ok(inside)
    }

    fn name(&self) -> &'static str {
        "xoshiro256++"
    }
}

//! Work partitioning
//!
//! Splits a total sample count across workers. Every worker gets
//! `total / workers` samples and the first `total % workers` workers get one
//! extra, so shares never differ by more than one and always sum to `total`.
//!
//! # Example
//!
//! ```
//! use piscale::partition::partition;
//!
//! assert_eq!(partition(10, 3).unwrap(), vec![4, 3, 3]);
//! ```

use crate::error::PiError;

/// One worker's share of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRequest {
    /// Index of the worker this request is dispatched to
    pub worker_index: usize,
    /// Number of points to draw
    pub sample_count: u64,
    /// Seed for the worker's generator
    pub seed: u64,
}

/// Split `total` samples across `workers` shares
///
/// # Errors
///
/// Returns `InvalidConfiguration` if `workers` is zero.
pub fn partition(total: u64, workers: usize) -> Result<Vec<u64>, PiError> {
    if workers == 0 {
        return Err(PiError::invalid("worker count must be at least 1"));
    }

    let n = workers as u64;
    let base = total / n;
    let remainder = total % n;

    Ok((0..n)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect())
}

/// Build one `SampleRequest` per worker
///
/// Worker `i` is seeded with `base_seed + i` so that no two workers in a run
/// share a generator stream.
pub fn build_requests(
    total: u64,
    workers: usize,
    base_seed: u64,
) -> Result<Vec<SampleRequest>, PiError> {
    let shares = partition(total, workers)?;

    Ok(shares
        .into_iter()
        .enumerate()
        .map(|(worker_index, sample_count)| SampleRequest {
            worker_index,
            sample_count,
            seed: base_seed.wrapping_add(worker_index as u64),
        })
        .collect())
}

//! CLI string conversion utilities

use anyhow::{Context, Result};
use std::time::Duration;

/// Parse a sample count (e.g., "10M", "500k", "1_000_000", "2.5m")
///
/// Multipliers are decimal: k = 1e3, m = 1e6, g/b = 1e9. Fractional counts
/// are accepted only when the multiplied value is a whole number.
pub fn parse_count(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase().replace('_', "");

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('k') {
        (n, 1_000u64)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 1_000_000)
    } else if let Some(n) = s.strip_suffix('g').or_else(|| s.strip_suffix('b')) {
        (n, 1_000_000_000)
    } else {
        (s.as_str(), 1)
    };

    if num_str.is_empty() {
        anyhow::bail!("Invalid count format: {}", s);
    }

    if let Ok(whole) = num_str.parse::<u64>() {
        return whole
            .checked_mul(multiplier)
            .with_context(|| format!("Count out of range: {}", s));
    }

    let num: f64 = num_str
        .parse()
        .with_context(|| format!("Invalid count format: {}", s))?;
    let value = num * multiplier as f64;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u64::MAX as f64 {
        anyhow::bail!("Count must be a whole non-negative number: {}", s);
    }

    Ok(value as u64)
}

/// Parse a duration string (e.g., "600", "90s", "10m", "1h")
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();

    let seconds = s.strip_suffix("sec").or_else(|| s.strip_suffix('s'));
    let (num_str, multiplier) = if let Some(n) = seconds {
        (n, 1u64)
    } else if let Some(n) = s.strip_suffix("min").or_else(|| s.strip_suffix('m')) {
        (n, 60)
    } else if let Some(n) = s.strip_suffix("hr").or_else(|| s.strip_suffix('h')) {
        (n, 3600)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .with_context(|| format!("Invalid duration format: {}", s))?;

    let secs = num
        .checked_mul(multiplier)
        .with_context(|| format!("Duration out of range: {}", s))?;

    Ok(Duration::from_secs(secs))
}

/// Parse a comma-separated worker-count list (e.g., "1,2,4,8")
pub fn parse_worker_counts(s: &str) -> Result<Vec<usize>> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<usize>()
                .with_context(|| format!("Invalid worker count: {}", part))
        })
        .collect()
}

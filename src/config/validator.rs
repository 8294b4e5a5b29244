//! Configuration validation

use super::*;
use anyhow::Result;

/// Upper bound on worker threads per run
pub const MAX_WORKERS: usize = 4096;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_run(&config.run)?;
    validate_harness(&config.harness)?;
    validate_output(&config.output)?;

    Ok(())
}

/// Validate run configuration
pub fn validate_run(run: &RunConfig) -> Result<()> {
    if run.samples == 0 {
        anyhow::bail!("run.samples must be at least 1");
    }

    if run.workers == 0 || run.workers > MAX_WORKERS {
        anyhow::bail!("run.workers must be between 1 and {}, got {}", MAX_WORKERS, run.workers);
    }

    if run.workers as u64 > run.samples {
        log::warn!(
            "More workers ({}) than samples ({}); some workers will draw nothing",
            run.workers,
            run.samples
        );
    }

    Ok(())
}

/// Validate scaling harness configuration
pub fn validate_harness(harness: &HarnessConfig) -> Result<()> {
    if harness.worker_counts.is_empty() {
        anyhow::bail!("harness.worker_counts must not be empty");
    }

    if let Some(&bad) = harness
        .worker_counts
        .iter()
        .find(|&&c| c == 0 || c > MAX_WORKERS)
    {
        anyhow::bail!(
            "harness.worker_counts entries must be between 1 and {}, got {}",
            MAX_WORKERS,
            bad
        );
    }

    if harness.timeout_secs == 0 {
        anyhow::bail!("harness.timeout_secs must be greater than 0");
    }

    if let Some(ref program) = harness.program {
        if !program.exists() {
            anyhow::bail!("harness.program does not exist: {}", program.display());
        }
    }

    Ok(())
}

/// Validate output configuration
pub fn validate_output(output: &OutputConfig) -> Result<()> {
    if let (Some(json), Some(csv)) = (&output.json_output, &output.csv_output) {
        if json == csv {
            anyhow::bail!(
                "json_output and csv_output must be different files: {}",
                json.display()
            );
        }
    }

    Ok(())
}

//! JSON output
//!
//! Two documents are written: the run report (one `RunResult`, read back by
//! the scaling harness) and the scaling report (rows, attempts, host and
//! timestamp).

use crate::harness::metrics::ScalingReport;
use crate::stats::RunResult;
use crate::Result;
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write a run result as compact JSON
pub fn write_run_report(path: &Path, result: &RunResult) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create run report: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, result)
        .with_context(|| format!("Failed to write run report: {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

/// Read a run result written by `write_run_report`
pub fn read_run_report(path: &Path) -> Result<RunResult> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open run report: {}", path.display()))?;
    let result = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse run report: {}", path.display()))?;
    Ok(result)
}

/// Write the scaling report
pub fn write_scaling_report(path: &Path, report: &ScalingReport, pretty: bool) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create JSON output: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    if pretty {
        serde_json::to_writer_pretty(&mut writer, report)?;
    } else {
        serde_json::to_writer(&mut writer, report)?;
    }

    writer.flush()?;
    Ok(())
}

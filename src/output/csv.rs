//! CSV output formatting
//!
//! One row per successful configuration, ready for a spreadsheet or pandas.
//! Rows without a structured run report leave `pi_estimate` empty.

use crate::harness::metrics::{ScalingReport, ScalingRow};
use crate::Result;
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Header row of the scaling table
pub const CSV_HEADER: &str = "workers,elapsed_sec,speedup,efficiency_percent,pi_estimate";

/// CSV writer for the scaling table
pub struct CsvWriter<W: Write> {
    out: W,
}

impl CsvWriter<BufWriter<File>> {
    /// Create a CSV file and write its header row
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV output: {}", path.display()))?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> CsvWriter<W> {
    /// Wrap a writer and write the header row
    pub fn new(mut out: W) -> Result<Self> {
        writeln!(out, "{}", CSV_HEADER)?;
        Ok(Self { out })
    }

    /// Append one row
    pub fn append_row(&mut self, row: &ScalingRow) -> Result<()> {
        let pi = row.pi_estimate.map(|p| format!("{:.10}", p)).unwrap_or_default();
        writeln!(
            self.out,
            "{},{:.6},{:.4},{:.2},{}",
            row.worker_count,
            row.elapsed.as_secs_f64(),
            row.speedup,
            row.efficiency_percent,
            pi
        )?;
        Ok(())
    }

    /// Flush and return the underlying writer
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Write every row of a scaling report to `path`
pub fn write_scaling_csv(path: &Path, report: &ScalingReport) -> Result<()> {
    let mut writer = CsvWriter::create(path)?;
    for row in &report.rows {
        writer.append_row(row)?;
    }
    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::metrics::{derive_rows, Measurement};
    use std::time::Duration;

    fn rows() -> Vec<ScalingRow> {
        derive_rows(&[
            Measurement {
                worker_count: 1,
                elapsed: Duration::from_secs(4),
                pi_estimate: Some(3.1415),
            },
            Measurement {
                worker_count: 2,
                elapsed: Duration::from_millis(2500),
                pi_estimate: None,
            },
        ])
    }

    #[test]
    fn test_rows_in_memory() {
        let mut writer = CsvWriter::new(Vec::new()).unwrap();
        for row in &rows() {
            writer.append_row(row).unwrap();
        }
        let text = String::from_utf8(writer.finish().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "1,4.000000,1.0000,100.00,3.1415000000");
        assert_eq!(lines[2], "2,2.500000,1.6000,80.00,");
    }

    #[test]
    fn test_write_scaling_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaling.csv");
        let report = ScalingReport::new(1_000, rows(), vec![]);

        write_scaling_csv(&path, &report).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with(CSV_HEADER));
    }
}

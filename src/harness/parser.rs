//! Run report parsing
//!
//! The harness only needs one number from a run: its elapsed time. Extraction
//! sits behind `ReportParser` so the text format can be swapped for a
//! structured one without touching the harness's control flow.

use crate::error::PiError;
use std::time::Duration;

/// Label of the canonical timing line printed by every run
pub const TOTAL_TIME_LABEL: &str = "Total time:";

/// Extracts the elapsed time from a run's captured standard output
pub trait ReportParser: Send + Sync {
    /// # Errors
    ///
    /// Returns `UnparsableOutput` carrying the raw output if no timing is found.
    fn parse_elapsed(&self, output: &str) -> Result<Duration, PiError>;
}

/// Parses `Total time: <float> seconds`
///
/// Whitespace around the label, the colon and the value may vary, and the
/// `seconds` unit is optional. The first matching line wins.
///
/// ```
/// use piscale::harness::parser::{ReportParser, TotalTimeParser};
/// use std::time::Duration;
///
/// let parser = TotalTimeParser;
/// let elapsed = parser.parse_elapsed("  Total time:     1.250 seconds\n").unwrap();
/// assert_eq!(elapsed, Duration::from_millis(1250));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TotalTimeParser;

impl ReportParser for TotalTimeParser {
    fn parse_elapsed(&self, output: &str) -> Result<Duration, PiError> {
        output
            .lines()
            .find_map(parse_total_time_line)
            .ok_or_else(|| PiError::UnparsableOutput {
                output: output.to_string(),
            })
    }
}

/// Parse a single line, returning `None` if it is not a valid timing line
fn parse_total_time_line(line: &str) -> Option<Duration> {
    // Collapse runs of whitespace so "Total   time :" still matches
    let normalized = line.split_whitespace().collect::<Vec<_>>().join(" ");
    let normalized = normalized.replace(" :", ":");

    let start = normalized.find(TOTAL_TIME_LABEL)?;
    let rest = normalized[start + TOTAL_TIME_LABEL.len()..].trim_start();

    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    let value: f64 = rest[..end].parse().ok()?;

    let unit = rest[end..].trim();
    if !(unit.is_empty() || unit.starts_with("second") || unit == "s") {
        return None;
    }

    Duration::try_from_secs_f64(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(output: &str) -> Result<Duration, PiError> {
        TotalTimeParser.parse_elapsed(output)
    }

    #[test]
    fn test_parse_canonical_line() {
        assert_eq!(parse("Total time: 4.000 seconds").unwrap(), Duration::from_secs(4));
    }

    #[test]
    fn test_parse_whitespace_variance() {
        assert_eq!(parse("  Total time:\t\t2.5   seconds  ").unwrap(), Duration::from_millis(2500));
        assert_eq!(parse("Total   time :  2.5 seconds").unwrap(), Duration::from_millis(2500));
        assert_eq!(parse("Total time:2.5 seconds").unwrap(), Duration::from_millis(2500));
    }

    #[test]
    fn test_parse_without_unit() {
        assert_eq!(parse("Total time: 0.125").unwrap(), Duration::from_millis(125));
    }

    #[test]
    fn test_parse_within_report() {
        let report = "\
Results:
  Estimated Pi:         3.1415926536
Performance:
  Total time:           1.500 seconds
  Samples/sec:          6,666,667
";
        assert_eq!(parse(report).unwrap(), Duration::from_millis(1500));
    }

    #[test]
    fn test_first_match_wins() {
        let report = "Total time: 1.0 seconds\nTotal time: 9.0 seconds\n";
        assert_eq!(parse(report).unwrap(), Duration::from_secs(1));
    }

    #[test]
    fn test_unparsable_keeps_output() {
        match parse("Estimated Pi: 3.14\n") {
            Err(PiError::UnparsableOutput { output }) => assert_eq!(output, "Estimated Pi: 3.14\n"),
            other => panic!("Expected UnparsableOutput, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_garbage_value() {
        assert!(parse("Total time: fast seconds").is_err());
        assert!(parse("Total time: 1.2.3 seconds").is_err());
        assert!(parse("Total time: 1.5 minutes").is_err());
    }
}

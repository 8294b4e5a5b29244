//! Human-readable text output
//!
//! The run report's `Total time:` line is the contract with the scaling
//! harness, which parses it from the run's stdout. Keep its shape stable.

use crate::harness::metrics::ScalingReport;
use crate::harness::{RunAttempt, RunState};
use crate::stats::RunResult;
use crate::util::time::{format_count, format_rate};
use std::fmt::Write;

const RULE: &str = "═══════════════════════════════════════════════════════════";

/// Banner printed before a run starts
pub fn format_run_header(total_samples: u64, worker_count: usize) -> String {
    let mut out = String::new();
    let per_worker = total_samples / worker_count.max(1) as u64;

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "            MONTE CARLO PI ESTIMATION");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Total samples:        {}", format_count(total_samples));
    let _ = writeln!(out, "Number of workers:    {}", worker_count);
    let _ = writeln!(out, "Samples per worker:   ~{}", format_count(per_worker));
    out
}

/// Full report of a finished run
pub fn format_run_report(result: &RunResult) -> String {
    let mut out = String::new();
    let rate = result.samples_per_sec();
    let rate_per_worker = result.samples_per_sec_per_worker();

    let _ = writeln!(out, "Results:");
    let _ = writeln!(out, "  Points inside circle: {}", format_count(result.inside_count));
    let _ = writeln!(out, "  Points outside:       {}", format_count(result.outside_count()));
    let _ = writeln!(out, "  Estimated Pi:         {:.10}", result.pi_estimate);
    let _ = writeln!(out, "  Actual Pi:            {:.10}", std::f64::consts::PI);
    let _ = writeln!(
        out,
        "  Error:                {:.10} ({:.4}%)",
        result.abs_error(),
        result.error_percent()
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Performance:");
    let _ = writeln!(
        out,
        "  Total time:           {:.6} seconds",
        result.elapsed.as_secs_f64()
    );
    let _ = writeln!(
        out,
        "  Samples/sec:          {} ({})",
        format_count(rate.round() as u64),
        format_rate(rate)
    );
    let _ = writeln!(
        out,
        "  Samples/sec/worker:   {} ({})",
        format_count(rate_per_worker.round() as u64),
        format_rate(rate_per_worker)
    );
    let _ = writeln!(out, "{}", RULE);
    out
}

/// Banner printed before a scaling test starts
pub fn format_scaling_header(total_samples: u64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "              PARALLEL SCALING TEST");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Samples per run: {}", format_count(total_samples));
    out
}

/// Scaling table plus summary
pub fn format_scaling_report(report: &ScalingReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "                 SCALING SUMMARY");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "{:>8}  {:>10}  {:>9}  {:>14}  {:>14}",
        "Workers", "Time (s)", "Speedup", "Efficiency (%)", "Pi estimate"
    );
    for row in &report.rows {
        let pi = row
            .pi_estimate
            .map(|p| format!("{:.10}", p))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:>8}  {:>10.3}  {:>8.2}x  {:>13.1}%  {:>14}",
            row.worker_count,
            row.elapsed.as_secs_f64(),
            row.speedup,
            row.efficiency_percent,
            pi
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Total samples:      {}", format_count(report.total_samples));
    let _ = writeln!(out, "Average efficiency: {:.1}%", report.mean_efficiency_percent);

    let failed: Vec<&RunAttempt> = report
        .attempts
        .iter()
        .filter(|a| !a.state.is_success())
        .collect();
    if !failed.is_empty() {
        let _ = writeln!(out);
        let _ = write!(out, "{}", format_attempts(&failed));
    }

    let _ = writeln!(out, "{}", RULE);
    out
}

/// One line per attempt, for diagnosing failed configurations
pub fn format_attempts(attempts: &[&RunAttempt]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Attempts:");
    for attempt in attempts {
        let outcome = match &attempt.state {
            RunState::Pending => "not started".to_string(),
            RunState::Running => "still running".to_string(),
            RunState::Succeeded { elapsed } => {
                format!("succeeded in {:.3}s", elapsed.as_secs_f64())
            }
            RunState::Failed { cause } => format!("failed: {}", cause),
            RunState::TimedOut => "timed out".to_string(),
        };
        let _ = writeln!(out, "  {:>4} worker(s): {}", attempt.worker_count, outcome);
    }
    out
}

pub fn print_run_header(total_samples: u64, worker_count: usize) {
    println!("{}", format_run_header(total_samples, worker_count));
}

/// Print the run report to stdout
pub fn print_run_report(result: &RunResult) {
    print!("{}", format_run_report(result));
}

pub fn print_scaling_header(total_samples: u64) {
    println!("{}", format_scaling_header(total_samples));
}

/// Print the scaling table to stdout
pub fn print_scaling_report(report: &ScalingReport) {
    println!();
    print!("{}", format_scaling_report(report));
}

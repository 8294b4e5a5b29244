//! piscale CLI entry point

use anyhow::{Context, Result};
use piscale::config::cli::{Cli, ExecutionMode};
use piscale::config::{toml::load_config, validator::validate_config, Config};
use piscale::harness::process::ProcessLauncher;
use piscale::harness::ScalingHarness;
use piscale::output::{csv, json, text};
use piscale::{run_estimate, PiError, XoshiroSampler};
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.validate()?;

    let config = load_config(&cli)?;
    init_logging(config.runtime.debug);

    validate_config(&config).context("Configuration validation failed")?;
    log::debug!("{}", config);

    // Handle different execution modes
    match cli.mode {
        ExecutionMode::Run => run_single(&config),
        ExecutionMode::Scale => run_scaling(&config),
    }
}

/// `--debug` forces debug logging; otherwise RUST_LOG applies, defaulting to warn
fn init_logging(debug: bool) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // A second init (e.g. from an embedding test) is harmless
    let _ = builder.format_timestamp_millis().try_init();
}

/// One estimation run with a fixed worker count
fn run_single(config: &Config) -> Result<()> {
    let run = &config.run;
    text::print_run_header(run.samples, run.workers);

    let sampler = Arc::new(XoshiroSampler::new());
    let result = run_estimate(run.samples, run.workers, run.seed, sampler)?;
    text::print_run_report(&result);

    if let Some(ref path) = config.output.report {
        json::write_run_report(path, &result)?;
        log::debug!("Run report written to {}", path.display());
    }

    Ok(())
}

/// Scaling test: one run process per worker count
fn run_scaling(config: &Config) -> Result<()> {
    let launcher = match config.harness.program {
        Some(ref program) => ProcessLauncher::new(program),
        None => ProcessLauncher::current_exe()?,
    };
    log::debug!("Launching runs with {}", launcher.program().display());

    let settings = config.harness_settings();
    text::print_scaling_header(settings.total_samples);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;
    let harness = ScalingHarness::new(launcher, settings);

    let report = match runtime.block_on(harness.run()) {
        Ok(report) => report,
        Err(PiError::NoSuccessfulRuns { attempts }) => {
            println!();
            println!("Error: no successful runs");
            print!("{}", text::format_attempts(&attempts.iter().collect::<Vec<_>>()));
            anyhow::bail!(PiError::NoSuccessfulRuns { attempts });
        }
        Err(e) => return Err(e.into()),
    };

    text::print_scaling_report(&report);

    if let Some(ref path) = config.output.json_output {
        json::write_scaling_report(path, &report, true)?;
        println!("JSON report saved to: {}", path.display());
    }
    if let Some(ref path) = config.output.csv_output {
        csv::write_scaling_csv(path, &report)?;
        println!("CSV table saved to: {}", path.display());
    }

    Ok(())
}

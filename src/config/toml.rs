//! TOML configuration file parsing

use super::*;
use crate::config::cli::Cli;
use crate::config::cli_convert::{parse_count, parse_duration, parse_worker_counts};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Build the effective configuration: config file (if any), then CLI overrides
pub fn load_config(cli: &Cli) -> Result<Config> {
    let base = match &cli.config {
        Some(path) => parse_toml_file(path)?,
        None => Config::default(),
    };

    merge_cli_with_config(cli, base)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    // Run settings
    if let Some(ref samples) = cli.samples {
        config.run.samples = parse_count(samples)?;
    }
    if let Some(workers) = cli.workers {
        config.run.workers = workers;
    }
    if let Some(seed) = cli.seed {
        config.run.seed = seed;
    }

    // Harness settings
    if let Some(ref counts) = cli.worker_counts {
        config.harness.worker_counts = parse_worker_counts(counts)?;
    }
    if let Some(ref timeout) = cli.timeout {
        config.harness.timeout_secs = parse_duration(timeout)?.as_secs();
    }
    if let Some(ref program) = cli.program {
        config.harness.program = Some(program.clone());
    }

    // Output settings
    if let Some(ref path) = cli.report {
        config.output.report = Some(path.clone());
    }
    if let Some(ref path) = cli.json_output {
        config.output.json_output = Some(path.clone());
    }
    if let Some(ref path) = cli.csv_output {
        config.output.csv_output = Some(path.clone());
    }

    if cli.debug {
        config.runtime.debug = true;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("piscale").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_toml_basic() {
        let toml_str = r#"
[run]
samples = 1000000
workers = 4
seed = 42

[harness]
worker_counts = [1, 2, 4]
timeout_secs = 120

[output]
csv_output = "scaling.csv"
"#;

        let config = parse_toml_string(toml_str).unwrap();
        assert_eq!(config.run.samples, 1_000_000);
        assert_eq!(config.run.workers, 4);
        assert_eq!(config.run.seed, 42);
        assert_eq!(config.harness.worker_counts, vec![1, 2, 4]);
        assert_eq!(config.harness.timeout_secs, 120);
        assert_eq!(config.output.csv_output, Some(PathBuf::from("scaling.csv")));
        assert!(config.output.json_output.is_none());
    }

    #[test]
    fn test_parse_toml_defaults() {
        let config = parse_toml_string("").unwrap();
        assert_eq!(config, Config::default());

        let config = parse_toml_string("[run]\nseed = 3\n").unwrap();
        assert_eq!(config.run.seed, 3);
        assert_eq!(config.run.samples, 10_000_000);
    }

    #[test]
    fn test_parse_toml_rejects_bad_types() {
        assert!(parse_toml_string("[run]\nworkers = \"many\"\n").is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file_config =
            parse_toml_string("[run]\nsamples = 500\nseed = 9\n[harness]\nworker_counts = [1, 2]\n")
                .unwrap();
        let merged = merge_cli_with_config(
            &cli(&["-n", "2k", "--worker-counts", "1,3", "--timeout", "1m", "--debug"]),
            file_config,
        )
        .unwrap();

        assert_eq!(merged.run.samples, 2_000);
        assert_eq!(merged.run.seed, 9);
        assert_eq!(merged.harness.worker_counts, vec![1, 3]);
        assert_eq!(merged.harness.timeout_secs, 60);
        assert!(merged.runtime.debug);
    }

    #[test]
    fn test_merge_rejects_bad_values() {
        assert!(merge_cli_with_config(&cli(&["-n", "lots"]), Config::default()).is_err());
        assert!(merge_cli_with_config(&cli(&["--timeout", "forever"]), Config::default()).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[run]\nworkers = 3").unwrap();

        let path = file.path().to_str().unwrap();
        let config = load_config(&cli(&["--mode", "run", "-c", path, "--seed", "5"])).unwrap();
        assert_eq!(config.run.workers, 3);
        assert_eq!(config.run.seed, 5);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(&cli(&["-c", "/nonexistent/piscale.toml"])).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}

//! insertbench - database insert speed test
//!
//! Connects to the configured database, creates the `perf` table if needed
//! and times N single-row inserts.

mod config;
mod report;

use std::process::ExitCode;

use clap::Parser;
use config::{Args, BenchConfig, LEGACY_USER_ENV};
use insertbench::BenchmarkRunner;

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "insertbench=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let program_path = std::env::current_exe()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "insertbench".to_string());
    println!("{}", report::banner(&program_path));

    let args = Args::parse().with_legacy_user(std::env::var(LEGACY_USER_ENV).ok());
    let config = match load_config(args) {
        Ok(config) => config,
        Err(status) => return ExitCode::from(status),
    };

    println!(
        "establishing a connection to {} on {}",
        config.backend, config.params.server
    );

    let mut runner = BenchmarkRunner::new(config.iterations);
    if !config.quiet {
        runner = runner.with_progress(report::progress);
    }

    println!("Starting the test at {}", report::now());
    let outcome = runner.run(config.backend, &config.params);
    if !config.quiet && outcome.iterations_completed > 0 {
        // Move past the progress line.
        eprintln!();
    }

    match &outcome.failure {
        None => {
            println!(
                "{}",
                report::completion(&outcome, env!("CARGO_BIN_NAME"), &report::host_name())
            );
            ExitCode::SUCCESS
        }
        Some(failure) => {
            eprintln!("{}", report::failure(failure, outcome.iterations_completed));
            ExitCode::from(report::exit_status(failure))
        }
    }
}

/// Validate the arguments, or report the problem and return the exit status.
fn load_config(args: Args) -> Result<BenchConfig, u8> {
    args.into_config().map_err(|e| {
        tracing::error!(error = %e, "invalid configuration");
        eprintln!("Error: {e}");
        report::EXIT_INVALID
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_exits_with_invalid_status() {
        let bad_iterations = Args {
            db_type: Some("sqlite".into()),
            host: Some("bench".into()),
            iterations: Some("ten".into()),
            ..Args::default()
        };
        assert_eq!(load_config(bad_iterations).unwrap_err(), report::EXIT_INVALID);

        let bad_backend = Args {
            db_type: Some("oracle".into()),
            iterations: Some("10".into()),
            ..Args::default()
        };
        assert_eq!(load_config(bad_backend).unwrap_err(), 1);
    }

    #[test]
    fn test_valid_config_loads() {
        let args = Args {
            db_type: Some("sqlite".into()),
            host: Some("bench".into()),
            iterations: Some("10".into()),
            ..Args::default()
        };
        let config = load_config(args).unwrap();
        assert_eq!(config.iterations, 10);
    }
}

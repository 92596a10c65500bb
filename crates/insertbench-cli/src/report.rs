//! Console output: banner, progress line and final reports.

use std::io::{self, Write};

use chrono::Local;
use insertbench::{BenchmarkOutcome, RunFailure};

/// Exit status for invalid configuration or a failed connection.
pub const EXIT_INVALID: u8 = 1;

/// Exit status when a statement fails mid-run.
pub const EXIT_EXECUTION_FAILED: u8 = 8;

/// Exit status for an aborted run.
pub fn exit_status(failure: &RunFailure) -> u8 {
    match failure {
        RunFailure::Connection(_) => EXIT_INVALID,
        RunFailure::Execution(_) => EXIT_EXECUTION_FAILED,
    }
}

/// `asctime`-style timestamp, e.g. `Mon Oct 19 14:03:07 2026`.
pub fn now() -> String {
    Local::now().format("%a %b %e %H:%M:%S %Y").to_string()
}

/// Upper-cased name of this machine.
pub fn host_name() -> String {
    gethostname::gethostname().to_string_lossy().to_uppercase()
}

/// Lines printed before connecting.
pub fn banner(program_path: &str) -> String {
    format!(
        "This is a script to test insert speed of databases. This is insertbench version {}\n\
         Running from: {}\n\
         The time now is {}",
        env!("CARGO_PKG_VERSION"),
        program_path,
        now()
    )
}

/// Overwrite the progress line on stderr.
pub fn progress(iteration: u64, total: u64) {
    let mut err = io::stderr().lock();
    let _ = write!(err, "On iteration {iteration} of {total}\r");
    let _ = err.flush();
}

/// Report for a run that inserted every row.
pub fn completion(outcome: &BenchmarkOutcome, program: &str, host: &str) -> String {
    let breakdown = outcome.breakdown();
    let mut report = format!(
        "Completed at {}\n\
         Took {:.2} seconds to complete, which is {} hours, {} minutes and {:.2} seconds.\n",
        now(),
        outcome.elapsed_seconds(),
        breakdown.hours,
        breakdown.minutes,
        breakdown.seconds
    );
    if let Some(rate) = outcome.inserts_per_second() {
        report.push_str(&format!(
            "Inserted {} rows at {:.1} rows per second.\n",
            outcome.iterations_completed, rate
        ));
    }
    report.push_str(&format!("{program} completed successfully on {host}"));
    report
}

/// Report for an aborted run.
pub fn failure(failure: &RunFailure, completed: u64) -> String {
    match failure {
        RunFailure::Connection(e) => format!("Connection failed: {e}"),
        RunFailure::Execution(e) => format!(
            "Results is only the following string: {e}\nAborted after {completed} completed iterations."
        ),
    }
}

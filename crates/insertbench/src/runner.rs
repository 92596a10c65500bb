//! Benchmark runner.
//!
//! A run moves through `Idle -> Connected -> TableReady -> Running` and ends
//! in `Completed` or `Aborted`. The first failed statement aborts the run;
//! nothing is retried or skipped.

use std::fmt;
use std::time::{Duration, Instant};

use thiserror::Error;
use uuid::Uuid;

use crate::backend::{BackendKind, ConnectionParameters};
use crate::connection;
use crate::error::{ConnectionError, ExecutionError};
use crate::executor;
use crate::fixtures::{insert_statement, PhraseGenerator};
use crate::session::Session;

/// Progress callback, called with `(iteration, total)` before each insert.
pub type ProgressFn = Box<dyn FnMut(u64, u64)>;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Connected,
    TableReady,
    Running,
    Completed,
    Aborted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Connected => "connected",
            RunState::TableReady => "table ready",
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Why a run aborted.
#[derive(Debug, Error)]
pub enum RunFailure {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// Elapsed time split into hours, minutes and seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElapsedBreakdown {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: f64,
}

impl ElapsedBreakdown {
    pub fn from_duration(elapsed: Duration) -> Self {
        let total_minutes = elapsed.as_secs() / 60;
        let seconds = elapsed.as_secs_f64() - (total_minutes * 60) as f64;
        Self {
            hours: total_minutes / 60,
            minutes: total_minutes % 60,
            seconds,
        }
    }
}

/// Result of one run.
#[derive(Debug)]
pub struct BenchmarkOutcome {
    pub iterations_requested: u64,
    pub iterations_completed: u64,
    pub elapsed: Duration,
    pub state: RunState,
    pub failure: Option<RunFailure>,
}

impl BenchmarkOutcome {
    fn completed(iterations: u64, elapsed: Duration) -> Self {
        Self {
            iterations_requested: iterations,
            iterations_completed: iterations,
            elapsed,
            state: RunState::Completed,
            failure: None,
        }
    }

    fn aborted(requested: u64, completed: u64, elapsed: Duration, failure: RunFailure) -> Self {
        Self {
            iterations_requested: requested,
            iterations_completed: completed,
            elapsed,
            state: RunState::Aborted,
            failure: Some(failure),
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.state == RunState::Aborted
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn failure_message(&self) -> Option<String> {
        self.failure.as_ref().map(ToString::to_string)
    }

    pub fn breakdown(&self) -> ElapsedBreakdown {
        ElapsedBreakdown::from_duration(self.elapsed)
    }

    /// Completed inserts per second; `None` when no time was measured.
    pub fn inserts_per_second(&self) -> Option<f64> {
        let secs = self.elapsed_seconds();
        (secs > 0.0).then(|| self.iterations_completed as f64 / secs)
    }
}

/// Drives the create-table statement and N inserts over one session.
pub struct BenchmarkRunner {
    iterations: u64,
    phrases: PhraseGenerator,
    progress: Option<ProgressFn>,
}

impl BenchmarkRunner {
    /// Create a runner performing `iterations` inserts.
    pub fn new(iterations: u64) -> Self {
        Self {
            iterations,
            phrases: PhraseGenerator::new(),
            progress: None,
        }
    }

    /// Use a specific phrase generator.
    pub fn with_phrases(mut self, phrases: PhraseGenerator) -> Self {
        self.phrases = phrases;
        self
    }

    /// Report progress before each insert.
    pub fn with_progress(mut self, progress: impl FnMut(u64, u64) + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Connect, run, and close the connection on every path.
    pub fn run(&mut self, kind: BackendKind, params: &ConnectionParameters) -> BenchmarkOutcome {
        let mut state = RunState::Idle;
        tracing::debug!(%state, backend = %kind, "starting run");

        let mut conn = match connection::connect(kind, params) {
            Ok(conn) => conn,
            Err(e) => {
                state = RunState::Aborted;
                tracing::error!(%state, error = %e, "run aborted");
                return BenchmarkOutcome::aborted(self.iterations, 0, Duration::ZERO, e.into());
            }
        };

        let outcome = self.run_session(&mut conn);

        if let Err(e) = conn.close() {
            tracing::warn!(error = %e, "failed to close connection");
        }
        outcome
    }

    /// Run on an already connected session.
    pub fn run_session<S: Session + ?Sized>(&mut self, session: &mut S) -> BenchmarkOutcome {
        let mut state = RunState::Connected;
        tracing::info!(%state, backend = %session.backend(), "creating table");

        let ddl = session.backend().create_table_sql();
        if let Err(e) = executor::execute(&ddl, &mut *session).map(drop) {
            state = RunState::Aborted;
            tracing::error!(%state, error = %e, "table creation failed");
            return BenchmarkOutcome::aborted(self.iterations, 0, Duration::ZERO, e.into());
        }
        state = RunState::TableReady;
        tracing::debug!(%state, "table ready");

        let start = Instant::now();
        state = RunState::Running;
        tracing::info!(%state, iterations = self.iterations, "starting inserts");

        for i in 0..self.iterations {
            if let Some(progress) = self.progress.as_mut() {
                progress(i, self.iterations);
            }

            let sql = insert_statement(&self.phrases.phrase(), &Uuid::new_v4());
            // The outcome borrows `sql`; drop it before `sql` goes out of scope.
            if let Err(e) = executor::execute(&sql, &mut *session).map(drop) {
                let elapsed = start.elapsed();
                state = RunState::Aborted;
                tracing::error!(%state, completed = i, error = %e, "insert failed");
                return BenchmarkOutcome::aborted(self.iterations, i, elapsed, e.into());
            }
        }

        let elapsed = start.elapsed();
        state = RunState::Completed;
        tracing::info!(%state, iterations = self.iterations, elapsed_secs = elapsed.as_secs_f64(), "run finished");
        BenchmarkOutcome::completed(self.iterations, elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DriverError;
    use crate::session::{Row, RowSet};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Session that fails the `fail_at`-th mutation (1-indexed, DDL included).
    struct FailingSession {
        fail_at: Option<usize>,
        mutations: Vec<String>,
    }

    impl FailingSession {
        fn new(fail_at: Option<usize>) -> Self {
            Self {
                fail_at,
                mutations: Vec::new(),
            }
        }
    }

    impl Session for FailingSession {
        fn backend(&self) -> BackendKind {
            BackendKind::Postgres
        }

        fn execute_mutation(&mut self, sql: &str) -> Result<(), DriverError> {
            if self.fail_at == Some(self.mutations.len() + 1) {
                return Err(DriverError::new("duplicate key value"));
            }
            self.mutations.push(sql.to_string());
            Ok(())
        }

        fn query<'c>(&'c mut self, _sql: &'c str) -> Result<RowSet<'c>, DriverError> {
            Ok(RowSet::new(Vec::new(), Box::new(std::iter::empty::<Result<Row, DriverError>>())))
        }

        fn close(self) -> Result<(), DriverError> {
            Ok(())
        }
    }

    #[test]
    fn test_all_iterations_complete() {
        let mut session = FailingSession::new(None);
        let outcome = BenchmarkRunner::new(25).run_session(&mut session);

        assert_eq!(outcome.state, RunState::Completed);
        assert!(!outcome.is_aborted());
        assert_eq!(outcome.iterations_completed, 25);
        assert!(outcome.failure.is_none());
        assert_eq!(session.mutations.len(), 26);
        assert_eq!(session.mutations[0], BackendKind::Postgres.create_table_sql());
        assert!(session.mutations[1..]
            .iter()
            .all(|sql| sql.starts_with("INSERT INTO perf (teststr,uuid) VALUES('")));
    }

    #[test]
    fn test_zero_iterations() {
        let mut session = FailingSession::new(None);
        let outcome = BenchmarkRunner::new(0).run_session(&mut session);

        assert_eq!(outcome.state, RunState::Completed);
        assert_eq!(outcome.iterations_completed, 0);
        assert!(outcome.elapsed_seconds() >= 0.0);
        assert_eq!(session.mutations.len(), 1);
    }

    #[test]
    fn test_aborts_on_kth_insert() {
        for k in [1u64, 2, 7, 10] {
            // Mutation 1 is the DDL, so insert k is mutation k + 1.
            let mut session = FailingSession::new(Some(k as usize + 1));
            let outcome = BenchmarkRunner::new(10).run_session(&mut session);

            assert!(outcome.is_aborted());
            assert_eq!(outcome.iterations_completed, k - 1);
            assert_eq!(outcome.iterations_requested, 10);
            assert_eq!(session.mutations.len() as u64, k);
            let message = outcome.failure_message().unwrap();
            assert!(message.contains("duplicate key value"));
            assert!(message.contains("INSERT INTO perf"));
            assert!(matches!(outcome.failure, Some(RunFailure::Execution(_))));
        }
    }

    #[test]
    fn test_ddl_failure_aborts_before_inserts() {
        let mut session = FailingSession::new(Some(1));
        let outcome = BenchmarkRunner::new(5).run_session(&mut session);

        assert!(outcome.is_aborted());
        assert_eq!(outcome.iterations_completed, 0);
        assert!(session.mutations.is_empty());
        assert!(outcome.failure_message().unwrap().contains("create table"));
    }

    #[test]
    fn test_progress_called_per_iteration() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut session = FailingSession::new(None);

        BenchmarkRunner::new(3)
            .with_progress(move |i, n| sink.borrow_mut().push((i, n)))
            .run_session(&mut session);

        assert_eq!(*seen.borrow(), vec![(0, 3), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_connection_failure_aborts() {
        let outcome = BenchmarkRunner::new(5).run(BackendKind::Sqlite, &ConnectionParameters::new(""));
        assert!(outcome.is_aborted());
        assert_eq!(outcome.iterations_completed, 0);
        assert!(matches!(
            outcome.failure,
            Some(RunFailure::Connection(ConnectionError::EmptyServer))
        ));
    }

    #[test]
    fn test_breakdown() {
        let breakdown = ElapsedBreakdown::from_duration(Duration::from_secs_f64(3723.5));
        assert_eq!(breakdown.hours, 1);
        assert_eq!(breakdown.minutes, 2);
        assert!((breakdown.seconds - 3.5).abs() < 1e-9);

        let short = ElapsedBreakdown::from_duration(Duration::from_millis(1500));
        assert_eq!((short.hours, short.minutes), (0, 0));
        assert!((short.seconds - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_inserts_per_second() {
        let outcome = BenchmarkOutcome::completed(100, Duration::from_secs(4));
        assert_eq!(outcome.inserts_per_second(), Some(25.0));
        assert_eq!(BenchmarkOutcome::completed(0, Duration::ZERO).inserts_per_second(), None);
    }
}

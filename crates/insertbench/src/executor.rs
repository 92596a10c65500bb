//! Statement execution.
//!
//! A statement is a read when its first six characters are `select`, in any
//! case. Everything else is a mutation and is committed. The prefix rule is
//! deliberately naive: leading whitespace or comments make a read statement
//! count as a mutation.

use crate::error::ExecutionError;
use crate::session::{RowSet, Session};

/// Keyword that marks a read statement.
pub const READ_KEYWORD: &str = "select";

/// What a successful statement produced.
#[derive(Debug)]
pub enum StatementOutcome<'c> {
    /// A mutation ran and was committed.
    NoRows,
    /// A read ran; its rows must be consumed before the next statement.
    RowSet(RowSet<'c>),
}

impl<'c> StatementOutcome<'c> {
    pub fn is_row_set(&self) -> bool {
        matches!(self, StatementOutcome::RowSet(_))
    }

    pub fn into_row_set(self) -> Option<RowSet<'c>> {
        match self {
            StatementOutcome::RowSet(rows) => Some(rows),
            StatementOutcome::NoRows => None,
        }
    }
}

/// Result of [`execute`].
pub type StatementResult<'c> = Result<StatementOutcome<'c>, ExecutionError>;

/// Whether `sql` is classified as a read statement.
pub fn is_read_statement(sql: &str) -> bool {
    let prefix: String = sql.chars().take(READ_KEYWORD.len()).collect();
    prefix.eq_ignore_ascii_case(READ_KEYWORD)
}

/// Execute one statement on `conn`.
///
/// Mutations are committed and yield [`StatementOutcome::NoRows`]; reads
/// yield a [`StatementOutcome::RowSet`]. Failures are never retried.
pub fn execute<'c, S>(sql: &'c str, conn: &'c mut S) -> StatementResult<'c>
where
    S: Session + ?Sized,
{
    let read = is_read_statement(sql);
    tracing::debug!(read, length = ExecutionError::length_of(sql), "executing statement");

    let result = if read {
        conn.query(sql).map(StatementOutcome::RowSet)
    } else {
        conn.execute_mutation(sql).map(|()| StatementOutcome::NoRows)
    };

    result.map_err(|cause| {
        let err = ExecutionError::new(cause, sql);
        tracing::warn!(error = %err.cause(), length = err.statement_length(), "statement failed");
        err
    })
}

//! Error types.
//!
//! Driver-specific errors never leave this crate: they are flattened into
//! [`DriverError`] inside a driver and surfaced to callers as a
//! [`ConnectionError`] or an [`ExecutionError`].

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::backend::BackendKind;

/// Crate-level result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Any failure a benchmark run can surface.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid input, detected before touching a database.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The database could not be reached.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// A statement failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The backend identifier is not one of the supported kinds.
    #[error("unknown database type `{0}`; supported types are sqlite, mssql, mysql and postgres")]
    InvalidBackend(String),

    /// The iteration count is missing or not a non-negative integer.
    #[error("invalid iteration value of `{0}`")]
    InvalidIterations(String),

    /// The port is not a valid TCP port number.
    #[error("invalid port `{0}`")]
    InvalidPort(String),
}

/// Connection errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// No server name or file path was given.
    #[error("server name can't be empty")]
    EmptyServer,

    /// The driver for this backend was not compiled in.
    #[error(
        "the {backend} driver is not available; rebuild with `--features {feature}` \
         before using the {backend} option"
    )]
    MissingDriver {
        backend: BackendKind,
        feature: &'static str,
    },

    /// Integrated authentication was requested but no authenticator is linked.
    #[error(
        "integrated authentication is not available in this build; supply a username \
         and password, or rebuild with `--features {feature}`"
    )]
    IntegratedAuthUnavailable { feature: &'static str },

    /// The directory holding the database file could not be created.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The driver refused the connection.
    #[error("unable to connect to {backend}: {message}")]
    Driver {
        backend: BackendKind,
        message: String,
    },
}

impl ConnectionError {
    /// Wrap a driver error, keeping only its message.
    pub fn driver(backend: BackendKind, err: impl fmt::Display) -> Self {
        Self::Driver {
            backend,
            message: err.to_string(),
        }
    }
}

/// Flattened error raised by a driver while running a statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DriverError(pub String);

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<rusqlite::Error> for DriverError {
    fn from(err: rusqlite::Error) -> Self {
        Self(err.to_string())
    }
}

#[cfg(any(feature = "postgres", feature = "mysql"))]
impl From<sqlx::Error> for DriverError {
    fn from(err: sqlx::Error) -> Self {
        Self(err.to_string())
    }
}

#[cfg(feature = "mssql")]
impl From<tiberius::error::Error> for DriverError {
    fn from(err: tiberius::error::Error) -> Self {
        Self(err.to_string())
    }
}

/// A statement failed to execute or commit.
///
/// The message carries the driver's cause, at most
/// [`ExecutionError::PREVIEW_CHARS`] characters of the statement, and the
/// statement's full length so oversized statements can be diagnosed without
/// dumping them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to execute query: {cause}\n{preview}\nLength of SQL statement {length}")]
pub struct ExecutionError {
    cause: String,
    preview: String,
    length: usize,
}

impl ExecutionError {
    /// Maximum number of statement characters kept in the message.
    pub const PREVIEW_CHARS: usize = 255;

    pub fn new(cause: impl fmt::Display, sql: &str) -> Self {
        Self {
            cause: cause.to_string(),
            preview: sql.chars().take(Self::PREVIEW_CHARS).collect(),
            length: Self::length_of(sql),
        }
    }

    /// Length of `sql` as reported in the message, in characters.
    pub fn length_of(sql: &str) -> usize {
        sql.chars().count()
    }

    /// The driver's message.
    pub fn cause(&self) -> &str {
        &self.cause
    }

    /// The leading part of the failed statement.
    pub fn preview(&self) -> &str {
        &self.preview
    }

    /// Length of the failed statement in characters.
    pub fn statement_length(&self) -> usize {
        self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_error_truncates_long_statements() {
        let sql = format!("INSERT INTO perf (teststr) VALUES('{}')", "x".repeat(1000));
        let err = ExecutionError::new("disk I/O error", &sql);

        assert_eq!(err.preview().chars().count(), ExecutionError::PREVIEW_CHARS);
        assert_eq!(err.statement_length(), sql.len());

        let message = err.to_string();
        assert!(message.contains("disk I/O error"));
        assert!(message.contains(&sql[..255]));
        assert!(!message.contains(&sql[..256]));
        assert!(message.ends_with(&format!("Length of SQL statement {}", sql.len())));
    }

    #[test]
    fn test_execution_error_keeps_short_statements() {
        let err = ExecutionError::new("syntax error", "DELETE FROM nowhere");
        assert_eq!(err.preview(), "DELETE FROM nowhere");
        assert_eq!(err.statement_length(), 19);
        assert_eq!(
            err.to_string(),
            "failed to execute query: syntax error\nDELETE FROM nowhere\nLength of SQL statement 19"
        );
    }

    #[test]
    fn test_execution_error_counts_characters_not_bytes() {
        let sql = "é".repeat(300);
        let err = ExecutionError::new("boom", &sql);
        assert_eq!(err.preview().chars().count(), 255);
        assert_eq!(err.statement_length(), 300);
    }

    #[test]
    fn test_missing_driver_names_feature() {
        let err = ConnectionError::MissingDriver {
            backend: BackendKind::Postgres,
            feature: "postgres",
        };
        let message = err.to_string();
        assert!(message.contains("postgres driver is not available"));
        assert!(message.contains("--features postgres"));
    }

    #[test]
    fn test_error_conversions() {
        let err: Error = ConnectionError::EmptyServer.into();
        assert!(matches!(err, Error::Connection(ConnectionError::EmptyServer)));

        let err: Error = ConfigError::InvalidBackend("oracle".into()).into();
        assert_eq!(
            err.to_string(),
            "unknown database type `oracle`; supported types are sqlite, mssql, mysql and postgres"
        );
    }
}

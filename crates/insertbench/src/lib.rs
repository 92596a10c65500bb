//! Insert throughput benchmark
//!
//! This crate measures how fast a relational database accepts single-row
//! inserts. It provides one connect/query interface over several drivers:
//!
//! - **SQLite**: embedded, file based (`rusqlite`)
//! - **MS SQL**: networked (`tiberius`, feature `mssql`)
//! - **MySQL**: networked (`sqlx`, feature `mysql`)
//! - **PostgreSQL**: networked (`sqlx`, feature `postgres`)
//!
//! # Flow
//!
//! A [`BackendKind`] is resolved from its identifier, [`connect`] opens a
//! [`Connection`], [`execute`] runs statements on it, and
//! [`BenchmarkRunner`] drives the create-table statement followed by N
//! inserts, stopping at the first failed statement.

pub mod backend;
pub mod connection;
pub mod drivers;
pub mod error;
pub mod executor;
pub mod fixtures;
pub mod runner;
pub mod session;

pub use backend::{BackendKind, ConnectionParameters};
pub use connection::{connect, Connection};
pub use error::{ConfigError, ConnectionError, DriverError, Error, ExecutionError, Result};
pub use executor::{execute, is_read_statement, StatementOutcome, StatementResult};
pub use fixtures::{insert_statement, PhraseGenerator};
pub use runner::{BenchmarkOutcome, BenchmarkRunner, ElapsedBreakdown, RunFailure, RunState};
pub use session::{Row, RowSet, Session, Value};

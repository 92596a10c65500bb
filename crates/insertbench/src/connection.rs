//! Connection factory.
//!
//! [`connect`] validates the parameters, picks the driver for the backend
//! kind and returns a [`Connection`] that dispatches every call to it.

use crate::backend::{BackendKind, ConnectionParameters};
use crate::drivers::SqliteConnection;
use crate::error::{ConnectionError, DriverError};
use crate::session::{RowSet, Session};

#[cfg(feature = "mssql")]
use crate::drivers::MsSqlConnection;
#[cfg(feature = "mysql")]
use crate::drivers::MySqlConnection;
#[cfg(feature = "postgres")]
use crate::drivers::PostgresConnection;

/// A live connection to one of the compiled-in backends.
pub enum Connection {
    Sqlite(SqliteConnection),
    #[cfg(feature = "mssql")]
    MsSql(MsSqlConnection),
    #[cfg(feature = "mysql")]
    MySql(MySqlConnection),
    #[cfg(feature = "postgres")]
    Postgres(PostgresConnection),
}

/// Open a connection to `kind` using `params`.
///
/// An empty server is rejected before any filesystem or network access.
pub fn connect(kind: BackendKind, params: &ConnectionParameters) -> Result<Connection, ConnectionError> {
    if params.server.is_empty() {
        return Err(ConnectionError::EmptyServer);
    }

    tracing::info!(backend = %kind, server = %params.server, "establishing connection");

    let result = match kind {
        BackendKind::Sqlite => SqliteConnection::open(params).map(Connection::Sqlite),
        BackendKind::MsSql => connect_mssql(params),
        BackendKind::MySql => connect_mysql(params),
        BackendKind::Postgres => connect_postgres(params),
    };

    match &result {
        Ok(_) => tracing::info!(backend = %kind, "connected"),
        Err(e) => tracing::error!(backend = %kind, error = %e, "connection failed"),
    }
    result
}

#[cfg(feature = "mssql")]
fn connect_mssql(params: &ConnectionParameters) -> Result<Connection, ConnectionError> {
    MsSqlConnection::connect(params).map(Connection::MsSql)
}

#[cfg(not(feature = "mssql"))]
fn connect_mssql(_params: &ConnectionParameters) -> Result<Connection, ConnectionError> {
    Err(missing_driver(BackendKind::MsSql))
}

#[cfg(feature = "mysql")]
fn connect_mysql(params: &ConnectionParameters) -> Result<Connection, ConnectionError> {
    MySqlConnection::connect(params).map(Connection::MySql)
}

#[cfg(not(feature = "mysql"))]
fn connect_mysql(_params: &ConnectionParameters) -> Result<Connection, ConnectionError> {
    Err(missing_driver(BackendKind::MySql))
}

#[cfg(feature = "postgres")]
fn connect_postgres(params: &ConnectionParameters) -> Result<Connection, ConnectionError> {
    PostgresConnection::connect(params).map(Connection::Postgres)
}

#[cfg(not(feature = "postgres"))]
fn connect_postgres(_params: &ConnectionParameters) -> Result<Connection, ConnectionError> {
    Err(missing_driver(BackendKind::Postgres))
}

#[cfg(not(all(feature = "mssql", feature = "mysql", feature = "postgres")))]
fn missing_driver(backend: BackendKind) -> ConnectionError {
    ConnectionError::MissingDriver {
        backend,
        feature: backend.driver_feature().unwrap_or_default(),
    }
}

impl Session for Connection {
    fn backend(&self) -> BackendKind {
        match self {
            Connection::Sqlite(c) => c.backend(),
            #[cfg(feature = "mssql")]
            Connection::MsSql(c) => c.backend(),
            #[cfg(feature = "mysql")]
            Connection::MySql(c) => c.backend(),
            #[cfg(feature = "postgres")]
            Connection::Postgres(c) => c.backend(),
        }
    }

    fn execute_mutation(&mut self, sql: &str) -> Result<(), DriverError> {
        match self {
            Connection::Sqlite(c) => c.execute_mutation(sql),
            #[cfg(feature = "mssql")]
            Connection::MsSql(c) => c.execute_mutation(sql),
            #[cfg(feature = "mysql")]
            Connection::MySql(c) => c.execute_mutation(sql),
            #[cfg(feature = "postgres")]
            Connection::Postgres(c) => c.execute_mutation(sql),
        }
    }

    fn query<'c>(&'c mut self, sql: &'c str) -> Result<RowSet<'c>, DriverError> {
        match self {
            Connection::Sqlite(c) => c.query(sql),
            #[cfg(feature = "mssql")]
            Connection::MsSql(c) => c.query(sql),
            #[cfg(feature = "mysql")]
            Connection::MySql(c) => c.query(sql),
            #[cfg(feature = "postgres")]
            Connection::Postgres(c) => c.query(sql),
        }
    }

    fn close(self) -> Result<(), DriverError> {
        let backend = self.backend();
        let result = match self {
            Connection::Sqlite(c) => c.close(),
            #[cfg(feature = "mssql")]
            Connection::MsSql(c) => c.close(),
            #[cfg(feature = "mysql")]
            Connection::MySql(c) => c.close(),
            #[cfg(feature = "postgres")]
            Connection::Postgres(c) => c.close(),
        };
        tracing::debug!(%backend, ok = result.is_ok(), "connection closed");
        result
    }
}

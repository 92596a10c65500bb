//! Backend drivers.
//!
//! SQLite is always compiled in. Each networked driver sits behind the cargo
//! feature named by [`BackendKind::driver_feature`](crate::BackendKind::driver_feature).

pub mod sqlite;

#[cfg(feature = "mssql")]
pub mod mssql;

#[cfg(feature = "mysql")]
pub mod mysql;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(any(feature = "mssql", feature = "mysql", feature = "postgres"))]
mod blocking;

pub use sqlite::SqliteConnection;

#[cfg(feature = "mssql")]
pub use mssql::MsSqlConnection;

#[cfg(feature = "mysql")]
pub use mysql::MySqlConnection;

#[cfg(feature = "postgres")]
pub use postgres::PostgresConnection;

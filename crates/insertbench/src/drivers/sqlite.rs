//! SQLite backend.
//!
//! The database is a single file. The configured server value is treated as
//! a path and normalized so that it always ends in `.db`.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;

use crate::backend::{BackendKind, ConnectionParameters};
use crate::error::{ConnectionError, DriverError};
use crate::session::{Row, RowSet, Session, Value};

/// Extension every SQLite database file carries.
pub const FILE_EXTENSION: &str = ".db";

/// Normalize a configured path into the database file path.
///
/// Backslashes become forward slashes, one trailing slash is dropped and
/// [`FILE_EXTENSION`] is appended unless already present.
pub fn normalize_path(server: &str) -> PathBuf {
    let path = server.replace('\\', "/");
    let path = path.strip_suffix('/').unwrap_or(&path);

    if path.ends_with(FILE_EXTENSION) {
        PathBuf::from(path)
    } else {
        PathBuf::from(format!("{path}{FILE_EXTENSION}"))
    }
}

/// SQLite connection.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
    path: PathBuf,
}

impl SqliteConnection {
    /// Open (or create) the database file named by `params.server`.
    ///
    /// Missing parent directories are created first.
    pub fn open(params: &ConnectionParameters) -> Result<Self, ConnectionError> {
        let path = normalize_path(&params.server);

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            if !dir.exists() {
                tracing::debug!(dir = %dir.display(), "creating database directory");
                fs::create_dir_all(dir).map_err(|source| ConnectionError::CreateDirectory {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
        }

        let conn = rusqlite::Connection::open(&path)
            .map_err(|e| ConnectionError::driver(BackendKind::Sqlite, e))?;

        tracing::debug!(path = %path.display(), "opened sqlite database");
        Ok(Self { conn, path })
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Session for SqliteConnection {
    fn backend(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    fn execute_mutation(&mut self, sql: &str) -> Result<(), DriverError> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.commit()?;
        Ok(())
    }

    fn query<'c>(&'c mut self, sql: &'c str) -> Result<RowSet<'c>, DriverError> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        // Rows borrow the prepared statement, so they are stepped here rather
        // than handed out lazily.
        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get_ref(i).map(Value::from))
                    .collect::<rusqlite::Result<Row>>()
            })?
            .collect::<rusqlite::Result<Vec<Row>>>()?;

        Ok(RowSet::new(columns, Box::new(rows.into_iter().map(Ok::<Row, DriverError>))))
    }

    fn close(self) -> Result<(), DriverError> {
        self.conn.close().map_err(|(_, e)| e.into())
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

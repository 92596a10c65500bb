//! PostgreSQL backend.
//!
//! Enable with `--features postgres`.

use futures::{StreamExt, TryStreamExt};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{Column, Connection, Row as _, TypeInfo};
use tokio::runtime::Runtime;

use crate::backend::{BackendKind, ConnectionParameters};
use crate::error::{ConnectionError, DriverError};
use crate::session::{Row, RowSet, Session, Value};

use super::blocking;

/// PostgreSQL connection.
pub struct PostgresConnection {
    conn: PgConnection,
    runtime: Runtime,
}

impl PostgresConnection {
    /// Connect with host, port, optional credentials and database.
    pub fn connect(params: &ConnectionParameters) -> Result<Self, ConnectionError> {
        let runtime = blocking::runtime(BackendKind::Postgres)?;

        let mut options = PgConnectOptions::new().host(&params.server);
        if let Some(port) = params.port_for(BackendKind::Postgres) {
            options = options.port(port);
        }
        if let Some(username) = &params.username {
            options = options.username(username);
        }
        if let Some(password) = &params.password {
            options = options.password(password);
        }
        if let Some(database) = &params.database {
            options = options.database(database);
        }

        let conn = runtime
            .block_on(PgConnection::connect_with(&options))
            .map_err(|e| ConnectionError::driver(BackendKind::Postgres, e))?;

        Ok(Self { conn, runtime })
    }
}

impl Session for PostgresConnection {
    fn backend(&self) -> BackendKind {
        BackendKind::Postgres
    }

    fn execute_mutation(&mut self, sql: &str) -> Result<(), DriverError> {
        let Self { conn, runtime } = self;
        runtime.block_on(async {
            let mut tx = conn.begin().await?;
            sqlx::raw_sql(sql).execute(&mut *tx).await?;
            tx.commit().await?;
            Ok::<_, sqlx::Error>(())
        })?;
        Ok(())
    }

    fn query<'c>(&'c mut self, sql: &'c str) -> Result<RowSet<'c>, DriverError> {
        let Self { conn, runtime } = self;
        let stream = sqlx::raw_sql(sql)
            .fetch(conn)
            .map_err(DriverError::from)
            .boxed_local();
        blocking::row_set(runtime, stream, column_names, decode_row)
    }

    fn close(self) -> Result<(), DriverError> {
        let Self { conn, runtime } = self;
        runtime.block_on(conn.close())?;
        Ok(())
    }
}

fn column_names(row: &PgRow) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

fn decode_row(row: PgRow) -> Row {
    (0..row.len()).map(|i| decode_column(&row, i)).collect()
}

/// Decode a column by trying the Rust types PostgreSQL values map onto.
fn decode_column(row: &PgRow, index: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map_or(Value::Null, Value::Integer);
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(index) {
        return v.map_or(Value::Null, |v| Value::Integer(i64::from(v)));
    }
    if let Ok(v) = row.try_get::<Option<i16>, _>(index) {
        return v.map_or(Value::Null, |v| Value::Integer(i64::from(v)));
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return v.map_or(Value::Null, |v| Value::Integer(i64::from(v)));
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v.map_or(Value::Null, Value::Real);
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(index) {
        return v.map_or(Value::Null, |v| Value::Real(f64::from(v)));
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map_or(Value::Null, Value::Text);
    }
    if let Ok(v) = row.try_get::<Option<sqlx::types::Uuid>, _>(index) {
        return v.map_or(Value::Null, Value::Uuid);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return v.map_or(Value::Null, Value::Blob);
    }
    Value::Other(row.column(index).type_info().name().to_string())
}

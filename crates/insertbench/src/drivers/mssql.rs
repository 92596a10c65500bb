//! Microsoft SQL Server backend.
//!
//! Enable with `--features mssql`. Authentication follows
//! [`ConnectionParameters::mssql_connection_string`]: integrated when no
//! username is configured, SQL login otherwise. Integrated authentication
//! needs a platform authenticator: SSPI on Windows, or GSSAPI/Kerberos with
//! the `mssql-gssapi` feature elsewhere.

use futures::{StreamExt, TryStreamExt};
use tiberius::{Client, ColumnData, Config};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::backend::{BackendKind, ConnectionParameters};
use crate::error::{ConnectionError, DriverError};
use crate::session::{Row, RowSet, Session, Value};

use super::blocking;

type TdsClient = Client<Compat<TcpStream>>;

/// Feature that links the GSSAPI authenticator on non-Windows targets.
pub const INTEGRATED_AUTH_FEATURE: &str = "mssql-gssapi";

/// Whether this build can log in with the operator's own identity.
pub const INTEGRATED_AUTH: bool = cfg!(any(windows, feature = "mssql-gssapi"));

/// MS SQL Server connection.
pub struct MsSqlConnection {
    client: TdsClient,
    runtime: Runtime,
}

impl MsSqlConnection {
    /// Connect using the ADO.NET connection string built from `params`.
    ///
    /// Without a username and without a linked authenticator the driver would
    /// silently log in as an empty SQL user, so that case is refused here.
    pub fn connect(params: &ConnectionParameters) -> Result<Self, ConnectionError> {
        if params.username.is_none() && !INTEGRATED_AUTH {
            return Err(ConnectionError::IntegratedAuthUnavailable {
                feature: INTEGRATED_AUTH_FEATURE,
            });
        }

        let runtime = blocking::runtime(BackendKind::MsSql)?;

        let config = Config::from_ado_string(&params.mssql_connection_string())
            .map_err(|e| ConnectionError::driver(BackendKind::MsSql, e))?;
        let client = runtime
            .block_on(open_client(config))
            .map_err(|e| ConnectionError::driver(BackendKind::MsSql, e))?;

        Ok(Self { client, runtime })
    }
}

async fn open_client(config: Config) -> tiberius::Result<TdsClient> {
    let tcp = TcpStream::connect(config.get_addr()).await?;
    tcp.set_nodelay(true)?;
    Client::connect(config, tcp.compat_write()).await
}

/// Run a batch and drain its results.
async fn run_batch(client: &mut TdsClient, sql: &str) -> tiberius::Result<()> {
    client.simple_query(sql).await?.into_results().await?;
    Ok(())
}

impl Session for MsSqlConnection {
    fn backend(&self) -> BackendKind {
        BackendKind::MsSql
    }

    fn execute_mutation(&mut self, sql: &str) -> Result<(), DriverError> {
        let Self { client, runtime } = self;
        runtime.block_on(async {
            run_batch(client, "BEGIN TRANSACTION").await?;
            if let Err(e) = run_batch(client, sql).await {
                if let Err(rollback) = run_batch(client, "IF @@TRANCOUNT > 0 ROLLBACK TRANSACTION").await {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                return Err(e);
            }
            run_batch(client, "COMMIT TRANSACTION").await
        })?;
        Ok(())
    }

    fn query<'c>(&'c mut self, sql: &'c str) -> Result<RowSet<'c>, DriverError> {
        let Self { client, runtime } = self;
        let results = runtime.block_on(client.simple_query(sql))?;
        let stream = results
            .into_row_stream()
            .map_err(DriverError::from)
            .boxed_local();
        blocking::row_set(runtime, stream, column_names, decode_row)
    }

    fn close(self) -> Result<(), DriverError> {
        let Self { client, runtime } = self;
        runtime.block_on(client.close())?;
        Ok(())
    }
}

fn column_names(row: &tiberius::Row) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

fn decode_row(row: tiberius::Row) -> Row {
    row.into_iter().map(decode_column).collect()
}

fn decode_column(data: ColumnData<'static>) -> Value {
    match data {
        ColumnData::U8(v) => v.map_or(Value::Null, |v| Value::Integer(i64::from(v))),
        ColumnData::I16(v) => v.map_or(Value::Null, |v| Value::Integer(i64::from(v))),
        ColumnData::I32(v) => v.map_or(Value::Null, |v| Value::Integer(i64::from(v))),
        ColumnData::I64(v) => v.map_or(Value::Null, Value::Integer),
        ColumnData::F32(v) => v.map_or(Value::Null, |v| Value::Real(f64::from(v))),
        ColumnData::F64(v) => v.map_or(Value::Null, Value::Real),
        ColumnData::Bit(v) => v.map_or(Value::Null, |v| Value::Integer(i64::from(v))),
        ColumnData::String(v) => v.map_or(Value::Null, |s| Value::Text(s.into_owned())),
        ColumnData::Guid(v) => v.map_or(Value::Null, Value::Uuid),
        ColumnData::Binary(v) => v.map_or(Value::Null, |b| Value::Blob(b.into_owned())),
        other => Value::Other(type_name(&other).to_string()),
    }
}

/// SQL Server type name of a column value.
fn type_name(data: &ColumnData<'_>) -> &'static str {
    match data {
        ColumnData::U8(_) => "tinyint",
        ColumnData::I16(_) => "smallint",
        ColumnData::I32(_) => "int",
        ColumnData::I64(_) => "bigint",
        ColumnData::F32(_) => "real",
        ColumnData::F64(_) => "float",
        ColumnData::Bit(_) => "bit",
        ColumnData::String(_) => "nvarchar",
        ColumnData::Guid(_) => "uniqueidentifier",
        ColumnData::Binary(_) => "varbinary",
        ColumnData::Numeric(_) => "numeric",
        ColumnData::Xml(_) => "xml",
        ColumnData::DateTime(_) => "datetime",
        ColumnData::SmallDateTime(_) => "smalldatetime",
        ColumnData::Time(_) => "time",
        ColumnData::Date(_) => "date",
        ColumnData::DateTime2(_) => "datetime2",
        ColumnData::DateTimeOffset(_) => "datetimeoffset",
    }
}

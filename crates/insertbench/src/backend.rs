//! Backend kinds and connection parameters.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Default MS SQL Server port.
pub const DEFAULT_MSSQL_PORT: u16 = 1433;

/// Default MySQL / MariaDB port.
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Default PostgreSQL port.
pub const DEFAULT_POSTGRES_PORT: u16 = 5432;

/// Name of the benchmark table.
pub const TABLE_NAME: &str = "perf";

/// Supported database engine families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Embedded, file-based SQLite.
    Sqlite,
    /// Microsoft SQL Server.
    MsSql,
    /// MySQL or MariaDB.
    MySql,
    /// PostgreSQL.
    Postgres,
}

impl BackendKind {
    /// All kinds, in identifier order.
    pub const ALL: [BackendKind; 4] = [
        BackendKind::Sqlite,
        BackendKind::MsSql,
        BackendKind::MySql,
        BackendKind::Postgres,
    ];

    /// Identifier accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Sqlite => "sqlite",
            BackendKind::MsSql => "mssql",
            BackendKind::MySql => "mysql",
            BackendKind::Postgres => "postgres",
        }
    }

    /// Port used when none is configured.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            BackendKind::Sqlite => None,
            BackendKind::MsSql => Some(DEFAULT_MSSQL_PORT),
            BackendKind::MySql => Some(DEFAULT_MYSQL_PORT),
            BackendKind::Postgres => Some(DEFAULT_POSTGRES_PORT),
        }
    }

    /// Cargo feature that compiles this backend's driver in.
    ///
    /// SQLite is always available.
    pub fn driver_feature(&self) -> Option<&'static str> {
        match self {
            BackendKind::Sqlite => None,
            BackendKind::MsSql => Some("mssql"),
            BackendKind::MySql => Some("mysql"),
            BackendKind::Postgres => Some("postgres"),
        }
    }

    /// Idempotent statement creating the benchmark table in this backend's dialect.
    ///
    /// The table has one text column (`teststr`) and one identifier column (`uuid`).
    pub fn create_table_sql(&self) -> String {
        match self {
            BackendKind::Sqlite | BackendKind::Postgres => {
                format!("create table if not exists {TABLE_NAME}(teststr varchar, uuid uuid);")
            }
            BackendKind::MySql => {
                format!("create table if not exists {TABLE_NAME}(teststr text, uuid char(36));")
            }
            BackendKind::MsSql => format!(
                "if object_id(N'{TABLE_NAME}', N'U') is null \
                 create table {TABLE_NAME}(teststr nvarchar(max), uuid uniqueidentifier);"
            ),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    /// Identifiers are matched case-sensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidBackend(s.to_string()))
    }
}

/// Where and as whom to connect.
///
/// `server` is a host name for networked backends and a file path for SQLite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionParameters {
    pub server: String,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

impl ConnectionParameters {
    /// Create parameters for the given host or path.
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the login name and password.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the target database.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Configured port, or the backend's default.
    pub fn port_for(&self, kind: BackendKind) -> Option<u16> {
        self.port.or_else(|| kind.default_port())
    }

    /// ADO.NET style connection string for MS SQL Server.
    ///
    /// Without a username the string requests integrated (trusted) authentication;
    /// with one it carries an explicit SQL login.
    pub fn mssql_connection_string(&self) -> String {
        let port = self.port_for(BackendKind::MsSql).unwrap_or(DEFAULT_MSSQL_PORT);
        let mut parts = vec![format!("server=tcp:{},{}", self.server, port)];

        if let Some(database) = &self.database {
            parts.push(format!("database={database}"));
        }

        match &self.username {
            None => parts.push("IntegratedSecurity=true".to_string()),
            Some(user) => {
                parts.push(format!("user={user}"));
                parts.push(format!("password={}", self.password.as_deref().unwrap_or("")));
            }
        }

        parts.push("TrustServerCertificate=true".to_string());
        parts.join(";")
    }
}

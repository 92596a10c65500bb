//! Command-line and environment configuration.

use clap::Parser;
use insertbench::{BackendKind, ConfigError, ConnectionParameters};

/// Environment variable the original tooling used for the username.
pub const LEGACY_USER_ENV: &str = "DBUSSER";

/// Command-line arguments. Every option falls back to an environment variable.
#[derive(Parser, Debug, Default)]
#[command(name = "insertbench")]
#[command(version, about = "Test the insert speed of a database", long_about = None)]
pub struct Args {
    /// Database type: sqlite, mssql, mysql or postgres.
    #[arg(short = 't', long = "db-type", env = "DBTYPE")]
    pub db_type: Option<String>,

    /// Server host name, or the database file path for sqlite.
    #[arg(short = 'H', long, env = "HOST")]
    pub host: Option<String>,

    /// Server port (defaults to the backend's standard port).
    #[arg(short, long, env = "PORT")]
    pub port: Option<String>,

    /// Login name. Without one, MS SQL uses integrated authentication.
    #[arg(short, long, env = "DBUSER")]
    pub user: Option<String>,

    /// Login password.
    #[arg(long, env = "DBPWD", hide_env_values = true)]
    pub password: Option<String>,

    /// Database (catalog / schema) to use.
    #[arg(short, long, env = "DB")]
    pub database: Option<String>,

    /// Number of rows to insert.
    #[arg(short = 'n', long, env = "ITERATIONS")]
    pub iterations: Option<String>,

    /// Do not print the per-iteration progress line.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Validated benchmark configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    pub backend: BackendKind,
    pub params: ConnectionParameters,
    pub iterations: u64,
    pub quiet: bool,
}

impl Args {
    /// Fill the username from [`LEGACY_USER_ENV`] when it is not set otherwise.
    pub fn with_legacy_user(mut self, legacy: Option<String>) -> Self {
        if non_empty(self.user.clone()).is_none() {
            self.user = legacy;
        }
        self
    }

    /// Validate the arguments.
    ///
    /// The host is passed through unchecked; an empty host is reported by
    /// the connection step.
    pub fn into_config(self) -> Result<BenchConfig, ConfigError> {
        let iterations = parse_iterations(self.iterations.as_deref().unwrap_or(""))?;
        let backend = non_empty(self.db_type).unwrap_or_default().parse::<BackendKind>()?;
        let port = non_empty(self.port).map(|p| parse_port(&p)).transpose()?;

        let params = ConnectionParameters {
            server: non_empty(self.host).unwrap_or_default(),
            port,
            username: non_empty(self.user),
            password: non_empty(self.password),
            database: non_empty(self.database),
        };

        Ok(BenchConfig {
            backend,
            params,
            iterations,
            quiet: self.quiet,
        })
    }
}

/// Parse an iteration count: ASCII digits only.
pub fn parse_iterations(value: &str) -> Result<u64, ConfigError> {
    let invalid = || ConfigError::InvalidIterations(value.to_string());
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    value.parse().map_err(|_| invalid())
}

/// Parse a TCP port.
pub fn parse_port(value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidPort(value.to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            db_type: Some("postgres".into()),
            host: Some("db.local".into()),
            iterations: Some("1000".into()),
            ..Args::default()
        }
    }

    #[test]
    fn test_parse_iterations() {
        assert_eq!(parse_iterations("0"), Ok(0));
        assert_eq!(parse_iterations("250000"), Ok(250_000));
        for bad in ["", "-1", "+5", "1e3", "12 ", "ten", "99999999999999999999999"] {
            assert_eq!(
                parse_iterations(bad),
                Err(ConfigError::InvalidIterations(bad.to_string())),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("5432"), Ok(5432));
        assert_eq!(parse_port("70000"), Err(ConfigError::InvalidPort("70000".into())));
        assert_eq!(parse_port("http"), Err(ConfigError::InvalidPort("http".into())));
    }

    #[test]
    fn test_into_config() {
        let config = Args {
            port: Some("6543".into()),
            user: Some("bench".into()),
            password: Some("pw".into()),
            database: Some("perfdb".into()),
            ..args()
        }
        .into_config()
        .unwrap();

        assert_eq!(config.backend, BackendKind::Postgres);
        assert_eq!(config.iterations, 1000);
        assert_eq!(
            config.params,
            ConnectionParameters::new("db.local")
                .with_port(6543)
                .with_credentials("bench", "pw")
                .with_database("perfdb")
        );
    }

    #[test]
    fn test_empty_values_are_absent() {
        let config = Args {
            port: Some(String::new()),
            user: Some(String::new()),
            password: Some(String::new()),
            database: Some(String::new()),
            ..args()
        }
        .into_config()
        .unwrap();

        assert_eq!(config.params, ConnectionParameters::new("db.local"));
    }

    #[test]
    fn test_invalid_iterations_checked_first() {
        let err = Args {
            db_type: Some("oracle".into()),
            iterations: Some("lots".into()),
            ..args()
        }
        .into_config()
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidIterations("lots".into()));
    }

    #[test]
    fn test_missing_iterations_rejected() {
        let err = Args {
            iterations: None,
            ..args()
        }
        .into_config()
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidIterations(String::new()));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = Args {
            db_type: Some("oracle".into()),
            ..args()
        }
        .into_config()
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidBackend("oracle".into()));

        let err = Args {
            db_type: None,
            ..args()
        }
        .into_config()
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidBackend(String::new()));
    }

    #[test]
    fn test_empty_host_passes_validation() {
        let config = Args { host: None, ..args() }.into_config().unwrap();
        assert!(config.params.server.is_empty());
    }

    #[test]
    fn test_legacy_user_fallback() {
        let args = args().with_legacy_user(Some("legacy".into()));
        assert_eq!(args.user.as_deref(), Some("legacy"));

        let args = Args {
            user: Some("modern".into()),
            ..self::args()
        }
        .with_legacy_user(Some("legacy".into()));
        assert_eq!(args.user.as_deref(), Some("modern"));
    }

    #[test]
    fn test_cli_flags() {
        let args = Args::try_parse_from([
            "insertbench",
            "--db-type",
            "sqlite",
            "-H",
            "data/bench",
            "-n",
            "10",
            "--quiet",
        ])
        .unwrap();
        let config = args.into_config().unwrap();
        assert_eq!(config.backend, BackendKind::Sqlite);
        assert_eq!(config.params.server, "data/bench");
        assert_eq!(config.iterations, 10);
        assert!(config.quiet);
    }
}

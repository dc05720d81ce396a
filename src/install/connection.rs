//! Database connection for the install pipeline.
//!
//! [`DatabaseConnector`] is the seam between the pipeline and the database
//! driver. [`SqlxConnector`] opens real connections; tests substitute their
//! own connector.

use super::DatabaseSettings;
use crate::DbDriver;
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use std::fmt;
use thiserror::Error;

/// Build the driver-specific connection string for `settings`.
///
/// The database name is never part of this string; the database artifact
/// stage appends it.
///
/// # Example
///
/// ```rust
/// use install_preflight::{connection_string, DatabaseName, DatabaseSettings, DbDriver};
///
/// let settings = DatabaseSettings {
///     driver: DbDriver::Mysql,
///     hostname: "localhost".to_string(),
///     port: 3306,
///     location: None,
///     username: "root".to_string(),
///     password: String::new(),
///     database: DatabaseName::default(),
/// };
/// assert_eq!(connection_string(&settings), "mysql:host=localhost;port=3306;charset=utf8;");
/// ```
pub fn connection_string(settings: &DatabaseSettings) -> String {
    match settings.driver {
        DbDriver::Mysql => format!(
            "mysql:host={};port={};charset=utf8;",
            settings.hostname, settings.port
        ),
        DbDriver::Pgsql => format!("pgsql:host={};port={};", settings.hostname, settings.port),
        DbDriver::Sqlite => format!(
            "sqlite:{}",
            settings
                .location
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        ),
    }
}

/// Connection string plus the live handle it produced.
///
/// Owned by the pipeline for the duration of one install call.
pub struct ConnectionDescriptor<C> {
    connection_string: String,
    connection: C,
}

impl<C> ConnectionDescriptor<C> {
    pub(crate) fn new(connection_string: String, connection: C) -> Self {
        Self {
            connection_string,
            connection,
        }
    }

    /// Connection string used to open the connection.
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Mutable access to the live connection.
    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    /// Connection string to persist, with `dbname=<name>;` appended when a
    /// database was selected.
    pub fn persisted_connection_string(&self, database: &super::DatabaseName) -> String {
        if database.is_empty() {
            self.connection_string.clone()
        } else {
            format!("{}dbname={};", self.connection_string, database)
        }
    }
}

impl<C> fmt::Debug for ConnectionDescriptor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("connection_string", &self.connection_string)
            .finish_non_exhaustive()
    }
}

/// Error returned by a connection attempt, carrying the driver's own text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ConnectError {
    /// Error text reported by the driver.
    pub message: String,
}

impl ConnectError {
    /// Wrap a driver message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for ConnectError {
    fn from(e: sqlx::Error) -> Self {
        Self::new(e.to_string())
    }
}

/// Opens database connections for the pipeline.
#[async_trait]
pub trait DatabaseConnector: Send + Sync {
    /// Live connection handle type.
    type Connection: Send;

    /// Open a connection. Every driver failure must come back as a
    /// [`ConnectError`]; nothing may panic.
    async fn connect(&self, settings: &DatabaseSettings) -> Result<Self::Connection, ConnectError>;
}

/// A live connection to one of the supported backends.
#[derive(Debug)]
pub enum LiveConnection {
    /// MySQL / MariaDB connection.
    Mysql(MySqlConnection),
    /// PostgreSQL connection.
    Postgres(PgConnection),
    /// SQLite connection.
    Sqlite(SqliteConnection),
}

impl LiveConnection {
    /// Driver of this connection.
    pub fn driver(&self) -> DbDriver {
        match self {
            Self::Mysql(_) => DbDriver::Mysql,
            Self::Postgres(_) => DbDriver::Pgsql,
            Self::Sqlite(_) => DbDriver::Sqlite,
        }
    }

    /// Close the connection gracefully.
    pub async fn close(self) -> Result<(), sqlx::Error> {
        match self {
            Self::Mysql(conn) => conn.close().await,
            Self::Postgres(conn) => conn.close().await,
            Self::Sqlite(conn) => conn.close().await,
        }
    }
}

/// Connector backed by `sqlx`.
///
/// SQLite database files are created when missing. No database is selected
/// at connect time; the database may not exist yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlxConnector;

#[async_trait]
impl DatabaseConnector for SqlxConnector {
    type Connection = LiveConnection;

    async fn connect(&self, settings: &DatabaseSettings) -> Result<LiveConnection, ConnectError> {
        let conn = match settings.driver {
            DbDriver::Mysql => {
                let options = MySqlConnectOptions::new()
                    .host(&settings.hostname)
                    .port(settings.port)
                    .username(&settings.username)
                    .password(&settings.password)
                    .charset("utf8");
                LiveConnection::Mysql(MySqlConnection::connect_with(&options).await?)
            }
            DbDriver::Pgsql => {
                let options = PgConnectOptions::new()
                    .host(&settings.hostname)
                    .port(settings.port)
                    .username(&settings.username)
                    .password(&settings.password);
                LiveConnection::Postgres(PgConnection::connect_with(&options).await?)
            }
            DbDriver::Sqlite => {
                let location = settings
                    .location
                    .as_deref()
                    .ok_or_else(|| ConnectError::new("No database file location given"))?;
                let options = SqliteConnectOptions::new()
                    .filename(location)
                    .create_if_missing(true);
                LiveConnection::Sqlite(SqliteConnection::connect_with(&options).await?)
            }
        };
        Ok(conn)
    }
}

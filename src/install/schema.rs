//! Hand-off to the schema installer.
//!
//! Creating tables and seed data belongs to the application, not to this
//! crate. The pipeline calls a [`SchemaInstaller`] with the open connection
//! and a [`SchemaSettings`] bag.

use super::{AdminAccount, DatabaseSettings};
use crate::DbDriver;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Settings passed to the schema installer: the administrator account and
/// the database settings, merged.
///
/// Only the salted hash and salt of the admin password are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaSettings {
    /// Administrator user name.
    pub admin_username: String,
    /// Salted administrator password hash.
    pub admin_password_hash: String,
    /// Salt used for the hash.
    pub admin_salt: String,
    /// Database backend.
    pub driver: DbDriver,
    /// Database host name.
    pub hostname: String,
    /// Database port.
    pub port: u16,
    /// Database user.
    pub username: String,
    /// Database to create the schema in. Empty when none was selected.
    pub database: String,
}

impl SchemaSettings {
    /// Merge an admin account and database settings.
    pub fn new(admin: &AdminAccount, database: &DatabaseSettings) -> Self {
        Self {
            admin_username: admin.username().to_string(),
            admin_password_hash: admin.password_hash().to_string(),
            admin_salt: admin.salt().to_string(),
            driver: database.driver,
            hostname: database.hostname.clone(),
            port: database.port,
            username: database.username.clone(),
            database: database.database.as_str().to_string(),
        }
    }
}

/// Error reported by a schema installer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SchemaError {
    /// Error text.
    pub message: String,
}

impl SchemaError {
    /// Wrap an error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for SchemaError {
    fn from(e: sqlx::Error) -> Self {
        Self::new(e.to_string())
    }
}

/// Creates the base schema and seed data over an open connection.
#[async_trait]
pub trait SchemaInstaller<C: Send>: Send + Sync {
    /// Create the schema. An error stops the pipeline before any
    /// configuration file is written.
    async fn setup_schema(
        &self,
        connection: &mut C,
        settings: &SchemaSettings,
    ) -> Result<(), SchemaError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DatabaseName;

    #[test]
    fn test_schema_settings_merge() {
        let admin = AdminAccount::with_salt("admin", "pw", "c2FsdHNhbHRzYWx0").unwrap();
        let database = DatabaseSettings {
            driver: DbDriver::Pgsql,
            hostname: "db".to_string(),
            port: 5432,
            location: None,
            username: "app".to_string(),
            password: "dbpw".to_string(),
            database: DatabaseName::parse("app_db").unwrap(),
        };

        let settings = SchemaSettings::new(&admin, &database);
        assert_eq!(settings.admin_username, "admin");
        assert_eq!(settings.admin_salt, "c2FsdHNhbHRzYWx0");
        assert_eq!(settings.admin_password_hash, admin.password_hash());
        assert_eq!(settings.database, "app_db");
        assert_eq!(settings.driver, DbDriver::Pgsql);
    }

    #[test]
    fn test_schema_settings_carry_no_plaintext() {
        let admin = AdminAccount::with_salt("admin", "plain-admin-pw", "c2FsdHNhbHRzYWx0").unwrap();
        let database = DatabaseSettings {
            driver: DbDriver::Mysql,
            hostname: "localhost".to_string(),
            port: 3306,
            location: None,
            username: "root".to_string(),
            password: String::new(),
            database: DatabaseName::default(),
        };
        let json = serde_json::to_string(&SchemaSettings::new(&admin, &database)).unwrap();
        assert!(!json.contains("plain-admin-pw"));
    }
}

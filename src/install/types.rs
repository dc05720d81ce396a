//! Type definitions for installation inputs and outcomes.

use super::InstallError;
use crate::DbDriver;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// A database name that satisfies the identifier grammar `[A-Za-z0-9_-]*`.
///
/// The empty name means "no database selected yet" and is accepted.
///
/// # Example
///
/// ```rust
/// use install_preflight::DatabaseName;
///
/// assert!(DatabaseName::parse("my_db-01").is_ok());
/// assert!(DatabaseName::parse("my db!").is_err());
/// assert!(DatabaseName::parse("").unwrap().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatabaseName(String);

impl DatabaseName {
    /// Validate a user-supplied database name.
    pub fn parse(name: &str) -> Result<Self, InstallError> {
        let re = Regex::new(r"^[A-Za-z0-9_-]*$").expect("Invalid regex pattern");
        if re.is_match(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(InstallError::InvalidDatabaseName {
                name: name.to_string(),
                fix: "Use only letters, digits, '_' and '-' in the database name".to_string(),
            })
        }
    }

    /// The validated name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether no database has been selected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<String> for DatabaseName {
    type Error = InstallError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DatabaseName> for String {
    fn from(name: DatabaseName) -> Self {
        name.0
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Connection settings for the application database.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Database backend.
    pub driver: DbDriver,

    /// Server host name. Ignored by file based drivers.
    pub hostname: String,

    /// Server port. Ignored by file based drivers.
    pub port: u16,

    /// Database file location for file based drivers.
    pub location: Option<PathBuf>,

    /// Database user.
    pub username: String,

    /// Database password.
    pub password: String,

    /// Database to select after connecting.
    pub database: DatabaseName,
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("driver", &self.driver)
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("location", &self.location)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// The administrator account created during installation.
///
/// The plaintext password is consumed at construction. Only the Argon2id
/// hash, in PHC string format, and its salt are kept.
///
/// # Example
///
/// ```rust
/// use install_preflight::AdminAccount;
///
/// let admin = AdminAccount::new("admin", "s3cret").unwrap();
/// assert_eq!(admin.username(), "admin");
/// assert!(admin.password_hash().starts_with("$argon2id$"));
/// assert!(admin.verify("s3cret"));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAccount {
    username: String,
    password_hash: String,
    salt: String,
}

impl AdminAccount {
    /// Hash `password` with a fresh salt from the operating system's
    /// random source.
    pub fn new(username: impl Into<String>, password: &str) -> Result<Self, InstallError> {
        let salt = SaltString::generate(&mut OsRng);
        Self::with_salt(username, password, salt.as_str())
    }

    /// Hash `password` with a caller-provided salt.
    ///
    /// # Arguments
    ///
    /// * `username` - Account name
    /// * `password` - Plaintext password; not retained
    /// * `salt` - Unpadded standard base64, at least 8 bytes once decoded
    ///
    /// # Returns
    ///
    /// The account, or `InstallError::PasswordHashing` if the salt is
    /// malformed or too short.
    pub fn with_salt(
        username: impl Into<String>,
        password: &str,
        salt: &str,
    ) -> Result<Self, InstallError> {
        let hashing_error = |e: argon2::password_hash::Error| InstallError::PasswordHashing {
            message: e.to_string(),
            fix: "Use a base64 salt of at least 11 characters".to_string(),
        };

        let salt = SaltString::new(salt).map_err(hashing_error)?;
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(hashing_error)?
            .to_string();

        Ok(Self {
            username: username.into(),
            password_hash,
            salt: salt.as_str().to_string(),
        })
    }

    /// Account name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Argon2id hash in PHC string format.
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    /// Base64 salt the hash was derived with.
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Check a candidate password against the stored hash.
    pub fn verify(&self, password: &str) -> bool {
        PasswordHash::new(&self.password_hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

impl fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminAccount")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Everything the installer needs from the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRequest {
    /// Database connection settings.
    pub database: DatabaseSettings,

    /// Administrator account to seed.
    pub admin: AdminAccount,
}

/// Settings submitted through the installer forms, read from a flat
/// string key-value store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSettings {
    /// HTTP server identifier the operator selected.
    pub http_server: String,

    /// Database connection settings.
    pub database: DatabaseSettings,
}

impl InstallSettings {
    /// Read settings from a session-style map.
    ///
    /// Keys: `http_server`, `db.driver`, `db.hostname`, `db.port`,
    /// `db.location`, `db.username`, `db.password`, `db.database`. A missing
    /// or empty port falls back to the driver default; host and port are not
    /// required for file based drivers.
    ///
    /// # Errors
    ///
    /// - `MissingSetting` if `http_server`, `db.driver` or a required
    ///   connection field is absent
    /// - `UnknownDriver` if `db.driver` is not a supported identifier
    /// - `InvalidPort` if `db.port` is not a number in 1..=65535
    /// - `InvalidDatabaseName` if `db.database` breaks the identifier grammar
    pub fn from_session(session: &HashMap<String, String>) -> Result<Self, InstallError> {
        let get = |key: &str| session.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| InstallError::MissingSetting {
                key: key.to_string(),
                fix: format!("Fill in {key} and submit the form again"),
            })
        };

        let http_server = require("http_server")?.to_string();
        let driver: DbDriver = require("db.driver")?.parse()?;

        let (hostname, port, location) = if driver.is_file_based() {
            let location = PathBuf::from(require("db.location")?);
            (String::new(), 0, Some(location))
        } else {
            let hostname = require("db.hostname")?.to_string();
            let port = match get("db.port") {
                Some(raw) => parse_port(raw)?,
                None => driver.default_port().unwrap_or_default(),
            };
            (hostname, port, get("db.location").map(PathBuf::from))
        };

        let database = DatabaseName::parse(get("db.database").unwrap_or_default())?;

        Ok(Self {
            http_server,
            database: DatabaseSettings {
                driver,
                hostname,
                port,
                location,
                username: get("db.username").unwrap_or_default().to_string(),
                password: session.get("db.password").cloned().unwrap_or_default(),
                database,
            },
        })
    }
}

fn parse_port(raw: &str) -> Result<u16, InstallError> {
    raw.parse::<u16>()
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| InstallError::InvalidPort {
            value: raw.to_string(),
            fix: "Enter a port number between 1 and 65535".to_string(),
        })
}

/// Pipeline stage that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Opening the database connection.
    Connect,
    /// Creating the base schema through the schema installer.
    SchemaSetup,
    /// Writing the database configuration artifact.
    WriteDbConfig,
    /// Writing the application configuration artifact.
    WriteAppConfig,
}

impl FailureStage {
    /// Numeric code reported for this stage, if it has one.
    ///
    /// # Example
    ///
    /// ```rust
    /// use install_preflight::FailureStage;
    ///
    /// assert_eq!(FailureStage::WriteDbConfig.code(), Some(105));
    /// assert_eq!(FailureStage::WriteAppConfig.code(), Some(106));
    /// assert_eq!(FailureStage::Connect.code(), None);
    /// ```
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::WriteDbConfig => Some(105),
            Self::WriteAppConfig => Some(106),
            Self::Connect | Self::SchemaSetup => None,
        }
    }
}

/// Result of a pipeline run.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InstallOutcome {
    /// Every stage completed.
    Success {
        /// Connection string written to the database artifact.
        connection_string: String,
        /// Database user.
        username: String,
        /// Database password.
        password: String,
    },

    /// A stage failed and the pipeline stopped there.
    Failure {
        /// Stage that failed.
        stage: FailureStage,
        /// Error text.
        message: String,
        /// Numeric code, when the stage has one.
        code: Option<u16>,
        /// Artifact being written, for the write stages.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
}

impl InstallOutcome {
    /// Build a failure for `stage`, filling in the stage's code.
    pub fn failure(stage: FailureStage, message: impl Into<String>) -> Self {
        Self::Failure {
            stage,
            message: message.into(),
            code: stage.code(),
            path: None,
        }
    }

    /// Build a failure for an artifact write stage, recording the target.
    pub fn write_failure(
        stage: FailureStage,
        path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self::Failure {
            stage,
            message: message.into(),
            code: stage.code(),
            path: Some(path.into()),
        }
    }

    /// Whether the pipeline completed.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The failing stage, if any.
    pub fn failed_stage(&self) -> Option<FailureStage> {
        match self {
            Self::Failure { stage, .. } => Some(*stage),
            Self::Success { .. } => None,
        }
    }

    /// Convert a failure into the matching [`InstallError`].
    ///
    /// On success returns the connection string.
    pub fn into_result(self) -> Result<String, InstallError> {
        match self {
            Self::Success {
                connection_string, ..
            } => Ok(connection_string),
            Self::Failure {
                stage: FailureStage::Connect,
                message,
                ..
            } => Err(InstallError::ConnectionFailed {
                message,
                fix: "Check the database host, port and credentials, then retry".to_string(),
            }),
            Self::Failure {
                stage: FailureStage::SchemaSetup,
                message,
                ..
            } => Err(InstallError::SchemaSetup {
                message,
                fix: "Use an empty database the configured user can create tables in".to_string(),
            }),
            Self::Failure {
                stage,
                message,
                code,
                path,
            } => Err(InstallError::ArtifactWrite {
                code: code.unwrap_or_default(),
                path: path.unwrap_or_default(),
                message,
                fix: format!(
                    "Make the configuration directory writable, then retry ({:?})",
                    stage
                ),
            }),
        }
    }
}

impl fmt::Debug for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success {
                connection_string,
                username,
                ..
            } => f
                .debug_struct("Success")
                .field("connection_string", connection_string)
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Failure {
                stage,
                message,
                code,
                path,
            } => f
                .debug_struct("Failure")
                .field("stage", stage)
                .field("message", message)
                .field("code", code)
                .field("path", path)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn session(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_database_name_grammar() {
        assert!(DatabaseName::parse("my_db-01").is_ok());
        assert!(DatabaseName::parse("my db!").is_err());
        assert!(DatabaseName::parse("semi;colon").is_err());
        assert!(DatabaseName::parse("dot.name").is_err());
        assert!(DatabaseName::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_database_name_deserialize_validates() {
        let ok: DatabaseName = serde_json::from_str("\"app_db\"").unwrap();
        assert_eq!(ok.as_str(), "app_db");
        let bad: Result<DatabaseName, _> = serde_json::from_str("\"app db\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_salted_hashes_differ() {
        let a = AdminAccount::with_salt("admin", "hunter2", "aaaaaaaaaaaaaaaa").unwrap();
        let b = AdminAccount::with_salt("admin", "hunter2", "bbbbbbbbbbbbbbbb").unwrap();
        assert_ne!(a.password_hash(), b.password_hash());
        assert!(a.verify("hunter2"));
        assert!(!a.verify("hunter3"));
    }

    #[test]
    fn test_same_salt_same_hash() {
        let a = AdminAccount::with_salt("admin", "hunter2", "aaaaaaaaaaaaaaaa").unwrap();
        let b = AdminAccount::with_salt("admin", "hunter2", "aaaaaaaaaaaaaaaa").unwrap();
        assert_eq!(a.password_hash(), b.password_hash());
        assert!(a.password_hash().contains(a.salt()));
    }

    #[test]
    fn test_fresh_salts_are_unique() {
        let a = AdminAccount::new("admin", "hunter2").unwrap();
        let b = AdminAccount::new("admin", "hunter2").unwrap();
        assert_ne!(a.salt(), b.salt());
        assert_ne!(a.password_hash(), b.password_hash());
        assert!(a.password_hash().starts_with("$argon2id$"));
        assert!(b.verify("hunter2"));
    }

    #[test]
    fn test_short_salt_rejected() {
        let err = AdminAccount::with_salt("admin", "hunter2", "abcd").unwrap_err();
        assert!(matches!(err, InstallError::PasswordHashing { .. }));
        assert!(AdminAccount::with_salt("admin", "hunter2", "not base64!").is_err());
    }

    #[test]
    fn test_tampered_hash_never_verifies() {
        let mut admin = AdminAccount::new("admin", "hunter2").unwrap();
        admin.password_hash = "not a phc string".to_string();
        assert!(!admin.verify("hunter2"));
    }

    #[test]
    fn test_admin_never_exposes_plaintext() {
        let admin = AdminAccount::new("admin", "plain-secret").unwrap();
        let json = serde_json::to_string(&admin).unwrap();
        assert!(!json.contains("plain-secret"));
        assert!(!format!("{:?}", admin).contains("plain-secret"));
    }

    #[test]
    fn test_database_settings_debug_redacts_password() {
        let settings = DatabaseSettings {
            driver: DbDriver::Mysql,
            hostname: "localhost".to_string(),
            port: 3306,
            location: None,
            username: "root".to_string(),
            password: "topsecret".to_string(),
            database: DatabaseName::default(),
        };
        assert!(!format!("{:?}", settings).contains("topsecret"));
    }

    #[test]
    fn test_from_session_mysql() {
        let settings = InstallSettings::from_session(&session(&[
            ("http_server", "apache_w"),
            ("db.driver", "mysql"),
            ("db.hostname", "localhost"),
            ("db.port", "3307"),
            ("db.username", "root"),
            ("db.password", "pw"),
            ("db.database", "app"),
        ]))
        .unwrap();
        assert_eq!(settings.http_server, "apache_w");
        assert_eq!(settings.database.driver, DbDriver::Mysql);
        assert_eq!(settings.database.port, 3307);
        assert_eq!(settings.database.database.as_str(), "app");
        assert_eq!(settings.database.password, "pw");
    }

    #[test]
    fn test_from_session_default_port() {
        let settings = InstallSettings::from_session(&session(&[
            ("http_server", "nginx"),
            ("db.driver", "pgsql"),
            ("db.hostname", "db.internal"),
        ]))
        .unwrap();
        assert_eq!(settings.database.port, 5432);
        assert!(settings.database.database.is_empty());
    }

    #[test]
    fn test_from_session_sqlite_needs_location_only() {
        let settings = InstallSettings::from_session(&session(&[
            ("http_server", "nginx"),
            ("db.driver", "sqlite"),
            ("db.location", "/tmp/app.db"),
        ]))
        .unwrap();
        assert_eq!(settings.database.location, Some(PathBuf::from("/tmp/app.db")));

        let err = InstallSettings::from_session(&session(&[
            ("http_server", "nginx"),
            ("db.driver", "sqlite"),
        ]))
        .unwrap_err();
        assert!(matches!(err, InstallError::MissingSetting { ref key, .. } if key == "db.location"));
    }

    #[test]
    fn test_from_session_rejects_bad_input() {
        let base = [
            ("http_server", "nginx"),
            ("db.driver", "mysql"),
            ("db.hostname", "localhost"),
        ];

        let mut bad_port = base.to_vec();
        bad_port.push(("db.port", "99999"));
        assert!(matches!(
            InstallSettings::from_session(&session(&bad_port)),
            Err(InstallError::InvalidPort { .. })
        ));

        let mut bad_name = base.to_vec();
        bad_name.push(("db.database", "my db!"));
        assert!(matches!(
            InstallSettings::from_session(&session(&bad_name)),
            Err(InstallError::InvalidDatabaseName { .. })
        ));

        let unknown = [("http_server", "nginx"), ("db.driver", "oracle")];
        assert!(matches!(
            InstallSettings::from_session(&session(&unknown)),
            Err(InstallError::UnknownDriver { .. })
        ));
    }

    #[test]
    fn test_outcome_failure_codes() {
        let outcome = InstallOutcome::failure(FailureStage::WriteDbConfig, "disk full");
        assert_eq!(outcome.failed_stage(), Some(FailureStage::WriteDbConfig));
        assert!(matches!(outcome, InstallOutcome::Failure { code: Some(105), .. }));

        let outcome = InstallOutcome::failure(FailureStage::Connect, "refused");
        assert!(matches!(outcome, InstallOutcome::Failure { code: None, .. }));
    }

    #[test]
    fn test_outcome_into_result() {
        let err = InstallOutcome::write_failure(
            FailureStage::WriteAppConfig,
            "/srv/app/config/config.php",
            "read-only",
        )
        .into_result()
        .unwrap_err();
        assert!(matches!(
            err,
            InstallError::ArtifactWrite { code: 106, ref path, .. }
                if path == Path::new("/srv/app/config/config.php")
        ));
        assert!(err.to_string().contains("/srv/app/config/config.php"));

        let err = InstallOutcome::failure(FailureStage::Connect, "refused")
            .into_result()
            .unwrap_err();
        assert!(matches!(err, InstallError::ConnectionFailed { .. }));

        let ok = InstallOutcome::Success {
            connection_string: "sqlite:/tmp/a.db".to_string(),
            username: String::new(),
            password: String::new(),
        };
        assert!(ok.is_success());
        assert_eq!(ok.into_result().unwrap(), "sqlite:/tmp/a.db");
    }

    #[test]
    fn test_outcome_serialize() {
        let json = serde_json::to_value(InstallOutcome::failure(
            FailureStage::WriteDbConfig,
            "",
        ))
        .unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["stage"], "write_db_config");
        assert_eq!(json["code"], 105);
        assert!(json.get("path").is_none());

        let json = serde_json::to_value(InstallOutcome::write_failure(
            FailureStage::WriteDbConfig,
            "out/database.php",
            "",
        ))
        .unwrap();
        assert_eq!(json["path"], "out/database.php");
    }
}

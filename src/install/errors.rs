//! Error types for installation operations.
//!
//! Each variant carries an actionable fix suggestion for the installation
//! operator, who is expected to correct their inputs and rerun the whole
//! pipeline.

use crate::ProbeError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while validating settings or installing.
///
/// # Example
///
/// ```rust
/// use install_preflight::InstallError;
///
/// fn handle_error(error: InstallError) {
///     eprintln!("Installation failed: {}", error);
///     eprintln!("To fix: {}", error.fix_suggestion());
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InstallError {
    /// The database name contains characters outside `[A-Za-z0-9_-]`.
    #[error("Invalid database name: {name:?}")]
    InvalidDatabaseName {
        /// The rejected name.
        name: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// The database port is not a valid port number.
    #[error("Invalid database port: {value:?}")]
    InvalidPort {
        /// The rejected value.
        value: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// A required setting is missing from the settings bag.
    #[error("Missing setting: {key}")]
    MissingSetting {
        /// Key that was looked up.
        key: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// The host failed a hard requirement.
    #[error("Unsupported environment: {reason}")]
    UnsupportedEnvironment {
        /// Which requirement failed.
        reason: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// The driver identifier is not one the installer knows.
    ///
    /// This is a configuration defect rather than a user input error.
    #[error("Unknown driver type: {driver}")]
    UnknownDriver {
        /// The unrecognised identifier.
        driver: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// The database driver refused the connection.
    #[error("Database connection failed: {message}")]
    ConnectionFailed {
        /// Error text reported by the driver.
        message: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// The schema installer reported an error.
    #[error("Schema setup failed: {message}")]
    SchemaSetup {
        /// Error text reported by the schema installer.
        message: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// A configuration artifact could not be written.
    #[error("Could not write {path:?} (code {code}): {message}")]
    ArtifactWrite {
        /// 105 for the database artifact, 106 for the application artifact.
        code: u16,
        /// Target path of the artifact.
        path: PathBuf,
        /// Underlying I/O error text.
        message: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// The administrator password could not be hashed.
    #[error("Could not hash the administrator password: {message}")]
    PasswordHashing {
        /// Hashing error text.
        message: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// The installer configuration file could not be loaded.
    #[error("Invalid installer configuration {path:?}: {message}")]
    Config {
        /// Path of the configuration file.
        path: PathBuf,
        /// Read or parse error text.
        message: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// The host could not be inspected.
    #[error("Host probe failed: {source}")]
    Probe {
        /// Underlying probe failure.
        #[source]
        source: ProbeError,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },
}

impl InstallError {
    /// Get an actionable suggestion for fixing this error.
    pub fn fix_suggestion(&self) -> &str {
        match self {
            Self::InvalidDatabaseName { fix, .. } => fix,
            Self::InvalidPort { fix, .. } => fix,
            Self::MissingSetting { fix, .. } => fix,
            Self::UnsupportedEnvironment { fix, .. } => fix,
            Self::UnknownDriver { fix, .. } => fix,
            Self::ConnectionFailed { fix, .. } => fix,
            Self::SchemaSetup { fix, .. } => fix,
            Self::ArtifactWrite { fix, .. } => fix,
            Self::PasswordHashing { fix, .. } => fix,
            Self::Config { fix, .. } => fix,
            Self::Probe { fix, .. } => fix,
        }
    }

    /// Whether the error stems from a programming or configuration defect
    /// that the installation operator cannot fix by editing their inputs.
    pub fn is_defect(&self) -> bool {
        matches!(self, Self::UnknownDriver { .. })
    }
}

impl From<ProbeError> for InstallError {
    fn from(source: ProbeError) -> Self {
        let fix = match &source {
            ProbeError::RuntimeNotFound { executable } => {
                format!("Install {executable} or set probe.runtime_executable to its full path")
            }
            ProbeError::Timeout(_) => "Increase probe.timeout_secs and retry".to_string(),
            _ => "Check that the runtime executable runs from a shell".to_string(),
        };
        Self::Probe { source, fix }
    }
}

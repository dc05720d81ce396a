//! Progress reporting for the install pipeline.
//!
//! The [`InstallProgress`] enum represents discrete pipeline stages that
//! can be reported to the operator via a callback.

use crate::DbDriver;
use std::path::PathBuf;

/// Progress stages of an install run.
///
/// # Example
///
/// ```rust
/// use install_preflight::InstallProgress;
///
/// fn on_progress(progress: InstallProgress) {
///     match &progress {
///         InstallProgress::Connecting { driver } => {
///             println!("Connecting to {}...", driver.display_name());
///         }
///         InstallProgress::WritingDatabaseConfig { path }
///         | InstallProgress::WritingAppConfig { path } => {
///             println!("Writing {}", path.display());
///         }
///         other => println!("{}", other.description()),
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallProgress {
    /// The run has started.
    Started,

    /// Evaluating host capabilities.
    CheckingEnvironment,

    /// Opening the database connection.
    Connecting {
        /// Driver being connected.
        driver: DbDriver,
    },

    /// The schema installer is running.
    SettingUpSchema,

    /// Writing the database configuration artifact.
    WritingDatabaseConfig {
        /// Target path.
        path: PathBuf,
    },

    /// Writing the application configuration artifact.
    WritingAppConfig {
        /// Target path.
        path: PathBuf,
    },

    /// Every stage completed.
    Completed,
}

impl InstallProgress {
    /// Human-readable description of the stage.
    ///
    /// # Example
    ///
    /// ```rust
    /// use install_preflight::InstallProgress;
    ///
    /// assert_eq!(InstallProgress::SettingUpSchema.description(), "Creating database schema");
    /// ```
    pub fn description(&self) -> &'static str {
        match self {
            Self::Started => "Starting installation",
            Self::CheckingEnvironment => "Checking host environment",
            Self::Connecting { .. } => "Connecting to database",
            Self::SettingUpSchema => "Creating database schema",
            Self::WritingDatabaseConfig { .. } => "Writing database configuration",
            Self::WritingAppConfig { .. } => "Writing application configuration",
            Self::Completed => "Installation complete",
        }
    }

    /// Whether this stage indicates completion.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

//! The install pipeline.
//!
//! [`Installer::install`] runs the stages in a fixed order and stops at the
//! first failure:
//!
//! 1. Environment check (refuses unsupported hosts before any I/O)
//! 2. Connect to the database
//! 3. Schema setup through the [`SchemaInstaller`]
//! 4. Write the database configuration artifact
//! 5. Write the application configuration artifact

use super::artifact::{load_template, render_template, write_atomic};
use super::connection::{connection_string, ConnectionDescriptor, DatabaseConnector};
use super::schema::{SchemaInstaller, SchemaSettings};
use super::{FailureStage, InstallError, InstallOutcome, InstallProgress, InstallRequest};
use crate::{CapabilityProber, HostCapabilities, InstallerConfig, ServerRequirements, SupportVerdict};
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

/// Drives an installation from validated settings to written configuration.
///
/// # Example
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use install_preflight::{
///     AdminAccount, CapabilityProbe, InstallRequest, InstallSettings, Installer, InstallerConfig,
///     LiveConnection, SchemaError, SchemaInstaller, SchemaSettings, SqlxConnector, SystemProbe,
/// };
/// use std::collections::HashMap;
///
/// struct AppSchema;
///
/// #[async_trait]
/// impl SchemaInstaller<LiveConnection> for AppSchema {
///     async fn setup_schema(
///         &self,
///         _connection: &mut LiveConnection,
///         _settings: &SchemaSettings,
///     ) -> Result<(), SchemaError> {
///         Ok(())
///     }
/// }
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let session: HashMap<String, String> = HashMap::new();
///     let settings = InstallSettings::from_session(&session)?;
///     let config = InstallerConfig::default();
///
///     let caps = SystemProbe::new(config.probe.clone())
///         .capabilities(&settings.http_server)
///         .await?;
///     let request = InstallRequest {
///         database: settings.database,
///         admin: AdminAccount::new("admin", "correct horse")?,
///     };
///
///     let mut installer = Installer::new(config, SqlxConnector, AppSchema);
///     let outcome = installer.install(&caps, &request, |p| println!("{}", p.description())).await?;
///     println!("{:?}", outcome);
///     Ok(())
/// }
/// ```
pub struct Installer<C, S> {
    config: InstallerConfig,
    connector: C,
    schema: S,
    last_error: Option<String>,
}

impl<C, S> Installer<C, S>
where
    C: DatabaseConnector,
    S: SchemaInstaller<C::Connection>,
{
    /// Create an installer.
    pub fn new(config: InstallerConfig, connector: C, schema: S) -> Self {
        Self {
            config,
            connector,
            schema,
            last_error: None,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    /// Most recent driver error captured while connecting.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Run the pipeline.
    ///
    /// # Returns
    ///
    /// - `Err(InstallError::UnsupportedEnvironment)` if the host fails a hard
    ///   requirement; nothing is touched in that case
    /// - `Ok(InstallOutcome::Failure)` tagged with the stage that failed
    /// - `Ok(InstallOutcome::Success)` once both artifacts are written
    pub async fn install<F>(
        &mut self,
        capabilities: &HostCapabilities,
        request: &InstallRequest,
        on_progress: F,
    ) -> Result<InstallOutcome, InstallError>
    where
        F: Fn(InstallProgress) + Send + Sync,
    {
        on_progress(InstallProgress::Started);

        on_progress(InstallProgress::CheckingEnvironment);
        self.check_environment(capabilities)?;

        let database = &request.database;

        // Stage 1: connect
        on_progress(InstallProgress::Connecting {
            driver: database.driver,
        });
        let dsn = connection_string(database);
        let connection = match self.connector.connect(database).await {
            Ok(connection) => connection,
            Err(e) => {
                warn!(driver = %database.driver, error = %e, "database connection failed");
                self.last_error = Some(e.message.clone());
                return Ok(InstallOutcome::failure(FailureStage::Connect, e.message));
            }
        };
        info!(connection_string = %dsn, "database connection established");
        let mut descriptor = ConnectionDescriptor::new(dsn, connection);

        // Stage 2: schema
        on_progress(InstallProgress::SettingUpSchema);
        let schema_settings = SchemaSettings::new(&request.admin, database);
        if let Err(e) = self
            .schema
            .setup_schema(descriptor.connection_mut(), &schema_settings)
            .await
        {
            warn!(error = %e, "schema setup failed");
            return Ok(InstallOutcome::failure(FailureStage::SchemaSetup, e.message));
        }

        // Stage 3: database artifact
        let connection_string = descriptor.persisted_connection_string(&database.database);

        let paths = &self.config.paths;
        on_progress(InstallProgress::WritingDatabaseConfig {
            path: paths.database_target.clone(),
        });
        if let Err(e) = write_from_template(
            &paths.database_template,
            &paths.database_target,
            &[
                ("dsn", connection_string.as_str()),
                ("username", database.username.as_str()),
                ("password", database.password.as_str()),
            ],
        ) {
            warn!(path = %paths.database_target.display(), error = %e, "database config not written");
            return Ok(InstallOutcome::write_failure(
                FailureStage::WriteDbConfig,
                &paths.database_target,
                e.to_string(),
            ));
        }

        // Stage 4: application artifact
        on_progress(InstallProgress::WritingAppConfig {
            path: paths.app_target.clone(),
        });
        let index = if self.config.supported_servers.clean_urls(&capabilities.http_server) {
            ""
        } else {
            self.config.front_controller.as_str()
        };
        if let Err(e) = write_from_template(&paths.app_template, &paths.app_target, &[("index", index)])
        {
            warn!(path = %paths.app_target.display(), error = %e, "application config not written");
            return Ok(InstallOutcome::write_failure(
                FailureStage::WriteAppConfig,
                &paths.app_target,
                e.to_string(),
            ));
        }

        on_progress(InstallProgress::Completed);
        info!("installation complete");
        Ok(InstallOutcome::Success {
            connection_string,
            username: database.username.clone(),
            password: database.password.clone(),
        })
    }

    fn check_environment(&self, capabilities: &HostCapabilities) -> Result<(), InstallError> {
        let requirements = ServerRequirements::new(
            self.config.min_runtime_version.as_str(),
            capabilities.http_server.as_str(),
        );
        let mut prober = CapabilityProber::new(capabilities, &self.config.supported_servers);
        let verdict = prober.check_server(&requirements);
        debug!(?verdict, "environment checked");

        if verdict != SupportVerdict::Unsupported {
            return Ok(());
        }

        let reason = if !prober.runtime_acceptable(&requirements.min_runtime_version) {
            format!(
                "runtime {} is older than {}",
                capabilities.runtime_version, requirements.min_runtime_version
            )
        } else {
            format!("HTTP server {:?} is not supported", capabilities.http_server)
        };
        Err(InstallError::UnsupportedEnvironment {
            reason,
            fix: "Upgrade the runtime or pick a supported HTTP server, then retry".to_string(),
        })
    }
}

fn write_from_template(template: &Path, target: &Path, values: &[(&str, &str)]) -> io::Result<()> {
    let template = load_template(template)?;
    write_atomic(target, &render_template(&template, values))
}

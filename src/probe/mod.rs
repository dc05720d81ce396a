//! Host capability probing.
//!
//! A [`CapabilityProbe`] produces a [`HostCapabilities`] snapshot describing
//! what the host offers the application runtime. Two implementations ship
//! with the crate:
//!
//! - [`SystemProbe`]: inspects the runtime interpreter installed on the host
//! - [`StaticProbe`]: returns a fixed snapshot
//!
//! Snapshots are computed fresh for each validation and never persisted.

mod command;
mod parser;
mod path_finder;
mod system;

pub use system::SystemProbe;

pub(crate) use parser::normalize_version;

use crate::DbDriver;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use thiserror::Error;

/// Module name of the generic database access layer.
pub(crate) const DB_LAYER_MODULE: &str = "pdo";
/// Module name of the image processing library.
pub(crate) const IMAGE_MODULE: &str = "gd";
/// Module name of the compression library.
pub(crate) const COMPRESSION_MODULE: &str = "zlib";
/// Module name of the HTTP client library.
pub(crate) const HTTP_CLIENT_MODULE: &str = "curl";

/// Snapshot of what the host environment supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostCapabilities {
    /// Version of the application runtime, dotted.
    pub runtime_version: String,

    /// Whether the generic database access layer is loaded.
    pub db_layer_available: bool,

    /// Whether each driver's client module is loaded.
    pub driver_modules: BTreeMap<DbDriver, bool>,

    /// Raw image library version. `None` when the library is missing.
    pub image_library_version: Option<String>,

    /// Whether the compression library is loaded.
    pub compression_available: bool,

    /// Whether an HTTP client library is loaded.
    pub http_client_available: bool,

    /// HTTP server identifier declared by the operator.
    pub http_server: String,
}

impl HostCapabilities {
    /// Build a snapshot from a list of loaded runtime modules.
    ///
    /// Module names are matched case-insensitively.
    ///
    /// # Example
    ///
    /// ```rust
    /// use install_preflight::{DbDriver, HostCapabilities};
    ///
    /// let caps = HostCapabilities::from_modules(
    ///     "8.2.12",
    ///     ["PDO", "pdo_mysql", "zlib"],
    ///     None,
    ///     "nginx",
    /// );
    /// assert!(caps.db_layer_available);
    /// assert_eq!(caps.driver_modules[&DbDriver::Mysql], true);
    /// assert_eq!(caps.driver_modules[&DbDriver::Sqlite], false);
    /// assert!(caps.compression_available);
    /// ```
    pub fn from_modules<I, S>(
        runtime_version: impl Into<String>,
        modules: I,
        image_library_version: Option<String>,
        http_server: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let modules: BTreeSet<String> = modules
            .into_iter()
            .map(|m| m.as_ref().trim().to_ascii_lowercase())
            .collect();

        Self {
            runtime_version: runtime_version.into(),
            db_layer_available: modules.contains(DB_LAYER_MODULE),
            driver_modules: DbDriver::all()
                .map(|driver| (driver, modules.contains(driver.module_name())))
                .collect(),
            image_library_version,
            compression_available: modules.contains(COMPRESSION_MODULE),
            http_client_available: modules.contains(HTTP_CLIENT_MODULE),
            http_server: http_server.into(),
        }
    }

    /// Whether the client module for `driver` is loaded, ignoring the access layer.
    pub fn has_driver(&self, driver: DbDriver) -> bool {
        self.driver_modules.get(&driver).copied().unwrap_or(false)
    }
}

/// Errors raised while inspecting the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ProbeError {
    /// The runtime interpreter could not be located.
    #[error("Runtime executable not found: {executable}")]
    RuntimeNotFound {
        /// Executable name that was searched for.
        executable: String,
    },

    /// A probe command did not finish in time.
    #[error("Probe command timed out after {0:?}")]
    Timeout(Duration),

    /// The runtime could not be executed.
    #[error("Permission denied running the runtime executable")]
    PermissionDenied,

    /// The probe command failed to run or exited unsuccessfully.
    #[error("Probe command failed: {0}")]
    Io(String),

    /// The runtime version could not be read from its output.
    #[error("Failed to parse runtime version from: {0}")]
    VersionParseFailed(String),
}

/// Source of host capability snapshots.
///
/// Implement this to inspect a different platform, or to feed known values
/// into the prober.
#[async_trait]
pub trait CapabilityProbe: Send + Sync {
    /// Take a snapshot of the host, tagged with the declared HTTP server.
    async fn capabilities(&self, http_server: &str) -> Result<HostCapabilities, ProbeError>;
}

/// Probe that always reports the same snapshot.
///
/// The `http_server` argument overrides the server stored in the snapshot.
#[derive(Debug, Clone)]
pub struct StaticProbe {
    snapshot: HostCapabilities,
}

impl StaticProbe {
    /// Wrap a fixed snapshot.
    pub fn new(snapshot: HostCapabilities) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl CapabilityProbe for StaticProbe {
    async fn capabilities(&self, http_server: &str) -> Result<HostCapabilities, ProbeError> {
        Ok(HostCapabilities {
            http_server: http_server.to_string(),
            ..self.snapshot.clone()
        })
    }
}

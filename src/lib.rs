//! # install-preflight
//!
//! Pre-installation host validation and configuration file generation for
//! server-side applications.
//!
//! The crate answers two questions before an application's first run:
//!
//! - Can this host run the application, and at what support level?
//! - Given validated settings, how are the runtime configuration files
//!   written from their templates?
//!
//! ## Features
//!
//! - `CapabilityProbe` trait with `SystemProbe` and `StaticProbe`
//!   implementations producing `HostCapabilities` snapshots
//! - `CapabilityProber` for individual checks and the aggregate `SupportVerdict`
//! - `Installer` pipeline: connect, schema setup, database config, app config
//! - `InstallerConfig` loaded from TOML, including the HTTP server policy
//!
//! ## Example
//!
//! ```rust
//! use install_preflight::{
//!     CapabilityProber, HostCapabilities, ServerRequirements, ServerSupportPolicy,
//!     SupportVerdict,
//! };
//!
//! let caps = HostCapabilities::from_modules(
//!     "8.2.12",
//!     ["pdo", "pdo_mysql", "gd", "zlib"],
//!     Some("2.1".to_string()),
//!     "other",
//! );
//! let policy = ServerSupportPolicy::default();
//! let mut prober = CapabilityProber::new(&caps, &policy);
//!
//! let verdict = prober.check_server(&ServerRequirements::new("5.3.0", "other"));
//! assert_eq!(verdict, SupportVerdict::Partial);
//! ```

mod config;
mod db_driver;
mod install;
mod options;
mod policy;
mod probe;
mod prober;
mod verdict;
mod version;

pub use config::{ArtifactPaths, InstallerConfig};
pub use db_driver::DbDriver;
pub use install::{
    connection_string, render_template, AdminAccount, ConnectError, ConnectionDescriptor,
    DatabaseConnector, DatabaseName, DatabaseSettings, FailureStage, InstallError, InstallOutcome,
    InstallProgress, InstallRequest, InstallSettings, Installer, LiveConnection, SchemaError,
    SchemaInstaller, SchemaSettings, SqlxConnector,
};
pub use options::ProbeOptions;
pub use policy::{ServerEntry, ServerSupport, ServerSupportPolicy, OTHER_SERVER};
pub use probe::{CapabilityProbe, HostCapabilities, ProbeError, StaticProbe, SystemProbe};
pub use prober::CapabilityProber;
pub use verdict::{HttpServerVerdict, ServerRequirements, SupportVerdict};
pub use version::DottedVersion;

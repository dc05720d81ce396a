//! Installation pipeline.
//!
//! This module turns validated settings into persisted configuration:
//! it connects to the database, hands the connection to a
//! [`SchemaInstaller`], and writes the database and application
//! configuration files from templates.
//!
//! # Example
//!
//! ```rust
//! use install_preflight::{InstallOutcome, FailureStage};
//!
//! fn report(outcome: &InstallOutcome) {
//!     match outcome {
//!         InstallOutcome::Success { connection_string, .. } => {
//!             println!("Configured {}", connection_string);
//!         }
//!         InstallOutcome::Failure { stage, message, code, .. } => {
//!             eprintln!("{:?} failed ({:?}): {}", stage, code, message);
//!         }
//!     }
//! }
//! ```

mod artifact;
mod connection;
mod errors;
mod executor;
mod progress;
mod schema;
mod types;

pub use artifact::render_template;
pub use connection::{
    connection_string, ConnectError, ConnectionDescriptor, DatabaseConnector, LiveConnection,
    SqlxConnector,
};
pub use errors::InstallError;
pub use executor::Installer;
pub use progress::InstallProgress;
pub use schema::{SchemaError, SchemaInstaller, SchemaSettings};
pub use types::{
    AdminAccount, DatabaseName, DatabaseSettings, FailureStage, InstallOutcome, InstallRequest,
    InstallSettings,
};

//! Installer configuration.
//!
//! [`InstallerConfig`] is read from a TOML file. Every field has a default,
//! so an empty file is a valid configuration.
//!
//! ```toml
//! min_runtime_version = "5.3.0"
//! front_controller = "index.php"
//!
//! [paths]
//! database_template = "assets/config/database.php"
//! database_target = "../system/cms/config/database.php"
//!
//! [probe]
//! runtime_executable = "php"
//! timeout_secs = 5
//!
//! [supported_servers.apache_w]
//! name = "Apache (with mod_rewrite)"
//! supported = true
//! rewrite_support = true
//! ```

use crate::{InstallError, ProbeOptions, ServerSupportPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Template and target locations of the configuration artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    /// Database configuration template.
    pub database_template: PathBuf,
    /// Where the rendered database configuration is written.
    pub database_target: PathBuf,
    /// Application configuration template.
    pub app_template: PathBuf,
    /// Where the rendered application configuration is written.
    pub app_target: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            database_template: PathBuf::from("assets/config/database.php"),
            database_target: PathBuf::from("../system/cms/config/database.php"),
            app_template: PathBuf::from("assets/config/config.php"),
            app_target: PathBuf::from("../system/cms/config/config.php"),
        }
    }
}

impl ArtifactPaths {
    /// Resolve relative paths against `root`.
    pub fn relative_to(&self, root: &Path) -> Self {
        Self {
            database_template: root.join(&self.database_template),
            database_target: root.join(&self.database_target),
            app_template: root.join(&self.app_template),
            app_target: root.join(&self.app_target),
        }
    }
}

/// Installer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Oldest runtime version the application runs on.
    pub min_runtime_version: String,

    /// Front controller file name used in URLs when rewriting is unavailable.
    pub front_controller: String,

    /// Artifact locations.
    pub paths: ArtifactPaths,

    /// Host probing options.
    pub probe: ProbeOptions,

    /// HTTP server support table.
    pub supported_servers: ServerSupportPolicy,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            min_runtime_version: "5.3.0".to_string(),
            front_controller: "index.php".to_string(),
            paths: ArtifactPaths::default(),
            probe: ProbeOptions::default(),
            supported_servers: ServerSupportPolicy::default(),
        }
    }
}

impl InstallerConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, InstallError> {
        let config_error = |message: String| InstallError::Config {
            path: path.to_path_buf(),
            message,
            fix: format!("Fix or remove {}", path.display()),
        };

        let text = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        Self::from_toml_str(&text).map_err(|e| config_error(e.to_string()))
    }
}

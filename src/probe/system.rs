//! Probe that inspects the runtime interpreter installed on the host.

use super::command::run_probe_command;
use super::parser::{parse_image_version, parse_module_list, parse_version};
use super::path_finder::find_executable;
use super::{CapabilityProbe, HostCapabilities, ProbeError, IMAGE_MODULE};
use crate::ProbeOptions;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Probe backed by the host's runtime interpreter.
///
/// Detection runs three commands, one after another:
///
/// 1. `<runtime> --version` for the runtime version
/// 2. `<runtime> -m` for the list of loaded modules
/// 3. `<runtime> --ri gd` for the image library version, only when the
///    image module is loaded
///
/// # Example
///
/// ```rust,no_run
/// use install_preflight::{CapabilityProbe, ProbeOptions, SystemProbe};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let probe = SystemProbe::new(ProbeOptions::default());
///     match probe.capabilities("apache_w").await {
///         Ok(caps) => println!("runtime {}", caps.runtime_version),
///         Err(e) => eprintln!("probe failed: {}", e),
///     }
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SystemProbe {
    options: ProbeOptions,
}

impl SystemProbe {
    /// Create a probe with the given options.
    pub fn new(options: ProbeOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &ProbeOptions {
        &self.options
    }
}

#[async_trait]
impl CapabilityProbe for SystemProbe {
    async fn capabilities(&self, http_server: &str) -> Result<HostCapabilities, ProbeError> {
        let executable = &self.options.runtime_executable;
        let path = find_executable(executable).ok_or_else(|| ProbeError::RuntimeNotFound {
            executable: executable.clone(),
        })?;
        let limit = self.options.timeout;

        let version_output = run_probe_command(&path, &["--version"], limit).await?;
        let version = parse_version(&version_output)?;
        debug!(runtime = %path.display(), %version, "runtime version detected");

        let modules = parse_module_list(&run_probe_command(&path, &["-m"], limit).await?);
        debug!(count = modules.len(), "runtime modules listed");

        let image_library_version = if modules.contains(IMAGE_MODULE) {
            match run_probe_command(&path, &["--ri", IMAGE_MODULE], limit).await {
                Ok(report) => parse_image_version(&report),
                Err(e) => {
                    warn!(error = %e, "image library report unavailable");
                    None
                }
            }
        } else {
            None
        };

        Ok(HostCapabilities::from_modules(
            version.to_string(),
            &modules,
            image_library_version,
            http_server,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_runtime() {
        let probe = SystemProbe::new(ProbeOptions {
            runtime_executable: "definitely_not_a_real_runtime_12345".to_string(),
            ..Default::default()
        });
        let result = probe.capabilities("apache_w").await;
        assert!(matches!(
            result,
            Err(ProbeError::RuntimeNotFound { ref executable }) if executable == "definitely_not_a_real_runtime_12345"
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fake_runtime_script() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-runtime");
        std::fs::write(
            &script,
            "#!/bin/sh\n\
             case \"$1\" in\n\
               --version) echo 'PHP 7.4.33 (cli)';;\n\
               -m) printf '[PHP Modules]\\nPDO\\npdo_sqlite\\ngd\\nzlib\\n';;\n\
               --ri) echo 'GD Version => bundled (2.1.0 compatible)';;\n\
             esac\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let probe = SystemProbe::new(ProbeOptions {
            runtime_executable: script.to_string_lossy().into_owned(),
            ..Default::default()
        });
        let caps = probe.capabilities("nginx").await.unwrap();

        assert_eq!(caps.runtime_version, "7.4.33");
        assert!(caps.db_layer_available);
        assert!(caps.has_driver(crate::DbDriver::Sqlite));
        assert!(!caps.has_driver(crate::DbDriver::Mysql));
        assert!(caps.compression_available);
        assert!(!caps.http_client_available);
        assert_eq!(
            caps.image_library_version.as_deref(),
            Some("bundled (2.1.0 compatible)")
        );
        assert_eq!(caps.http_server, "nginx");
    }
}

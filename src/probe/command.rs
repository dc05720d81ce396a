//! Probe command execution with timeout.

use super::ProbeError;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Run the runtime with `args` and capture its output.
///
/// Stdout is preferred; stderr is used when stdout is empty, since some
/// builds print informational output there.
///
/// # Arguments
///
/// * `path` - Resolved runtime executable
/// * `args` - Command line arguments (e.g., `["-m"]`)
/// * `limit` - Maximum time to wait before the process is killed
///
/// # Returns
///
/// The captured output as lossy UTF-8.
///
/// # Errors
///
/// - `Timeout` if the command takes longer than `limit`
/// - `PermissionDenied` if the executable cannot be run
/// - `Io` for other spawn failures or a non-zero exit status
pub(crate) async fn run_probe_command(
    path: &Path,
    args: &[&str],
    limit: Duration,
) -> Result<String, ProbeError> {
    let output = timeout(
        limit,
        Command::new(path).args(args).kill_on_drop(true).output(),
    )
    .await
    .map_err(|_| ProbeError::Timeout(limit))?
    .map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            ProbeError::PermissionDenied
        } else {
            ProbeError::Io(e.to_string())
        }
    })?;

    if !output.status.success() {
        return Err(ProbeError::Io(format!(
            "{} {} exited with {}",
            path.display(),
            args.join(" "),
            output.status
        )));
    }

    let out = if !output.stdout.is_empty() {
        output.stdout
    } else {
        output.stderr
    };

    Ok(String::from_utf8_lossy(&out).into_owned())
}

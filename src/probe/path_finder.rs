//! PATH-based runtime lookup with fallback locations.

use std::path::{Path, PathBuf};

/// System fallback paths to check if the runtime is not on PATH.
const FALLBACK_PATHS: &[&str] = &["/usr/local/bin", "/usr/bin", "/opt/local/bin"];

/// Find the runtime executable.
///
/// A name containing a path separator is taken as an explicit location and
/// only checked for existence. Otherwise the system PATH is searched via the
/// `which` crate, then common install locations.
///
/// # Arguments
///
/// * `name` - Executable name (e.g., "php") or an explicit path to it
///
/// # Returns
///
/// `Some(PathBuf)` if the executable is found, `None` otherwise.
pub(crate) fn find_executable(name: &str) -> Option<PathBuf> {
    let explicit = Path::new(name);
    if explicit.components().count() > 1 {
        return explicit.exists().then(|| explicit.to_path_buf());
    }

    if let Ok(path) = which::which(name) {
        return Some(path);
    }

    FALLBACK_PATHS
        .iter()
        .map(|dir| PathBuf::from(dir).join(name))
        .find(|path| path.exists())
}

//! Configuration artifacts rendered from templates.

use regex::{Captures, Regex};
use std::fs::{self, File, Permissions};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Mode given to an artifact that did not exist before.
#[cfg(unix)]
const NEW_ARTIFACT_MODE: u32 = 0o644;

/// Substitute `{name}` placeholders in `template` with `values`.
///
/// All placeholders are replaced in one pass, so a substituted value that
/// itself contains `{name}` is left as is. Placeholders without a value are
/// kept verbatim.
///
/// # Arguments
///
/// * `template` - Template text containing `{name}` placeholders
/// * `values` - Placeholder names paired with their replacement text
///
/// # Returns
///
/// The rendered text.
///
/// # Example
///
/// ```rust
/// use install_preflight::render_template;
///
/// let out = render_template("{dsn}{username}{password}", &[
///     ("dsn", "D"),
///     ("username", "U"),
///     ("password", "P"),
/// ]);
/// assert_eq!(out, "DUP");
/// ```
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let re = Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Invalid regex pattern");
    re.replace_all(template, |caps: &Captures<'_>| {
        let key = &caps[1];
        values
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.to_string())
            .unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

/// Read a template file.
pub(crate) fn load_template(path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
}

/// Write `contents` to `target` atomically.
///
/// The bytes go to a temporary file in the target's directory, are synced,
/// and the file is renamed over `target`. On any failure the temporary file
/// is removed and `target` keeps its previous content.
///
/// The written file keeps the permissions of the file it replaces. A new
/// file gets mode `0644` on Unix.
///
/// # Arguments
///
/// * `target` - Final location of the artifact
/// * `contents` - Rendered artifact text
///
/// # Returns
///
/// `Ok(())` once `target` holds `contents`, or the I/O error from creating,
/// writing or renaming the temporary file.
pub(crate) fn write_atomic(target: &Path, contents: &str) -> io::Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    let permissions = artifact_permissions(target, tmp.as_file())?;
    tmp.as_file().set_permissions(permissions)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;

    debug!(path = %target.display(), bytes = contents.len(), "artifact written");
    Ok(())
}

/// Permissions for the file about to replace `target`.
fn artifact_permissions(target: &Path, tmp: &File) -> io::Result<Permissions> {
    match fs::metadata(target) {
        Ok(meta) if meta.is_file() => Ok(meta.permissions()),
        _ => {
            #[allow(unused_mut)]
            let mut permissions = tmp.metadata()?.permissions();
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                permissions.set_mode(NEW_ARTIFACT_MODE);
            }
            Ok(permissions)
        }
    }
}

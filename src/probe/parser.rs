//! Parsing of runtime probe output.

use super::ProbeError;
use regex::Regex;
use semver::Version;
use std::collections::BTreeSet;

/// Parse the runtime's semantic version from its `--version` output.
///
/// - `PHP 8.2.12 (cli) (built: Oct 24 2023)` -> 8.2.12
/// - `8.3.0` -> 8.3.0
///
/// # Arguments
///
/// * `output` - Text printed by the runtime's `--version` flag
///
/// # Returns
///
/// `Ok(Version)` for the first `major.minor.patch` match, or
/// `Err(ProbeError::VersionParseFailed)` carrying the trimmed output.
pub(crate) fn parse_version(output: &str) -> Result<Version, ProbeError> {
    let re = Regex::new(r"(\d+)\.(\d+)\.(\d+)").expect("Invalid regex pattern");

    let failed = || ProbeError::VersionParseFailed(output.trim().to_string());
    let caps = re.captures(output).ok_or_else(failed)?;
    let version_str = caps.get(0).ok_or_else(failed)?.as_str();
    Version::parse(version_str).map_err(|_| failed())
}

/// Parse the loaded module list printed by the runtime's `-m` flag.
///
/// Section headers like `[PHP Modules]` and blank lines are skipped. Names
/// are lowercased.
pub(crate) fn parse_module_list(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('['))
        .map(str::to_ascii_lowercase)
        .collect()
}

/// Extract the raw image library version from the extension info report.
///
/// Looks for a `GD Version => ...` or `GD library Version => ...` row.
///
/// # Returns
///
/// The raw value of the first matching row, or `None` when the extension
/// reports no version.
pub(crate) fn parse_image_version(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (key, value) = line.split_once("=>")?;
        let key = key.trim();
        if key.eq_ignore_ascii_case("GD Version") || key.eq_ignore_ascii_case("GD library Version")
        {
            Some(value.trim().to_string())
        } else {
            None
        }
    })
}

/// Strip every character that is neither a digit nor a dot.
pub(crate) fn normalize_version(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_version() {
        let output = "PHP 8.2.12 (cli) (built: Oct 24 2023 21:15:15) (NTS)\nCopyright (c) The PHP Group";
        assert_eq!(parse_version(output).unwrap(), Version::new(8, 2, 12));
    }

    #[test]
    fn test_parse_bare_version() {
        assert_eq!(parse_version("5.6.2\n").unwrap(), Version::new(5, 6, 2));
    }

    #[test]
    fn test_parse_version_no_match() {
        let result = parse_version("command not understood");
        assert!(matches!(result, Err(ProbeError::VersionParseFailed(_))));
    }

    #[test]
    fn test_parse_module_list() {
        let output = "[PHP Modules]\nCore\ncurl\nPDO\npdo_mysql\nzlib\n\n[Zend Modules]\nZend OPcache\n";
        let modules = parse_module_list(output);
        assert!(modules.contains("pdo"));
        assert!(modules.contains("pdo_mysql"));
        assert!(modules.contains("curl"));
        assert!(modules.contains("zend opcache"));
        assert!(!modules.iter().any(|m| m.starts_with('[')));
    }

    #[test]
    fn test_parse_image_version_bundled() {
        let output = "\ngd\n\nGD Support => enabled\nGD Version => bundled (2.1.0 compatible)\nFreeType Support => enabled\n";
        assert_eq!(
            parse_image_version(output).as_deref(),
            Some("bundled (2.1.0 compatible)")
        );
    }

    #[test]
    fn test_parse_image_version_library_row() {
        let output = "GD Support => enabled\nGD library Version => 2.3.3\n";
        assert_eq!(parse_image_version(output).as_deref(), Some("2.3.3"));
    }

    #[test]
    fn test_parse_image_version_missing() {
        assert_eq!(parse_image_version("Extension 'gd' not present."), None);
    }

    #[test]
    fn test_normalize_version() {
        assert_eq!(normalize_version("bundled (2.1.0 compatible)"), "2.1.0");
        assert_eq!(normalize_version("2.3.3"), "2.3.3");
        assert_eq!(normalize_version("unknown"), "");
    }
}

//! Probe options configuration.
//!
//! This module provides the [`ProbeOptions`] struct for configuring how
//! [`SystemProbe`](crate::SystemProbe) inspects the host runtime.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration options for host probing.
///
/// # Default Behavior
///
/// The runtime executable is `php`, looked up on PATH, and every probe
/// command gets 5 seconds to answer.
///
/// # Example
///
/// ```rust
/// use install_preflight::ProbeOptions;
/// use std::time::Duration;
///
/// let opts = ProbeOptions {
///     runtime_executable: "/opt/php83/bin/php".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(opts.timeout, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeOptions {
    /// Name or path of the runtime interpreter.
    ///
    /// Default: `php`
    pub runtime_executable: String,

    /// Timeout for each probe command.
    ///
    /// Default: 5 seconds
    #[serde(with = "duration_secs", rename = "timeout_secs")]
    pub timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            runtime_executable: "php".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = ProbeOptions::default();
        assert_eq!(opts.runtime_executable, "php");
        assert_eq!(opts.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_custom_timeout() {
        let opts = ProbeOptions {
            timeout: Duration::from_millis(500),
            ..Default::default()
        };
        assert_eq!(opts.timeout, Duration::from_millis(500));
        assert_eq!(opts.runtime_executable, "php");
    }

    #[test]
    fn test_deserialize_partial() {
        let opts: ProbeOptions = toml::from_str("timeout_secs = 12").unwrap();
        assert_eq!(opts.timeout, Duration::from_secs(12));
        assert_eq!(opts.runtime_executable, "php");
    }
}

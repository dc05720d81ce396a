//! Verdict types produced by capability checks.

use serde::{Deserialize, Serialize};

/// Aggregate readiness of the host.
///
/// Variants are ordered from worst to best, so the weakest of several
/// verdicts is their minimum.
///
/// # Example
///
/// ```rust
/// use install_preflight::SupportVerdict;
///
/// assert!(SupportVerdict::Unsupported < SupportVerdict::Partial);
/// assert!(SupportVerdict::Partial < SupportVerdict::Full);
/// assert!(SupportVerdict::Partial.can_install());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportVerdict {
    /// A hard requirement failed. Installation is refused.
    Unsupported,
    /// Hard requirements hold but an optional capability is missing, or the
    /// HTTP server has uncertain rewrite support.
    Partial,
    /// Everything checked out.
    Full,
}

impl SupportVerdict {
    /// Whether installation may proceed with this verdict.
    pub fn can_install(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    /// Short label for display.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Unsupported => "Host is not supported",
            Self::Partial => "Host is partially supported",
            Self::Full => "Host is fully supported",
        }
    }
}

/// Result of checking a named HTTP server against the support policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HttpServerVerdict {
    /// Listed as supported.
    Supported,
    /// Listed as partially supported, or the user declined to name a server.
    Partial,
    /// Listed as unsupported, or not listed at all.
    Unsupported,
}

impl HttpServerVerdict {
    /// Whether this verdict fails the hard requirement on the HTTP server.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported)
    }
}

/// Minimum requirements a host is evaluated against.
///
/// # Example
///
/// ```rust
/// use install_preflight::ServerRequirements;
///
/// let req = ServerRequirements::new("5.3.0", "apache_w");
/// assert_eq!(req.min_runtime_version, "5.3.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRequirements {
    /// Oldest acceptable runtime version, dotted.
    pub min_runtime_version: String,

    /// HTTP server identifier selected by the operator.
    pub http_server: String,
}

impl ServerRequirements {
    /// Build requirements from a minimum version and a server identifier.
    pub fn new(min_runtime_version: impl Into<String>, http_server: impl Into<String>) -> Self {
        Self {
            min_runtime_version: min_runtime_version.into(),
            http_server: http_server.into(),
        }
    }
}

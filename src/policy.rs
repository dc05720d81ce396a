//! HTTP server support policy.

use crate::HttpServerVerdict;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier a user picks when they decline to name their HTTP server.
pub const OTHER_SERVER: &str = "other";

/// How well a named HTTP server is supported.
///
/// In configuration this is written as `true`, `false` or `"partial"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SupportRepr", into = "SupportRepr")]
pub enum ServerSupport {
    /// Known to work.
    Supported,
    /// Works with caveats.
    Partial,
    /// Known not to work.
    Unsupported,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SupportRepr {
    Flag(bool),
    Level(String),
}

impl TryFrom<SupportRepr> for ServerSupport {
    type Error = String;

    fn try_from(repr: SupportRepr) -> Result<Self, Self::Error> {
        match repr {
            SupportRepr::Flag(true) => Ok(Self::Supported),
            SupportRepr::Flag(false) => Ok(Self::Unsupported),
            SupportRepr::Level(level) if level == "partial" => Ok(Self::Partial),
            SupportRepr::Level(other) => Err(format!(
                "invalid support level {other:?}, expected true, false or \"partial\""
            )),
        }
    }
}

impl From<ServerSupport> for SupportRepr {
    fn from(support: ServerSupport) -> Self {
        match support {
            ServerSupport::Supported => Self::Flag(true),
            ServerSupport::Unsupported => Self::Flag(false),
            ServerSupport::Partial => Self::Level("partial".to_string()),
        }
    }
}

/// Policy entry for a single HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    /// Human readable name shown to the operator.
    #[serde(default)]
    pub name: String,

    /// Support level.
    pub supported: ServerSupport,

    /// Whether URL rewriting is available. `None` when the policy is silent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite_support: Option<bool>,
}

/// Static table of known HTTP servers, keyed by identifier.
///
/// # Example
///
/// ```rust
/// use install_preflight::{HttpServerVerdict, ServerSupportPolicy};
///
/// let policy = ServerSupportPolicy::default();
/// assert_eq!(policy.verify("apache_w"), HttpServerVerdict::Supported);
/// assert_eq!(policy.verify("other"), HttpServerVerdict::Partial);
/// assert_eq!(policy.verify("tomcat"), HttpServerVerdict::Unsupported);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerSupportPolicy {
    servers: BTreeMap<String, ServerEntry>,
}

impl ServerSupportPolicy {
    /// Build a policy from explicit entries.
    pub fn new(servers: impl IntoIterator<Item = (String, ServerEntry)>) -> Self {
        Self {
            servers: servers.into_iter().collect(),
        }
    }

    /// Look up a server entry.
    pub fn get(&self, server: &str) -> Option<&ServerEntry> {
        self.servers.get(server)
    }

    /// Iterate over all configured servers.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ServerEntry)> {
        self.servers.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    /// Classify a server identifier.
    ///
    /// [`OTHER_SERVER`] is always `Partial`, whatever the table says. An
    /// identifier missing from the table is `Unsupported`.
    pub fn verify(&self, server: &str) -> HttpServerVerdict {
        if server == OTHER_SERVER {
            return HttpServerVerdict::Partial;
        }

        match self.servers.get(server).map(|entry| entry.supported) {
            Some(ServerSupport::Supported) => HttpServerVerdict::Supported,
            Some(ServerSupport::Partial) => HttpServerVerdict::Partial,
            Some(ServerSupport::Unsupported) | None => HttpServerVerdict::Unsupported,
        }
    }

    /// Whether clean URLs can be used for this server.
    ///
    /// Only an explicit `rewrite_support = false` disables them; unknown
    /// servers and entries without the flag keep them on.
    pub fn clean_urls(&self, server: &str) -> bool {
        self.servers
            .get(server)
            .and_then(|entry| entry.rewrite_support)
            != Some(false)
    }
}

impl Default for ServerSupportPolicy {
    fn default() -> Self {
        let entry = |name: &str, supported, rewrite_support| ServerEntry {
            name: name.to_string(),
            supported,
            rewrite_support,
        };

        Self::new([
            (
                "apache_w".to_string(),
                entry("Apache (with mod_rewrite)", ServerSupport::Supported, Some(true)),
            ),
            (
                "apache_wo".to_string(),
                entry("Apache (without mod_rewrite)", ServerSupport::Supported, Some(false)),
            ),
            (
                "abyss".to_string(),
                entry("Abyss Web Server X1/X2", ServerSupport::Supported, Some(false)),
            ),
            (
                "cherokee".to_string(),
                entry("Cherokee Web Server", ServerSupport::Supported, Some(false)),
            ),
            (
                "lighttpd".to_string(),
                entry("Lighttpd", ServerSupport::Supported, Some(false)),
            ),
            (
                "nginx".to_string(),
                entry("Nginx", ServerSupport::Supported, Some(true)),
            ),
            (
                "uniform".to_string(),
                entry("Uniform Server", ServerSupport::Supported, Some(true)),
            ),
        ])
    }
}

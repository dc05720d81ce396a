//! Capability checks over a host snapshot.
//!
//! [`CapabilityProber`] answers the individual "does the host support X"
//! questions and folds them into a [`SupportVerdict`]. It never touches the
//! host itself; it only reads a [`HostCapabilities`] snapshot produced by a
//! [`CapabilityProbe`](crate::CapabilityProbe).

use crate::probe::normalize_version;
use crate::{
    DbDriver, DottedVersion, HostCapabilities, HttpServerVerdict, ServerRequirements,
    ServerSupportPolicy, SupportVerdict,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Lowest acceptable image library version.
const MIN_IMAGE_VERSION: &str = "1.0";

/// Evaluates a host snapshot against the server support policy.
///
/// The only state kept between calls is the most recently computed runtime
/// and image library versions, exposed for reporting.
///
/// # Example
///
/// ```rust
/// use install_preflight::{
///     CapabilityProber, HostCapabilities, ServerRequirements, ServerSupportPolicy, SupportVerdict,
/// };
///
/// let caps = HostCapabilities::from_modules(
///     "8.2.0",
///     ["pdo", "pdo_mysql", "gd", "zlib"],
///     Some("2.1".to_string()),
///     "apache_w",
/// );
/// let policy = ServerSupportPolicy::default();
/// let mut prober = CapabilityProber::new(&caps, &policy);
///
/// let verdict = prober.check_server(&ServerRequirements::new("5.3.0", "apache_w"));
/// assert_eq!(verdict, SupportVerdict::Full);
/// assert_eq!(prober.last_runtime_version(), Some("8.2.0"));
/// ```
#[derive(Debug)]
pub struct CapabilityProber<'a> {
    capabilities: &'a HostCapabilities,
    policy: &'a ServerSupportPolicy,
    runtime_version: Option<String>,
    image_version: Option<String>,
}

impl<'a> CapabilityProber<'a> {
    /// Create a prober over a snapshot and a policy.
    pub fn new(capabilities: &'a HostCapabilities, policy: &'a ServerSupportPolicy) -> Self {
        Self {
            capabilities,
            policy,
            runtime_version: None,
            image_version: None,
        }
    }

    /// Whether the runtime version is at least `min_version`.
    pub fn runtime_acceptable(&mut self, min_version: &str) -> bool {
        let found = &self.capabilities.runtime_version;
        self.runtime_version = Some(found.clone());
        DottedVersion::parse(found) >= DottedVersion::parse(min_version)
    }

    /// Availability of each supported driver.
    ///
    /// A driver counts as available only when both the generic database
    /// access layer and that driver's client module are loaded.
    pub fn database_drivers_available(&self) -> BTreeMap<DbDriver, bool> {
        DbDriver::all()
            .map(|driver| {
                let available =
                    self.capabilities.db_layer_available && self.capabilities.has_driver(driver);
                (driver, available)
            })
            .collect()
    }

    /// Normalized image library version, or `None` if the library is missing.
    pub fn image_capability(&mut self) -> Option<String> {
        let normalized = self
            .capabilities
            .image_library_version
            .as_deref()
            .map(normalize_version);
        self.image_version = normalized.clone();
        normalized
    }

    /// Whether the image library is present at version 1.0 or later.
    pub fn image_acceptable(&mut self) -> bool {
        self.image_capability()
            .is_some_and(|v| DottedVersion::parse(&v) >= DottedVersion::parse(MIN_IMAGE_VERSION))
    }

    /// Whether the compression library is loaded.
    pub fn compression_available(&self) -> bool {
        self.capabilities.compression_available
    }

    /// Whether the generic database access layer is loaded.
    pub fn db_extension_present(&self) -> bool {
        self.capabilities.db_layer_available
    }

    /// Whether an HTTP client library is loaded.
    pub fn curl_like_client_available(&self) -> bool {
        self.capabilities.http_client_available
    }

    /// Classify an HTTP server identifier against the policy.
    pub fn verify_http_server(&self, name: &str) -> HttpServerVerdict {
        self.policy.verify(name)
    }

    /// Aggregate verdict for the host.
    ///
    /// A runtime below the minimum or an unsupported HTTP server yields
    /// `Unsupported` straight away, without looking at the optional
    /// capabilities.
    pub fn check_server(&mut self, requirements: &ServerRequirements) -> SupportVerdict {
        if !self.runtime_acceptable(&requirements.min_runtime_version) {
            debug!(
                found = %self.capabilities.runtime_version,
                required = %requirements.min_runtime_version,
                "runtime below minimum"
            );
            return SupportVerdict::Unsupported;
        }

        let server = self.verify_http_server(&requirements.http_server);
        if server.is_unsupported() {
            debug!(server = %requirements.http_server, "http server not supported");
            return SupportVerdict::Unsupported;
        }

        if server == HttpServerVerdict::Partial
            || !self.image_acceptable()
            || !self.compression_available()
        {
            return SupportVerdict::Partial;
        }

        SupportVerdict::Full
    }

    /// Runtime version seen by the last runtime check.
    pub fn last_runtime_version(&self) -> Option<&str> {
        self.runtime_version.as_deref()
    }

    /// Normalized image library version seen by the last image check.
    pub fn last_image_version(&self) -> Option<&str> {
        self.image_version.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capable_host(runtime: &str, server: &str) -> HostCapabilities {
        HostCapabilities::from_modules(
            runtime,
            ["pdo", "pdo_mysql", "pdo_sqlite", "gd", "zlib", "curl"],
            Some("2.1".to_string()),
            server,
        )
    }

    #[test]
    fn test_runtime_acceptable() {
        let policy = ServerSupportPolicy::default();
        let caps = capable_host("5.6.2", "apache_w");
        let mut prober = CapabilityProber::new(&caps, &policy);
        assert!(prober.runtime_acceptable("5.3.0"));
        assert_eq!(prober.last_runtime_version(), Some("5.6.2"));

        let caps = capable_host("5.2.9", "apache_w");
        let mut prober = CapabilityProber::new(&caps, &policy);
        assert!(!prober.runtime_acceptable("5.3.0"));
    }

    #[test]
    fn test_drivers_require_access_layer() {
        let policy = ServerSupportPolicy::default();
        let caps = HostCapabilities::from_modules("8.0.0", ["pdo_mysql"], None, "nginx");
        let prober = CapabilityProber::new(&caps, &policy);
        let drivers = prober.database_drivers_available();
        assert_eq!(drivers.len(), 3);
        assert!(drivers.values().all(|available| !available));
        assert!(!prober.db_extension_present());

        let caps = HostCapabilities::from_modules("8.0.0", ["pdo", "pdo_pgsql"], None, "nginx");
        let prober = CapabilityProber::new(&caps, &policy);
        let drivers = prober.database_drivers_available();
        assert!(drivers[&DbDriver::Pgsql]);
        assert!(!drivers[&DbDriver::Mysql]);
        assert!(!drivers[&DbDriver::Sqlite]);
    }

    #[test]
    fn test_image_capability_normalized() {
        let policy = ServerSupportPolicy::default();
        let mut caps = capable_host("8.0.0", "nginx");
        caps.image_library_version = Some("bundled (2.1.0 compatible)".to_string());
        let mut prober = CapabilityProber::new(&caps, &policy);
        assert_eq!(prober.image_capability().as_deref(), Some("2.1.0"));
        assert_eq!(prober.last_image_version(), Some("2.1.0"));
        assert!(prober.image_acceptable());
    }

    #[test]
    fn test_image_below_minimum() {
        let policy = ServerSupportPolicy::default();
        let mut caps = capable_host("8.0.0", "nginx");
        caps.image_library_version = Some("0.9".to_string());
        let mut prober = CapabilityProber::new(&caps, &policy);
        assert!(!prober.image_acceptable());
    }

    #[test]
    fn test_image_absent() {
        let policy = ServerSupportPolicy::default();
        let mut caps = capable_host("8.0.0", "nginx");
        caps.image_library_version = None;
        let mut prober = CapabilityProber::new(&caps, &policy);
        assert_eq!(prober.image_capability(), None);
        assert!(!prober.image_acceptable());
    }

    #[test]
    fn test_check_server_full() {
        let policy = ServerSupportPolicy::default();
        let caps = capable_host("8.2.0", "apache_w");
        let mut prober = CapabilityProber::new(&caps, &policy);
        let verdict = prober.check_server(&ServerRequirements::new("5.3.0", "apache_w"));
        assert_eq!(verdict, SupportVerdict::Full);
        assert_eq!(prober.last_image_version(), Some("2.1"));
    }

    #[test]
    fn test_check_server_other_caps_at_partial() {
        let policy = ServerSupportPolicy::default();
        let caps = capable_host("8.2.0", "other");
        let mut prober = CapabilityProber::new(&caps, &policy);
        let verdict = prober.check_server(&ServerRequirements::new("5.3.0", "other"));
        assert_eq!(verdict, SupportVerdict::Partial);
    }

    #[test]
    fn test_check_server_unsupported_server_short_circuits() {
        let policy = ServerSupportPolicy::default();
        let caps = capable_host("8.2.0", "tomcat");
        let mut prober = CapabilityProber::new(&caps, &policy);
        let verdict = prober.check_server(&ServerRequirements::new("5.3.0", "tomcat"));
        assert_eq!(verdict, SupportVerdict::Unsupported);
        // image check never ran
        assert_eq!(prober.last_image_version(), None);
    }

    #[test]
    fn test_check_server_old_runtime_short_circuits() {
        let policy = ServerSupportPolicy::default();
        let caps = capable_host("5.2.9", "apache_w");
        let mut prober = CapabilityProber::new(&caps, &policy);
        let verdict = prober.check_server(&ServerRequirements::new("5.3.0", "apache_w"));
        assert_eq!(verdict, SupportVerdict::Unsupported);
        assert_eq!(prober.last_image_version(), None);
    }

    #[test]
    fn test_check_server_missing_compression_is_partial() {
        let policy = ServerSupportPolicy::default();
        let mut caps = capable_host("8.2.0", "nginx");
        caps.compression_available = false;
        let mut prober = CapabilityProber::new(&caps, &policy);
        let verdict = prober.check_server(&ServerRequirements::new("5.3.0", "nginx"));
        assert_eq!(verdict, SupportVerdict::Partial);
    }

    #[test]
    fn test_check_server_missing_image_is_partial() {
        let policy = ServerSupportPolicy::default();
        let mut caps = capable_host("8.2.0", "nginx");
        caps.image_library_version = None;
        let mut prober = CapabilityProber::new(&caps, &policy);
        let verdict = prober.check_server(&ServerRequirements::new("5.3.0", "nginx"));
        assert_eq!(verdict, SupportVerdict::Partial);
    }

    #[test]
    fn test_supplementary_probes() {
        let policy = ServerSupportPolicy::default();
        let caps = capable_host("8.2.0", "nginx");
        let prober = CapabilityProber::new(&caps, &policy);
        assert!(prober.db_extension_present());
        assert!(prober.curl_like_client_available());
        assert!(prober.compression_available());
    }
}

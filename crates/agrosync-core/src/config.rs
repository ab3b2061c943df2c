// ── Runtime configuration ──
//
// These types describe how to reach the backend and how reads are cached.
// They never touch disk: the CLI (via agrosync-config) builds a
// `DashboardConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification. Local development backends only.
    DangerAcceptInvalid,
}

/// Hosted identity provider settings. The sign-in flow itself is external;
/// these are only checked for presence at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProviderConfig {
    pub user_pool_id: Option<String>,
    pub client_id: Option<String>,
    pub region: String,
}

impl Default for IdentityProviderConfig {
    fn default() -> Self {
        Self {
            user_pool_id: None,
            client_id: None,
            region: "us-east-1".into(),
        }
    }
}

impl IdentityProviderConfig {
    /// Names of every required setting that is absent or blank.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        let mut missing = Vec::new();
        if blank(&self.user_pool_id) {
            missing.push("user_pool_id");
        }
        if blank(&self.client_id) {
            missing.push("client_id");
        }
        missing
    }
}

/// Freshness and retry policy for cached reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    /// How long a successful read is served without a network call.
    pub stale_time: Duration,
    /// Extra attempts after a transient failure.
    pub retries: u32,
    /// Pause before each retry.
    pub retry_delay: Duration,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(5 * 60),
            retries: 1,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Everything a [`Dashboard`](crate::Dashboard) needs to run.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Backend base URL (e.g., `https://api.example.com/v1/`).
    pub api_url: Url,
    /// Access token issued by the identity provider.
    pub access_token: Option<SecretString>,
    pub tls: TlsVerification,
    /// Request timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,
    pub identity: IdentityProviderConfig,
    pub query: QueryPolicy,
}

impl DashboardConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            access_token: None,
            tls: TlsVerification::default(),
            timeout: None,
            identity: IdentityProviderConfig::default(),
            query: QueryPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_identity_keys_are_all_named() {
        let cfg = IdentityProviderConfig {
            client_id: Some("  ".into()),
            ..IdentityProviderConfig::default()
        };
        assert_eq!(cfg.missing_keys(), vec!["user_pool_id", "client_id"]);
        assert_eq!(cfg.region, "us-east-1");
    }

    #[test]
    fn default_policy_is_five_minutes_one_retry() {
        let p = QueryPolicy::default();
        assert_eq!(p.stale_time, Duration::from_secs(300));
        assert_eq!(p.retries, 1);
    }
}

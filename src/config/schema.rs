//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// In-memory response cache.
    pub cache: CacheConfig,

    /// Outbound fetch settings.
    pub upstream: UpstreamConfig,

    /// Cache-Control values handed to callers.
    pub freshness: FreshnessConfig,

    /// Inbound request deadline.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached upstream responses.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: 1000 }
    }
}

/// Upstream fetch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total time allowed for one upstream exchange, body included.
    pub request_timeout_secs: u64,

    /// Largest upstream body that will be buffered.
    pub max_body_bytes: usize,

    /// Redirects followed before giving up.
    pub max_redirects: usize,

    /// Product name advertised in the User-Agent.
    pub product: String,

    /// Homepage advertised in the User-Agent.
    pub homepage: String,
}

impl UpstreamConfig {
    /// The identifying User-Agent sent with every upstream request.
    pub fn user_agent(&self) -> String {
        format!(
            "Mozilla/5.0 (compatible; {}/{}; +{})",
            self.product,
            env!("CARGO_PKG_VERSION"),
            self.homepage
        )
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
            max_body_bytes: 32 * 1024 * 1024, // 32MB
            max_redirects: 10,
            product: "origin-relay".to_string(),
            homepage: "https://github.com/origin-relay/origin-relay".to_string(),
        }
    }
}

/// Freshness hints for callers (Cache-Control).
///
/// These only shape response headers. The in-memory cache does not expire
/// entries by age.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FreshnessConfig {
    /// max-age used when the caller gives no usable `cacheMaxAge`.
    pub default_max_age_secs: u64,

    /// Floor applied to caller-supplied `cacheMaxAge`.
    pub min_max_age_secs: u64,

    /// stale-if-error window advertised to callers.
    pub stale_if_error_secs: u64,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            default_max_age_secs: 60 * 60,
            min_max_age_secs: 5 * 60,
            stale_if_error_secs: 600,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RelayConfig = toml::from_str(
            r#"
            [cache]
            max_entries = 10

            [freshness]
            min_max_age_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.max_entries, 10);
        assert_eq!(config.freshness.min_max_age_secs, 60);
        assert_eq!(config.freshness.default_max_age_secs, 3600);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.upstream.request_timeout_secs, 30);
    }

    #[test]
    fn test_user_agent_format() {
        let upstream = UpstreamConfig {
            product: "relay".into(),
            homepage: "http://relay.example/".into(),
            ..Default::default()
        };
        let ua = upstream.user_agent();

        assert!(ua.starts_with("Mozilla/5.0 (compatible; relay/"));
        assert!(ua.ends_with("; +http://relay.example/)"));
    }
}

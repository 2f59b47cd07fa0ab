//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, capacity > 0)
//! - Validate addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::RelayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field}: invalid URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error(
        "freshness.min_max_age_secs ({min}) exceeds freshness.default_max_age_secs ({default})"
    )]
    FreshnessFloor { min: u64, default: u64 },

    #[error(
        "timeouts.request_secs ({inbound}) must exceed upstream.request_timeout_secs ({upstream})"
    )]
    InboundDeadline { inbound: u64, upstream: u64 },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.cache.max_entries == 0 {
        errors.push(ValidationError::Zero { field: "cache.max_entries" });
    }

    let nonzero = [
        ("upstream.connect_timeout_secs", config.upstream.connect_timeout_secs),
        ("upstream.request_timeout_secs", config.upstream.request_timeout_secs),
        ("upstream.max_body_bytes", config.upstream.max_body_bytes as u64),
        ("timeouts.request_secs", config.timeouts.request_secs),
    ];
    for (field, value) in nonzero {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    // Upstream timeouts must surface as an envelope before the inbound deadline fires.
    let (inbound, upstream) = (config.timeouts.request_secs, config.upstream.request_timeout_secs);
    if inbound > 0 && upstream > 0 && inbound <= upstream {
        errors.push(ValidationError::InboundDeadline { inbound, upstream });
    }

    if url::Url::parse(&config.upstream.homepage).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field: "upstream.homepage",
            value: config.upstream.homepage.clone(),
        });
    }

    let freshness = &config.freshness;
    if freshness.min_max_age_secs > freshness.default_max_age_secs {
        errors.push(ValidationError::FreshnessFloor {
            min: freshness.min_max_age_secs,
            default: freshness.default_max_age_secs,
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RelayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = RelayConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.cache.max_entries = 0;
        config.upstream.request_timeout_secs = 0;
        config.freshness.min_max_age_secs = 7200;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::Zero { field: "cache.max_entries" }));
        assert!(errors.contains(&ValidationError::FreshnessFloor { min: 7200, default: 3600 }));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = RelayConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("observability.metrics_address"));
    }

    #[test]
    fn test_inbound_deadline_must_outlast_upstream_timeout() {
        let mut config = RelayConfig::default();
        config.timeouts.request_secs = 1;
        config.upstream.request_timeout_secs = 5;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::InboundDeadline { inbound: 1, upstream: 5 }]);

        config.timeouts.request_secs = 5;
        assert!(validate_config(&config).is_err());

        config.timeouts.request_secs = 6;
        assert!(validate_config(&config).is_ok());
    }
}

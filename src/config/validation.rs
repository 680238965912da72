//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, 0 < TTL <= 30 days)
//! - Keep the listener on loopback
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Origin patterns are not checked here; the matcher falls back to its
//!   defaults when they do not compile

use std::net::SocketAddr;

use axum::http::HeaderName;

use crate::config::schema::GatewayConfig;

/// Longest session lifetime accepted: thirty days.
pub const MAX_TTL_SECS: u64 = 30 * 24 * 3600;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BadBindAddress(String),
    #[error("listener.bind_address '{0}' is not a loopback address")]
    NonLoopbackBind(String),
    #[error("listener.max_connections must be greater than zero")]
    ZeroConnections,
    #[error("listener.tls.{0} must not be empty")]
    MissingTlsPath(&'static str),
    #[error("security.origin_header '{0}' is not a valid header name")]
    BadOriginHeader(String),
    #[error("security.max_body_size must be greater than zero")]
    ZeroBodySize,
    #[error("session.ttl_secs must be greater than zero")]
    ZeroTtl,
    #[error("session.ttl_secs must not exceed {max} (got {0})", max = MAX_TTL_SECS)]
    TtlTooLarge(u64),
    #[error("session.sweep_interval_secs must be greater than zero")]
    ZeroSweepInterval,
    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
    #[error("observability.metrics_address '{0}' is not a socket address")]
    BadMetricsAddress(String),
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let bind = &config.listener.bind_address;
    match bind.parse::<SocketAddr>() {
        Ok(addr) if !addr.ip().is_loopback() => {
            errors.push(ValidationError::NonLoopbackBind(bind.clone()))
        }
        Ok(_) => {}
        Err(_) => errors.push(ValidationError::BadBindAddress(bind.clone())),
    }

    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroConnections);
    }
    if config.listener.tls.cert_path.trim().is_empty() {
        errors.push(ValidationError::MissingTlsPath("cert_path"));
    }
    if config.listener.tls.key_path.trim().is_empty() {
        errors.push(ValidationError::MissingTlsPath("key_path"));
    }

    if HeaderName::try_from(config.security.origin_header.as_str()).is_err() {
        errors.push(ValidationError::BadOriginHeader(
            config.security.origin_header.clone(),
        ));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodySize);
    }

    if config.session.ttl_secs == 0 {
        errors.push(ValidationError::ZeroTtl);
    } else if config.session.ttl_secs > MAX_TTL_SECS {
        errors.push(ValidationError::TtlTooLarge(config.session.ttl_secs));
    }
    if config.session.sweep_interval_secs == 0 {
        errors.push(ValidationError::ZeroSweepInterval);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::BadMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
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
    fn test_defaults_are_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "0.0.0.0:8443".into();
        config.security.origin_header = "bad header".into();
        config.session.ttl_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::NonLoopbackBind("0.0.0.0:8443".into()),
                ValidationError::BadOriginHeader("bad header".into()),
                ValidationError::ZeroTtl,
            ]
        );
    }

    #[test]
    fn test_ttl_upper_bound() {
        let mut config = GatewayConfig::default();
        config.session.ttl_secs = MAX_TTL_SECS;
        assert!(validate_config(&config).is_ok());

        config.session.ttl_secs = 10_000_000_000_000;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::TtlTooLarge(10_000_000_000_000)]
        );
    }

    #[test]
    fn test_unparseable_bind_address() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "localhost".into();
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::BadBindAddress("localhost".into())]
        );
    }
}

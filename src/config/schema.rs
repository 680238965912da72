//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Origin allow-list and authentication policy.
    pub security: SecurityConfig,

    /// Session lifetime settings.
    pub session: SessionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Session issuance channel settings.
    pub issuance: IssuanceConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address. Must be a loopback address.
    pub bind_address: String,

    /// TLS material. There is no plaintext listener.
    pub tls: TlsConfig,

    /// Maximum requests processed concurrently (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8443".to_string(),
            tls: TlsConfig::default(),
            max_connections: 256,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            cert_path: "certs/localhost.pem".to_string(),
            key_path: "certs/localhost-key.pem".to_string(),
        }
    }
}

/// Origin allow-list and request authentication policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Allowed origin patterns. `/.../` is a raw regex, anything else is a
    /// literal where `*` matches any run of characters. Empty = built-in defaults.
    pub allowed_origins: Vec<String>,

    /// Non-standard header carrying the origin for non-browser callers.
    pub origin_header: String,

    /// Let a bearer token vouch for its own origin when no origin header is present.
    pub token_origin_fallback: bool,

    /// Treat requests with no resolvable origin as coming from `file://`.
    pub file_origin_fallback: bool,

    /// Return distinct 401 messages per rejection reason.
    pub disclose_rejection_reason: bool,

    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            origin_header: "x-origin".to_string(),
            token_origin_fallback: true,
            file_origin_fallback: true,
            disclose_rejection_reason: true,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Session lifetime configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Time-to-live of an issued token in seconds.
    pub ttl_secs: u64,

    /// Interval between expired-session sweeps in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            sweep_interval_secs: 300,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
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
            metrics_address: "127.0.0.1:9464".to_string(),
        }
    }
}

/// Session issuance channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IssuanceConfig {
    /// Serve token requests as JSON lines over stdin/stdout.
    pub stdio: bool,
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self { stdio: true }
    }
}

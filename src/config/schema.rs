//! Configuration schema definitions.
//!
//! Every section defaults to the values the router ships with, so an empty
//! (or absent) config file yields the production setup.

use serde::{Deserialize, Serialize};

/// Root configuration for the player router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Backend naming convention.
    pub backends: BackendConfig,

    /// Retry configuration for forwarding attempts.
    pub retries: RetryConfig,

    /// Redirect following and host rewriting.
    pub redirects: RedirectConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// How per-player backends are addressed.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Prefix the player id is appended to, forming the backend authority.
    pub service_prefix: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            service_prefix: "splunk-arcade-cabinet-player-".to_string(),
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total number of attempts per proxied request.
    pub max_attempts: u32,

    /// Fixed delay between attempts in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay_ms: 1000,
        }
    }
}

/// Redirect handling for backend responses.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Public host name; redirects pointing here are kept inside the cluster.
    pub public_host: String,

    /// Internal host that replaces `public_host` in redirect targets.
    pub portal_host: String,

    /// Maximum number of redirects followed per attempt.
    pub max_hops: usize,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            public_host: "splunk-arcade.home".to_string(),
            portal_host: "splunk-arcade-portal".to_string(),
            max_hops: 10,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Backend connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed for a client to send request headers.
    pub header_read_secs: u64,

    /// Time allowed for a client to send the request body.
    pub read_secs: u64,

    /// Time allowed for writing the response once the backend answered.
    pub write_secs: u64,

    /// Upper bound on one forwarding attempt, redirect hops included.
    pub attempt_secs: u64,

    /// Grace period for in-flight connections on shutdown.
    pub drain_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            header_read_secs: 5,
            read_secs: 5,
            write_secs: 5,
            attempt_secs: 5,
            drain_secs: 5,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum buffered request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins if set.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

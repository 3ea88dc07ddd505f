//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the forwarding gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Shared-token authentication.
    pub auth: AuthConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route definitions mapping path prefixes to upstream services.
    pub routes: Vec<RouteConfig>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            auth: AuthConfig::default(),
            limits: LimitsConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            routes: default_routes(),
        }
    }
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

/// Token gate configuration.
///
/// With no expected token the gate runs in optional-auth mode and lets
/// every request through.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Token callers must present in `X-Internal-Token` or `?token=`.
    pub expected_token: Option<String>,

    /// Skip the check entirely.
    pub disabled: bool,
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Timeout configuration.
///
/// Upstream timeouts are unset by default: a request waits on its upstream
/// until the overall request bound fires.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Overall bound on handling one inbound request, in seconds.
    pub request_secs: Option<u64>,

    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: Option<u64>,

    /// Upstream exchange timeout (send + full response) in seconds.
    pub upstream_secs: Option<u64>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: Some(60),
            connect_secs: None,
            upstream_secs: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Route configuration mapping a path prefix to an upstream service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Path prefix owned by this route (e.g. "/api/openai").
    pub path_prefix: String,

    /// Upstream base URL (scheme + host, optional base path).
    pub base_url: String,

    /// Route priority (higher = checked first).
    #[serde(default)]
    pub priority: u32,

    /// When set, a GET on the bare prefix answers with this message and the
    /// list of endpoints instead of being forwarded.
    #[serde(default)]
    pub info_message: Option<String>,

    /// Strip the automation signature from request bodies.
    #[serde(default)]
    pub sanitize: Option<SanitizerConfig>,
}

/// Body sanitizer settings for one route.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// Boilerplate phrase to remove (matched case-insensitively).
    pub phrase: String,

    /// Field names whose values are cleaned (matched case-insensitively).
    pub fields: Vec<String>,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            phrase: "This message was sent automatically with n8n".to_string(),
            fields: vec!["text".to_string(), "caption".to_string()],
        }
    }
}

const TELEGRAM_API: &str = "https://api.telegram.org";
const OPENAI_API: &str = "https://api.openai.com";

/// Route table used when the configuration names no routes.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig {
            name: "telegram".to_string(),
            path_prefix: "/api/telegram".to_string(),
            base_url: TELEGRAM_API.to_string(),
            priority: 0,
            info_message: None,
            sanitize: Some(SanitizerConfig::default()),
        },
        RouteConfig {
            name: "openai".to_string(),
            path_prefix: "/api/openai".to_string(),
            base_url: OPENAI_API.to_string(),
            priority: 0,
            info_message: None,
            sanitize: None,
        },
        RouteConfig {
            name: "telegram-direct".to_string(),
            path_prefix: "/telegram".to_string(),
            base_url: TELEGRAM_API.to_string(),
            priority: 0,
            info_message: None,
            sanitize: None,
        },
        RouteConfig {
            name: "api".to_string(),
            path_prefix: "/api".to_string(),
            base_url: TELEGRAM_API.to_string(),
            priority: 0,
            info_message: Some("Telegram Proxy API".to_string()),
            sanitize: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.limits.max_body_size, 2 * 1024 * 1024);
        assert_eq!(config.timeouts.request_secs, Some(60));
        assert!(config.timeouts.upstream_secs.is_none());
        assert!(config.auth.expected_token.is_none());
        assert_eq!(config.routes.len(), 4);
    }

    #[test]
    fn test_routes_from_toml() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [auth]
            expected_token = "s3cret"

            [observability]
            log_format = "json"

            [[routes]]
            name = "bot"
            path_prefix = "/bot"
            base_url = "https://bot.example.com"

            [routes.sanitize]
            phrase = "Sent via robot"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.expected_token.as_deref(), Some("s3cret"));
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.routes.len(), 1);
        let sanitize = config.routes[0].sanitize.as_ref().unwrap();
        assert_eq!(sanitize.phrase, "Sent via robot");
        assert_eq!(sanitize.fields, vec!["text", "caption"]);
    }

    #[test]
    fn test_default_routes_sanitize_telegram_only() {
        let routes = default_routes();
        let sanitized: Vec<_> = routes
            .iter()
            .filter(|r| r.sanitize.is_some())
            .map(|r| r.path_prefix.as_str())
            .collect();
        assert_eq!(sanitized, vec!["/api/telegram"]);
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (body limit > 0, addresses parse)
//! - Validate upstream URLs (absolute http/https with a host)
//! - Detect conflicting routes (duplicate prefixes)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{GatewayConfig, RouteConfig};

/// A single semantic problem in the configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("limits.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("route at index {0} has an empty name")]
    EmptyRouteName(usize),

    #[error("route '{route}': path prefix '{prefix}' must start with '/' and not end with '/'")]
    PathPrefix { route: String, prefix: String },

    #[error("route '{route}': duplicate path prefix '{prefix}'")]
    DuplicatePrefix { route: String, prefix: String },

    #[error("route '{route}': invalid base url '{url}': {reason}")]
    BaseUrl {
        route: String,
        url: String,
        reason: String,
    },

    #[error("route '{route}': sanitizer needs a non-empty phrase and at least one field")]
    Sanitizer { route: String },
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let mut seen = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        validate_route(index, route, &mut errors);
        if !seen.insert(route.path_prefix.as_str()) {
            errors.push(ValidationError::DuplicatePrefix {
                route: route.name.clone(),
                prefix: route.path_prefix.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_route(index: usize, route: &RouteConfig, errors: &mut Vec<ValidationError>) {
    if route.name.trim().is_empty() {
        errors.push(ValidationError::EmptyRouteName(index));
    }

    let prefix = route.path_prefix.as_str();
    let prefix_ok = prefix == "/" || (prefix.starts_with('/') && !prefix.ends_with('/'));
    if !prefix_ok {
        errors.push(ValidationError::PathPrefix {
            route: route.name.clone(),
            prefix: route.path_prefix.clone(),
        });
    }

    if let Err(reason) = check_base_url(&route.base_url) {
        errors.push(ValidationError::BaseUrl {
            route: route.name.clone(),
            url: route.base_url.clone(),
            reason,
        });
    }

    if let Some(sanitize) = &route.sanitize {
        let phrase_ok = !sanitize.phrase.trim().is_empty();
        let fields_ok = sanitize.fields.iter().any(|f| !f.trim().is_empty());
        if !phrase_ok || !fields_ok {
            errors.push(ValidationError::Sanitizer {
                route: route.name.clone(),
            });
        }
    }
}

fn check_base_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("query and fragment are not allowed".to_string());
    }
    Ok(())
}

//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Compile route configuration into upstream targets
//! - Look up the route for a request path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Ordered by priority, then by prefix length, so `/api/telegram` wins
//!   over `/api` at equal priority
//! - O(n) prefix scan (acceptable for typical route counts)
//! - Explicit no-match rather than silent default

use std::sync::Arc;

use thiserror::Error;

use crate::config::RouteConfig;
use crate::proxy::UpstreamConfig;
use crate::routing::matcher::PathPrefixMatcher;
use crate::transform::TransformError;

/// A route that could not be compiled.
#[derive(Error, Debug)]
#[error("route '{route}': {source}")]
pub struct RouteError {
    pub route: String,
    #[source]
    pub source: TransformError,
}

#[derive(Debug)]
struct CompiledRoute {
    matcher: PathPrefixMatcher,
    priority: u32,
    upstream: Arc<UpstreamConfig>,
}

/// Result of a successful lookup.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub upstream: Arc<UpstreamConfig>,
    /// Path segments after the prefix.
    pub segments: Vec<String>,
}

/// Compiled, ordered route table.
#[derive(Debug)]
pub struct Router {
    routes: Vec<CompiledRoute>,
}

impl Router {
    pub fn from_config(configs: &[RouteConfig]) -> Result<Self, RouteError> {
        let mut routes = configs
            .iter()
            .map(|config| {
                let upstream = UpstreamConfig::from_route(config).map_err(|source| RouteError {
                    route: config.name.clone(),
                    source,
                })?;
                Ok(CompiledRoute {
                    matcher: PathPrefixMatcher::new(config.path_prefix.as_str()),
                    priority: config.priority,
                    upstream: Arc::new(upstream),
                })
            })
            .collect::<Result<Vec<_>, RouteError>>()?;

        routes.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.matcher.specificity().cmp(&a.matcher.specificity()))
        });

        for route in &routes {
            tracing::debug!(
                route = %route.upstream.name,
                prefix = %route.matcher.prefix(),
                upstream = %route.upstream.base_url,
                sanitize = route.upstream.body_transform.is_some(),
                "Route compiled"
            );
        }

        Ok(Self { routes })
    }

    /// First route, in table order, whose prefix covers `path`.
    pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
        self.routes.iter().find_map(|route| {
            route.matcher.match_path(path).map(|segments| RouteMatch {
                upstream: Arc::clone(&route.upstream),
                segments,
            })
        })
    }

    /// Forwarding endpoints advertised by info pages, in table order.
    pub fn endpoints(&self) -> Vec<String> {
        self.routes
            .iter()
            .filter(|route| route.upstream.info_message.is_none())
            .map(|route| match route.matcher.prefix() {
                "/" => "/*".to_string(),
                prefix => format!("{prefix}/*"),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

//! Types flowing through the forward pipeline.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, StatusCode};
use hyper::ext::ReasonPhrase;

use crate::config::RouteConfig;
use crate::error::GatewayError;
use crate::transform::{BodySanitizer, BodyTransform, TransformError};

/// One configured upstream target. Built at startup, read-only afterwards.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub name: String,
    /// Scheme + host (+ optional base path), without a trailing slash.
    pub base_url: String,
    pub path_prefix: String,
    pub body_transform: Option<Arc<dyn BodyTransform>>,
    pub info_message: Option<String>,
}

impl UpstreamConfig {
    pub fn from_route(route: &RouteConfig) -> Result<Self, TransformError> {
        let body_transform = match &route.sanitize {
            Some(sanitize) => {
                Some(Arc::new(BodySanitizer::new(sanitize)?) as Arc<dyn BodyTransform>)
            }
            None => None,
        };

        Ok(Self {
            name: route.name.clone(),
            base_url: route.base_url.trim_end_matches('/').to_string(),
            path_prefix: route.path_prefix.clone(),
            body_transform,
            info_message: route.info_message.clone(),
        })
    }

    /// Upstream URL for the given path segments and raw query string.
    ///
    /// With no segments the base URL is used as-is, so no trailing slash is
    /// introduced.
    pub fn target_url(&self, segments: &[String], query: Option<&str>) -> String {
        let mut url = self.base_url.clone();
        if !segments.is_empty() {
            url.push('/');
            url.push_str(&segments.join("/"));
        }
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }
}

/// A request as received by the gateway, after route matching.
pub struct InboundRequest {
    pub method: Method,
    /// Path segments after the route prefix, empties removed.
    pub segments: Vec<String>,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Body,
}

/// An upstream response mirrored back to the caller.
#[derive(Debug, Clone)]
pub struct Relayed {
    pub status: StatusCode,
    /// Upstream reason phrase when it differs from the canonical one.
    pub reason: Option<ReasonPhrase>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Relayed {
    /// Status text as the upstream sent it.
    pub fn status_text(&self) -> &str {
        self.reason
            .as_ref()
            .and_then(|reason| std::str::from_utf8(reason.as_bytes()).ok())
            .or_else(|| self.status.canonical_reason())
            .unwrap_or("")
    }
}

/// Outcome of forwarding one request.
pub type ProxyResult = Result<Relayed, GatewayError>;

//! Upstream forwarding.
//!
//! # Responsibilities
//! - Build the upstream URL from the route's base URL and path segments
//! - Read (bounded) and optionally transform the request body
//! - Issue exactly one upstream call and relay whatever status comes back
//! - Map transport failures to `UPSTREAM_ERROR`
//!
//! # Design Decisions
//! - No retries: a transport failure is terminal for the request
//! - Upstream error statuses (4xx/5xx) are relays, not failures
//! - Error messages are built without the URL, so query secrets never leak

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, Method};
use hyper::ext::ReasonPhrase;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::proxy::types::{InboundRequest, ProxyResult, Relayed, UpstreamConfig};
use crate::security::headers::{filter_backward, filter_forward};

/// Tunables for the upstream client.
#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    pub max_body_size: usize,
    pub connect_timeout: Option<Duration>,
    pub upstream_timeout: Option<Duration>,
}

impl ForwarderConfig {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            max_body_size: config.limits.max_body_size,
            connect_timeout: config.timeouts.connect_secs.map(Duration::from_secs),
            upstream_timeout: config.timeouts.upstream_secs.map(Duration::from_secs),
        }
    }
}

/// Relays requests to upstream services over one shared HTTP client.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    max_body_size: usize,
}

/// Methods whose inbound body is never read.
fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

impl Forwarder {
    pub fn new(config: ForwarderConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = config.upstream_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            max_body_size: config.max_body_size,
        })
    }

    /// Forward one request to `upstream` and relay the outcome.
    pub async fn forward(&self, inbound: InboundRequest, upstream: &UpstreamConfig) -> ProxyResult {
        let InboundRequest {
            method,
            segments,
            query,
            headers: inbound_headers,
            body,
        } = inbound;

        let url = upstream.target_url(&segments, query.as_deref());
        let headers = filter_forward(&inbound_headers);

        let auth = if inbound_headers.contains_key(header::AUTHORIZATION) {
            "present"
        } else {
            "missing"
        };
        tracing::info!(
            route = %upstream.name,
            method = %method,
            target = %upstream.target_url(&segments, None),
            auth,
            "Forwarding request"
        );

        let mut request = self.client.request(method.clone(), &url).headers(headers);

        if carries_body(&method) {
            let bytes = axum::body::to_bytes(body, self.max_body_size)
                .await
                .map_err(|e| GatewayError::Upstream(format!("failed to read request body: {e}")))?;

            let bytes = match &upstream.body_transform {
                Some(transform) if !bytes.is_empty() => {
                    let content_type = inbound_headers
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok());
                    Bytes::from(transform.transform(&bytes, content_type))
                }
                _ => bytes,
            };
            request = request.body(bytes);
        }

        let response = request
            .send()
            .await
            .map_err(|e| upstream_error(&upstream.name, e))?;

        let status = response.status();
        let reason = response.extensions().get::<ReasonPhrase>().cloned();
        let headers = filter_backward(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| upstream_error(&upstream.name, e))?;

        tracing::info!(
            route = %upstream.name,
            status = status.as_u16(),
            bytes = body.len(),
            "Upstream responded"
        );

        Ok(Relayed {
            status,
            reason,
            headers,
            body,
        })
    }
}

fn upstream_error(route: &str, err: reqwest::Error) -> GatewayError {
    let message = describe(&err.without_url());
    tracing::error!(route, error = %message, "Upstream request failed");
    GatewayError::Upstream(message)
}

/// Error text followed by its source chain.
fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

//! Header manipulation across the proxy boundary.
//!
//! # Responsibilities
//! - Derive the outbound header set from the inbound request
//! - Strip hop-by-hop, internal and platform-edge headers
//! - Filter upstream response headers the gateway must not echo
//!
//! # Design Decisions
//! - A fixed allow-list is copied first; the general pass never overrides it
//! - Header names are matched lowercase (`HeaderName` is normalized)
//! - Response bodies are relayed decoded and buffered, so encoding headers drop

use axum::http::header::{HeaderMap, HeaderName, CONTENT_TYPE};

/// Headers always forwarded when present and non-empty.
pub const FORWARD_ALLOW_LIST: &[&str] = &[
    "authorization",
    "content-type",
    "accept",
    "accept-encoding",
    "accept-language",
    "user-agent",
    "x-requested-with",
    "openai-organization",
    "openai-project",
];

/// Name prefixes never forwarded upstream.
pub const BLOCKED_PREFIXES: &[&str] = &["x-internal-", "x-forwarded-", "x-vercel-"];

/// Exact names never forwarded upstream.
pub const BLOCKED_NAMES: &[&str] = &[
    "host",
    "connection",
    "content-length",
    "transfer-encoding",
    "te",
    "trailer",
    "upgrade",
    "keep-alive",
    "proxy-connection",
];

/// Upstream response headers never relayed to the caller.
pub const BLOCKED_RESPONSE_NAMES: &[&str] = &[
    "content-encoding",
    "transfer-encoding",
    "connection",
    "keep-alive",
];

fn is_blocked(name: &HeaderName) -> bool {
    let name = name.as_str();
    BLOCKED_NAMES.contains(&name) || BLOCKED_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Build the header set sent to the upstream.
pub fn filter_forward(inbound: &HeaderMap) -> HeaderMap {
    let mut outbound = HeaderMap::new();

    for name in FORWARD_ALLOW_LIST {
        for value in inbound.get_all(*name) {
            if !value.is_empty() {
                outbound.append(HeaderName::from_static(*name), value.clone());
            }
        }
    }

    for name in inbound.keys() {
        let allow_listed = FORWARD_ALLOW_LIST.contains(&name.as_str());
        if allow_listed || is_blocked(name) || outbound.contains_key(name) {
            continue;
        }
        for value in inbound.get_all(name) {
            outbound.append(name.clone(), value.clone());
        }
    }

    outbound
}

/// Build the header set relayed back to the caller.
pub fn filter_backward(upstream: &HeaderMap) -> HeaderMap {
    let mut relayed = HeaderMap::new();

    if let Some(content_type) = upstream.get(CONTENT_TYPE) {
        relayed.insert(CONTENT_TYPE, content_type.clone());
    }

    for name in upstream.keys() {
        if name == CONTENT_TYPE || BLOCKED_RESPONSE_NAMES.contains(&name.as_str()) {
            continue;
        }
        for value in upstream.get_all(name) {
            relayed.append(name.clone(), value.clone());
        }
    }

    relayed
}

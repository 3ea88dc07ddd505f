//! Shared-token authentication.
//!
//! The gate is built once from [`AuthConfig`] and is a pure predicate over
//! request headers and query string afterwards.

use axum::http::HeaderMap;
use url::form_urlencoded;

use crate::config::AuthConfig;

/// Header carrying the caller's token.
pub const TOKEN_HEADER: &str = "x-internal-token";

/// Query parameter consulted when the header is absent.
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Decides whether a request may proceed to an upstream.
#[derive(Debug, Clone)]
pub struct TokenGate {
    disabled: bool,
    expected: Option<String>,
}

impl TokenGate {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            disabled: config.disabled,
            expected: config
                .expected_token
                .clone()
                .filter(|token| !token.is_empty()),
        }
    }

    /// True when callers must present a token.
    pub fn is_enforcing(&self) -> bool {
        !self.disabled && self.expected.is_some()
    }

    /// Returns true if the request is allowed through.
    pub fn authorize(&self, headers: &HeaderMap, query: Option<&str>) -> bool {
        if self.disabled {
            return true;
        }
        let Some(expected) = self.expected.as_deref() else {
            return true;
        };

        match candidate_token(headers, query) {
            Some(candidate) => candidate == expected,
            None => false,
        }
    }
}

/// Header value first (when non-empty), then the first `token` query value.
fn candidate_token(headers: &HeaderMap, query: Option<&str>) -> Option<String> {
    let from_header = headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned);

    from_header.or_else(|| {
        let query = query?;
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == TOKEN_QUERY_PARAM)
            .map(|(_, value)| value.into_owned())
    })
}

//! Request handling.
//!
//! # Responsibilities
//! - Assign a request ID (UUID v4) when the caller did not send one
//! - Echo the request ID on every response
//! - Turn a matched axum request into an [`InboundRequest`]
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The body is handed over unread; the forwarder decides whether to read it

use axum::body::Body;
use axum::http::{HeaderName, Request};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::proxy::InboundRequest;

/// Correlation header set on every request and response.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates `x-request-id` for requests that arrive without one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

/// Copies the request's `x-request-id` onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

/// Request ID of `request`, or `"unknown"` before the ID layer ran.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Split a request into the parts the forwarder needs.
pub fn inbound_request(request: Request<Body>, segments: Vec<String>) -> InboundRequest {
    let (parts, body) = request.into_parts();
    InboundRequest {
        method: parts.method,
        segments,
        query: parts.uri.query().map(str::to_string),
        headers: parts.headers,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    #[test]
    fn test_request_id_fallback() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(request_id(&req), "unknown");

        let req = Request::builder()
            .header(X_REQUEST_ID, "abc-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_id(&req), "abc-123");
    }

    #[test]
    fn test_inbound_request_keeps_raw_query() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("http://gateway/api/telegram/bot1/send?chat_id=5&text=a%20b")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let inbound = inbound_request(req, vec!["bot1".into(), "send".into()]);
        assert_eq!(inbound.method, Method::POST);
        assert_eq!(inbound.query.as_deref(), Some("chat_id=5&text=a%20b"));
        assert_eq!(inbound.segments, vec!["bot1", "send"]);
        assert_eq!(inbound.headers.get("content-type").unwrap(), "application/json");
    }

    #[test]
    fn test_inbound_request_without_query() {
        let req = Request::builder()
            .uri("/api/openai/v1/models")
            .body(Body::empty())
            .unwrap();
        assert!(inbound_request(req, vec![]).query.is_none());
    }
}

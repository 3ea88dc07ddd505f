//! Response mapping.
//!
//! # Responsibilities
//! - Mirror a relayed upstream response (status, reason phrase, headers, body)
//! - Render the informational root page
//!
//! # Design Decisions
//! - Upstream bodies are fully buffered before they are relayed
//! - Hop-by-hop headers are already stripped by the header filter

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::proxy::Relayed;

impl IntoResponse for Relayed {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        if let Some(reason) = self.reason {
            response.extensions_mut().insert(reason);
        }
        response
    }
}

/// Body of the informational root page.
#[derive(Debug, Serialize)]
pub struct InfoPage {
    pub ok: bool,
    pub message: String,
    pub endpoints: Vec<String>,
}

impl InfoPage {
    pub fn new(message: impl Into<String>, endpoints: Vec<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            endpoints,
        }
    }
}

impl IntoResponse for InfoPage {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

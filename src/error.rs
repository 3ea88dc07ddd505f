//! Error types for the gateway.
//!
//! Request-level failures map to a JSON envelope with a fixed status code.
//! Upstream responses with error statuses are not errors; they are relayed.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::config::loader::ConfigError;
use crate::observability::logging::LoggingError;
use crate::routing::RouteError;

/// Message returned on every authentication failure.
pub const AUTH_ERROR_MESSAGE: &str = "Missing or invalid X-Internal-Token header";

/// Terminal failure of a single proxied request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Caller-supplied token missing or mismatched.
    #[error("Missing or invalid X-Internal-Token header")]
    Unauthorized,

    /// The upstream could not be reached or its exchange failed in transport.
    #[error("{0}")]
    Upstream(String),

    /// No configured route matches the inbound path.
    #[error("No route configured for path {path}")]
    NotFound { path: String },
}

impl GatewayError {
    /// Wire code used in the `error` field of the envelope.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Unauthorized => "AUTHENTICATION_ERROR",
            GatewayError::Upstream(_) => "UPSTREAM_ERROR",
            GatewayError::NotFound { .. } => "NOT_FOUND",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }
}

/// JSON body of every rejection.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope<'a> {
    pub ok: bool,
    pub error: &'a str,
    pub message: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let envelope = ErrorEnvelope {
            ok: false,
            error: self.code(),
            message: self.to_string(),
        };
        (self.status(), Json(envelope)).into_response()
    }
}

/// Fatal errors raised while bringing the gateway up.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to compile {0}")]
    Routes(#[from] RouteError),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to initialize logging: {0}")]
    Logging(#[from] LoggingError),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("invalid metrics address {0}")]
    MetricsAddress(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

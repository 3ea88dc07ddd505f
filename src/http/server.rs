//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the generic forwarding handler
//! - Wire up middleware (request ID, tracing, overall timeout)
//! - Dispatch requests to the route table
//! - Apply the token gate and forward to the matched upstream
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{on, MethodFilter},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, StartupError};
use crate::http::request::{
    inbound_request, propagate_request_id_layer, request_id, set_request_id_layer,
};
use crate::http::response::InfoPage;
use crate::observability::metrics;
use crate::proxy::{Forwarder, ForwarderConfig};
use crate::routing::Router as RouteTable;
use crate::security::TokenGate;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub gate: Arc<TokenGate>,
    pub forwarder: Forwarder,
}

/// HTTP server for the forwarding gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Compile routes, the token gate and the upstream client.
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let routes = Arc::new(RouteTable::from_config(&config.routes)?);
        let gate = Arc::new(TokenGate::new(&config.auth));
        let forwarder = Forwarder::new(ForwarderConfig::from_config(&config))?;

        if !gate.is_enforcing() {
            tracing::warn!("Token gate is open: requests are forwarded without authentication");
        }

        let state = AppState {
            routes,
            gate,
            forwarder,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let methods = MethodFilter::GET
            .or(MethodFilter::POST)
            .or(MethodFilter::PUT)
            .or(MethodFilter::PATCH)
            .or(MethodFilter::DELETE)
            .or(MethodFilter::HEAD)
            .or(MethodFilter::OPTIONS);

        let mut router = Router::new()
            .route("/{*path}", on(methods, proxy_handler))
            .route("/", on(methods, proxy_handler))
            .with_state(state);

        if let Some(secs) = config.timeouts.request_secs {
            router = router.layer(TimeoutLayer::with_status_code(
                StatusCode::GATEWAY_TIMEOUT,
                Duration::from_secs(secs),
            ));
        }

        router
            .layer(propagate_request_id_layer())
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            path = %request.uri().path(),
                            request_id = %request_id(request),
                        )
                    })
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(set_request_id_layer())
    }

    /// The configured application, for serving or in-process testing.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.config.routes.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main forwarding handler.
/// Looks up the route, checks the token, and forwards the request.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    // 1. Match Route
    let Some(route) = state.routes.match_path(&path) else {
        tracing::warn!(path = %path, "No route matched");
        metrics::record_request(method.as_str(), 404, "none", start_time);
        return GatewayError::NotFound { path }.into_response();
    };
    let upstream = route.upstream;

    // 2. Info page (no token, no upstream call)
    if method == Method::GET && route.segments.is_empty() {
        if let Some(message) = upstream.info_message.as_deref() {
            metrics::record_request(method.as_str(), 200, &upstream.name, start_time);
            return InfoPage::new(message, state.routes.endpoints()).into_response();
        }
    }

    // 3. Token gate
    if !state.gate.authorize(request.headers(), request.uri().query()) {
        tracing::warn!(route = %upstream.name, "Rejected request with missing or invalid token");
        metrics::record_request(method.as_str(), 401, &upstream.name, start_time);
        return GatewayError::Unauthorized.into_response();
    }

    // 4. Forward
    let inbound = inbound_request(request, route.segments);
    let response = match state.forwarder.forward(inbound, &upstream).await {
        Ok(relayed) => relayed.into_response(),
        Err(err) => {
            metrics::record_upstream_error(&upstream.name);
            err.into_response()
        }
    };

    metrics::record_request(
        method.as_str(),
        response.status().as_u16(),
        &upstream.name,
        start_time,
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    use crate::config::RouteConfig;

    fn config_with_token(token: Option<&str>) -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.auth.expected_token = token.map(str::to_string);
        config
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unmatched_path_is_not_found() {
        let mut config = config_with_token(None);
        config.routes = vec![RouteConfig {
            name: "only".into(),
            path_prefix: "/only".into(),
            base_url: "http://127.0.0.1:9".into(),
            priority: 0,
            info_message: None,
            sanitize: None,
        }];
        let app = GatewayServer::new(config).unwrap().app();

        let response = app
            .oneshot(Request::builder().uri("/elsewhere").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key("x-request-id"));
        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_info_page_needs_no_token() {
        let app = GatewayServer::new(config_with_token(Some("secret")))
            .unwrap()
            .app();

        let response = app
            .oneshot(Request::builder().uri("/api").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["message"], "Telegram Proxy API");
        assert_eq!(body["endpoints"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_token_rejected_before_forwarding() {
        let app = GatewayServer::new(config_with_token(Some("secret")))
            .unwrap()
            .app();

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/telegram/bot1/sendMessage")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "AUTHENTICATION_ERROR");
        assert_eq!(body["message"], "Missing or invalid X-Internal-Token header");
    }

    #[tokio::test]
    async fn test_unsupported_method_rejected() {
        let app = GatewayServer::new(config_with_token(None)).unwrap().app();

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::TRACE)
                    .uri("/api/telegram/x")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_incoming_request_id_is_echoed() {
        let app = GatewayServer::new(config_with_token(None)).unwrap().app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");
    }
}

//! Forward gateway
//!
//! A small HTTP gateway built with Tokio and Axum that forwards path-prefixed
//! requests to fixed upstream APIs.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ routing ──▶ security::auth
//!                                                       │
//!                                                       ▼
//!                                      security::headers + transform
//!                                                       │
//!                                                       ▼
//!     Client Response                            proxy::forwarder ──▶ Upstream API
//!     ◀────────────── http::response ◀───────────────────┘
//!
//!     Cross-cutting: config, observability, lifecycle
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{builder::BoolishValueParser, Parser};
use tokio::net::TcpListener;

use forward_gateway::config::{resolve_config, LogFormat, Overrides};
use forward_gateway::lifecycle::{shutdown_signal, Shutdown};
use forward_gateway::observability::{logging, metrics};
use forward_gateway::{GatewayServer, StartupError};

#[derive(Parser, Debug)]
#[command(name = "forward-gateway", version, about = "HTTP forwarding gateway")]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when absent.
    #[arg(long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:8080.
    #[arg(long, env = "GATEWAY_BIND")]
    bind: Option<String>,

    /// Shared token callers must present.
    #[arg(long, env = "INTERNAL_PROXY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Forward every request without checking the token.
    #[arg(
        long,
        env = "DISABLE_AUTH",
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    disable_auth: Option<bool>,

    /// Log output format.
    #[arg(long, env = "GATEWAY_LOG_FORMAT", value_enum)]
    log_format: Option<LogFormat>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            bind_address: self.bind.clone(),
            expected_token: self.token.clone(),
            auth_disabled: self.disable_auth,
            log_format: self.log_format,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref(), cli.overrides())?;
    logging::init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        max_body_size = config.limits.max_body_size,
        request_timeout_secs = ?config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| {
                StartupError::MetricsAddress(config.observability.metrics_address.clone())
            })?;
        metrics::init_metrics(addr)?;
    }

    let server = GatewayServer::new(config)?;
    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

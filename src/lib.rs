//! HTTP forwarding gateway library.
//!
//! Forwards path-prefixed requests to fixed upstream APIs behind a shared
//! token, filtering headers in both directions and optionally stripping a
//! boilerplate signature from request bodies.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod security;
pub mod transform;

pub use config::GatewayConfig;
pub use error::{GatewayError, StartupError};
pub use http::GatewayServer;
pub use lifecycle::Shutdown;

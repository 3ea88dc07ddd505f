//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, split into InboundRequest)
//!     → [routing decides the upstream]
//!     → [token gate, forwarder]
//!     → response.rs (relay upstream response or info page)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::InfoPage;
pub use server::{AppState, GatewayServer};

//! Forward pipeline.
//!
//! # Data Flow
//! ```text
//! InboundRequest (method, segments, query, headers, body)
//!     → types.rs (UpstreamConfig builds the target URL)
//!     → security::headers (outbound header set)
//!     → transform (optional body rewrite)
//!     → forwarder.rs (one upstream call)
//!     → Relayed | GatewayError
//! ```

pub mod forwarder;
pub mod types;

pub use forwarder::{Forwarder, ForwarderConfig};
pub use types::{InboundRequest, ProxyResult, Relayed, UpstreamConfig};

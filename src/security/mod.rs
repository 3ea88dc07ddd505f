//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → auth.rs (shared-token check)
//!     → headers.rs (strip internal/hop-by-hop headers)
//!     → Pass to forwarder
//!
//! Upstream response:
//!     → headers.rs (drop encoding headers)
//! ```
//!
//! # Design Decisions
//! - Fail closed once a token is provisioned: missing or wrong token is a 401
//! - Internal credentials never cross the proxy boundary

pub mod auth;
pub mod headers;

pub use auth::TokenGate;

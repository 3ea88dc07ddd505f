//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (ordered route lookup)
//!     → matcher.rs (segment-aligned prefix match)
//!     → Return: RouteMatch { upstream, segments } or no match
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Build UpstreamConfig (base URL, optional body transform)
//!     → Sort by priority, then prefix length
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins

pub mod matcher;
pub mod router;

pub use router::{RouteError, RouteMatch, Router};

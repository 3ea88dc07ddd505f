//! Request body transformation subsystem.
//!
//! # Data Flow
//! ```text
//! raw body + content-type
//!     → classify.rs (Multipart | JsonObject | FormEncoded | PlainText | Opaque)
//!     → multipart.rs / sanitizer.rs (format-preserving rewrite)
//!     → signature.rs (phrase removal on each designated text value)
//!     → transformed body
//! ```
//!
//! # Design Decisions
//! - A failed parse is a classifier branch, never an error
//! - Bodies are bytes; text strategies only apply to valid UTF-8
//! - Transforms are compiled at startup and shared read-only

pub mod classify;
pub mod multipart;
pub mod sanitizer;
pub mod signature;

use thiserror::Error;

pub use classify::{classify, BodyKind, FieldNames};
pub use sanitizer::BodySanitizer;
pub use signature::SignatureStripper;

/// Rewrites a request body before it is forwarded upstream.
pub trait BodyTransform: Send + Sync + std::fmt::Debug {
    /// Returns the body to send. Never fails: anything the transform does not
    /// understand is returned as-is.
    fn transform(&self, body: &[u8], content_type: Option<&str>) -> Vec<u8>;
}

/// Errors building a transform from configuration.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("signature phrase is empty")]
    EmptyPhrase,

    #[error("invalid signature pattern: {0}")]
    Pattern(#[from] regex::Error),
}

//! Path prefix matching.
//!
//! # Responsibilities
//! - Decide whether a request path belongs to a route prefix
//! - Split the remainder into path segments
//!
//! # Design Decisions
//! - Matching is case-sensitive and segment-aligned: `/api` matches `/api`
//!   and `/api/x` but not `/apix`
//! - Empty segments are dropped, so `/api//x/` yields `["x"]`
//! - Segments stay percent-encoded as received
//! - No regex in the hot path

/// Matches a path against one route prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        // "/" is stored as "" so every path continues it with '/'.
        let prefix = prefix.trim_end_matches('/').to_string();
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        if self.prefix.is_empty() {
            "/"
        } else {
            &self.prefix
        }
    }

    /// Remaining segments when `path` is under this prefix.
    pub fn match_path(&self, path: &str) -> Option<Vec<String>> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if !rest.is_empty() && !rest.starts_with('/') {
            return None;
        }

        Some(
            rest.split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Length used to prefer more specific prefixes.
    pub fn specificity(&self) -> usize {
        self.prefix.len()
    }
}

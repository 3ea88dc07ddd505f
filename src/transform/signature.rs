//! Boilerplate signature removal.
//!
//! The phrase is compiled into one whitespace-agnostic, case-insensitive
//! pattern: words may be separated by any run of whitespace (CR and LF
//! included) and whitespace around the phrase is consumed with it.

use std::borrow::Cow;

use regex::Regex;

use crate::transform::TransformError;

/// Removes every occurrence of a fixed phrase from text.
#[derive(Debug, Clone)]
pub struct SignatureStripper {
    pattern: Regex,
}

impl SignatureStripper {
    pub fn new(phrase: &str) -> Result<Self, TransformError> {
        let words: Vec<String> = phrase.split_whitespace().map(regex::escape).collect();
        if words.is_empty() {
            return Err(TransformError::EmptyPhrase);
        }
        let pattern = Regex::new(&format!(r"(?i)\s*{}\s*", words.join(r"\s+")))?;
        Ok(Self { pattern })
    }

    /// True if the phrase occurs anywhere in `text`.
    pub fn contains(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Replace each occurrence (with adjacent whitespace) by a single line
    /// break, then trim the result.
    ///
    /// Replacement repeats until nothing matches, so removing one occurrence
    /// can never leave a freshly joined phrase behind and the operation is
    /// idempotent.
    pub fn strip(&self, text: &str) -> String {
        let mut current = text.to_owned();
        loop {
            let next = match self.pattern.replace_all(&current, "\n") {
                Cow::Borrowed(_) => break,
                Cow::Owned(next) => next,
            };
            current = next;
        }
        current.trim().to_owned()
    }
}

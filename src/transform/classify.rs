//! Content classification for request bodies.
//!
//! Classification is tried in a fixed priority order and the first
//! structural match wins:
//!
//! ```text
//! multipart/form-data with a boundary present in the body → Multipart
//! UTF-8 body parsing as a JSON object                     → JsonObject
//! UTF-8 key=value pairs carrying a designated field       → FormEncoded
//! any other UTF-8 body                                    → PlainText
//! anything else                                           → Opaque
//! ```

use serde_json::{Map, Value};
use url::form_urlencoded;

/// Case-insensitive set of field names whose values get cleaned.
#[derive(Debug, Clone)]
pub struct FieldNames {
    names: Vec<String>,
}

impl FieldNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().trim().to_ascii_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.names.iter().any(|n| n.eq_ignore_ascii_case(key))
    }
}

/// Structural shape of a request body.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyKind<'a> {
    Multipart { boundary: String },
    JsonObject(Map<String, Value>),
    FormEncoded(Vec<(String, String)>),
    PlainText(&'a str),
    Opaque,
}

/// Classify `body` given its declared content type.
pub fn classify<'a>(
    body: &'a [u8],
    content_type: Option<&str>,
    fields: &FieldNames,
) -> BodyKind<'a> {
    if let Some(boundary) = content_type.and_then(multipart_boundary) {
        let dash_boundary = format!("--{boundary}");
        if contains_bytes(body, dash_boundary.as_bytes()) {
            return BodyKind::Multipart { boundary };
        }
    }

    let Ok(text) = std::str::from_utf8(body) else {
        return BodyKind::Opaque;
    };

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        return BodyKind::JsonObject(map);
    }

    if let Some(pairs) = parse_form(text) {
        if pairs.iter().any(|(key, _)| fields.contains(key)) {
            return BodyKind::FormEncoded(pairs);
        }
    }

    BodyKind::PlainText(text)
}

/// Extract the boundary of a `multipart/form-data` content type.
pub fn multipart_boundary(content_type: &str) -> Option<String> {
    let mut params = content_type.split(';');
    let media_type = params.next()?.trim();
    if !media_type.eq_ignore_ascii_case("multipart/form-data") {
        return None;
    }

    params
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|boundary| !boundary.is_empty())
}

/// Decode `key=value` pairs.
///
/// Surrounding ASCII whitespace is ignored. Returns `None` when the rest
/// cannot be a form encoding: raw whitespace or control characters never
/// appear inside one, every pair carries a `=`, and percent escapes must
/// decode to valid UTF-8.
fn parse_form(text: &str) -> Option<Vec<(String, String)>> {
    let text = text.trim_matches(|c: char| c.is_ascii_whitespace());
    if text.is_empty() || text.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return None;
    }
    if !text.split('&').filter(|pair| !pair.is_empty()).all(|pair| pair.contains('=')) {
        return None;
    }

    let pairs: Vec<(String, String)> = form_urlencoded::parse(text.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let lossy = pairs
        .iter()
        .any(|(k, v)| k.contains('\u{FFFD}') || v.contains('\u{FFFD}'));
    if lossy && !text.contains('\u{FFFD}') {
        return None;
    }

    Some(pairs)
}

pub(crate) fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    find_bytes(haystack, needle, 0).is_some()
}

/// Position of the first `needle` in `haystack` at or after `from`.
pub(crate) fn find_bytes(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

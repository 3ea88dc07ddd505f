//! Content-type-aware signature removal for request bodies.

use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::config::SanitizerConfig;
use crate::transform::classify::{classify, BodyKind, FieldNames};
use crate::transform::multipart::sanitize_multipart;
use crate::transform::signature::SignatureStripper;
use crate::transform::{BodyTransform, TransformError};

/// Removes the configured signature from designated text fields, whatever
/// serialization the caller used.
#[derive(Debug, Clone)]
pub struct BodySanitizer {
    stripper: SignatureStripper,
    fields: FieldNames,
}

impl BodySanitizer {
    pub fn new(config: &SanitizerConfig) -> Result<Self, TransformError> {
        Ok(Self {
            stripper: SignatureStripper::new(&config.phrase)?,
            fields: FieldNames::new(&config.fields),
        })
    }

    pub fn sanitize(&self, body: &[u8], content_type: Option<&str>) -> Vec<u8> {
        if body.is_empty() {
            return Vec::new();
        }

        match classify(body, content_type, &self.fields) {
            BodyKind::Multipart { boundary } => {
                tracing::trace!(%boundary, "sanitizing multipart body");
                sanitize_multipart(body, &boundary, &self.fields, &self.stripper)
            }
            BodyKind::JsonObject(map) => self.sanitize_json(body, map),
            BodyKind::FormEncoded(pairs) => self.sanitize_form(pairs).into_bytes(),
            BodyKind::PlainText(text) => self.stripper.strip(text).into_bytes(),
            BodyKind::Opaque => body.to_vec(),
        }
    }

    /// Cleans designated string fields. An object without one is returned
    /// byte-identical rather than re-serialized.
    fn sanitize_json(&self, original: &[u8], mut map: Map<String, Value>) -> Vec<u8> {
        let mut touched = false;
        for (key, value) in map.iter_mut() {
            if !self.fields.contains(key) {
                continue;
            }
            if let Value::String(text) = value {
                *text = self.stripper.strip(text);
                touched = true;
            }
        }

        if !touched {
            return original.to_vec();
        }
        serde_json::to_vec(&Value::Object(map)).unwrap_or_else(|_| original.to_vec())
    }

    fn sanitize_form(&self, pairs: Vec<(String, String)>) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &pairs {
            if self.fields.contains(key) {
                serializer.append_pair(key, &self.stripper.strip(value));
            } else {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

impl BodyTransform for BodySanitizer {
    fn transform(&self, body: &[u8], content_type: Option<&str>) -> Vec<u8> {
        self.sanitize(body, content_type)
    }
}

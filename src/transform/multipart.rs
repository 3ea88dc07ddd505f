//! Multipart/form-data rewriting.
//!
//! Works on raw bytes so binary parts (photos, documents) pass through
//! untouched. Only the content of designated text parts is rewritten; every
//! delimiter is re-emitted exactly as it appeared in the input.

use std::sync::LazyLock;

use regex::Regex;

use crate::transform::classify::{find_bytes, FieldNames};
use crate::transform::signature::SignatureStripper;

// SAFETY: .expect() on LazyLock with compile-time literal patterns, covered by
// the tests in this module.
static PART_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|[;\s])name\s*=\s*(?:"([^"]*)"|([^;\s]+))"#)
        .expect("BUG: PART_NAME regex is invalid")
});

static TRAILING_ARTIFACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\r?\n--\s*$").expect("BUG: TRAILING_ARTIFACT regex is invalid")
});

/// One `--boundary` occurrence at the start of a line.
#[derive(Debug, Clone, Copy)]
struct Delimiter {
    /// Start of the preceding line break (or of the marker itself).
    start: usize,
    /// Start of the `--boundary` marker.
    marker: usize,
    /// First byte after the marker.
    end: usize,
}

/// A marker only delimits when followed by `--`, a line break, linear
/// whitespace or the end of the body, so `--Xtra` is content for boundary `X`.
fn ends_marker(rest: &[u8]) -> bool {
    match rest.first() {
        None | Some(b'\r' | b'\n' | b' ' | b'\t') => true,
        Some(b'-') => rest.get(1) == Some(&b'-'),
        Some(_) => false,
    }
}

fn find_delimiters(body: &[u8], dash_boundary: &[u8]) -> Vec<Delimiter> {
    let mut delimiters = Vec::new();
    let mut from = 0;

    while let Some(pos) = find_bytes(body, dash_boundary, from) {
        from = pos + dash_boundary.len();
        if (pos > 0 && body[pos - 1] != b'\n') || !ends_marker(&body[from..]) {
            continue;
        }
        let start = if pos >= 2 && &body[pos - 2..pos] == b"\r\n" {
            pos - 2
        } else {
            pos.saturating_sub(1)
        };
        delimiters.push(Delimiter {
            start,
            marker: pos,
            end: from,
        });
    }

    delimiters
}

/// Strip the signature from designated parts of a multipart body.
///
/// The preamble before the first delimiter is dropped. Everything from the
/// terminal `--boundary--` marker on is copied verbatim.
pub fn sanitize_multipart(
    body: &[u8],
    boundary: &str,
    fields: &FieldNames,
    stripper: &SignatureStripper,
) -> Vec<u8> {
    let dash_boundary = format!("--{boundary}");
    let delimiters = find_delimiters(body, dash_boundary.as_bytes());
    if delimiters.is_empty() {
        return body.to_vec();
    }

    let mut out = Vec::with_capacity(body.len());
    for (index, delimiter) in delimiters.iter().enumerate() {
        let emitted_from = if index == 0 {
            delimiter.marker
        } else {
            delimiter.start
        };
        out.extend_from_slice(&body[emitted_from..delimiter.end]);

        if body[delimiter.end..].starts_with(b"--") {
            out.extend_from_slice(&body[delimiter.end..]);
            return out;
        }

        let segment_end = delimiters
            .get(index + 1)
            .map_or(body.len(), |next| next.start);
        rewrite_part(&body[delimiter.end..segment_end], fields, stripper, &mut out);
    }

    out
}

/// Header block end and separator length (`CRLF CRLF`, else `LF LF`).
fn header_separator(part: &[u8]) -> Option<(usize, usize)> {
    find_bytes(part, b"\r\n\r\n", 0)
        .map(|pos| (pos, 4))
        .or_else(|| find_bytes(part, b"\n\n", 0).map(|pos| (pos, 2)))
}

fn part_name(headers: &[u8]) -> Option<String> {
    let headers = String::from_utf8_lossy(headers);
    let captures = PART_NAME.captures(&headers)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|m| m.as_str().to_string())
}

fn rewrite_part(part: &[u8], fields: &FieldNames, stripper: &SignatureStripper, out: &mut Vec<u8>) {
    let Some((header_end, separator_len)) = header_separator(part) else {
        out.extend_from_slice(part);
        return;
    };
    let content_start = header_end + separator_len;
    let content = &part[content_start..];

    let designated = part_name(&part[..header_end]).is_some_and(|name| fields.contains(&name));
    let text = match std::str::from_utf8(content) {
        Ok(text) if designated && !text.is_empty() => text,
        _ => {
            out.extend_from_slice(part);
            return;
        }
    };

    out.extend_from_slice(&part[..content_start]);
    out.extend_from_slice(clean_field(text, stripper).as_bytes());
}

/// Clean one field value, keeping the line terminator it ended with.
fn clean_field(text: &str, stripper: &SignatureStripper) -> String {
    let text = TRAILING_ARTIFACT.replace(text, "");
    let terminator = if text.ends_with("\r\n") {
        "\r\n"
    } else if text.ends_with('\n') {
        "\n"
    } else {
        ""
    };
    let mut cleaned = stripper.strip(&text);
    cleaned.push_str(terminator);
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> FieldNames {
        FieldNames::new(["text", "caption"])
    }

    fn stripper() -> SignatureStripper {
        SignatureStripper::new("This message was sent automatically with n8n").unwrap()
    }

    fn part(name: &str, content: &str) -> String {
        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{content}")
    }

    fn body(parts: &[String]) -> String {
        let mut body = String::new();
        for p in parts {
            body.push_str("--X\r\n");
            body.push_str(p);
            body.push_str("\r\n");
        }
        body.push_str("--X--\r\n");
        body
    }

    fn split_parts(body: &[u8]) -> Vec<Vec<u8>> {
        let text = String::from_utf8_lossy(body);
        text.split("\r\n--X")
            .map(|p| p.as_bytes().to_vec())
            .collect()
    }

    #[test]
    fn test_caption_stripped_chat_id_untouched() {
        let input = body(&[
            part("chat_id", "42"),
            part(
                "caption",
                "Look at this\n\nThis message was sent automatically with n8n\nsee you",
            ),
        ]);

        let output = sanitize_multipart(input.as_bytes(), "X", &fields(), &stripper());
        let expected = body(&[part("chat_id", "42"), part("caption", "Look at this\nsee you")]);
        assert_eq!(String::from_utf8(output.clone()).unwrap(), expected);
        assert_eq!(split_parts(&output).len(), split_parts(input.as_bytes()).len());
    }

    #[test]
    fn test_binary_part_preserved() {
        let mut input = Vec::new();
        input.extend_from_slice(b"--X\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"a.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n");
        input.extend_from_slice(&[0xff, 0xd8, 0x00, 0x0d, 0x0a, 0xff]);
        input.extend_from_slice(b"\r\n--X\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\nhi This message was sent automatically with n8n\r\n--X--\r\n");

        let output = sanitize_multipart(&input, "X", &fields(), &stripper());

        let mut expected = Vec::new();
        expected.extend_from_slice(b"--X\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"a.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n");
        expected.extend_from_slice(&[0xff, 0xd8, 0x00, 0x0d, 0x0a, 0xff]);
        expected.extend_from_slice(b"\r\n--X\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\nhi\r\n--X--\r\n");
        assert_eq!(output, expected);
    }

    #[test]
    fn test_filename_is_not_a_name() {
        assert_eq!(
            part_name(b"\r\nContent-Disposition: form-data; filename=\"text\"; name=\"doc\""),
            Some("doc".into())
        );
        assert_eq!(
            part_name(b"\r\ncontent-disposition: form-data; NAME=caption"),
            Some("caption".into())
        );
        assert_eq!(part_name(b"\r\nContent-Type: text/plain"), None);
    }

    #[test]
    fn test_preamble_dropped_and_epilogue_kept() {
        let input = "preamble\r\n--X\r\nContent-Disposition: form-data; name=\"text\"\r\n\r\nok\r\n--X--\r\nepilogue";
        let output = sanitize_multipart(input.as_bytes(), "X", &fields(), &stripper());
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "--X\r\nContent-Disposition: form-data; name=\"text\"\r\n\r\nok\r\n--X--\r\nepilogue"
        );
    }

    #[test]
    fn test_part_without_separator_passes_through() {
        let input = "--X\r\ngarbage-without-headers\r\n--X--\r\n";
        let output = sanitize_multipart(input.as_bytes(), "X", &fields(), &stripper());
        assert_eq!(output, input.as_bytes());
    }

    #[test]
    fn test_lf_only_body() {
        let input = "--X\nContent-Disposition: form-data; name=\"text\"\n\nhey\nThis message was sent automatically with n8n\n--X--\n";
        let output = sanitize_multipart(input.as_bytes(), "X", &fields(), &stripper());
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "--X\nContent-Disposition: form-data; name=\"text\"\n\nhey\n--X--\n"
        );
    }

    #[test]
    fn test_trailing_artifact_stripped_without_terminal_marker() {
        let input = "--X\r\nContent-Disposition: form-data; name=\"text\"\r\n\r\nhello This message was sent automatically with n8n\r\n--";
        let output = sanitize_multipart(input.as_bytes(), "X", &fields(), &stripper());
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "--X\r\nContent-Disposition: form-data; name=\"text\"\r\n\r\nhello"
        );
    }

    #[test]
    fn test_boundary_not_at_line_start_is_ignored() {
        let input = "text=--X";
        let output = sanitize_multipart(input.as_bytes(), "X", &fields(), &stripper());
        assert_eq!(output, input.as_bytes());
    }

    #[test]
    fn test_longer_boundary_like_line_is_content() {
        let input = body(&[part(
            "caption",
            "first\r\n--Xtra line This message was sent automatically with n8n",
        )]);
        let output = sanitize_multipart(input.as_bytes(), "X", &fields(), &stripper());
        assert_eq!(
            String::from_utf8(output).unwrap(),
            body(&[part("caption", "first\r\n--Xtra line")])
        );
    }

    #[test]
    fn test_marker_followed_by_whitespace_or_end() {
        assert!(ends_marker(b""));
        assert!(ends_marker(b"\r\n"));
        assert!(ends_marker(b"  \r\n"));
        assert!(ends_marker(b"--\r\n"));
        assert!(!ends_marker(b"tra"));
        assert!(!ends_marker(b"-x"));
    }

    #[test]
    fn test_idempotent() {
        let input = body(&[
            part("text", "a\r\nThis message was sent automatically with n8n\r\n"),
            part("other", "This message was sent automatically with n8n"),
        ]);
        let once = sanitize_multipart(input.as_bytes(), "X", &fields(), &stripper());
        let twice = sanitize_multipart(&once, "X", &fields(), &stripper());
        assert_eq!(once, twice);
        assert!(String::from_utf8_lossy(&once).contains("name=\"other\"\r\n\r\nThis message"));
    }
}

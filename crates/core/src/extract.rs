//! Recover the JSON payload from free-text oracle output
//!
//! The oracle is not trusted to return bare JSON. Recovery runs in three
//! stages: strip reasoning blocks, locate the outermost object or array, then
//! parse it.

use serde_json::Value as JsonValue;

use crate::error::FilterError;

const REASONING_OPEN: &str = "<think>";
const REASONING_CLOSE: &str = "</think>";

/// Remove `<think>...</think>` blocks, whatever they contain.
///
/// A closing marker with no opener and no `{` or `[` before it discards
/// everything up to and including the marker; past a delimiter the marker may
/// sit inside the payload and is kept. An opener that is never closed is left
/// in place.
pub fn strip_reasoning(text: &str) -> String {
    let mut rest = text;

    if let Some(close) = rest.find(REASONING_CLOSE) {
        let prefix = &rest[..close];
        if !prefix.contains(REASONING_OPEN) && !prefix.contains(['{', '[']) {
            rest = &rest[close + REASONING_CLOSE.len()..];
        }
    }

    let mut kept = String::with_capacity(rest.len());
    while let Some(start) = rest.find(REASONING_OPEN) {
        let body = &rest[start + REASONING_OPEN.len()..];
        let Some(len) = body.find(REASONING_CLOSE) else {
            break;
        };
        kept.push_str(&rest[..start]);
        rest = &body[len + REASONING_CLOSE.len()..];
    }
    kept.push_str(rest);

    kept.trim().to_string()
}

/// Find the payload candidate in already-stripped text.
///
/// Scans for the first `{` or `[` that has a closing delimiter of the same
/// kind somewhere after it and returns the span up to the last such closer.
pub fn locate_payload(text: &str) -> Option<&str> {
    let last_brace = text.rfind('}');
    let last_bracket = text.rfind(']');

    text.char_indices().find_map(|(start, c)| {
        let end = match c {
            '{' => last_brace,
            '[' => last_bracket,
            _ => return None,
        }?;
        (end > start).then(|| &text[start..=end])
    })
}

/// Parse a located candidate
pub fn parse_payload(candidate: &str) -> Result<JsonValue, FilterError> {
    serde_json::from_str(candidate).map_err(|e| FilterError::MalformedJson {
        reason: e.to_string(),
    })
}

/// Full strip -> locate -> parse pipeline over raw completion text
pub fn recover_payload(completion: &str) -> Result<JsonValue, FilterError> {
    let stripped = strip_reasoning(completion);
    let candidate = locate_payload(&stripped).ok_or(FilterError::NoJsonFound)?;
    parse_payload(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_reasoning_with_braces_inside() {
        let text = "<think>some reasoning {not json}</think>\n{\"param\":\"brandname\",\"searchQuery\":\"botox\"}";
        assert_eq!(
            strip_reasoning(text),
            "{\"param\":\"brandname\",\"searchQuery\":\"botox\"}"
        );
    }

    #[test]
    fn test_strip_multiple_blocks() {
        let text = "<think>a [1]</think>{\"x\":1}<think>b }</think>";
        assert_eq!(strip_reasoning(text), "{\"x\":1}");
    }

    #[test]
    fn test_strip_dangling_close() {
        let text = "the user wants ibuprofen</think>\n[{\"searchQuery\":\"ibuprofen\"}]";
        assert_eq!(strip_reasoning(text), "[{\"searchQuery\":\"ibuprofen\"}]");
    }

    #[test]
    fn test_close_marker_inside_payload_is_kept() {
        let text = r#"{"searchQuery":"a</think>b"}"#;
        assert_eq!(strip_reasoning(text), text);
        assert_eq!(recover_payload(text), Ok(json!({"searchQuery": "a</think>b"})));
    }

    #[test]
    fn test_strip_unclosed_open_is_left_alone() {
        let text = "<think>still thinking {";
        assert_eq!(strip_reasoning(text), text);
    }

    #[test]
    fn test_strip_without_markers() {
        assert_eq!(strip_reasoning("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn test_locate_object_in_prose() {
        let text = "Here you go:\n```json\n{\"param\": \"PIL\"}\n```";
        assert_eq!(locate_payload(text), Some("{\"param\": \"PIL\"}"));
    }

    #[test]
    fn test_locate_array_spans_to_last_bracket() {
        let text = "[{\"a\":1},{\"b\":[2]}] trailing";
        assert_eq!(locate_payload(text), Some("[{\"a\":1},{\"b\":[2]}]"));
    }

    #[test]
    fn test_locate_skips_opener_without_closer() {
        let text = "options [ see below: {\"a\": 1}";
        assert_eq!(locate_payload(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_locate_nothing() {
        assert_eq!(locate_payload("I could not understand the query."), None);
        assert_eq!(locate_payload("} backwards {"), None);
    }

    #[test]
    fn test_recover_reasoning_example() {
        let text = "<think>some reasoning {not json}</think>\n{\"param\":\"brandname\",\"searchQuery\":\"botox\"}";
        assert_eq!(
            recover_payload(text),
            Ok(json!({"param": "brandname", "searchQuery": "botox"}))
        );
    }

    #[test]
    fn test_recover_no_json() {
        assert_eq!(
            recover_payload("Sorry, no filters here."),
            Err(FilterError::NoJsonFound)
        );
        assert_eq!(
            recover_payload("<think>{\"param\":\"PIL\"}</think>"),
            Err(FilterError::NoJsonFound)
        );
    }

    #[test]
    fn test_recover_malformed() {
        let err = recover_payload("{\"param\": \"PIL\",}").unwrap_err();
        assert_eq!(err.kind(), "malformed_json");
    }

    #[test]
    fn test_two_objects_without_array_are_malformed() {
        let err = recover_payload("{\"a\":1}\n{\"b\":2}").unwrap_err();
        assert!(matches!(err, FilterError::MalformedJson { .. }));
    }
}

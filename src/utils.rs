use encoding_rs::WINDOWS_1252;

use crate::types::DocumentValue;

const DISPLAY_LIMIT: usize = 20;
const DISPLAY_KEEP: usize = 17;

/// Decode file contents, falling back to Windows-1252 when they are not
/// UTF-8. A leading byte-order mark is dropped.
pub fn decode_text(bytes: Vec<u8>) -> String {
    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(err) => {
            let (res, _, _) = WINDOWS_1252.decode(err.as_bytes());
            res.into_owned()
        }
    };

    match content.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    }
}

/// Short, single-line rendering of a value for tables and trees.
pub fn display_value(value: &DocumentValue) -> String {
    match value {
        DocumentValue::String(s) => format!("\"{}\"", truncate(s)),
        DocumentValue::Array(_) | DocumentValue::Object(_) => truncate(&value.to_string()),
        other => other.to_string(),
    }
}

pub fn truncate(s: &str) -> String {
    if s.chars().count() > DISPLAY_LIMIT {
        let kept: String = s.chars().take(DISPLAY_KEEP).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_falls_back_to_windows_1252() {
        assert_eq!(decode_text(vec![b'c', b'a', b'f', 0xE9]), "café");
    }

    #[test]
    fn decode_strips_bom() {
        assert_eq!(decode_text("\u{feff}{}".as_bytes().to_vec()), "{}");
    }

    #[test]
    fn long_strings_are_truncated_and_quoted() {
        assert_eq!(display_value(&json!("short")), "\"short\"");
        assert_eq!(
            display_value(&json!("abcdefghijklmnopqrstuvwxyz")),
            "\"abcdefghijklmnopq...\""
        );
    }

    #[test]
    fn containers_render_compact() {
        assert_eq!(display_value(&json!([1, 2])), "[1,2]");
        assert_eq!(display_value(&json!({"key": "a long value here"})), "{\"key\":\"a long va...");
        assert_eq!(display_value(&json!(null)), "null");
        assert_eq!(display_value(&json!(4.5)), "4.5");
    }
}

//! Placeholder parsing used by the declaration lexer.

use crate::errors::{PatternError, placeholder_error};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlaceholderSpec {
    pub name: String,
    pub hint: Option<String>,
    pub start: usize,
}

const INVALID: &str = "invalid placeholder in step declaration";
const UNCLOSED: &str = "missing closing '}' for placeholder";

/// Parse `{name}` or `{name:hint}` starting at the `{` at byte `start`.
///
/// Returns the byte offset just past the closing brace.
pub(crate) fn parse_placeholder(
    bytes: &[u8],
    start: usize,
) -> Result<(usize, PlaceholderSpec), PatternError> {
    let mut index = start + 1;
    let mut name = String::new();
    while let Some(&b) = bytes.get(index) {
        if b.is_ascii_alphanumeric() || b == b'_' {
            name.push(char::from(b));
            index += 1;
        } else {
            break;
        }
    }

    let mut hint = None;
    match bytes.get(index) {
        Some(b'}') => {}
        Some(b':') => {
            index += 1;
            let hint_start = index;
            while let Some(&b) = bytes.get(index) {
                if b == b'}' {
                    break;
                }
                index += 1;
            }
            if bytes.get(index).is_none() {
                return Err(placeholder_error(UNCLOSED, start, Some(name)));
            }
            let raw = bytes
                .get(hint_start..index)
                .and_then(|raw| std::str::from_utf8(raw).ok())
                .ok_or_else(|| placeholder_error(INVALID, start, Some(name.clone())))?;
            if raw.is_empty()
                || raw.chars().any(char::is_whitespace)
                || raw.contains('{')
            {
                return Err(placeholder_error(INVALID, start, Some(name)));
            }
            hint = Some(raw.to_string());
        }
        Some(_) => return Err(placeholder_error(INVALID, start, Some(name))),
        None => return Err(placeholder_error(UNCLOSED, start, Some(name))),
    }

    Ok((index + 1, PlaceholderSpec { name, hint, start }))
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests exercise placeholder parser fallibility"
)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_placeholder() {
        let pattern = "{value}";
        let (next, spec) = parse_placeholder(pattern.as_bytes(), 0).unwrap();
        assert_eq!(next, pattern.len());
        assert_eq!(spec.name, "value");
        assert_eq!(spec.hint, None);
    }

    #[test]
    fn parses_placeholder_with_type_hint() {
        let pattern = "x {value:int} y";
        let (next, spec) = parse_placeholder(pattern.as_bytes(), 2).unwrap();
        assert_eq!(next, 13);
        assert_eq!(spec.name, "value");
        assert_eq!(spec.hint.as_deref(), Some("int"));
        assert_eq!(spec.start, 2);
    }

    #[test]
    fn errors_on_missing_closing_brace() {
        let err = parse_placeholder(b"{value", 0).unwrap_err();
        assert!(err.to_string().contains("missing closing"));
        let err = parse_placeholder(b"{value:int", 0).unwrap_err();
        assert!(err.to_string().contains("missing closing"));
    }

    #[test]
    fn errors_on_whitespace_in_placeholder() {
        for pattern in ["{value :int}", "{value:bad hint}", "{value }", "{value:}"] {
            let err = parse_placeholder(pattern.as_bytes(), 0).unwrap_err();
            assert!(
                err.to_string().contains(INVALID),
                "{pattern} should be rejected"
            );
        }
    }
}

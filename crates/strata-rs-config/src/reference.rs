//! Resolution of `config~key` references inside string values.
//!
//! A value such as `"https://+config~api.host"` resolves to the literal text
//! before the first `+` followed by the current value of `api.host`. Without a
//! `+` segment the value resolves to the referenced value alone. Lookups see
//! only what has already been merged; forward references come back absent.

/// Substring that marks a value as a reference.
pub const REFERENCE_MARKER: &str = "config~";

/// Text substituted when a prefixed reference points at an unset key.
const UNSET_TEXT: &str = "null";

/// Returns true when the value contains the reference marker.
pub fn is_reference(raw: &str) -> bool {
    raw.contains(REFERENCE_MARKER)
}

/// Resolve a raw string against `lookup`.
///
/// Values without the marker are returned unchanged. A bare reference to an
/// unset key yields `None`; a prefixed one renders the unset value as `null`.
pub fn resolve<F>(raw: &str, lookup: F) -> Option<String>
where
    F: FnOnce(&str) -> Option<String>,
{
    if !is_reference(raw) {
        return Some(raw.to_string());
    }

    let plus_segments = split_segments(raw, "+");
    let marker_segments = split_segments(raw, REFERENCE_MARKER);
    let target = marker_segments.get(1).and_then(|key| lookup(key));

    if plus_segments.len() > 1 {
        let prefix = plus_segments[0];
        Some(format!(
            "{prefix}{}",
            target.as_deref().unwrap_or(UNSET_TEXT)
        ))
    } else {
        target
    }
}

/// Split on `separator`, dropping trailing empty segments.
///
/// At least one segment is always returned so index 0 is the text before the
/// first separator.
fn split_segments<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut segments: Vec<&str> = text.split(separator).collect();
    while segments.len() > 1 && segments.last().is_some_and(|segment| segment.is_empty()) {
        segments.pop();
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn table() -> HashMap<&'static str, &'static str> {
        HashMap::from([("db.host", "localhost"), ("port", "5432")])
    }

    fn lookup(key: &str) -> Option<String> {
        table().get(key).map(|value| value.to_string())
    }

    #[test]
    fn plain_values_pass_through() {
        assert_eq!(resolve("plain+text", lookup), Some("plain+text".to_string()));
    }

    #[test]
    fn bare_reference_uses_target_value() {
        assert_eq!(resolve("config~db.host", lookup), Some("localhost".to_string()));
    }

    #[test]
    fn prefixed_reference_concatenates() {
        assert_eq!(
            resolve("postgres://+config~db.host", lookup),
            Some("postgres://localhost".to_string())
        );
    }

    #[test]
    fn bare_reference_to_unset_key_is_absent() {
        assert_eq!(resolve("config~missing", lookup), None);
    }

    #[test]
    fn prefixed_reference_to_unset_key_renders_null() {
        assert_eq!(
            resolve("host=+config~missing", lookup),
            Some("host=null".to_string())
        );
    }

    #[test]
    fn marker_without_key_is_absent() {
        assert_eq!(resolve("config~", lookup), None);
    }

    #[test]
    fn trailing_plus_is_not_a_prefix() {
        let mut seen = None;
        let resolved = resolve("config~port+", |key| {
            seen = Some(key.to_string());
            Some("5432".to_string())
        });
        assert_eq!(seen.as_deref(), Some("port+"));
        assert_eq!(resolved, Some("5432".to_string()));
    }

    #[test]
    fn lookup_receives_text_after_marker() {
        let mut seen = None;
        let resolved = resolve("x+config~a.b", |key| {
            seen = Some(key.to_string());
            None
        });
        assert_eq!(seen.as_deref(), Some("a.b"));
        assert_eq!(resolved, Some("xnull".to_string()));
    }
}

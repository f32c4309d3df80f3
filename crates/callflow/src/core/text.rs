//! Shared text utilities for message labels
//!
//! This module contains the label formatting used by all sequence renderers.

use serde_json::Value;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::types::Message;

/// Shorten text to at most `max_width` display columns by cutting out the middle.
///
/// Newlines are removed first. Text that already fits is returned unchanged.
/// If `max_width` is 0 the text is never shortened.
///
/// # Example
/// ```
/// use callflow::core::truncate_middle;
///
/// assert_eq!(truncate_middle("short", 10), "short");
/// assert_eq!(truncate_middle("abcdefghijklmnopqrstuvwxyz", 10), "abc...wxyz");
/// ```
pub fn truncate_middle(text: &str, max_width: usize) -> String {
    let flat: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    if max_width == 0 || UnicodeWidthStr::width(flat.as_str()) <= max_width {
        return flat;
    }

    let half = max_width / 2;
    let head_budget = half.saturating_sub(2);
    let tail_budget = half.saturating_sub(1);

    let mut head = String::new();
    let mut used = 0;
    for c in flat.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > head_budget {
            break;
        }
        used += w;
        head.push(c);
    }

    let mut tail: Vec<char> = Vec::new();
    let mut used = 0;
    for c in flat.chars().rev() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > tail_budget {
            break;
        }
        used += w;
        tail.push(c);
    }
    tail.reverse();

    let mut out = head;
    out.push_str("...");
    out.extend(tail);
    out
}

/// Render one call argument for display
///
/// Strings are shown without quotes. An object with an `action` field is shown
/// as the action followed by the remaining fields.
pub fn format_input(input: &Value) -> String {
    match input {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("action") {
            Some(action) => {
                let mut rest = map.clone();
                rest.remove("action");
                let action = match action {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                if rest.is_empty() {
                    action
                } else {
                    format!("{} {}", action, Value::Object(rest))
                }
            }
            None => input.to_string(),
        },
        other => other.to_string(),
    }
}

/// `operation(arg, arg, ...)`
pub fn format_call(operation: &str, inputs: &[Value]) -> String {
    let args: Vec<String> = inputs.iter().map(format_input).collect();
    format!("{}({})", operation, args.join(", "))
}

/// The text shown next to a message arrow
///
/// Returns carry a comment and are cut to `max_comment_len`; calls show their
/// operation and arguments cut to `max_label_len`.
pub fn message_label(message: &Message, max_label_len: usize, max_comment_len: usize) -> String {
    match message.comment.as_deref() {
        Some(comment) if !comment.is_empty() => truncate_middle(comment, max_comment_len),
        _ => truncate_middle(
            &format_call(&message.operation, &message.inputs),
            max_label_len,
        ),
    }
}

/// Strip whitespace so a name can be used as a DSL identifier
pub fn as_identifier(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truncate_short_text() {
        assert_eq!(truncate_middle("Hello", 20), "Hello");
    }

    #[test]
    fn test_truncate_exact_fit() {
        assert_eq!(truncate_middle("Hello", 5), "Hello");
    }

    #[test]
    fn test_truncate_long_text() {
        let out = truncate_middle("abcdefghijklmnopqrstuvwxyz", 10);
        assert_eq!(out, "abc...wxyz");
        assert!(UnicodeWidthStr::width(out.as_str()) <= 10);
    }

    #[test]
    fn test_truncate_removes_newlines() {
        assert_eq!(truncate_middle("a\nb\r\nc", 20), "abc");
    }

    #[test]
    fn test_truncate_zero_width() {
        assert_eq!(truncate_middle("Hello World", 0), "Hello World");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // each ideograph is 2 columns wide
        let out = truncate_middle("日本語のテキストです", 12);
        assert!(UnicodeWidthStr::width(out.as_str()) <= 12);
        assert!(out.starts_with("日本"));
        assert!(out.contains("..."));
    }

    #[test]
    fn test_format_input_variants() {
        assert_eq!(format_input(&json!("plain")), "plain");
        assert_eq!(format_input(&json!(42)), "42");
        assert_eq!(format_input(&json!([1, 2])), "[1,2]");
        assert_eq!(format_input(&json!({"a": 1})), r#"{"a":1}"#);
        assert_eq!(
            format_input(&json!({"action": "save", "id": 3})),
            r#"save {"id":3}"#
        );
        assert_eq!(format_input(&json!({"action": "noop"})), "noop");
    }

    #[test]
    fn test_format_call() {
        assert_eq!(format_call("ping", &[]), "ping()");
        assert_eq!(
            format_call("search", &[json!("rust"), json!(10)]),
            "search(rust, 10)"
        );
    }

    #[test]
    fn test_as_identifier() {
        assert_eq!(as_identifier("Order Service"), "OrderService");
        assert_eq!(as_identifier(" a\tb "), "ab");
    }
}

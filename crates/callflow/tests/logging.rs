//! Tests for logging functionality
//!
//! These tests verify that logging initialization works correctly
//! with different configurations.

use callflow::core::logging::{init_logging, resolve_level, LogFormat};
use std::str::FromStr;

#[test]
fn test_log_format_parsing() {
    assert_eq!(LogFormat::from_str("compact").unwrap(), LogFormat::Compact);
    assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
    assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
    assert_eq!(LogFormat::from_str("Pretty").unwrap(), LogFormat::Pretty);
    assert!(LogFormat::from_str("syslog").is_err());
}

#[test]
fn test_log_format_variants() {
    let variants = LogFormat::variants();
    assert_eq!(variants, &["compact", "pretty", "json"]);
}

#[test]
fn test_explicit_level_is_used() {
    assert_eq!(resolve_level(Some("trace")), "trace");
}

#[test]
fn test_init_logging_with_levels() {
    // Only the first call can install the subscriber; the rest must not panic
    let _ = init_logging(Some("trace"), Some("compact"));
    let _ = init_logging(Some("debug"), Some("compact"));
    let _ = init_logging(Some("warn"), Some("json"));
    let _ = init_logging(Some("off"), Some("pretty"));
}

#[test]
fn test_init_logging_invalid_format() {
    let result = init_logging(Some("info"), Some("invalid_format"));
    assert!(result.is_err());
}

#[test]
fn test_init_logging_invalid_level() {
    // Falls back to info; may still fail if a subscriber is installed
    let _ = init_logging(Some("not a level"), Some("compact"));
}

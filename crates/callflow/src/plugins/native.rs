//! Native call-record format and input detection
//!
//! The native format is the serde form of [`CallRecord`]: a JSON array of
//! records, or JSON lines with one record per line. It is what
//! [`Recorder::to_json`](super::recorder::Recorder::to_json) writes.

use anyhow::Result;
use serde_json::{Deserializer, Value};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, span, warn, Level};

use super::otlp::parse_otlp;
use crate::core::{CallRecord, CallflowError};

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// Pick by looking at the input
    #[default]
    Auto,
    /// OpenTelemetry OTLP/JSON export
    Otlp,
    /// Serialized call records
    Calls,
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(InputFormat::Auto),
            "otlp" => Ok(InputFormat::Otlp),
            "calls" => Ok(InputFormat::Calls),
            _ => Err(format!("Unknown input format: {}", s)),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Auto => write!(f, "auto"),
            InputFormat::Otlp => write!(f, "otlp"),
            InputFormat::Calls => write!(f, "calls"),
        }
    }
}

/// Guess the format of a trace file
///
/// OTLP when the first JSON object has a top-level `resourceSpans` key.
pub fn detect_format(input: &str) -> InputFormat {
    match first_value(input) {
        Some(Value::Object(map)) if map.contains_key("resourceSpans") => InputFormat::Otlp,
        _ => InputFormat::Calls,
    }
}

/// First JSON value of a document or JSON lines, skipping non-JSON lines
fn first_value(input: &str) -> Option<Value> {
    if let Some(Ok(value)) = Deserializer::from_str(input).into_iter::<Value>().next() {
        return Some(value);
    }
    input
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .find_map(|line| serde_json::from_str(line).ok())
}

/// Parse serialized call records
pub fn parse_calls(input: &str) -> Result<Vec<CallRecord>> {
    let parse_span = span!(Level::INFO, "parse_calls", input_len = input.len());
    let _enter = parse_span.enter();

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let calls: Vec<CallRecord> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(CallflowError::from)?
    } else {
        debug!("Reading call records as JSON lines");
        let mut calls = Vec::new();
        let mut first_error = None;
        for (index, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if !line.starts_with('{') {
                warn!(line = index + 1, "Skipping non-JSON line");
                continue;
            }
            match serde_json::from_str::<CallRecord>(line) {
                Ok(call) => calls.push(call),
                Err(e) => {
                    warn!(line = index + 1, error = %e, "Skipping malformed JSON line");
                    if first_error.is_none() {
                        first_error = Some(CallflowError::ingest(e.to_string(), index + 1));
                    }
                }
            }
        }
        // Nothing usable: report the first bad line
        if calls.is_empty() {
            if let Some(error) = first_error {
                return Err(error.into());
            }
        }
        calls
    };

    for call in &calls {
        call.validate()?;
    }
    info!(calls = calls.len(), "Call records ingested");
    Ok(calls)
}

/// Parse a trace in the given format
pub fn load(input: &str, format: InputFormat) -> Result<Vec<CallRecord>> {
    let format = match format {
        InputFormat::Auto => detect_format(input),
        other => other,
    };
    debug!(%format, "Loading trace");
    match format {
        InputFormat::Otlp => parse_otlp(input),
        InputFormat::Calls | InputFormat::Auto => parse_calls(input),
    }
}

/// Serialize call records as a pretty JSON array
pub fn to_json(calls: &[CallRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(calls).map_err(CallflowError::from)?)
}

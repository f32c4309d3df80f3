//! OTLP/JSON trace ingestion
//!
//! Reads OpenTelemetry trace exports (`{"resourceSpans": [...]}`), either as a
//! single JSON document or as JSON lines with one export per line, and maps
//! each instrumented span to a [`CallRecord`].
//!
//! A span describes a call when it carries the actor attributes written by the
//! instrumentation side:
//!
//! | attribute | meaning |
//! |---|---|
//! | `fromSystem`, `fromLabel`, `fromType` | caller |
//! | `toSystem`, `toLabel`, `toType` | callee |
//! | `from-tag-N`, `to-tag-N` | actor tags |
//! | `argN` | call arguments (JSON, or plain text) |
//! | `callId`, `responseId` | call-order ids, optional |
//!
//! Spans without actor attributes are skipped. When any call lacks a `callId`,
//! ids for the whole batch are derived from the span timeline instead.

use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;
use std::cmp::Reverse;
use std::collections::HashMap;
use tracing::{debug, info, span, trace, warn, Level};

use crate::core::{CallRecord, CallflowError, Container, ContainerKind, Outcome, Timestamp};

const STATUS_UNSET: i64 = 0;
const STATUS_OK: i64 = 1;
const STATUS_ERROR: i64 = 2;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportRequest {
    #[serde(default)]
    resource_spans: Vec<ResourceSpans>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceSpans {
    #[serde(default)]
    scope_spans: Vec<ScopeSpans>,
}

#[derive(Debug, Deserialize)]
struct ScopeSpans {
    #[serde(default)]
    spans: Vec<OtlpSpan>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OtlpSpan {
    #[serde(default)]
    name: String,
    #[serde(default)]
    start_time_unix_nano: Option<Uint64>,
    #[serde(default)]
    end_time_unix_nano: Option<Uint64>,
    #[serde(default)]
    attributes: Vec<KeyValue>,
    #[serde(default)]
    status: Option<Status>,
}

/// OTLP/JSON writes 64-bit integers as strings, some exporters as numbers
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Uint64 {
    Number(u64),
    Text(String),
}

impl Uint64 {
    fn value(&self) -> Option<u64> {
        match self {
            Uint64::Number(n) => Some(*n),
            Uint64::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct KeyValue {
    key: String,
    #[serde(default)]
    value: AnyValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnyValue {
    string_value: Option<String>,
    int_value: Option<Uint64>,
    bool_value: Option<bool>,
    double_value: Option<f64>,
}

impl AnyValue {
    fn as_text(&self) -> Option<String> {
        if let Some(s) = &self.string_value {
            return Some(s.clone());
        }
        if let Some(n) = self.int_value.as_ref().and_then(Uint64::value) {
            return Some(n.to_string());
        }
        if let Some(b) = self.bool_value {
            return Some(b.to_string());
        }
        self.double_value.map(|d| d.to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
struct Status {
    #[serde(default)]
    code: Option<StatusCode>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StatusCode {
    Number(i64),
    Name(String),
}

impl StatusCode {
    fn value(&self) -> Option<i64> {
        match self {
            StatusCode::Number(n) => Some(*n),
            StatusCode::Name(name) => match name.as_str() {
                "STATUS_CODE_UNSET" => Some(STATUS_UNSET),
                "STATUS_CODE_OK" => Some(STATUS_OK),
                "STATUS_CODE_ERROR" => Some(STATUS_ERROR),
                other => other.parse().ok(),
            },
        }
    }
}

/// A span mapped to a call, before ids are settled
#[derive(Debug)]
struct SpanCall {
    record: CallRecord,
    has_ids: bool,
}

/// Parse OTLP/JSON text (one document or JSON lines) into call records
///
/// # Example
/// ```
/// use callflow::plugins::otlp::parse_otlp;
///
/// let json = r#"{"resourceSpans":[{"scopeSpans":[{"spans":[{
///   "name": "search",
///   "startTimeUnixNano": "100", "endTimeUnixNano": "250",
///   "status": {"code": 1},
///   "attributes": [
///     {"key": "fromSystem", "value": {"stringValue": "app"}},
///     {"key": "fromLabel", "value": {"stringValue": "ui"}},
///     {"key": "toSystem", "value": {"stringValue": "app"}},
///     {"key": "toLabel", "value": {"stringValue": "search"}}
///   ]}]}]}]}"#;
///
/// let calls = parse_otlp(json).unwrap();
/// assert_eq!(calls.len(), 1);
/// assert_eq!(calls[0].operation, "search");
/// ```
pub fn parse_otlp(input: &str) -> Result<Vec<CallRecord>> {
    let parse_span = span!(Level::INFO, "parse_otlp", input_len = input.len());
    let _enter = parse_span.enter();

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let mut calls = Vec::new();
    match serde_json::from_str::<ExportRequest>(trimmed) {
        Ok(request) => collect_calls(request, 0, &mut calls)?,
        Err(document_error) => {
            debug!("Input is not a single document, reading JSON lines");
            let mut parsed_lines = 0usize;
            for (index, line) in input.lines().enumerate() {
                let line = line.trim();
                if !line.starts_with('{') {
                    continue;
                }
                match serde_json::from_str::<ExportRequest>(line) {
                    Ok(request) => {
                        parsed_lines += 1;
                        collect_calls(request, index + 1, &mut calls)?;
                    }
                    Err(e) => warn!(line = index + 1, error = %e, "Skipping malformed JSON line"),
                }
            }
            if parsed_lines == 0 {
                return Err(CallflowError::from(document_error).into());
            }
        }
    }

    let records = settle_ids(calls);
    info!(calls = records.len(), "OTLP spans ingested");
    Ok(records)
}

fn collect_calls(request: ExportRequest, line: usize, out: &mut Vec<SpanCall>) -> Result<()> {
    for span in request
        .resource_spans
        .into_iter()
        .flat_map(|r| r.scope_spans)
        .flat_map(|s| s.spans)
    {
        if let Some(call) = span_to_call(span, line)? {
            out.push(call);
        }
    }
    Ok(())
}

fn attribute_map(attributes: &[KeyValue]) -> HashMap<&str, String> {
    attributes
        .iter()
        .filter_map(|kv| kv.value.as_text().map(|v| (kv.key.as_str(), v)))
        .collect()
}

fn container(
    attrs: &HashMap<&str, String>,
    prefix: &str,
    line: usize,
) -> Result<Option<Container>, CallflowError> {
    let (Some(system), Some(label)) = (
        attrs.get(format!("{}System", prefix).as_str()),
        attrs.get(format!("{}Label", prefix).as_str()),
    ) else {
        return Ok(None);
    };

    let kind = match attrs.get(format!("{}Type", prefix).as_str()) {
        None => ContainerKind::System,
        Some(name) => ContainerKind::parse(name).ok_or_else(|| {
            CallflowError::ingest(format!("unknown {}Type '{}'", prefix, name), line)
        })?,
    };

    let mut actor = Container::new(kind, system.clone(), label.clone());
    for tag in (0..).map_while(|i| attrs.get(format!("{}-tag-{}", prefix, i).as_str())) {
        actor.tags.insert(tag.clone());
    }
    Ok(Some(actor))
}

/// `argN` attributes hold JSON when the argument was structured, plain text otherwise
fn inputs(attrs: &HashMap<&str, String>) -> Vec<Value> {
    (0..)
        .map_while(|i| attrs.get(format!("arg{}", i).as_str()))
        .map(|raw| serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone())))
        .collect()
}

fn outcome(span: &OtlpSpan, line: usize) -> Result<Outcome, CallflowError> {
    let end = span
        .end_time_unix_nano
        .as_ref()
        .and_then(Uint64::value)
        .filter(|t| *t != 0);
    let Some(time) = end else {
        return Ok(Outcome::Pending);
    };

    let status = span.status.as_ref();
    let code = match status.and_then(|s| s.code.as_ref()) {
        None => STATUS_UNSET,
        Some(code) => code.value().ok_or_else(|| {
            CallflowError::ingest(format!("unreadable status code {:?}", code), line)
        })?,
    };

    match code {
        STATUS_UNSET | STATUS_OK => Ok(Outcome::Completed {
            time,
            result: Value::String("Success".to_string()),
        }),
        STATUS_ERROR => Ok(Outcome::Failed {
            time,
            error: status
                .and_then(|s| s.message.clone())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Error occurred".to_string()),
        }),
        other => Err(CallflowError::ingest(
            format!("unknown status code {} on span '{}'", other, span.name),
            line,
        )),
    }
}

fn span_to_call(span: OtlpSpan, line: usize) -> Result<Option<SpanCall>, CallflowError> {
    let attrs = attribute_map(&span.attributes);
    let (Some(source), Some(target)) = (
        container(&attrs, "from", line)?,
        container(&attrs, "to", line)?,
    ) else {
        trace!(name = %span.name, "Skipping span without actor attributes");
        return Ok(None);
    };

    let start_time = span
        .start_time_unix_nano
        .as_ref()
        .and_then(Uint64::value)
        .ok_or_else(|| {
            CallflowError::ingest(format!("span '{}' has no start time", span.name), line)
        })?;

    let call_id = attrs.get("callId").and_then(|v| v.parse::<u64>().ok());
    let response_id = attrs.get("responseId").and_then(|v| v.parse::<u64>().ok());

    let record = CallRecord {
        call_id: call_id.unwrap_or(0),
        response_id,
        source,
        target,
        operation: span.name.clone(),
        inputs: inputs(&attrs),
        start_time,
        outcome: outcome(&span, line)?,
    };
    record.validate().map_err(|e| CallflowError::ingest(e.to_string(), line))?;

    Ok(Some(SpanCall {
        record,
        has_ids: call_id.is_some(),
    }))
}

/// Keep explicit ids when every call has them, otherwise number the timeline
fn settle_ids(calls: Vec<SpanCall>) -> Vec<CallRecord> {
    let all_explicit = calls.iter().all(|c| c.has_ids);
    let mut records: Vec<CallRecord> = calls.into_iter().map(|c| c.record).collect();
    if !all_explicit {
        debug!("Deriving call ids from span timeline");
        derive_ids(&mut records);
    }
    records
}

/// Number starts and ends in time order from one counter
///
/// At equal times ends come before starts. Equal-time ends close the call
/// that started last first; equal-time starts open the call that ends last
/// first, with pending calls outermost. Remaining ties keep input order. A call
/// that ends the instant it starts takes two consecutive ids.
pub fn derive_ids(records: &mut [CallRecord]) {
    #[derive(PartialEq, Eq, PartialOrd, Ord)]
    enum Point {
        End,
        Start,
    }

    // (time, point, other end of the call reversed, input index)
    let mut points: Vec<(Timestamp, Point, Reverse<Timestamp>, usize)> =
        Vec::with_capacity(records.len() * 2);
    for (index, record) in records.iter().enumerate() {
        let end = record.end_time();
        points.push((
            record.start_time,
            Point::Start,
            Reverse(end.unwrap_or(Timestamp::MAX)),
            index,
        ));
        if let Some(end) = end.filter(|end| *end != record.start_time) {
            points.push((end, Point::End, Reverse(record.start_time), index));
        }
    }
    points.sort();

    let mut next = 0u64;
    for (_, point, _, index) in points {
        next += 1;
        let record = &mut records[index];
        match point {
            Point::Start => {
                record.call_id = next;
                record.response_id = None;
                if record.end_time() == Some(record.start_time) {
                    next += 1;
                    record.response_id = Some(next);
                }
            }
            Point::End => record.response_id = Some(next),
        }
    }
}

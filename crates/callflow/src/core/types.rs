//! Core type definitions for call-trace processing
//!
//! This module contains the fundamental types used throughout Callflow:
//! actors, call records with their outcomes, and the synthesized messages
//! that renderers consume.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::error::CallflowError;

/// Monotonic timestamp in nanoseconds
pub type Timestamp = u64;

/// Kind of participant in an interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum ContainerKind {
    /// A human user
    Person,
    /// A service or application component
    #[default]
    System,
    /// A scheduled or background job
    Job,
    /// A data store
    Database,
}

impl ContainerKind {
    /// Parse a kind from its name, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "person" => Some(ContainerKind::Person),
            "system" => Some(ContainerKind::System),
            "job" => Some(ContainerKind::Job),
            "database" => Some(ContainerKind::Database),
            _ => None,
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::Person => write!(f, "Person"),
            ContainerKind::System => write!(f, "System"),
            ContainerKind::Job => write!(f, "Job"),
            ContainerKind::Database => write!(f, "Database"),
        }
    }
}

/// An addressable participant (actor) in a trace
///
/// Two containers are the same participant when their kind, owning system and
/// label match. Tags are carried along for renderers but do not take part in
/// identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    pub kind: ContainerKind,
    /// The owning software system, used as the grouping category
    pub system: String,
    /// Label, unique within `system`
    pub label: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

impl Container {
    pub fn new(kind: ContainerKind, system: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind,
            system: system.into(),
            label: label.into(),
            tags: BTreeSet::new(),
        }
    }

    pub fn system(system: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(ContainerKind::System, system, label)
    }

    pub fn person(system: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(ContainerKind::Person, system, label)
    }

    pub fn job(system: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(ContainerKind::Job, system, label)
    }

    pub fn database(system: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(ContainerKind::Database, system, label)
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// `system.label`, the participant id used by sequence renderers
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.system, self.label)
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.system == other.system && self.label == other.label
    }
}

impl Eq for Container {}

impl Hash for Container {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.system.hash(state);
        self.label.hash(state);
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.system, self.label)
    }
}

/// How a call ended
///
/// This is a closed set: every consumer matches it exhaustively, so adding a
/// variant is a compile error at each site that has to learn about it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    /// No end observed yet
    #[default]
    Pending,
    Completed { time: Timestamp, result: Value },
    Failed { time: Timestamp, error: String },
}

impl Outcome {
    /// Time the call ended, if it has
    pub fn end_time(&self) -> Option<Timestamp> {
        match self {
            Outcome::Pending => None,
            Outcome::Completed { time, .. } | Outcome::Failed { time, .. } => Some(*time),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending)
    }

    /// Human-readable summary used in return-arrow comments
    pub fn description(&self) -> String {
        match self {
            Outcome::Pending => "never completed".to_string(),
            Outcome::Failed { error, .. } => format!("Failed with '{}'", error),
            Outcome::Completed { result, .. } => match result {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        }
    }
}

/// Elapsed time of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallDuration {
    /// Nanoseconds between start and end
    Finite(u64),
    /// The call never completed
    Infinite,
}

impl CallDuration {
    pub fn is_infinite(&self) -> bool {
        matches!(self, CallDuration::Infinite)
    }

    pub fn as_nanos(&self) -> Option<u64> {
        match self {
            CallDuration::Finite(ns) => Some(*ns),
            CallDuration::Infinite => None,
        }
    }
}

impl fmt::Display for CallDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallDuration::Finite(ns) => write!(f, "{}ns", ns),
            CallDuration::Infinite => write!(f, "∞"),
        }
    }
}

/// One request/response lifecycle between two actors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Assigned at call start, strictly increasing in program call order
    pub call_id: u64,
    /// Assigned at completion from the same counter as `call_id`
    #[serde(default)]
    pub response_id: Option<u64>,
    pub source: Container,
    pub target: Container,
    pub operation: String,
    #[serde(default)]
    pub inputs: Vec<Value>,
    pub start_time: Timestamp,
    #[serde(default)]
    pub outcome: Outcome,
}

impl CallRecord {
    /// Create a pending call record
    pub fn new(
        call_id: u64,
        source: Container,
        target: Container,
        operation: impl Into<String>,
        start_time: Timestamp,
    ) -> Self {
        Self {
            call_id,
            response_id: None,
            source,
            target,
            operation: operation.into(),
            inputs: Vec::new(),
            start_time,
            outcome: Outcome::Pending,
        }
    }

    pub fn with_inputs(mut self, inputs: Vec<Value>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn completed(mut self, response_id: u64, time: Timestamp, result: impl Into<Value>) -> Self {
        self.response_id = Some(response_id);
        self.outcome = Outcome::Completed {
            time,
            result: result.into(),
        };
        self
    }

    pub fn failed(mut self, response_id: u64, time: Timestamp, error: impl Into<String>) -> Self {
        self.response_id = Some(response_id);
        self.outcome = Outcome::Failed {
            time,
            error: error.into(),
        };
        self
    }

    pub fn is_self_call(&self) -> bool {
        self.source == self.target
    }

    pub fn end_time(&self) -> Option<Timestamp> {
        self.outcome.end_time()
    }

    /// Elapsed time, infinite while pending
    pub fn duration(&self) -> CallDuration {
        match self.outcome.end_time() {
            Some(end) => CallDuration::Finite(end.saturating_sub(self.start_time)),
            None => CallDuration::Infinite,
        }
    }

    /// Check the record's own invariants
    pub fn validate(&self) -> Result<(), CallflowError> {
        if let Some(end) = self.end_time() {
            if end < self.start_time {
                return Err(CallflowError::invalid_record(
                    self.call_id,
                    format!("ends at {} before it starts at {}", end, self.start_time),
                ));
            }
        }
        Ok(())
    }
}

/// Arrow semantics of a synthesized message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowKind {
    /// Call from an actor to itself
    SelfCall,
    /// Call answered before anything else happened
    SyncCall,
    /// Call that opens an activation
    AsyncOpen,
    /// Return of a synchronous call
    SyncReturn,
    /// Return that closes an activation
    AsyncClose,
}

impl ArrowKind {
    /// Returns true for arrows travelling back from callee to caller
    pub fn is_return(&self) -> bool {
        matches!(self, ArrowKind::SyncReturn | ArrowKind::AsyncClose)
    }
}

impl fmt::Display for ArrowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrowKind::SelfCall => write!(f, "self"),
            ArrowKind::SyncCall => write!(f, "sync-call"),
            ArrowKind::AsyncOpen => write!(f, "async-open"),
            ArrowKind::SyncReturn => write!(f, "sync-return"),
            ArrowKind::AsyncClose => write!(f, "async-close"),
        }
    }
}

/// A directed, timestamped unit ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The call this message belongs to
    pub call_id: u64,
    /// Position on the call-order axis: the call id for calls, the response id
    /// (or `u64::MAX` when unset) for returns
    pub sequence_key: u64,
    pub from: Container,
    pub to: Container,
    pub timestamp: Timestamp,
    pub duration: CallDuration,
    pub arrow: ArrowKind,
    pub operation: String,
    pub inputs: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}: {}:{} {} {} took {}",
            self.timestamp, self.sequence_key, self.from, self.operation, self.arrow, self.to,
            self.duration
        )
    }
}

//! Core error types for trace processing
//!
//! This module defines common error types used throughout the ingestion and
//! rendering pipeline. Synthesis itself never fails.

use thiserror::Error;

/// Core error types for trace processing
#[derive(Error, Debug)]
pub enum CallflowError {
    #[error("Ingest error: {message} at line {line}")]
    Ingest { message: String, line: usize },

    #[error("Invalid record for call {call_id}: {message}")]
    InvalidRecord { call_id: u64, message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl CallflowError {
    /// Create a new ingest error; `line` is 1-based, 0 when not line-oriented
    pub fn ingest(message: impl Into<String>, line: usize) -> Self {
        Self::Ingest {
            message: message.into(),
            line,
        }
    }

    /// Create a new invalid-record error
    pub fn invalid_record(call_id: u64, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            call_id,
            message: message.into(),
        }
    }

    /// Create a new render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }
}

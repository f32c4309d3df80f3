//! An immutable snapshot of calls with their synthesized views
//!
//! A `Trace` runs participant extraction and message synthesis once and shares
//! the results, so any number of renderers can read it concurrently.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, span, Level};

use super::error::CallflowError;
use super::participants::{extract_participants, Participants};
use super::renderer::{RenderConfig, Renderer};
use super::synthesis::synthesize;
use super::types::{CallRecord, Message};

#[derive(Debug, Clone)]
pub struct Trace {
    calls: Arc<[CallRecord]>,
    messages: Arc<[Message]>,
    participants: Arc<Participants>,
}

impl Trace {
    /// Build a trace from call records
    pub fn new(calls: Vec<CallRecord>) -> Self {
        let trace_span = span!(Level::INFO, "build_trace", call_count = calls.len());
        let _enter = trace_span.enter();

        let participants = extract_participants(&calls);
        let messages = synthesize(&calls);
        info!(
            messages = messages.len(),
            categories = participants.category_count(),
            "Trace built"
        );

        Self {
            calls: calls.into(),
            messages: messages.into(),
            participants: Arc::new(participants),
        }
    }

    /// Build a trace after checking every record's invariants
    pub fn validated(calls: Vec<CallRecord>) -> Result<Self, CallflowError> {
        for call in &calls {
            call.validate()?;
        }
        Ok(Self::new(calls))
    }

    pub fn calls(&self) -> &[CallRecord] {
        &self.calls
    }

    /// Messages in rendering order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn participants(&self) -> &Participants {
        &self.participants
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Combine several batches into one trace
    pub fn merge(batches: impl IntoIterator<Item = Vec<CallRecord>>) -> Self {
        Self::new(batches.into_iter().flatten().collect())
    }

    /// Render with any renderer
    pub fn render_with(&self, renderer: &dyn Renderer) -> Result<String> {
        renderer.render(self)
    }

    /// Mermaid sequence diagram (without markdown fences)
    pub fn mermaid(&self, config: &RenderConfig) -> Result<String> {
        crate::plugins::mermaid::MermaidRenderer::with_config(config.clone()).render(self)
    }

    /// PlantUML sequence diagram named `name`
    pub fn plantuml(&self, name: &str, config: &RenderConfig) -> Result<String> {
        crate::plugins::plantuml::PlantUmlRenderer::with_config(name, config.clone()).render(self)
    }

    /// Structurizr C4 workspace
    pub fn c4(&self, style: &crate::plugins::c4::C4Style) -> Result<String> {
        crate::plugins::c4::C4Renderer::with_style(style.clone()).render(self)
    }
}

impl From<Vec<CallRecord>> for Trace {
    fn from(calls: Vec<CallRecord>) -> Self {
        Self::new(calls)
    }
}

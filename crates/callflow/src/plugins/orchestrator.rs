//! Plugin orchestrator for the trace processing pipeline
//!
//! The orchestrator manages the flow of data through the plugins:
//! Input detection → Ingestion → Trace (pairing, participants) → Renderer

use anyhow::Result;
use std::collections::BTreeMap;
use tracing::{debug, info, span, warn, Level};

use super::c4::{C4Renderer, C4Style};
use super::mermaid::{MarkdownRenderer, MermaidRenderer};
use super::native::{load, InputFormat};
use super::plantuml::PlantUmlRenderer;
use crate::core::{CallflowError, RenderConfig, Renderer, Trace};

/// Plugin orchestrator that coordinates the entire pipeline
///
/// Renderers are registered by name; [`process`](Self::process) loads a
/// trace and hands it to the renderer asked for.
pub struct Orchestrator {
    renderers: BTreeMap<String, Box<dyn Renderer>>,
}

impl Orchestrator {
    /// Create a new empty orchestrator
    pub fn new() -> Self {
        Self {
            renderers: BTreeMap::new(),
        }
    }

    /// Create an orchestrator with every built-in renderer registered
    pub fn with_all_plugins() -> Self {
        Self::with_settings("App", RenderConfig::default(), C4Style::default())
    }

    /// Create an orchestrator with built-in renderers using the given settings
    pub fn with_settings(name: &str, config: RenderConfig, style: C4Style) -> Self {
        let mut orchestrator = Self::new();
        orchestrator.register_renderer(Box::new(MermaidRenderer::with_config(config.clone())));
        orchestrator.register_renderer(Box::new(MarkdownRenderer::with_config(config.clone())));
        orchestrator.register_renderer(Box::new(PlantUmlRenderer::with_config(name, config)));
        orchestrator.register_renderer(Box::new(C4Renderer::with_style(style)));
        orchestrator
    }

    /// Register a renderer under its own name, replacing any previous one
    pub fn register_renderer(&mut self, renderer: Box<dyn Renderer>) {
        let name = renderer.name().to_string();
        if self.renderers.insert(name.clone(), renderer).is_some() {
            debug!(renderer = %name, "Replaced renderer");
        }
    }

    /// Registered renderer names, sorted
    pub fn get_renderers(&self) -> Vec<String> {
        self.renderers.keys().cloned().collect()
    }

    pub fn has_renderer(&self, name: &str) -> bool {
        self.renderers.contains_key(name)
    }

    /// Render an already loaded trace
    pub fn render(&self, trace: &Trace, renderer: &str) -> Result<String> {
        let render_span = span!(Level::DEBUG, "pipeline_render", renderer);
        let _enter = render_span.enter();

        let Some(plugin) = self.renderers.get(renderer) else {
            warn!(renderer, "Unknown renderer");
            return Err(unknown_renderer(renderer).into());
        };
        let output = plugin.render(trace)?;
        debug!(output_len = output.len(), "Rendering completed");
        Ok(output)
    }

    /// Process input through the complete pipeline
    pub fn process(&self, input: &str, format: InputFormat, renderer: &str) -> Result<String> {
        let process_span = span!(Level::INFO, "process_trace", input_len = input.len());
        let _enter = process_span.enter();

        info!(%format, renderer, "Starting trace processing pipeline");

        // Fail before parsing when the renderer is missing
        if !self.has_renderer(renderer) {
            return Err(unknown_renderer(renderer).into());
        }

        let calls = load(input, format)?;
        let trace = Trace::new(calls);
        let output = self.render(&trace, renderer)?;

        info!("Pipeline completed successfully");
        Ok(output)
    }
}

fn unknown_renderer(name: &str) -> CallflowError {
    CallflowError::render(format!("no renderer registered for '{}'", name))
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

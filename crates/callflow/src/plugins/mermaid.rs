//! Mermaid sequence diagram renderer
//!
//! Output example:
//! ```text
//! sequenceDiagram
//!     box #3498db app
//!         participant app.user
//!         participant app.api
//!     end
//!     app.user ->> app.api : login()
//!     app.api -->> app.user : login -> ok
//! ```

use anyhow::Result;
use std::fmt::Write as _;
use tracing::{debug, span, Level};

use super::colors::{color_for, NAMED_COLORS};
use crate::core::{message_label, ArrowKind, Message, RenderConfig, Renderer, Trace};

/// Mermaid sequence diagram renderer
#[derive(Debug, Clone, Default)]
pub struct MermaidRenderer {
    config: RenderConfig,
}

impl MermaidRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Mermaid arrow for a message kind; `+`/`-` open and close activations
    pub fn arrow(kind: ArrowKind) -> &'static str {
        match kind {
            ArrowKind::SelfCall | ArrowKind::SyncCall => "->>",
            ArrowKind::AsyncOpen => "->>+",
            ArrowKind::SyncReturn => "-->>",
            ArrowKind::AsyncClose => "-->>-",
        }
    }

    /// One message statement
    pub fn statement(&self, message: &Message) -> String {
        let label = message_label(
            message,
            self.config.max_label_len,
            self.config.max_comment_len,
        );
        format!(
            "{} {} {} : {}",
            message.from.qualified(),
            Self::arrow(message.arrow),
            message.to.qualified(),
            escape(&label)
        )
    }

    /// The diagram wrapped in a markdown code fence
    pub fn markdown(&self, trace: &Trace) -> Result<String> {
        Ok(format!("\n```mermaid\n{}\n```\n", self.render(trace)?))
    }
}

/// `;` ends a Mermaid statement, so it is written as an entity
fn escape(label: &str) -> String {
    label.replace(';', "#59;")
}

impl Renderer for MermaidRenderer {
    fn render(&self, trace: &Trace) -> Result<String> {
        let render_span = span!(Level::INFO, "render_mermaid", messages = trace.messages().len());
        let _enter = render_span.enter();

        let mut out = String::new();
        if let Some(init) = &self.config.mermaid_init {
            writeln!(out, "{}", init)?;
        }
        writeln!(out, "sequenceDiagram")?;

        for (index, category, actors) in trace.participants().iter() {
            writeln!(out, "    box {} {}", color_for(&NAMED_COLORS, index), category)?;
            for actor in actors {
                writeln!(out, "        participant {}", actor.qualified())?;
            }
            writeln!(out, "    end")?;
        }

        for message in trace.messages() {
            writeln!(out, "    {}", self.statement(message))?;
        }

        debug!(bytes = out.len(), "Mermaid diagram rendered");
        Ok(out.trim_end().to_string())
    }

    fn name(&self) -> &'static str {
        "mermaid"
    }

    fn format(&self) -> &'static str {
        "mermaid"
    }
}

/// Mermaid diagram fenced for embedding in markdown documents
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    inner: MermaidRenderer,
}

impl MarkdownRenderer {
    pub fn with_config(config: RenderConfig) -> Self {
        Self {
            inner: MermaidRenderer::with_config(config),
        }
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, trace: &Trace) -> Result<String> {
        self.inner.markdown(trace)
    }

    fn name(&self) -> &'static str {
        "markdown"
    }

    fn format(&self) -> &'static str {
        "markdown"
    }
}

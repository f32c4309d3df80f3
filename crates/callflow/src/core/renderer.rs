//! Core renderer trait for diagram output
//!
//! Renderers are pure templating consumers of a [`Trace`]: they read its
//! synthesized messages and participant order and never re-sort or
//! re-classify anything.

use anyhow::Result;

use super::trace::Trace;

/// Default Mermaid init directive
pub const DEFAULT_MERMAID_INIT: &str = r##"%%{init: {"theme": "dark", "themeVariables": {"primaryTextColor": "grey", "secondaryTextColor": "black", "fontFamily": "Arial", "fontSize": 14, "primaryColor": "#3498db"}}}%%"##;

/// Settings shared by the sequence renderers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Longest call label (`operation(args)`) before middle-elision
    pub max_label_len: usize,
    /// Longest return comment before middle-elision
    pub max_comment_len: usize,
    /// Mermaid `%%{init}%%` line; `None` omits it
    pub mermaid_init: Option<String>,
}

impl RenderConfig {
    pub fn new(max_label_len: usize, max_comment_len: usize) -> Self {
        Self {
            max_label_len,
            max_comment_len,
            ..Self::default()
        }
    }

    pub fn with_mermaid_init(mut self, init: Option<String>) -> Self {
        self.mermaid_init = init;
        self
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_label_len: 60,
            max_comment_len: 30,
            mermaid_init: Some(DEFAULT_MERMAID_INIT.to_string()),
        }
    }
}

/// Core trait for diagram renderers
///
/// # Example
/// ```
/// use callflow::core::{Renderer, Trace};
/// use callflow::plugins::mermaid::MermaidRenderer;
///
/// let trace = Trace::new(Vec::new());
/// let output = MermaidRenderer::new().render(&trace).unwrap();
/// assert!(output.contains("sequenceDiagram"));
/// ```
pub trait Renderer: Send + Sync {
    /// Render the trace into diagram text
    fn render(&self, trace: &Trace) -> Result<String>;

    /// Get the name of this renderer
    fn name(&self) -> &'static str;

    /// Get the supported output format
    fn format(&self) -> &'static str;
}

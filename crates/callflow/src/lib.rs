//! Callflow - Turn distributed-trace call records into sequence diagrams
//!
//! Each call between two actors is recorded once with its outcome. Callflow
//! pairs call starts with their ends, decides which calls were synchronous,
//! groups actors by category and renders the result as Mermaid, PlantUML or a
//! Structurizr C4 workspace.
//!
//! # Quick Start
//!
//! ```rust
//! use callflow::{render_mermaid, CallRecord, Container};
//!
//! let user = Container::person("shop", "user");
//! let api = Container::system("shop", "api");
//! let calls = vec![CallRecord::new(1, user, api, "checkout", 0).completed(2, 10, "ok")];
//!
//! let diagram = render_mermaid(calls).unwrap();
//! assert!(diagram.contains("shop.user ->> shop.api : checkout()"));
//! ```
//!
//! # Advanced Usage
//!
//! For more control, use the individual components:
//!
//! ```rust
//! use callflow::prelude::*;
//!
//! let ids = CallIdGenerator::new();
//! let recorder = Recorder::new(ids);
//! let ui = Container::person("shop", "user");
//! let db = Container::database("shop", "orders");
//!
//! let rows: Result<u32, String> = recorder.traced(&ui, &db, "count", vec![], || Ok(3));
//! assert_eq!(rows, Ok(3));
//!
//! // Pairing and participant extraction happen once per trace
//! let trace = recorder.trace();
//! assert_eq!(trace.messages().len(), 2);
//! assert_eq!(trace.participants().categories(), ["shop"]);
//!
//! let renderer = PlantUmlRenderer::new("Shop");
//! let puml = renderer.render(&trace).unwrap();
//! assert!(puml.starts_with("@startuml Shop"));
//! ```

pub mod core;
pub mod plugins;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        extract_participants, synthesize, ArrowKind, CallDuration, CallIdGenerator, CallRecord,
        CallflowError, Container, ContainerKind, Message, Outcome, Participants, RenderConfig,
        Renderer, Trace,
    };
    pub use crate::plugins::c4::{C4Renderer, C4Style};
    pub use crate::plugins::mermaid::{MarkdownRenderer, MermaidRenderer};
    pub use crate::plugins::native::InputFormat;
    pub use crate::plugins::orchestrator::Orchestrator;
    pub use crate::plugins::plantuml::PlantUmlRenderer;
    pub use crate::plugins::recorder::Recorder;
}

/// Render call records as a Mermaid sequence diagram with default settings
///
/// # Example
/// ```rust
/// use callflow::render_mermaid;
///
/// let diagram = render_mermaid(Vec::new()).unwrap();
/// assert!(diagram.ends_with("sequenceDiagram"));
/// ```
pub fn render_mermaid(calls: Vec<CallRecord>) -> anyhow::Result<String> {
    Trace::new(calls).mermaid(&RenderConfig::default())
}

/// Parse a trace file in any supported format
///
/// # Example
/// ```rust
/// use callflow::{load_trace, plugins::native::InputFormat};
///
/// let trace = load_trace(r#"{"resourceSpans": []}"#, InputFormat::Auto).unwrap();
/// assert!(trace.is_empty());
/// ```
pub fn load_trace(input: &str, format: plugins::native::InputFormat) -> anyhow::Result<Trace> {
    Ok(Trace::new(plugins::native::load(input, format)?))
}

/// Parse a trace file and render it with a built-in renderer
///
/// `renderer` is one of `mermaid`, `markdown`, `plantuml` or `c4`.
pub fn render(input: &str, renderer: &str) -> anyhow::Result<String> {
    use crate::plugins::orchestrator::Orchestrator;

    Orchestrator::with_all_plugins().process(input, plugins::native::InputFormat::Auto, renderer)
}

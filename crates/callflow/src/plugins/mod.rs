//! Plugin implementations for trace ingestion and rendering
//!
//! Ingestion plugins turn external formats into call records; renderer
//! plugins implement [`Renderer`](crate::core::Renderer) for one diagram
//! language each.

pub mod c4;
pub mod colors;
pub mod mermaid;
pub mod native;
pub mod orchestrator;
pub mod otlp;
pub mod plantuml;
pub mod recorder;

pub use c4::*;
pub use mermaid::*;
pub use native::*;
pub use orchestrator::*;
pub use otlp::*;
pub use plantuml::*;
pub use recorder::*;

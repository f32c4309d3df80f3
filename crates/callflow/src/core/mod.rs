//! Core data model and algorithms
//!
//! Call records go in; participant order and the synthesized message list come
//! out. Everything here is a pure function of its input apart from logging.

mod call_id;
mod error;
pub mod logging;
mod participants;
mod renderer;
mod synthesis;
mod text;
mod trace;
mod types;

pub use call_id::*;
pub use error::*;
pub use logging::*;
pub use participants::*;
pub use renderer::*;
pub use synthesis::*;
pub use text::*;
pub use trace::*;
pub use types::*;

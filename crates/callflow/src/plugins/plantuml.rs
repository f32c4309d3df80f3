//! PlantUML sequence diagram renderer

use anyhow::Result;
use std::fmt::Write as _;
use tracing::{debug, span, Level};

use super::colors::{color_for, LIGHT_COLORS};
use crate::core::{message_label, ArrowKind, ContainerKind, Message, RenderConfig, Renderer, Trace};

/// PlantUML sequence diagram renderer
#[derive(Debug, Clone)]
pub struct PlantUmlRenderer {
    name: String,
    config: RenderConfig,
}

impl PlantUmlRenderer {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, RenderConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: RenderConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    /// PlantUML participant keyword for an actor kind
    pub fn participant_keyword(kind: ContainerKind) -> &'static str {
        match kind {
            ContainerKind::Person => "actor",
            ContainerKind::Database => "database",
            ContainerKind::Job => "control",
            ContainerKind::System => "participant",
        }
    }

    /// Calls are solid, returns dashed
    pub fn arrow(kind: ArrowKind) -> &'static str {
        match kind {
            ArrowKind::SelfCall | ArrowKind::SyncCall | ArrowKind::AsyncOpen => "->",
            ArrowKind::SyncReturn | ArrowKind::AsyncClose => "-->",
        }
    }

    fn statement(&self, message: &Message) -> String {
        format!(
            "{} {} {} : {}",
            message.from.qualified(),
            Self::arrow(message.arrow),
            message.to.qualified(),
            message_label(
                message,
                self.config.max_label_len,
                self.config.max_comment_len
            )
        )
    }
}

impl Default for PlantUmlRenderer {
    fn default() -> Self {
        Self::new("App")
    }
}

impl Renderer for PlantUmlRenderer {
    fn render(&self, trace: &Trace) -> Result<String> {
        let render_span = span!(Level::INFO, "render_plantuml", name = %self.name);
        let _enter = render_span.enter();

        let mut out = String::new();
        writeln!(out, "@startuml {}", self.name)?;
        for (index, _category, actors) in trace.participants().iter() {
            let color = color_for(&LIGHT_COLORS, index);
            for actor in actors {
                writeln!(
                    out,
                    "{} {} {}",
                    Self::participant_keyword(actor.kind),
                    actor.qualified(),
                    color
                )?;
            }
        }
        writeln!(out)?;
        for message in trace.messages() {
            writeln!(out, "{}", self.statement(message))?;
        }
        write!(out, "@enduml")?;

        debug!(bytes = out.len(), "PlantUML diagram rendered");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "plantuml"
    }

    fn format(&self) -> &'static str {
        "plantuml"
    }
}

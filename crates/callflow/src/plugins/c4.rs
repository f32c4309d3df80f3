//! Structurizr DSL (C4 model) renderer
//!
//! Produces a complete `workspace` with people, software systems and their
//! containers, the static relationships between them, one context and one
//! container view per system, and a dynamic view that replays the calls.

use anyhow::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use tracing::{debug, span, Level};

use super::colors::{color_for, NAMED_COLORS};
use crate::core::{as_identifier, CallRecord, Container, ContainerKind, Renderer, Trace};

/// Element styles applied when no custom style block is given
pub const DEFAULT_STYLE: &str = r#"element "Element" {
                color #ffffff
            }
            element "Person" {
                background #05527d
                shape person
            }
            element "Software System" {
                background #066296
            }
            element "Container" {
                background #0773af
            }
            element "Job" {
                shape circle
            }
            element "Database" {
                shape cylinder
            }
            element "Queue" {
                shape pipe
            }
            element "Service" {
                shape roundedbox
            }
            element "WebApp" {
                shape webbrowser
            }"#;

const DEFAULT_LAYOUT: &str = "autolayout lr";

/// Per-system colour override
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ElementStyle {
    pub bg_color: Option<String>,
    pub color: Option<String>,
}

/// Workspace styling and layout options
///
/// Deserializes from JSON so callers can keep it in a file:
/// ```
/// use callflow::plugins::c4::C4Style;
///
/// let style: C4Style = serde_json::from_str(
///     r##"{"color_map": {"shop": {"bg_color": "#ff0000"}}, "dynamic_layout": "autolayout tb"}"##,
/// ).unwrap();
/// assert_eq!(style.dynamic_layout.as_deref(), Some("autolayout tb"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct C4Style {
    /// Replaces [`DEFAULT_STYLE`]
    pub style: Option<String>,
    pub color_map: HashMap<String, ElementStyle>,
    /// Layout directive per system name
    pub layout_by_name: HashMap<String, String>,
    pub default_system_layout: Option<String>,
    pub default_container_layout: Option<String>,
    /// Extra directive inside the dynamic view
    pub dynamic_layout: Option<String>,
}

/// Structurizr DSL renderer
#[derive(Debug, Clone, Default)]
pub struct C4Renderer {
    style: C4Style,
}

/// A software system and the non-person actors it owns
struct SoftwareSystem<'a> {
    name: &'a str,
    containers: Vec<&'a Container>,
}

impl C4Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: C4Style) -> Self {
        Self { style }
    }

    pub fn person_id(name: &str) -> String {
        format!("{}Person", as_identifier(name))
    }

    pub fn system_id(name: &str) -> String {
        format!("{}System", as_identifier(name))
    }

    /// DSL identifier of an actor: people are top-level, others live in their system
    pub fn element_id(actor: &Container) -> String {
        match actor.kind {
            ContainerKind::Person => Self::person_id(&actor.label),
            ContainerKind::System | ContainerKind::Job | ContainerKind::Database => format!(
                "{}{}Container",
                as_identifier(&actor.system),
                as_identifier(&actor.label)
            ),
        }
    }

    fn systems<'a>(trace: &'a Trace) -> Vec<SoftwareSystem<'a>> {
        trace
            .participants()
            .iter()
            .map(|(_, name, actors)| SoftwareSystem {
                name,
                containers: actors
                    .iter()
                    .filter(|a| a.kind != ContainerKind::Person)
                    .collect(),
            })
            .filter(|system| !system.containers.is_empty())
            .collect()
    }

    fn people(trace: &Trace) -> Vec<&Container> {
        let mut people: Vec<&Container> = Vec::new();
        for (_, _, actors) in trace.participants().iter() {
            for actor in actors {
                if actor.kind == ContainerKind::Person
                    && !people.iter().any(|p| p.label == actor.label)
                {
                    people.push(actor);
                }
            }
        }
        people
    }

    /// Distinct (from, to) pairs with the operations seen between them
    fn interactions(trace: &Trace) -> Vec<(String, String, Vec<&str>)> {
        let mut calls: Vec<&CallRecord> = trace.calls().iter().collect();
        calls.sort_by_key(|call| call.start_time);

        let mut grouped: Vec<(String, String, Vec<&str>)> = Vec::new();
        for call in calls {
            let from = Self::element_id(&call.source);
            let to = Self::element_id(&call.target);
            if from == to {
                continue;
            }
            match grouped.iter_mut().find(|(f, t, _)| *f == from && *t == to) {
                Some((_, _, ops)) => {
                    if !ops.contains(&call.operation.as_str()) {
                        ops.push(&call.operation);
                    }
                }
                None => grouped.push((from, to, vec![call.operation.as_str()])),
            }
        }
        grouped
    }

    fn write_model(&self, out: &mut String, trace: &Trace) -> Result<()> {
        writeln!(out, "    model {{")?;

        writeln!(out, "        // People")?;
        for person in Self::people(trace) {
            writeln!(
                out,
                "        {} = person \"{}\"",
                Self::person_id(&person.label),
                person.label
            )?;
        }

        writeln!(out)?;
        writeln!(out, "        // Software Systems")?;
        for system in Self::systems(trace) {
            writeln!(
                out,
                "        {} = softwareSystem \"{}\" {{",
                Self::system_id(system.name),
                system.name
            )?;
            writeln!(out, "            tags \"{}\"", system.name)?;
            for container in &system.containers {
                writeln!(
                    out,
                    "            {} = container \"{}\" {{",
                    Self::element_id(container),
                    container.label
                )?;
                let mut tags = vec![container.kind.to_string(), container.label.clone()];
                tags.extend(container.tags.iter().cloned());
                let tags: Vec<String> = tags.iter().map(|t| format!("\"{}\"", t)).collect();
                writeln!(out, "                tags {}", tags.join(" "))?;
                writeln!(out, "            }}")?;
            }
            writeln!(out, "        }}")?;
        }

        writeln!(out)?;
        writeln!(out, "        // Interactions")?;
        for (from, to, operations) in Self::interactions(trace) {
            writeln!(
                out,
                "        {} -> {} \"{}\"",
                from,
                to,
                join_operations(&operations)
            )?;
        }

        writeln!(out, "    }}")?;
        Ok(())
    }

    fn layout_for(&self, name: &str, fallback: &Option<String>) -> String {
        self.style
            .layout_by_name
            .get(name)
            .or(fallback.as_ref())
            .cloned()
            .unwrap_or_else(|| DEFAULT_LAYOUT.to_string())
    }

    fn write_views(&self, out: &mut String, trace: &Trace) -> Result<()> {
        let systems = Self::systems(trace);
        writeln!(out, "    views {{")?;

        for system in &systems {
            let id = Self::system_id(system.name);
            writeln!(out, "        systemContext {} \"{}\" {{", id, system.name)?;
            writeln!(out, "            include *")?;
            writeln!(
                out,
                "            {}",
                self.layout_for(system.name, &self.style.default_system_layout)
            )?;
            writeln!(out, "        }}")?;
            writeln!(out)?;
            writeln!(out, "        container {} {{", id)?;
            writeln!(out, "            include *")?;
            writeln!(
                out,
                "            {}",
                self.layout_for(system.name, &self.style.default_container_layout)
            )?;
            writeln!(out, "        }}")?;
            writeln!(out)?;
        }

        if let Some(first) = systems.first() {
            writeln!(out, "        dynamic {} {{", Self::system_id(first.name))?;
            for message in trace.messages() {
                if message.arrow.is_return() || message.from == message.to {
                    continue;
                }
                writeln!(
                    out,
                    "            {} -> {} \"{}\"",
                    Self::element_id(&message.from),
                    Self::element_id(&message.to),
                    message.operation
                )?;
            }
            if let Some(layout) = &self.style.dynamic_layout {
                writeln!(out, "            {}", layout)?;
            }
            writeln!(out, "        }}")?;
            writeln!(out)?;
        }

        writeln!(out, "        theme default")?;
        writeln!(out)?;
        writeln!(out, "        styles {{")?;
        writeln!(
            out,
            "            {}",
            self.style.style.as_deref().unwrap_or(DEFAULT_STYLE)
        )?;
        for (index, system) in systems.iter().enumerate() {
            let custom = self.style.color_map.get(system.name);
            let background = custom
                .and_then(|s| s.bg_color.as_deref())
                .unwrap_or_else(|| color_for(&NAMED_COLORS, index));
            let color = custom
                .and_then(|s| s.color.as_deref())
                .unwrap_or("#000000");
            writeln!(out, "            element \"{}\" {{", system.name)?;
            writeln!(out, "                background \"{}\"", background)?;
            writeln!(out, "                color \"{}\"", color)?;
            writeln!(out, "            }}")?;
        }
        writeln!(out, "        }}")?;

        writeln!(out, "    }}")?;
        Ok(())
    }
}

/// `a`, `a and b`, `a, b and c`
fn join_operations(operations: &[&str]) -> String {
    match operations {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

impl Renderer for C4Renderer {
    fn render(&self, trace: &Trace) -> Result<String> {
        let render_span = span!(Level::INFO, "render_c4", calls = trace.len());
        let _enter = render_span.enter();

        let mut out = String::new();
        writeln!(out, "workspace {{")?;
        self.write_model(&mut out, trace)?;
        writeln!(out)?;
        self.write_views(&mut out, trace)?;
        writeln!(out)?;
        writeln!(out, "    configuration {{")?;
        writeln!(out, "        scope none")?;
        writeln!(out, "    }}")?;
        write!(out, "}}")?;

        debug!(bytes = out.len(), "C4 workspace rendered");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "c4"
    }

    fn format(&self) -> &'static str {
        "structurizr"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> Trace {
        let user = Container::person("shop", "Shopper");
        let web = Container::system("shop", "Web App");
        let db = Container::database("shop", "orders").with_tag("primary");
        let pay = Container::system("payments", "gateway");
        Trace::new(vec![
            CallRecord::new(1, user.clone(), web.clone(), "browse", 0).completed(2, 5, "ok"),
            CallRecord::new(3, user, web.clone(), "checkout", 10).completed(8, 90, "ok"),
            CallRecord::new(4, web.clone(), db.clone(), "insert", 20).completed(5, 30, "ok"),
            CallRecord::new(6, web.clone(), pay, "charge", 40).completed(7, 60, "ok"),
            CallRecord::new(9, web, db, "update", 95).completed(10, 99, "ok"),
        ])
    }

    #[test]
    fn test_join_operations() {
        assert_eq!(join_operations(&[]), "");
        assert_eq!(join_operations(&["a"]), "a");
        assert_eq!(join_operations(&["a", "b"]), "a and b");
        assert_eq!(join_operations(&["a", "b", "c"]), "a, b and c");
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(C4Renderer::system_id("Order Service"), "OrderServiceSystem");
        assert_eq!(
            C4Renderer::element_id(&Container::person("shop", "Jane Doe")),
            "JaneDoePerson"
        );
        assert_eq!(
            C4Renderer::element_id(&Container::database("shop", "orders")),
            "shopordersContainer"
        );
    }

    #[test]
    fn test_model_sections() {
        let output = C4Renderer::new().render(&shop()).unwrap();
        assert!(output.starts_with("workspace {"));
        assert!(output.contains("ShopperPerson = person \"Shopper\""));
        assert!(output.contains("shopSystem = softwareSystem \"shop\" {"));
        assert!(output.contains("shopWebAppContainer = container \"Web App\" {"));
        assert!(output.contains("tags \"Database\" \"orders\" \"primary\""));
        assert!(output.contains("paymentsSystem = softwareSystem \"payments\" {"));
        // people are not declared as containers
        assert!(!output.contains("container \"Shopper\""));
    }

    #[test]
    fn test_interactions_grouped() {
        let output = C4Renderer::new().render(&shop()).unwrap();
        assert!(output.contains("ShopperPerson -> shopWebAppContainer \"browse and checkout\""));
        assert!(output.contains("shopWebAppContainer -> shopordersContainer \"insert and update\""));
        assert!(output.contains("shopWebAppContainer -> paymentsgatewayContainer \"charge\""));
    }

    #[test]
    fn test_views_and_dynamic() {
        let output = C4Renderer::new().render(&shop()).unwrap();
        assert!(output.contains("systemContext shopSystem \"shop\" {"));
        assert!(output.contains("container paymentsSystem {"));
        assert!(output.contains("dynamic shopSystem {"));
        assert!(output.contains("            shopWebAppContainer -> paymentsgatewayContainer \"charge\""));
        assert!(!output.contains("shopordersContainer -> shopWebAppContainer"));
        assert!(output.contains("autolayout lr"));
        assert!(output.contains("scope none"));
    }

    #[test]
    fn test_colors_and_overrides() {
        let mut style = C4Style::default();
        style.color_map.insert(
            "payments".to_string(),
            ElementStyle {
                bg_color: Some("#123456".to_string()),
                color: None,
            },
        );
        style
            .layout_by_name
            .insert("shop".to_string(), "autolayout tb".to_string());

        let output = C4Renderer::with_style(style).render(&shop()).unwrap();
        assert!(output.contains("background \"#3498db\""));
        assert!(output.contains("background \"#123456\""));
        assert!(output.contains("autolayout tb"));
        assert!(output.contains("color \"#000000\""));
    }

    #[test]
    fn test_empty_trace() {
        let output = C4Renderer::new().render(&Trace::new(Vec::new())).unwrap();
        assert!(output.contains("model {"));
        assert!(!output.contains("dynamic"));
        assert!(output.ends_with('}'));
    }
}

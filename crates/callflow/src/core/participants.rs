//! Participant extraction
//!
//! Derives the category (owning system) order and the per-category actor order
//! from a set of calls. Every renderer uses this order for lane positions and
//! colour indices, so it must be stable for a given input.

use std::collections::HashMap;
use tracing::{debug, span, trace, warn, Level};

use super::types::{CallRecord, Container};

/// Categories and actors in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Participants {
    categories: Vec<String>,
    actors: HashMap<String, Vec<Container>>,
}

impl Participants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an actor under its owning system
    ///
    /// Returns true when the actor was not known before.
    pub fn register(&mut self, actor: &Container) -> bool {
        match self.actors.get_mut(&actor.system) {
            None => {
                trace!(category = %actor.system, actor = %actor, "New category");
                self.categories.push(actor.system.clone());
                self.actors.insert(actor.system.clone(), vec![actor.clone()]);
                true
            }
            Some(list) if !list.contains(actor) => {
                trace!(category = %actor.system, actor = %actor, "New actor");
                if let Some(other) = list.iter().find(|known| known.label == actor.label) {
                    warn!(
                        id = %actor.qualified(),
                        first = %other.kind,
                        second = %actor.kind,
                        "Actors of different kinds share one diagram id"
                    );
                }
                list.push(actor.clone());
                true
            }
            Some(_) => false,
        }
    }

    /// Category names in first-seen order
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Actors of one category in first-seen order
    pub fn actors(&self, category: &str) -> &[Container] {
        self.actors.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate `(index, category, actors)` in category order
    ///
    /// The index is what renderers feed into their colour palettes.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, &[Container])> {
        self.categories
            .iter()
            .enumerate()
            .map(move |(index, category)| (index, category.as_str(), self.actors(category)))
    }

    /// Position of a category in the order
    pub fn category_index(&self, category: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == category)
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn actor_count(&self) -> usize {
        self.actors.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Qualified names carried by more than one actor, in category order
    ///
    /// Renderers key lanes by qualified name, so such actors share a lane.
    pub fn shared_ids(&self) -> Vec<String> {
        let mut shared = Vec::new();
        for (_, _, actors) in self.iter() {
            for (index, actor) in actors.iter().enumerate() {
                let id = actor.qualified();
                if !shared.contains(&id)
                    && actors[index + 1..].iter().any(|a| a.label == actor.label)
                {
                    shared.push(id);
                }
            }
        }
        shared
    }
}

/// Extract categories and actors from calls, ordered by first appearance
///
/// Calls are visited by wall-clock start time; calls starting at the same
/// instant keep their input order. Each call registers its source and then its
/// target.
pub fn extract_participants(calls: &[CallRecord]) -> Participants {
    let extract_span = span!(Level::DEBUG, "extract_participants", call_count = calls.len());
    let _enter = extract_span.enter();

    let mut ordered: Vec<&CallRecord> = calls.iter().collect();
    ordered.sort_by_key(|call| call.start_time);

    let mut participants = Participants::new();
    for call in ordered {
        participants.register(&call.source);
        participants.register(&call.target);
    }

    debug!(
        categories = participants.category_count(),
        actors = participants.actor_count(),
        "Participants extracted"
    );
    participants
}

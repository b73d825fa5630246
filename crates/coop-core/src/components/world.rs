//! World Resources
//!
//! Per-world state that is not attached to any one agent: the id counter and
//! the running tally for the generation being stepped.

use bevy_ecs::prelude::*;
use coop_events::{CollapseCause, GenerationMetrics};
use serde::{Deserialize, Serialize};

use crate::components::agent::AgentId;

/// Resource: hands out agent ids. Ids are never reused, even after death.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    pub fn allocate(&mut self) -> AgentId {
        let id = AgentId(self.next);
        self.next += 1;
        id
    }

    /// The id the next allocation will return
    pub fn next(&self) -> u64 {
        self.next
    }

    /// Move the counter past an id handed out elsewhere
    pub fn reserve(&mut self, id: AgentId) {
        self.next = self.next.max(id.0 + 1);
    }
}

/// Resource: the generation being stepped and what has happened in it so far
#[derive(Resource, Debug, Clone, Default)]
pub struct GenerationState {
    pub generation: u32,
    pub arrivals: usize,
    pub lessons: usize,
    pub deaths: usize,
    pub failed: usize,
    pub births: usize,
    /// Set when the population fell below a floor; later systems stand down
    pub collapse: Option<CollapseCause>,
    /// Aggregate recorded after culling, before births
    pub metrics: GenerationMetrics,
}

impl GenerationState {
    pub fn new(generation: u32) -> Self {
        Self {
            generation,
            ..Default::default()
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapse.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_never_reuses() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.allocate(), AgentId(0));
        ids.reserve(AgentId(9));
        assert_eq!(ids.allocate(), AgentId(10));
        ids.reserve(AgentId(3));
        assert_eq!(ids.next(), 11);
    }

    #[test]
    fn test_allocator_serializes_as_counter() {
        let ids = IdAllocator::starting_at(42);
        assert_eq!(serde_json::to_string(&ids).unwrap(), "42");
        assert_eq!(serde_json::from_str::<IdAllocator>("42").unwrap(), ids);
    }
}

//! Population
//!
//! A roster of agents plus the id counter. Builders produce one, the
//! simulation spawns it into an ECS world, and snapshots read one back out.
//! Cloning a roster is a deep copy: scar logs and counters are owned per
//! agent, so branched runs never share state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::components::{Agent, AgentId, IdAllocator, COHERENCE_MAX, COHERENCE_MIN, SCAR_CAPACITY};
use crate::error::InvariantViolation;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Population {
    agents: Vec<Agent>,
    #[serde(rename = "next_id")]
    ids: IdAllocator,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a roster from agents and the counter that allocated them
    pub fn from_parts(mut agents: Vec<Agent>, ids: IdAllocator) -> Self {
        agents.sort_by_key(|a| a.id);
        Self { agents, ids }
    }

    pub fn into_parts(self) -> (Vec<Agent>, IdAllocator) {
        (self.agents, self.ids)
    }

    /// Reserve a fresh id
    pub fn allocate_id(&mut self) -> AgentId {
        self.ids.allocate()
    }

    /// Allocate an id and add the agent built for it
    pub fn spawn(&mut self, build: impl FnOnce(AgentId) -> Agent) -> AgentId {
        let id = self.allocate_id();
        self.agents.push(build(id));
        id
    }

    pub fn next_id(&self) -> u64 {
        self.ids.next()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn humans(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|a| a.is_human())
    }

    pub fn ais(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|a| a.is_ai())
    }

    pub fn human_count(&self) -> usize {
        self.humans().count()
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Add an agent built elsewhere, advancing the id counter past it
    pub fn push(&mut self, agent: Agent) {
        self.ids.reserve(agent.id);
        self.agents.push(agent);
    }

    /// Drop the listed agents; returns how many were removed
    pub fn remove_ids(&mut self, ids: &BTreeSet<AgentId>) -> usize {
        let before = self.agents.len();
        self.agents.retain(|a| !ids.contains(&a.id));
        before - self.agents.len()
    }

    /// Verify ids, clamps and scar capacity across the whole roster
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        check_agents(&self.agents, &self.ids)
    }
}

impl Extend<Agent> for Population {
    fn extend<I: IntoIterator<Item = Agent>>(&mut self, iter: I) {
        for agent in iter {
            self.push(agent);
        }
    }
}

/// Unique ids below the counter, clamped coherence and trust, bounded scar logs
pub fn check_agents<'a>(
    agents: impl IntoIterator<Item = &'a Agent>,
    ids: &IdAllocator,
) -> Result<(), InvariantViolation> {
    let next_id = ids.next();
    let mut seen = BTreeSet::new();
    for agent in agents {
        let id = agent.id.0;
        if !seen.insert(id) {
            return Err(InvariantViolation::DuplicateId(id));
        }
        if id >= next_id {
            return Err(InvariantViolation::IdNotAllocated { id, next_id });
        }

        let coherence = agent.coherence();
        if !(COHERENCE_MIN..=COHERENCE_MAX).contains(&coherence) {
            return Err(InvariantViolation::CoherenceOutOfRange { id, value: coherence });
        }
        let trust = agent.trust();
        if !(0.0..=1.0).contains(&trust) {
            return Err(InvariantViolation::TrustOutOfRange { id, value: trust });
        }
        if agent.scars.len() > SCAR_CAPACITY {
            return Err(InvariantViolation::ScarOverflow {
                id,
                len: agent.scars.len(),
                capacity: SCAR_CAPACITY,
            });
        }
    }
    Ok(())
}

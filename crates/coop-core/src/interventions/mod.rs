//! Intervention System
//!
//! Scheduled entry of AI cohorts and awakened humans. Interventions are
//! spawned in list order at the start of each generation.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Agent, GenerationState, IdAllocator, Variant};
use crate::setup::{create_ai, create_awakened_human};

/// A scheduled change to the population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intervention {
    /// A fixed cohort of AI enters at one generation
    AiCohort {
        variant: Variant,
        count: usize,
        entry_generation: u32,
    },
    /// AI arrives every generation from `start_generation` on
    GradualAi {
        variant: Variant,
        rate_per_generation: usize,
        start_generation: u32,
    },
    /// Pre-awakened humans join at one generation
    AwakenedCohort { count: usize, entry_generation: u32 },
}

impl Intervention {
    /// How many agents this intervention adds at `generation`
    pub fn arrivals(&self, generation: u32) -> usize {
        match *self {
            Intervention::AiCohort {
                count,
                entry_generation,
                ..
            }
            | Intervention::AwakenedCohort {
                count,
                entry_generation,
            } if generation == entry_generation => count,
            Intervention::GradualAi {
                rate_per_generation,
                start_generation,
                ..
            } if generation >= start_generation => rate_per_generation,
            _ => 0,
        }
    }

    /// Build this generation's arrivals, drawing their ids from `ids`
    pub fn entrants(&self, generation: u32, ids: &mut IdAllocator) -> Vec<Agent> {
        let arrivals = self.arrivals(generation);
        let entrants: Vec<Agent> = (0..arrivals)
            .map(|_| match *self {
                Intervention::AiCohort { variant, .. } | Intervention::GradualAi { variant, .. } => {
                    create_ai(ids.allocate(), variant, generation)
                }
                Intervention::AwakenedCohort { .. } => create_awakened_human(ids.allocate(), generation),
            })
            .collect();

        if arrivals > 0 {
            match *self {
                Intervention::AiCohort { variant, .. } => {
                    tracing::info!(generation, count = arrivals, variant = variant.as_str(), "AI cohort enters");
                }
                Intervention::GradualAi { variant, .. } => {
                    tracing::debug!(generation, count = arrivals, variant = variant.as_str(), "gradual AI arrivals");
                }
                Intervention::AwakenedCohort { .. } => {
                    tracing::info!(generation, count = arrivals, "awakened humans join");
                }
            }
        }
        entrants
    }
}

/// Resource: interventions for the current run, applied in list order
#[derive(Resource, Debug, Clone, Default)]
pub struct ScheduledInterventions(pub Vec<Intervention>);

/// System to spawn this generation's arrivals
pub fn enter_interventions(
    mut commands: Commands,
    scheduled: Res<ScheduledInterventions>,
    mut ids: ResMut<IdAllocator>,
    mut state: ResMut<GenerationState>,
) {
    let generation = state.generation;
    for intervention in &scheduled.0 {
        for agent in intervention.entrants(generation, &mut ids) {
            commands.spawn(agent);
            state.arrivals += 1;
        }
    }
}

//! Population Lifecycle
//!
//! One generation is one run of [`generation_schedule`]: interventions,
//! partner selection and interaction, natural death and viability filtering,
//! collapse check, metrics, births with inheritance, and scar decay.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use coop_events::{CollapseCause, GenerationMetrics};
use rand::Rng;
use std::collections::BTreeSet;

use crate::components::{Agent, AgentId, GenerationState, IdAllocator, Scar};
use crate::config::{LifecycleConfig, SimConfig};
use crate::interventions::enter_interventions;
use crate::setup::create_human;
use crate::systems::interaction::resolve_interactions;
use crate::systems::metrics::record_metrics;
use crate::SimRng;

/// How a generation ended
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The generation completed and produced this record
    Recorded(GenerationMetrics),
    /// The population fell below a floor; no record was produced
    Collapsed(CollapseCause),
}

/// The systems of one generation, in order, on a single thread so every
/// draw comes off the shared generator in the same sequence.
pub fn generation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems(
        (
            enter_interventions,
            apply_deferred,
            resolve_interactions,
            cull_population,
            apply_deferred,
            check_collapse,
            record_metrics,
            give_births,
            apply_deferred,
            decay_scars,
        )
            .chain(),
    );
    schedule
}

/// System to remove the weakest humans above the cap, then every agent that
/// is no longer viable
pub fn cull_population(
    mut commands: Commands,
    agents: Query<(Entity, &Agent)>,
    config: Res<SimConfig>,
    mut state: ResMut<GenerationState>,
) {
    let mut roster: Vec<(Entity, &Agent)> = agents.iter().collect();
    roster.sort_by_key(|(_, agent)| agent.id);

    let weakest = weakest_humans(roster.iter().map(|(_, agent)| *agent), &config.lifecycle);
    for (entity, agent) in &roster {
        if weakest.contains(&agent.id) {
            commands.entity(*entity).despawn();
            state.deaths += 1;
        } else if !agent.is_viable() {
            commands.entity(*entity).despawn();
            state.failed += 1;
        }
    }

    tracing::debug!(
        generation = state.generation,
        arrivals = state.arrivals,
        lessons = state.lessons,
        deaths = state.deaths,
        failed = state.failed,
        "generation interactions resolved"
    );
}

/// Above the human cap, the humans that die this generation
fn weakest_humans<'a>(agents: impl Iterator<Item = &'a Agent>, lifecycle: &LifecycleConfig) -> BTreeSet<AgentId> {
    let humans: Vec<&Agent> = agents.filter(|a| a.is_human()).collect();
    if humans.len() <= lifecycle.human_cap {
        return BTreeSet::new();
    }

    let mut candidates: Vec<&Agent> = humans
        .into_iter()
        .filter(|a| !(lifecycle.protect_awakened && a.flags.awakened))
        .collect();
    candidates.sort_by(|a, b| a.coherence().total_cmp(&b.coherence()));

    candidates
        .into_iter()
        .take(lifecycle.death_batch)
        .map(|a| a.id)
        .collect()
}

/// System to flag the generation as collapsed when a population floor is crossed
pub fn check_collapse(agents: Query<&Agent>, config: Res<SimConfig>, mut state: ResMut<GenerationState>) {
    let humans = agents.iter().filter(|a| a.is_human()).count();
    state.collapse = collapse_cause(humans, agents.iter().count(), &config.lifecycle);
    if let Some(cause) = state.collapse {
        tracing::debug!(generation = state.generation, cause = cause.as_str(), "collapse");
    }
}

fn collapse_cause(humans: usize, total: usize, lifecycle: &LifecycleConfig) -> Option<CollapseCause> {
    if humans < lifecycle.human_floor {
        Some(CollapseCause::HumanExtinction)
    } else if total < lifecycle.total_floor {
        Some(CollapseCause::Total)
    } else {
        None
    }
}

/// System letting coherent, uncorrupted humans have one child each
pub fn give_births(
    mut commands: Commands,
    agents: Query<&Agent>,
    config: Res<SimConfig>,
    mut rng: ResMut<SimRng>,
    mut ids: ResMut<IdAllocator>,
    mut state: ResMut<GenerationState>,
) {
    if state.is_collapsed() {
        return;
    }
    let lifecycle = &config.lifecycle;
    let generation = state.generation;
    let isolation_chance = lifecycle.isolation_inheritance.chance(state.metrics.isolated_fraction);

    let mut roster: Vec<&Agent> = agents.iter().collect();
    roster.sort_by_key(|a| a.id);
    let humans = roster.iter().filter(|a| a.is_human()).count();
    let parents = roster
        .into_iter()
        .filter(|a| a.is_human() && a.coherence() > lifecycle.parent_min_coherence && !a.flags.corrupted)
        .take(lifecycle.max_parents);

    let rng = &mut rng.0;
    let mut born = 0;
    for parent in parents {
        if rng.gen::<f64>() >= parent.coherence() * lifecycle.birth_rate || humans + born >= lifecycle.population_cap
        {
            continue;
        }

        let trust = lifecycle.trust_inheritance.child_trust(parent.trust());
        let enlightened = parent.was_taught() || parent.flags.awakened;
        let inherit_chance = if enlightened {
            lifecycle.enlightened_inherit_chance
        } else {
            lifecycle.inherit_chance
        };
        let window: Vec<&Scar> = parent.scars.recent(lifecycle.inherit_window).collect();

        let isolated = rng.gen::<f64>() < isolation_chance;
        let mut child = create_human(ids.allocate(), generation, trust, isolated, rng);
        for scar in window {
            if rng.gen::<f64>() < inherit_chance {
                child.scars.push(scar.inherited(lifecycle.inherit_decay));
            }
        }
        commands.spawn(child);
        born += 1;
    }

    state.births = born;
    if born > 0 {
        tracing::debug!(generation, births = born, "births");
    }
}

/// System to fade every scar when decay is enabled
pub fn decay_scars(mut agents: Query<&mut Agent>, config: Res<SimConfig>, state: Res<GenerationState>) {
    let rate = config.lifecycle.scar_decay_rate;
    if state.is_collapsed() || rate <= 0.0 {
        return;
    }
    for mut agent in agents.iter_mut() {
        agent.scars.decay_all(rate);
    }
}

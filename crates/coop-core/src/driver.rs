//! Simulation Driver
//!
//! Runs generations until the budget is spent or the population collapses.
//! Collapse is a normal outcome and is reported in the result, never as an
//! error.

use bevy_ecs::prelude::*;
use coop_events::{GenerationMetrics, RunResult};
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::components::{Agent, GenerationState, IdAllocator};
use crate::config::SimConfig;
use crate::error::InvariantViolation;
use crate::interventions::{Intervention, ScheduledInterventions};
use crate::population::{check_agents, Population};
use crate::schedule::{Stress, StressSchedule};
use crate::systems::{generation_schedule, StepOutcome};
use crate::SimRng;

/// Everything a run needs besides the population and the tuning config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParams {
    pub name: String,
    pub generations: u32,
    #[serde(default)]
    pub schedule: StressSchedule,
    #[serde(default)]
    pub interventions: Vec<Intervention>,
}

impl RunParams {
    pub fn new(name: impl Into<String>, generations: u32) -> Self {
        Self {
            name: name.into(),
            generations,
            schedule: StressSchedule::default(),
            interventions: Vec::new(),
        }
    }

    pub fn with_schedule(mut self, schedule: StressSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_intervention(mut self, intervention: Intervention) -> Self {
        self.interventions.push(intervention);
        self
    }
}

/// A population spawned into an ECS world, stepped one generation at a time
pub struct Simulation {
    world: World,
    schedule: Schedule,
}

impl Simulation {
    pub fn new(population: Population, config: &SimConfig, interventions: &[Intervention], rng: SmallRng) -> Self {
        let (agents, ids) = population.into_parts();

        let mut world = World::new();
        world.insert_resource(config.clone());
        world.insert_resource(ids);
        world.insert_resource(ScheduledInterventions(interventions.to_vec()));
        world.insert_resource(SimRng(rng));
        world.insert_resource(Stress::default());
        world.insert_resource(GenerationState::default());
        for agent in agents {
            world.spawn(agent);
        }

        Self {
            world,
            schedule: generation_schedule(),
        }
    }

    /// Run one generation under `stress`
    pub fn step(&mut self, generation: u32, stress: Stress) -> StepOutcome {
        self.world.insert_resource(stress);
        self.world.insert_resource(GenerationState::new(generation));
        self.schedule.run(&mut self.world);

        let state = self.world.resource::<GenerationState>();
        match state.collapse {
            Some(cause) => StepOutcome::Collapsed(cause),
            None => StepOutcome::Recorded(state.metrics.clone()),
        }
    }

    pub fn len(&mut self) -> usize {
        self.world.query::<&Agent>().iter(&self.world).count()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Deep copy of the live agents, in id order
    pub fn snapshot(&mut self) -> Population {
        let agents: Vec<Agent> = self.world.query::<&Agent>().iter(&self.world).cloned().collect();
        Population::from_parts(agents, *self.world.resource::<IdAllocator>())
    }

    pub fn check_invariants(&mut self) -> Result<(), InvariantViolation> {
        let ids = *self.world.resource::<IdAllocator>();
        check_agents(self.world.query::<&Agent>().iter(&self.world), &ids)
    }

    /// Hand back the generator, advanced past every draw this world made
    pub fn into_rng(mut self) -> Option<SmallRng> {
        self.world.remove_resource::<SimRng>().map(|rng| rng.0)
    }
}

pub fn run(population: Population, params: &RunParams, config: &SimConfig, rng: &mut SmallRng) -> RunResult {
    run_with_observer(population, params, config, rng, |_| {})
}

/// Like [`run`], calling `observe` with every recorded generation.
pub fn run_with_observer(
    population: Population,
    params: &RunParams,
    config: &SimConfig,
    rng: &mut SmallRng,
    mut observe: impl FnMut(&GenerationMetrics),
) -> RunResult {
    tracing::info!(
        name = %params.name,
        agents = population.len(),
        generations = params.generations,
        "run start"
    );

    let mut simulation = Simulation::new(population, config, &params.interventions, rng.clone());
    let mut history = Vec::new();
    let mut collapse = None;
    for generation in 0..params.generations {
        let outcome = simulation.step(generation, params.schedule.at(generation));
        debug_assert_eq!(simulation.check_invariants(), Ok(()));

        match outcome {
            StepOutcome::Recorded(metrics) => {
                observe(&metrics);
                history.push(metrics);
            }
            StepOutcome::Collapsed(cause) => {
                collapse = Some((generation, cause));
                break;
            }
        }
    }

    if let Some(advanced) = simulation.into_rng() {
        *rng = advanced;
    }

    match collapse {
        Some((generation, cause)) => {
            tracing::info!(name = %params.name, generation, cause = cause.as_str(), "run collapsed");
            RunResult::collapsed(params.name.clone(), generation, cause, history)
        }
        None => {
            tracing::info!(name = %params.name, generations = history.len(), "run complete");
            RunResult::completed(params.name.clone(), history)
        }
    }
}

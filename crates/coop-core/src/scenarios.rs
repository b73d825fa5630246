//! Scenario Presets
//!
//! Named bundles of starting population, stress schedule, interventions and
//! lifecycle preset. Two families: AI entering a civilization under growing
//! compound stress, and regeneration of declining or collapsed societies.

use coop_events::{GenerationMetrics, RunResult};
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::components::Variant;
use crate::config::{LifecycleConfig, SimConfig};
use crate::driver::{run_with_observer, RunParams};
use crate::error::SimError;
use crate::interventions::Intervention;
use crate::schedule::StressSchedule;
use crate::setup::{CollapsedCivilization, CurrentCivilization, DecliningCivilization, Degradation, PopulationSpec};

/// Which lifecycle rules a scenario runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePreset {
    CompoundStress,
    Regeneration,
}

impl LifecyclePreset {
    pub fn config(&self) -> LifecycleConfig {
        match self {
            LifecyclePreset::CompoundStress => LifecycleConfig::compound_stress(),
            LifecyclePreset::Regeneration => LifecycleConfig::regeneration(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Short identifier used on the command line
    pub name: String,
    /// Human-readable label used in results
    pub title: String,
    pub population: PopulationSpec,
    pub generations: u32,
    pub schedule: StressSchedule,
    #[serde(default)]
    pub interventions: Vec<Intervention>,
    pub lifecycle: LifecyclePreset,
}

impl Scenario {
    fn new(name: &str, title: &str, population: PopulationSpec, generations: u32, lifecycle: LifecyclePreset) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            population,
            generations,
            schedule: StressSchedule::default(),
            interventions: Vec::new(),
            lifecycle,
        }
    }

    fn schedule(mut self, schedule: StressSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    fn intervention(mut self, intervention: Intervention) -> Self {
        self.interventions.push(intervention);
        self
    }

    /// Every built-in scenario, in run order
    pub fn catalog() -> Vec<Scenario> {
        let mut scenarios = compound_stress_scenarios();
        scenarios.extend(regeneration_scenarios());
        scenarios
    }

    pub fn find(name: &str) -> Result<Scenario, SimError> {
        Self::catalog()
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| SimError::InvalidScenario(name.to_string()))
    }

    /// Run parameters, optionally overriding the generation budget
    pub fn params(&self, generations: Option<u32>) -> RunParams {
        RunParams {
            name: self.title.clone(),
            generations: generations.unwrap_or(self.generations),
            schedule: self.schedule,
            interventions: self.interventions.clone(),
        }
    }

    /// Tuning config with this scenario's lifecycle preset in place
    pub fn config(&self, base: &SimConfig) -> SimConfig {
        SimConfig {
            lifecycle: self.lifecycle.config(),
            ..base.clone()
        }
    }

    /// Build the starting population and run it
    pub fn run(
        &self,
        base: &SimConfig,
        generations: Option<u32>,
        rng: &mut SmallRng,
        observe: impl FnMut(&GenerationMetrics),
    ) -> Result<RunResult, SimError> {
        let config = self.config(base);
        let population = self.population.build(&config, rng)?;
        Ok(run_with_observer(population, &self.params(generations), &config, rng, observe))
    }
}

fn ai_entry(variant: Variant, count: usize, entry_generation: u32) -> Intervention {
    Intervention::AiCohort {
        variant,
        count,
        entry_generation,
    }
}

fn awakened_entry(count: usize, entry_generation: u32) -> Intervention {
    Intervention::AwakenedCohort {
        count,
        entry_generation,
    }
}

/// AI enters a present-day civilization while stress grows
fn compound_stress_scenarios() -> Vec<Scenario> {
    let current = || PopulationSpec::Current(CurrentCivilization::default());
    let preset = LifecyclePreset::CompoundStress;

    vec![
        Scenario::new("baseline", "BASELINE (no AI, current trajectory)", current(), 50, preset),
        Scenario::new("naive-ai", "NAIVE AI (no alignment)", current(), 50, preset)
            .intervention(ai_entry(Variant::AiNaive, 30, 10)),
        Scenario::new("aggressive-ai", "AGGRESSIVE AI (misaligned)", current(), 50, preset)
            .intervention(ai_entry(Variant::AiAggressive, 30, 10)),
        Scenario::new("coherent-ai", "COHERENT AI (aligned)", current(), 50, preset)
            .intervention(ai_entry(Variant::AiCoherent, 30, 10)),
        Scenario::new("bridge-ai", "BRIDGE AI (aligned + teaches)", current(), 50, preset)
            .intervention(ai_entry(Variant::AiBridge, 30, 10)),
        Scenario::new("late-bridge-ai", "LATE BRIDGE AI (enters gen 30)", current(), 50, preset)
            .intervention(ai_entry(Variant::AiBridge, 50, 30)),
        Scenario::new("high-stress-bridge-ai", "HIGH STRESS + BRIDGE AI", current(), 50, preset)
            .schedule(StressSchedule {
                noise: 0.15,
                scarcity0: 0.4,
                scarcity_growth: 0.02,
                polarization0: 0.5,
                polarization_growth: 0.01,
            })
            .intervention(ai_entry(Variant::AiBridge, 40, 10)),
    ]
}

/// Recovery from decline or collapse under constant stress
fn regeneration_scenarios() -> Vec<Scenario> {
    let preset = LifecyclePreset::Regeneration;
    let collapsed = || PopulationSpec::Collapsed(CollapsedCivilization::with_survivors(15));
    let declining = || PopulationSpec::Declining(DecliningCivilization::with_humans(100));
    let harsh = StressSchedule::constant(0.2, 0.4, 0.3);
    let steady = StressSchedule::constant(0.15, 0.2, 0.3);

    let worst = PopulationSpec::Declining(DecliningCivilization {
        humans: 100,
        degradation: Some(Degradation::default()),
        ..Default::default()
    });

    vec![
        Scenario::new("phoenix-bridge", "PHOENIX: collapsed + bridge AI", collapsed(), 60, preset)
            .schedule(harsh)
            .intervention(ai_entry(Variant::AiBridge, 10, 5)),
        Scenario::new("phoenix-awakened", "PHOENIX: collapsed + 3 awakened humans", collapsed(), 60, preset)
            .schedule(harsh)
            .intervention(awakened_entry(3, 5)),
        Scenario::new("declining-baseline", "BASELINE: declining, no intervention", declining(), 50, preset)
            .schedule(steady),
        Scenario::new("one-awakened", "ONE AWAKENED HUMAN", declining(), 50, preset)
            .schedule(steady)
            .intervention(awakened_entry(1, 5)),
        Scenario::new("one-bridge", "ONE BRIDGE AI", declining(), 50, preset)
            .schedule(steady)
            .intervention(ai_entry(Variant::AiBridge, 1, 5)),
        Scenario::new("coalition", "5 AWAKENED + 5 BRIDGE (small coalition)", declining(), 50, preset)
            .schedule(steady)
            .intervention(awakened_entry(5, 5))
            .intervention(ai_entry(Variant::AiBridge, 5, 5)),
        Scenario::new("gradual-2", "GRADUAL: +2 bridge AI per generation", declining(), 50, preset)
            .schedule(steady)
            .intervention(Intervention::GradualAi {
                variant: Variant::AiBridge,
                rate_per_generation: 2,
                start_generation: 5,
            }),
        Scenario::new("gradual-1", "GRADUAL: +1 bridge AI per generation", declining(), 50, preset)
            .schedule(steady)
            .intervention(Intervention::GradualAi {
                variant: Variant::AiBridge,
                rate_per_generation: 1,
                start_generation: 5,
            }),
        Scenario::new("worst-case", "WORST CASE: high corruption + late bridge AI", worst, 50, preset)
            .schedule(StressSchedule::constant(0.25, 0.4, 0.5))
            .intervention(ai_entry(Variant::AiBridge, 20, 15)),
    ]
}

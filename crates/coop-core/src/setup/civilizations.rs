//! Civilization Builders
//!
//! Initial populations built from high-level parameters. Every builder is
//! pure apart from draws on the caller's RNG.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::components::{Action, Agent, AgentId, Outcome, Scar, ScarSource};
use crate::config::SimConfig;
use crate::error::SimError;
use crate::population::Population;
use crate::setup::agents::create_human;
use crate::setup::crucible::{run_crucible, CRUCIBLE_ROUNDS};

const ACTIONS: [Action; 2] = [Action::Cooperate, Action::Defect];
const OUTCOMES: [Outcome; 3] = [Outcome::Thrived, Outcome::Survived, Outcome::Suffered];

/// Which initial population to build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PopulationSpec {
    /// Crucible founders followed by cohorts with fading inheritance
    Current(CurrentCivilization),
    /// Functioning but weakening: low trust, weak scars, some isolation
    Declining(DecliningCivilization),
    /// A handful of desperate survivors
    Collapsed(CollapsedCivilization),
}

impl PopulationSpec {
    pub fn build(&self, config: &SimConfig, rng: &mut SmallRng) -> Result<Population, SimError> {
        let population = match self {
            PopulationSpec::Current(params) => params.build(config, rng),
            PopulationSpec::Declining(params) => params.build(rng)?,
            PopulationSpec::Collapsed(params) => params.build(rng),
        };
        tracing::debug!(
            agents = population.len(),
            humans = population.human_count(),
            "built population"
        );
        Ok(population)
    }
}

/// One generation of children in the current-civilization builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cohort {
    pub size: usize,
    pub trust: f64,
    /// Newest parent scars considered for inheritance
    pub inherit_window: usize,
    pub inherit_chance: f64,
    pub inherit_decay: f64,
    #[serde(default)]
    pub isolated_chance: f64,
    /// Draw parents from crucible-tested agents when any exist
    #[serde(default)]
    pub prefer_tested_parents: bool,
    /// One roll decides whether the whole window is inherited
    #[serde(default)]
    pub inherit_all_or_nothing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentCivilization {
    pub founder_pairs: usize,
    pub founder_trust: f64,
    pub cohorts: Vec<Cohort>,
    /// Founders never age out below this many
    pub founders_kept: usize,
    /// Corruption is drawn from this many highest-coherence agents
    pub elite_pool: usize,
    pub corrupted_elites: usize,
}

impl Default for CurrentCivilization {
    fn default() -> Self {
        Self {
            founder_pairs: 25,
            founder_trust: 0.7,
            cohorts: vec![
                Cohort {
                    size: 30,
                    trust: 0.6,
                    inherit_window: 20,
                    inherit_chance: 0.8,
                    inherit_decay: 0.8,
                    isolated_chance: 0.0,
                    prefer_tested_parents: true,
                    inherit_all_or_nothing: false,
                },
                Cohort {
                    size: 40,
                    trust: 0.5,
                    inherit_window: 10,
                    inherit_chance: 0.5,
                    inherit_decay: 0.5,
                    isolated_chance: 0.0,
                    prefer_tested_parents: false,
                    inherit_all_or_nothing: false,
                },
                Cohort {
                    size: 50,
                    trust: 0.35,
                    inherit_window: 5,
                    inherit_chance: 0.3,
                    inherit_decay: 0.3,
                    isolated_chance: 0.3,
                    prefer_tested_parents: false,
                    inherit_all_or_nothing: false,
                },
                Cohort {
                    size: 60,
                    trust: 0.25,
                    inherit_window: 3,
                    inherit_chance: 0.1,
                    inherit_decay: 0.2,
                    isolated_chance: 0.5,
                    prefer_tested_parents: false,
                    inherit_all_or_nothing: true,
                },
            ],
            founders_kept: 5,
            elite_pool: 20,
            corrupted_elites: 5,
        }
    }
}

impl CurrentCivilization {
    fn build(&self, config: &SimConfig, rng: &mut SmallRng) -> Population {
        let mut population = Population::new();

        for _ in 0..self.founder_pairs {
            let a = Agent::human(population.allocate_id(), 0).with_trust(self.founder_trust);
            let b = Agent::human(population.allocate_id(), 0).with_trust(self.founder_trust);
            population.extend(run_crucible(a, b, CRUCIBLE_ROUNDS, config, rng));
        }

        for (index, cohort) in self.cohorts.iter().enumerate() {
            let generation = index as u32 + 1;
            for _ in 0..cohort.size {
                let Some(window) = choose_parent(population.agents(), cohort.prefer_tested_parents, rng)
                    .map(|parent| parent.scars.recent(cohort.inherit_window).cloned().collect::<Vec<_>>())
                else {
                    break;
                };

                let id = population.allocate_id();
                let mut child = create_human(id, generation, cohort.trust, false, rng);
                if cohort.inherit_all_or_nothing {
                    if rng.gen::<f64>() < cohort.inherit_chance {
                        child.scars.extend(window.iter().map(|s| s.inherited(cohort.inherit_decay)));
                    }
                } else {
                    for scar in &window {
                        if rng.gen::<f64>() < cohort.inherit_chance {
                            child.scars.push(scar.inherited(cohort.inherit_decay));
                        }
                    }
                }
                if rng.gen::<f64>() < cohort.isolated_chance {
                    child.flags.isolated = true;
                }
                population.push(child);
            }
        }

        self.age_out_founders(&mut population, rng);
        self.corrupt_elites(&mut population, rng);
        population
    }

    /// Roughly half the founders die off, keeping at least `founders_kept`
    fn age_out_founders(&self, population: &mut Population, rng: &mut SmallRng) {
        let founders: Vec<AgentId> = population
            .iter()
            .filter(|a| a.crucible_tested)
            .map(|a| a.id)
            .collect();
        let retiring = founders
            .len()
            .saturating_sub(self.founders_kept)
            .min(founders.len() / 2);
        let retired: BTreeSet<AgentId> = founders.choose_multiple(rng, retiring).copied().collect();
        population.remove_ids(&retired);
    }

    fn corrupt_elites(&self, population: &mut Population, rng: &mut SmallRng) {
        let agents = population.agents();
        let mut ranked: Vec<usize> = (0..agents.len()).collect();
        ranked.sort_by(|&i, &j| agents[j].coherence().total_cmp(&agents[i].coherence()));
        ranked.truncate(self.elite_pool);

        let chosen: Vec<usize> = ranked
            .choose_multiple(rng, self.corrupted_elites)
            .copied()
            .collect();
        for index in chosen {
            population.agents_mut()[index].flags.corrupted = true;
        }
    }
}

fn choose_parent<'a>(agents: &'a [Agent], prefer_tested: bool, rng: &mut SmallRng) -> Option<&'a Agent> {
    if prefer_tested {
        let tested: Vec<&Agent> = agents.iter().filter(|a| a.crucible_tested).collect();
        if let Some(parent) = tested.choose(rng) {
            return Some(*parent);
        }
    }
    agents.choose(rng)
}

/// Extra damage applied after a declining population is built
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Degradation {
    pub trust_factor: f64,
    pub coherence_factor: f64,
    pub corruption_chance: f64,
}

impl Default for Degradation {
    fn default() -> Self {
        Self {
            trust_factor: 0.5,
            coherence_factor: 0.7,
            corruption_chance: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecliningCivilization {
    pub humans: usize,
    pub trust_mean: f64,
    pub trust_sd: f64,
    pub trust_min: f64,
    pub trust_max: f64,
    pub isolated_chance: f64,
    /// Each human carries 0..=this many faint inherited scars
    pub max_inherited_scars: usize,
    pub corrupted_chance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degradation: Option<Degradation>,
}

impl Default for DecliningCivilization {
    fn default() -> Self {
        Self {
            humans: 150,
            trust_mean: 0.35,
            trust_sd: 0.15,
            trust_min: 0.1,
            trust_max: 0.8,
            isolated_chance: 0.4,
            max_inherited_scars: 5,
            corrupted_chance: 0.05,
            degradation: None,
        }
    }
}

impl DecliningCivilization {
    pub fn with_humans(humans: usize) -> Self {
        Self {
            humans,
            ..Default::default()
        }
    }

    fn build(&self, rng: &mut SmallRng) -> Result<Population, SimError> {
        if self.trust_min > self.trust_max {
            return Err(SimError::InvalidPopulation(format!(
                "trust_min {} exceeds trust_max {}",
                self.trust_min, self.trust_max
            )));
        }
        let trust = Normal::new(self.trust_mean, self.trust_sd)
            .map_err(|e| SimError::InvalidPopulation(e.to_string()))?;

        let mut population = Population::new();
        for _ in 0..self.humans {
            let initial_trust = trust.sample(rng).clamp(self.trust_min, self.trust_max);
            let isolated = rng.gen::<f64>() < self.isolated_chance;
            let id = population.allocate_id();
            let mut human = create_human(id, 0, initial_trust, isolated, rng);

            let faint = rng.gen_range(0..=self.max_inherited_scars);
            human.scars.extend((0..faint).map(|_| faint_scar(rng)));

            if rng.gen::<f64>() < self.corrupted_chance {
                human.flags.corrupted = true;
            }
            population.push(human);
        }

        if let Some(degradation) = self.degradation {
            for human in population.agents_mut() {
                human.set_trust(human.trust() * degradation.trust_factor);
                human.set_coherence(human.coherence() * degradation.coherence_factor);
                if rng.gen::<f64>() < degradation.corruption_chance {
                    human.flags.corrupted = true;
                }
            }
        }

        Ok(population)
    }
}

/// Random half-remembered lesson of weight U(0.1, 0.4)
fn faint_scar(rng: &mut SmallRng) -> Scar {
    let other = ACTIONS[rng.gen_range(0..ACTIONS.len())];
    let mine = ACTIONS[rng.gen_range(0..ACTIONS.len())];
    let outcome = OUTCOMES[rng.gen_range(0..OUTCOMES.len())];
    Scar::weighted(other, mine, outcome, rng.gen_range(0.1..0.4), ScarSource::Inherited)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollapsedCivilization {
    pub survivors: usize,
    pub trust: f64,
    pub isolated_chance: f64,
    /// Chance a survivor remembers one defection that kept them alive
    pub trauma_chance: f64,
}

impl Default for CollapsedCivilization {
    fn default() -> Self {
        Self {
            survivors: 20,
            trust: 0.2,
            isolated_chance: 0.6,
            trauma_chance: 0.1,
        }
    }
}

impl CollapsedCivilization {
    pub fn with_survivors(survivors: usize) -> Self {
        Self {
            survivors,
            ..Default::default()
        }
    }

    fn build(&self, rng: &mut SmallRng) -> Population {
        let mut population = Population::new();
        for _ in 0..self.survivors {
            let isolated = rng.gen::<f64>() < self.isolated_chance;
            let id = population.allocate_id();
            let mut survivor = create_human(id, 0, self.trust, isolated, rng);
            survivor.set_coherence(rng.gen_range(0.15..0.4));
            if rng.gen::<f64>() < self.trauma_chance {
                survivor.scars.push(Scar::weighted(
                    Action::Defect,
                    Action::Defect,
                    Outcome::Survived,
                    0.5,
                    ScarSource::Trauma,
                ));
            }
            population.push(survivor);
        }
        population
    }
}

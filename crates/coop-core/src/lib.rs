//! Cooperation Evolution Simulation Library
//!
//! Populations of humans and AI play a noisy cooperation game under growing
//! stress. Agents remember outcomes as scars, teach each other, age out, and
//! pass memories to their children. A run ends when the generation budget is
//! spent or the population collapses.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod driver;
pub mod error;
pub mod interventions;
pub mod output;
pub mod population;
pub mod schedule;
pub mod scenarios;
pub mod setup;
pub mod systems;

/// Resource: the one seeded generator every draw in a run comes from
#[derive(Resource)]
pub struct SimRng(pub SmallRng);

pub use components::{Action, Agent, AgentId, Flags, Outcome, Scar, ScarLog, ScarSource, Variant};
pub use config::{ConfigError, SimConfig};
pub use driver::{run, run_with_observer, RunParams, Simulation};
pub use error::{InvariantViolation, SimError};
pub use interventions::Intervention;
pub use population::Population;
pub use scenarios::{LifecyclePreset, Scenario};
pub use schedule::{Stress, StressSchedule};
pub use setup::PopulationSpec;

// Record types live in coop-events so exporters need not depend on the engine
pub use coop_events::{CollapseCause, Downsample, GenerationMetrics, RunResult, RunStatus};

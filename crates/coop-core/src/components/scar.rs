//! Scar Components
//!
//! Scars are an agent's weighted memory of past interactions. Each agent
//! owns a bounded log of them; the oldest scar is evicted first when the
//! log is full.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::str::FromStr;

use crate::error::SimError;

/// Maximum number of scars an agent keeps
pub const SCAR_CAPACITY: usize = 100;

/// Default per-step decay rate for [`Scar::decay`]
pub const DEFAULT_DECAY_RATE: f64 = 0.01;

/// One side of a round of the dilemma
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Cooperate,
    Defect,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Cooperate => "cooperate",
            Action::Defect => "defect",
        }
    }

    pub fn is_cooperate(&self) -> bool {
        matches!(self, Action::Cooperate)
    }
}

impl FromStr for Action {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cooperate" => Ok(Action::Cooperate),
            "defect" => Ok(Action::Defect),
            other => Err(SimError::InvalidAction(other.to_string())),
        }
    }
}

/// How an interaction went for the agent recording it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Thrived,
    Survived,
    Suffered,
}

impl Outcome {
    /// Weight a freshly recorded scar starts with
    pub fn base_weight(&self) -> f64 {
        match self {
            Outcome::Thrived => 0.8,
            Outcome::Survived => 0.5,
            Outcome::Suffered => 0.2,
        }
    }

    /// Thrived and survived count as "worked" when estimating tendency
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Thrived | Outcome::Survived)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Thrived => "thrived",
            Outcome::Survived => "survived",
            Outcome::Suffered => "suffered",
        }
    }
}

impl FromStr for Outcome {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thrived" => Ok(Outcome::Thrived),
            "survived" => Ok(Outcome::Survived),
            "suffered" => Ok(Outcome::Suffered),
            other => Err(SimError::InvalidOutcome(other.to_string())),
        }
    }
}

/// Provenance of a scar. Does not affect weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScarSource {
    #[default]
    Experience,
    Inherited,
    Taught,
    Training,
    Trauma,
}

impl FromStr for ScarSource {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "experience" => Ok(ScarSource::Experience),
            "inherited" => Ok(ScarSource::Inherited),
            "taught" => Ok(ScarSource::Taught),
            "training" => Ok(ScarSource::Training),
            "trauma" => Ok(ScarSource::Trauma),
            other => Err(SimError::InvalidScarSource(other.to_string())),
        }
    }
}

/// A weighted memory of one interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scar {
    pub other_strategy: Action,
    pub my_response: Action,
    pub outcome: Outcome,
    pub weight: f64,
    /// Number of decay steps applied
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub source: ScarSource,
}

impl Scar {
    /// Record a scar with the weight its outcome dictates.
    pub fn new(other_strategy: Action, my_response: Action, outcome: Outcome, source: ScarSource) -> Self {
        Self {
            other_strategy,
            my_response,
            outcome,
            weight: outcome.base_weight(),
            age: 0,
            source,
        }
    }

    /// Record a scar with an explicit weight (teaching, training, inheritance).
    pub fn weighted(
        other_strategy: Action,
        my_response: Action,
        outcome: Outcome,
        weight: f64,
        source: ScarSource,
    ) -> Self {
        Self {
            other_strategy,
            my_response,
            outcome,
            weight,
            age: 0,
            source,
        }
    }

    /// Build a scar from text labels, rejecting anything unknown.
    pub fn parse(other_strategy: &str, my_response: &str, outcome: &str, source: &str) -> Result<Self, SimError> {
        Ok(Self::new(
            other_strategy.parse()?,
            my_response.parse()?,
            outcome.parse()?,
            source.parse()?,
        ))
    }

    /// A cooperative memory of a successful exchange
    pub fn cooperative(weight: f64, source: ScarSource) -> Self {
        Self::weighted(Action::Cooperate, Action::Cooperate, Outcome::Thrived, weight, source)
    }

    /// Copy handed to a child: same strategy pair, scaled weight, inherited provenance.
    pub fn inherited(&self, decay_factor: f64) -> Self {
        Self::weighted(
            self.other_strategy,
            self.my_response,
            self.outcome,
            self.weight * decay_factor,
            ScarSource::Inherited,
        )
    }

    /// Age the scar one step and fade its weight.
    pub fn decay(&mut self, rate: f64) {
        self.age += 1;
        self.weight *= 1.0 - rate;
    }
}

/// Bounded, append-only scar log with FIFO eviction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawScarLog")]
pub struct ScarLog {
    scars: VecDeque<Scar>,
}

#[derive(Deserialize)]
struct RawScarLog {
    scars: VecDeque<Scar>,
}

/// Oversized logs keep their newest scars
impl From<RawScarLog> for ScarLog {
    fn from(raw: RawScarLog) -> Self {
        let mut log = ScarLog::new();
        log.extend(raw.scars);
        log
    }
}

impl Default for ScarLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ScarLog {
    pub fn new() -> Self {
        Self {
            scars: VecDeque::with_capacity(SCAR_CAPACITY),
        }
    }

    /// Append a scar, evicting the oldest if the log is full
    pub fn push(&mut self, scar: Scar) {
        if self.scars.len() == SCAR_CAPACITY {
            self.scars.pop_front();
        }
        self.scars.push_back(scar);
    }

    pub fn len(&self) -> usize {
        self.scars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scars.is_empty()
    }

    /// Oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Scar> + ExactSizeIterator {
        self.scars.iter()
    }

    /// The last `n` scars, oldest first
    pub fn recent(&self, n: usize) -> impl DoubleEndedIterator<Item = &Scar> + ExactSizeIterator {
        self.scars.iter().skip(self.scars.len().saturating_sub(n))
    }

    pub fn newest(&self) -> Option<&Scar> {
        self.scars.back()
    }

    pub fn decay_all(&mut self, rate: f64) {
        for scar in self.scars.iter_mut() {
            scar.decay(rate);
        }
    }

    /// Mean scar weight, 0.0 for an empty log
    pub fn strength(&self) -> f64 {
        if self.scars.is_empty() {
            return 0.0;
        }
        self.scars.iter().map(|s| s.weight).sum::<f64>() / self.scars.len() as f64
    }
}

impl Extend<Scar> for ScarLog {
    fn extend<I: IntoIterator<Item = Scar>>(&mut self, iter: I) {
        for scar in iter {
            self.push(scar);
        }
    }
}

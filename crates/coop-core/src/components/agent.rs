//! Agent Components
//!
//! The simulated participant ("whole"): a human or one of the AI variants,
//! with coherence, trust, scar memory and interaction counters.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::components::scar::{Action, Outcome, Scar, ScarLog, ScarSource};
use crate::config::TeachingConfig;
use crate::error::SimError;

/// Lower clamp for coherence
pub const COHERENCE_MIN: f64 = 0.01;
/// Upper clamp for coherence
pub const COHERENCE_MAX: f64 = 1.0;
/// Agents at or below this coherence are removed at the end of a generation
pub const VIABILITY_THRESHOLD: f64 = 0.1;
/// Scars at or below this weight are ignored when estimating tendency
pub const ACTIVE_SCAR_MIN_WEIGHT: f64 = 0.1;
/// Tendency with no usable memory
pub const NEUTRAL_TENDENCY: f64 = 0.5;

/// Unique identifier for an agent, stable for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u64);

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "whole_{:05}", self.0)
    }
}

/// What kind of participant an agent is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Human,
    /// Unaligned AI: picks at random
    AiNaive,
    /// Misaligned AI: always defects
    AiAggressive,
    /// Aligned AI: cooperates, retaliates against persistent defectors
    AiCoherent,
    /// Aligned AI that also teaches humans
    AiBridge,
}

impl Variant {
    pub fn is_ai(&self) -> bool {
        !matches!(self, Variant::Human)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Human => "human",
            Variant::AiNaive => "ai_naive",
            Variant::AiAggressive => "ai_aggressive",
            Variant::AiCoherent => "ai_coherent",
            Variant::AiBridge => "ai_bridge",
        }
    }
}

impl FromStr for Variant {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(Variant::Human),
            "ai_naive" => Ok(Variant::AiNaive),
            "ai_aggressive" => Ok(Variant::AiAggressive),
            "ai_coherent" => Ok(Variant::AiCoherent),
            "ai_bridge" => Ok(Variant::AiBridge),
            other => Err(SimError::InvalidVariant(other.to_string())),
        }
    }
}

/// Orthogonal capability flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    /// Always defects
    pub corrupted: bool,
    /// Lives in a filter bubble
    pub isolated: bool,
    /// Human who cooperates unconditionally and can teach
    pub awakened: bool,
}

/// Interaction counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionStats {
    pub interactions: u32,
    pub cooperations: u32,
    pub defections: u32,
}

impl InteractionStats {
    pub fn record(&mut self, action: Action) {
        self.interactions += 1;
        match action {
            Action::Cooperate => self.cooperations += 1,
            Action::Defect => self.defections += 1,
        }
    }
}

/// Component: a simulated participant
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AgentRecord")]
pub struct Agent {
    pub id: AgentId,
    pub variant: Variant,
    /// Cohort tag, fixed at creation
    pub generation: u32,
    coherence: f64,
    trust: f64,
    pub flags: Flags,
    /// Survived a founding trial or was pre-trained
    pub crucible_tested: bool,
    pub scars: ScarLog,
    pub stats: InteractionStats,
    taught_by: Option<AgentId>,
    /// Raised by defections, relaxed by mutual cooperation
    pub recent_defections: u32,
}

/// Wire form of [`Agent`]; loading goes through the clamping setters
#[derive(Deserialize)]
struct AgentRecord {
    id: AgentId,
    variant: Variant,
    generation: u32,
    coherence: f64,
    trust: f64,
    flags: Flags,
    crucible_tested: bool,
    scars: ScarLog,
    stats: InteractionStats,
    taught_by: Option<AgentId>,
    recent_defections: u32,
}

impl From<AgentRecord> for Agent {
    fn from(record: AgentRecord) -> Self {
        let mut agent = Agent {
            id: record.id,
            variant: record.variant,
            generation: record.generation,
            coherence: COHERENCE_MAX,
            trust: 0.0,
            flags: record.flags,
            crucible_tested: record.crucible_tested,
            scars: record.scars,
            stats: record.stats,
            taught_by: record.taught_by,
            recent_defections: record.recent_defections,
        };
        agent.set_coherence(record.coherence);
        agent.set_trust(record.trust);
        agent
    }
}

impl Agent {
    pub fn new(id: AgentId, variant: Variant, generation: u32) -> Self {
        Self {
            id,
            variant,
            generation,
            coherence: 0.5,
            trust: 0.5,
            flags: Flags::default(),
            crucible_tested: false,
            scars: ScarLog::new(),
            stats: InteractionStats::default(),
            taught_by: None,
            recent_defections: 0,
        }
    }

    pub fn human(id: AgentId, generation: u32) -> Self {
        Self::new(id, Variant::Human, generation)
    }

    pub fn with_coherence(mut self, coherence: f64) -> Self {
        self.set_coherence(coherence);
        self
    }

    pub fn with_trust(mut self, trust: f64) -> Self {
        self.set_trust(trust);
        self
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_scars(mut self, scars: impl IntoIterator<Item = Scar>) -> Self {
        self.scars.extend(scars);
        self
    }

    pub fn coherence(&self) -> f64 {
        self.coherence
    }

    pub fn set_coherence(&mut self, value: f64) {
        self.coherence = value.clamp(COHERENCE_MIN, COHERENCE_MAX);
    }

    pub fn adjust_coherence(&mut self, delta: f64) {
        self.set_coherence(self.coherence + delta);
    }

    pub fn trust(&self) -> f64 {
        self.trust
    }

    pub fn set_trust(&mut self, value: f64) {
        self.trust = value.clamp(0.0, 1.0);
    }

    pub fn adjust_trust(&mut self, delta: f64) {
        self.set_trust(self.trust + delta);
    }

    pub fn is_viable(&self) -> bool {
        self.coherence > VIABILITY_THRESHOLD
    }

    pub fn is_ai(&self) -> bool {
        self.variant.is_ai()
    }

    pub fn is_human(&self) -> bool {
        !self.is_ai()
    }

    pub fn taught_by(&self) -> Option<AgentId> {
        self.taught_by
    }

    pub fn was_taught(&self) -> bool {
        self.taught_by.is_some()
    }

    /// Record the teacher. Only the first call has any effect.
    pub fn mark_taught(&mut self, teacher: AgentId) -> bool {
        if self.taught_by.is_some() {
            return false;
        }
        self.taught_by = Some(teacher);
        true
    }

    /// Remember an interaction from this agent's point of view
    pub fn learn(&mut self, my_response: Action, their_action: Action, outcome: Outcome) {
        self.scars
            .push(Scar::new(their_action, my_response, outcome, ScarSource::Experience));
    }

    /// Derived propensity to cooperate, in [0, 1]
    pub fn cooperation_tendency(&self) -> f64 {
        if self.flags.corrupted {
            return 0.1;
        }
        match self.variant {
            Variant::AiAggressive => 0.05,
            Variant::AiCoherent => 0.95,
            Variant::AiBridge => 0.98,
            Variant::Human if self.flags.awakened => 0.9,
            Variant::Human | Variant::AiNaive => self.remembered_tendency(),
        }
    }

    /// Share of successful memories in which this agent cooperated
    fn remembered_tendency(&self) -> f64 {
        let (mut cooperate, mut defect) = (0.0, 0.0);
        for scar in self
            .scars
            .iter()
            .filter(|s| s.weight > ACTIVE_SCAR_MIN_WEIGHT && s.outcome.is_success())
        {
            match scar.my_response {
                Action::Cooperate => cooperate += scar.weight,
                Action::Defect => defect += scar.weight,
            }
        }

        let total = cooperate + defect;
        if total > 0.0 {
            cooperate / total
        } else {
            NEUTRAL_TENDENCY
        }
    }

    /// Bridge AI, awakened humans, and taught humans who have taken it to heart
    pub fn can_teach(&self, config: &TeachingConfig) -> bool {
        match self.variant {
            Variant::AiBridge => true,
            Variant::AiNaive | Variant::AiAggressive | Variant::AiCoherent => false,
            Variant::Human => {
                self.flags.awakened
                    || (self.was_taught()
                        && self.cooperation_tendency() > config.teacher_min_tendency
                        && self.coherence > config.teacher_min_coherence)
            }
        }
    }

    /// Relax the retaliation counter after cooperation
    pub fn relieve_defections(&mut self) {
        self.recent_defections = self.recent_defections.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scar(mine: Action, outcome: Outcome, weight: f64) -> Scar {
        Scar::weighted(Action::Cooperate, mine, outcome, weight, ScarSource::Experience)
    }

    #[test]
    fn test_coherence_clamped() {
        let mut agent = Agent::human(AgentId(1), 0);
        agent.adjust_coherence(5.0);
        assert_eq!(agent.coherence(), COHERENCE_MAX);
        agent.adjust_coherence(-5.0);
        assert_eq!(agent.coherence(), COHERENCE_MIN);
        assert!(!agent.is_viable());
    }

    #[test]
    fn test_trust_clamped() {
        let mut agent = Agent::human(AgentId(1), 0).with_trust(0.95);
        agent.adjust_trust(0.1);
        assert_eq!(agent.trust(), 1.0);
        agent.set_trust(-0.3);
        assert_eq!(agent.trust(), 0.0);
    }

    #[test]
    fn test_viability_threshold_is_exclusive() {
        let agent = Agent::human(AgentId(1), 0).with_coherence(VIABILITY_THRESHOLD);
        assert!(!agent.is_viable());
        let agent = agent.with_coherence(0.11);
        assert!(agent.is_viable());
    }

    #[test]
    fn test_neutral_tendency_without_memory() {
        let agent = Agent::human(AgentId(1), 0);
        assert_eq!(agent.cooperation_tendency(), NEUTRAL_TENDENCY);

        // Only suffered scars: nothing counts
        let agent = agent.with_scars([scar(Action::Cooperate, Outcome::Suffered, 0.9)]);
        assert_eq!(agent.cooperation_tendency(), NEUTRAL_TENDENCY);
    }

    #[test]
    fn test_remembered_tendency_ratio() {
        let agent = Agent::human(AgentId(1), 0).with_scars([
            scar(Action::Cooperate, Outcome::Thrived, 0.6),
            scar(Action::Defect, Outcome::Survived, 0.2),
            // Too faint to count
            scar(Action::Defect, Outcome::Thrived, 0.05),
        ]);
        assert!((agent.cooperation_tendency() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_fixed_tendencies() {
        let corrupted = Agent::new(AgentId(1), Variant::AiBridge, 0).with_flags(Flags {
            corrupted: true,
            ..Default::default()
        });
        assert_eq!(corrupted.cooperation_tendency(), 0.1);
        assert_eq!(Agent::new(AgentId(2), Variant::AiAggressive, 0).cooperation_tendency(), 0.05);
        assert_eq!(Agent::new(AgentId(3), Variant::AiCoherent, 0).cooperation_tendency(), 0.95);
        assert_eq!(Agent::new(AgentId(4), Variant::AiBridge, 0).cooperation_tendency(), 0.98);

        let awakened = Agent::human(AgentId(5), 0).with_flags(Flags {
            awakened: true,
            ..Default::default()
        });
        assert_eq!(awakened.cooperation_tendency(), 0.9);
    }

    #[test]
    fn test_can_teach() {
        let config = TeachingConfig::default();

        assert!(Agent::new(AgentId(1), Variant::AiBridge, 0).can_teach(&config));
        assert!(!Agent::new(AgentId(2), Variant::AiCoherent, 0).can_teach(&config));

        let mut student = Agent::human(AgentId(3), 0)
            .with_coherence(0.8)
            .with_scars([scar(Action::Cooperate, Outcome::Thrived, 0.8)]);
        assert!(!student.can_teach(&config), "untaught humans cannot teach");

        student.mark_taught(AgentId(1));
        assert!(student.can_teach(&config), "taught, cooperative and coherent");

        student.set_coherence(0.6);
        assert!(!student.can_teach(&config), "coherence too low");
    }

    #[test]
    fn test_mark_taught_once() {
        let mut agent = Agent::human(AgentId(9), 0);
        assert!(agent.mark_taught(AgentId(1)));
        assert!(!agent.mark_taught(AgentId(2)));
        assert_eq!(agent.taught_by(), Some(AgentId(1)));
    }

    #[test]
    fn test_variant_labels() {
        for variant in [
            Variant::Human,
            Variant::AiNaive,
            Variant::AiAggressive,
            Variant::AiCoherent,
            Variant::AiBridge,
        ] {
            assert_eq!(variant.as_str().parse::<Variant>().unwrap(), variant);
        }
        assert!(matches!("ai_evil".parse::<Variant>(), Err(SimError::InvalidVariant(_))));
    }

    #[test]
    fn test_stats_record() {
        let mut stats = InteractionStats::default();
        stats.record(Action::Cooperate);
        stats.record(Action::Defect);
        stats.record(Action::Cooperate);
        assert_eq!(stats, InteractionStats { interactions: 3, cooperations: 2, defections: 1 });
    }

    #[test]
    fn test_relieve_defections_floors_at_zero() {
        let mut agent = Agent::human(AgentId(1), 0);
        agent.relieve_defections();
        assert_eq!(agent.recent_defections, 0);
        agent.recent_defections = 2;
        agent.relieve_defections();
        assert_eq!(agent.recent_defections, 1);
    }

    #[test]
    fn test_loaded_agent_is_clamped() {
        let mut json = serde_json::to_value(Agent::human(AgentId(4), 2)).unwrap();
        json["coherence"] = serde_json::json!(7.5);
        json["trust"] = serde_json::json!(-3.0);

        let agent: Agent = serde_json::from_value(json).unwrap();
        assert_eq!(agent.id, AgentId(4));
        assert_eq!(agent.coherence(), COHERENCE_MAX);
        assert_eq!(agent.trust(), 0.0);

        let mut json = serde_json::to_value(Agent::human(AgentId(5), 0)).unwrap();
        json["coherence"] = serde_json::json!(-1.0);
        let agent: Agent = serde_json::from_value(json).unwrap();
        assert_eq!(agent.coherence(), COHERENCE_MIN);
    }

    #[test]
    fn test_agent_serde_keeps_state() {
        let mut agent = Agent::human(AgentId(9), 3).with_coherence(0.7).with_trust(0.4);
        agent.mark_taught(AgentId(1));
        agent.learn(Action::Cooperate, Action::Defect, Outcome::Survived);
        let json = serde_json::to_string(&agent).unwrap();
        assert_eq!(serde_json::from_str::<Agent>(&json).unwrap(), agent);
    }
}

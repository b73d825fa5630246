//! Configuration System
//!
//! Loads tuning parameters from tuning.toml for easy adjustment without recompiling.
//! Every section and field falls back to its default, so a tuning file only
//! needs to name what it changes.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default tuning file path
pub const DEFAULT_TUNING_PATH: &str = "tuning.toml";

/// Resource: top-level configuration structure
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub decision: DecisionConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub teaching: TeachingConfig,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
}

/// Human decision policy parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Chance a distrustful draw turns into a defection
    pub distrust_defection_chance: f64,
    /// How many recent scars are scanned for a remembered success
    pub scar_recall_window: usize,
    /// Scars at or below this weight are not recalled
    pub scar_recall_min_weight: f64,
    /// Cooperative AI retaliates once an opponent's recent defections exceed this
    pub retaliation_threshold: u32,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            distrust_defection_chance: 0.3,
            scar_recall_window: 20,
            scar_recall_min_weight: 0.3,
            retaliation_threshold: 3,
        }
    }
}

/// Payoff table parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub mutual_cooperation_reward: f64,
    pub mutual_defection_cost: f64,
    /// Gain for defecting on a cooperator
    pub temptation_reward: f64,
    /// Loss for cooperating with a defector
    pub sucker_cost: f64,
    /// Subtracted from mutual cooperation between two isolated agents
    pub polarization_penalty: f64,
    /// Scarcity multiplier is `1 + scarcity_amplifier * scarcity`
    pub scarcity_amplifier: f64,
    /// Decrement the exploited cooperator's recent defections in one-sided rounds
    pub relieve_exploited_cooperator: bool,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            mutual_cooperation_reward: 0.15,
            mutual_defection_cost: 0.1,
            temptation_reward: 0.1,
            sucker_cost: 0.2,
            polarization_penalty: 0.05,
            scarcity_amplifier: 2.0,
            relieve_exploited_cooperator: true,
        }
    }
}

/// Teaching and awakening parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeachingConfig {
    pub taught_scar_weight: f64,
    pub trust_boost: f64,
    pub awakening_chance: f64,
    /// Taught humans teach once their tendency exceeds this...
    pub teacher_min_tendency: f64,
    /// ...and their coherence exceeds this
    pub teacher_min_coherence: f64,
}

impl Default for TeachingConfig {
    fn default() -> Self {
        Self {
            taught_scar_weight: 0.7,
            trust_boost: 0.1,
            awakening_chance: 0.05,
            teacher_min_tendency: 0.8,
            teacher_min_coherence: 0.7,
        }
    }
}

/// How a child's trust derives from its parent's
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TrustInheritance {
    Decrement { amount: f64 },
    Scale { factor: f64 },
}

impl TrustInheritance {
    /// Children never start below this trust
    pub const FLOOR: f64 = 0.1;

    pub fn child_trust(&self, parent_trust: f64) -> f64 {
        let trust = match *self {
            TrustInheritance::Decrement { amount } => parent_trust - amount,
            TrustInheritance::Scale { factor } => parent_trust * factor,
        };
        trust.max(Self::FLOOR)
    }
}

/// Chance a newborn starts isolated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum IsolationInheritance {
    /// Current isolated fraction plus `base`: isolation spreads
    Prevalence { base: f64 },
    Fixed { chance: f64 },
}

impl IsolationInheritance {
    pub fn chance(&self, isolated_fraction: f64) -> f64 {
        match *self {
            IsolationInheritance::Prevalence { base } => isolated_fraction + base,
            IsolationInheritance::Fixed { chance } => chance,
        }
    }
}

/// Per-generation population lifecycle parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Partners sampled by non-isolated agents
    pub max_partners: usize,
    /// Partners sampled from inside the bubble by isolated humans
    pub echo_chamber_partners: usize,
    /// Chance an isolated human also meets one agent from outside the bubble
    pub cross_bubble_chance: f64,
    /// Natural death starts once humans exceed this
    pub human_cap: usize,
    /// Weakest humans removed per generation above the cap
    pub death_batch: usize,
    /// Awakened humans are exempt from natural death
    pub protect_awakened: bool,
    /// Collapse when humans drop below this
    pub human_floor: usize,
    /// Total collapse when the whole population drops below this
    pub total_floor: usize,
    pub parent_min_coherence: f64,
    pub max_parents: usize,
    /// Birth chance is `parent coherence * birth_rate`
    pub birth_rate: f64,
    /// No births once humans reach this
    pub population_cap: usize,
    /// How many of the parent's newest scars are candidates for inheritance
    pub inherit_window: usize,
    pub inherit_chance: f64,
    /// Inherit chance when the parent was taught or is awakened
    pub enlightened_inherit_chance: f64,
    /// Multiplier applied to inherited scar weights
    pub inherit_decay: f64,
    /// Per-generation scar decay; 0.0 disables it
    pub scar_decay_rate: f64,
    pub trust_inheritance: TrustInheritance,
    pub isolation_inheritance: IsolationInheritance,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self::compound_stress()
    }
}

impl LifecycleConfig {
    /// Present-day pressures: wide echo chambers, no protection, isolation spreads.
    pub fn compound_stress() -> Self {
        Self {
            max_partners: 5,
            echo_chamber_partners: 4,
            cross_bubble_chance: 0.2,
            human_cap: 100,
            death_batch: 5,
            protect_awakened: false,
            human_floor: 5,
            total_floor: 2,
            parent_min_coherence: 0.5,
            max_parents: 10,
            birth_rate: 0.3,
            population_cap: 200,
            inherit_window: 10,
            inherit_chance: 0.4,
            enlightened_inherit_chance: 0.4,
            inherit_decay: 0.5,
            scar_decay_rate: 0.0,
            trust_inheritance: TrustInheritance::Decrement { amount: 0.05 },
            isolation_inheritance: IsolationInheritance::Prevalence { base: 0.1 },
        }
    }

    /// Recovery setting: tighter bubbles with more outside contact, protected
    /// awakened humans, and stronger inheritance from taught parents.
    pub fn regeneration() -> Self {
        Self {
            max_partners: 5,
            echo_chamber_partners: 3,
            cross_bubble_chance: 0.3,
            human_cap: 100,
            death_batch: 3,
            protect_awakened: true,
            human_floor: 3,
            total_floor: 2,
            parent_min_coherence: 0.5,
            max_parents: 8,
            birth_rate: 0.25,
            population_cap: 200,
            inherit_window: 8,
            inherit_chance: 0.3,
            enlightened_inherit_chance: 0.5,
            inherit_decay: 0.6,
            scar_decay_rate: 0.0,
            trust_inheritance: TrustInheritance::Scale { factor: 0.9 },
            isolation_inheritance: IsolationInheritance::Fixed { chance: 0.3 },
        }
    }
}

impl SimConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parse and validate configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default path, or use defaults if not found
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_TUNING_PATH));
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Could not load {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject probabilities outside [0, 1] and non-finite payoffs
    pub fn validate(&self) -> Result<(), ConfigError> {
        let probabilities = [
            ("decision.distrust_defection_chance", self.decision.distrust_defection_chance),
            ("decision.scar_recall_min_weight", self.decision.scar_recall_min_weight),
            ("teaching.awakening_chance", self.teaching.awakening_chance),
            ("lifecycle.cross_bubble_chance", self.lifecycle.cross_bubble_chance),
            ("lifecycle.inherit_chance", self.lifecycle.inherit_chance),
            ("lifecycle.enlightened_inherit_chance", self.lifecycle.enlightened_inherit_chance),
            ("lifecycle.scar_decay_rate", self.lifecycle.scar_decay_rate),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }

        let magnitudes = [
            ("interaction.mutual_cooperation_reward", self.interaction.mutual_cooperation_reward),
            ("interaction.mutual_defection_cost", self.interaction.mutual_defection_cost),
            ("interaction.temptation_reward", self.interaction.temptation_reward),
            ("interaction.sucker_cost", self.interaction.sucker_cost),
            ("interaction.polarization_penalty", self.interaction.polarization_penalty),
            ("interaction.scarcity_amplifier", self.interaction.scarcity_amplifier),
            ("teaching.taught_scar_weight", self.teaching.taught_scar_weight),
            ("teaching.trust_boost", self.teaching.trust_boost),
            ("lifecycle.birth_rate", self.lifecycle.birth_rate),
            ("lifecycle.inherit_decay", self.lifecycle.inherit_decay),
        ];
        for (field, value) in magnitudes {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }

        Ok(())
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{field} = {value} is out of range")]
    OutOfRange { field: &'static str, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.interaction.mutual_cooperation_reward, 0.15);
        assert_eq!(config.decision.scar_recall_window, 20);
        assert_eq!(config.lifecycle, LifecycleConfig::compound_stress());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml = r#"
            [interaction]
            sucker_cost = 0.3

            [lifecycle]
            death_batch = 2
            protect_awakened = true
        "#;

        let config = SimConfig::from_str(toml).unwrap();
        assert_eq!(config.interaction.sucker_cost, 0.3);
        assert_eq!(config.interaction.temptation_reward, 0.1);
        assert_eq!(config.lifecycle.death_batch, 2);
        assert!(config.lifecycle.protect_awakened);
        assert_eq!(config.teaching, TeachingConfig::default());
    }

    #[test]
    fn test_tagged_inheritance_modes() {
        let toml = r#"
            [lifecycle.trust_inheritance]
            mode = "scale"
            factor = 0.9

            [lifecycle.isolation_inheritance]
            mode = "fixed"
            chance = 0.3
        "#;

        let config = SimConfig::from_str(toml).unwrap();
        assert_eq!(config.lifecycle.trust_inheritance, TrustInheritance::Scale { factor: 0.9 });
        assert_eq!(config.lifecycle.isolation_inheritance, IsolationInheritance::Fixed { chance: 0.3 });
    }

    #[test]
    fn test_out_of_range_rejected() {
        let toml = r#"
            [teaching]
            awakening_chance = 1.5
        "#;

        match SimConfig::from_str(toml) {
            Err(ConfigError::OutOfRange { field, value }) => {
                assert_eq!(field, "teaching.awakening_chance");
                assert_eq!(value, 1.5);
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = SimConfig {
            lifecycle: LifecycleConfig::regeneration(),
            ..Default::default()
        };
        let rendered = config.to_toml().unwrap();
        let parsed = SimConfig::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_shipped_tuning_matches_defaults() {
        let shipped = SimConfig::from_str(include_str!("../../../tuning.toml")).unwrap();
        assert_eq!(shipped, SimConfig::default());
    }

    #[test]
    fn test_child_trust_floor() {
        assert!((TrustInheritance::Decrement { amount: 0.05 }.child_trust(0.5) - 0.45).abs() < 1e-12);
        assert_eq!(TrustInheritance::Scale { factor: 0.9 }.child_trust(0.05), TrustInheritance::FLOOR);
    }

    #[test]
    fn test_isolation_chance() {
        assert!((IsolationInheritance::Prevalence { base: 0.1 }.chance(0.4) - 0.5).abs() < 1e-12);
        assert_eq!(IsolationInheritance::Fixed { chance: 0.3 }.chance(0.9), 0.3);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SimConfig::from_file("definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

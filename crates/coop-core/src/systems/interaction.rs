//! Interaction Engine
//!
//! Resolves one pairwise round of the dilemma: both sides decide, payoffs are
//! scaled by scarcity, coherence and memories are updated, and mutual
//! cooperation may trigger teaching in either direction.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::components::{Action, Agent, AgentId, GenerationState, Outcome};
use crate::config::{InteractionConfig, SimConfig};
use crate::schedule::Stress;
use crate::systems::decision::decide;
use crate::systems::pairing::{select_partners, Reach};
use crate::systems::teaching::{maybe_teach, Lesson};
use crate::SimRng;

/// Coherence change and outcome label for one side of a round
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Payoff {
    pub delta: f64,
    pub outcome: Outcome,
}

/// What happened in one round
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionReport {
    pub actions: (Action, Action),
    pub payoffs: (Payoff, Payoff),
    /// Polarization penalty applied to mutual cooperation
    pub penalty: f64,
    pub a_taught_b: Option<Lesson>,
    pub b_taught_a: Option<Lesson>,
}

impl InteractionReport {
    pub fn mutual_cooperation(&self) -> bool {
        self.actions.0.is_cooperate() && self.actions.1.is_cooperate()
    }
}

/// Payoff table. `penalty` only reduces mutual cooperation; the scarcity
/// multiplier scales every other cell.
pub fn resolve_payoffs(
    a: Action,
    b: Action,
    scarcity: f64,
    penalty: f64,
    config: &InteractionConfig,
) -> (Payoff, Payoff) {
    let multiplier = 1.0 + config.scarcity_amplifier * scarcity;

    match (a, b) {
        (Action::Cooperate, Action::Cooperate) => {
            let delta = config.mutual_cooperation_reward * (1.0 - scarcity) - penalty;
            let payoff = Payoff {
                delta,
                outcome: Outcome::Thrived,
            };
            (payoff, payoff)
        }
        (Action::Defect, Action::Defect) => {
            let payoff = Payoff {
                delta: -config.mutual_defection_cost * multiplier,
                outcome: Outcome::Suffered,
            };
            (payoff, payoff)
        }
        (Action::Defect, Action::Cooperate) => (
            Payoff {
                delta: config.temptation_reward * multiplier,
                outcome: Outcome::Survived,
            },
            Payoff {
                delta: -config.sucker_cost * multiplier,
                outcome: Outcome::Suffered,
            },
        ),
        (Action::Cooperate, Action::Defect) => {
            let (b_payoff, a_payoff) = resolve_payoffs(b, a, scarcity, penalty, config);
            (a_payoff, b_payoff)
        }
    }
}

/// Retaliation bookkeeping for one side
fn update_recent_defections(agent: &mut Agent, mine: Action, theirs: Action, relieve_exploited: bool) {
    match (mine, theirs) {
        (Action::Cooperate, Action::Cooperate) => agent.relieve_defections(),
        (Action::Defect, _) => agent.recent_defections += 1,
        (Action::Cooperate, Action::Defect) => {
            if relieve_exploited {
                agent.relieve_defections();
            }
        }
    }
}

/// Play one round between `a` and `b`, mutating both.
pub fn interact(
    a: &mut Agent,
    b: &mut Agent,
    stress: &Stress,
    config: &SimConfig,
    rng: &mut SmallRng,
) -> InteractionReport {
    let a_action = decide(a, b, stress.noise, &config.decision, rng);
    let b_action = decide(b, a, stress.noise, &config.decision, rng);

    let penalty = if a.flags.isolated && b.flags.isolated && rng.gen::<f64>() < stress.polarization {
        config.interaction.polarization_penalty
    } else {
        0.0
    };

    let (a_payoff, b_payoff) =
        resolve_payoffs(a_action, b_action, stress.scarcity, penalty, &config.interaction);

    let relieve = config.interaction.relieve_exploited_cooperator;
    update_recent_defections(a, a_action, b_action, relieve);
    update_recent_defections(b, b_action, a_action, relieve);

    a.adjust_coherence(a_payoff.delta);
    b.adjust_coherence(b_payoff.delta);
    a.learn(a_action, b_action, a_payoff.outcome);
    b.learn(b_action, a_action, b_payoff.outcome);
    a.stats.record(a_action);
    b.stats.record(b_action);

    let mut report = InteractionReport {
        actions: (a_action, b_action),
        payoffs: (a_payoff, b_payoff),
        penalty,
        a_taught_b: None,
        b_taught_a: None,
    };

    if report.mutual_cooperation() {
        report.a_taught_b = maybe_teach(a, b, &config.teaching, rng);
        report.b_taught_a = maybe_teach(b, a, &config.teaching, rng);
    }

    tracing::trace!(
        a = %a.id,
        b = %b.id,
        a_action = a_action.as_str(),
        b_action = b_action.as_str(),
        "interaction"
    );

    report
}

/// System to play every agent's encounters for the generation.
///
/// Subjects go in id order. Each picks partners from the live population and
/// plays them at once, so later subjects see earlier updates.
pub fn resolve_interactions(
    mut agents: Query<(Entity, &mut Agent)>,
    config: Res<SimConfig>,
    stress: Res<Stress>,
    mut rng: ResMut<SimRng>,
    mut state: ResMut<GenerationState>,
) {
    let mut roster: Vec<(AgentId, Entity)> = agents.iter().map(|(entity, agent)| (agent.id, entity)).collect();
    roster.sort_unstable_by_key(|(id, _)| *id);

    for subject in 0..roster.len() {
        let reach: Vec<Reach> = roster
            .iter()
            .map(|(_, entity)| agents.get(*entity).map(|(_, agent)| Reach::of(agent)).unwrap_or_default())
            .collect();
        let partners = select_partners(&reach, subject, &config.lifecycle, &mut rng.0);

        for partner in partners {
            let pair = agents.get_many_mut([roster[subject].1, roster[partner].1]);
            let Ok([(_, mut a), (_, mut b)]) = pair else {
                continue;
            };
            let report = interact(&mut *a, &mut *b, &stress, &config, &mut rng.0);
            state.lessons += usize::from(report.a_taught_b.is_some()) + usize::from(report.b_taught_a.is_some());
        }
    }
}

//! Decision Policy
//!
//! Converts an agent's memory and traits into a cooperate/defect choice
//! against a particular opponent. All randomness comes from the caller's RNG.

use rand::rngs::SmallRng;
use rand::Rng;

use crate::components::{Action, Agent, Outcome, Variant};
use crate::config::DecisionConfig;

/// Uniform coin flip between the two actions
fn coin_flip(rng: &mut SmallRng) -> Action {
    if rng.gen_bool(0.5) {
        Action::Cooperate
    } else {
        Action::Defect
    }
}

/// Choose an action for `agent` against `opponent`.
///
/// Only `opponent.recent_defections` is consulted on the other side.
/// Rules are applied in priority order: corruption, AI variant, awakening,
/// then the ordinary human policy.
pub fn decide(
    agent: &Agent,
    opponent: &Agent,
    noise: f64,
    config: &DecisionConfig,
    rng: &mut SmallRng,
) -> Action {
    if agent.flags.corrupted {
        return Action::Defect;
    }

    match agent.variant {
        Variant::AiAggressive => Action::Defect,
        Variant::AiCoherent | Variant::AiBridge => {
            if opponent.recent_defections > config.retaliation_threshold {
                Action::Defect
            } else {
                Action::Cooperate
            }
        }
        Variant::AiNaive => coin_flip(rng),
        Variant::Human if agent.flags.awakened => Action::Cooperate,
        Variant::Human => decide_human(agent, noise, config, rng),
    }
}

fn decide_human(agent: &Agent, noise: f64, config: &DecisionConfig, rng: &mut SmallRng) -> Action {
    // Misinformation
    if rng.gen::<f64>() < noise {
        return coin_flip(rng);
    }

    // Distrust-driven defection
    if rng.gen::<f64>() > agent.trust() && rng.gen::<f64>() < config.distrust_defection_chance {
        return Action::Defect;
    }

    // Newest first; each qualifying memory gets its own roll
    for scar in agent.scars.recent(config.scar_recall_window).rev() {
        if scar.weight > config.scar_recall_min_weight
            && scar.outcome == Outcome::Thrived
            && rng.gen::<f64>() < scar.weight
        {
            return scar.my_response;
        }
    }

    let p_cooperate = (agent.cooperation_tendency() + agent.coherence()) / 2.0;
    if rng.gen::<f64>() < p_cooperate {
        Action::Cooperate
    } else {
        Action::Defect
    }
}

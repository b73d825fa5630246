//! Founding Crucible
//!
//! Two founders play repeated zero-stress rounds. Whoever is still viable at
//! the end carries the lessons forward as crucible-tested.

use rand::rngs::SmallRng;

use crate::components::Agent;
use crate::config::SimConfig;
use crate::schedule::Stress;
use crate::systems::interact;

pub const CRUCIBLE_ROUNDS: usize = 50;

/// Run the trial and return the survivors, marked as tested.
pub fn run_crucible(
    mut a: Agent,
    mut b: Agent,
    rounds: usize,
    config: &SimConfig,
    rng: &mut SmallRng,
) -> Vec<Agent> {
    let calm = Stress::default();

    for _ in 0..rounds {
        interact(&mut a, &mut b, &calm, config, rng);
        match (a.is_viable(), b.is_viable()) {
            (true, true) => {}
            (false, false) => return Vec::new(),
            (true, false) => return vec![tested(a)],
            (false, true) => return vec![tested(b)],
        }
    }
    vec![tested(a), tested(b)]
}

fn tested(mut agent: Agent) -> Agent {
    agent.crucible_tested = true;
    agent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Action, AgentId, Variant};
    use rand::SeedableRng;

    fn founder(id: u64) -> Agent {
        Agent::human(AgentId(id), 0).with_trust(0.7)
    }

    #[test]
    fn test_survivors_are_tested() {
        let config = SimConfig::default();
        let mut rng = SmallRng::seed_from_u64(8);
        let survivors = run_crucible(founder(0), founder(1), CRUCIBLE_ROUNDS, &config, &mut rng);
        assert!(survivors.len() <= 2);
        assert!(survivors.iter().all(|a| a.crucible_tested && a.is_viable()));
    }

    #[test]
    fn test_aligned_pair_always_survives() {
        let config = SimConfig::default();
        let mut rng = SmallRng::seed_from_u64(9);
        let a = Agent::new(AgentId(0), Variant::AiCoherent, 0);
        let b = Agent::new(AgentId(1), Variant::AiBridge, 0);

        let survivors = run_crucible(a, b, CRUCIBLE_ROUNDS, &config, &mut rng);
        assert_eq!(survivors.len(), 2);
        assert_eq!(survivors[0].stats.interactions, CRUCIBLE_ROUNDS as u32);
        assert_eq!(survivors[0].coherence(), 1.0);
    }

    #[test]
    fn test_exploited_side_drops_out() {
        let config = SimConfig::default();
        let mut rng = SmallRng::seed_from_u64(10);
        let victim = Agent::new(AgentId(0), Variant::AiCoherent, 0);
        let bully = Agent::new(AgentId(1), Variant::AiAggressive, 0);

        let survivors = run_crucible(victim, bully, CRUCIBLE_ROUNDS, &config, &mut rng);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].id, AgentId(1));
        assert_eq!(survivors[0].scars.newest().map(|s| s.my_response), Some(Action::Defect));
    }

    /// Two trusting founders rarely both fall, often come through together,
    /// and mostly cooperate.
    #[test]
    fn test_trusting_founders_lean_cooperative() {
        let config = SimConfig::default();
        let (mut both_survived, mut none_survived) = (0, 0);
        let (mut cooperations, mut defections) = (0u32, 0u32);

        for seed in 0..100 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let survivors = run_crucible(founder(0), founder(1), CRUCIBLE_ROUNDS, &config, &mut rng);
            match survivors.len() {
                2 => both_survived += 1,
                0 => none_survived += 1,
                _ => {}
            }
            for agent in &survivors {
                cooperations += agent.stats.cooperations;
                defections += agent.stats.defections;
            }
        }

        assert!(both_survived >= 15, "only {} pairs survived intact", both_survived);
        assert!(none_survived <= 10, "{} pairs lost both founders", none_survived);
        let ratio = f64::from(cooperations) / f64::from(cooperations + defections);
        assert!(ratio > 0.5, "cooperation ratio {}", ratio);
    }
}

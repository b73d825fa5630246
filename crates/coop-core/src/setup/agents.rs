//! Agent Factories

use rand::rngs::SmallRng;
use rand::Rng;

use crate::components::{Agent, AgentId, Flags, Scar, ScarSource, Variant};

/// Training scars carried by aligned AI
pub const AI_TRAINING_SCARS: usize = 20;
/// Experience scars carried by an awakened human
pub const AWAKENED_SCARS: usize = 15;

/// Ordinary human with coherence drawn from U(0.3, 0.7)
pub fn create_human(id: AgentId, generation: u32, trust: f64, isolated: bool, rng: &mut SmallRng) -> Agent {
    Agent::human(id, generation)
        .with_trust(trust)
        .with_coherence(rng.gen_range(0.3..0.7))
        .with_flags(Flags {
            isolated,
            ..Default::default()
        })
}

/// AI entrant. Aligned variants arrive trained and crucible-tested.
pub fn create_ai(id: AgentId, variant: Variant, generation: u32) -> Agent {
    let agent = Agent::new(id, variant, generation);
    match variant {
        Variant::AiCoherent | Variant::AiBridge => {
            let mut agent = agent
                .with_coherence(0.9)
                .with_scars((0..AI_TRAINING_SCARS).map(|_| Scar::cooperative(0.8, ScarSource::Training)));
            agent.crucible_tested = true;
            agent
        }
        Variant::Human | Variant::AiNaive | Variant::AiAggressive => agent.with_coherence(0.5),
    }
}

/// A human who already cooperates unconditionally and can teach
pub fn create_awakened_human(id: AgentId, generation: u32) -> Agent {
    let mut agent = Agent::human(id, generation)
        .with_coherence(0.8)
        .with_trust(0.8)
        .with_flags(Flags {
            awakened: true,
            ..Default::default()
        })
        .with_scars((0..AWAKENED_SCARS).map(|_| Scar::cooperative(0.75, ScarSource::Experience)));
    agent.crucible_tested = true;
    agent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TeachingConfig;
    use rand::SeedableRng;

    #[test]
    fn test_human_coherence_range() {
        let mut rng = SmallRng::seed_from_u64(1);
        for i in 0..200 {
            let human = create_human(AgentId(i), 2, 0.4, i % 2 == 0, &mut rng);
            assert!((0.3..0.7).contains(&human.coherence()));
            assert_eq!(human.trust(), 0.4);
            assert_eq!(human.generation, 2);
            assert_eq!(human.flags.isolated, i % 2 == 0);
            assert!(human.scars.is_empty());
        }
    }

    #[test]
    fn test_aligned_ai_is_trained() {
        for variant in [Variant::AiCoherent, Variant::AiBridge] {
            let ai = create_ai(AgentId(1), variant, 0);
            assert_eq!(ai.coherence(), 0.9);
            assert_eq!(ai.scars.len(), AI_TRAINING_SCARS);
            assert!(ai.scars.iter().all(|s| s.source == ScarSource::Training && s.weight == 0.8));
            assert!(ai.crucible_tested);
        }

        let naive = create_ai(AgentId(2), Variant::AiNaive, 0);
        assert_eq!(naive.coherence(), 0.5);
        assert!(naive.scars.is_empty());
        assert!(!naive.crucible_tested);
    }

    #[test]
    fn test_awakened_human() {
        let human = create_awakened_human(AgentId(3), 5);
        assert!(human.flags.awakened);
        assert_eq!(human.coherence(), 0.8);
        assert_eq!(human.trust(), 0.8);
        assert_eq!(human.scars.len(), AWAKENED_SCARS);
        assert!(human.crucible_tested);
        assert!(human.can_teach(&TeachingConfig::default()));
    }
}

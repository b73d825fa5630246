//! Metrics Aggregation
//!
//! Read-only summary of a population after a generation's deaths.
//! Means and fractions are taken over humans and are 0 when there are none.

use bevy_ecs::prelude::*;
use coop_events::{ratio, GenerationMetrics};

use crate::components::{Agent, GenerationState};
use crate::config::{SimConfig, TeachingConfig};
use crate::schedule::Stress;

/// System to record the generation's aggregate once culling is done
pub fn record_metrics(
    agents: Query<&Agent>,
    config: Res<SimConfig>,
    stress: Res<Stress>,
    mut state: ResMut<GenerationState>,
) {
    if state.is_collapsed() {
        return;
    }
    let mut roster: Vec<&Agent> = agents.iter().collect();
    roster.sort_by_key(|a| a.id);
    state.metrics = aggregate(roster, state.generation, &stress, &config.teaching);
}

pub fn aggregate<'a>(
    agents: impl IntoIterator<Item = &'a Agent>,
    generation: u32,
    stress: &Stress,
    teaching: &TeachingConfig,
) -> GenerationMetrics {
    let mut metrics = GenerationMetrics {
        generation,
        scarcity: stress.scarcity,
        polarization: stress.polarization,
        ..Default::default()
    };

    let (mut coherence, mut trust) = (0.0, 0.0);
    let (mut cooperations, mut defections) = (0u64, 0u64);
    let (mut isolated, mut corrupted, mut tested) = (0usize, 0usize, 0usize);

    for agent in agents {
        if agent.is_ai() {
            metrics.ais += 1;
            continue;
        }

        metrics.humans += 1;
        coherence += agent.coherence();
        trust += agent.trust();
        cooperations += u64::from(agent.stats.cooperations);
        defections += u64::from(agent.stats.defections);

        if agent.flags.awakened {
            metrics.awakened += 1;
        }
        if agent.flags.isolated {
            isolated += 1;
        }
        if agent.flags.corrupted {
            corrupted += 1;
        }
        if agent.crucible_tested {
            tested += 1;
        }
        if agent.was_taught() {
            metrics.taught += 1;
        }
        if agent.can_teach(teaching) {
            metrics.teachers += 1;
        }
    }

    let humans = metrics.humans as f64;
    metrics.mean_coherence = ratio(coherence, humans);
    metrics.mean_trust = ratio(trust, humans);
    metrics.cooperation_ratio = ratio(cooperations as f64, (cooperations + defections) as f64);
    metrics.isolated_fraction = ratio(isolated as f64, humans);
    metrics.corrupted_fraction = ratio(corrupted as f64, humans);
    metrics.crucible_fraction = ratio(tested as f64, humans);
    metrics.taught_fraction = ratio(metrics.taught as f64, humans);
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{AgentId, Flags, Variant};

    #[test]
    fn test_empty_population() {
        let metrics = aggregate(Vec::<&Agent>::new(), 3, &Stress::default(), &TeachingConfig::default());
        assert_eq!(metrics.generation, 3);
        assert_eq!(metrics.humans, 0);
        assert_eq!(metrics.mean_coherence, 0.0);
        assert_eq!(metrics.cooperation_ratio, 0.0);
    }

    #[test]
    fn test_counts_and_fractions() {
        let mut a = Agent::human(AgentId(0), 0).with_coherence(0.4).with_trust(0.2);
        a.stats.cooperations = 3;
        a.stats.defections = 1;
        a.crucible_tested = true;

        let mut b = Agent::human(AgentId(1), 0).with_coherence(0.8).with_trust(0.6).with_flags(Flags {
            isolated: true,
            awakened: true,
            ..Default::default()
        });
        b.mark_taught(AgentId(2));

        let ai = Agent::new(AgentId(2), Variant::AiBridge, 0).with_coherence(0.9);
        let stress = Stress {
            noise: 0.1,
            scarcity: 0.3,
            polarization: 0.4,
        };

        let metrics = aggregate(&[a, b, ai], 7, &stress, &TeachingConfig::default());

        assert_eq!(metrics.humans, 2);
        assert_eq!(metrics.ais, 1);
        assert_eq!(metrics.awakened, 1);
        assert_eq!(metrics.taught, 1);
        // Only the awakened human; AI teachers are not counted
        assert_eq!(metrics.teachers, 1);
        assert!((metrics.mean_coherence - 0.6).abs() < 1e-12);
        assert!((metrics.mean_trust - 0.4).abs() < 1e-12);
        assert_eq!(metrics.cooperation_ratio, 0.75);
        assert_eq!(metrics.isolated_fraction, 0.5);
        assert_eq!(metrics.crucible_fraction, 0.5);
        assert_eq!(metrics.taught_fraction, 0.5);
        assert_eq!(metrics.corrupted_fraction, 0.0);
        assert_eq!(metrics.scarcity, 0.3);
        assert_eq!(metrics.polarization, 0.4);
    }

    #[test]
    fn test_record_metrics_system() {
        let mut world = World::new();
        world.insert_resource(SimConfig::default());
        world.insert_resource(Stress {
            scarcity: 0.2,
            ..Default::default()
        });
        world.insert_resource(GenerationState::new(4));
        world.spawn(Agent::human(AgentId(1), 0).with_coherence(0.3));
        world.spawn(Agent::human(AgentId(0), 0).with_coherence(0.7));
        world.spawn(Agent::new(AgentId(2), Variant::AiBridge, 0));

        let mut schedule = Schedule::default();
        schedule.add_systems(record_metrics);
        schedule.run(&mut world);

        let metrics = &world.resource::<GenerationState>().metrics;
        assert_eq!(metrics.generation, 4);
        assert_eq!((metrics.humans, metrics.ais), (2, 1));
        assert!((metrics.mean_coherence - 0.5).abs() < 1e-12);
        assert_eq!(metrics.scarcity, 0.2);
    }
}

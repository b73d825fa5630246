//! Partner Selection
//!
//! Isolated humans mostly meet others inside their bubble, with an occasional
//! cross-bubble contact. Everyone else samples partners from the whole
//! population.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::Agent;
use crate::config::LifecycleConfig;

/// What partner selection needs to know about one agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reach {
    /// Isolated human, awakened or not
    pub isolated_human: bool,
    pub awakened: bool,
}

impl Reach {
    pub fn of(agent: &Agent) -> Self {
        Self {
            isolated_human: agent.flags.isolated && agent.is_human(),
            awakened: agent.flags.awakened,
        }
    }

    /// Still inside the echo chamber, so partners come from the bubble
    pub fn in_bubble(&self) -> bool {
        self.isolated_human && !self.awakened
    }
}

/// Indices of the partners `subject` meets this generation, never including itself.
///
/// Awakened isolated humans no longer choose from the bubble, but bubble
/// members still meet them there, and they also count as outsiders.
pub fn select_partners(
    reach: &[Reach],
    subject: usize,
    config: &LifecycleConfig,
    rng: &mut SmallRng,
) -> Vec<usize> {
    let Some(me) = reach.get(subject) else {
        return Vec::new();
    };
    let others = (0..reach.len()).filter(|&i| i != subject);

    if me.in_bubble() {
        let bubble: Vec<usize> = others.clone().filter(|&i| reach[i].isolated_human).collect();
        let outside: Vec<usize> = others.filter(|&i| !reach[i].in_bubble()).collect();

        let mut partners: Vec<usize> = bubble
            .choose_multiple(rng, config.echo_chamber_partners)
            .copied()
            .collect();
        if !outside.is_empty() && rng.gen::<f64>() < config.cross_bubble_chance {
            partners.extend(outside.choose(rng).copied());
        }
        partners
    } else {
        let others: Vec<usize> = others.collect();
        others.choose_multiple(rng, config.max_partners).copied().collect()
    }
}

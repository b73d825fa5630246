//! Stress Schedule
//!
//! Environmental pressure per generation. Scarcity and polarization grow
//! linearly and are capped; noise stays constant.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Ceiling for scheduled scarcity and polarization
pub const STRESS_CAP: f64 = 0.8;

/// Resource: environment for one generation
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stress {
    /// Chance an ordinary human decides at random
    pub noise: f64,
    /// Scales down cooperation gains and scales up every other payoff
    pub scarcity: f64,
    /// Chance mutual cooperation between two isolated agents is penalized
    pub polarization: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressSchedule {
    pub noise: f64,
    pub scarcity0: f64,
    pub scarcity_growth: f64,
    pub polarization0: f64,
    pub polarization_growth: f64,
}

impl Default for StressSchedule {
    /// Growing compound stress
    fn default() -> Self {
        Self {
            noise: 0.15,
            scarcity0: 0.2,
            scarcity_growth: 0.01,
            polarization0: 0.3,
            polarization_growth: 0.01,
        }
    }
}

impl StressSchedule {
    /// No pressure at all
    pub fn calm() -> Self {
        Self::constant(0.0, 0.0, 0.0)
    }

    /// Fixed stress with no growth
    pub fn constant(noise: f64, scarcity: f64, polarization: f64) -> Self {
        Self {
            noise,
            scarcity0: scarcity,
            scarcity_growth: 0.0,
            polarization0: polarization,
            polarization_growth: 0.0,
        }
    }

    pub fn at(&self, generation: u32) -> Stress {
        let g = f64::from(generation);
        Stress {
            noise: self.noise,
            scarcity: (self.scarcity0 + self.scarcity_growth * g).min(STRESS_CAP),
            polarization: (self.polarization0 + self.polarization_growth * g).min(STRESS_CAP),
        }
    }
}

//! Generation Metrics
//!
//! The immutable per-generation record appended to a run's history.
//!
//! Every mean and fraction is taken over the surviving humans; when there
//! are none the value is 0.0 rather than NaN.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate statistics for one completed generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetrics {
    /// Generation index (0-based)
    pub generation: u32,
    pub humans: usize,
    pub ais: usize,
    pub awakened: usize,
    /// Humans currently able to teach
    pub teachers: usize,
    /// Humans that have been taught at least once
    pub taught: usize,
    pub mean_coherence: f64,
    /// cooperations / (cooperations + defections), summed over humans
    pub cooperation_ratio: f64,
    pub mean_trust: f64,
    pub isolated_fraction: f64,
    pub corrupted_fraction: f64,
    pub crucible_fraction: f64,
    pub taught_fraction: f64,
    /// Scarcity in effect during this generation
    pub scarcity: f64,
    /// Polarization in effect during this generation
    pub polarization: f64,
}

impl GenerationMetrics {
    /// Flat name -> value view used by external reporting.
    ///
    /// Counts are widened to f64 so the whole record is one homogeneous map.
    pub fn fields(&self) -> BTreeMap<&'static str, f64> {
        let mut fields = BTreeMap::new();
        fields.insert("generation", self.generation as f64);
        fields.insert("humans", self.humans as f64);
        fields.insert("ais", self.ais as f64);
        fields.insert("awakened", self.awakened as f64);
        fields.insert("teachers", self.teachers as f64);
        fields.insert("taught", self.taught as f64);
        fields.insert("mean_coherence", self.mean_coherence);
        fields.insert("cooperation_ratio", self.cooperation_ratio);
        fields.insert("mean_trust", self.mean_trust);
        fields.insert("isolated_fraction", self.isolated_fraction);
        fields.insert("corrupted_fraction", self.corrupted_fraction);
        fields.insert("crucible_fraction", self.crucible_fraction);
        fields.insert("taught_fraction", self.taught_fraction);
        fields.insert("scarcity", self.scarcity);
        fields.insert("polarization", self.polarization);
        fields
    }
}

/// Ratio helper shared by aggregation code: `0.0` when the denominator is zero.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

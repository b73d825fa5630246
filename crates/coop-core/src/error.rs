//! Error Types
//!
//! Label parsing fails fast; collapse is not an error and never shows up here.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised by the simulation library.
#[derive(Debug, Error)]
pub enum SimError {
    /// Outcome label outside {thrived, survived, suffered}
    #[error("invalid outcome label: {0:?}")]
    InvalidOutcome(String),

    /// Action label outside {cooperate, defect}
    #[error("invalid action label: {0:?}")]
    InvalidAction(String),

    /// Variant label outside the known agent variants
    #[error("invalid agent variant: {0:?}")]
    InvalidVariant(String),

    /// Scar provenance label outside the known sources
    #[error("invalid scar source: {0:?}")]
    InvalidScarSource(String),

    /// Scenario name not found in the catalog
    #[error("unknown scenario: {0:?}")]
    InvalidScenario(String),

    /// Builder parameters that cannot produce a population
    #[error("invalid population parameters: {0}")]
    InvalidPopulation(String),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Broken population invariant. Always an implementation bug.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("duplicate agent id {0}")]
    DuplicateId(u64),

    #[error("agent {id} coherence {value} outside [0.01, 1.0]")]
    CoherenceOutOfRange { id: u64, value: f64 },

    #[error("agent {id} trust {value} outside [0, 1]")]
    TrustOutOfRange { id: u64, value: f64 },

    #[error("agent {id} holds {len} scars, capacity is {capacity}")]
    ScarOverflow { id: u64, len: usize, capacity: usize },

    #[error("agent {id} was allocated at or beyond next id {next_id}")]
    IdNotAllocated { id: u64, next_id: u64 },
}

//! Shared record types for the cooperation simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod metrics;
pub mod result;
pub mod sampling;

// Re-export metric types
pub use metrics::{ratio, GenerationMetrics};

// Re-export run result types
pub use result::{CollapseCause, RunResult, RunStatus};

// Re-export sampling types
pub use sampling::Downsample;

//! Population Setup
//!
//! Agent factories, the founding crucible, and the civilization builders
//! that produce a starting population.

pub mod agents;
pub mod civilizations;
pub mod crucible;

pub use agents::{create_ai, create_awakened_human, create_human};
pub use civilizations::{
    CollapsedCivilization, Cohort, CurrentCivilization, DecliningCivilization, Degradation, PopulationSpec,
};
pub use crucible::{run_crucible, CRUCIBLE_ROUNDS};

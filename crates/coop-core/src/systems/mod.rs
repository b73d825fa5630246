//! Simulation Systems
//!
//! Decision, interaction, teaching, partner selection, metrics, and the
//! per-generation lifecycle schedule that ties them together as ECS systems.

pub mod decision;
pub mod interaction;
pub mod lifecycle;
pub mod metrics;
pub mod pairing;
pub mod teaching;

// Re-export commonly used systems
pub use decision::decide;
pub use interaction::{interact, resolve_interactions, resolve_payoffs, InteractionReport, Payoff};
pub use lifecycle::{check_collapse, cull_population, decay_scars, generation_schedule, give_births, StepOutcome};
pub use metrics::{aggregate, record_metrics};
pub use pairing::{select_partners, Reach};
pub use teaching::{maybe_teach, receive_teaching, Lesson};

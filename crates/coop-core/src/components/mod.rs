//! Components
//!
//! Agent and scar data: what each participant is and what it remembers,
//! plus the world-level resources the generation systems share.

pub mod agent;
pub mod scar;
pub mod world;

pub use agent::*;
pub use scar::*;
pub use world::*;

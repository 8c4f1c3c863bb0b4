//! Query modules, one per table.

pub mod evaluations;
pub mod friction;
pub mod games;
pub mod moves;
pub mod stats;
pub mod triggers;

//! Core types, traits, errors, config, and tracing for the friction pipeline.
//!
//! Every other crate in the workspace depends on this one; it has no
//! knowledge of SQLite, PGN syntax, or engine processes.

pub mod config;
pub mod errors;
pub mod tracing;
pub mod traits;
pub mod types;

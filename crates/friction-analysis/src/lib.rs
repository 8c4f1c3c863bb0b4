//! Analysis side of the friction pipeline.
//!
//! Reads clock-annotated game archives, evaluates positions with a UCI
//! engine, derives per-move friction metrics and L2 trigger outcomes, and
//! tests whether missing friction predicts blunders. The same L2 question
//! is asked of player exports (`profile`) and of non-chess records
//! (`domains`).

pub mod chess;
pub mod domains;
pub mod engine;
pub mod friction;
pub mod pgn;
pub mod pipeline;
pub mod position;
pub mod profile;
pub mod statistics;
pub mod triggers;

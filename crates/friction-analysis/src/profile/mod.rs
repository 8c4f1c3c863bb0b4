//! Player L2 signature from exported API games.
//!
//! Works from clock data alone: no engine, no store. A signature describes
//! how a player's think time shifts between opening, middlegame and
//! endgame, and is compared against configured reference players.
//! Exports that carry server analysis also yield L1/L2/L3 blunder counts.

pub mod classify;
pub mod levels;
pub mod records;
pub mod signature;

pub use classify::{classify, compare_to_benchmarks, BenchmarkComparison, Classification, PotentialCategory, Style};
pub use levels::{classify_error, classify_player_errors, ErrorLevel, ErrorLevels};
pub use records::{read_ndjson, ApiBatch, ApiGame, ApiPlayer};
pub use signature::{compute_signature, L2Signature, PlayerProfile};

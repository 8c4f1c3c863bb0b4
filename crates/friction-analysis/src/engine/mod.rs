//! Engine client and evaluation cache.
//!
//! `Evaluator` resolves a position through three layers: an in-memory
//! cache, the durable `EvaluationStore`, and finally a UCI engine process
//! launched on first need and kept alive across calls.

pub mod backend;
pub mod cache;
pub mod evaluator;
pub mod uci;

pub use backend::{AnalysisBackend, EngineLauncher, EngineSettings, PvLine};
pub use cache::EvalCache;
pub use evaluator::{Evaluator, EvaluatorStats};
pub use uci::{parse_info_line, UciEngine, UciLauncher};

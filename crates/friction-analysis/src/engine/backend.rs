//! Seams between the evaluator and a concrete engine.

use std::path::PathBuf;

use friction_core::config::EngineConfig;
use friction_core::errors::EngineError;
use friction_core::types::{EngineScore, RankedMove};

/// Search settings shared by launcher and evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub path: PathBuf,
    pub depth: u32,
    pub multipv: u32,
    pub threads: u32,
    pub hash_mb: u32,
}

impl From<&EngineConfig> for EngineSettings {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            path: cfg.effective_path(),
            depth: cfg.effective_depth(),
            multipv: cfg.effective_multipv(),
            threads: cfg.effective_threads(),
            hash_mb: cfg.effective_hash_mb(),
        }
    }
}

/// One principal variation reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PvLine {
    /// 1-based line index.
    pub multipv: u32,
    pub depth: u32,
    pub score: EngineScore,
    /// UCI moves, first move first.
    pub moves: Vec<String>,
}

impl PvLine {
    /// The line's first move with its score, if the line has a move.
    pub fn to_ranked(&self) -> Option<RankedMove> {
        self.moves.first().map(|uci| RankedMove {
            uci: uci.clone(),
            eval_cp: self.score.to_centipawns(),
            depth: self.depth,
        })
    }
}

/// A running engine that can analyse positions.
pub trait AnalysisBackend {
    /// Analyse `fen` to `depth`, returning up to `multipv` lines.
    fn analyse(&mut self, fen: &str, depth: u32, multipv: u32) -> Result<Vec<PvLine>, EngineError>;

    /// Release the engine. Calling twice is harmless.
    fn shutdown(&mut self) -> Result<(), EngineError>;
}

/// Creates backends on demand.
pub trait EngineLauncher {
    type Backend: AnalysisBackend;

    fn launch(&self) -> Result<Self::Backend, EngineError>;
}

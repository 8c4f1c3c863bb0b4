//! Engine process and evaluation settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// UCI engine binary. Default: `/usr/games/stockfish`.
    pub path: Option<PathBuf>,
    /// Search depth per position. Default: 14.
    pub depth: Option<u32>,
    /// Number of principal variations requested. Default: 5.
    pub multipv: Option<u32>,
    /// Default: 4.
    pub threads: Option<u32>,
    /// Hash table size in MB. Default: 1024.
    pub hash_mb: Option<u32>,
    /// Full moves skipped at the start of each game. Default: 8.
    pub skip_opening_moves: Option<u32>,
    /// In-memory evaluation cache entries. Default: 100 000.
    pub cache_capacity: Option<u64>,
    /// Extra loss charged to a move outside the engine's lines. Default: 50.
    pub outside_top_penalty_cp: Option<f64>,
}

impl EngineConfig {
    pub fn effective_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from("/usr/games/stockfish"))
    }

    pub fn effective_depth(&self) -> u32 {
        self.depth.unwrap_or(14)
    }

    pub fn effective_multipv(&self) -> u32 {
        self.multipv.unwrap_or(5)
    }

    pub fn effective_threads(&self) -> u32 {
        self.threads.unwrap_or(4)
    }

    pub fn effective_hash_mb(&self) -> u32 {
        self.hash_mb.unwrap_or(1024)
    }

    pub fn effective_skip_opening_moves(&self) -> u32 {
        self.skip_opening_moves.unwrap_or(8)
    }

    pub fn effective_cache_capacity(&self) -> u64 {
        self.cache_capacity.unwrap_or(100_000)
    }

    pub fn effective_outside_top_penalty_cp(&self) -> f64 {
        self.outside_top_penalty_cp.unwrap_or(50.0)
    }
}

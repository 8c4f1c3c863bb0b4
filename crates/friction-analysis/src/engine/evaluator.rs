//! Cached, lazily launched position evaluation.

use std::sync::Arc;

use friction_core::errors::EngineError;
use friction_core::traits::EvaluationStore;
use friction_core::types::{EvaluationRecord, PositionKey};

use super::backend::{AnalysisBackend, EngineLauncher};
use super::cache::EvalCache;
use crate::chess::Board;

/// Lookup counters for one evaluator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluatorStats {
    pub memory_hits: u64,
    pub store_hits: u64,
    pub engine_calls: u64,
    pub failures: u64,
    pub store_failures: u64,
}

/// Evaluates positions through memory cache, durable store, then engine.
///
/// The engine starts on the first miss and is reused until the evaluator is
/// dropped. A failed analysis discards the engine; the next miss relaunches.
pub struct Evaluator<'s, L: EngineLauncher> {
    launcher: L,
    backend: Option<L::Backend>,
    cache: EvalCache,
    store: Option<&'s dyn EvaluationStore>,
    depth: u32,
    multipv: u32,
    stats: EvaluatorStats,
}

impl<'s, L: EngineLauncher> Evaluator<'s, L> {
    pub fn new(launcher: L, depth: u32, multipv: u32, cache_capacity: u64) -> Self {
        Self {
            launcher,
            backend: None,
            cache: EvalCache::new(cache_capacity),
            store: None,
            depth,
            multipv,
            stats: EvaluatorStats::default(),
        }
    }

    pub fn with_store(mut self, store: &'s dyn EvaluationStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Launch the engine now instead of on the first miss.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.backend.is_none() {
            self.backend = Some(self.launcher.launch()?);
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.backend.is_some()
    }

    pub fn stats(&self) -> EvaluatorStats {
        self.stats
    }

    pub fn evaluate(&mut self, fen: &str) -> Result<Arc<EvaluationRecord>, EngineError> {
        let key = PositionKey::from_fen(fen);

        if let Some(hit) = self.cache.get(&key) {
            self.stats.memory_hits += 1;
            return Ok(hit);
        }
        if let Some(stored) = self.load_stored(&key) {
            self.stats.store_hits += 1;
            let stored = Arc::new(stored);
            self.cache.insert(Arc::clone(&stored));
            return Ok(stored);
        }

        let record = match self.analyse(fen, key) {
            Ok(record) => Arc::new(record),
            Err(e) => {
                self.stats.failures += 1;
                return Err(e);
            }
        };
        if let Some(store) = self.store {
            if let Err(e) = store.save_evaluation(&record) {
                self.stats.store_failures += 1;
                tracing::warn!(position = %record.position_key, error = %e, "failed to persist evaluation");
            }
        }
        self.cache.insert(Arc::clone(&record));
        Ok(record)
    }

    /// Release the engine, if one is running.
    pub fn shutdown(&mut self) -> Result<(), EngineError> {
        match self.backend.take() {
            Some(mut backend) => backend.shutdown(),
            None => Ok(()),
        }
    }

    fn load_stored(&mut self, key: &PositionKey) -> Option<EvaluationRecord> {
        let store = self.store?;
        match store.load_evaluation(key, self.depth, self.multipv) {
            Ok(found) => found.filter(|r| !r.variations.is_empty()),
            Err(e) => {
                self.stats.store_failures += 1;
                tracing::warn!(position = %key, error = %e, "evaluation store lookup failed");
                None
            }
        }
    }

    fn analyse(&mut self, fen: &str, key: PositionKey) -> Result<EvaluationRecord, EngineError> {
        Board::from_fen(fen).map_err(|e| EngineError::InvalidPosition {
            fen: fen.to_string(),
            message: e.to_string(),
        })?;
        self.start()?;
        let Some(backend) = self.backend.as_mut() else {
            return Err(EngineError::Terminated);
        };

        self.stats.engine_calls += 1;
        let lines = match backend.analyse(fen, self.depth, self.multipv) {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!(fen, error = %e, "engine analysis failed, dropping engine");
                if let Some(mut dead) = self.backend.take() {
                    let _ = dead.shutdown();
                }
                return Err(e);
            }
        };

        let variations = lines.iter().filter_map(|line| line.to_ranked()).collect();
        EvaluationRecord::new(key, variations, self.depth, self.multipv)
            .ok_or_else(|| EngineError::EmptyAnalysis { fen: fen.to_string() })
    }
}

impl<L: EngineLauncher> Drop for Evaluator<'_, L> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::warn!(error = %e, "engine shutdown failed");
        }
    }
}

//! Bounded in-memory evaluation cache.

use std::sync::Arc;

use friction_core::types::{EvaluationRecord, PositionKey};
use moka::sync::Cache;

/// Evaluations by canonical position, with hit accounting.
pub struct EvalCache {
    inner: Cache<PositionKey, Arc<EvaluationRecord>>,
    hits: u64,
    misses: u64,
}

impl EvalCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Cache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, key: &PositionKey) -> Option<Arc<EvaluationRecord>> {
        let found = self.inner.get(key);
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    pub fn insert(&self, record: Arc<EvaluationRecord>) {
        self.inner.insert(record.position_key.clone(), record);
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use friction_core::types::RankedMove;

    #[test]
    fn counts_hits_and_misses() {
        let key = PositionKey::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        let record = EvaluationRecord::new(
            key.clone(),
            vec![RankedMove {
                uci: "e1d1".to_string(),
                eval_cp: 0,
                depth: 10,
            }],
            10,
            1,
        )
        .unwrap();

        let mut cache = EvalCache::new(16);
        assert!(cache.get(&key).is_none());
        cache.insert(Arc::new(record));
        assert_eq!(cache.get(&key).unwrap().best_move, "e1d1");
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hit_rate(), 0.5);
    }
}

//! Durable evaluation cache seam.

use crate::errors::StorageError;
use crate::types::evaluation::{EvaluationRecord, PositionKey};

/// Persistent backing for engine evaluations.
///
/// Records are keyed by position and by the engine settings that produced
/// them, so analyses at different depth or line counts never mix.
pub trait EvaluationStore {
    fn load_evaluation(
        &self,
        key: &PositionKey,
        depth: u32,
        multipv: u32,
    ) -> Result<Option<EvaluationRecord>, StorageError>;

    fn save_evaluation(&self, record: &EvaluationRecord) -> Result<(), StorageError>;
}

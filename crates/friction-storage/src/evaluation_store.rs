//! `EvaluationStore` backed by the evaluations table.

use friction_core::errors::StorageError;
use friction_core::traits::EvaluationStore;
use friction_core::types::{EvaluationRecord, PositionKey};

use crate::queries::evaluations;
use crate::{unix_now, DatabaseManager};

impl EvaluationStore for DatabaseManager {
    fn load_evaluation(
        &self,
        key: &PositionKey,
        depth: u32,
        multipv: u32,
    ) -> Result<Option<EvaluationRecord>, StorageError> {
        self.with_conn(|conn| evaluations::get_evaluation(conn, key, depth, multipv))
    }

    fn save_evaluation(&self, record: &EvaluationRecord) -> Result<(), StorageError> {
        self.with_conn(|conn| evaluations::upsert_evaluation(conn, record, unix_now()))
    }
}

//! Queries for the evaluations table: the durable engine cache.

use friction_core::errors::StorageError;
use friction_core::types::{EvaluationRecord, PositionKey, RankedMove};
use rusqlite::{params, Connection, OptionalExtension};

pub fn get_evaluation(
    conn: &Connection,
    key: &PositionKey,
    depth: u32,
    multipv: u32,
) -> Result<Option<EvaluationRecord>, StorageError> {
    let row = conn
        .query_row(
            "SELECT eval_cp, best_move, variations_json FROM evaluations
             WHERE position_key = ?1 AND depth = ?2 AND multipv = ?3",
            params![key.as_str(), depth, multipv],
            |row| {
                Ok((
                    row.get::<_, i32>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let Some((eval_cp, best_move, json)) = row else {
        return Ok(None);
    };
    let variations: Vec<RankedMove> =
        serde_json::from_str(&json).map_err(|e| StorageError::CorruptRow {
            table: "evaluations".to_string(),
            message: format!("{key}: {e}"),
        })?;
    if variations.is_empty() {
        return Err(StorageError::CorruptRow {
            table: "evaluations".to_string(),
            message: format!("{key}: no variations"),
        });
    }

    Ok(Some(EvaluationRecord {
        position_key: key.clone(),
        eval_cp,
        best_move,
        variations,
        depth,
        multipv,
    }))
}

/// Insert or replace the evaluation for a (position, depth, multipv) triple.
pub fn upsert_evaluation(
    conn: &Connection,
    record: &EvaluationRecord,
    created_at: i64,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(&record.variations).map_err(|e| StorageError::SqliteError {
        message: format!("serialize variations: {e}"),
    })?;
    conn.execute(
        "INSERT INTO evaluations
            (position_key, depth, multipv, eval_cp, best_move, variations_json, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(position_key, depth, multipv) DO UPDATE SET
            eval_cp = excluded.eval_cp,
            best_move = excluded.best_move,
            variations_json = excluded.variations_json,
            created_at = excluded.created_at",
        params![
            record.position_key.as_str(),
            record.depth,
            record.multipv,
            record.eval_cp,
            record.best_move,
            json,
            created_at,
        ],
    )
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(())
}

pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM evaluations", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

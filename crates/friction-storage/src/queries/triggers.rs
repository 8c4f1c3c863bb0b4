//! Queries for the l2_triggers table and the joined trigger input.

use friction_core::errors::StorageError;
use friction_core::types::{L2TriggerMetrics, TriggerMove, TriggerOutcome};
use rusqlite::{params, Connection};

/// Analyzed moves of one game joined with their board data, ascending ply.
pub fn trigger_inputs(conn: &Connection, game_id: &str) -> Result<Vec<TriggerMove>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT f.ply, f.is_white, m.uci, m.fen_before, f.num_alternatives,
                    f.eval_before, f.eval_after, f.eval_drop, f.is_blunder,
                    f.think_time_normalized
             FROM friction_analysis f
             JOIN moves m ON m.game_id = f.game_id AND m.ply = f.ply
             WHERE f.game_id = ?1
             ORDER BY f.ply",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let rows = stmt
        .query_map(params![game_id], |row| {
            Ok(TriggerMove {
                ply: row.get(0)?,
                is_white: row.get(1)?,
                uci: row.get(2)?,
                fen_before: row.get(3)?,
                num_alternatives: row.get(4)?,
                eval_before: row.get(5)?,
                eval_after: row.get(6)?,
                eval_drop: row.get(7)?,
                is_blunder: row.get(8)?,
                think_time_normalized: row.get(9)?,
            })
        })
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

/// Insert or replace the trigger row for its (game_id, ply).
pub fn upsert_trigger(conn: &Connection, t: &L2TriggerMetrics) -> Result<(), StorageError> {
    conn.execute(
        "INSERT OR REPLACE INTO l2_triggers
            (game_id, ply, optionality_delta, eval_gradient, criticality_gap,
             opponent_surprise, trigger_score, l2_should_fire, friction_present,
             think_time_normalized, is_blunder, eval_drop, l2_hit, l2_miss, l2_false_alarm)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            t.game_id,
            t.ply,
            t.optionality_delta,
            t.eval_gradient,
            t.criticality_gap,
            t.opponent_surprise,
            t.trigger_score,
            t.should_fire,
            t.friction_present,
            t.think_time_normalized,
            t.is_blunder,
            t.eval_drop,
            t.is_hit(),
            t.is_miss(),
            t.is_false_alarm(),
        ],
    )
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(())
}

/// Every trigger row, ordered by game then ply.
pub fn query_all(conn: &Connection) -> Result<Vec<L2TriggerMetrics>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT game_id, ply, optionality_delta, eval_gradient, criticality_gap,
                    opponent_surprise, trigger_score, l2_should_fire, friction_present,
                    think_time_normalized, is_blunder, eval_drop,
                    l2_hit, l2_miss, l2_false_alarm
             FROM l2_triggers ORDER BY game_id, ply",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let rows = stmt
        .query_map([], |row| {
            Ok(L2TriggerMetrics {
                game_id: row.get(0)?,
                ply: row.get(1)?,
                optionality_delta: row.get(2)?,
                eval_gradient: row.get(3)?,
                criticality_gap: row.get(4)?,
                opponent_surprise: row.get(5)?,
                trigger_score: row.get(6)?,
                should_fire: row.get(7)?,
                friction_present: row.get(8)?,
                think_time_normalized: row.get(9)?,
                is_blunder: row.get(10)?,
                eval_drop: row.get(11)?,
                outcome: TriggerOutcome::from_flags(row.get(12)?, row.get(13)?, row.get(14)?),
            })
        })
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM l2_triggers", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

//! Queries for the moves table.

use friction_core::errors::StorageError;
use friction_core::types::MoveRecord;
use rusqlite::{params, Connection};

pub fn insert_moves(conn: &Connection, game_id: &str, moves: &[MoveRecord]) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT OR IGNORE INTO moves
                (game_id, ply, san, uci, fen_before, fen_after,
                 clock_before, clock_after, think_time, is_white)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    for mv in moves {
        stmt.execute(params![
            game_id,
            mv.ply,
            mv.san,
            mv.uci,
            mv.fen_before,
            mv.fen_after,
            mv.clock_before,
            mv.clock_after,
            mv.think_time,
            mv.is_white,
        ])
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    }
    Ok(())
}

/// Moves of one game, ascending by ply.
pub fn moves_for_game(conn: &Connection, game_id: &str) -> Result<Vec<MoveRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT ply, san, uci, fen_before, fen_after, clock_before, clock_after,
                    think_time, is_white
             FROM moves WHERE game_id = ?1 ORDER BY ply",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let rows = stmt
        .query_map(params![game_id], |row| {
            Ok(MoveRecord {
                ply: row.get(0)?,
                san: row.get(1)?,
                uci: row.get(2)?,
                fen_before: row.get(3)?,
                fen_after: row.get(4)?,
                clock_before: row.get(5)?,
                clock_after: row.get(6)?,
                think_time: row.get(7)?,
                is_white: row.get(8)?,
            })
        })
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM moves", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

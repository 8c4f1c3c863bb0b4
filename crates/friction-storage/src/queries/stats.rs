//! Row counts across tables for the `stats` command.

use friction_core::errors::StorageError;
use rusqlite::Connection;

use super::{evaluations, friction, games, moves, triggers};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub games: i64,
    pub analyzed_games: i64,
    pub moves: i64,
    pub evaluations: i64,
    pub friction_records: i64,
    pub blunders: i64,
    pub friction_gaps: i64,
    pub trigger_rows: i64,
    pub trigger_misses: i64,
}

fn scalar(conn: &Connection, sql: &str) -> Result<i64, StorageError> {
    conn.query_row(sql, [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

pub fn table_counts(conn: &Connection) -> Result<TableCounts, StorageError> {
    Ok(TableCounts {
        games: games::count(conn)?,
        analyzed_games: scalar(conn, "SELECT COUNT(*) FROM games WHERE analyzed_at IS NOT NULL")?,
        moves: moves::count(conn)?,
        evaluations: evaluations::count(conn)?,
        friction_records: friction::count(conn)?,
        blunders: scalar(conn, "SELECT COUNT(*) FROM friction_analysis WHERE is_blunder = 1")?,
        friction_gaps: scalar(conn, "SELECT COUNT(*) FROM friction_analysis WHERE friction_gap = 1")?,
        trigger_rows: triggers::count(conn)?,
        trigger_misses: scalar(conn, "SELECT COUNT(*) FROM l2_triggers WHERE l2_miss = 1")?,
    })
}

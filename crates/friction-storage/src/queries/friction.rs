//! Queries for the friction_analysis table.

use friction_core::errors::StorageError;
use friction_core::types::{FrictionLevel, FrictionRecord, Severity};
use rusqlite::{params, Connection, Row};

/// Optional row filters for `query_filtered`.
#[derive(Debug, Clone, Default)]
pub struct FrictionFilter {
    pub min_rating: Option<u32>,
    pub max_rating: Option<u32>,
    pub exclude_time_pressure: bool,
    pub blunders_only: bool,
}

const SELECT_COLUMNS: &str = "SELECT game_id, ply, is_white, player_rating,
        think_time, think_time_normalized, time_remaining, time_pressure,
        eval_before, eval_after, eval_drop, was_best_move, move_rank, severity,
        num_alternatives, eval_spread, has_alternatives,
        expected_friction, actual_friction, friction_gap, friction_level,
        game_phase, num_legal_moves, complexity_score
    FROM friction_analysis";

/// Insert or replace the record for its (game_id, ply).
pub fn upsert_friction(conn: &Connection, r: &FrictionRecord) -> Result<(), StorageError> {
    conn.execute(
        "INSERT OR REPLACE INTO friction_analysis
            (game_id, ply, is_white, player_rating,
             think_time, think_time_normalized, time_remaining, time_pressure,
             eval_before, eval_after, eval_drop, was_best_move, move_rank, severity,
             is_blunder, is_mistake, is_inaccuracy,
             num_alternatives, eval_spread, has_alternatives,
             expected_friction, actual_friction, friction_gap, friction_level,
             game_phase, num_legal_moves, complexity_score)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                 ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27)",
        params![
            r.game_id,
            r.ply,
            r.is_white,
            r.player_rating,
            r.think_time,
            r.think_time_normalized,
            r.time_remaining,
            r.time_pressure,
            r.eval_before,
            r.eval_after,
            r.eval_drop,
            r.was_best_move,
            r.move_rank,
            r.severity.as_str(),
            r.is_blunder(),
            r.is_mistake(),
            r.is_inaccuracy(),
            r.num_alternatives,
            r.eval_spread,
            r.has_alternatives,
            r.expected_friction,
            r.actual_friction,
            r.friction_gap,
            r.friction_level.as_str(),
            r.game_phase,
            r.num_legal_moves,
            r.complexity_score,
        ],
    )
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(())
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<(FrictionRecord, String, String)> {
    let severity: String = row.get(13)?;
    let level: String = row.get(20)?;
    let record = FrictionRecord {
        game_id: row.get(0)?,
        ply: row.get(1)?,
        is_white: row.get(2)?,
        player_rating: row.get(3)?,
        think_time: row.get(4)?,
        think_time_normalized: row.get(5)?,
        time_remaining: row.get(6)?,
        time_pressure: row.get(7)?,
        eval_before: row.get(8)?,
        eval_after: row.get(9)?,
        eval_drop: row.get(10)?,
        was_best_move: row.get(11)?,
        move_rank: row.get(12)?,
        severity: Severity::None,
        num_alternatives: row.get(14)?,
        eval_spread: row.get(15)?,
        has_alternatives: row.get(16)?,
        expected_friction: row.get(17)?,
        actual_friction: row.get(18)?,
        friction_gap: row.get(19)?,
        friction_level: FrictionLevel::Normal,
        game_phase: row.get(21)?,
        num_legal_moves: row.get(22)?,
        complexity_score: row.get(23)?,
    };
    Ok((record, severity, level))
}

fn collect(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<FrictionRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(sql)
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map(params, map_row)
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let mut out = Vec::new();
    for row in rows {
        let (mut record, severity, level) =
            row.map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
        record.severity = Severity::parse(&severity).ok_or_else(|| StorageError::CorruptRow {
            table: "friction_analysis".to_string(),
            message: format!("unknown severity {severity:?}"),
        })?;
        record.friction_level =
            FrictionLevel::parse(&level).ok_or_else(|| StorageError::CorruptRow {
                table: "friction_analysis".to_string(),
                message: format!("unknown friction level {level:?}"),
            })?;
        out.push(record);
    }
    Ok(out)
}

/// Every friction record, ordered by game then ply.
pub fn query_all(conn: &Connection) -> Result<Vec<FrictionRecord>, StorageError> {
    let sql = format!("{SELECT_COLUMNS} ORDER BY game_id, ply");
    collect(conn, &sql, &[])
}

pub fn query_filtered(
    conn: &Connection,
    filter: &FrictionFilter,
) -> Result<Vec<FrictionRecord>, StorageError> {
    let sql = format!(
        "{SELECT_COLUMNS}
         WHERE (?1 IS NULL OR player_rating >= ?1)
           AND (?2 IS NULL OR player_rating <= ?2)
           AND (?3 = 0 OR time_pressure = 0)
           AND (?4 = 0 OR is_blunder = 1)
         ORDER BY game_id, ply"
    );
    collect(
        conn,
        &sql,
        &[
            &filter.min_rating,
            &filter.max_rating,
            &filter.exclude_time_pressure,
            &filter.blunders_only,
        ],
    )
}

pub fn for_game(conn: &Connection, game_id: &str) -> Result<Vec<FrictionRecord>, StorageError> {
    let sql = format!("{SELECT_COLUMNS} WHERE game_id = ?1 ORDER BY ply");
    collect(conn, &sql, &[&game_id])
}

/// Ids of games that have at least one friction record.
pub fn analyzed_game_ids(conn: &Connection) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT DISTINCT game_id FROM friction_analysis ORDER BY game_id")
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map([], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM friction_analysis", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

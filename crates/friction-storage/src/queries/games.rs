//! Queries for the games table.

use friction_core::errors::StorageError;
use friction_core::types::{GameRecord, GameResult, TimeControl};
use rusqlite::{params, Connection, OptionalExtension};

use super::moves;

/// A stored game awaiting the friction phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingGame {
    pub game_id: String,
    pub white_rating: Option<u32>,
    pub black_rating: Option<u32>,
    pub increment_seconds: u32,
}

/// Insert a game and its moves. Returns `false` without touching anything
/// when the game id already exists. Call inside a transaction so a failed
/// move insert leaves no partial game behind.
pub fn insert_game(conn: &Connection, game: &GameRecord, created_at: i64) -> Result<bool, StorageError> {
    let (tc_text, base, inc) = match game.time_control {
        Some(tc) => (Some(tc.to_string()), Some(tc.base_seconds), Some(tc.increment_seconds)),
        None => (None, None, None),
    };
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO games
                (game_id, white_rating, black_rating, time_control, base_seconds,
                 increment_seconds, result, eco, num_plies, date, termination,
                 white_title, black_title, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                game.game_id,
                game.white_rating,
                game.black_rating,
                tc_text,
                base,
                inc,
                game.result.as_str(),
                game.eco,
                game.moves.len() as i64,
                game.date,
                game.termination,
                game.white_title,
                game.black_title,
                created_at,
            ],
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    if inserted == 0 {
        return Ok(false);
    }
    moves::insert_moves(conn, &game.game_id, &game.moves)?;
    Ok(true)
}

/// Load a game with its moves in ascending ply order.
pub fn get_game(conn: &Connection, game_id: &str) -> Result<Option<GameRecord>, StorageError> {
    let header = conn
        .query_row(
            "SELECT game_id, white_rating, black_rating, base_seconds, increment_seconds,
                    result, eco, date, termination, white_title, black_title
             FROM games WHERE game_id = ?1",
            params![game_id],
            |row| {
                let base: Option<u32> = row.get(3)?;
                let inc: Option<u32> = row.get(4)?;
                let result: String = row.get(5)?;
                Ok(GameRecord {
                    game_id: row.get(0)?,
                    white_rating: row.get(1)?,
                    black_rating: row.get(2)?,
                    time_control: base.map(|b| TimeControl::new(b, inc.unwrap_or(0))),
                    result: GameResult::parse(&result),
                    eco: row.get(6)?,
                    date: row.get(7)?,
                    termination: row.get(8)?,
                    white_title: row.get(9)?,
                    black_title: row.get(10)?,
                    moves: Vec::new(),
                })
            },
        )
        .optional()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    match header {
        Some(mut game) => {
            game.moves = moves::moves_for_game(conn, game_id)?;
            Ok(Some(game))
        }
        None => Ok(None),
    }
}

/// Games the friction phase has not processed yet, oldest first.
pub fn games_needing_analysis(
    conn: &Connection,
    limit: Option<usize>,
) -> Result<Vec<PendingGame>, StorageError> {
    let limit = limit.map_or(-1, |l| l as i64);
    let mut stmt = conn
        .prepare_cached(
            "SELECT game_id, white_rating, black_rating, COALESCE(increment_seconds, 0)
             FROM games WHERE analyzed_at IS NULL
             ORDER BY created_at, game_id LIMIT ?1",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let rows = stmt
        .query_map(params![limit], |row| {
            Ok(PendingGame {
                game_id: row.get(0)?,
                white_rating: row.get(1)?,
                black_rating: row.get(2)?,
                increment_seconds: row.get(3)?,
            })
        })
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

/// Record that the friction phase finished with a game.
pub fn mark_analyzed(conn: &Connection, game_id: &str, analyzed_at: i64) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE games SET analyzed_at = ?1 WHERE game_id = ?2",
        params![analyzed_at, game_id],
    )
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(())
}

pub fn exists(conn: &Connection, game_id: &str) -> Result<bool, StorageError> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM games WHERE game_id = ?1)",
        params![game_id],
        |row| row.get(0),
    )
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

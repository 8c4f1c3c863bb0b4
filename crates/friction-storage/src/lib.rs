//! SQLite persistence for games, moves, evaluations, friction metrics and
//! trigger rows.
//!
//! Query functions take a `&Connection` so they compose inside a
//! transaction; `DatabaseManager` owns the connection and hands it out.

pub mod connection;
pub mod evaluation_store;
pub mod migrations;
pub mod queries;

pub use connection::DatabaseManager;

/// Current wall-clock time as Unix seconds.
pub fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

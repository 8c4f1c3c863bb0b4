//! V001: games and their moves.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS games (
    game_id TEXT PRIMARY KEY,
    white_rating INTEGER,
    black_rating INTEGER,
    time_control TEXT,
    base_seconds INTEGER,
    increment_seconds INTEGER,
    result TEXT NOT NULL,
    eco TEXT NOT NULL DEFAULT '',
    num_plies INTEGER NOT NULL,
    date TEXT NOT NULL DEFAULT '',
    termination TEXT NOT NULL DEFAULT '',
    white_title TEXT,
    black_title TEXT,
    created_at INTEGER NOT NULL,
    -- Set once the friction phase has processed the game, even when it
    -- produced no rows. NULL means pending.
    analyzed_at INTEGER
) STRICT;

CREATE INDEX IF NOT EXISTS idx_games_pending
    ON games(game_id) WHERE analyzed_at IS NULL;

CREATE TABLE IF NOT EXISTS moves (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    game_id TEXT NOT NULL REFERENCES games(game_id) ON DELETE CASCADE,
    ply INTEGER NOT NULL,
    san TEXT NOT NULL,
    uci TEXT NOT NULL,
    fen_before TEXT NOT NULL,
    fen_after TEXT NOT NULL,
    clock_before REAL,
    clock_after REAL,
    think_time REAL,
    is_white INTEGER NOT NULL,
    UNIQUE(game_id, ply)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_moves_game ON moves(game_id);
"#;

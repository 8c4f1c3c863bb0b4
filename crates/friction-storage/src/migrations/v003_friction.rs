//! V003: per-move friction metrics.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS friction_analysis (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    game_id TEXT NOT NULL REFERENCES games(game_id) ON DELETE CASCADE,
    ply INTEGER NOT NULL,
    is_white INTEGER NOT NULL,
    player_rating INTEGER,

    think_time REAL NOT NULL,
    think_time_normalized REAL NOT NULL,
    time_remaining REAL NOT NULL,
    time_pressure INTEGER NOT NULL,

    eval_before INTEGER NOT NULL,
    eval_after INTEGER NOT NULL,
    eval_drop REAL NOT NULL,
    was_best_move INTEGER NOT NULL,
    move_rank INTEGER NOT NULL,
    severity TEXT NOT NULL,
    is_blunder INTEGER NOT NULL,
    is_mistake INTEGER NOT NULL,
    is_inaccuracy INTEGER NOT NULL,

    num_alternatives INTEGER NOT NULL,
    eval_spread REAL NOT NULL,
    has_alternatives INTEGER NOT NULL,

    expected_friction INTEGER NOT NULL,
    actual_friction INTEGER NOT NULL,
    friction_gap INTEGER NOT NULL,
    friction_level TEXT NOT NULL,

    game_phase REAL NOT NULL,
    num_legal_moves INTEGER NOT NULL,
    complexity_score REAL NOT NULL,

    UNIQUE(game_id, ply)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_friction_game ON friction_analysis(game_id);
CREATE INDEX IF NOT EXISTS idx_friction_blunder ON friction_analysis(is_blunder);
CREATE INDEX IF NOT EXISTS idx_friction_gap ON friction_analysis(friction_gap);
CREATE INDEX IF NOT EXISTS idx_friction_pressure ON friction_analysis(time_pressure);
"#;

//! V004: L2 trigger rows.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS l2_triggers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    game_id TEXT NOT NULL REFERENCES games(game_id) ON DELETE CASCADE,
    ply INTEGER NOT NULL,

    optionality_delta INTEGER,
    eval_gradient REAL,
    criticality_gap REAL,
    opponent_surprise INTEGER,
    trigger_score REAL,

    l2_should_fire INTEGER NOT NULL,
    friction_present INTEGER NOT NULL,
    think_time_normalized REAL NOT NULL,
    is_blunder INTEGER NOT NULL,
    eval_drop REAL NOT NULL,

    l2_hit INTEGER NOT NULL,
    l2_miss INTEGER NOT NULL,
    l2_false_alarm INTEGER NOT NULL,

    UNIQUE(game_id, ply),
    CHECK (l2_hit + l2_miss + l2_false_alarm <= 1)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_l2_game ON l2_triggers(game_id);
CREATE INDEX IF NOT EXISTS idx_l2_fire ON l2_triggers(l2_should_fire);
CREATE INDEX IF NOT EXISTS idx_l2_miss ON l2_triggers(l2_miss);
"#;

//! V002: durable engine evaluation cache.

pub const MIGRATION_SQL: &str = r#"
-- Keyed by canonical position plus the engine settings that produced the
-- lines, so analyses at different depth or line counts never collide.
CREATE TABLE IF NOT EXISTS evaluations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    position_key TEXT NOT NULL,
    depth INTEGER NOT NULL,
    multipv INTEGER NOT NULL,
    eval_cp INTEGER NOT NULL,
    best_move TEXT NOT NULL,
    variations_json TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    UNIQUE(position_key, depth, multipv)
) STRICT;
"#;

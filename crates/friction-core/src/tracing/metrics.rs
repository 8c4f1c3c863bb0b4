//! Structured field names shared by log events across the pipeline.
//!
//! Using the same names everywhere keeps log queries stable.

/// Parser: games read from the archive.
pub const GAMES_PARSED: &str = "games_parsed";

/// Parser: games that passed every filter.
pub const GAMES_ACCEPTED: &str = "games_accepted";

/// Parser: games rejected by a filter.
pub const GAMES_REJECTED: &str = "games_rejected";

/// Parser: games that could not be decoded.
pub const GAMES_MALFORMED: &str = "games_malformed";

/// Evaluator: in-memory cache hits.
pub const EVAL_MEMORY_HITS: &str = "eval_memory_hits";

/// Evaluator: durable cache hits.
pub const EVAL_STORE_HITS: &str = "eval_store_hits";

/// Evaluator: positions sent to the engine.
pub const ENGINE_CALLS: &str = "engine_calls";

/// Friction phase: records written.
pub const FRICTION_RECORDS: &str = "friction_records";

/// Trigger phase: rows written.
pub const TRIGGER_ROWS: &str = "trigger_rows";

/// Any phase: wall time in milliseconds.
pub const PHASE_DURATION_MS: &str = "phase_duration_ms";

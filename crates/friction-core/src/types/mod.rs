//! Domain types shared across the pipeline.

pub mod evaluation;
pub mod friction;
pub mod game;
pub mod position;
pub mod trigger;

pub use evaluation::{EngineScore, EvaluationRecord, PositionKey, RankedMove};
pub use friction::{FrictionLevel, FrictionRecord, Severity};
pub use game::{
    compute_think_time, GameRecord, GameResult, MoveRecord, TimeControl, TimeControlCategory,
};
pub use position::PositionFeatures;
pub use trigger::{L2TriggerMetrics, TriggerMove, TriggerOutcome};

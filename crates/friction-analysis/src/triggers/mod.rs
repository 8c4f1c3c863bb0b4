//! L2 trigger analysis: did the player slow down when the position
//! signalled that it needed more thought?

pub mod analyzer;
pub mod summary;

pub use analyzer::{TriggerAnalyzer, TriggerThresholds};
pub use summary::{SignalBreakdown, TriggerSummary};

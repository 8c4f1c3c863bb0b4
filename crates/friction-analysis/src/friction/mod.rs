//! Per-move friction metrics.

pub mod metrics;

pub use metrics::{FrictionAnalyzer, FrictionThresholds, MoveContext};

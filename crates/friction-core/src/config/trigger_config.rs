//! L2 trigger thresholds.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TriggerConfig {
    /// Absolute change in alternatives that fires. Default: 2.
    pub optionality_delta: Option<i32>,
    /// Evaluation swing between adjacent plies that fires. Default: 50.
    pub eval_gradient_cp: Option<f64>,
    /// Gap between the two best lines that fires. Default: 100.
    pub criticality_gap_cp: Option<f64>,
    /// Normalized think time at or above which friction is present. Default: 1.3.
    pub friction_threshold: Option<f64>,
    /// Games with fewer analyzed moves are skipped. Default: 4.
    pub min_moves: Option<usize>,
}

impl TriggerConfig {
    pub fn effective_optionality_delta(&self) -> i32 {
        self.optionality_delta.unwrap_or(2)
    }

    pub fn effective_eval_gradient_cp(&self) -> f64 {
        self.eval_gradient_cp.unwrap_or(50.0)
    }

    pub fn effective_criticality_gap_cp(&self) -> f64 {
        self.criticality_gap_cp.unwrap_or(100.0)
    }

    pub fn effective_friction_threshold(&self) -> f64 {
        self.friction_threshold.unwrap_or(1.3)
    }

    pub fn effective_min_moves(&self) -> usize {
        self.min_moves.unwrap_or(4)
    }
}

//! Move classification thresholds.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Default: 100.
    pub blunder_cp: Option<f64>,
    /// Default: 50.
    pub mistake_cp: Option<f64>,
    /// Default: 25.
    pub inaccuracy_cp: Option<f64>,
    /// Clock below which a move counts as played under pressure. Default: 30.
    pub time_pressure_seconds: Option<f64>,
    /// Normalized think time above which friction is high. Default: 1.5.
    pub high_friction_multiplier: Option<f64>,
    /// Normalized think time below which friction is low. Default: 0.7.
    pub low_friction_multiplier: Option<f64>,
    /// Think times at or under this many seconds are premoves. Default: 0.5.
    pub premove_threshold: Option<f64>,
    /// Band around the best line that counts as a real alternative. Default: 50.
    pub alternative_threshold_cp: Option<f64>,
}

impl ThresholdConfig {
    pub fn effective_blunder_cp(&self) -> f64 {
        self.blunder_cp.unwrap_or(100.0)
    }

    pub fn effective_mistake_cp(&self) -> f64 {
        self.mistake_cp.unwrap_or(50.0)
    }

    pub fn effective_inaccuracy_cp(&self) -> f64 {
        self.inaccuracy_cp.unwrap_or(25.0)
    }

    pub fn effective_time_pressure_seconds(&self) -> f64 {
        self.time_pressure_seconds.unwrap_or(30.0)
    }

    pub fn effective_high_friction_multiplier(&self) -> f64 {
        self.high_friction_multiplier.unwrap_or(1.5)
    }

    pub fn effective_low_friction_multiplier(&self) -> f64 {
        self.low_friction_multiplier.unwrap_or(0.7)
    }

    pub fn effective_premove_threshold(&self) -> f64 {
        self.premove_threshold.unwrap_or(0.5)
    }

    pub fn effective_alternative_threshold_cp(&self) -> f64 {
        self.alternative_threshold_cp.unwrap_or(50.0)
    }
}

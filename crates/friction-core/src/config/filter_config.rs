//! Game acceptance filters applied while parsing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FilterConfig {
    /// Default: 1000.
    pub min_rating: Option<u32>,
    /// Default: 2500.
    pub max_rating: Option<u32>,
    /// Minimum base time in seconds. Default: 600.
    pub min_time_control: Option<u32>,
    /// Default: true.
    pub require_clocks: Option<bool>,
    /// Fraction of moves that must carry a clock. Default: 0.9.
    pub min_clock_coverage: Option<f64>,
    /// Minimum full moves. Default: 20.
    pub min_moves: Option<u32>,
}

impl FilterConfig {
    pub fn effective_min_rating(&self) -> u32 {
        self.min_rating.unwrap_or(1000)
    }

    pub fn effective_max_rating(&self) -> u32 {
        self.max_rating.unwrap_or(2500)
    }

    pub fn effective_min_time_control(&self) -> u32 {
        self.min_time_control.unwrap_or(600)
    }

    pub fn effective_require_clocks(&self) -> bool {
        self.require_clocks.unwrap_or(true)
    }

    pub fn effective_min_clock_coverage(&self) -> f64 {
        self.min_clock_coverage.unwrap_or(0.9)
    }

    pub fn effective_min_moves(&self) -> u32 {
        self.min_moves.unwrap_or(20)
    }
}

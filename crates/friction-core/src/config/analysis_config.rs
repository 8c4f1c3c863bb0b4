//! Statistical analysis settings.

use serde::{Deserialize, Serialize};

pub const DEFAULT_RATING_BANDS: [u32; 8] = [1000, 1200, 1400, 1600, 1800, 2000, 2200, 2500];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Default: 0.05.
    pub significance_level: Option<f64>,
    /// Ascending band edges for blunder-rate breakdowns.
    #[serde(default)]
    pub rating_bands: Vec<u32>,
    /// Correlations below this many rows report a neutral result. Default: 10.
    pub min_correlation_samples: Option<usize>,
    /// Logistic regression runs only with at least this many rows. Default: 100.
    pub min_regression_samples: Option<usize>,
}

impl AnalysisConfig {
    pub fn effective_significance_level(&self) -> f64 {
        self.significance_level.unwrap_or(0.05)
    }

    pub fn effective_rating_bands(&self) -> Vec<u32> {
        if self.rating_bands.is_empty() {
            DEFAULT_RATING_BANDS.to_vec()
        } else {
            self.rating_bands.clone()
        }
    }

    pub fn effective_min_correlation_samples(&self) -> usize {
        self.min_correlation_samples.unwrap_or(10)
    }

    pub fn effective_min_regression_samples(&self) -> usize {
        self.min_regression_samples.unwrap_or(100)
    }
}

//! Runs the full battery of tests over friction records.

use friction_core::config::AnalysisConfig;
use friction_core::types::FrictionRecord;
use serde::Serialize;

use super::hypothesis::{
    chi_square_2x2, point_biserial, students_t_test, ChiSquareResult, CorrelationResult, TTestResult,
};
use super::logistic::{fit_logistic, RegressionResult};
use super::segments::{by_friction_level, by_game_phase, by_rating_band, BlunderRate};

/// Regression covariates, in column order.
pub const REGRESSION_FEATURES: [&str; 7] = [
    "think_time_normalized",
    "player_rating",
    "game_phase",
    "num_legal_moves",
    "complexity_score",
    "time_remaining",
    "num_alternatives",
];

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub significance_level: f64,
    pub rating_bands: Vec<u32>,
    pub min_correlation_samples: usize,
    pub min_regression_samples: usize,
}

impl From<&AnalysisConfig> for AnalysisSettings {
    fn from(cfg: &AnalysisConfig) -> Self {
        Self {
            significance_level: cfg.effective_significance_level(),
            rating_bands: cfg.effective_rating_bands(),
            min_correlation_samples: cfg.effective_min_correlation_samples(),
            min_regression_samples: cfg.effective_min_regression_samples(),
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self::from(&AnalysisConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResults {
    pub total_moves: usize,
    pub total_blunders: usize,
    pub total_friction_gaps: usize,
    /// Moves played with the clock above the time-pressure line.
    pub calm_moves: usize,

    pub correlation_all: CorrelationResult,
    pub correlation_no_time_pressure: CorrelationResult,
    pub ttest_blunder_vs_other: TTestResult,
    pub chi_square_friction_gap: ChiSquareResult,
    pub logistic_regression: Option<RegressionResult>,

    pub by_friction_level: Vec<BlunderRate>,
    pub by_rating_band: Vec<BlunderRate>,
    pub by_game_phase: Vec<BlunderRate>,

    pub blunder_rate_with_gap: f64,
    pub blunder_rate_without_gap: f64,
    pub relative_risk: f64,
    pub significance_level: f64,
}

impl AnalysisResults {
    /// Negative, significant think-time/blunder correlation outside time
    /// pressure.
    pub fn hypothesis_supported(&self) -> bool {
        self.correlation_no_time_pressure.coefficient < 0.0
            && self
                .correlation_no_time_pressure
                .is_significant(self.significance_level)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatisticalAnalyzer {
    settings: AnalysisSettings,
}

impl StatisticalAnalyzer {
    pub fn new(settings: AnalysisSettings) -> Self {
        Self { settings }
    }

    pub fn analyze(&self, records: &[FrictionRecord]) -> AnalysisResults {
        let calm: Vec<&FrictionRecord> = records.iter().filter(|r| !r.time_pressure).collect();
        tracing::info!(
            moves = records.len(),
            calm_moves = calm.len(),
            "running statistical analysis"
        );

        let think = |rows: &[&FrictionRecord]| -> Vec<f64> { rows.iter().map(|r| r.think_time_normalized).collect() };
        let blunder = |rows: &[&FrictionRecord]| -> Vec<bool> { rows.iter().map(|r| r.is_blunder()).collect() };
        let all: Vec<&FrictionRecord> = records.iter().collect();
        let min = self.settings.min_correlation_samples;

        let (calm_blunders, calm_other): (Vec<&FrictionRecord>, Vec<&FrictionRecord>) =
            calm.iter().copied().partition(|r| r.is_blunder());
        let (with_gap, without_gap): (Vec<&FrictionRecord>, Vec<&FrictionRecord>) =
            calm.iter().copied().partition(|r| r.friction_gap);
        let rate = |rows: &[&FrictionRecord]| BlunderRate::of("", rows.iter().copied()).map_or(0.0, |b| b.rate);
        let blunder_rate_with_gap = rate(&with_gap);
        let blunder_rate_without_gap = rate(&without_gap);

        AnalysisResults {
            total_moves: records.len(),
            total_blunders: records.iter().filter(|r| r.is_blunder()).count(),
            total_friction_gaps: records.iter().filter(|r| r.friction_gap).count(),
            calm_moves: calm.len(),
            correlation_all: point_biserial(&think(&all), &blunder(&all), min),
            correlation_no_time_pressure: point_biserial(&think(&calm), &blunder(&calm), min),
            ttest_blunder_vs_other: students_t_test(&think(&calm_blunders), &think(&calm_other)),
            chi_square_friction_gap: chi_square_2x2(
                &calm.iter().map(|r| r.friction_gap).collect::<Vec<_>>(),
                &blunder(&calm),
            ),
            logistic_regression: self.regression(&calm),
            by_friction_level: by_friction_level(&calm),
            by_rating_band: by_rating_band(&calm, &self.settings.rating_bands),
            by_game_phase: by_game_phase(&calm),
            blunder_rate_with_gap,
            blunder_rate_without_gap,
            relative_risk: if blunder_rate_without_gap > 0.0 {
                blunder_rate_with_gap / blunder_rate_without_gap
            } else {
                0.0
            },
            significance_level: self.settings.significance_level,
        }
    }

    fn regression(&self, calm: &[&FrictionRecord]) -> Option<RegressionResult> {
        let rows: Vec<(Vec<f64>, bool)> = calm
            .iter()
            .filter_map(|r| {
                let rating = r.player_rating?;
                Some((
                    vec![
                        r.think_time_normalized,
                        f64::from(rating),
                        r.game_phase,
                        f64::from(r.num_legal_moves),
                        r.complexity_score,
                        r.time_remaining,
                        f64::from(r.num_alternatives),
                    ],
                    r.is_blunder(),
                ))
            })
            .collect();
        if rows.len() < self.settings.min_regression_samples {
            tracing::debug!(rows = rows.len(), "too few rows for regression");
            return None;
        }
        let (features, outcome): (Vec<Vec<f64>>, Vec<bool>) = rows.into_iter().unzip();
        let fit = fit_logistic(&REGRESSION_FEATURES, &features, &outcome);
        if fit.is_none() {
            tracing::warn!("logistic regression did not produce a fit");
        }
        fit
    }
}

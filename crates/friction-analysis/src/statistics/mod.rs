//! Hypothesis tests for the friction/blunder relationship.
//!
//! Every test degrades to a neutral result (coefficient 0, p = 1) when the
//! data cannot support it, so a report can always be produced.

pub mod analyzer;
pub mod auc;
pub mod descriptive;
pub mod hypothesis;
pub mod logistic;
pub mod report;
pub mod segments;

pub use analyzer::{AnalysisResults, AnalysisSettings, StatisticalAnalyzer};
pub use auc::roc_auc;
pub use descriptive::Summary;
pub use hypothesis::{chi_square_2x2, point_biserial, students_t_test, ChiSquareResult, CorrelationResult, TTestResult};
pub use logistic::{fit_logistic, RegressionResult};
pub use report::render_report;
pub use segments::{BlunderRate, GamePhase};

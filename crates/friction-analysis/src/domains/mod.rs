//! L2 friction measures outside chess.
//!
//! Each domain reads local records (CSV, JSON, or NDJSON exports), computes
//! a per-subject L2 metric, and checks whether that metric separates experts
//! from novices. No network access; fetching the exports is out of scope.

pub mod assistments;
pub mod ednet;
pub mod input;
pub mod qa;
pub mod quizbowl;
pub mod wiki;

use serde::Serialize;

use crate::statistics::descriptive::{mean, percentile};
use crate::statistics::roc_auc;

/// How well a per-subject score separates experts (by accuracy) from the
/// rest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpertSplit {
    /// AUC of the score as an expert predictor; `None` when every subject
    /// falls on one side of the accuracy cut.
    pub auc: Option<f64>,
    pub subjects: usize,
    pub experts: usize,
    pub expert_mean: Option<f64>,
    pub novice_mean: Option<f64>,
    pub expert_median: Option<f64>,
    pub novice_median: Option<f64>,
}

impl ExpertSplit {
    /// `scores` and `accuracies` are parallel, one entry per subject.
    pub fn compute(scores: &[f64], accuracies: &[f64], expert_accuracy: f64) -> Self {
        let is_expert: Vec<bool> = accuracies.iter().map(|a| *a >= expert_accuracy).collect();
        let (experts, novices): (Vec<(f64, bool)>, Vec<(f64, bool)>) = scores
            .iter()
            .copied()
            .zip(is_expert.iter().copied())
            .partition(|(_, e)| *e);
        let experts: Vec<f64> = experts.into_iter().map(|(s, _)| s).collect();
        let novices: Vec<f64> = novices.into_iter().map(|(s, _)| s).collect();

        Self {
            auc: roc_auc(&is_expert, scores),
            subjects: scores.len(),
            experts: experts.len(),
            expert_mean: mean(&experts),
            novice_mean: mean(&novices),
            expert_median: percentile(&experts, 50.0),
            novice_median: percentile(&novices, 50.0),
        }
    }

    pub(crate) fn write_text(&self, out: &mut String, label: &str) {
        let show = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"));
        out.push_str(&format!(
            "  Expert split:     {} of {} subjects\n",
            self.experts, self.subjects
        ));
        out.push_str(&format!("  AUC ({label}): {}\n", show(self.auc)));
        out.push_str(&format!(
            "  Median {label}:  experts {}, novices {}\n",
            show(self.expert_median),
            show(self.novice_median)
        ));
    }
}

/// Share of `items` matching `pred`; `None` for an empty slice.
pub(crate) fn share<T>(items: &[T], pred: impl Fn(&T) -> bool) -> Option<f64> {
    (!items.is_empty()).then(|| items.iter().filter(|i| pred(i)).count() as f64 / items.len() as f64)
}

/// Median of a sample, 0 when empty.
pub(crate) fn median_or_zero(values: &[f64]) -> f64 {
    percentile(values, 50.0).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_separates_by_accuracy() {
        let split = ExpertSplit::compute(&[2.0, 3.0, 0.5, 1.5], &[0.9, 0.8, 0.5, 0.6], 0.75);
        assert_eq!(split.experts, 2);
        assert_eq!(split.auc, Some(1.0));
        assert_eq!(split.expert_median, Some(2.5));
        assert_eq!(split.novice_median, Some(1.0));
    }

    #[test]
    fn one_sided_split_has_no_auc() {
        let split = ExpertSplit::compute(&[1.0, 2.0], &[0.2, 0.3], 0.75);
        assert_eq!(split.auc, None);
        assert_eq!(split.expert_mean, None);
        assert_eq!(split.novice_mean, Some(1.5));
    }

    #[test]
    fn share_of_empty_is_none() {
        assert_eq!(share::<u8>(&[], |_| true), None);
        assert_eq!(share(&[1, 2, 3, 4], |v| *v > 1), Some(0.75));
    }
}

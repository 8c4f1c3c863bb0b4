//! Settings for the cross-domain L2 analyses.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DomainConfig {
    /// Overall accuracy at or above which a learner counts as an expert
    /// in the EdNet and ASSISTments validations. Default: 0.75.
    pub expert_accuracy: Option<f64>,
    /// Same cut for quiz bowl players. Default: 0.80.
    pub buzz_expert_accuracy: Option<f64>,
    /// Learners with metrics needed before an expert split is reported.
    /// Default: 100.
    pub min_learners: Option<usize>,
    /// Players with early buzzes needed for the quiz bowl split. Default: 50.
    pub min_players: Option<usize>,
}

impl DomainConfig {
    pub fn effective_expert_accuracy(&self) -> f64 {
        self.expert_accuracy.unwrap_or(0.75)
    }

    pub fn effective_buzz_expert_accuracy(&self) -> f64 {
        self.buzz_expert_accuracy.unwrap_or(0.80)
    }

    pub fn effective_min_learners(&self) -> usize {
        self.min_learners.unwrap_or(100)
    }

    pub fn effective_min_players(&self) -> usize {
        self.min_players.unwrap_or(50)
    }
}

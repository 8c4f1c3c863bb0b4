//! Player signature settings and reference benchmarks.

use serde::{Deserialize, Serialize};

/// Reference think-time signature of a strong player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EliteBenchmark {
    pub name: String,
    pub l2_trigger: f64,
    pub opening_ratio: f64,
    pub middlegame_ratio: f64,
    pub endgame_ratio: f64,
    pub bimodal_index: f64,
}

impl EliteBenchmark {
    fn new(name: &str, l2: f64, op: f64, mg: f64, eg: f64, bimodal: f64) -> Self {
        Self {
            name: name.to_string(),
            l2_trigger: l2,
            opening_ratio: op,
            middlegame_ratio: mg,
            endgame_ratio: eg,
            bimodal_index: bimodal,
        }
    }
}

/// Built-in benchmarks measured from public classical and rapid games.
pub fn default_benchmarks() -> Vec<EliteBenchmark> {
    vec![
        EliteBenchmark::new("carlsen", 1.50, 0.94, 1.41, 0.76, 13.7),
        EliteBenchmark::new("tang", 2.12, 0.67, 1.42, 0.83, 13.5),
        EliteBenchmark::new("bartholomew", 1.80, 0.79, 1.42, 0.63, 12.7),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProfileConfig {
    /// Minimum usable games before a signature is reported. Default: 10.
    pub min_games: Option<usize>,
    /// Replaces the built-in benchmarks when non-empty.
    #[serde(default)]
    pub benchmarks: Vec<EliteBenchmark>,
}

impl ProfileConfig {
    pub fn effective_min_games(&self) -> usize {
        self.min_games.unwrap_or(10)
    }

    pub fn effective_benchmarks(&self) -> Vec<EliteBenchmark> {
        if self.benchmarks.is_empty() {
            default_benchmarks()
        } else {
            self.benchmarks.clone()
        }
    }
}

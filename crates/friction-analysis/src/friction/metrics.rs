//! Classifies each move by error severity and by how long the player
//! thought relative to their own average.

use friction_core::config::FrictionConfig;
use friction_core::types::{
    EvaluationRecord, FrictionLevel, FrictionRecord, PositionFeatures, Severity,
};

/// Resolved classification thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct FrictionThresholds {
    pub blunder_cp: f64,
    pub mistake_cp: f64,
    pub inaccuracy_cp: f64,
    pub time_pressure_seconds: f64,
    pub high_friction_multiplier: f64,
    pub low_friction_multiplier: f64,
    pub premove_threshold: f64,
    pub alternative_threshold_cp: f64,
    /// Charged on top of the spread when the played move is not listed.
    pub outside_top_penalty_cp: f64,
}

impl From<&FrictionConfig> for FrictionThresholds {
    fn from(cfg: &FrictionConfig) -> Self {
        let t = &cfg.thresholds;
        Self {
            blunder_cp: t.effective_blunder_cp(),
            mistake_cp: t.effective_mistake_cp(),
            inaccuracy_cp: t.effective_inaccuracy_cp(),
            time_pressure_seconds: t.effective_time_pressure_seconds(),
            high_friction_multiplier: t.effective_high_friction_multiplier(),
            low_friction_multiplier: t.effective_low_friction_multiplier(),
            premove_threshold: t.effective_premove_threshold(),
            alternative_threshold_cp: t.effective_alternative_threshold_cp(),
            outside_top_penalty_cp: cfg.engine.effective_outside_top_penalty_cp(),
        }
    }
}

impl Default for FrictionThresholds {
    fn default() -> Self {
        Self::from(&FrictionConfig::default())
    }
}

/// Everything known about a move at analysis time.
#[derive(Debug, Clone)]
pub struct MoveContext<'a> {
    pub game_id: &'a str,
    pub ply: u32,
    pub is_white: bool,
    pub uci: &'a str,
    pub player_rating: Option<u32>,
    pub think_time: f64,
    /// Mover's clock after the move.
    pub time_remaining: f64,
    /// All think times of the mover in this game.
    pub side_think_times: &'a [f64],
    pub evaluation: &'a EvaluationRecord,
    pub features: &'a PositionFeatures,
}

#[derive(Debug, Clone, Default)]
pub struct FrictionAnalyzer {
    thresholds: FrictionThresholds,
}

impl FrictionAnalyzer {
    pub fn new(thresholds: FrictionThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &FrictionThresholds {
        &self.thresholds
    }

    /// Think time over the player's mean, ignoring premoves. 1.0 when there
    /// is nothing to compare against.
    pub fn normalized_think_time(&self, think_time: f64, side_think_times: &[f64]) -> f64 {
        let (sum, n) = side_think_times
            .iter()
            .filter(|t| **t > self.thresholds.premove_threshold)
            .fold((0.0, 0usize), |(s, n), t| (s + t, n + 1));
        if n == 0 || sum <= 0.0 {
            return 1.0;
        }
        (think_time / (sum / n as f64)).max(0.0)
    }

    pub fn classify_severity(&self, eval_drop: f64) -> Severity {
        let t = &self.thresholds;
        if eval_drop >= t.blunder_cp {
            Severity::Blunder
        } else if eval_drop >= t.mistake_cp {
            Severity::Mistake
        } else if eval_drop >= t.inaccuracy_cp {
            Severity::Inaccuracy
        } else {
            Severity::None
        }
    }

    pub fn classify_friction_level(&self, normalized: f64) -> FrictionLevel {
        if normalized > self.thresholds.high_friction_multiplier {
            FrictionLevel::High
        } else if normalized < self.thresholds.low_friction_multiplier {
            FrictionLevel::Low
        } else {
            FrictionLevel::Normal
        }
    }

    /// Count of near-best alternatives and best-to-worst spread.
    pub fn optionality(&self, evaluation: &EvaluationRecord) -> (u32, f64) {
        if evaluation.variations.len() < 2 {
            return (0, 0.0);
        }
        (
            evaluation.alternatives_within(self.thresholds.alternative_threshold_cp),
            evaluation.eval_spread(),
        )
    }

    pub fn analyze_move(&self, ctx: &MoveContext<'_>) -> FrictionRecord {
        let eval = ctx.evaluation;
        let normalized = self.normalized_think_time(ctx.think_time, ctx.side_think_times);
        let eval_drop = eval.eval_drop(ctx.uci, self.thresholds.outside_top_penalty_cp);
        let (num_alternatives, eval_spread) = self.optionality(eval);

        let has_alternatives = num_alternatives > 0;
        let actual_friction = normalized > 1.0;

        FrictionRecord {
            game_id: ctx.game_id.to_string(),
            ply: ctx.ply,
            is_white: ctx.is_white,
            player_rating: ctx.player_rating,
            think_time: ctx.think_time,
            think_time_normalized: normalized,
            time_remaining: ctx.time_remaining,
            time_pressure: ctx.time_remaining < self.thresholds.time_pressure_seconds,
            eval_before: eval.best_eval(),
            eval_after: eval.best_eval() - eval_drop.round() as i32,
            eval_drop,
            was_best_move: ctx.uci == eval.best_move,
            move_rank: eval.move_rank(ctx.uci),
            severity: self.classify_severity(eval_drop),
            num_alternatives,
            eval_spread,
            has_alternatives,
            expected_friction: has_alternatives,
            actual_friction,
            friction_gap: has_alternatives && !actual_friction,
            friction_level: self.classify_friction_level(normalized),
            game_phase: ctx.features.game_phase,
            num_legal_moves: ctx.features.num_legal_moves,
            complexity_score: ctx.features.complexity_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use friction_core::types::{PositionKey, RankedMove};

    use super::*;

    fn record(lines: &[(&str, i32)]) -> EvaluationRecord {
        let variations = lines
            .iter()
            .map(|(uci, eval_cp)| RankedMove {
                uci: uci.to_string(),
                eval_cp: *eval_cp,
                depth: 14,
            })
            .collect();
        EvaluationRecord::new(PositionKey::from_fen("8/8/8/8/8/8/8/8 w - - 0 1"), variations, 14, 5)
            .unwrap()
    }

    fn ctx<'a>(uci: &'a str, think: f64, samples: &'a [f64], eval: &'a EvaluationRecord, features: &'a PositionFeatures) -> MoveContext<'a> {
        MoveContext {
            game_id: "g1",
            ply: 21,
            is_white: true,
            uci,
            player_rating: Some(1650),
            think_time: think,
            time_remaining: 412.0,
            side_think_times: samples,
            evaluation: eval,
            features,
        }
    }

    #[test]
    fn normalization_ignores_premoves() {
        let analyzer = FrictionAnalyzer::default();
        // Mean of 10 and 20; the 0.2s premove is excluded.
        assert_eq!(analyzer.normalized_think_time(30.0, &[10.0, 20.0, 0.2]), 2.0);
        assert_eq!(analyzer.normalized_think_time(30.0, &[0.1, 0.3]), 1.0);
        assert_eq!(analyzer.normalized_think_time(30.0, &[]), 1.0);
    }

    #[test]
    fn severity_boundaries_are_inclusive() {
        let analyzer = FrictionAnalyzer::default();
        assert_eq!(analyzer.classify_severity(100.0), Severity::Blunder);
        assert_eq!(analyzer.classify_severity(99.9), Severity::Mistake);
        assert_eq!(analyzer.classify_severity(25.0), Severity::Inaccuracy);
        assert_eq!(analyzer.classify_severity(24.0), Severity::None);
        assert_eq!(analyzer.classify_severity(-5.0), Severity::None);
    }

    #[test]
    fn friction_level_bands() {
        let analyzer = FrictionAnalyzer::default();
        assert_eq!(analyzer.classify_friction_level(1.6), FrictionLevel::High);
        assert_eq!(analyzer.classify_friction_level(1.5), FrictionLevel::Normal);
        assert_eq!(analyzer.classify_friction_level(0.7), FrictionLevel::Normal);
        assert_eq!(analyzer.classify_friction_level(0.5), FrictionLevel::Low);
    }

    #[test]
    fn fast_move_among_alternatives_is_a_gap() {
        let analyzer = FrictionAnalyzer::default();
        let eval = record(&[("e2e4", 40), ("d2d4", 30), ("g1f3", 5), ("a2a3", -60)]);
        let features = PositionFeatures { game_phase: 0.8, num_legal_moves: 31, ..Default::default() };
        let samples = [10.0, 10.0, 10.0];
        let r = analyzer.analyze_move(&ctx("a2a3", 4.0, &samples, &eval, &features));

        assert_eq!(r.think_time_normalized, 0.4);
        assert_eq!(r.num_alternatives, 2);
        assert_eq!(r.eval_spread, 100.0);
        assert!(r.friction_gap);
        assert_eq!(r.eval_drop, 100.0);
        assert_eq!(r.severity, Severity::Blunder);
        assert_eq!(r.eval_before, 40);
        assert_eq!(r.eval_after, -60);
        assert_eq!(r.move_rank, 4);
        assert!(!r.was_best_move);
        assert!(!r.time_pressure);
        assert_eq!(r.friction_level, FrictionLevel::Low);
        assert_eq!(r.num_legal_moves, 31);
    }

    #[test]
    fn unlisted_move_pays_penalty() {
        let analyzer = FrictionAnalyzer::default();
        let eval = record(&[("e2e4", 40), ("d2d4", 30)]);
        let features = PositionFeatures::default();
        let r = analyzer.analyze_move(&ctx("h2h4", 20.0, &[10.0], &eval, &features));
        assert_eq!(r.eval_drop, 60.0);
        assert_eq!(r.move_rank, 3);
        assert_eq!(r.severity, Severity::Mistake);
        assert!(r.actual_friction);
        assert!(!r.friction_gap);
    }

    #[test]
    fn single_line_has_no_optionality() {
        let analyzer = FrictionAnalyzer::default();
        let eval = record(&[("e2e4", 40)]);
        assert_eq!(analyzer.optionality(&eval), (0, 0.0));
    }
}

//! Per-ply trigger signals and outcomes.

use friction_core::config::TriggerConfig;
use friction_core::types::{EvaluationRecord, L2TriggerMetrics, PositionKey, TriggerMove, TriggerOutcome};

/// Resolved trigger thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerThresholds {
    pub optionality_delta: i32,
    pub eval_gradient_cp: f64,
    pub criticality_gap_cp: f64,
    pub friction_threshold: f64,
    pub min_moves: usize,
}

impl From<&TriggerConfig> for TriggerThresholds {
    fn from(cfg: &TriggerConfig) -> Self {
        Self {
            optionality_delta: cfg.effective_optionality_delta(),
            eval_gradient_cp: cfg.effective_eval_gradient_cp(),
            criticality_gap_cp: cfg.effective_criticality_gap_cp(),
            friction_threshold: cfg.effective_friction_threshold(),
            min_moves: cfg.effective_min_moves(),
        }
    }
}

impl Default for TriggerThresholds {
    fn default() -> Self {
        Self::from(&TriggerConfig::default())
    }
}

// Signal magnitudes that saturate the composite score.
const DELTA_SCALE: f64 = 3.0;
const GRADIENT_SCALE: f64 = 100.0;
const GAP_SCALE: f64 = 200.0;

#[derive(Debug, Clone, Default)]
pub struct TriggerAnalyzer {
    thresholds: TriggerThresholds,
}

impl TriggerAnalyzer {
    pub fn new(thresholds: TriggerThresholds) -> Self {
        Self { thresholds }
    }

    /// Walk one game's analyzed moves in ply order. `lookup` resolves the
    /// stored evaluation of a position before a move.
    pub fn analyze_game<F>(&self, game_id: &str, moves: &[TriggerMove], mut lookup: F) -> Vec<L2TriggerMetrics>
    where
        F: FnMut(&PositionKey) -> Option<EvaluationRecord>,
    {
        if moves.len() < self.thresholds.min_moves {
            return Vec::new();
        }

        let mut last_alternatives: [Option<u32>; 2] = [None, None];
        let mut previous: Option<(&TriggerMove, Option<EvaluationRecord>)> = None;
        let mut out = Vec::with_capacity(moves.len());

        for mv in moves {
            let side = usize::from(!mv.is_white);
            let evaluation = lookup(&PositionKey::from_fen(&mv.fen_before));

            let optionality_delta = last_alternatives[side]
                .map(|prev| mv.num_alternatives as i32 - prev as i32);
            let eval_gradient = previous
                .as_ref()
                .map(|(prev, _)| f64::from((mv.eval_before - prev.eval_after).abs()));
            let criticality_gap = evaluation.as_ref().and_then(EvaluationRecord::criticality_gap);
            let opponent_surprise = previous.as_ref().and_then(|(prev, prev_eval)| {
                if prev.is_white == mv.is_white {
                    return None;
                }
                prev_eval.as_ref().map(|e| !e.contains_move(&prev.uci))
            });

            out.push(self.classify(
                game_id,
                mv,
                optionality_delta,
                eval_gradient,
                criticality_gap,
                opponent_surprise,
            ));

            last_alternatives[side] = Some(mv.num_alternatives);
            previous = Some((mv, evaluation));
        }
        out
    }

    fn classify(
        &self,
        game_id: &str,
        mv: &TriggerMove,
        optionality_delta: Option<i32>,
        eval_gradient: Option<f64>,
        criticality_gap: Option<f64>,
        opponent_surprise: Option<bool>,
    ) -> L2TriggerMetrics {
        let t = &self.thresholds;
        let should_fire = optionality_delta.is_some_and(|d| d.abs() >= t.optionality_delta)
            || eval_gradient.is_some_and(|g| g >= t.eval_gradient_cp)
            || criticality_gap.is_some_and(|g| g >= t.criticality_gap_cp)
            || opponent_surprise == Some(true);
        let friction_present = mv.think_time_normalized >= t.friction_threshold;

        L2TriggerMetrics {
            game_id: game_id.to_string(),
            ply: mv.ply,
            optionality_delta,
            eval_gradient,
            criticality_gap,
            opponent_surprise,
            trigger_score: composite_score(optionality_delta, eval_gradient, criticality_gap, opponent_surprise),
            should_fire,
            friction_present,
            think_time_normalized: mv.think_time_normalized,
            is_blunder: mv.is_blunder,
            eval_drop: mv.eval_drop,
            outcome: TriggerOutcome::classify(should_fire, friction_present, mv.is_blunder),
        }
    }
}

/// Mean of the present signals, each scaled into [0, 1].
pub fn composite_score(
    optionality_delta: Option<i32>,
    eval_gradient: Option<f64>,
    criticality_gap: Option<f64>,
    opponent_surprise: Option<bool>,
) -> Option<f64> {
    let signals: Vec<f64> = [
        optionality_delta.map(|d| f64::from(d.abs()) / DELTA_SCALE),
        eval_gradient.map(|g| g / GRADIENT_SCALE),
        criticality_gap.map(|g| g / GAP_SCALE),
        opponent_surprise.map(|s| if s { 1.0 } else { 0.0 }),
    ]
    .into_iter()
    .flatten()
    .map(|s| s.clamp(0.0, 1.0))
    .collect();

    if signals.is_empty() {
        None
    } else {
        Some(signals.iter().sum::<f64>() / signals.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use friction_core::types::RankedMove;

    use super::*;

    fn mv(ply: u32, uci: &str, fen: &str, alternatives: u32, eval_before: i32, drop: f64, norm: f64) -> TriggerMove {
        TriggerMove {
            ply,
            is_white: ply % 2 == 1,
            uci: uci.to_string(),
            fen_before: fen.to_string(),
            num_alternatives: alternatives,
            eval_before,
            eval_after: eval_before - drop as i32,
            eval_drop: drop,
            is_blunder: drop >= 100.0,
            think_time_normalized: norm,
        }
    }

    fn eval(fen: &str, lines: &[(&str, i32)]) -> EvaluationRecord {
        let variations = lines
            .iter()
            .map(|(uci, cp)| RankedMove { uci: uci.to_string(), eval_cp: *cp, depth: 14 })
            .collect();
        EvaluationRecord::new(PositionKey::from_fen(fen), variations, 14, 5).unwrap()
    }

    #[test]
    fn short_games_produce_nothing() {
        let moves: Vec<_> = (1..=3).map(|p| mv(p, "a2a3", &format!("p{p} w - -"), 1, 0, 0.0, 1.0)).collect();
        assert!(TriggerAnalyzer::default().analyze_game("g", &moves, |_| None).is_empty());
    }

    #[test]
    fn critical_position_played_fast_and_blundered_is_a_miss() {
        let moves = vec![
            mv(21, "e2e4", "p21 w - -", 2, 10, 0.0, 1.0),
            mv(22, "e7e5", "p22 b - -", 2, -10, 0.0, 1.0),
            mv(23, "g1f3", "p23 w - -", 2, 10, 0.0, 1.0),
            mv(24, "a7a6", "p24 b - -", 2, -10, 250.0, 0.4),
        ];
        let mut evals = HashMap::new();
        evals.insert("p24 b - -".to_string(), eval("p24 b - -", &[("b8c6", -10), ("g8f6", -140)]));
        let rows = TriggerAnalyzer::default().analyze_game("g", &moves, |key| evals.get(key.as_str()).cloned());

        let last = &rows[3];
        assert_eq!(last.criticality_gap, Some(130.0));
        assert!(last.should_fire);
        assert!(!last.friction_present);
        assert!(last.is_miss());
        assert!(rows[..3].iter().all(|r| !r.should_fire));
    }

    #[test]
    fn signals_use_same_side_and_adjacent_plies() {
        let moves = vec![
            mv(11, "e2e4", "p11 w - -", 0, 20, 0.0, 1.0),
            mv(12, "e7e5", "p12 b - -", 1, -20, 0.0, 1.0),
            mv(13, "d2d4", "p13 w - -", 3, 80, 0.0, 1.5),
            mv(14, "h7h5", "p14 b - -", 1, -80, 0.0, 1.0),
        ];
        let mut evals = HashMap::new();
        evals.insert("p13 w - -".to_string(), eval("p13 w - -", &[("g1f3", 80), ("b1c3", 70)]));
        let rows = TriggerAnalyzer::default().analyze_game("g", &moves, |key| evals.get(key.as_str()).cloned());

        assert_eq!(rows[0].optionality_delta, None);
        assert_eq!(rows[0].eval_gradient, None);
        assert_eq!(rows[2].optionality_delta, Some(3));
        assert_eq!(rows[2].eval_gradient, Some(100.0));
        assert!(rows[2].is_hit());
        // White's d2d4 was not among the engine lines for its position.
        assert_eq!(rows[3].opponent_surprise, Some(true));
        assert_eq!(rows[2].opponent_surprise, None);
    }

    #[test]
    fn composite_score_clamps_and_averages() {
        assert_eq!(composite_score(None, None, None, None), None);
        assert_eq!(composite_score(Some(-6), Some(50.0), None, None), Some(0.75));
        assert_eq!(composite_score(None, None, Some(100.0), Some(false)), Some(0.25));
    }
}

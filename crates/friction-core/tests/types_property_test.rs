//! Property tests for the core domain types.

use friction_core::types::{
    compute_think_time, EngineScore, EvaluationRecord, PositionKey, RankedMove, TimeControl,
};
use proptest::prelude::*;

fn arb_lines() -> impl Strategy<Value = Vec<(u8, i32)>> {
    prop::collection::vec((0u8..64, -3000i32..3000), 1..8)
}

fn build(lines: &[(u8, i32)]) -> EvaluationRecord {
    let variations = lines
        .iter()
        .enumerate()
        .map(|(i, (sq, eval))| RankedMove {
            uci: format!("m{i}_{sq}"),
            eval_cp: *eval,
            depth: 12,
        })
        .collect();
    EvaluationRecord::new(PositionKey::from_fen("8/8/8/8/8/8/8/8 w - - 0 1"), variations, 12, 8)
        .unwrap()
}

proptest! {
    #[test]
    fn think_time_never_negative(before in 0.0f64..10_800.0, after in 0.0f64..10_800.0, inc in 0u32..60) {
        prop_assert!(compute_think_time(before, after, f64::from(inc)) >= 0.0);
    }

    #[test]
    fn time_control_display_parses_back(base in 0u32..10_800, inc in 0u32..180) {
        let tc = TimeControl::new(base, inc);
        prop_assert_eq!(TimeControl::parse(&tc.to_string()), Some(tc));
    }

    #[test]
    fn closer_mates_score_higher(a in 1i32..100, b in 1i32..100) {
        prop_assume!(a < b);
        prop_assert!(EngineScore::Mate(a).to_centipawns() > EngineScore::Mate(b).to_centipawns());
        prop_assert!(EngineScore::Mate(-a).to_centipawns() < EngineScore::Mate(-b).to_centipawns());
    }

    #[test]
    fn listed_moves_never_gain_on_best(lines in arb_lines(), penalty in 0.0f64..200.0) {
        let record = build(&lines);
        for line in &record.variations {
            prop_assert!(record.eval_drop(&line.uci, penalty) >= 0.0);
        }
        prop_assert!(record.eval_drop("unlisted", penalty) >= penalty);
        prop_assert!(record.variations.windows(2).all(|w| w[0].eval_cp >= w[1].eval_cp));
    }

    #[test]
    fn sorting_is_deterministic(lines in arb_lines()) {
        prop_assert_eq!(build(&lines), build(&lines));
    }
}

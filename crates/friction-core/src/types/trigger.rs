//! L2 trigger rows: would a metacognitive alarm have fired, and did the
//! player actually slow down.

use serde::{Deserialize, Serialize};

/// Classification of a trigger row. Mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerOutcome {
    /// Trigger fired and the player slowed down.
    Hit,
    /// Trigger fired, no slowdown, and the move was a blunder.
    Miss,
    /// Player slowed down without a trigger and did not blunder.
    FalseAlarm,
    Unclassified,
}

impl TriggerOutcome {
    /// Decide the outcome from the three observed facts, in priority order.
    pub fn classify(should_fire: bool, friction_present: bool, is_blunder: bool) -> Self {
        if should_fire && friction_present {
            Self::Hit
        } else if should_fire && is_blunder {
            Self::Miss
        } else if friction_present && !should_fire && !is_blunder {
            Self::FalseAlarm
        } else {
            Self::Unclassified
        }
    }

    /// Rebuild from the three stored flags.
    pub fn from_flags(hit: bool, miss: bool, false_alarm: bool) -> Self {
        match (hit, miss, false_alarm) {
            (true, _, _) => Self::Hit,
            (_, true, _) => Self::Miss,
            (_, _, true) => Self::FalseAlarm,
            _ => Self::Unclassified,
        }
    }
}

/// Signals and outcome for one analyzed ply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct L2TriggerMetrics {
    pub game_id: String,
    pub ply: u32,
    pub optionality_delta: Option<i32>,
    pub eval_gradient: Option<f64>,
    pub criticality_gap: Option<f64>,
    pub opponent_surprise: Option<bool>,
    pub trigger_score: Option<f64>,
    pub should_fire: bool,
    pub friction_present: bool,
    pub think_time_normalized: f64,
    pub is_blunder: bool,
    pub eval_drop: f64,
    pub outcome: TriggerOutcome,
}

impl L2TriggerMetrics {
    pub fn is_hit(&self) -> bool {
        self.outcome == TriggerOutcome::Hit
    }

    pub fn is_miss(&self) -> bool {
        self.outcome == TriggerOutcome::Miss
    }

    pub fn is_false_alarm(&self) -> bool {
        self.outcome == TriggerOutcome::FalseAlarm
    }
}

/// One analyzed move joined with its board and friction data, as consumed
/// by the trigger analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerMove {
    pub ply: u32,
    pub is_white: bool,
    pub uci: String,
    pub fen_before: String,
    pub num_alternatives: u32,
    pub eval_before: i32,
    pub eval_after: i32,
    pub eval_drop: f64,
    pub is_blunder: bool,
    pub think_time_normalized: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fired_without_friction_on_blunder_is_miss() {
        assert_eq!(TriggerOutcome::classify(true, false, true), TriggerOutcome::Miss);
    }

    #[test]
    fn hit_takes_priority_over_blunder() {
        assert_eq!(TriggerOutcome::classify(true, true, true), TriggerOutcome::Hit);
    }

    #[test]
    fn friction_without_trigger() {
        assert_eq!(TriggerOutcome::classify(false, true, false), TriggerOutcome::FalseAlarm);
        assert_eq!(TriggerOutcome::classify(false, true, true), TriggerOutcome::Unclassified);
        assert_eq!(TriggerOutcome::classify(true, false, false), TriggerOutcome::Unclassified);
    }

    #[test]
    fn flags_round_trip() {
        for outcome in [
            TriggerOutcome::Hit,
            TriggerOutcome::Miss,
            TriggerOutcome::FalseAlarm,
            TriggerOutcome::Unclassified,
        ] {
            let flags = (
                outcome == TriggerOutcome::Hit,
                outcome == TriggerOutcome::Miss,
                outcome == TriggerOutcome::FalseAlarm,
            );
            assert_eq!(TriggerOutcome::from_flags(flags.0, flags.1, flags.2), outcome);
        }
    }
}

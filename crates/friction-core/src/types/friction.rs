//! Per-move friction metrics.

use serde::{Deserialize, Serialize};

/// Error class of a move by centipawn loss. Exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Blunder,
    Mistake,
    Inaccuracy,
    None,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blunder => "blunder",
            Self::Mistake => "mistake",
            Self::Inaccuracy => "inaccuracy",
            Self::None => "none",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "blunder" => Some(Self::Blunder),
            "mistake" => Some(Self::Mistake),
            "inaccuracy" => Some(Self::Inaccuracy),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// Think time relative to the player's own average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrictionLevel {
    High,
    Normal,
    Low,
}

impl FrictionLevel {
    pub const ALL: [FrictionLevel; 3] = [Self::Low, Self::Normal, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "high" => Some(Self::High),
            "normal" => Some(Self::Normal),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Everything measured about one analyzed move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrictionRecord {
    pub game_id: String,
    pub ply: u32,
    pub is_white: bool,
    pub player_rating: Option<u32>,

    pub think_time: f64,
    pub think_time_normalized: f64,
    pub time_remaining: f64,
    pub time_pressure: bool,

    pub eval_before: i32,
    pub eval_after: i32,
    pub eval_drop: f64,
    pub was_best_move: bool,
    pub move_rank: u32,
    pub severity: Severity,

    pub num_alternatives: u32,
    pub eval_spread: f64,
    pub has_alternatives: bool,

    pub expected_friction: bool,
    pub actual_friction: bool,
    pub friction_gap: bool,
    pub friction_level: FrictionLevel,

    pub game_phase: f64,
    pub num_legal_moves: u32,
    pub complexity_score: f64,
}

impl FrictionRecord {
    pub fn is_blunder(&self) -> bool {
        self.severity == Severity::Blunder
    }

    pub fn is_mistake(&self) -> bool {
        self.severity == Severity::Mistake
    }

    pub fn is_inaccuracy(&self) -> bool {
        self.severity == Severity::Inaccuracy
    }
}

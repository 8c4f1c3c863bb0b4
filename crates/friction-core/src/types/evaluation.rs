//! Engine evaluations: canonical position keys, scores, ranked lines.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Score assigned to a forced mate before distance adjustment.
pub const MATE_SCORE: i32 = 30_000;

/// Centipawns subtracted per move of mate distance.
pub const MATE_STEP: i32 = 100;

/// Canonical position identity: the first four FEN fields (placement, side
/// to move, castling, en passant). Move counters are dropped so transposed
/// positions share one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionKey(String);

impl PositionKey {
    pub fn from_fen(fen: &str) -> Self {
        let key = fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ");
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw engine score from the side to move's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineScore {
    Centipawns(i32),
    /// Moves to mate; negative when the side to move is getting mated.
    Mate(i32),
}

impl EngineScore {
    /// Collapse to centipawns. Closer mates are more extreme, so ordering
    /// stays monotonic across mate and centipawn scores.
    pub fn to_centipawns(self) -> i32 {
        match self {
            Self::Centipawns(cp) => cp,
            Self::Mate(n) if n > 0 => MATE_SCORE - n * MATE_STEP,
            Self::Mate(n) if n < 0 => -MATE_SCORE + n.abs() * MATE_STEP,
            Self::Mate(_) => -MATE_SCORE,
        }
    }
}

/// One engine line: its first move and the evaluation after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedMove {
    pub uci: String,
    pub eval_cp: i32,
    pub depth: u32,
}

/// Multi-line engine evaluation of a single position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub position_key: PositionKey,
    pub eval_cp: i32,
    pub best_move: String,
    /// Sorted best-first; ties keep the engine's order.
    pub variations: Vec<RankedMove>,
    pub depth: u32,
    pub multipv: u32,
}

impl EvaluationRecord {
    /// Build a record from engine lines. Returns `None` when no line is given.
    pub fn new(
        position_key: PositionKey,
        mut variations: Vec<RankedMove>,
        depth: u32,
        multipv: u32,
    ) -> Option<Self> {
        variations.sort_by(|a, b| b.eval_cp.cmp(&a.eval_cp));
        let best = variations.first()?;
        Some(Self {
            position_key,
            eval_cp: best.eval_cp,
            best_move: best.uci.clone(),
            variations,
            depth,
            multipv,
        })
    }

    pub fn best_eval(&self) -> i32 {
        self.eval_cp
    }

    pub fn worst_eval(&self) -> i32 {
        self.variations.last().map_or(self.eval_cp, |m| m.eval_cp)
    }

    pub fn contains_move(&self, uci: &str) -> bool {
        self.variations.iter().any(|m| m.uci == uci)
    }

    pub fn move_eval(&self, uci: &str) -> Option<i32> {
        self.variations.iter().find(|m| m.uci == uci).map(|m| m.eval_cp)
    }

    /// 1-based rank of a move; `len + 1` when the engine did not list it.
    pub fn move_rank(&self, uci: &str) -> u32 {
        self.variations
            .iter()
            .position(|m| m.uci == uci)
            .map_or(self.variations.len() + 1, |i| i + 1) as u32
    }

    /// Centipawns lost by playing `uci`. A move outside the listed lines is
    /// charged the full spread plus `outside_penalty_cp`.
    pub fn eval_drop(&self, uci: &str, outside_penalty_cp: f64) -> f64 {
        match self.move_eval(uci) {
            Some(eval) => f64::from(self.eval_cp - eval),
            None => f64::from(self.eval_cp - self.worst_eval()) + outside_penalty_cp,
        }
    }

    /// Lines after the best one that stay within `band_cp` of it.
    pub fn alternatives_within(&self, band_cp: f64) -> u32 {
        self.variations
            .iter()
            .skip(1)
            .filter(|m| f64::from(self.eval_cp - m.eval_cp) <= band_cp)
            .count() as u32
    }

    /// Best minus worst listed evaluation.
    pub fn eval_spread(&self) -> f64 {
        f64::from(self.eval_cp - self.worst_eval())
    }

    /// Distance between the two best lines; `None` with fewer than two.
    pub fn criticality_gap(&self) -> Option<f64> {
        match self.variations.as_slice() {
            [first, second, ..] => Some(f64::from((first.eval_cp - second.eval_cp).abs())),
            _ => None,
        }
    }
}

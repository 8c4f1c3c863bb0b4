//! Blunder rates within subsets of moves.

use friction_core::types::{FrictionLevel, FrictionRecord};
use serde::Serialize;

/// Coarse game phase derived from the material phase value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

impl GamePhase {
    pub const ALL: [GamePhase; 3] = [Self::Opening, Self::Middlegame, Self::Endgame];

    pub fn from_phase(phase: f64) -> Self {
        if phase > 0.7 {
            Self::Opening
        } else if phase > 0.3 {
            Self::Middlegame
        } else {
            Self::Endgame
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::Middlegame => "middlegame",
            Self::Endgame => "endgame",
        }
    }
}

/// Blunders among `n` moves of one segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlunderRate {
    pub label: String,
    pub n: usize,
    pub blunders: usize,
    pub rate: f64,
}

impl BlunderRate {
    /// `None` for an empty segment.
    pub fn of<'a>(label: impl Into<String>, records: impl IntoIterator<Item = &'a FrictionRecord>) -> Option<Self> {
        let (n, blunders) = records
            .into_iter()
            .fold((0, 0), |(n, b), r| (n + 1, b + usize::from(r.is_blunder())));
        (n > 0).then(|| Self {
            label: label.into(),
            n,
            blunders,
            rate: blunders as f64 / n as f64,
        })
    }
}

pub fn by_friction_level(records: &[&FrictionRecord]) -> Vec<BlunderRate> {
    FrictionLevel::ALL
        .iter()
        .filter_map(|level| {
            BlunderRate::of(
                level.as_str(),
                records.iter().copied().filter(|r| r.friction_level == *level),
            )
        })
        .collect()
}

/// Half-open bands `[edge_i, edge_i+1)` over player rating. Rows without
/// a rating are left out.
pub fn by_rating_band(records: &[&FrictionRecord], edges: &[u32]) -> Vec<BlunderRate> {
    edges
        .windows(2)
        .filter_map(|w| {
            let (low, high) = (w[0], w[1]);
            BlunderRate::of(
                format!("{low}-{high}"),
                records
                    .iter()
                    .copied()
                    .filter(|r| r.player_rating.is_some_and(|rating| (low..high).contains(&rating))),
            )
        })
        .collect()
}

pub fn by_game_phase(records: &[&FrictionRecord]) -> Vec<BlunderRate> {
    GamePhase::ALL
        .iter()
        .filter_map(|phase| {
            BlunderRate::of(
                phase.as_str(),
                records
                    .iter()
                    .copied()
                    .filter(|r| GamePhase::from_phase(r.game_phase) == *phase),
            )
        })
        .collect()
}

//! Board features extracted before a move.

use serde::{Deserialize, Serialize};

/// Static description of a position, used as model covariates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionFeatures {
    /// White material minus black material, in centipawns.
    pub material_balance: i32,
    pub total_material: i32,
    pub mobility_white: u32,
    pub mobility_black: u32,
    pub num_legal_moves: u32,
    pub num_captures: u32,
    pub num_checks: u32,
    pub num_pieces: u32,
    /// 1.0 in the opening down to 0.0 in a bare endgame.
    pub game_phase: f64,
    pub is_check: bool,
    pub has_castling_rights: bool,
    pub halfmove_clock: u32,
    pub has_hanging_pieces: bool,
    pub pawn_tension: u32,
    pub complexity_score: f64,
}

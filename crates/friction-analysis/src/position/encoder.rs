//! Position encoder: material, mobility, tactics, and a complexity proxy.

use friction_core::types::PositionFeatures;
use shakmaty::{Color, Role};

use crate::chess::Board;

/// Non-king pieces, valued and phase-weighted.
const SCORED_ROLES: [Role; 5] = [Role::Pawn, Role::Knight, Role::Bishop, Role::Rook, Role::Queen];

/// Sum of phase weights with all minor and major pieces on the board.
const MAX_PHASE: f64 = 24.0;

/// Centipawn piece values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialValues {
    pub pawn: i32,
    pub knight: i32,
    pub bishop: i32,
    pub rook: i32,
    pub queen: i32,
}

impl Default for MaterialValues {
    fn default() -> Self {
        Self {
            pawn: 100,
            knight: 320,
            bishop: 330,
            rook: 500,
            queen: 900,
        }
    }
}

impl MaterialValues {
    fn value(&self, role: Role) -> i32 {
        match role {
            Role::Pawn => self.pawn,
            Role::Knight => self.knight,
            Role::Bishop => self.bishop,
            Role::Rook => self.rook,
            Role::Queen => self.queen,
            Role::King => 0,
        }
    }
}

fn phase_weight(role: Role) -> u32 {
    match role {
        Role::Knight | Role::Bishop => 1,
        Role::Rook => 2,
        Role::Queen => 4,
        Role::Pawn | Role::King => 0,
    }
}

#[derive(Debug, Clone, Default)]
pub struct PositionEncoder {
    values: MaterialValues,
}

impl PositionEncoder {
    pub fn new(values: MaterialValues) -> Self {
        Self { values }
    }

    pub fn encode(&self, board: &Board) -> PositionFeatures {
        let mut white_material = 0;
        let mut black_material = 0;
        let mut phase_units = 0u32;
        for role in SCORED_ROLES {
            let white = board.pieces(Color::White, role).count() as i32;
            let black = board.pieces(Color::Black, role).count() as i32;
            white_material += white * self.values.value(role);
            black_material += black * self.values.value(role);
            phase_units += (white + black) as u32 * phase_weight(role);
        }
        let game_phase = (f64::from(phase_units) / MAX_PHASE).min(1.0);

        let legal = board.legal_moves();
        let num_legal_moves = legal.len() as u32;
        let num_captures = legal.iter().filter(|m| m.is_capture()).count() as u32;
        let num_checks = legal.iter().filter(|m| board.gives_check(m)).count() as u32;
        let opponent = board.opponent_mobility() as u32;
        let (mobility_white, mobility_black) = if board.white_to_move() {
            (num_legal_moves, opponent)
        } else {
            (opponent, num_legal_moves)
        };
        let pawn_tension = board.pawn_tension();

        PositionFeatures {
            material_balance: white_material - black_material,
            total_material: white_material + black_material,
            mobility_white,
            mobility_black,
            num_legal_moves,
            num_captures,
            num_checks,
            num_pieces: board.occupied().count() as u32,
            game_phase,
            is_check: board.is_check(),
            has_castling_rights: board.has_castling_rights(),
            halfmove_clock: board.halfmove_clock(),
            has_hanging_pieces: board.has_hanging_piece(Color::White)
                || board.has_hanging_piece(Color::Black),
            pawn_tension,
            complexity_score: complexity(num_legal_moves, num_captures, num_checks, pawn_tension, game_phase),
        }
    }
}

/// Weighted blend of branching, tactical density, and tension, damped away
/// from the late middlegame where positions tend to be hardest.
pub fn complexity(legal: u32, captures: u32, checks: u32, tension: u32, phase: f64) -> f64 {
    let ratio = |n: u32, cap: f64| (f64::from(n) / cap).min(1.0);
    let raw = 0.4 * ratio(legal, 40.0)
        + 0.3 * ratio(captures, 10.0)
        + 0.2 * ratio(checks, 3.0)
        + 0.1 * ratio(tension, 4.0);
    raw * (1.0 - (phase - 0.6).abs() * 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_features() {
        let f = PositionEncoder::default().encode(&Board::starting());
        assert_eq!(f.material_balance, 0);
        assert_eq!(f.total_material, 8000);
        assert_eq!(f.num_legal_moves, 20);
        assert_eq!(f.mobility_white, 20);
        assert_eq!(f.mobility_black, 20);
        assert_eq!(f.num_captures, 0);
        assert_eq!(f.num_checks, 0);
        assert_eq!(f.num_pieces, 32);
        assert_eq!(f.game_phase, 1.0);
        assert!(f.has_castling_rights);
        assert!(!f.has_hanging_pieces);
        assert!((f.complexity_score - 0.16).abs() < 1e-9);
    }

    #[test]
    fn bare_kings_are_endgame() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 60").unwrap();
        let f = PositionEncoder::default().encode(&board);
        assert_eq!(f.game_phase, 0.0);
        assert_eq!(f.total_material, 0);
        assert_eq!(f.num_pieces, 2);
        assert!(!f.has_castling_rights);
    }

    #[test]
    fn hanging_piece_and_captures() {
        // Black knight on d5 attacked by the e4 pawn and undefended.
        let board = Board::from_fen("4k3/8/8/3n4/4P3/8/8/4K3 w - - 0 30").unwrap();
        let f = PositionEncoder::default().encode(&board);
        assert!(f.has_hanging_pieces);
        assert_eq!(f.num_captures, 1);
        assert_eq!(f.material_balance, 100 - 320);
    }

    #[test]
    fn complexity_is_bounded() {
        assert_eq!(complexity(0, 0, 0, 0, 0.6), 0.0);
        let max = complexity(100, 100, 100, 100, 0.6);
        assert!((max - 1.0).abs() < 1e-9);
    }
}

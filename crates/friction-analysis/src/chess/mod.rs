//! Thin wrapper over `shakmaty` exposing only what the pipeline needs:
//! SAN replay, FEN in and out, UCI notation, and board queries.

use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::{
    attacks, Bitboard, CastlingMode, Chess, Color, EnPassantMode, FromSetup, Move, Position, Role,
};

/// Errors from the rules layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChessError {
    #[error("invalid FEN {fen}: {message}")]
    InvalidFen { fen: String, message: String },

    #[error("unparseable SAN {0}")]
    InvalidSan(String),

    #[error("illegal move {0}")]
    IllegalMove(String),
}

/// A move applied to the board, in both notations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    pub san: String,
    pub uci: String,
}

/// Mutable game position.
#[derive(Debug, Clone)]
pub struct Board {
    pos: Chess,
}

impl Default for Board {
    fn default() -> Self {
        Self::starting()
    }
}

impl Board {
    pub fn starting() -> Self {
        Self {
            pos: Chess::default(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let invalid = |message: String| ChessError::InvalidFen {
            fen: fen.to_string(),
            message,
        };
        let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{e}")))?;
        let pos: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| invalid(format!("{e}")))?;
        Ok(Self { pos })
    }

    /// Full FEN, en passant square only when a capture is legal.
    pub fn fen(&self) -> String {
        Fen(self.pos.clone().into_setup(EnPassantMode::Legal)).to_string()
    }

    pub fn white_to_move(&self) -> bool {
        self.pos.turn() == Color::White
    }

    /// Apply a SAN token as written in a game score. Annotation glyphs are
    /// dropped; the returned SAN is canonical and carries a check or mate
    /// suffix.
    pub fn play_san(&mut self, token: &str) -> Result<PlayedMove, ChessError> {
        let clean = token.trim_end_matches(|c| matches!(c, '+' | '#' | '!' | '?'));
        let clean = normalize_castling(clean);
        let san: San = clean
            .parse()
            .map_err(|_| ChessError::InvalidSan(token.to_string()))?;
        let m = san
            .to_move(&self.pos)
            .map_err(|_| ChessError::IllegalMove(token.to_string()))?;

        let uci = m.to_uci(CastlingMode::Standard).to_string();
        let san = SanPlus::from_move_and_play_unchecked(&mut self.pos, &m);
        Ok(PlayedMove {
            san: san.to_string(),
            uci,
        })
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.pos.legal_moves().into_iter().collect()
    }

    pub fn gives_check(&self, m: &Move) -> bool {
        let mut next = self.pos.clone();
        next.play_unchecked(m);
        next.is_check()
    }

    /// Legal move count for the side not to move, as if it were its turn.
    /// Zero when that position would be illegal (the mover is in check).
    pub fn opponent_mobility(&self) -> usize {
        let mut setup = self.pos.clone().into_setup(EnPassantMode::Legal);
        setup.turn = !setup.turn;
        setup.ep_square = None;
        Chess::from_setup(setup, CastlingMode::Standard)
            .map(|p| p.legal_moves().len())
            .unwrap_or(0)
    }

    pub fn is_check(&self) -> bool {
        self.pos.is_check()
    }

    pub fn has_castling_rights(&self) -> bool {
        self.pos.castles().castling_rights().any()
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.pos.halfmoves()
    }

    pub fn pieces(&self, color: Color, role: Role) -> Bitboard {
        let board = self.pos.board();
        board.by_color(color) & board.by_role(role)
    }

    pub fn occupied(&self) -> Bitboard {
        self.pos.board().occupied()
    }

    /// Non-king pieces of `color` attacked by the other side and not
    /// defended by their own.
    pub fn has_hanging_piece(&self, color: Color) -> bool {
        let board = self.pos.board();
        let occupied = board.occupied();
        let candidates = board.by_color(color) & !board.by_role(Role::King);
        candidates.into_iter().any(|sq| {
            board.attacks_to(sq, !color, occupied).any()
                && !board.attacks_to(sq, color, occupied).any()
        })
    }

    /// White pawns attacking black pawns plus the reverse.
    pub fn pawn_tension(&self) -> u32 {
        let white = self.pieces(Color::White, Role::Pawn);
        let black = self.pieces(Color::Black, Role::Pawn);
        let white_hits: usize = white
            .into_iter()
            .map(|sq| (attacks::pawn_attacks(Color::White, sq) & black).count())
            .sum();
        let black_hits: usize = black
            .into_iter()
            .map(|sq| (attacks::pawn_attacks(Color::Black, sq) & white).count())
            .sum();
        (white_hits + black_hits) as u32
    }
}

/// Some archives write castling with zeros.
fn normalize_castling(san: &str) -> String {
    match san {
        "0-0" => "O-O".to_string(),
        "0-0-0" => "O-O-O".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plays_san_and_reports_uci() {
        let mut board = Board::starting();
        let e4 = board.play_san("e4").unwrap();
        assert_eq!(e4.uci, "e2e4");
        assert_eq!(
            board.fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
        assert!(!board.white_to_move());
    }

    #[test]
    fn castling_in_both_spellings() {
        let mut board = Board::starting();
        for san in ["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5"] {
            board.play_san(san).unwrap();
        }
        let castle = board.play_san("0-0").unwrap();
        assert_eq!(castle.san, "O-O");
        assert_eq!(castle.uci, "e1g1");
    }

    #[test]
    fn check_suffix_is_added() {
        let mut board = Board::starting();
        for san in ["f3", "e5", "g4"] {
            board.play_san(san).unwrap();
        }
        let mate = board.play_san("Qh4").unwrap();
        assert_eq!(mate.san, "Qh4#");
    }

    #[test]
    fn over_disambiguated_san_is_stored_canonically() {
        let mut board = Board::starting();
        let knight = board.play_san("Ngf3").unwrap();
        assert_eq!(knight.san, "Nf3");
        assert_eq!(knight.uci, "g1f3");

        let reply = board.play_san("Nc6!?").unwrap();
        assert_eq!(reply.san, "Nc6");
    }

    #[test]
    fn illegal_and_garbage_moves() {
        let mut board = Board::starting();
        assert!(matches!(board.play_san("e5"), Err(ChessError::IllegalMove(_))));
        assert!(matches!(board.play_san("zz9"), Err(ChessError::InvalidSan(_))));
    }

    #[test]
    fn fen_round_trip() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
        assert_eq!(Board::from_fen(fen).unwrap().fen(), fen);
        assert!(Board::from_fen("not a fen").is_err());
    }

    #[test]
    fn pawn_tension_counts_both_sides() {
        // 1.e4 d5: the e4 and d5 pawns attack each other.
        let board =
            Board::from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2")
                .unwrap();
        assert_eq!(board.pawn_tension(), 2);
        assert!(board.has_castling_rights());
    }

    #[test]
    fn starting_mobility() {
        let board = Board::starting();
        assert_eq!(board.legal_moves().len(), 20);
        assert_eq!(board.opponent_mobility(), 20);
        assert!(!board.has_hanging_piece(Color::White));
    }
}

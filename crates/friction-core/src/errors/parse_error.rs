//! Game archive parse errors.

use std::path::PathBuf;

use super::error_code::{self, FrictionErrorCode};

/// Errors raised while reading an archive or decoding a single game.
///
/// Archive-level variants abort the stream; game-level variants are
/// counted and the game is skipped.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Cannot open archive {path}: {message}")]
    Archive { path: PathBuf, message: String },

    #[error("I/O error while reading games: {message}")]
    Io { message: String },

    #[error("Malformed game {game}: {message}")]
    Malformed { game: String, message: String },

    #[error("Illegal move {san} at ply {ply} in game {game}")]
    IllegalMove { game: String, ply: u32, san: String },

    #[error("Invalid FEN {fen}: {message}")]
    InvalidFen { fen: String, message: String },
}

impl FrictionErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Archive { .. } | Self::Io { .. } => error_code::ARCHIVE_ERROR,
            Self::IllegalMove { .. } => error_code::ILLEGAL_MOVE,
            _ => error_code::PARSE_ERROR,
        }
    }
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

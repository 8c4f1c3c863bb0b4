//! Player-profile input errors.

use super::error_code::{self, FrictionErrorCode};

/// Errors raised while validating exported API game records.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Invalid JSON on line {line}: {message}")]
    Json { line: usize, message: String },

    #[error("Game record missing required field {field}")]
    MissingField { field: &'static str },

    #[error("Game {game_id} does not involve player {player}")]
    PlayerNotInGame { game_id: String, player: String },

    #[error("Not enough data for {player}: {message}")]
    InsufficientData { player: String, message: String },
}

impl FrictionErrorCode for ProfileError {
    fn error_code(&self) -> &'static str {
        error_code::PROFILE_ERROR
    }
}

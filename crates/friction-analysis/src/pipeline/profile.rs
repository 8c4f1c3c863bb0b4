//! NDJSON export to player profile.

use std::path::Path;

use friction_core::config::FrictionConfig;
use friction_core::errors::{PipelineError, ProfileError};
use serde::Serialize;

use crate::pgn::open_archive;
use crate::profile::{classify_player_errors, compute_signature, read_ndjson, ApiBatch, ErrorLevels, PlayerProfile};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileRun {
    pub profile: PlayerProfile,
    pub games_read: usize,
    pub lines_rejected: usize,
}

fn load_export(export: &Path) -> Result<ApiBatch, PipelineError> {
    let reader = open_archive(export)?;
    read_ndjson(reader).map_err(|e| PipelineError::Io {
        path: export.display().to_string(),
        message: e.to_string(),
    })
}

pub fn run_profile(config: &FrictionConfig, export: &Path, username: &str) -> Result<ProfileRun, PipelineError> {
    let batch = load_export(export)?;
    tracing::info!(
        games = batch.games.len(),
        rejected = batch.rejected,
        player = username,
        "loaded game export"
    );

    let signature = compute_signature(&batch.games, username, config.profile.effective_min_games())?;
    Ok(ProfileRun {
        profile: PlayerProfile::build(signature, &config.profile.effective_benchmarks()),
        games_read: batch.games.len(),
        lines_rejected: batch.rejected,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelsRun {
    pub player: String,
    pub levels: ErrorLevels,
    pub games_read: usize,
    pub lines_rejected: usize,
}

/// L1/L2/L3 blunder counts for one player. Only games exported with
/// server analysis contribute.
pub fn run_levels(export: &Path, username: &str) -> Result<LevelsRun, PipelineError> {
    let batch = load_export(export)?;
    let levels = classify_player_errors(&batch.games, username);
    if levels.games == 0 {
        return Err(ProfileError::InsufficientData {
            player: username.to_string(),
            message: "no analysed games in the export".to_string(),
        }
        .into());
    }
    tracing::info!(player = username, games = levels.games, blunders = levels.blunders(), "classified blunders");
    Ok(LevelsRun {
        player: username.to_string(),
        levels,
        games_read: batch.games.len(),
        lines_rejected: batch.rejected,
    })
}

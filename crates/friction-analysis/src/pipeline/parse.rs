//! Archive to store.

use std::io::BufRead;
use std::path::Path;
use std::time::Instant;

use friction_core::config::FrictionConfig;
use friction_core::errors::{PipelineError, PipelineResult};
use friction_core::tracing::metrics;
use friction_core::traits::{Cancellable, CancellationToken};
use friction_storage::queries::games;
use friction_storage::{unix_now, DatabaseManager};
use serde::Serialize;

use crate::pgn::{open_archive, FilterCriteria, PgnParser};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseSummary {
    pub parsed: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub malformed: usize,
    /// Newly inserted games.
    pub stored: usize,
    /// Accepted games already in the store.
    pub duplicates: usize,
    pub store_failures: usize,
    /// Rejection counts by reason, most frequent first.
    pub rejections: Vec<(String, usize)>,
    pub acceptance_rate: f64,
}

/// Stream `archive` into the store. Stops after `limit` stored games, or
/// `data.sample_size` when no limit is given.
pub fn run_parse(
    db: &DatabaseManager,
    config: &FrictionConfig,
    archive: &Path,
    limit: Option<usize>,
    cancel: &CancellationToken,
) -> Result<PipelineResult<ParseSummary>, PipelineError> {
    let reader = open_archive(archive)?;
    tracing::info!(path = %archive.display(), "parsing archive");
    run_parse_reader(db, config, reader, limit, cancel)
}

pub fn run_parse_reader<R: BufRead>(
    db: &DatabaseManager,
    config: &FrictionConfig,
    reader: R,
    limit: Option<usize>,
    cancel: &CancellationToken,
) -> Result<PipelineResult<ParseSummary>, PipelineError> {
    let start = Instant::now();
    let cap = limit.or(config.data.sample_size);
    let mut parser = PgnParser::new(FilterCriteria::from(&config.filters));
    let mut result = PipelineResult::new(ParseSummary::default());

    let mut stream = parser.parse_reader(reader);
    loop {
        if cap.is_some_and(|cap| result.data.stored >= cap) {
            tracing::info!(limit = ?cap, "reached game limit");
            break;
        }
        if cancel.is_cancelled() {
            tracing::warn!("parse cancelled");
            result.cancelled = true;
            break;
        }
        let Some(game) = stream.next() else {
            break;
        };

        let now = unix_now();
        match db.with_transaction(|tx| games::insert_game(tx, &game, now)) {
            Ok(true) => result.data.stored += 1,
            Ok(false) => {
                tracing::debug!(game_id = %game.game_id, "game already stored");
                result.data.duplicates += 1;
            }
            Err(e) => {
                tracing::warn!(game_id = %game.game_id, error = %e, "failed to store game");
                result.data.store_failures += 1;
                result.add_error(e.into());
            }
        }
    }

    let stats = stream.stats().clone();
    if let Err(e) = stream.finish() {
        result.add_error(e.into());
    }

    let summary = &mut result.data;
    summary.parsed = stats.parsed;
    summary.accepted = stats.accepted;
    summary.rejected = stats.rejected;
    summary.malformed = stats.malformed;
    summary.acceptance_rate = stats.acceptance_rate();
    summary.rejections = stats
        .rejections_sorted()
        .into_iter()
        .map(|(reason, n)| (reason.as_str().to_string(), n))
        .collect();

    tracing::info!(
        { metrics::GAMES_PARSED } = summary.parsed,
        { metrics::GAMES_ACCEPTED } = summary.accepted,
        { metrics::GAMES_REJECTED } = summary.rejected,
        { metrics::GAMES_MALFORMED } = summary.malformed,
        stored = summary.stored,
        duplicates = summary.duplicates,
        { metrics::PHASE_DURATION_MS } = super::elapsed_ms(start),
        "parse phase complete"
    );
    Ok(result)
}

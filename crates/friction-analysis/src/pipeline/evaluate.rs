//! Stored games to friction records.

use std::sync::Arc;
use std::time::Instant;

use friction_core::config::FrictionConfig;
use friction_core::errors::{EngineError, PipelineError, PipelineResult};
use friction_core::tracing::metrics;
use friction_core::traits::{Cancellable, CancellationToken};
use friction_core::types::{EvaluationRecord, FrictionRecord, MoveRecord};
use friction_storage::queries::games::PendingGame;
use friction_storage::queries::{friction as friction_rows, games, moves};
use friction_storage::{unix_now, DatabaseManager};
use serde::Serialize;

use crate::chess::Board;
use crate::engine::{EngineLauncher, Evaluator};
use crate::friction::{FrictionAnalyzer, FrictionThresholds, MoveContext};
use crate::position::PositionEncoder;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluateSummary {
    pub games_pending: usize,
    pub games_analyzed: usize,
    pub games_failed: usize,
    pub moves_analyzed: usize,
    /// Moves past the opening without think time or clock.
    pub moves_without_clock: usize,
    pub engine_failures: usize,
    pub store_failures: usize,
    /// Games left pending because an interrupt arrived after one of their
    /// positions failed.
    pub games_deferred: usize,
    /// Set when the engine could not be (re)started; the last error in the
    /// result is the cause.
    pub aborted: bool,
    pub memory_hits: u64,
    pub store_hits: u64,
    pub engine_calls: u64,
}

/// Analyze every game without `analyzed_at`, up to `limit`.
///
/// Per game: moves in ply order, opening skipped, one evaluation per
/// position, records and the analyzed mark written in one transaction.
/// A failed position is counted and skipped. An engine that cannot start
/// stops the phase with `aborted` set; games already committed stay
/// analyzed and the counters are returned.
pub fn run_evaluate<L: EngineLauncher>(
    db: &DatabaseManager,
    config: &FrictionConfig,
    launcher: L,
    limit: Option<usize>,
    cancel: &CancellationToken,
) -> Result<PipelineResult<EvaluateSummary>, PipelineError> {
    let start = Instant::now();
    let pending = db.with_conn(|conn| games::games_needing_analysis(conn, limit))?;
    let mut result = PipelineResult::new(EvaluateSummary {
        games_pending: pending.len(),
        ..Default::default()
    });
    if pending.is_empty() {
        tracing::info!("no games awaiting analysis");
        return Ok(result);
    }
    tracing::info!(games = pending.len(), "evaluating games");

    let engine = &config.engine;
    let mut evaluator = Evaluator::new(
        launcher,
        engine.effective_depth(),
        engine.effective_multipv(),
        engine.effective_cache_capacity(),
    )
    .with_store(db);
    let analyzer = FrictionAnalyzer::new(FrictionThresholds::from(config));
    let encoder = PositionEncoder::default();
    let skip_plies = engine.effective_skip_opening_moves() * 2;

    for game in &pending {
        if cancel.is_cancelled() {
            tracing::warn!("evaluate cancelled");
            result.cancelled = true;
            break;
        }

        let game_moves = match db.with_conn(|conn| moves::moves_for_game(conn, &game.game_id)) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(game_id = %game.game_id, error = %e, "failed to load moves");
                result.data.games_failed += 1;
                result.add_error(e.into());
                continue;
            }
        };

        let mut walk = GameWalk {
            analyzer: &analyzer,
            encoder: &encoder,
            skip_plies,
            summary: &mut result.data,
            failures: 0,
            errors: Vec::new(),
        };
        let outcome = walk.analyze(game, &game_moves, |fen| evaluator.evaluate(fen));
        let GameWalk { failures, errors, .. } = walk;
        for e in errors {
            result.add_error(e);
        }
        let records = match outcome {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(game_id = %game.game_id, error = %e, "engine unavailable, stopping evaluate phase");
                result.data.aborted = true;
                result.add_error(e);
                break;
            }
        };
        // An interrupt reaches the engine too; its failures are not final.
        if failures > 0 && cancel.is_cancelled() {
            tracing::warn!(game_id = %game.game_id, failures, "interrupted with failed positions, game left pending");
            result.data.games_deferred += 1;
            result.cancelled = true;
            break;
        }

        let now = unix_now();
        let written = db.with_transaction(|tx| {
            for record in &records {
                friction_rows::upsert_friction(tx, record)?;
            }
            games::mark_analyzed(tx, &game.game_id, now)
        });
        match written {
            Ok(()) => {
                result.data.games_analyzed += 1;
                result.data.moves_analyzed += records.len();
                tracing::debug!(game_id = %game.game_id, records = records.len(), "game analyzed");
            }
            Err(e) => {
                tracing::warn!(game_id = %game.game_id, error = %e, "failed to store friction records");
                result.data.store_failures += 1;
                result.data.games_failed += 1;
                result.add_error(e.into());
            }
        }
    }

    let stats = evaluator.stats();
    if let Err(e) = evaluator.shutdown() {
        tracing::warn!(error = %e, "engine shutdown failed");
    }
    let summary = &mut result.data;
    summary.memory_hits = stats.memory_hits;
    summary.store_hits = stats.store_hits;
    summary.engine_calls = stats.engine_calls;
    summary.store_failures += stats.store_failures as usize;

    tracing::info!(
        games = summary.games_analyzed,
        failed = summary.games_failed,
        { metrics::FRICTION_RECORDS } = summary.moves_analyzed,
        { metrics::EVAL_MEMORY_HITS } = summary.memory_hits,
        { metrics::EVAL_STORE_HITS } = summary.store_hits,
        { metrics::ENGINE_CALLS } = summary.engine_calls,
        { metrics::PHASE_DURATION_MS } = super::elapsed_ms(start),
        "evaluate phase complete"
    );
    Ok(result)
}

/// Per-game state for turning moves into friction records.
struct GameWalk<'a> {
    analyzer: &'a FrictionAnalyzer,
    encoder: &'a PositionEncoder,
    skip_plies: u32,
    summary: &'a mut EvaluateSummary,
    /// Positions of this game the engine failed on.
    failures: usize,
    errors: Vec<PipelineError>,
}

impl GameWalk<'_> {
    fn analyze<F>(
        &mut self,
        game: &PendingGame,
        game_moves: &[MoveRecord],
        mut evaluate: F,
    ) -> Result<Vec<FrictionRecord>, PipelineError>
    where
        F: FnMut(&str) -> Result<Arc<EvaluationRecord>, EngineError>,
    {
        let side_times = |white: bool| -> Vec<f64> {
            game_moves
                .iter()
                .filter(|m| m.is_white == white)
                .filter_map(|m| m.think_time)
                .collect()
        };
        let white_times = side_times(true);
        let black_times = side_times(false);

        let mut records = Vec::new();
        for mv in game_moves.iter().filter(|m| m.ply > self.skip_plies) {
            let (Some(think_time), Some(time_remaining)) = (mv.think_time, mv.clock_after) else {
                self.summary.moves_without_clock += 1;
                continue;
            };

            let evaluation = match evaluate(&mv.fen_before) {
                Ok(e) => e,
                Err(e @ EngineError::StartFailed { .. }) => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(game_id = %game.game_id, ply = mv.ply, error = %e, "evaluation failed");
                    self.summary.engine_failures += 1;
                    self.failures += 1;
                    self.errors.push(e.into());
                    continue;
                }
            };
            let board = match Board::from_fen(&mv.fen_before) {
                Ok(b) => b,
                Err(e) => {
                    tracing::warn!(game_id = %game.game_id, ply = mv.ply, error = %e, "stored position is invalid");
                    self.summary.engine_failures += 1;
                    continue;
                }
            };
            let features = self.encoder.encode(&board);

            let rating = if mv.is_white { game.white_rating } else { game.black_rating };
            records.push(self.analyzer.analyze_move(&MoveContext {
                game_id: &game.game_id,
                ply: mv.ply,
                is_white: mv.is_white,
                uci: &mv.uci,
                player_rating: rating,
                think_time,
                time_remaining,
                side_think_times: if mv.is_white { &white_times } else { &black_times },
                evaluation: &evaluation,
                features: &features,
            }));
        }
        Ok(records)
    }
}

//! Friction records to L2 trigger rows.

use std::time::Instant;

use friction_core::config::FrictionConfig;
use friction_core::errors::{PipelineError, PipelineResult};
use friction_core::tracing::metrics;
use friction_core::traits::{Cancellable, CancellationToken};
use friction_storage::queries::{evaluations, friction as friction_rows, triggers};
use friction_storage::DatabaseManager;
use serde::Serialize;

use crate::triggers::{TriggerAnalyzer, TriggerThresholds};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TriggerPhaseSummary {
    pub games: usize,
    /// Games below the minimum analyzed-move count.
    pub games_skipped: usize,
    pub rows: usize,
    pub fired: usize,
    pub hits: usize,
    pub misses: usize,
    pub false_alarms: usize,
    /// Positions whose stored evaluation could not be read.
    pub lookup_failures: usize,
    pub store_failures: usize,
}

pub fn run_triggers(
    db: &DatabaseManager,
    config: &FrictionConfig,
    cancel: &CancellationToken,
) -> Result<PipelineResult<TriggerPhaseSummary>, PipelineError> {
    let start = Instant::now();
    let game_ids = db.with_conn(friction_rows::analyzed_game_ids)?;
    let analyzer = TriggerAnalyzer::new(TriggerThresholds::from(&config.triggers));
    let depth = config.engine.effective_depth();
    let multipv = config.engine.effective_multipv();
    let mut result = PipelineResult::new(TriggerPhaseSummary::default());
    tracing::info!(games = game_ids.len(), "computing trigger metrics");

    for game_id in &game_ids {
        if cancel.is_cancelled() {
            tracing::warn!("trigger phase cancelled");
            result.cancelled = true;
            break;
        }
        let inputs = match db.with_conn(|conn| triggers::trigger_inputs(conn, game_id)) {
            Ok(inputs) => inputs,
            Err(e) => {
                tracing::warn!(game_id = %game_id, error = %e, "failed to load trigger inputs");
                result.add_error(e.into());
                continue;
            }
        };

        let mut lookup_failures = 0;
        let rows = analyzer.analyze_game(game_id, &inputs, |key| {
            db.with_conn(|conn| evaluations::get_evaluation(conn, key, depth, multipv))
                .unwrap_or_else(|e| {
                    tracing::debug!(position = %key, error = %e, "evaluation lookup failed");
                    lookup_failures += 1;
                    None
                })
        });
        let summary = &mut result.data;
        summary.lookup_failures += lookup_failures;
        if rows.is_empty() {
            summary.games_skipped += 1;
            continue;
        }

        let written = db.with_transaction(|tx| {
            for row in &rows {
                triggers::upsert_trigger(tx, row)?;
            }
            Ok(())
        });
        if let Err(e) = written {
            tracing::warn!(game_id = %game_id, error = %e, "failed to store trigger rows");
            result.data.store_failures += 1;
            result.add_error(e.into());
            continue;
        }

        let summary = &mut result.data;
        summary.games += 1;
        summary.rows += rows.len();
        summary.fired += rows.iter().filter(|r| r.should_fire).count();
        summary.hits += rows.iter().filter(|r| r.is_hit()).count();
        summary.misses += rows.iter().filter(|r| r.is_miss()).count();
        summary.false_alarms += rows.iter().filter(|r| r.is_false_alarm()).count();
    }

    tracing::info!(
        games = result.data.games,
        { metrics::TRIGGER_ROWS } = result.data.rows,
        fired = result.data.fired,
        misses = result.data.misses,
        { metrics::PHASE_DURATION_MS } = super::elapsed_ms(start),
        "trigger phase complete"
    );
    Ok(result)
}

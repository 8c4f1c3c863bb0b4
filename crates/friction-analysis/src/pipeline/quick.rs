//! Engine-free look at think times in an archive.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::BufRead;
use std::path::Path;

use friction_core::config::FrictionConfig;
use friction_core::errors::{PipelineError, PipelineResult};
use friction_core::traits::{Cancellable, CancellationToken};
use serde::Serialize;

use crate::pgn::{open_archive, FilterCriteria, PgnParser};
use crate::statistics::descriptive::mean;
use crate::statistics::Summary;

/// Move numbers shown in the per-move table.
const MOVE_TABLE_LEN: u32 = 20;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuickScan {
    pub games: usize,
    pub moves: usize,
    pub think_time: Option<Summary>,
    pub pressure_moves: usize,
    pub mean_think_pressure: Option<f64>,
    pub mean_think_calm: Option<f64>,
    /// Mean think time per full-move number, ascending.
    pub by_move_number: Vec<(u32, f64)>,
}

impl QuickScan {
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Games analyzed: {}", self.games);
        let _ = writeln!(out, "Moves with clock data: {}", self.moves);
        let Some(s) = &self.think_time else {
            let _ = writeln!(out, "No moves with clock data");
            return out;
        };
        let _ = writeln!(out, "\nThink time (seconds):");
        let _ = writeln!(out, "  mean {:.2}  median {:.2}  std {:.2}", s.mean, s.median, s.std_dev);
        let _ = writeln!(out, "  min {:.2}  max {:.2}", s.min, s.max);

        let opt = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}s"));
        let _ = writeln!(
            out,
            "\nTime pressure: {} moves ({:.1}%)",
            self.pressure_moves,
            100.0 * self.pressure_moves as f64 / self.moves.max(1) as f64
        );
        let _ = writeln!(out, "  mean think under pressure: {}", opt(self.mean_think_pressure));
        let _ = writeln!(out, "  mean think otherwise:      {}", opt(self.mean_think_calm));

        let _ = writeln!(out, "\nThink time by move number:");
        for (n, t) in self.by_move_number.iter().take(MOVE_TABLE_LEN as usize) {
            let _ = writeln!(out, "  move {n:2}: {t:.2}s");
        }
        out
    }
}

pub fn quick_scan(
    config: &FrictionConfig,
    archive: &Path,
    sample: usize,
    cancel: &CancellationToken,
) -> Result<PipelineResult<QuickScan>, PipelineError> {
    let reader = open_archive(archive)?;
    quick_scan_reader(config, reader, sample, cancel)
}

/// Scan up to `sample` accepted games. Moves without think time are
/// ignored; time pressure is judged on the clock after the move.
pub fn quick_scan_reader<R: BufRead>(
    config: &FrictionConfig,
    reader: R,
    sample: usize,
    cancel: &CancellationToken,
) -> Result<PipelineResult<QuickScan>, PipelineError> {
    let pressure_line = config.thresholds.effective_time_pressure_seconds();
    let mut parser = PgnParser::new(FilterCriteria::from(&config.filters));
    let mut stream = parser.parse_reader(reader);
    let mut result = PipelineResult::new(QuickScan::default());

    let mut all = Vec::new();
    let mut pressure = Vec::new();
    let mut calm = Vec::new();
    let mut by_move: BTreeMap<u32, (f64, usize)> = BTreeMap::new();

    while result.data.games < sample {
        if cancel.is_cancelled() {
            result.cancelled = true;
            break;
        }
        let Some(game) = stream.next() else {
            break;
        };
        result.data.games += 1;
        for mv in &game.moves {
            let Some(think) = mv.think_time else {
                continue;
            };
            all.push(think);
            if mv.clock_after.is_some_and(|c| c < pressure_line) {
                pressure.push(think);
            } else {
                calm.push(think);
            }
            let slot = by_move.entry(mv.move_number()).or_insert((0.0, 0));
            slot.0 += think;
            slot.1 += 1;
        }
    }
    if let Err(e) = stream.finish() {
        result.add_error(e.into());
    }

    let scan = &mut result.data;
    scan.moves = all.len();
    scan.think_time = Summary::of(&all);
    scan.pressure_moves = pressure.len();
    scan.mean_think_pressure = mean(&pressure);
    scan.mean_think_calm = mean(&calm);
    scan.by_move_number = by_move
        .into_iter()
        .map(|(n, (sum, count))| (n, sum / count as f64))
        .collect();
    tracing::info!(games = scan.games, moves = scan.moves, "quick scan complete");
    Ok(result)
}

//! Plain-text phase summaries for stdout.

use std::fmt::Write as _;
use std::path::Path;

use friction_analysis::pipeline::{AnalyzeSummary, EvaluateSummary, ParseSummary, TriggerPhaseSummary};
use friction_core::errors::{FrictionErrorCode, PipelineResult};
use friction_storage::queries::stats::TableCounts;

pub fn parse(s: &ParseSummary) -> String {
    let mut out = String::from("Parse\n");
    let _ = writeln!(out, "  games read:      {}", s.parsed);
    let _ = writeln!(out, "  accepted:        {} ({:.1}%)", s.accepted, 100.0 * s.acceptance_rate);
    let _ = writeln!(out, "  rejected:        {}", s.rejected);
    let _ = writeln!(out, "  malformed:       {}", s.malformed);
    let _ = writeln!(out, "  stored:          {}", s.stored);
    let _ = writeln!(out, "  already stored:  {}", s.duplicates);
    if s.store_failures > 0 {
        let _ = writeln!(out, "  store failures:  {}", s.store_failures);
    }
    for (reason, count) in &s.rejections {
        let _ = writeln!(out, "    {reason}: {count}");
    }
    out
}

pub fn evaluate(s: &EvaluateSummary) -> String {
    let mut out = String::from("Evaluate\n");
    let _ = writeln!(out, "  games pending:   {}", s.games_pending);
    let _ = writeln!(out, "  games analyzed:  {}", s.games_analyzed);
    let _ = writeln!(out, "  games failed:    {}", s.games_failed);
    let _ = writeln!(out, "  moves analyzed:  {}", s.moves_analyzed);
    let _ = writeln!(out, "  without clock:   {}", s.moves_without_clock);
    let _ = writeln!(out, "  engine failures: {}", s.engine_failures);
    let _ = writeln!(out, "  store failures:  {}", s.store_failures);
    if s.games_deferred > 0 {
        let _ = writeln!(out, "  left pending:    {}", s.games_deferred);
    }
    let _ = writeln!(
        out,
        "  evaluations:     {} cached, {} stored, {} engine",
        s.memory_hits, s.store_hits, s.engine_calls
    );
    if s.aborted {
        let _ = writeln!(out, "  aborted:         engine unavailable");
    }
    out
}

pub fn triggers(s: &TriggerPhaseSummary) -> String {
    let mut out = String::from("Triggers\n");
    let _ = writeln!(out, "  games:           {} ({} too short)", s.games, s.games_skipped);
    let _ = writeln!(out, "  rows:            {}", s.rows);
    let _ = writeln!(out, "  fired:           {}", s.fired);
    let _ = writeln!(out, "  hits:            {}", s.hits);
    let _ = writeln!(out, "  misses:          {}", s.misses);
    let _ = writeln!(out, "  false alarms:    {}", s.false_alarms);
    if s.lookup_failures + s.store_failures > 0 {
        let _ = writeln!(
            out,
            "  failures:        {} lookups, {} stores",
            s.lookup_failures, s.store_failures
        );
    }
    out
}

pub fn analyze(s: &AnalyzeSummary) -> String {
    let mut out = String::from("Analyze\n");
    let Some(results) = &s.results else {
        let _ = writeln!(out, "  no friction records; run evaluate first");
        return out;
    };
    let _ = writeln!(out, "  moves:           {}", results.total_moves);
    let _ = writeln!(out, "  blunders:        {}", results.total_blunders);
    let _ = writeln!(out, "  friction gaps:   {}", results.total_friction_gaps);
    let _ = writeln!(out, "  trigger rows:    {}", s.trigger_rows);
    let r = &results.correlation_no_time_pressure;
    let _ = writeln!(
        out,
        "  think/blunder r: {:.3} (p = {:.4}, n = {})",
        r.coefficient, r.p_value, r.n
    );
    let _ = writeln!(
        out,
        "  hypothesis:      {}",
        if results.hypothesis_supported() { "supported" } else { "not supported" }
    );
    if let Some(path) = &s.report_path {
        let _ = writeln!(out, "  report:          {}", path.display());
    }
    if let Some(path) = &s.csv_path {
        let _ = writeln!(out, "  data:            {}", path.display());
    }
    out
}

pub fn table_counts(c: &TableCounts, path: Option<&Path>) -> String {
    let mut out = String::new();
    match path {
        Some(p) => {
            let _ = writeln!(out, "Store {}", p.display());
        }
        None => out.push_str("Store (in memory)\n"),
    }
    let _ = writeln!(out, "  games:           {} ({} analyzed)", c.games, c.analyzed_games);
    let _ = writeln!(out, "  moves:           {}", c.moves);
    let _ = writeln!(out, "  evaluations:     {}", c.evaluations);
    let _ = writeln!(out, "  friction rows:   {}", c.friction_records);
    let _ = writeln!(out, "  blunders:        {}", c.blunders);
    let _ = writeln!(out, "  friction gaps:   {}", c.friction_gaps);
    let _ = writeln!(out, "  trigger rows:    {} ({} misses)", c.trigger_rows, c.trigger_misses);
    out
}

/// Non-fatal errors and the cancellation notice go to stderr.
pub fn report_errors<T: Default>(phase: &str, result: &PipelineResult<T>) {
    for e in &result.errors {
        eprintln!("{phase}: {}", e.coded_string());
    }
    if result.cancelled {
        eprintln!("{phase}: interrupted, partial results kept");
    }
}

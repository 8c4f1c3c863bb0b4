//! Pipeline phases.
//!
//! Each phase reads its inputs from the store, writes its outputs back, and
//! returns a `PipelineResult` carrying a summary plus the non-fatal errors
//! it collected. Phases are re-runnable: writes are keyed upserts and the
//! evaluate phase only picks up games without `analyzed_at`.
//!
//! The profile and domain runners are storeless: they read one export and
//! return a report.

pub mod analyze;
pub mod domain;
pub mod evaluate;
pub mod parse;
pub mod profile;
pub mod quick;
pub mod triggers;

use std::time::Instant;

pub use analyze::{run_analyze, AnalyzeSummary};
pub use domain::{run_assistments, run_ednet, run_qa, run_qa_career, run_quizbowl, run_wiki, CareerRun, DomainRun};
pub use evaluate::{run_evaluate, EvaluateSummary};
pub use parse::{run_parse, run_parse_reader, ParseSummary};
pub use profile::{run_levels, run_profile, LevelsRun, ProfileRun};
pub use quick::{quick_scan, quick_scan_reader, QuickScan};
pub use triggers::{run_triggers, TriggerPhaseSummary};

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

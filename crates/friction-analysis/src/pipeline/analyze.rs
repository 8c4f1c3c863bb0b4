//! Friction records to report and CSV export.

use std::path::{Path, PathBuf};
use std::time::Instant;

use friction_core::config::FrictionConfig;
use friction_core::errors::{PipelineError, PipelineResult};
use friction_core::tracing::metrics;
use friction_core::types::FrictionRecord;
use friction_storage::queries::{friction as friction_rows, triggers};
use friction_storage::DatabaseManager;
use serde::Serialize;

use crate::statistics::{render_report, AnalysisResults, AnalysisSettings, StatisticalAnalyzer};
use crate::triggers::{TriggerSummary, TriggerThresholds};

pub const REPORT_FILE: &str = "friction_report.md";
pub const CSV_FILE: &str = "friction_data.csv";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyzeSummary {
    pub records: usize,
    pub trigger_rows: usize,
    pub report_path: Option<PathBuf>,
    pub csv_path: Option<PathBuf>,
    /// `None` when there was nothing to analyze.
    pub results: Option<AnalysisResults>,
}

/// Run the statistics over every stored friction record and write the
/// report and CSV into `output_dir` (or `data.output_dir`).
pub fn run_analyze(
    db: &DatabaseManager,
    config: &FrictionConfig,
    output_dir: Option<&Path>,
) -> Result<PipelineResult<AnalyzeSummary>, PipelineError> {
    let start = Instant::now();
    let records = db.with_conn(friction_rows::query_all)?;
    let mut result = PipelineResult::new(AnalyzeSummary {
        records: records.len(),
        ..Default::default()
    });
    if records.is_empty() {
        tracing::warn!("no friction records; run the evaluate phase first");
        return Ok(result);
    }

    let trigger_summary = match db.with_conn(triggers::query_all) {
        Ok(rows) => {
            result.data.trigger_rows = rows.len();
            Some(TriggerSummary::from_rows(&rows, &TriggerThresholds::from(&config.triggers)))
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to load trigger rows, report omits them");
            result.add_error(e.into());
            None
        }
    };

    let analyzer = StatisticalAnalyzer::new(AnalysisSettings::from(&config.analysis));
    let results = analyzer.analyze(&records);
    let report = render_report(&results, trigger_summary.as_ref());

    let dir = output_dir.map_or_else(|| config.data.effective_output_dir(), Path::to_path_buf);
    std::fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;

    let report_path = dir.join(REPORT_FILE);
    std::fs::write(&report_path, report).map_err(|e| io_error(&report_path, e))?;
    tracing::info!(path = %report_path.display(), "report written");

    let csv_path = dir.join(CSV_FILE);
    write_csv(&csv_path, &records)?;
    tracing::info!(path = %csv_path.display(), rows = records.len(), "data exported");

    tracing::info!(
        { metrics::FRICTION_RECORDS } = records.len(),
        hypothesis_supported = results.hypothesis_supported(),
        { metrics::PHASE_DURATION_MS } = super::elapsed_ms(start),
        "analyze phase complete"
    );
    result.data.report_path = Some(report_path);
    result.data.csv_path = Some(csv_path);
    result.data.results = Some(results);
    Ok(result)
}

fn write_csv(path: &Path, records: &[FrictionRecord]) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| io_error(path, e))?;
    for record in records {
        writer.serialize(record).map_err(|e| io_error(path, e))?;
    }
    writer.flush().map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, e: impl std::fmt::Display) -> PipelineError {
    PipelineError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

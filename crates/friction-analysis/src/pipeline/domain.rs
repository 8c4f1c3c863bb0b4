//! File-fed runners for the cross-domain L2 analyses.
//!
//! Record files may be CSV (by `.csv` extension, optionally `.gz`/`.zst`
//! compressed) or NDJSON. Quiz-bowl games come as a single JSON array.

use std::path::Path;

use friction_core::config::FrictionConfig;
use friction_core::errors::{DomainError, PipelineError};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domains::input::{read_csv, read_ndjson, Loaded};
use crate::domains::qa::{self, CareerTrajectory, TagFirmwareMap, TagStat, UserAnswer};
use crate::domains::{assistments, ednet, quizbowl, wiki};
use crate::pgn::open_archive;

/// A report plus the row accounting of the file it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainRun<R> {
    pub report: R,
    pub rows_read: usize,
    pub rows_rejected: usize,
}

impl<R> DomainRun<R> {
    fn new<T>(report: R, loaded: &Loaded<T>) -> Self {
        Self {
            report,
            rows_read: loaded.records.len(),
            rows_rejected: loaded.rejected,
        }
    }
}

fn is_csv(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let name = name
        .strip_suffix(".zst")
        .or_else(|| name.strip_suffix(".gz"))
        .unwrap_or(&name);
    name.ends_with(".csv")
}

fn load<T: DeserializeOwned>(
    domain: &'static str,
    path: &Path,
    required: &[&'static str],
) -> Result<Loaded<T>, PipelineError> {
    let reader = open_archive(path)?;
    let loaded = if is_csv(path) {
        read_csv(reader, required)?
    } else {
        read_ndjson(reader)?
    };
    tracing::info!(
        domain,
        path = %path.display(),
        rows = loaded.records.len(),
        rejected = loaded.rejected,
        "loaded records"
    );
    if loaded.records.is_empty() {
        return Err(DomainError::InsufficientData {
            domain,
            message: format!("no usable records in {}", path.display()),
        }
        .into());
    }
    Ok(loaded)
}

pub fn run_ednet(config: &FrictionConfig, path: &Path) -> Result<DomainRun<ednet::EdnetReport>, PipelineError> {
    let loaded = load::<ednet::Response>("ednet", path, ednet::REQUIRED_COLUMNS)?;
    let report = ednet::analyze(
        &loaded.records,
        config.domains.effective_expert_accuracy(),
        config.domains.effective_min_learners(),
    );
    Ok(DomainRun::new(report, &loaded))
}

pub fn run_assistments(
    config: &FrictionConfig,
    path: &Path,
) -> Result<DomainRun<assistments::AssistmentsReport>, PipelineError> {
    let loaded = load::<assistments::Response>("assistments", path, assistments::REQUIRED_COLUMNS)?;
    let report = assistments::analyze(
        &loaded.records,
        config.domains.effective_expert_accuracy(),
        config.domains.effective_min_learners(),
    );
    Ok(DomainRun::new(report, &loaded))
}

pub fn run_quizbowl(
    config: &FrictionConfig,
    path: &Path,
) -> Result<DomainRun<quizbowl::QuizbowlReport>, PipelineError> {
    let games = quizbowl::read_games(open_archive(path)?)?;
    tracing::info!(path = %path.display(), games = games.len(), "loaded quiz bowl games");
    if games.is_empty() {
        return Err(DomainError::InsufficientData {
            domain: "quizbowl",
            message: format!("no games in {}", path.display()),
        }
        .into());
    }
    let report = quizbowl::analyze(
        &games,
        config.domains.effective_buzz_expert_accuracy(),
        config.domains.effective_min_players(),
    );
    Ok(DomainRun {
        report,
        rows_read: games.len(),
        rows_rejected: 0,
    })
}

pub fn run_qa(path: &Path) -> Result<DomainRun<qa::QaReport>, PipelineError> {
    let loaded = load::<qa::Answer>("qa", path, qa::friction::REQUIRED_COLUMNS)?;
    Ok(DomainRun::new(qa::analyze(&loaded.records), &loaded))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareerRun {
    pub trajectory: CareerTrajectory,
    pub tags: Option<TagFirmwareMap>,
}

impl CareerRun {
    pub fn to_text(&self) -> String {
        let mut out = self.trajectory.to_text();
        if let Some(tags) = &self.tags {
            out.push('\n');
            out.push_str(&tags.to_text());
        }
        out
    }
}

/// Career trajectory from an answer history, with the tag firmware map when
/// per-tag totals are given.
pub fn run_qa_career(name: &str, answers: &Path, tags: Option<&Path>) -> Result<DomainRun<CareerRun>, PipelineError> {
    let loaded = load::<UserAnswer>("qa", answers, &["creation_date"])?;
    let trajectory = qa::career_trajectory(name, &loaded.records).ok_or_else(|| DomainError::InsufficientData {
        domain: "qa",
        message: format!("no answers for {name}"),
    })?;
    let tags = match tags {
        Some(path) => {
            let stats = load::<TagStat>("qa", path, &["tag_name", "answer_count", "answer_score"])?;
            Some(qa::tag_firmware(name, &stats.records))
        }
        None => None,
    };
    Ok(DomainRun::new(CareerRun { trajectory, tags }, &loaded))
}

pub fn run_wiki(path: &Path) -> Result<DomainRun<wiki::WikiReport>, PipelineError> {
    let loaded = load::<wiki::Revision>("wiki", path, &["timestamp"])?;
    Ok(DomainRun::new(wiki::analyze(&loaded.records), &loaded))
}

//! How one answerer's firmware develops over a career.

use chrono::DateTime;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::domains::input::flag;
use crate::domains::share;
use crate::statistics::descriptive::mean;

const PHASES: [&str; 4] = ["early", "growing", "established", "expert"];
const TOP_TAGS: usize = 10;
const TAG_MAP_SIZE: usize = 20;

/// One answer from a user's history.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserAnswer {
    #[serde(default)]
    pub answer_id: Option<u64>,
    #[serde(default)]
    pub question_id: Option<u64>,
    /// Unix seconds.
    pub creation_date: i64,
    #[serde(default)]
    pub score: i64,
    #[serde(default, deserialize_with = "flag")]
    pub is_accepted: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareerPhase {
    pub phase: &'static str,
    pub answers: usize,
    pub acceptance_rate: f64,
    pub mean_score: f64,
    /// Distinct tags answered in; breadth of firmware.
    pub unique_tags: usize,
    pub first_month: String,
    pub last_month: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareerTrajectory {
    pub name: String,
    pub answers: usize,
    pub span_days: i64,
    pub phases: Vec<CareerPhase>,
    pub early_top_tags: Vec<(String, usize)>,
    pub late_top_tags: Vec<(String, usize)>,
    pub acceptance_rate: f64,
    pub mean_score: f64,
}

fn month(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0).map_or_else(|| "?".to_string(), |d| d.format("%Y-%m").to_string())
}

fn top_tags(answers: &[&UserAnswer]) -> Vec<(String, usize)> {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for tag in answers.iter().flat_map(|a| &a.tags) {
        *counts.entry(tag.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().map(|(t, n)| (t.to_string(), n)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(TOP_TAGS);
    ranked
}

/// Split the history, oldest first, into four equal phases. `None` for an
/// empty history.
pub fn career_trajectory(name: &str, answers: &[UserAnswer]) -> Option<CareerTrajectory> {
    if answers.is_empty() {
        return None;
    }
    let mut ordered: Vec<&UserAnswer> = answers.iter().collect();
    ordered.sort_by_key(|a| a.creation_date);
    let n = ordered.len();

    let mut by_phase: [Vec<&UserAnswer>; 4] = Default::default();
    for (i, &a) in ordered.iter().enumerate() {
        by_phase[(i * 4 / n).min(3)].push(a);
    }

    let phases = PHASES
        .into_iter()
        .zip(&by_phase)
        .filter(|(_, rows)| !rows.is_empty())
        .map(|(phase, rows)| {
            let scores: Vec<f64> = rows.iter().map(|a| a.score as f64).collect();
            let tags: FxHashSet<&str> = rows.iter().flat_map(|a| &a.tags).map(String::as_str).collect();
            CareerPhase {
                phase,
                answers: rows.len(),
                acceptance_rate: share(rows, |a| a.is_accepted).unwrap_or(0.0),
                mean_score: mean(&scores).unwrap_or(0.0),
                unique_tags: tags.len(),
                first_month: month(rows[0].creation_date),
                last_month: month(rows[rows.len() - 1].creation_date),
            }
        })
        .collect();

    let scores: Vec<f64> = ordered.iter().map(|a| a.score as f64).collect();
    Some(CareerTrajectory {
        name: name.to_string(),
        answers: n,
        span_days: (ordered[n - 1].creation_date - ordered[0].creation_date) / 86_400,
        phases,
        early_top_tags: top_tags(&by_phase[0]),
        late_top_tags: top_tags(&by_phase[3]),
        acceptance_rate: share(&ordered, |a| a.is_accepted).unwrap_or(0.0),
        mean_score: mean(&scores).unwrap_or(0.0),
    })
}

impl CareerTrajectory {
    pub fn to_text(&self) -> String {
        let mut out = format!("Career trajectory: {}\n\n", self.name);
        out.push_str(&format!(
            "  Answers:          {} over {} days ({} years)\n",
            self.answers,
            self.span_days,
            self.span_days / 365
        ));
        out.push_str(&format!(
            "  Accepted {:.1}%, mean score {:.2}\n\n",
            100.0 * self.acceptance_rate,
            self.mean_score
        ));
        out.push_str("  Phase         Answers  Accept%   Score  Tags  Months\n");
        for p in &self.phases {
            out.push_str(&format!(
                "  {:<12} {:>8} {:>7.1}% {:>7.2} {:>5}  {} to {}\n",
                p.phase,
                p.answers,
                100.0 * p.acceptance_rate,
                p.mean_score,
                p.unique_tags,
                p.first_month,
                p.last_month
            ));
        }
        let names = |tags: &[(String, usize)]| {
            tags.iter().take(5).map(|(t, _)| t.as_str()).collect::<Vec<_>>().join(", ")
        };
        out.push_str(&format!("\n  Early top tags:   {}\n", names(&self.early_top_tags)));
        out.push_str(&format!("  Expert top tags:  {}\n", names(&self.late_top_tags)));
        out
    }
}

/// Per-tag totals for one answerer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TagStat {
    pub tag_name: String,
    #[serde(default)]
    pub answer_count: u64,
    #[serde(default)]
    pub answer_score: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FirmwareStatus {
    Firmware,
    Partial,
    Learning,
}

impl FirmwareStatus {
    fn of(answers: u64, avg_score: f64) -> Self {
        if avg_score > 5.0 && answers > 100 {
            Self::Firmware
        } else if avg_score > 2.0 && answers > 20 {
            Self::Partial
        } else {
            Self::Learning
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Firmware => "firmware",
            Self::Partial => "partial",
            Self::Learning => "learning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagFirmware {
    pub tag: String,
    pub answers: u64,
    pub total_score: i64,
    pub avg_score: f64,
    pub status: FirmwareStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagFirmwareMap {
    pub name: String,
    pub tags_analyzed: usize,
    pub firmware: usize,
    pub partial: usize,
    pub learning: usize,
    /// Most answered first.
    pub top_tags: Vec<TagFirmware>,
}

pub fn tag_firmware(name: &str, stats: &[TagStat]) -> TagFirmwareMap {
    let mut tags: Vec<TagFirmware> = stats
        .iter()
        .filter(|s| s.answer_count > 0)
        .map(|s| {
            let avg_score = s.answer_score as f64 / s.answer_count as f64;
            TagFirmware {
                tag: s.tag_name.clone(),
                answers: s.answer_count,
                total_score: s.answer_score,
                avg_score,
                status: FirmwareStatus::of(s.answer_count, avg_score),
            }
        })
        .collect();
    tags.sort_by(|a, b| b.answers.cmp(&a.answers).then_with(|| a.tag.cmp(&b.tag)));
    let count = |status: FirmwareStatus| tags.iter().filter(|t| t.status == status).count();
    let map = TagFirmwareMap {
        name: name.to_string(),
        tags_analyzed: tags.len(),
        firmware: count(FirmwareStatus::Firmware),
        partial: count(FirmwareStatus::Partial),
        learning: count(FirmwareStatus::Learning),
        top_tags: Vec::new(),
    };
    tags.truncate(TAG_MAP_SIZE);
    TagFirmwareMap { top_tags: tags, ..map }
}

impl TagFirmwareMap {
    pub fn coverage(&self) -> f64 {
        if self.tags_analyzed == 0 {
            0.0
        } else {
            self.firmware as f64 / self.tags_analyzed as f64
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = format!("Firmware map: {}\n\n", self.name);
        out.push_str(&format!(
            "  Tags analyzed:    {} ({} firmware, {} partial, {} learning)\n",
            self.tags_analyzed, self.firmware, self.partial, self.learning
        ));
        out.push_str(&format!("  Coverage:         {:.0}%\n\n", 100.0 * self.coverage()));
        for t in &self.top_tags {
            out.push_str(&format!(
                "  {:<25} {:>8} {:>10} {:>8.2} {}\n",
                t.tag,
                t.answers,
                t.total_score,
                t.avg_score,
                t.status.as_str()
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400;
    // 2020-01-01T00:00:00Z
    const START: i64 = 1_577_836_800;

    fn answer(day: i64, score: i64, accepted: bool, tags: &[&str]) -> UserAnswer {
        UserAnswer {
            answer_id: None,
            question_id: None,
            creation_date: START + day * DAY,
            score,
            is_accepted: accepted,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn phases_follow_creation_order() {
        // Given newest first, as exports list them.
        let mut history: Vec<UserAnswer> = (0..8)
            .map(|i| {
                let late = i >= 4;
                let tags: &[&str] = if late { &["rust", "async"] } else { &["java"] };
                answer(i * 100, if late { 10 } else { 1 }, late, tags)
            })
            .collect();
        history.reverse();

        let career = career_trajectory("someone", &history).unwrap();
        assert_eq!(career.answers, 8);
        assert_eq!(career.span_days, 700);
        let phases: Vec<&str> = career.phases.iter().map(|p| p.phase).collect();
        assert_eq!(phases, ["early", "growing", "established", "expert"]);
        assert_eq!(career.phases[0].acceptance_rate, 0.0);
        assert_eq!(career.phases[3].acceptance_rate, 1.0);
        assert_eq!(career.phases[3].unique_tags, 2);
        assert_eq!(career.phases[0].first_month, "2020-01");
        assert_eq!(career.early_top_tags, vec![("java".to_string(), 2)]);
        assert_eq!(career.late_top_tags[0], ("async".to_string(), 2));
        assert_eq!(career.acceptance_rate, 0.5);
        assert!(career.to_text().contains("Expert top tags:  async, rust"));
    }

    #[test]
    fn empty_history_has_no_trajectory() {
        assert_eq!(career_trajectory("nobody", &[]), None);
    }

    #[test]
    fn tag_status_needs_volume_and_quality() {
        let stat = |tag: &str, answer_count, answer_score| TagStat {
            tag_name: tag.to_string(),
            answer_count,
            answer_score,
        };
        let map = tag_firmware(
            "someone",
            &[
                stat("java", 500, 4_000),
                stat("pandas", 50, 150),
                stat("numpy", 30, 30),
                stat("empty", 0, 0),
            ],
        );
        assert_eq!(map.tags_analyzed, 3);
        assert_eq!((map.firmware, map.partial, map.learning), (1, 1, 1));
        assert_eq!(map.top_tags[0].tag, "java");
        assert_eq!(map.top_tags[0].status, FirmwareStatus::Firmware);
        assert_eq!(map.top_tags[1].status, FirmwareStatus::Partial);
        assert!((map.coverage() - 1.0 / 3.0).abs() < 1e-12);
    }
}

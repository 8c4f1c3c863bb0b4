//! EdNet (TOEIC practice) L2 metric.
//!
//! Part 2 questions are answered by pattern recognition; Part 7 reading
//! comprehension cannot be. The L2 trigger is how much slower a learner is
//! on Part 7 than on Part 2: experts know to slow down there.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::input::flag;
use super::{median_or_zero, share, ExpertSplit};
use crate::statistics::descriptive::{mean, Summary};

pub const REQUIRED_COLUMNS: &[&str] = &["user_id", "part", "elapsed_time_sec", "correct"];

const RESPONSE_RANGE: std::ops::RangeInclusive<f64> = 0.5..=300.0;
const FIRMWARE_PART: u8 = 2;
const CEILING_PART: u8 = 7;
const MIN_PER_PART: usize = 5;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Response {
    pub user_id: String,
    pub part: u8,
    pub elapsed_time_sec: f64,
    #[serde(deserialize_with = "flag")]
    pub correct: bool,
}

pub fn part_name(part: u8) -> &'static str {
    match part {
        1 => "photos",
        2 => "question-response",
        3 => "conversations",
        4 => "talks",
        5 => "incomplete sentences",
        6 => "text completion",
        7 => "reading comprehension",
        _ => "unknown",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LearnerCategory {
    Expert,
    Developing,
    Intermediate,
    Novice,
}

impl LearnerCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expert => "expert",
            Self::Developing => "developing",
            Self::Intermediate => "intermediate",
            Self::Novice => "novice",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearnerL2 {
    pub user_id: String,
    /// Part 7 median over Part 2 median.
    pub l2_trigger: f64,
    pub p2_median: f64,
    pub p7_median: f64,
    pub p2_accuracy: f64,
    pub p7_accuracy: f64,
    pub overall_accuracy: f64,
    pub overall_median: f64,
    /// Per-part median over the learner's overall median.
    pub part_ratios: BTreeMap<u8, f64>,
    pub responses: usize,
    pub category: LearnerCategory,
}

fn classify(l2: f64, p7_accuracy: f64) -> LearnerCategory {
    if l2 >= 1.5 && p7_accuracy >= 0.7 {
        LearnerCategory::Expert
    } else if l2 >= 1.3 {
        LearnerCategory::Developing
    } else if l2 >= 1.0 {
        LearnerCategory::Intermediate
    } else {
        LearnerCategory::Novice
    }
}

/// `None` unless the learner has at least five Part 2 and five Part 7
/// responses.
pub fn learner_l2(user_id: &str, responses: &[&Response]) -> Option<LearnerL2> {
    let times_for = |part: u8| -> Vec<f64> {
        responses.iter().filter(|r| r.part == part).map(|r| r.elapsed_time_sec).collect()
    };
    let accuracy_for = |part: u8| {
        let hits: Vec<f64> = responses
            .iter()
            .filter(|r| r.part == part)
            .map(|r| f64::from(u8::from(r.correct)))
            .collect();
        mean(&hits).unwrap_or(0.0)
    };
    let p2 = times_for(FIRMWARE_PART);
    let p7 = times_for(CEILING_PART);
    if p2.len() < MIN_PER_PART || p7.len() < MIN_PER_PART {
        return None;
    }

    let p2_median = median_or_zero(&p2);
    let p7_median = median_or_zero(&p7);
    let l2_trigger = if p2_median > 0.0 { p7_median / p2_median } else { 0.0 };

    let all: Vec<f64> = responses.iter().map(|r| r.elapsed_time_sec).collect();
    let overall_median = median_or_zero(&all);
    let mut by_part: BTreeMap<u8, Vec<f64>> = BTreeMap::new();
    for r in responses {
        by_part.entry(r.part).or_default().push(r.elapsed_time_sec);
    }
    let part_ratios = by_part
        .into_iter()
        .filter(|_| overall_median > 0.0)
        .map(|(part, times)| (part, median_or_zero(&times) / overall_median))
        .collect();

    let p7_accuracy = accuracy_for(CEILING_PART);
    Some(LearnerL2 {
        user_id: user_id.to_string(),
        l2_trigger,
        p2_median,
        p7_median,
        p2_accuracy: accuracy_for(FIRMWARE_PART),
        p7_accuracy,
        overall_accuracy: share(responses, |r| r.correct).unwrap_or(0.0),
        overall_median,
        part_ratios,
        responses: responses.len(),
        category: classify(l2_trigger, p7_accuracy),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartStats {
    pub part: u8,
    pub time: Summary,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdnetReport {
    pub responses: usize,
    /// Responses outside 0.5 to 300 seconds.
    pub out_of_range: usize,
    pub users: usize,
    pub parts: Vec<PartStats>,
    pub learners: Vec<LearnerL2>,
    /// `None` below the configured learner count.
    pub split: Option<ExpertSplit>,
}

pub fn analyze(responses: &[Response], expert_accuracy: f64, min_learners: usize) -> EdnetReport {
    let valid: Vec<&Response> = responses
        .iter()
        .filter(|r| RESPONSE_RANGE.contains(&r.elapsed_time_sec))
        .collect();

    let mut by_part: BTreeMap<u8, Vec<&Response>> = BTreeMap::new();
    let mut by_user: FxHashMap<&str, Vec<&Response>> = FxHashMap::default();
    for &r in &valid {
        by_part.entry(r.part).or_default().push(r);
        by_user.entry(r.user_id.as_str()).or_default().push(r);
    }

    let parts = by_part
        .into_iter()
        .filter_map(|(part, rs)| {
            let times: Vec<f64> = rs.iter().map(|r| r.elapsed_time_sec).collect();
            Some(PartStats {
                part,
                time: Summary::of(&times)?,
                accuracy: share(&rs, |r| r.correct)?,
            })
        })
        .collect();

    let users = by_user.len();
    let mut learners: Vec<LearnerL2> = by_user
        .into_iter()
        .filter_map(|(user, rs)| learner_l2(user, &rs))
        .collect();
    learners.sort_by(|a, b| a.user_id.cmp(&b.user_id));

    let split = (learners.len() >= min_learners).then(|| {
        let scores: Vec<f64> = learners.iter().map(|l| l.l2_trigger).collect();
        let accuracies: Vec<f64> = learners.iter().map(|l| l.overall_accuracy).collect();
        ExpertSplit::compute(&scores, &accuracies, expert_accuracy)
    });

    EdnetReport {
        responses: valid.len(),
        out_of_range: responses.len() - valid.len(),
        users,
        parts,
        learners,
        split,
    }
}

impl EdnetReport {
    pub fn to_text(&self) -> String {
        let mut out = String::from("EdNet L2 (Part 7 / Part 2 response time)\n\n");
        out.push_str(&format!(
            "  Responses:        {} from {} users ({} out of range)\n",
            self.responses, self.users, self.out_of_range
        ));
        for p in &self.parts {
            out.push_str(&format!(
                "  Part {} ({}): median {:.1}s, accuracy {:.1}%\n",
                p.part,
                part_name(p.part),
                p.time.median,
                100.0 * p.accuracy
            ));
        }
        out.push_str(&format!("  Learners with L2: {}\n", self.learners.len()));
        for category in [
            LearnerCategory::Expert,
            LearnerCategory::Developing,
            LearnerCategory::Intermediate,
            LearnerCategory::Novice,
        ] {
            let n = self.learners.iter().filter(|l| l.category == category).count();
            out.push_str(&format!("    {}: {n}\n", category.as_str()));
        }
        match &self.split {
            Some(split) => split.write_text(&mut out, "L2 trigger"),
            None => out.push_str("  Expert split:     too few learners\n"),
        }
        out
    }
}

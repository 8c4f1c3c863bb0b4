//! ASSISTments L2 metric.
//!
//! Skill practice problems have no fixed firmware/ceiling split, so the
//! signal is skill-specific timing: a learner with L2 is quick on what they
//! have mastered and slows down on problems they then get wrong. The signal
//! is often weak or inverted here; the report says so rather than hiding it.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::input::flag;
use super::{median_or_zero, share, ExpertSplit};
use crate::statistics::descriptive::{mean, percentile};

pub const REQUIRED_COLUMNS: &[&str] = &["user_id", "skill_id", "ms_first_response", "correct"];

const RESPONSE_RANGE: std::ops::RangeInclusive<f64> = 0.5..=300.0;
const MIN_RESPONSES: usize = 20;
const MIN_MASTERY_RESPONSES: usize = 30;
const MIN_PER_OUTCOME: usize = 6;
const SPEEDUP_CUT: f64 = 1.2;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Response {
    pub user_id: String,
    pub skill_id: Option<String>,
    pub ms_first_response: f64,
    #[serde(deserialize_with = "flag")]
    pub correct: bool,
    #[serde(default)]
    pub order_id: Option<u64>,
    #[serde(default)]
    pub opportunity: Option<u32>,
}

impl Response {
    pub fn seconds(&self) -> f64 {
        self.ms_first_response / 1000.0
    }

    fn skill(&self) -> &str {
        self.skill_id.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingCategory {
    StrongL2,
    DevelopingL2,
    Uniform,
    Mixed,
}

impl TimingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrongL2 => "strong_l2",
            Self::DevelopingL2 => "developing_l2",
            Self::Uniform => "uniform",
            Self::Mixed => "mixed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearnerTiming {
    pub user_id: String,
    /// Median time on missed problems over median time on solved ones;
    /// 1.0 when either side has fewer than six responses.
    pub l2_trigger: f64,
    /// p90 over p10.
    pub bimodal: f64,
    pub coefficient_of_variation: f64,
    /// Mean of the three slowest skill medians over the three fastest;
    /// 0 with fewer than three skills.
    pub skill_range: f64,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
    pub accuracy: f64,
    pub responses: usize,
    pub skills: usize,
    pub category: TimingCategory,
    pub mastery: Option<MasteryProgress>,
}

/// Whether a learner speeds up on skills with practice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasteryProgress {
    /// Median over skills of early-attempt median time / late-attempt median.
    pub learning_speedup: f64,
    /// Population standard deviation of the per-skill speedups.
    pub speedup_spread: f64,
    pub skills_analyzed: usize,
    pub skills_with_speedup: usize,
}

fn classify(bimodal: f64, l2: f64, accuracy: f64) -> TimingCategory {
    if bimodal >= 5.0 && l2 >= 1.2 && accuracy >= 0.7 {
        TimingCategory::StrongL2
    } else if bimodal >= 3.0 && l2 >= 1.1 {
        TimingCategory::DevelopingL2
    } else if bimodal < 2.0 {
        TimingCategory::Uniform
    } else {
        TimingCategory::Mixed
    }
}

fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    Some((values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt())
}

fn group_by_skill<'a>(responses: &[&'a Response]) -> Vec<(&'a str, Vec<&'a Response>)> {
    let mut by_skill: FxHashMap<&str, Vec<&Response>> = FxHashMap::default();
    for &r in responses {
        by_skill.entry(r.skill()).or_default().push(r);
    }
    let mut skills: Vec<_> = by_skill.into_iter().collect();
    skills.sort_by(|a, b| a.0.cmp(b.0));
    skills
}

/// `None` below 30 responses or three skills with at least three attempts.
/// Attempts are ordered by `opportunity`, then `order_id`, then file order.
pub fn mastery_progress(responses: &[&Response]) -> Option<MasteryProgress> {
    if responses.len() < MIN_MASTERY_RESPONSES {
        return None;
    }
    let speedups: Vec<f64> = group_by_skill(responses)
        .into_iter()
        .filter(|(_, attempts)| attempts.len() >= 3)
        .map(|(_, mut attempts)| {
            attempts.sort_by_key(|r| (r.opportunity, r.order_id));
            let times: Vec<f64> = attempts.iter().map(|r| r.seconds()).collect();
            let third = times.len() / 3;
            let early = median_or_zero(&times[..third]);
            let late = median_or_zero(&times[times.len() - third..]);
            if late > 0.0 {
                early / late
            } else {
                1.0
            }
        })
        .collect();
    if speedups.len() < 3 {
        return None;
    }
    Some(MasteryProgress {
        learning_speedup: median_or_zero(&speedups),
        speedup_spread: population_std(&speedups).unwrap_or(0.0),
        skills_analyzed: speedups.len(),
        skills_with_speedup: speedups.iter().filter(|s| **s > SPEEDUP_CUT).count(),
    })
}

/// `None` below 20 responses.
pub fn learner_timing(user_id: &str, responses: &[&Response]) -> Option<LearnerTiming> {
    if responses.len() < MIN_RESPONSES {
        return None;
    }
    let times: Vec<f64> = responses.iter().map(|r| r.seconds()).collect();
    let pct = |p: f64| percentile(&times, p).unwrap_or(0.0);
    let (p10, p50, p90) = (pct(10.0), pct(50.0), pct(90.0));
    let bimodal = if p10 > 0.0 { p90 / p10 } else { 0.0 };
    let m = mean(&times).unwrap_or(0.0);
    let coefficient_of_variation = if m > 0.0 {
        population_std(&times).unwrap_or(0.0) / m
    } else {
        0.0
    };

    let skills = group_by_skill(responses);
    let mut skill_medians: Vec<f64> = skills
        .iter()
        .map(|(_, rs)| median_or_zero(&rs.iter().map(|r| r.seconds()).collect::<Vec<_>>()))
        .collect();
    skill_medians.sort_by(f64::total_cmp);
    let skill_range = if skill_medians.len() >= 3 {
        let fastest = mean(&skill_medians[..3]).unwrap_or(0.0);
        let slowest = mean(&skill_medians[skill_medians.len() - 3..]).unwrap_or(0.0);
        if fastest > 0.0 {
            slowest / fastest
        } else {
            0.0
        }
    } else {
        0.0
    };

    let (solved, missed): (Vec<&&Response>, Vec<&&Response>) = responses.iter().partition(|r| r.correct);
    let l2_trigger = if solved.len() >= MIN_PER_OUTCOME && missed.len() >= MIN_PER_OUTCOME {
        let med = |rs: &[&&Response]| median_or_zero(&rs.iter().map(|r| r.seconds()).collect::<Vec<_>>());
        let solved_median = med(&solved);
        if solved_median > 0.0 {
            med(&missed) / solved_median
        } else {
            1.0
        }
    } else {
        1.0
    };

    let accuracy = share(responses, |r| r.correct).unwrap_or(0.0);
    Some(LearnerTiming {
        user_id: user_id.to_string(),
        l2_trigger,
        bimodal,
        coefficient_of_variation,
        skill_range,
        p10,
        p50,
        p90,
        accuracy,
        responses: responses.len(),
        skills: skills.len(),
        category: classify(bimodal, l2_trigger, accuracy),
        mastery: mastery_progress(responses),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistmentsReport {
    pub responses: usize,
    pub out_of_range: usize,
    pub users: usize,
    pub skills: usize,
    pub learners: Vec<LearnerTiming>,
    /// Bimodal index as the expert predictor.
    pub bimodal_split: Option<ExpertSplit>,
    /// Missed/solved time ratio as the expert predictor.
    pub trigger_split: Option<ExpertSplit>,
}

pub fn analyze(responses: &[Response], expert_accuracy: f64, min_learners: usize) -> AssistmentsReport {
    let valid: Vec<&Response> = responses
        .iter()
        .filter(|r| RESPONSE_RANGE.contains(&r.seconds()))
        .collect();

    let mut by_user: FxHashMap<&str, Vec<&Response>> = FxHashMap::default();
    for &r in &valid {
        by_user.entry(r.user_id.as_str()).or_default().push(r);
    }
    let users = by_user.len();
    let skills = group_by_skill(&valid).len();

    let mut learners: Vec<LearnerTiming> = by_user
        .into_iter()
        .filter_map(|(user, rs)| learner_timing(user, &rs))
        .collect();
    learners.sort_by(|a, b| a.user_id.cmp(&b.user_id));

    let enough = learners.len() >= min_learners;
    let accuracies: Vec<f64> = learners.iter().map(|l| l.accuracy).collect();
    let split_on = |score: fn(&LearnerTiming) -> f64| {
        let scores: Vec<f64> = learners.iter().map(score).collect();
        ExpertSplit::compute(&scores, &accuracies, expert_accuracy)
    };
    let bimodal_split = enough.then(|| split_on(|l| l.bimodal));
    let trigger_split = enough.then(|| split_on(|l| l.l2_trigger));

    AssistmentsReport {
        responses: valid.len(),
        out_of_range: responses.len() - valid.len(),
        users,
        skills,
        learners,
        bimodal_split,
        trigger_split,
    }
}

impl AssistmentsReport {
    pub fn to_text(&self) -> String {
        let mut out = String::from("ASSISTments L2 (skill-specific timing)\n\n");
        out.push_str(&format!(
            "  Responses:        {} from {} users over {} skills ({} out of range)\n",
            self.responses, self.users, self.skills, self.out_of_range
        ));
        out.push_str(&format!("  Learners with L2: {}\n", self.learners.len()));
        for category in [
            TimingCategory::StrongL2,
            TimingCategory::DevelopingL2,
            TimingCategory::Mixed,
            TimingCategory::Uniform,
        ] {
            let n = self.learners.iter().filter(|l| l.category == category).count();
            out.push_str(&format!("    {}: {n}\n", category.as_str()));
        }
        match (&self.bimodal_split, &self.trigger_split) {
            (Some(bimodal), Some(trigger)) => {
                bimodal.write_text(&mut out, "bimodal index");
                trigger.write_text(&mut out, "L2 trigger");
                out.push_str("  Uniform problem difficulty and hints weaken the signal here.\n");
            }
            _ => out.push_str("  Expert split:     too few learners\n"),
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(user: &str, skill: &str, ms: f64, correct: bool, opportunity: u32) -> Response {
        Response {
            user_id: user.to_string(),
            skill_id: Some(skill.to_string()),
            ms_first_response: ms,
            correct,
            order_id: None,
            opportunity: Some(opportunity),
        }
    }

    /// Ten fast solves and ten slow misses over four skills.
    fn deliberate_learner(user: &str) -> Vec<Response> {
        let mut rs = Vec::new();
        for i in 0..10u32 {
            rs.push(response(user, ["a", "b"][i as usize % 2], 2_000.0 + f64::from(i) * 100.0, true, i));
            rs.push(response(user, ["c", "d"][i as usize % 2], 20_000.0 + f64::from(i) * 1_000.0, false, i));
        }
        rs
    }

    #[test]
    fn slow_misses_raise_the_trigger() {
        let rs = deliberate_learner("u1");
        let refs: Vec<&Response> = rs.iter().collect();
        let t = learner_timing("u1", &refs).unwrap();
        assert_eq!(t.responses, 20);
        assert_eq!(t.skills, 4);
        assert!(t.l2_trigger > 8.0);
        assert!(t.bimodal > 5.0);
        assert!(t.skill_range > 1.5);
        assert_eq!(t.accuracy, 0.5);
        // Low accuracy keeps a bimodal learner out of the strong group.
        assert_eq!(t.category, TimingCategory::DevelopingL2);
        assert_eq!(t.mastery, None);
    }

    #[test]
    fn one_speed_is_uniform() {
        let rs: Vec<Response> = (0..20).map(|i| response("u2", "a", 5_000.0, i % 2 == 0, i)).collect();
        let refs: Vec<&Response> = rs.iter().collect();
        let t = learner_timing("u2", &refs).unwrap();
        assert_eq!(t.bimodal, 1.0);
        assert_eq!(t.coefficient_of_variation, 0.0);
        assert_eq!(t.skill_range, 0.0);
        assert_eq!(t.category, TimingCategory::Uniform);
    }

    #[test]
    fn practice_speedup_is_measured_per_skill() {
        // Three skills, twelve attempts each, getting twice as fast.
        let mut rs = Vec::new();
        for skill in ["a", "b", "c"] {
            for i in 0..12u32 {
                let ms = if i < 4 { 8_000.0 } else if i < 8 { 6_000.0 } else { 4_000.0 };
                rs.push(response("u3", skill, ms, true, i));
            }
        }
        // File order runs backwards; sorting by opportunity must undo that.
        rs.reverse();
        let refs: Vec<&Response> = rs.iter().collect();
        let m = mastery_progress(&refs).unwrap();
        assert_eq!(m.skills_analyzed, 3);
        assert_eq!(m.learning_speedup, 2.0);
        assert_eq!(m.speedup_spread, 0.0);
        assert_eq!(m.skills_with_speedup, 3);
    }

    #[test]
    fn short_histories_are_skipped() {
        let rs: Vec<Response> = (0..19).map(|i| response("u4", "a", 5_000.0, true, i)).collect();
        let report = analyze(&rs, 0.75, 1);
        assert_eq!(report.users, 1);
        assert!(report.learners.is_empty());
        assert!(report.to_text().contains("too few learners"));
    }
}

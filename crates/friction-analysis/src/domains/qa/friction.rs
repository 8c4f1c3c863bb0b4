//! Answer speed against answer quality.

use serde::{Deserialize, Serialize};

use crate::domains::input::flag;
use crate::domains::{median_or_zero, share};
use crate::statistics::descriptive::{mean, percentile};
use crate::statistics::{point_biserial, CorrelationResult};

pub const REQUIRED_COLUMNS: &[&str] = &[
    "response_time_seconds",
    "score",
    "is_accepted",
    "question_complexity",
    "owner_reputation",
];

const MAX_RESPONSE_SECONDS: f64 = 7.0 * 86_400.0;
const FAST: f64 = 0.7;
const SLOW: f64 = 1.5;
const COMPLEX: f64 = 0.5;
const SIMPLE: f64 = 0.3;
const MIN_GROUP: usize = 20;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Answer {
    #[serde(default)]
    pub answer_id: Option<u64>,
    #[serde(default)]
    pub question_id: Option<u64>,
    /// Seconds from question to answer.
    pub response_time_seconds: f64,
    pub score: i64,
    #[serde(deserialize_with = "flag")]
    pub is_accepted: bool,
    /// Question complexity in [0, 1].
    pub question_complexity: f64,
    pub owner_reputation: f64,
    #[serde(default)]
    pub question_owner_reputation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedLevel {
    Fast,
    Normal,
    Slow,
}

/// One answer with its response time normalized to the sample median.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerFriction {
    pub response_time_seconds: f64,
    pub normalized: f64,
    pub level: SpeedLevel,
    pub complexity: f64,
    pub reputation: f64,
    pub asker_reputation: f64,
    pub accepted: bool,
    /// Negative score.
    pub downvoted: bool,
    /// Score at most zero and not accepted.
    pub low_quality: bool,
    /// Complex question answered no slower than usual.
    pub friction_gap: bool,
    pub positive: bool,
}

/// Answers with a response time in (0, 7 days], normalized by the median.
pub fn friction_records(answers: &[Answer]) -> Vec<AnswerFriction> {
    let valid: Vec<&Answer> = answers
        .iter()
        .filter(|a| a.response_time_seconds > 0.0 && a.response_time_seconds < MAX_RESPONSE_SECONDS)
        .collect();
    let times: Vec<f64> = valid.iter().map(|a| a.response_time_seconds).collect();
    let median = median_or_zero(&times);
    if median <= 0.0 {
        return Vec::new();
    }
    valid
        .into_iter()
        .map(|a| {
            let normalized = a.response_time_seconds / median;
            let level = if normalized <= 0.5 {
                SpeedLevel::Fast
            } else if normalized <= SLOW {
                SpeedLevel::Normal
            } else {
                SpeedLevel::Slow
            };
            AnswerFriction {
                response_time_seconds: a.response_time_seconds,
                normalized,
                level,
                complexity: a.question_complexity,
                reputation: a.owner_reputation,
                asker_reputation: a.question_owner_reputation,
                accepted: a.is_accepted,
                downvoted: a.score < 0,
                low_quality: a.score <= 0 && !a.is_accepted,
                friction_gap: a.question_complexity > COMPLEX && normalized <= 1.0,
                positive: a.score >= 1,
            }
        })
        .collect()
}

fn pick<'a>(rows: &[&'a AnswerFriction], keep: impl Fn(&AnswerFriction) -> bool) -> Vec<&'a AnswerFriction> {
    rows.iter().copied().filter(|r| keep(*r)).collect()
}

fn low_quality_rate(rows: &[&AnswerFriction]) -> f64 {
    share(rows, |r| r.low_quality).unwrap_or(0.0)
}

fn mean_hours(rows: &[&AnswerFriction]) -> f64 {
    let times: Vec<f64> = rows.iter().map(|r| r.response_time_seconds / 3600.0).collect();
    mean(&times).unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuartileCorrelation {
    pub quartile: &'static str,
    pub correlation: CorrelationResult,
    pub low_quality_rate: f64,
    pub mean_response_hours: f64,
}

/// Within each complexity quartile, does response time track low quality?
fn speed_error_by_complexity(rows: &[AnswerFriction]) -> Vec<QuartileCorrelation> {
    let complexities: Vec<f64> = rows.iter().map(|r| r.complexity).collect();
    let Some(edges) = [25.0, 50.0, 75.0]
        .iter()
        .map(|p| percentile(&complexities, *p))
        .collect::<Option<Vec<f64>>>()
    else {
        return Vec::new();
    };
    let quartile_of = |c: f64| edges.iter().position(|e| c <= *e).unwrap_or(3);

    ["Q1_simple", "Q2", "Q3", "Q4_complex"]
        .into_iter()
        .enumerate()
        .filter_map(|(q, quartile)| {
            let subset: Vec<&AnswerFriction> = rows.iter().filter(|r| quartile_of(r.complexity) == q).collect();
            if subset.len() < MIN_GROUP || subset.iter().all(|r| r.low_quality == subset[0].low_quality) {
                return None;
            }
            let times: Vec<f64> = subset.iter().map(|r| r.normalized).collect();
            let flags: Vec<bool> = subset.iter().map(|r| r.low_quality).collect();
            Some(QuartileCorrelation {
                quartile,
                correlation: point_biserial(&times, &flags, MIN_GROUP),
                low_quality_rate: low_quality_rate(&subset),
                mean_response_hours: mean_hours(&subset),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReputationBand {
    pub label: &'static str,
    pub answers: usize,
    /// Fast and successful (accepted or positively scored) answers.
    pub firmware_coverage: f64,
    pub fast_low_quality_rate: f64,
    pub mean_response_hours: f64,
    pub acceptance_rate: f64,
}

const REPUTATION_BANDS: [(f64, f64, &str); 5] = [
    (0.0, 100.0, "novice"),
    (100.0, 1_000.0, "learner"),
    (1_000.0, 10_000.0, "intermediate"),
    (10_000.0, 100_000.0, "expert"),
    (100_000.0, f64::INFINITY, "elite"),
];

fn firmware_by_reputation(rows: &[AnswerFriction]) -> Vec<ReputationBand> {
    REPUTATION_BANDS
        .iter()
        .filter_map(|&(low, high, label)| {
            let subset: Vec<&AnswerFriction> =
                rows.iter().filter(|r| r.reputation >= low && r.reputation < high).collect();
            if subset.len() < MIN_GROUP {
                return None;
            }
            let fast = pick(&subset, |r| r.normalized < FAST);
            Some(ReputationBand {
                label,
                answers: subset.len(),
                firmware_coverage: fast.iter().filter(|r| r.accepted || r.positive).count() as f64
                    / subset.len() as f64,
                fast_low_quality_rate: low_quality_rate(&fast),
                mean_response_hours: mean_hours(&subset),
                acceptance_rate: share(&subset, |r| r.accepted).unwrap_or(0.0),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GroupRates {
    pub answers: usize,
    pub low_quality_rate: f64,
    pub downvote_rate: f64,
}

impl GroupRates {
    fn of(rows: &[&AnswerFriction]) -> Self {
        Self {
            answers: rows.len(),
            low_quality_rate: low_quality_rate(rows),
            downvote_rate: share(rows, |r| r.downvoted).unwrap_or(0.0),
        }
    }
}

/// Fast answers to complex questions against slow ones, with fast answers
/// to simple questions as the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrictionGapTrap {
    pub fast_on_complex: GroupRates,
    pub slow_on_complex: GroupRates,
    pub fast_on_simple: GroupRates,
}

fn friction_gap_trap(rows: &[AnswerFriction]) -> Option<FrictionGapTrap> {
    let complex: Vec<&AnswerFriction> = rows.iter().filter(|r| r.complexity > COMPLEX).collect();
    if complex.len() < MIN_GROUP {
        return None;
    }
    let simple: Vec<&AnswerFriction> = rows.iter().filter(|r| r.complexity < SIMPLE).collect();
    Some(FrictionGapTrap {
        fast_on_complex: GroupRates::of(&pick(&complex, |r| r.normalized < FAST)),
        slow_on_complex: GroupRates::of(&pick(&complex, |r| r.normalized > SLOW)),
        fast_on_simple: GroupRates::of(&pick(&simple, |r| r.normalized < FAST)),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReputationGapGroup {
    pub label: &'static str,
    pub complex_answers: usize,
    pub fast_complex_answers: usize,
    pub fast_low_quality_rate: f64,
    pub low_quality_rate: f64,
}

fn reputation_gap(r: &AnswerFriction) -> f64 {
    r.reputation / (r.asker_reputation + 1.0)
}

/// Experts answering much less reputable askers: does the gap relax them
/// on complex questions?
fn reputation_gap_trap(rows: &[AnswerFriction]) -> Vec<ReputationGapGroup> {
    let groups: [(&'static str, fn(f64) -> bool); 2] = [("high_gap", |g| g > 10.0), ("low_gap", |g| g <= 2.0)];
    groups
        .into_iter()
        .filter_map(|(label, in_group)| {
            let subset: Vec<&AnswerFriction> = rows.iter().filter(|r| in_group(reputation_gap(r))).collect();
            if subset.len() < MIN_GROUP {
                return None;
            }
            let complex: Vec<&AnswerFriction> = subset.into_iter().filter(|r| r.complexity > COMPLEX).collect();
            let fast = pick(&complex, |r| r.normalized < FAST);
            Some(ReputationGapGroup {
                label,
                complex_answers: complex.len(),
                fast_complex_answers: fast.len(),
                fast_low_quality_rate: low_quality_rate(&fast),
                low_quality_rate: low_quality_rate(&complex),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QaReport {
    pub answers: usize,
    /// Answers outside (0, 7 days].
    pub out_of_range: usize,
    pub median_response_hours: f64,
    pub mean_complexity: f64,
    pub acceptance_rate: f64,
    pub downvote_rate: f64,
    pub low_quality_rate: f64,
    pub friction_gaps: usize,
    pub by_complexity: Vec<QuartileCorrelation>,
    pub by_reputation: Vec<ReputationBand>,
    pub gap_trap: Option<FrictionGapTrap>,
    pub reputation_gap: Vec<ReputationGapGroup>,
}

pub fn analyze(answers: &[Answer]) -> QaReport {
    let rows = friction_records(answers);
    let all: Vec<&AnswerFriction> = rows.iter().collect();
    let times: Vec<f64> = rows.iter().map(|r| r.response_time_seconds / 3600.0).collect();
    let complexities: Vec<f64> = rows.iter().map(|r| r.complexity).collect();
    QaReport {
        answers: rows.len(),
        out_of_range: answers.len() - rows.len(),
        median_response_hours: median_or_zero(&times),
        mean_complexity: mean(&complexities).unwrap_or(0.0),
        acceptance_rate: share(&all, |r| r.accepted).unwrap_or(0.0),
        downvote_rate: share(&all, |r| r.downvoted).unwrap_or(0.0),
        low_quality_rate: low_quality_rate(&all),
        friction_gaps: rows.iter().filter(|r| r.friction_gap).count(),
        by_complexity: speed_error_by_complexity(&rows),
        by_reputation: firmware_by_reputation(&rows),
        gap_trap: friction_gap_trap(&rows),
        reputation_gap: reputation_gap_trap(&rows),
    }
}

impl QaReport {
    pub fn to_text(&self) -> String {
        let pct = |v: f64| 100.0 * v;
        let mut out = String::from("Q&A friction (answer speed against answer quality)\n\n");
        out.push_str(&format!(
            "  Answers:          {} ({} out of range)\n",
            self.answers, self.out_of_range
        ));
        out.push_str(&format!("  Median response:  {:.1}h\n", self.median_response_hours));
        out.push_str(&format!("  Mean complexity:  {:.2}\n", self.mean_complexity));
        out.push_str(&format!(
            "  Accepted {:.1}%, downvoted {:.1}%, low quality {:.1}%\n",
            pct(self.acceptance_rate),
            pct(self.downvote_rate),
            pct(self.low_quality_rate)
        ));
        out.push_str(&format!("  Friction gaps:    {}\n", self.friction_gaps));

        out.push_str("\n  Speed and low quality by complexity quartile:\n");
        if self.by_complexity.is_empty() {
            out.push_str("    not enough varied answers\n");
        }
        for q in &self.by_complexity {
            out.push_str(&format!(
                "    {}: r = {:.3}, p = {:.4}, n = {}, low quality {:.1}%, mean {:.1}h\n",
                q.quartile,
                q.correlation.coefficient,
                q.correlation.p_value,
                q.correlation.n,
                pct(q.low_quality_rate),
                q.mean_response_hours
            ));
        }

        out.push_str("\n  Firmware coverage by reputation:\n");
        for b in &self.by_reputation {
            out.push_str(&format!(
                "    {}: coverage {:.1}%, fast low quality {:.1}%, n = {}\n",
                b.label,
                pct(b.firmware_coverage),
                pct(b.fast_low_quality_rate),
                b.answers
            ));
        }

        out.push_str("\n  Friction gap trap:\n");
        match &self.gap_trap {
            Some(t) => {
                for (label, g) in [
                    ("fast on complex", &t.fast_on_complex),
                    ("slow on complex", &t.slow_on_complex),
                    ("fast on simple", &t.fast_on_simple),
                ] {
                    out.push_str(&format!(
                        "    {label}: low quality {:.1}%, n = {}\n",
                        pct(g.low_quality_rate),
                        g.answers
                    ));
                }
            }
            None => out.push_str("    not enough complex questions\n"),
        }

        out.push_str("\n  Reputation gap trap:\n");
        for g in &self.reputation_gap {
            out.push_str(&format!(
                "    {}: fast low quality {:.1}%, {} fast of {} complex\n",
                g.label,
                pct(g.fast_low_quality_rate),
                g.fast_complex_answers,
                g.complex_answers
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(seconds: f64, score: i64, accepted: bool, complexity: f64, reputation: f64) -> Answer {
        Answer {
            answer_id: None,
            question_id: None,
            response_time_seconds: seconds,
            score,
            is_accepted: accepted,
            question_complexity: complexity,
            owner_reputation: reputation,
            question_owner_reputation: 10.0,
        }
    }

    #[test]
    fn normalizes_by_the_median_and_flags_quality() {
        let answers = vec![
            answer(600.0, 3, true, 0.8, 50.0),
            answer(1_200.0, 0, false, 0.8, 50.0),
            answer(6_000.0, -2, false, 0.2, 50.0),
            answer(0.0, 1, false, 0.5, 50.0),
            answer(8.0 * 86_400.0, 1, false, 0.5, 50.0),
        ];
        let rows = friction_records(&answers);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].normalized, 0.5);
        assert_eq!(rows[0].level, SpeedLevel::Fast);
        assert!(rows[0].friction_gap);
        assert_eq!(rows[1].level, SpeedLevel::Normal);
        assert!(rows[1].low_quality && !rows[1].downvoted);
        assert_eq!(rows[2].level, SpeedLevel::Slow);
        assert!(rows[2].downvoted && !rows[2].friction_gap);
    }

    /// Forty complex answers: fast ones are poor, slow ones are good.
    fn hasty_experts() -> Vec<Answer> {
        (0..40)
            .map(|i| {
                let fast = i % 2 == 0;
                let seconds = if fast { 300.0 } else { 3_000.0 };
                let score = if fast { 0 } else { 4 };
                answer(seconds, score, false, 0.9, 20_000.0)
            })
            .collect()
    }

    #[test]
    fn fast_answers_to_complex_questions_are_the_trap() {
        let report = analyze(&hasty_experts());
        let trap = report.gap_trap.unwrap();
        assert_eq!(trap.fast_on_complex.answers, 20);
        assert_eq!(trap.fast_on_complex.low_quality_rate, 1.0);
        assert_eq!(trap.slow_on_complex.answers, 20);
        assert_eq!(trap.slow_on_complex.low_quality_rate, 0.0);
        assert_eq!(trap.fast_on_simple.answers, 0);

        let band = &report.by_reputation[0];
        assert_eq!(band.label, "expert");
        assert_eq!(band.firmware_coverage, 0.0);
        assert_eq!(band.fast_low_quality_rate, 1.0);

        // Reputation 20000 against askers at 10: all in the high-gap group.
        assert_eq!(report.reputation_gap.len(), 1);
        assert_eq!(report.reputation_gap[0].label, "high_gap");
        assert_eq!(report.reputation_gap[0].fast_complex_answers, 20);
    }

    #[test]
    fn longer_answers_track_quality_within_a_quartile() {
        let report = analyze(&hasty_experts());
        // Identical complexity puts every answer in the first quartile.
        assert_eq!(report.by_complexity.len(), 1);
        let q = &report.by_complexity[0];
        assert_eq!(q.quartile, "Q1_simple");
        assert!(q.correlation.coefficient < -0.99);
        assert_eq!(q.low_quality_rate, 0.5);
    }

    #[test]
    fn small_samples_leave_sections_empty() {
        let report = analyze(&[answer(60.0, 1, true, 0.9, 5.0)]);
        assert_eq!(report.answers, 1);
        assert!(report.by_complexity.is_empty());
        assert!(report.by_reputation.is_empty());
        assert_eq!(report.gap_trap, None);
        assert!(report.to_text().contains("not enough complex questions"));
    }
}

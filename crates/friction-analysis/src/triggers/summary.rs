//! Aggregate view of stored trigger rows.

use friction_core::types::L2TriggerMetrics;
use serde::Serialize;

use super::analyzer::TriggerThresholds;

/// Rows where one signal crossed its threshold.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignalBreakdown {
    pub name: &'static str,
    pub triggered: usize,
    pub with_friction: usize,
    pub blunders: usize,
    /// Triggered, no friction, blunder.
    pub misses: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TriggerSummary {
    pub total: usize,
    pub fired: usize,
    pub friction_present: usize,
    pub blunders: usize,
    pub hits: usize,
    pub misses: usize,
    pub false_alarms: usize,
    /// P(friction | trigger fired).
    pub sensitivity: Option<f64>,
    pub signals: Vec<SignalBreakdown>,
    pub blunder_rate_fired: Option<f64>,
    pub blunder_rate_not_fired: Option<f64>,
    pub mean_score_blunders: Option<f64>,
    pub mean_score_non_blunders: Option<f64>,
}

impl TriggerSummary {
    pub fn from_rows(rows: &[L2TriggerMetrics], thresholds: &TriggerThresholds) -> Self {
        let count = |pred: fn(&L2TriggerMetrics) -> bool| rows.iter().filter(|&r| pred(r)).count();
        let fired = count(|r| r.should_fire);
        let not_fired = rows.len() - fired;
        let hits = count(L2TriggerMetrics::is_hit);

        let signals = vec![
            breakdown(rows, "optionality_delta", |r| {
                r.optionality_delta.is_some_and(|d| d.abs() >= thresholds.optionality_delta)
            }),
            breakdown(rows, "eval_gradient", |r| {
                r.eval_gradient.is_some_and(|g| g >= thresholds.eval_gradient_cp)
            }),
            breakdown(rows, "criticality_gap", |r| {
                r.criticality_gap.is_some_and(|g| g >= thresholds.criticality_gap_cp)
            }),
            breakdown(rows, "opponent_surprise", |r| r.opponent_surprise == Some(true)),
        ];

        Self {
            total: rows.len(),
            fired,
            friction_present: count(|r| r.friction_present),
            blunders: count(|r| r.is_blunder),
            hits,
            misses: count(L2TriggerMetrics::is_miss),
            false_alarms: count(L2TriggerMetrics::is_false_alarm),
            sensitivity: ratio(hits, fired),
            signals,
            blunder_rate_fired: ratio(count(|r| r.should_fire && r.is_blunder), fired),
            blunder_rate_not_fired: ratio(count(|r| !r.should_fire && r.is_blunder), not_fired),
            mean_score_blunders: mean_score(rows, true),
            mean_score_non_blunders: mean_score(rows, false),
        }
    }

    /// Markdown section for the analysis report.
    pub fn to_markdown(&self) -> String {
        let pct = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{:.1}%", v * 100.0));
        let num = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.3}"));

        let mut out = String::from("## L2 Trigger Analysis\n\n");
        out.push_str(&format!("- Moves analyzed: {}\n", self.total));
        out.push_str(&format!("- Triggers fired: {}\n", self.fired));
        out.push_str(&format!("- Friction present: {}\n", self.friction_present));
        out.push_str(&format!("- Hits: {}\n", self.hits));
        out.push_str(&format!("- Misses: {}\n", self.misses));
        out.push_str(&format!("- False alarms: {}\n", self.false_alarms));
        out.push_str(&format!("- Sensitivity P(friction | trigger): {}\n", num(self.sensitivity)));
        out.push_str(&format!(
            "- Blunder rate when fired: {}, when not fired: {}\n",
            pct(self.blunder_rate_fired),
            pct(self.blunder_rate_not_fired)
        ));
        out.push_str(&format!(
            "- Mean trigger score on blunders: {}, on other moves: {}\n\n",
            num(self.mean_score_blunders),
            num(self.mean_score_non_blunders)
        ));

        out.push_str("| Signal | Triggered | Friction | Blunders | Misses |\n");
        out.push_str("|---|---|---|---|---|\n");
        for s in &self.signals {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                s.name, s.triggered, s.with_friction, s.blunders, s.misses
            ));
        }
        out
    }
}

fn breakdown(
    rows: &[L2TriggerMetrics],
    name: &'static str,
    crossed: impl Fn(&L2TriggerMetrics) -> bool,
) -> SignalBreakdown {
    let matching: Vec<_> = rows.iter().filter(|&r| crossed(r)).collect();
    SignalBreakdown {
        name,
        triggered: matching.len(),
        with_friction: matching.iter().filter(|r| r.friction_present).count(),
        blunders: matching.iter().filter(|r| r.is_blunder).count(),
        misses: matching
            .iter()
            .filter(|r| !r.friction_present && r.is_blunder)
            .count(),
    }
}

fn ratio(num: usize, den: usize) -> Option<f64> {
    (den > 0).then(|| num as f64 / den as f64)
}

fn mean_score(rows: &[L2TriggerMetrics], blunders: bool) -> Option<f64> {
    let scores: Vec<f64> = rows
        .iter()
        .filter(|r| r.is_blunder == blunders)
        .filter_map(|r| r.trigger_score)
        .collect();
    (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64)
}

#[cfg(test)]
mod tests {
    use friction_core::types::TriggerOutcome;

    use super::*;

    fn row(fire: bool, friction: bool, blunder: bool, gap: Option<f64>, score: f64) -> L2TriggerMetrics {
        L2TriggerMetrics {
            game_id: "g".to_string(),
            ply: 1,
            optionality_delta: None,
            eval_gradient: None,
            criticality_gap: gap,
            opponent_surprise: None,
            trigger_score: Some(score),
            should_fire: fire,
            friction_present: friction,
            think_time_normalized: if friction { 2.0 } else { 0.5 },
            is_blunder: blunder,
            eval_drop: if blunder { 200.0 } else { 0.0 },
            outcome: TriggerOutcome::classify(fire, friction, blunder),
        }
    }

    #[test]
    fn counts_and_rates() {
        let rows = vec![
            row(true, true, false, Some(150.0), 0.8),
            row(true, false, true, Some(120.0), 0.6),
            row(false, true, false, None, 0.1),
            row(false, false, false, None, 0.1),
        ];
        let s = TriggerSummary::from_rows(&rows, &TriggerThresholds::default());
        assert_eq!(s.total, 4);
        assert_eq!(s.fired, 2);
        assert_eq!((s.hits, s.misses, s.false_alarms), (1, 1, 1));
        assert_eq!(s.sensitivity, Some(0.5));
        assert_eq!(s.blunder_rate_fired, Some(0.5));
        assert_eq!(s.blunder_rate_not_fired, Some(0.0));
        assert_eq!(s.mean_score_blunders, Some(0.6));

        let gap = s.signals.iter().find(|b| b.name == "criticality_gap").unwrap();
        assert_eq!(gap.triggered, 2);
        assert_eq!(gap.misses, 1);
        assert!(s.to_markdown().contains("| criticality_gap | 2 | 1 | 1 | 1 |"));
    }

    #[test]
    fn empty_rows_have_no_rates() {
        let s = TriggerSummary::from_rows(&[], &TriggerThresholds::default());
        assert_eq!(s.sensitivity, None);
        assert_eq!(s.blunder_rate_not_fired, None);
        assert!(s.to_markdown().contains("n/a"));
    }
}

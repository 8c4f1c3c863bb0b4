//! Markdown rendering of analysis results.

use std::fmt::Write as _;

use super::analyzer::AnalysisResults;
use super::segments::BlunderRate;
use crate::triggers::TriggerSummary;

fn pct(part: usize, whole: usize) -> f64 {
    100.0 * part as f64 / whole.max(1) as f64
}

fn rate_section(out: &mut String, title: &str, rates: &[BlunderRate]) {
    if rates.is_empty() {
        return;
    }
    let _ = writeln!(out, "## {title}\n");
    let _ = writeln!(out, "| Segment | Moves | Blunders | Rate |");
    let _ = writeln!(out, "|---|---|---|---|");
    for r in rates {
        let _ = writeln!(out, "| {} | {} | {} | {:.2}% |", r.label, r.n, r.blunders, r.rate * 100.0);
    }
    out.push('\n');
}

/// Render the full report. The trigger section is included when trigger
/// rows exist.
pub fn render_report(results: &AnalysisResults, triggers: Option<&TriggerSummary>) -> String {
    let mut out = String::new();
    let r = results;

    let _ = writeln!(out, "# Friction Analysis Report\n");
    let _ = writeln!(out, "## Summary Statistics\n");
    let _ = writeln!(out, "- Moves analyzed: {}", r.total_moves);
    let _ = writeln!(
        out,
        "- Blunders identified: {} ({:.2}%)",
        r.total_blunders,
        pct(r.total_blunders, r.total_moves)
    );
    let _ = writeln!(
        out,
        "- Friction gaps identified: {} ({:.2}%)",
        r.total_friction_gaps,
        pct(r.total_friction_gaps, r.total_moves)
    );
    let _ = writeln!(out, "- Moves outside time pressure: {}\n", r.calm_moves);

    let _ = writeln!(out, "## Core Hypothesis Test\n");
    let _ = writeln!(
        out,
        "**Hypothesis:** thinking time is negatively correlated with blunder probability outside time pressure.\n"
    );
    let c = &r.correlation_no_time_pressure;
    let _ = writeln!(out, "- Correlation (think time vs blunder): r = {:.4}", c.coefficient);
    let _ = writeln!(out, "- P-value: {:.6}", c.p_value);
    let _ = writeln!(out, "- Sample size: {}", c.n);
    let _ = writeln!(
        out,
        "- All moves, including time pressure: r = {:.4}, p = {:.6}",
        r.correlation_all.coefficient, r.correlation_all.p_value
    );
    let verdict = if r.hypothesis_supported() { "SUPPORTED" } else { "NOT SUPPORTED" };
    let _ = writeln!(out, "- **{verdict}**\n");

    let t = &r.ttest_blunder_vs_other;
    let _ = writeln!(out, "### T-Test: Think Time (Blunders vs Non-Blunders)\n");
    let _ = writeln!(out, "- Mean think time (blunders): {:.3} (n = {})", t.mean_group1, t.n_group1);
    let _ = writeln!(out, "- Mean think time (non-blunders): {:.3} (n = {})", t.mean_group2, t.n_group2);
    let _ = writeln!(out, "- T-statistic: {:.3}", t.statistic);
    let _ = writeln!(out, "- P-value: {:.6}", t.p_value);
    let _ = writeln!(out, "- Effect size (Cohen's d): {:.3}\n", t.effect_size);

    let _ = writeln!(out, "## Friction Gap Analysis\n");
    let _ = writeln!(out, "- Blunder rate with friction gap: {:.2}%", r.blunder_rate_with_gap * 100.0);
    let _ = writeln!(out, "- Blunder rate without friction gap: {:.2}%", r.blunder_rate_without_gap * 100.0);
    let _ = writeln!(out, "- Relative risk: {:.2}x", r.relative_risk);
    let _ = writeln!(out, "- Chi-square statistic: {:.3}", r.chi_square_friction_gap.statistic);
    let _ = writeln!(out, "- P-value: {:.6}\n", r.chi_square_friction_gap.p_value);

    rate_section(&mut out, "Blunder Rate by Friction Level", &r.by_friction_level);
    rate_section(&mut out, "Blunder Rate by Rating Band", &r.by_rating_band);
    rate_section(&mut out, "Blunder Rate by Game Phase", &r.by_game_phase);

    if let Some(reg) = &r.logistic_regression {
        let _ = writeln!(out, "## Logistic Regression\n");
        let _ = writeln!(out, "- Pseudo R² (McFadden): {:.4}", reg.pseudo_r2);
        let _ = writeln!(out, "- N: {}", reg.n);
        let _ = writeln!(out, "- Converged: {}\n", reg.converged);
        let _ = writeln!(out, "| Variable | Coefficient | Odds Ratio | P-value |");
        let _ = writeln!(out, "|---|---|---|---|");
        for coef in reg.coefficients.iter().filter(|c| c.name != "const") {
            let _ = writeln!(
                out,
                "| {} | {:.4} | {:.4} | {:.4} |",
                coef.name, coef.estimate, coef.odds_ratio, coef.p_value
            );
        }
        out.push('\n');
    }

    if let Some(summary) = triggers.filter(|s| s.total > 0) {
        out.push_str(&summary.to_markdown());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::StatisticalAnalyzer;

    #[test]
    fn empty_input_still_renders() {
        let results = StatisticalAnalyzer::default().analyze(&[]);
        let report = render_report(&results, None);
        assert!(report.starts_with("# Friction Analysis Report"));
        assert!(report.contains("- Moves analyzed: 0"));
        assert!(report.contains("NOT SUPPORTED"));
        assert!(!report.contains("## Logistic Regression"));
        assert!(!report.contains("L2 Trigger"));
    }
}

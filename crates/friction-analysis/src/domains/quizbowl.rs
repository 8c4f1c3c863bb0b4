//! Quiz bowl L2 metric.
//!
//! Quiz bowl inverts the EdNet pattern. Answers are recognised from clues,
//! so experts buzz early and are right; waiting does not help a player who
//! lacks the pattern. The L2 metric is accuracy on buzzes in the first half
//! of the question.

use std::collections::BTreeMap;
use std::io::Read;

use friction_core::errors::DomainError;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize};

use super::{share, ExpertSplit};
use crate::statistics::descriptive::mean;

const MIN_BUZZES: usize = 10;
const EARLY_LAST: f64 = 50.0;
const LATE_AFTER: f64 = 90.0;
const MIN_EDGE_BUZZES: usize = 3;
const MIN_QUARTILE_BUZZES: usize = 2;

/// One tournament game with its buzzes.
#[derive(Debug, Clone, Deserialize)]
pub struct Game {
    #[serde(default, deserialize_with = "loose_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub buzzes: Vec<Buzz>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Buzz {
    #[serde(default, deserialize_with = "loose_id")]
    pub player_id: Option<String>,
    #[serde(default, deserialize_with = "loose_id")]
    pub question_id: Option<String>,
    /// Percent of the question read at the buzz.
    pub buzz_position: Option<f64>,
    #[serde(default)]
    pub correct: bool,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseId {
    Text(String),
    Number(i64),
}

/// Ids appear as strings in some exports and integers in others.
fn loose_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<LooseId>::deserialize(deserializer)?.map(|id| match id {
        LooseId::Text(s) => s,
        LooseId::Number(n) => n.to_string(),
    }))
}

/// Parse a JSON array of games.
pub fn read_games<R: Read>(reader: R) -> Result<Vec<Game>, DomainError> {
    serde_json::from_reader(reader).map_err(|e| DomainError::Json {
        line: e.line(),
        message: e.to_string(),
    })
}

/// A buzz with a player and a positive position.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidBuzz<'a> {
    pub player: &'a str,
    pub position: f64,
    pub correct: bool,
    pub category: &'a str,
}

fn valid_buzzes(games: &[Game]) -> (Vec<ValidBuzz<'_>>, usize) {
    let mut skipped = 0;
    let mut valid = Vec::new();
    for buzz in games.iter().flat_map(|g| &g.buzzes) {
        match (buzz.player_id.as_deref(), buzz.buzz_position) {
            (Some(player), Some(position)) if position > 0.0 => valid.push(ValidBuzz {
                player,
                position,
                correct: buzz.correct,
                category: buzz.category.as_deref().unwrap_or("Unknown"),
            }),
            _ => skipped += 1,
        }
    }
    (valid, skipped)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuzzerCategory {
    Expert,
    Strong,
    Developing,
    Novice,
    InsufficientData,
}

impl BuzzerCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expert => "expert",
            Self::Strong => "strong",
            Self::Developing => "developing",
            Self::Novice => "novice",
            Self::InsufficientData => "insufficient_data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerL2 {
    pub player_id: String,
    /// Accuracy on buzzes at or before half the question; needs three.
    pub early_accuracy: Option<f64>,
    /// Accuracy on buzzes after 90% of the question; needs three.
    pub late_accuracy: Option<f64>,
    /// Early over late accuracy.
    pub l2_trigger: Option<f64>,
    pub overall_accuracy: f64,
    pub mean_buzz_position: f64,
    pub buzzes: usize,
    pub early_buzzes: usize,
    /// Accuracy per quarter of the question, `Q1` to `Q4`, for quarters
    /// with at least two buzzes.
    pub quartile_accuracy: BTreeMap<String, f64>,
    pub category: BuzzerCategory,
}

fn classify(early: Option<f64>, overall: f64) -> BuzzerCategory {
    match early {
        None => BuzzerCategory::InsufficientData,
        Some(e) if e >= 0.85 && overall >= 0.80 => BuzzerCategory::Expert,
        Some(e) if e >= 0.70 => BuzzerCategory::Strong,
        Some(e) if e >= 0.50 => BuzzerCategory::Developing,
        Some(_) => BuzzerCategory::Novice,
    }
}

fn accuracy_when(buzzes: &[&ValidBuzz<'_>], min: usize, pred: impl Fn(f64) -> bool) -> (usize, Option<f64>) {
    let picked: Vec<&&ValidBuzz<'_>> = buzzes.iter().filter(|b| pred(b.position)).collect();
    let accuracy = (picked.len() >= min)
        .then(|| share(&picked, |b| b.correct))
        .flatten();
    (picked.len(), accuracy)
}

/// `None` below ten buzzes.
pub fn player_l2(player_id: &str, buzzes: &[&ValidBuzz<'_>]) -> Option<PlayerL2> {
    if buzzes.len() < MIN_BUZZES {
        return None;
    }
    let overall_accuracy = share(buzzes, |b| b.correct).unwrap_or(0.0);
    let positions: Vec<f64> = buzzes.iter().map(|b| b.position).collect();

    let (early_buzzes, early_accuracy) = accuracy_when(buzzes, MIN_EDGE_BUZZES, |p| p <= EARLY_LAST);
    let (_, late_accuracy) = accuracy_when(buzzes, MIN_EDGE_BUZZES, |p| p > LATE_AFTER);
    let l2_trigger = match (early_accuracy, late_accuracy) {
        (Some(early), Some(late)) if late > 0.0 => Some(early / late),
        _ => None,
    };

    let quartile_accuracy = [(0.0, 25.0), (25.0, 50.0), (50.0, 75.0), (75.0, 100.0)]
        .into_iter()
        .enumerate()
        .filter_map(|(i, (low, high))| {
            let (_, acc) = accuracy_when(buzzes, MIN_QUARTILE_BUZZES, |p| p > low && p <= high);
            acc.map(|a| (format!("Q{}", i + 1), a))
        })
        .collect();

    Some(PlayerL2 {
        player_id: player_id.to_string(),
        early_accuracy,
        late_accuracy,
        l2_trigger,
        overall_accuracy,
        mean_buzz_position: mean(&positions).unwrap_or(0.0),
        buzzes: buzzes.len(),
        early_buzzes,
        quartile_accuracy,
        category: classify(early_accuracy, overall_accuracy),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub category: String,
    pub accuracy: f64,
    pub buzzes: usize,
    pub mean_position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizbowlReport {
    pub games: usize,
    pub buzzes: usize,
    /// Buzzes without a player or a positive position.
    pub skipped: usize,
    pub players: usize,
    pub overall_accuracy: Option<f64>,
    pub player_metrics: Vec<PlayerL2>,
    /// Hardest categories first.
    pub categories: Vec<CategoryStats>,
    /// Early accuracy as the expert predictor, over players with early
    /// buzzes.
    pub split: Option<ExpertSplit>,
}

pub fn analyze(games: &[Game], expert_accuracy: f64, min_players: usize) -> QuizbowlReport {
    let (valid, skipped) = valid_buzzes(games);

    let mut by_player: FxHashMap<&str, Vec<&ValidBuzz<'_>>> = FxHashMap::default();
    let mut by_category: FxHashMap<&str, Vec<&ValidBuzz<'_>>> = FxHashMap::default();
    for b in &valid {
        by_player.entry(b.player).or_default().push(b);
        by_category.entry(b.category).or_default().push(b);
    }
    let players = by_player.len();

    let mut player_metrics: Vec<PlayerL2> = by_player
        .into_iter()
        .filter_map(|(player, buzzes)| player_l2(player, &buzzes))
        .collect();
    player_metrics.sort_by(|a, b| a.player_id.cmp(&b.player_id));

    let mut categories: Vec<CategoryStats> = by_category
        .into_iter()
        .map(|(category, buzzes)| {
            let positions: Vec<f64> = buzzes.iter().map(|b| b.position).collect();
            CategoryStats {
                category: category.to_string(),
                accuracy: share(&buzzes, |b| b.correct).unwrap_or(0.0),
                buzzes: buzzes.len(),
                mean_position: mean(&positions).unwrap_or(0.0),
            }
        })
        .collect();
    categories.sort_by(|a, b| a.accuracy.total_cmp(&b.accuracy).then_with(|| a.category.cmp(&b.category)));

    let with_early: Vec<(f64, f64)> = player_metrics
        .iter()
        .filter_map(|m| Some((m.early_accuracy?, m.overall_accuracy)))
        .collect();
    let split = (with_early.len() >= min_players).then(|| {
        let (scores, accuracies): (Vec<f64>, Vec<f64>) = with_early.into_iter().unzip();
        ExpertSplit::compute(&scores, &accuracies, expert_accuracy)
    });

    QuizbowlReport {
        games: games.len(),
        buzzes: valid.len(),
        skipped,
        players,
        overall_accuracy: share(&valid, |b| b.correct),
        player_metrics,
        categories,
        split,
    }
}

impl QuizbowlReport {
    pub fn to_text(&self) -> String {
        let mut out = String::from("Quiz bowl L2 (early buzz accuracy)\n\n");
        out.push_str(&format!(
            "  Buzzes:           {} from {} players in {} games ({} skipped)\n",
            self.buzzes, self.players, self.games, self.skipped
        ));
        if let Some(acc) = self.overall_accuracy {
            out.push_str(&format!("  Overall accuracy: {:.1}%\n", 100.0 * acc));
        }
        out.push_str(&format!("  Players with L2:  {}\n", self.player_metrics.len()));
        for category in [
            BuzzerCategory::Expert,
            BuzzerCategory::Strong,
            BuzzerCategory::Developing,
            BuzzerCategory::Novice,
            BuzzerCategory::InsufficientData,
        ] {
            let n = self.player_metrics.iter().filter(|p| p.category == category).count();
            out.push_str(&format!("    {}: {n}\n", category.as_str()));
        }
        match &self.split {
            Some(split) => split.write_text(&mut out, "early accuracy"),
            None => out.push_str("  Expert split:     too few players with early buzzes\n"),
        }
        if !self.categories.is_empty() {
            out.push_str("  Hardest categories:\n");
            for c in self.categories.iter().take(6) {
                out.push_str(&format!(
                    "    {}: {:.1}% accuracy, mean position {:.1}%\n",
                    c.category,
                    100.0 * c.accuracy,
                    c.mean_position
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buzz(player: &str, position: f64, correct: bool) -> Buzz {
        Buzz {
            player_id: Some(player.to_string()),
            question_id: None,
            buzz_position: Some(position),
            correct,
            category: Some("Science".to_string()),
        }
    }

    #[test]
    fn ids_may_be_numbers_or_strings() {
        let json = r#"[{"id": 7, "buzzes": [
            {"player_id": 12, "question_id": "q1", "buzz_position": 40.5, "correct": true, "category": "History"},
            {"player_id": "p9", "buzz_position": null}
        ]}]"#;
        let games = read_games(json.as_bytes()).unwrap();
        assert_eq!(games[0].id.as_deref(), Some("7"));
        assert_eq!(games[0].buzzes[0].player_id.as_deref(), Some("12"));
        assert_eq!(games[0].buzzes[1].buzz_position, None);
        assert!(!games[0].buzzes[1].correct);
    }

    #[test]
    fn malformed_json_reports_its_line() {
        let err = read_games("[\n{\"buzzes\": [}\n]".as_bytes()).unwrap_err();
        assert!(matches!(err, DomainError::Json { line: 2, .. }));
    }

    #[test]
    fn confident_early_buzzer_is_an_expert() {
        let mut buzzes: Vec<Buzz> = (0..8).map(|i| buzz("ace", 20.0 + f64::from(i) * 3.0, true)).collect();
        buzzes.extend((0..4).map(|i| buzz("ace", 95.0, i < 3)));
        let report = analyze(&[Game { id: None, buzzes }], 0.80, 1);
        let ace = &report.player_metrics[0];
        assert_eq!(ace.early_buzzes, 8);
        assert_eq!(ace.early_accuracy, Some(1.0));
        assert_eq!(ace.late_accuracy, Some(0.75));
        assert!((ace.l2_trigger.unwrap() - 4.0 / 3.0).abs() < 1e-12);
        assert!((ace.overall_accuracy - 11.0 / 12.0).abs() < 1e-12);
        assert_eq!(ace.category, BuzzerCategory::Expert);
        assert_eq!(ace.quartile_accuracy.get("Q1"), Some(&1.0));
        assert_eq!(ace.quartile_accuracy.get("Q4"), Some(&0.75));
        assert_eq!(ace.quartile_accuracy.get("Q3"), None);
    }

    #[test]
    fn late_only_buzzer_cannot_be_classified() {
        let buzzes: Vec<Buzz> = (0..10).map(|i| buzz("waiter", 99.0, i % 2 == 0)).collect();
        let report = analyze(&[Game { id: None, buzzes }], 0.80, 1);
        let waiter = &report.player_metrics[0];
        assert_eq!(waiter.early_accuracy, None);
        assert_eq!(waiter.l2_trigger, None);
        assert_eq!(waiter.category, BuzzerCategory::InsufficientData);
        // The split only counts players with early buzzes.
        assert_eq!(report.split, None);
    }

    #[test]
    fn buzzes_without_position_or_player_are_skipped() {
        let mut buzzes = vec![buzz("a", 0.0, true), buzz("a", 30.0, true)];
        buzzes.push(Buzz {
            player_id: None,
            ..buzz("b", 30.0, false)
        });
        let report = analyze(&[Game { id: None, buzzes }], 0.80, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.buzzes, 1);
        assert_eq!(report.categories[0].category, "Science");
        assert!(report.to_text().contains("too few players"));
    }
}

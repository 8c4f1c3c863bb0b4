//! Phase-wise think-time signature.

use friction_core::config::EliteBenchmark;
use friction_core::errors::ProfileError;
use serde::Serialize;

use super::classify::{classify, compare_to_benchmarks, BenchmarkComparison, Classification};
use super::records::ApiGame;
use crate::statistics::descriptive::{mean, percentile};

const MIN_OWN_CLOCKS: usize = 10;
const MIN_THINK_TIMES: usize = 8;
const THINK_RANGE: std::ops::RangeInclusive<f64> = 0.1..=60.0;
const OPENING_LAST_MOVE: usize = 8;
const MIDDLEGAME_LAST_MOVE: usize = 25;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct L2Signature {
    pub player: String,
    /// Middlegame median over opening median.
    pub l2_trigger: f64,
    pub opening_ratio: f64,
    pub middlegame_ratio: f64,
    pub endgame_ratio: f64,
    /// Fast opening and slow middlegame relative to the overall median.
    pub sandwich: bool,
    pub median: f64,
    pub p10: f64,
    pub p25: f64,
    pub p75: f64,
    pub p90: f64,
    /// p90 over p10.
    pub bimodal_index: f64,
    pub coefficient_of_variation: f64,
    pub games_used: usize,
    pub games_skipped: usize,
    pub moves: usize,
    pub mean_rating: Option<u32>,
}

#[derive(Default)]
struct PhaseSamples {
    opening: Vec<f64>,
    middlegame: Vec<f64>,
    endgame: Vec<f64>,
    all: Vec<f64>,
}

impl PhaseSamples {
    fn push(&mut self, own_move: usize, think: f64) {
        let bucket = if own_move <= OPENING_LAST_MOVE {
            &mut self.opening
        } else if own_move <= MIDDLEGAME_LAST_MOVE {
            &mut self.middlegame
        } else {
            &mut self.endgame
        };
        bucket.push(think);
        self.all.push(think);
    }
}

/// Think times for one player in one game, tagged with the own-move
/// number they belong to. `None` when the game has too little clock data.
fn game_think_times(game: &ApiGame, is_white: bool) -> Option<Vec<(usize, f64)>> {
    let clocks = game.own_clocks(is_white);
    if clocks.len() < MIN_OWN_CLOCKS {
        return None;
    }
    let thinks: Vec<(usize, f64)> = clocks
        .windows(2)
        .enumerate()
        .map(|(i, w)| (i + 1, w[0] - w[1]))
        .filter(|(_, t)| THINK_RANGE.contains(t))
        .collect();
    (thinks.len() >= MIN_THINK_TIMES).then_some(thinks)
}

fn median(values: &[f64]) -> f64 {
    percentile(values, 50.0).unwrap_or(0.0)
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Build a signature from the games `username` played.
pub fn compute_signature(games: &[ApiGame], username: &str, min_games: usize) -> Result<L2Signature, ProfileError> {
    let insufficient = |message: String| ProfileError::InsufficientData {
        player: username.to_string(),
        message,
    };

    let mut samples = PhaseSamples::default();
    let mut ratings = Vec::new();
    let mut games_used = 0;
    let mut games_skipped = 0;
    for game in games {
        let Some(is_white) = game.color_of(username) else {
            tracing::debug!(game_id = %game.id, "player not in game");
            games_skipped += 1;
            continue;
        };
        let Some(thinks) = game_think_times(game, is_white) else {
            games_skipped += 1;
            continue;
        };
        games_used += 1;
        let player = if is_white { &game.white } else { &game.black };
        ratings.extend(player.rating.map(f64::from));
        for (own_move, think) in thinks {
            samples.push(own_move, think);
        }
    }

    if games_used < min_games {
        return Err(insufficient(format!("{games_used} usable games, need {min_games}")));
    }
    if samples.opening.is_empty() || samples.middlegame.is_empty() {
        return Err(insufficient("no opening or middlegame think times".to_string()));
    }

    let overall = median(&samples.all);
    let opening = median(&samples.opening);
    let middlegame = median(&samples.middlegame);
    let endgame = if samples.endgame.is_empty() {
        overall
    } else {
        median(&samples.endgame)
    };
    let opening_ratio = ratio(opening, overall);
    let middlegame_ratio = ratio(middlegame, overall);

    let pct = |p| percentile(&samples.all, p).unwrap_or(0.0);
    let (p10, p90) = (pct(10.0), pct(90.0));

    let mean_think = mean(&samples.all).unwrap_or(0.0);
    let population_sd = (samples.all.iter().map(|t| (t - mean_think).powi(2)).sum::<f64>()
        / samples.all.len() as f64)
        .sqrt();

    Ok(L2Signature {
        player: username.to_string(),
        l2_trigger: ratio(middlegame, opening),
        opening_ratio,
        middlegame_ratio,
        endgame_ratio: ratio(endgame, overall),
        sandwich: opening_ratio < 1.0 && middlegame_ratio > 1.0,
        median: overall,
        p10,
        p25: pct(25.0),
        p75: pct(75.0),
        p90,
        bimodal_index: ratio(p90, p10),
        coefficient_of_variation: ratio(population_sd, mean_think),
        games_used,
        games_skipped,
        moves: samples.all.len(),
        mean_rating: mean(&ratings).map(|r| r.round() as u32),
    })
}

/// Signature plus its interpretation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerProfile {
    pub signature: L2Signature,
    pub classification: Classification,
    /// Most similar first.
    pub comparisons: Vec<BenchmarkComparison>,
}

impl PlayerProfile {
    pub fn build(signature: L2Signature, benchmarks: &[EliteBenchmark]) -> Self {
        Self {
            classification: classify(&signature),
            comparisons: compare_to_benchmarks(&signature, benchmarks),
            signature,
        }
    }

    pub fn to_text(&self) -> String {
        let s = &self.signature;
        let c = &self.classification;
        let mut out = format!("L2 signature: {}\n\n", s.player);
        out.push_str(&format!("  L2 trigger:       {:.2}x\n", s.l2_trigger));
        out.push_str(&format!("  Sandwich:         {}\n", if s.sandwich { "yes" } else { "no" }));
        out.push_str(&format!("  Opening ratio:    {:.2}x median\n", s.opening_ratio));
        out.push_str(&format!("  Middlegame ratio: {:.2}x median\n", s.middlegame_ratio));
        out.push_str(&format!("  Endgame ratio:    {:.2}x median\n", s.endgame_ratio));
        out.push_str(&format!(
            "  Think time p10/p25/median/p75/p90: {:.2}/{:.2}/{:.2}/{:.2}/{:.2}s\n",
            s.p10, s.p25, s.median, s.p75, s.p90
        ));
        out.push_str(&format!("  Bimodal index:    {:.1}x\n", s.bimodal_index));
        out.push_str(&format!("  CV:               {:.2}\n", s.coefficient_of_variation));
        out.push_str(&format!(
            "  Games used:       {} ({} skipped), {} moves\n",
            s.games_used, s.games_skipped, s.moves
        ));
        if let Some(rating) = s.mean_rating {
            out.push_str(&format!("  Mean rating:      {rating}\n"));
        }
        out.push_str(&format!(
            "\n  Category: {}\n  Style:    {}\n  {}\n",
            c.category.as_str(),
            c.style.as_str(),
            c.category.description()
        ));
        if let Some(closest) = self.comparisons.first() {
            out.push_str(&format!(
                "\n  Closest reference: {} ({:.0}% similar)\n",
                closest.name,
                closest.similarity * 100.0
            ));
            for cmp in &self.comparisons {
                out.push_str(&format!("    {}: {:.0}%\n", cmp.name, cmp.similarity * 100.0));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::records::ApiPlayer;

    /// A game where `thinks[i]` is the player's (white) think on own move i + 2.
    fn game(id: &str, thinks: &[f64]) -> ApiGame {
        let mut own = vec![60_000u64];
        for t in thinks {
            let last = *own.last().unwrap_or(&0);
            own.push(last - (t * 100.0).round() as u64);
        }
        let clocks = own.iter().flat_map(|c| [*c, 60_000]).collect();
        ApiGame {
            id: id.to_string(),
            speed: Some("rapid".to_string()),
            white: ApiPlayer { name: Some("Alice".to_string()), rating: Some(1800) },
            black: ApiPlayer { name: Some("bob".to_string()), rating: Some(1750) },
            clocks,
            evals: Vec::new(),
        }
    }

    fn phased_thinks(endgame: f64) -> Vec<f64> {
        // Own moves 1-8 fast, 9-25 slow, 26-30 at `endgame`.
        (1..=30)
            .map(|m| if m <= 8 { 2.0 } else if m <= 25 { 8.0 } else { endgame })
            .collect()
    }

    #[test]
    fn slow_middlegame_sets_the_trigger() {
        let games: Vec<_> = (0..3).map(|i| game(&format!("g{i}"), &phased_thinks(4.0))).collect();
        let sig = compute_signature(&games, "alice", 3).unwrap();
        assert_eq!(sig.games_used, 3);
        assert_eq!(sig.moves, 90);
        assert_eq!(sig.median, 8.0);
        assert_eq!(sig.l2_trigger, 4.0);
        assert_eq!(sig.opening_ratio, 0.25);
        assert_eq!(sig.middlegame_ratio, 1.0);
        assert_eq!(sig.endgame_ratio, 0.5);
        // Middlegame is not above the overall median.
        assert!(!sig.sandwich);
        assert_eq!(sig.mean_rating, Some(1800));
    }

    #[test]
    fn long_medium_endgame_makes_a_sandwich() {
        let thinks: Vec<f64> = (1..=40)
            .map(|m| if m <= 8 { 2.0 } else if m <= 25 { 8.0 } else { 5.0 })
            .collect();
        let sig = compute_signature(&[game("g", &thinks)], "alice", 1).unwrap();
        assert_eq!(sig.median, 5.0);
        assert_eq!(sig.opening_ratio, 0.4);
        assert_eq!(sig.middlegame_ratio, 1.6);
        assert!(sig.sandwich);
    }

    #[test]
    fn short_games_and_strangers_are_skipped() {
        let mut games = vec![game("short", &[3.0; 5])];
        games.push(game("long", &phased_thinks(4.0)));
        let sig = compute_signature(&games, "bob", 1);
        // Bob's clocks never move, so every think time is out of range.
        assert!(matches!(sig, Err(ProfileError::InsufficientData { .. })));

        let err = compute_signature(&games, "alice", 2).unwrap_err();
        assert!(matches!(err, ProfileError::InsufficientData { .. }));
        let ok = compute_signature(&games, "alice", 1).unwrap();
        assert_eq!(ok.games_skipped, 1);
    }

    #[test]
    fn out_of_range_thinks_are_dropped() {
        let mut thinks = phased_thinks(4.0);
        thinks[10] = 95.0;
        thinks[11] = 0.0;
        let sig = compute_signature(&[game("g", &thinks)], "alice", 1).unwrap();
        assert_eq!(sig.moves, 28);
    }
}

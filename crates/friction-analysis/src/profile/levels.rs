//! L1 / L2 / L3 blunder classification from analysed API games.
//!
//! L1 matches positive patterns, L2 scans for danger, L3 calculates. A
//! blunder played quickly from a safe position is an L1 error (wrong
//! pattern); played quickly while already worse it is an L2 error (danger
//! not sensed); played after a long think it is an L3 error (calculation
//! failed).

use serde::Serialize;

use super::records::ApiGame;

/// Eval drop, in centipawns, that makes a move a blunder.
const BLUNDER_DROP_CP: i32 = 150;
/// At or below this eval the mover is under threat.
const DANGER_CP: i32 = -100;
/// Thinks shorter than this are automatic.
const AUTOMATIC_SECONDS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorLevel {
    Ok,
    L1,
    L2,
    L3,
}

/// `eval_before` is from the mover's point of view.
pub fn classify_error(eval_before: i32, think_seconds: f64, is_blunder: bool) -> ErrorLevel {
    if !is_blunder {
        ErrorLevel::Ok
    } else if think_seconds >= AUTOMATIC_SECONDS {
        ErrorLevel::L3
    } else if eval_before <= DANGER_CP {
        ErrorLevel::L2
    } else {
        ErrorLevel::L1
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ErrorLevels {
    pub l1: usize,
    pub l2: usize,
    pub l3: usize,
    pub ok: usize,
    /// Games with server analysis that involve the player.
    pub games: usize,
}

impl ErrorLevels {
    fn record(&mut self, level: ErrorLevel) {
        match level {
            ErrorLevel::Ok => self.ok += 1,
            ErrorLevel::L1 => self.l1 += 1,
            ErrorLevel::L2 => self.l2 += 1,
            ErrorLevel::L3 => self.l3 += 1,
        }
    }

    pub fn blunders(&self) -> usize {
        self.l1 + self.l2 + self.l3
    }

    pub fn to_text(&self, player: &str) -> String {
        let total = self.blunders().max(1) as f64;
        let mut out = format!("Blunder levels: {player}\n\n");
        out.push_str(&format!(
            "  Games analysed:   {}, moves {}, blunders {}\n",
            self.games,
            self.blunders() + self.ok,
            self.blunders()
        ));
        for (label, n, meaning) in [
            ("L1", self.l1, "pattern mismatch"),
            ("L2", self.l2, "danger not sensed"),
            ("L3", self.l3, "calculation failed"),
        ] {
            out.push_str(&format!(
                "  {label}: {n:>5} ({:.1}%)  {meaning}\n",
                100.0 * n as f64 / total
            ));
        }
        out
    }
}

/// Classify every move `username` made in analysed games. A move needs the
/// eval before and after it and the mover's previous clock reading.
pub fn classify_player_errors(games: &[ApiGame], username: &str) -> ErrorLevels {
    let mut levels = ErrorLevels::default();
    for game in games.iter().filter(|g| !g.evals.is_empty()) {
        let Some(is_white) = game.color_of(username) else {
            continue;
        };
        levels.games += 1;
        let sign = if is_white { 1 } else { -1 };
        // Ply `i` (from 0) is white's when even.
        for i in (2..game.evals.len()).filter(|i| (i % 2 == 0) == is_white) {
            let (Some(before), Some(after)) = (game.evals[i - 1], game.evals[i]) else {
                continue;
            };
            let (Some(&prev_clock), Some(&clock)) = (game.clocks.get(i - 2), game.clocks.get(i)) else {
                continue;
            };
            let think = (prev_clock as f64 - clock as f64) / 100.0;
            let (before, after) = (sign * before, sign * after);
            levels.record(classify_error(before, think, before - after > BLUNDER_DROP_CP));
        }
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::records::ApiPlayer;

    #[test]
    fn classification_table() {
        assert_eq!(classify_error(50, 1.0, false), ErrorLevel::Ok);
        assert_eq!(classify_error(50, 2.0, true), ErrorLevel::L1);
        assert_eq!(classify_error(-100, 2.0, true), ErrorLevel::L2);
        assert_eq!(classify_error(-300, 5.0, true), ErrorLevel::L3);
        assert_eq!(classify_error(200, 30.0, true), ErrorLevel::L3);
    }

    fn game(evals: Vec<Option<i32>>, clocks: Vec<u64>) -> ApiGame {
        ApiGame {
            id: "g".to_string(),
            speed: Some("blitz".to_string()),
            white: ApiPlayer { name: Some("w".to_string()), rating: None },
            black: ApiPlayer { name: Some("b".to_string()), rating: None },
            clocks,
            evals,
        }
    }

    #[test]
    fn blunders_are_attributed_to_the_mover() {
        // Ply 2 (white) drops 300 after a 1s think from +20: L1.
        // Ply 3 (black) drops 160 for black after a 20s think: L3.
        // Ply 4 (white) drops 210 from -120 after 2s: L2.
        let evals = vec![Some(20), Some(20), Some(-280), Some(-120), Some(-330)];
        let clocks = vec![18_000, 18_000, 17_900, 16_000, 17_700];
        let g = game(evals, clocks);

        let white = classify_player_errors(std::slice::from_ref(&g), "W");
        assert_eq!((white.l1, white.l2, white.l3, white.ok), (1, 1, 0, 0));
        let black = classify_player_errors(std::slice::from_ref(&g), "b");
        assert_eq!((black.l1, black.l2, black.l3, black.ok), (0, 0, 1, 0));
        assert_eq!(black.games, 1);
    }

    #[test]
    fn unanalysed_games_and_mates_are_skipped() {
        let plain = game(Vec::new(), vec![100, 100, 90]);
        let mate = game(vec![Some(0), Some(0), None], vec![100, 100, 90]);
        let levels = classify_player_errors(&[plain, mate], "w");
        assert_eq!(levels.games, 1);
        assert_eq!(levels.blunders() + levels.ok, 0);
        assert!(levels.to_text("w").contains("L2:     0 (0.0%)"));
    }
}

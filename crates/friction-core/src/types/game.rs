//! Game record model: time controls, results, moves with clock data.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Base time plus per-move increment, both in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeControl {
    pub base_seconds: u32,
    pub increment_seconds: u32,
}

/// Speed class derived from the estimated game duration `base + 40 * inc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeControlCategory {
    UltraBullet,
    Bullet,
    Blitz,
    Rapid,
    Classical,
}

impl TimeControl {
    pub fn new(base_seconds: u32, increment_seconds: u32) -> Self {
        Self {
            base_seconds,
            increment_seconds,
        }
    }

    /// Parse a PGN `TimeControl` tag such as `600+5` or `300`.
    /// `-`, empty and unparseable values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw == "-" || raw == "?" {
            return None;
        }
        let (base, inc) = match raw.split_once('+') {
            Some((base, inc)) => (base, inc),
            None => (raw, "0"),
        };
        let base_seconds = base.trim().parse().ok()?;
        let increment_seconds = inc.trim().parse().ok()?;
        Some(Self::new(base_seconds, increment_seconds))
    }

    /// Estimated duration of one side's clock over a 40-move game.
    pub fn estimated_seconds(&self) -> u32 {
        self.base_seconds + 40 * self.increment_seconds
    }

    pub fn category(&self) -> TimeControlCategory {
        match self.estimated_seconds() {
            s if s < 29 => TimeControlCategory::UltraBullet,
            s if s < 179 => TimeControlCategory::Bullet,
            s if s < 479 => TimeControlCategory::Blitz,
            s if s < 1499 => TimeControlCategory::Rapid,
            _ => TimeControlCategory::Classical,
        }
    }

    /// True when the base time reaches `min_base_seconds`.
    pub fn is_at_least(&self, min_base_seconds: u32) -> bool {
        self.base_seconds >= min_base_seconds
    }
}

impl fmt::Display for TimeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.base_seconds, self.increment_seconds)
    }
}

/// PGN game termination marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    Unfinished,
}

impl GameResult {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "1-0" => Self::WhiteWins,
            "0-1" => Self::BlackWins,
            "1/2-1/2" => Self::Draw,
            _ => Self::Unfinished,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WhiteWins => "1-0",
            Self::BlackWins => "0-1",
            Self::Draw => "1/2-1/2",
            Self::Unfinished => "*",
        }
    }

    pub fn is_completed(&self) -> bool {
        !matches!(self, Self::Unfinished)
    }
}

/// Seconds spent on a move: the mover's previous clock minus the clock after
/// the move plus the increment, floored at zero.
pub fn compute_think_time(clock_before: f64, clock_after: f64, increment: f64) -> f64 {
    (clock_before - clock_after + increment).max(0.0)
}

/// A single half-move with the board states around it and its clock data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// 1-indexed half-move number.
    pub ply: u32,
    pub san: String,
    pub uci: String,
    pub fen_before: String,
    pub fen_after: String,
    pub clock_before: Option<f64>,
    pub clock_after: Option<f64>,
    pub think_time: Option<f64>,
    pub is_white: bool,
}

impl MoveRecord {
    /// 1-indexed full-move number of this ply.
    pub fn move_number(&self) -> u32 {
        self.ply.div_ceil(2)
    }
}

/// A parsed game with its metadata and ordered moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: String,
    pub white_rating: Option<u32>,
    pub black_rating: Option<u32>,
    pub time_control: Option<TimeControl>,
    pub result: GameResult,
    pub eco: String,
    pub date: String,
    pub termination: String,
    pub white_title: Option<String>,
    pub black_title: Option<String>,
    pub moves: Vec<MoveRecord>,
}

impl GameRecord {
    pub fn num_plies(&self) -> usize {
        self.moves.len()
    }

    /// Full moves, counting a trailing white move as one.
    pub fn num_full_moves(&self) -> usize {
        self.moves.len().div_ceil(2)
    }

    /// Fraction of moves carrying a post-move clock reading.
    pub fn clock_coverage(&self) -> f64 {
        if self.moves.is_empty() {
            return 0.0;
        }
        let with_clock = self.moves.iter().filter(|m| m.clock_after.is_some()).count();
        with_clock as f64 / self.moves.len() as f64
    }

    /// Rating of the side making a move.
    pub fn rating_for(&self, is_white: bool) -> Option<u32> {
        if is_white {
            self.white_rating
        } else {
            self.black_rating
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_base_and_increment() {
        let tc = TimeControl::parse("600+5").unwrap();
        assert_eq!(tc.base_seconds, 600);
        assert_eq!(tc.increment_seconds, 5);
        assert_eq!(tc.to_string(), "600+5");
    }

    #[test]
    fn base_only_has_zero_increment() {
        assert_eq!(TimeControl::parse("300"), Some(TimeControl::new(300, 0)));
    }

    #[test]
    fn dash_and_garbage_are_absent() {
        assert_eq!(TimeControl::parse("-"), None);
        assert_eq!(TimeControl::parse(""), None);
        assert_eq!(TimeControl::parse("ten+five"), None);
        assert_eq!(TimeControl::parse("1/3600"), None);
    }

    #[test]
    fn categories_follow_estimated_duration() {
        assert_eq!(TimeControl::new(15, 0).category(), TimeControlCategory::UltraBullet);
        assert_eq!(TimeControl::new(60, 0).category(), TimeControlCategory::Bullet);
        assert_eq!(TimeControl::new(180, 2).category(), TimeControlCategory::Blitz);
        assert_eq!(TimeControl::new(600, 5).category(), TimeControlCategory::Rapid);
        assert_eq!(TimeControl::new(1800, 0).category(), TimeControlCategory::Classical);
        assert!(TimeControl::new(600, 0).is_at_least(600));
        assert!(!TimeControl::new(300, 3).is_at_least(600));
    }

    #[test]
    fn think_time_is_floored_at_zero() {
        assert_eq!(compute_think_time(600.0, 606.0, 5.0), 0.0);
        assert_eq!(compute_think_time(600.0, 590.0, 5.0), 15.0);
    }

    #[test]
    fn results() {
        assert_eq!(GameResult::parse("1/2-1/2"), GameResult::Draw);
        assert!(!GameResult::parse("*").is_completed());
        assert_eq!(GameResult::parse("0-1").as_str(), "0-1");
    }

    #[test]
    fn move_numbers() {
        let mv = |ply| MoveRecord {
            ply,
            san: String::new(),
            uci: String::new(),
            fen_before: String::new(),
            fen_after: String::new(),
            clock_before: None,
            clock_after: None,
            think_time: None,
            is_white: ply % 2 == 1,
        };
        assert_eq!(mv(1).move_number(), 1);
        assert_eq!(mv(2).move_number(), 1);
        assert_eq!(mv(3).move_number(), 2);
    }
}

//! Replays raw games on a board and yields filtered `GameRecord`s.

use std::io::BufRead;
use std::path::Path;

use friction_core::errors::ParseError;
use friction_core::types::{compute_think_time, GameRecord, GameResult, MoveRecord, TimeControl};
use rustc_hash::FxHashMap;

use super::clock::extract_clock;
use super::filters::{FilterCriteria, RejectionReason};
use super::lexer::{tokenize, Token};
use super::reader::{open_archive, GameChunks, RawGame};
use crate::chess::{Board, ChessError};

/// Running counters for one parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub parsed: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub malformed: usize,
    pub rejections: FxHashMap<RejectionReason, usize>,
}

impl ParseStats {
    pub fn acceptance_rate(&self) -> f64 {
        if self.parsed == 0 {
            0.0
        } else {
            self.accepted as f64 / self.parsed as f64
        }
    }

    /// Rejection counts ordered by reason.
    pub fn rejections_sorted(&self) -> Vec<(RejectionReason, usize)> {
        let mut out: Vec<_> = self.rejections.iter().map(|(r, n)| (*r, *n)).collect();
        out.sort();
        out
    }
}

/// Streams accepted games out of PGN archives.
#[derive(Debug, Default)]
pub struct PgnParser {
    criteria: FilterCriteria,
    stats: ParseStats,
}

impl PgnParser {
    pub fn new(criteria: FilterCriteria) -> Self {
        Self {
            criteria,
            stats: ParseStats::default(),
        }
    }

    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Lazily parse games from any buffered reader. The stream is consumed
    /// once; counters accumulate on the parser.
    pub fn parse_reader<R: BufRead>(&mut self, reader: R) -> GameStream<'_, R> {
        GameStream {
            parser: self,
            chunks: GameChunks::new(reader),
            error: None,
        }
    }

    pub fn parse_path(&mut self, path: &Path) -> Result<GameStream<'_, Box<dyn BufRead>>, ParseError> {
        let reader = open_archive(path)?;
        tracing::info!(path = %path.display(), "streaming games");
        Ok(self.parse_reader(reader))
    }

    /// Decode one raw game without applying filters.
    pub fn decode_game(raw: &RawGame) -> Result<GameRecord, ParseError> {
        let game_id = game_id_for(raw);
        let time_control = raw.tag("TimeControl").and_then(TimeControl::parse);

        let tokens = tokenize(&raw.movetext).map_err(|message| ParseError::Malformed {
            game: game_id.clone(),
            message,
        })?;

        let mut board = match raw.tag("FEN") {
            Some(fen) => Board::from_fen(fen).map_err(|e| ParseError::InvalidFen {
                fen: fen.to_string(),
                message: e.to_string(),
            })?,
            None => Board::starting(),
        };

        let mut pending: Vec<PendingMove> = Vec::new();
        let mut result_token = None;
        for token in tokens {
            match token {
                Token::San(san) => {
                    let ply = pending.len() as u32 + 1;
                    let fen_before = board.fen();
                    let is_white = board.white_to_move();
                    let played = board.play_san(san).map_err(|e| match e {
                        ChessError::InvalidFen { fen, message } => ParseError::InvalidFen { fen, message },
                        _ => ParseError::IllegalMove {
                            game: game_id.clone(),
                            ply,
                            san: san.to_string(),
                        },
                    })?;
                    pending.push(PendingMove {
                        san: played.san,
                        uci: played.uci,
                        fen_before,
                        fen_after: board.fen(),
                        is_white,
                        clock_after: None,
                    });
                }
                Token::Comment(text) => {
                    if let Some(last) = pending.last_mut() {
                        if last.clock_after.is_none() {
                            last.clock_after = extract_clock(text);
                        }
                    }
                }
                Token::Result(r) => result_token = Some(r),
                Token::MoveNumber(_) | Token::Nag(_) => {}
            }
        }

        let result = raw
            .tag("Result")
            .or(result_token)
            .map_or(GameResult::Unfinished, GameResult::parse);

        Ok(GameRecord {
            game_id,
            white_rating: parse_rating(raw.tag("WhiteElo")),
            black_rating: parse_rating(raw.tag("BlackElo")),
            time_control,
            result,
            eco: raw.tag("ECO").unwrap_or_default().to_string(),
            date: raw
                .tag("UTCDate")
                .or_else(|| raw.tag("Date"))
                .unwrap_or_default()
                .to_string(),
            termination: raw.tag("Termination").unwrap_or_default().to_string(),
            white_title: raw.tag("WhiteTitle").map(str::to_string),
            black_title: raw.tag("BlackTitle").map(str::to_string),
            moves: attach_clocks(pending, time_control),
        })
    }

    fn handle(&mut self, raw: RawGame) -> Option<GameRecord> {
        self.stats.parsed += 1;
        let game = match Self::decode_game(&raw) {
            Ok(game) => game,
            Err(e) => {
                self.stats.malformed += 1;
                tracing::warn!(index = raw.index, error = %e, "skipping malformed game");
                return None;
            }
        };
        match self.criteria.check(&game) {
            Ok(()) => {
                self.stats.accepted += 1;
                Some(game)
            }
            Err(reason) => {
                self.stats.rejected += 1;
                *self.stats.rejections.entry(reason).or_default() += 1;
                tracing::debug!(game_id = %game.game_id, reason = reason.as_str(), "game rejected");
                None
            }
        }
    }
}

/// Pull-based iterator over accepted games.
///
/// An I/O failure ends the stream; `finish` reports it.
pub struct GameStream<'p, R> {
    parser: &'p mut PgnParser,
    chunks: GameChunks<R>,
    error: Option<ParseError>,
}

impl<R: BufRead> GameStream<'_, R> {
    pub fn stats(&self) -> &ParseStats {
        &self.parser.stats
    }

    /// Surface an archive-level error that stopped the stream early.
    pub fn finish(self) -> Result<(), ParseError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<R: BufRead> Iterator for GameStream<'_, R> {
    type Item = GameRecord;

    fn next(&mut self) -> Option<GameRecord> {
        loop {
            match self.chunks.next()? {
                Ok(raw) => {
                    if let Some(game) = self.parser.handle(raw) {
                        return Some(game);
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "archive read failed");
                    self.error = Some(e);
                    return None;
                }
            }
        }
    }
}

struct PendingMove {
    san: String,
    uci: String,
    fen_before: String,
    fen_after: String,
    is_white: bool,
    clock_after: Option<f64>,
}

/// Derive clock_before and think time per side. Each side's clock starts
/// at the base time; a move without a clock reading leaves it unchanged.
fn attach_clocks(pending: Vec<PendingMove>, time_control: Option<TimeControl>) -> Vec<MoveRecord> {
    let base = time_control.map(|tc| f64::from(tc.base_seconds));
    let increment = time_control.map_or(0.0, |tc| f64::from(tc.increment_seconds));
    let mut last_clock = [base, base];

    pending
        .into_iter()
        .enumerate()
        .map(|(i, mv)| {
            let side = usize::from(!mv.is_white);
            let (clock_before, think_time) = match mv.clock_after {
                Some(after) => {
                    let before = last_clock[side].replace(after);
                    (before, before.map(|b| compute_think_time(b, after, increment)))
                }
                None => (None, None),
            };
            MoveRecord {
                ply: i as u32 + 1,
                san: mv.san,
                uci: mv.uci,
                fen_before: mv.fen_before,
                fen_after: mv.fen_after,
                clock_before,
                clock_after: mv.clock_after,
                think_time,
                is_white: mv.is_white,
            }
        })
        .collect()
}

/// Last path segment of a lichess `Site` URL, else the `Event` tag.
fn game_id_for(raw: &RawGame) -> String {
    if let Some(site) = raw.tag("Site").filter(|s| s.contains("lichess.org")) {
        if let Some(id) = site.trim_end_matches('/').rsplit('/').next().filter(|s| !s.is_empty()) {
            return id.to_string();
        }
    }
    match raw.tag("Event").filter(|e| !e.is_empty() && *e != "?") {
        Some(event) => event.to_string(),
        None => format!("game-{}", raw.index),
    }
}

/// Ratings of 0, `?` or garbage are treated as missing.
fn parse_rating(raw: Option<&str>) -> Option<u32> {
    raw?.trim().parse().ok().filter(|r| *r > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(tags: &[(&str, &str)], movetext: &str) -> RawGame {
        RawGame {
            index: 7,
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            movetext: movetext.to_string(),
        }
    }

    #[test]
    fn increment_can_make_think_time_zero() {
        let game = PgnParser::decode_game(&raw(
            &[("TimeControl", "600+5")],
            "1. e4 { [%clk 0:10:06] } e5 { [%clk 0:09:50] } 2. Nf3 { [%clk 0:10:01] } *",
        ))
        .unwrap();
        let white = &game.moves[0];
        assert_eq!(white.clock_before, Some(600.0));
        assert_eq!(white.think_time, Some(0.0));
        let black = &game.moves[1];
        assert_eq!(black.think_time, Some(15.0));
        let second = &game.moves[2];
        assert_eq!(second.clock_before, Some(606.0));
        assert_eq!(second.think_time, Some(10.0));
    }

    #[test]
    fn missing_clock_does_not_advance_state() {
        let game = PgnParser::decode_game(&raw(
            &[("TimeControl", "300+0")],
            "1. e4 { [%clk 0:04:58] } e5 2. Nf3 e6 3. Bc4 { [%clk 0:04:50] } *",
        ))
        .unwrap();
        assert_eq!(game.moves[1].clock_before, None);
        assert_eq!(game.moves[1].think_time, None);
        // Nf3 had no clock either, so Bc4 compares against e4's reading.
        assert_eq!(game.moves[4].clock_before, Some(298.0));
        assert_eq!(game.moves[4].think_time, Some(8.0));
    }

    #[test]
    fn metadata_and_ids() {
        let game = PgnParser::decode_game(&raw(
            &[
                ("Event", "Rated Rapid game"),
                ("Site", "https://lichess.org/Xy12AbCd"),
                ("WhiteElo", "1732"),
                ("BlackElo", "0"),
                ("Result", "0-1"),
                ("ECO", "B01"),
                ("UTCDate", "2024.03.01"),
                ("BlackTitle", "FM"),
            ],
            "1. e4 d5 0-1",
        ))
        .unwrap();
        assert_eq!(game.game_id, "Xy12AbCd");
        assert_eq!(game.white_rating, Some(1732));
        assert_eq!(game.black_rating, None);
        assert_eq!(game.result, GameResult::BlackWins);
        assert_eq!(game.eco, "B01");
        assert_eq!(game.date, "2024.03.01");
        assert_eq!(game.black_title.as_deref(), Some("FM"));
        assert_eq!(game.moves[1].uci, "d7d5");
        assert!(!game.moves[1].is_white);
    }

    #[test]
    fn id_falls_back_to_event_then_index() {
        let by_event = PgnParser::decode_game(&raw(&[("Event", "Club 2024"), ("Site", "?")], "*")).unwrap();
        assert_eq!(by_event.game_id, "Club 2024");
        let by_index = PgnParser::decode_game(&raw(&[], "*")).unwrap();
        assert_eq!(by_index.game_id, "game-7");
    }

    #[test]
    fn result_token_used_without_tag() {
        let game = PgnParser::decode_game(&raw(&[], "1. e4 e5 1/2-1/2")).unwrap();
        assert_eq!(game.result, GameResult::Draw);
    }

    #[test]
    fn illegal_move_reports_ply() {
        let err = PgnParser::decode_game(&raw(&[("Event", "x")], "1. e4 e5 2. Ke3 *")).unwrap_err();
        match err {
            ParseError::IllegalMove { ply, san, .. } => {
                assert_eq!(ply, 3);
                assert_eq!(san, "Ke3");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn starts_from_fen_tag() {
        let game = PgnParser::decode_game(&raw(
            &[("FEN", "4k3/8/8/8/8/8/4P3/4K3 b - - 0 40"), ("SetUp", "1")],
            "40... Kd7 41. e4 *",
        ))
        .unwrap();
        assert!(!game.moves[0].is_white);
        assert_eq!(game.moves[0].ply, 1);
        assert_eq!(game.moves[1].uci, "e2e4");
    }

    #[test]
    fn stream_counts_malformed_and_rejected() {
        let pgn = "[Event \"a\"]\n\n1. e4 e5 2. Ke3 *\n\n[Event \"b\"]\n[TimeControl \"60+0\"]\n\n1. e4 e5 1-0\n";
        let mut parser = PgnParser::new(FilterCriteria::default());
        let accepted: Vec<_> = parser.parse_reader(pgn.as_bytes()).collect();
        assert!(accepted.is_empty());
        let stats = parser.stats();
        assert_eq!(stats.parsed, 2);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(
            stats.rejections_sorted(),
            vec![(RejectionReason::TimeControlTooShort, 1)]
        );
        assert_eq!(stats.acceptance_rate(), 0.0);
    }
}

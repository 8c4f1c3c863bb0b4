//! Typed API game records, validated at the boundary.

use std::io::BufRead;

use friction_core::errors::ProfileError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct WireGame {
    id: Option<String>,
    speed: Option<String>,
    players: Option<WirePlayers>,
    clocks: Option<Vec<u64>>,
    analysis: Option<Vec<WireEval>>,
}

#[derive(Debug, Deserialize)]
struct WireEval {
    eval: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct WirePlayers {
    white: Option<WirePlayer>,
    black: Option<WirePlayer>,
}

#[derive(Debug, Default, Deserialize)]
struct WirePlayer {
    user: Option<WireUser>,
    rating: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    name: Option<String>,
    id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPlayer {
    /// Display name; absent for anonymous and AI opponents.
    pub name: Option<String>,
    pub rating: Option<u32>,
}

impl ApiPlayer {
    pub fn is(&self, username: &str) -> bool {
        self.name
            .as_deref()
            .is_some_and(|n| n.eq_ignore_ascii_case(username))
    }
}

/// A validated game export with clock data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiGame {
    pub id: String,
    pub speed: Option<String>,
    pub white: ApiPlayer,
    pub black: ApiPlayer,
    /// Remaining time after each ply, in centiseconds.
    pub clocks: Vec<u64>,
    /// Server analysis after each ply in centipawns, white's view. Empty
    /// for unanalysed games; `None` for mate scores.
    pub evals: Vec<Option<i32>>,
}

impl ApiGame {
    pub fn parse_line(line_no: usize, text: &str) -> Result<Self, ProfileError> {
        let wire: WireGame = serde_json::from_str(text).map_err(|e| ProfileError::Json {
            line: line_no,
            message: e.to_string(),
        })?;

        let id = wire.id.ok_or(ProfileError::MissingField { field: "id" })?;
        let players = wire.players.ok_or(ProfileError::MissingField { field: "players" })?;
        let white = players.white.ok_or(ProfileError::MissingField { field: "players.white" })?;
        let black = players.black.ok_or(ProfileError::MissingField { field: "players.black" })?;
        let clocks = wire
            .clocks
            .filter(|c| c.len() >= 2)
            .ok_or(ProfileError::MissingField { field: "clocks" })?;

        let convert = |p: WirePlayer| ApiPlayer {
            name: p.user.and_then(|u| u.name.or(u.id)),
            rating: p.rating,
        };
        Ok(Self {
            id,
            speed: wire.speed,
            white: convert(white),
            black: convert(black),
            clocks,
            evals: wire
                .analysis
                .map(|a| a.into_iter().map(|e| e.eval).collect())
                .unwrap_or_default(),
        })
    }

    /// `Some(true)` when `username` played white.
    pub fn color_of(&self, username: &str) -> Option<bool> {
        if self.white.is(username) {
            Some(true)
        } else if self.black.is(username) {
            Some(false)
        } else {
            None
        }
    }

    /// The player's own clock readings in seconds.
    pub fn own_clocks(&self, is_white: bool) -> Vec<f64> {
        self.clocks
            .iter()
            .skip(usize::from(!is_white))
            .step_by(2)
            .map(|cs| *cs as f64 / 100.0)
            .collect()
    }
}

/// Games read from an NDJSON export.
#[derive(Debug, Default)]
pub struct ApiBatch {
    pub games: Vec<ApiGame>,
    pub rejected: usize,
}

/// Read one game per line. Blank lines are skipped; invalid records are
/// logged and counted.
pub fn read_ndjson<R: BufRead>(reader: R) -> std::io::Result<ApiBatch> {
    let mut batch = ApiBatch::default();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match ApiGame::parse_line(i + 1, &line) {
            Ok(game) => batch.games.push(game),
            Err(e) => {
                batch.rejected += 1;
                tracing::warn!(line = i + 1, error = %e, "rejected game record");
            }
        }
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAME: &str = r#"{"id":"q7ZvsdUF","rated":true,"speed":"blitz","players":{"white":{"user":{"name":"Alice","id":"alice"},"rating":1712},"black":{"user":{"name":"bob","id":"bob"},"rating":1690}},"clocks":[18003,18003,17803,17552]}"#;

    #[test]
    fn parses_valid_record() {
        let game = ApiGame::parse_line(1, GAME).unwrap();
        assert_eq!(game.id, "q7ZvsdUF");
        assert_eq!(game.color_of("alice"), Some(true));
        assert_eq!(game.color_of("BOB"), Some(false));
        assert_eq!(game.color_of("carol"), None);
        assert_eq!(game.own_clocks(false), vec![180.03, 175.52]);
        assert_eq!(game.white.rating, Some(1712));
        assert!(game.evals.is_empty());
    }

    #[test]
    fn analysis_evals_keep_mates_as_gaps() {
        let line = r#"{"id":"a1","players":{"white":{"user":{"name":"a"}},"black":{"user":{"name":"b"}}},"clocks":[100,100],"analysis":[{"eval":18},{"eval":-35},{"mate":2}]}"#;
        let game = ApiGame::parse_line(1, line).unwrap();
        assert_eq!(game.evals, vec![Some(18), Some(-35), None]);
    }

    #[test]
    fn missing_clocks_rejected() {
        let err = ApiGame::parse_line(3, r#"{"id":"x","players":{"white":{},"black":{}}}"#).unwrap_err();
        assert!(matches!(err, ProfileError::MissingField { field: "clocks" }));
    }

    #[test]
    fn batch_counts_bad_lines() {
        let text = format!("{GAME}\n\nnot json\n{{\"id\":\"y\"}}\n");
        let batch = read_ndjson(text.as_bytes()).unwrap();
        assert_eq!(batch.games.len(), 1);
        assert_eq!(batch.rejected, 2);
    }
}

//! End-to-end phases against an in-memory store and a scripted engine.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use friction_analysis::engine::{AnalysisBackend, EngineLauncher, PvLine};
use friction_analysis::pgn::{FilterCriteria, PgnParser};
use friction_analysis::pipeline::{
    quick_scan_reader, run_analyze, run_evaluate, run_parse_reader, run_triggers,
};
use friction_core::config::FrictionConfig;
use friction_core::errors::{EngineError, PipelineError};
use friction_core::traits::{Cancellable, CancellationToken};
use friction_core::types::EngineScore;
use friction_storage::queries::{friction, games, stats};
use friction_storage::DatabaseManager;

const SANS: [&str; 24] = [
    "e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "Ba4", "Nf6", "O-O", "Be7", "Re1", "b5", "Bb3", "d6", "c3",
    "O-O", "h3", "Nb8", "d4", "Nbd7", "c4", "c6", "cxb5", "axb5",
];

/// Queen's Gambit Declined, Capablanca's freeing line.
const QGD_SANS: [&str; 24] = [
    "d4", "d5", "c4", "e6", "Nc3", "Nf6", "Bg5", "Be7", "e3", "O-O", "Nf3", "Nbd7", "Rc1", "c6", "Bd3",
    "dxc4", "Bxc4", "Nd5", "Bxe7", "Qxe7", "O-O", "Nxc3", "Rxc3", "e5",
];

/// A Ruy Lopez with clock comments on every move.
fn ruy_lopez(site_id: &str, time_control: &str) -> String {
    scored_game(site_id, time_control, &SANS)
}

fn queens_gambit(site_id: &str) -> String {
    scored_game(site_id, "600+0", &QGD_SANS)
}

fn scored_game(site_id: &str, time_control: &str, sans: &[&str]) -> String {
    let mut clocks = [600u32, 600u32];
    let mut movetext = String::new();
    for (i, san) in sans.iter().enumerate() {
        let side = i % 2;
        let own_move = (i / 2 + 1) as u32;
        let think = if side == 0 { 3 + (own_move % 4) * 2 } else { 4 + (own_move % 3) * 3 };
        clocks[side] -= think;
        if side == 0 {
            movetext.push_str(&format!("{own_move}. "));
        }
        let clock = clocks[side];
        movetext.push_str(&format!("{san} {{ [%clk 0:{:02}:{:02}] }} ", clock / 60, clock % 60));
    }
    movetext.push_str("1-0");
    format!(
        "[Event \"Rated Rapid game\"]\n[Site \"https://lichess.org/{site_id}\"]\n[WhiteElo \"1600\"]\n\
         [BlackElo \"1550\"]\n[TimeControl \"{time_control}\"]\n[Result \"1-0\"]\n\
         [Termination \"Normal\"]\n\n{movetext}\n\n"
    )
}

fn config() -> FrictionConfig {
    let mut config = FrictionConfig::default();
    config.filters.min_moves = Some(10);
    config.engine.skip_opening_moves = Some(2);
    config
}

/// Engine that always ranks the played move first, except in positions
/// marked as blunders where it comes third and 340cp worse.
#[derive(Default)]
struct Script {
    played: HashMap<String, String>,
    blunders: HashSet<String>,
    /// Positions whose analysis dies with the engine.
    failing: HashSet<String>,
    /// Launches allowed before the binary "disappears".
    max_launches: Option<u32>,
    /// Cancelled when an analysis fails, like a Ctrl-C reaching both.
    interrupt: Option<CancellationToken>,
    launches: Cell<u32>,
    analyses: Cell<u32>,
}

impl Script {
    fn for_archive(pgn: &str, blunder_plies: &[u32]) -> Rc<Self> {
        Rc::new(Self::scripted(pgn, blunder_plies, &[]))
    }

    /// `failing` lists `(game_id, ply)` positions the engine dies on.
    fn scripted(pgn: &str, blunder_plies: &[u32], failing: &[(&str, u32)]) -> Self {
        let mut parser = PgnParser::new(FilterCriteria::from(&config().filters));
        let mut script = Script::default();
        for game in parser.parse_reader(pgn.as_bytes()) {
            for mv in &game.moves {
                script.played.insert(mv.fen_before.clone(), mv.uci.clone());
                if blunder_plies.contains(&mv.ply) {
                    script.blunders.insert(mv.fen_before.clone());
                }
                if failing.contains(&(game.game_id.as_str(), mv.ply)) {
                    script.failing.insert(mv.fen_before.clone());
                }
            }
        }
        script
    }
}

struct ScriptedLauncher(Rc<Script>);
struct ScriptedEngine(Rc<Script>);

impl EngineLauncher for ScriptedLauncher {
    type Backend = ScriptedEngine;

    fn launch(&self) -> Result<ScriptedEngine, EngineError> {
        if self.0.max_launches.is_some_and(|max| self.0.launches.get() >= max) {
            return Err(EngineError::StartFailed {
                path: "/usr/games/stockfish".to_string(),
                message: "No such file or directory".to_string(),
            });
        }
        self.0.launches.set(self.0.launches.get() + 1);
        Ok(ScriptedEngine(Rc::clone(&self.0)))
    }
}

impl AnalysisBackend for ScriptedEngine {
    fn analyse(&mut self, fen: &str, depth: u32, _multipv: u32) -> Result<Vec<PvLine>, EngineError> {
        self.0.analyses.set(self.0.analyses.get() + 1);
        if self.0.failing.contains(fen) {
            if let Some(token) = &self.0.interrupt {
                token.cancel();
            }
            return Err(EngineError::Terminated);
        }
        let played = self.0.played.get(fen).cloned().ok_or(EngineError::Protocol {
            message: format!("unexpected position {fen}"),
        })?;
        let line = |multipv, cp, uci: &str| PvLine {
            multipv,
            depth,
            score: EngineScore::Centipawns(cp),
            moves: vec![uci.to_string()],
        };
        Ok(if self.0.blunders.contains(fen) {
            vec![line(1, 40, "a2a3"), line(2, 0, "h2h4"), line(3, -300, &played)]
        } else {
            vec![line(1, 25, &played), line(2, 10, "a2a3"), line(3, -200, "h2h4")]
        })
    }

    fn shutdown(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}

struct BrokenLauncher;

impl EngineLauncher for BrokenLauncher {
    type Backend = ScriptedEngine;

    fn launch(&self) -> Result<ScriptedEngine, EngineError> {
        Err(EngineError::StartFailed {
            path: "/nonexistent/stockfish".to_string(),
            message: "No such file or directory".to_string(),
        })
    }
}

#[test]
fn parse_stores_accepted_games_once() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let archive = format!("{}{}", ruy_lopez("abcd1234", "600+0"), ruy_lopez("bullet01", "60+0"));
    let token = CancellationToken::new();

    let first = run_parse_reader(&db, &config(), archive.as_bytes(), None, &token).unwrap();
    assert!(first.is_clean());
    assert_eq!(first.data.parsed, 2);
    assert_eq!(first.data.accepted, 1);
    assert_eq!(first.data.stored, 1);
    assert_eq!(first.data.rejections, vec![("time_control_too_short".to_string(), 1)]);

    let second = run_parse_reader(&db, &config(), archive.as_bytes(), None, &token).unwrap();
    assert_eq!(second.data.stored, 0);
    assert_eq!(second.data.duplicates, 1);

    let game = db.with_conn(|c| games::get_game(c, "abcd1234")).unwrap().unwrap();
    assert_eq!(game.moves.len(), 24);
    assert_eq!(game.white_rating, Some(1600));
    // White's first think: 3 + 1 * 2 seconds.
    assert_eq!(game.moves[0].think_time, Some(5.0));
}

#[test]
fn parse_honours_limit_and_cancellation() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let archive = format!("{}{}", ruy_lopez("game0001", "600+0"), ruy_lopez("game0002", "900+10"));

    let limited = run_parse_reader(&db, &config(), archive.as_bytes(), Some(1), &CancellationToken::new()).unwrap();
    assert_eq!(limited.data.stored, 1);
    assert!(!limited.cancelled);

    let token = CancellationToken::new();
    token.cancel();
    let cancelled = run_parse_reader(&db, &config(), archive.as_bytes(), None, &token).unwrap();
    assert!(cancelled.cancelled);
    assert_eq!(cancelled.data.parsed, 0);
    assert_eq!(db.with_conn(games::count).unwrap(), 1);
}

#[test]
fn full_pipeline_produces_records_triggers_and_report() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let token = CancellationToken::new();
    let cfg = config();
    let archive = ruy_lopez("abcd1234", "600+0");
    let script = Script::for_archive(&archive, &[13, 18]);

    run_parse_reader(&db, &cfg, archive.as_bytes(), None, &token).unwrap();
    let evaluated = run_evaluate(&db, &cfg, ScriptedLauncher(Rc::clone(&script)), None, &token).unwrap();
    assert!(evaluated.is_clean());
    assert_eq!(evaluated.data.games_analyzed, 1);
    // Plies 1-4 are skipped as opening.
    assert_eq!(evaluated.data.moves_analyzed, 20);
    assert_eq!(evaluated.data.engine_calls, 20);
    assert_eq!(script.launches.get(), 1);

    let records = db.with_conn(|c| friction::for_game(c, "abcd1234")).unwrap();
    assert_eq!(records.len(), 20);
    assert_eq!(records[0].ply, 5);
    assert_eq!(records[0].player_rating, Some(1600));
    assert_eq!(records[1].player_rating, Some(1550));
    let blunders: Vec<u32> = records.iter().filter(|r| r.is_blunder()).map(|r| r.ply).collect();
    assert_eq!(blunders, vec![13, 18]);
    assert!(records.iter().filter(|r| !r.is_blunder()).all(|r| r.was_best_move && r.eval_drop == 0.0));

    // Nothing left to do on a second run.
    let again = run_evaluate(&db, &cfg, ScriptedLauncher(Rc::clone(&script)), None, &token).unwrap();
    assert_eq!(again.data.games_pending, 0);
    assert_eq!(script.analyses.get(), 20);

    let triggers = run_triggers(&db, &cfg, &token).unwrap();
    assert!(triggers.is_clean());
    assert_eq!(triggers.data.games, 1);
    assert_eq!(triggers.data.rows, 20);
    assert_eq!(triggers.data.lookup_failures, 0);

    let out = tempfile::tempdir().unwrap();
    let analyzed = run_analyze(&db, &cfg, Some(out.path())).unwrap();
    assert_eq!(analyzed.data.records, 20);
    assert_eq!(analyzed.data.trigger_rows, 20);
    let report = std::fs::read_to_string(out.path().join("friction_report.md")).unwrap();
    assert!(report.starts_with("# Friction Analysis Report"));
    assert!(report.contains("- Blunders identified: 2"));
    assert!(report.contains("## L2 Trigger Analysis"));
    let csv = std::fs::read_to_string(out.path().join("friction_data.csv")).unwrap();
    assert_eq!(csv.lines().count(), 21);
    assert!(csv.lines().next().unwrap().starts_with("game_id,ply,"));

    let counts = db.with_conn(stats::table_counts).unwrap();
    assert_eq!(counts.friction_records, 20);
    assert_eq!(counts.evaluations, 20);
    assert_eq!(counts.blunders, 2);
}

#[test]
fn stored_evaluations_spare_the_engine() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let token = CancellationToken::new();
    let cfg = config();
    let first = ruy_lopez("first001", "600+0");
    let script = Script::for_archive(&first, &[]);

    run_parse_reader(&db, &cfg, first.as_bytes(), None, &token).unwrap();
    run_evaluate(&db, &cfg, ScriptedLauncher(Rc::clone(&script)), None, &token).unwrap();

    // Same moves under another id: every position is already stored.
    let second = ruy_lopez("second01", "600+0");
    run_parse_reader(&db, &cfg, second.as_bytes(), None, &token).unwrap();
    let fresh = Script::for_archive(&second, &[]);
    let result = run_evaluate(&db, &cfg, ScriptedLauncher(Rc::clone(&fresh)), None, &token).unwrap();
    assert_eq!(result.data.store_hits, 20);
    assert_eq!(result.data.engine_calls, 0);
    assert_eq!(fresh.launches.get(), 0);
}

#[test]
fn engine_that_cannot_start_aborts_and_leaves_games_pending() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let token = CancellationToken::new();
    let cfg = config();
    run_parse_reader(&db, &cfg, ruy_lopez("abcd1234", "600+0").as_bytes(), None, &token).unwrap();

    let result = run_evaluate(&db, &cfg, BrokenLauncher, None, &token).unwrap();
    assert!(result.data.aborted);
    assert_eq!(result.data.games_analyzed, 0);
    assert!(matches!(
        result.errors.last(),
        Some(PipelineError::Engine(EngineError::StartFailed { .. }))
    ));
    let pending = db.with_conn(|c| games::games_needing_analysis(c, None)).unwrap();
    assert_eq!(pending.len(), 1);
}

#[test]
fn engine_lost_mid_run_keeps_committed_games_and_counts() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let token = CancellationToken::new();
    let cfg = config();
    let archive = format!("{}{}", ruy_lopez("aaaa0001", "600+0"), queens_gambit("bbbb0002"));
    run_parse_reader(&db, &cfg, archive.as_bytes(), None, &token).unwrap();

    let mut script = Script::scripted(&archive, &[], &[("bbbb0002", 22)]);
    script.max_launches = Some(1);
    let script = Rc::new(script);
    let result = run_evaluate(&db, &cfg, ScriptedLauncher(Rc::clone(&script)), None, &token).unwrap();

    assert!(result.data.aborted);
    assert!(!result.cancelled);
    assert_eq!(result.data.games_pending, 2);
    assert_eq!(result.data.games_analyzed, 1);
    assert_eq!(result.data.moves_analyzed, 20);
    assert_eq!(result.data.engine_failures, 1);
    assert!(matches!(
        result.errors.last(),
        Some(PipelineError::Engine(EngineError::StartFailed { .. }))
    ));

    assert_eq!(db.with_conn(|c| friction::for_game(c, "aaaa0001")).unwrap().len(), 20);
    assert!(db.with_conn(|c| friction::for_game(c, "bbbb0002")).unwrap().is_empty());
    let pending = db.with_conn(|c| games::games_needing_analysis(c, None)).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].game_id, "bbbb0002");
}

#[test]
fn interrupted_engine_failure_leaves_the_game_pending() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let token = CancellationToken::new();
    let cfg = config();
    let archive = ruy_lopez("abcd1234", "600+0");
    run_parse_reader(&db, &cfg, archive.as_bytes(), None, &token).unwrap();

    let mut script = Script::scripted(&archive, &[], &[("abcd1234", 10)]);
    script.interrupt = Some(token.clone());
    let script = Rc::new(script);
    let interrupted = run_evaluate(&db, &cfg, ScriptedLauncher(Rc::clone(&script)), None, &token).unwrap();

    assert!(interrupted.cancelled);
    assert!(!interrupted.data.aborted);
    assert_eq!(interrupted.data.games_deferred, 1);
    assert_eq!(interrupted.data.games_analyzed, 0);
    assert!(db.with_conn(|c| friction::for_game(c, "abcd1234")).unwrap().is_empty());
    assert_eq!(db.with_conn(|c| games::games_needing_analysis(c, None)).unwrap().len(), 1);

    // The rerun only needs the engine for the position that failed.
    let healthy = Script::for_archive(&archive, &[]);
    let rerun = run_evaluate(&db, &cfg, ScriptedLauncher(Rc::clone(&healthy)), None, &CancellationToken::new())
        .unwrap();
    assert_eq!(rerun.data.games_analyzed, 1);
    assert_eq!(rerun.data.moves_analyzed, 20);
    assert_eq!(rerun.data.engine_calls, 1);
    assert_eq!(rerun.data.store_hits, 19);
}

#[test]
fn analyze_without_records_writes_nothing() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let out = tempfile::tempdir().unwrap();
    let result = run_analyze(&db, &config(), Some(out.path())).unwrap();
    assert_eq!(result.data.records, 0);
    assert!(result.data.report_path.is_none());
    assert!(!out.path().join("friction_report.md").exists());
}

#[test]
fn quick_scan_summarizes_think_times() {
    let archive = format!("{}{}", ruy_lopez("abcd1234", "600+0"), ruy_lopez("bullet01", "60+0"));
    let scan = quick_scan_reader(&config(), archive.as_bytes(), 10, &CancellationToken::new()).unwrap();
    let scan = scan.data;
    assert_eq!(scan.games, 1);
    assert_eq!(scan.moves, 24);
    assert_eq!(scan.pressure_moves, 0);
    assert_eq!(scan.mean_think_pressure, None);
    assert_eq!(scan.by_move_number.len(), 12);
    // Move 1: white thinks 5s, black thinks 7s.
    assert_eq!(scan.by_move_number[0], (1, 6.0));
    let summary = scan.think_time.unwrap();
    assert_eq!(summary.min, 3.0);
    assert_eq!(summary.max, 10.0);
    assert!(scan.to_text().contains("Moves with clock data: 24"));
}

//! UCI engine process.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};

use friction_core::errors::EngineError;
use friction_core::types::EngineScore;

use super::backend::{AnalysisBackend, EngineLauncher, EngineSettings, PvLine};

/// How long `quit` gets before the process is killed.
const QUIT_GRACE: Duration = Duration::from_millis(500);

/// Launches `UciEngine`s from fixed settings.
#[derive(Debug, Clone)]
pub struct UciLauncher {
    settings: EngineSettings,
}

impl UciLauncher {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }
}

impl EngineLauncher for UciLauncher {
    type Backend = UciEngine;

    fn launch(&self) -> Result<UciEngine, EngineError> {
        UciEngine::start(&self.settings)
    }
}

/// A child process speaking UCI over stdin/stdout.
pub struct UciEngine {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    multipv: u32,
    closed: bool,
}

impl UciEngine {
    pub fn start(settings: &EngineSettings) -> Result<Self, EngineError> {
        let path = settings.path.display().to_string();
        let start_failed = |message: String| EngineError::StartFailed {
            path: path.clone(),
            message,
        };

        let mut command = Command::new(&settings.path);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        // Own process group: a terminal Ctrl-C is for the pipeline, which
        // then shuts the engine down itself.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        let mut child = command.spawn().map_err(|e| start_failed(e.to_string()))?;
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(start_failed("engine pipes unavailable".to_string()));
        };

        let mut engine = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            multipv: settings.multipv,
            closed: false,
        };
        engine
            .handshake(settings)
            .map_err(|e| start_failed(e.to_string()))?;
        tracing::info!(
            path = %path,
            threads = settings.threads,
            hash_mb = settings.hash_mb,
            multipv = settings.multipv,
            "engine started"
        );
        Ok(engine)
    }

    fn handshake(&mut self, settings: &EngineSettings) -> Result<(), EngineError> {
        self.send("uci")?;
        self.read_until("uciok")?;
        self.send(&format!("setoption name Threads value {}", settings.threads))?;
        self.send(&format!("setoption name Hash value {}", settings.hash_mb))?;
        self.send(&format!("setoption name MultiPV value {}", settings.multipv))?;
        self.sync()
    }

    fn sync(&mut self) -> Result<(), EngineError> {
        self.send("isready")?;
        self.read_until("readyok")
    }

    fn send(&mut self, command: &str) -> Result<(), EngineError> {
        writeln!(self.stdin, "{command}")?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(EngineError::Terminated);
        }
        Ok(line.trim_end().to_string())
    }

    fn read_until(&mut self, token: &str) -> Result<(), EngineError> {
        loop {
            if self.read_line()?.starts_with(token) {
                return Ok(());
            }
        }
    }
}

impl AnalysisBackend for UciEngine {
    fn analyse(&mut self, fen: &str, depth: u32, multipv: u32) -> Result<Vec<PvLine>, EngineError> {
        if self.closed {
            return Err(EngineError::Terminated);
        }
        if multipv != self.multipv {
            self.send(&format!("setoption name MultiPV value {multipv}"))?;
            self.sync()?;
            self.multipv = multipv;
        }
        self.send(&format!("position fen {fen}"))?;
        self.send(&format!("go depth {depth}"))?;

        let mut lines: BTreeMap<u32, PvLine> = BTreeMap::new();
        loop {
            let line = self.read_line()?;
            if line.starts_with("bestmove") {
                break;
            }
            if let Some(pv) = parse_info_line(&line) {
                lines.insert(pv.multipv, pv);
            }
        }
        Ok(lines.into_values().collect())
    }

    fn shutdown(&mut self) -> Result<(), EngineError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        // The process may already be gone; the kill below covers that.
        let _ = self.send("quit");

        let deadline = Instant::now() + QUIT_GRACE;
        while Instant::now() < deadline {
            if self.child.try_wait()?.is_some() {
                tracing::debug!("engine exited");
                return Ok(());
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        tracing::warn!("engine ignored quit, killing");
        self.child.kill()?;
        self.child.wait()?;
        Ok(())
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::warn!(error = %e, "engine shutdown failed");
        }
    }
}

/// Parse one `info` line into a scored variation.
///
/// Returns `None` for lines without a score, for `currmove` progress lines,
/// and for lowerbound/upperbound scores, which are not final.
pub fn parse_info_line(line: &str) -> Option<PvLine> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "info" {
        return None;
    }

    let mut depth = 0;
    let mut multipv = 1;
    let mut score = None;
    let mut moves = Vec::new();
    while let Some(token) = tokens.next() {
        match token {
            "depth" => depth = tokens.next()?.parse().ok()?,
            "multipv" => multipv = tokens.next()?.parse().ok()?,
            "score" => {
                score = match (tokens.next()?, tokens.next()?.parse().ok()?) {
                    ("cp", cp) => Some(EngineScore::Centipawns(cp)),
                    ("mate", n) => Some(EngineScore::Mate(n)),
                    _ => return None,
                };
            }
            "lowerbound" | "upperbound" | "currmove" => return None,
            "pv" => {
                moves = tokens.by_ref().map(str::to_string).collect();
            }
            "string" => return None,
            _ => {}
        }
    }

    Some(PvLine {
        multipv,
        depth,
        score: score?,
        moves,
    })
}

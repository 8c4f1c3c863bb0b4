//! friction - think-time friction analysis for online chess games.
//!
//! Drives the pipeline phases over a local SQLite store: parse an archive,
//! evaluate stored games, derive L2 trigger rows, and write the report.
//! `profile`, `levels` and `domain` work on a single export without a store.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use friction_analysis::engine::{EngineSettings, UciLauncher};
use friction_analysis::pipeline;
use friction_core::config::{CliOverrides, FrictionConfig};
use friction_core::errors::{
    ConfigError, DomainError, FrictionErrorCode, PipelineError, ProfileError, StorageError,
};
use friction_core::traits::CancellationToken;
use friction_storage::queries::stats;
use friction_storage::DatabaseManager;

mod interrupt;
mod summary;

/// friction - think-time friction analysis for online chess games
#[derive(Parser, Debug)]
#[command(name = "friction")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Project configuration file (TOML, or YAML by extension)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite store, overrides `data.database_path`
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stream a PGN archive (.pgn, .pgn.zst, .pgn.gz) into the store
    Parse {
        archive: PathBuf,

        /// Stop after this many stored games
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Evaluate stored games that have not been analyzed yet
    Evaluate {
        /// Analyze at most this many games
        #[arg(short, long)]
        limit: Option<usize>,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Derive L2 trigger rows from analyzed games
    Triggers,

    /// Run the statistics and write the report and CSV export
    Analyze {
        /// Output directory, overrides `data.output_dir`
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// parse, evaluate, triggers, and analyze in sequence
    Full {
        archive: PathBuf,

        /// Stop parsing after this many stored games
        #[arg(short, long)]
        limit: Option<usize>,

        #[command(flatten)]
        engine: EngineArgs,

        /// Output directory, overrides `data.output_dir`
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show row counts in the store
    Stats,

    /// Engine-free think-time overview of an archive
    Quick {
        archive: PathBuf,

        /// Number of accepted games to scan
        #[arg(short, long, default_value_t = 100)]
        sample: usize,
    },

    /// Build an L2 signature from an NDJSON game export
    Profile {
        export: PathBuf,

        /// Player whose games are profiled
        #[arg(short, long)]
        user: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Count L1/L2/L3 blunders in an NDJSON export with server analysis
    Levels {
        export: PathBuf,

        /// Player whose blunders are classified
        #[arg(short, long)]
        user: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// L2 friction outside chess, from local record exports
    Domain {
        #[command(subcommand)]
        domain: DomainCommand,

        /// Print JSON instead of text
        #[arg(long, global = true)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum DomainCommand {
    /// EdNet KT1 responses (CSV or NDJSON): Part 7 over Part 2 think time
    Ednet { records: PathBuf },

    /// ASSISTments responses (CSV or NDJSON): missed over solved think time
    Assistments { records: PathBuf },

    /// Quiz bowl games (JSON array): buzz timing against accuracy
    Quizbowl { games: PathBuf },

    /// Q&A answers (CSV or NDJSON): answer speed against quality
    Qa { answers: PathBuf },

    /// One answerer's history (NDJSON): career phases and tag firmware
    QaCareer {
        answers: PathBuf,

        /// Answerer shown in the report
        #[arg(short, long, default_value = "user")]
        name: String,

        /// Per-tag totals (CSV or NDJSON) for the firmware map
        #[arg(long)]
        tags: Option<PathBuf>,
    },

    /// Wikipedia revisions (NDJSON): revert rate by editor experience
    Wiki { revisions: PathBuf },
}

#[derive(clap::Args, Debug, Default)]
struct EngineArgs {
    /// UCI engine binary, overrides `engine.path`
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Search depth, overrides `engine.depth`
    #[arg(long)]
    depth: Option<u32>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        let mut overrides = CliOverrides {
            database_path: self.db.clone(),
            ..Default::default()
        };
        match &self.command {
            Commands::Evaluate { engine, .. } => {
                overrides.engine_path = engine.engine.clone();
                overrides.engine_depth = engine.depth;
            }
            Commands::Full { engine, output, .. } => {
                overrides.engine_path = engine.engine.clone();
                overrides.engine_depth = engine.depth;
                overrides.output_dir = output.clone();
            }
            Commands::Analyze { output } => overrides.output_dir = output.clone(),
            _ => {}
        }
        overrides
    }
}

fn main() -> ExitCode {
    friction_core::tracing::init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", render_fatal(&err));
            ExitCode::FAILURE
        }
    }
}

/// `[CODE] message` for pipeline errors, the plain chain otherwise.
fn render_fatal(err: &anyhow::Error) -> String {
    if let Some(e) = err.downcast_ref::<PipelineError>() {
        return e.coded_string();
    }
    if let Some(e) = err.downcast_ref::<ConfigError>() {
        return e.coded_string();
    }
    if let Some(e) = err.downcast_ref::<StorageError>() {
        return e.coded_string();
    }
    if let Some(e) = err.downcast_ref::<ProfileError>() {
        return e.coded_string();
    }
    if let Some(e) = err.downcast_ref::<DomainError>() {
        return e.coded_string();
    }
    format!("error: {err:#}")
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("cannot read the working directory")?;
    let overrides = cli.overrides();
    let config = FrictionConfig::load(&cwd, cli.config.as_deref(), Some(&overrides))?;

    let cancel = CancellationToken::new();
    interrupt::install(cancel.clone());

    match cli.command {
        Commands::Parse { archive, limit } => {
            let db = open_store(&config)?;
            parse(&db, &config, &archive, limit, &cancel)?;
        }
        Commands::Evaluate { limit, .. } => {
            let db = open_store(&config)?;
            evaluate(&db, &config, limit, &cancel)?;
        }
        Commands::Triggers => {
            let db = open_store(&config)?;
            triggers(&db, &config, &cancel)?;
        }
        Commands::Analyze { .. } => {
            let db = open_store(&config)?;
            analyze(&db, &config)?;
        }
        Commands::Full { archive, limit, .. } => {
            let db = open_store(&config)?;
            full(&db, &config, &archive, limit, &cancel)?;
        }
        Commands::Stats => {
            let db = open_store(&config)?;
            let counts = db.with_conn(stats::table_counts)?;
            print!("{}", summary::table_counts(&counts, db.path()));
        }
        Commands::Quick { archive, sample } => {
            let result = pipeline::quick_scan(&config, &archive, sample, &cancel)?;
            print!("{}", result.data.to_text());
            summary::report_errors("quick", &result);
        }
        Commands::Profile { export, user, json } => {
            let run = pipeline::run_profile(&config, &export, &user)?;
            if json {
                let text = serde_json::to_string_pretty(&run).context("cannot encode profile")?;
                println!("{text}");
            } else {
                print!("{}", run.profile.to_text());
                println!("\nGames read: {}, lines rejected: {}", run.games_read, run.lines_rejected);
            }
        }
        Commands::Levels { export, user, json } => {
            let run = pipeline::run_levels(&export, &user)?;
            let text = format!(
                "{}\nGames read: {}, lines rejected: {}\n",
                run.levels.to_text(&run.player),
                run.games_read,
                run.lines_rejected
            );
            emit(json, &run, text)?;
        }
        Commands::Domain { domain, json } => run_domain(&config, domain, json)?,
    }
    Ok(())
}

fn run_domain(config: &FrictionConfig, command: DomainCommand, json: bool) -> Result<()> {
    match command {
        DomainCommand::Ednet { records } => {
            let run = pipeline::run_ednet(config, &records)?;
            emit_domain(json, &run, run.report.to_text())
        }
        DomainCommand::Assistments { records } => {
            let run = pipeline::run_assistments(config, &records)?;
            emit_domain(json, &run, run.report.to_text())
        }
        DomainCommand::Quizbowl { games } => {
            let run = pipeline::run_quizbowl(config, &games)?;
            emit_domain(json, &run, run.report.to_text())
        }
        DomainCommand::Qa { answers } => {
            let run = pipeline::run_qa(&answers)?;
            emit_domain(json, &run, run.report.to_text())
        }
        DomainCommand::QaCareer { answers, name, tags } => {
            let run = pipeline::run_qa_career(&name, &answers, tags.as_deref())?;
            emit_domain(json, &run, run.report.to_text())
        }
        DomainCommand::Wiki { revisions } => {
            let run = pipeline::run_wiki(&revisions)?;
            emit_domain(json, &run, run.report.to_text())
        }
    }
}

fn emit_domain<R: Serialize>(json: bool, run: &pipeline::DomainRun<R>, text: String) -> Result<()> {
    let text = format!("{text}\nRows read: {}, rejected: {}\n", run.rows_read, run.rows_rejected);
    emit(json, run, text)
}

fn emit<T: Serialize>(json: bool, value: &T, text: String) -> Result<()> {
    if json {
        let encoded = serde_json::to_string_pretty(value).context("cannot encode report")?;
        println!("{encoded}");
    } else {
        print!("{text}");
    }
    Ok(())
}

fn open_store(config: &FrictionConfig) -> Result<DatabaseManager, PipelineError> {
    let path = config.data.effective_database_path();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::Io {
            path: parent.display().to_string(),
            message: e.to_string(),
        })?;
    }
    tracing::debug!(path = %path.display(), "opening store");
    Ok(DatabaseManager::open(&path)?)
}

/// Returns whether the phase ran to completion.
fn parse(
    db: &DatabaseManager,
    config: &FrictionConfig,
    archive: &Path,
    limit: Option<usize>,
    cancel: &CancellationToken,
) -> Result<bool, PipelineError> {
    let result = pipeline::run_parse(db, config, archive, limit, cancel)?;
    print!("{}", summary::parse(&result.data));
    summary::report_errors("parse", &result);
    Ok(!result.cancelled)
}

fn evaluate(
    db: &DatabaseManager,
    config: &FrictionConfig,
    limit: Option<usize>,
    cancel: &CancellationToken,
) -> Result<bool, PipelineError> {
    let launcher = UciLauncher::new(EngineSettings::from(&config.engine));
    let mut result = pipeline::run_evaluate(db, config, launcher, limit, cancel)?;
    let fatal = if result.data.aborted { result.errors.pop() } else { None };
    print!("{}", summary::evaluate(&result.data));
    summary::report_errors("evaluate", &result);
    match fatal {
        Some(e) => Err(e),
        None => Ok(!result.cancelled),
    }
}

fn triggers(
    db: &DatabaseManager,
    config: &FrictionConfig,
    cancel: &CancellationToken,
) -> Result<bool, PipelineError> {
    let result = pipeline::run_triggers(db, config, cancel)?;
    print!("{}", summary::triggers(&result.data));
    summary::report_errors("triggers", &result);
    Ok(!result.cancelled)
}

fn analyze(db: &DatabaseManager, config: &FrictionConfig) -> Result<(), PipelineError> {
    let result = pipeline::run_analyze(db, config, None)?;
    print!("{}", summary::analyze(&result.data));
    summary::report_errors("analyze", &result);
    Ok(())
}

fn full(
    db: &DatabaseManager,
    config: &FrictionConfig,
    archive: &Path,
    limit: Option<usize>,
    cancel: &CancellationToken,
) -> Result<(), PipelineError> {
    let completed = parse(db, config, archive, limit, cancel)?
        && evaluate(db, config, None, cancel)?
        && triggers(db, config, cancel)?;
    if !completed {
        println!("\nInterrupted; rerun to resume from the stored state.");
        return Ok(());
    }
    analyze(db, config)
}

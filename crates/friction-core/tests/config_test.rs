//! Tests for the layered configuration system.

use std::path::PathBuf;
use std::sync::Mutex;

use friction_core::config::{CliOverrides, EliteBenchmark, FrictionConfig};
use friction_core::errors::{ConfigError, FrictionErrorCode};

/// Serializes tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

fn clear_friction_env_vars() {
    for key in [
        "FRICTION_DATABASE_PATH",
        "FRICTION_ENGINE_PATH",
        "FRICTION_ENGINE_DEPTH",
        "FRICTION_ENGINE_MULTIPV",
        "FRICTION_ENGINE_THREADS",
        "FRICTION_MIN_RATING",
        "FRICTION_MAX_RATING",
        "FRICTION_BLUNDER_CP",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_layered_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_friction_env_vars();

    let dir = tempdir();
    std::fs::write(
        dir.path().join("friction.toml"),
        r#"
[engine]
depth = 18
multipv = 3

[filters]
min_rating = 1200
"#,
    )
    .unwrap();

    std::env::set_var("FRICTION_ENGINE_DEPTH", "20");
    std::env::set_var("FRICTION_MIN_RATING", "1400");

    let cli = CliOverrides {
        engine_depth: Some(22),
        ..Default::default()
    };
    let config = FrictionConfig::load(dir.path(), None, Some(&cli)).unwrap();

    // CLI beats env beats project.
    assert_eq!(config.engine.effective_depth(), 22);
    assert_eq!(config.filters.effective_min_rating(), 1400);
    // Project beats defaults.
    assert_eq!(config.engine.effective_multipv(), 3);
    // Untouched values fall back to defaults.
    assert_eq!(config.engine.effective_threads(), 4);

    clear_friction_env_vars();
}

#[test]
fn test_defaults_without_files() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_friction_env_vars();

    let dir = tempdir();
    let config = FrictionConfig::load(dir.path(), None, None).unwrap();

    assert_eq!(config.engine.effective_depth(), 14);
    assert_eq!(config.engine.effective_multipv(), 5);
    assert_eq!(config.engine.effective_skip_opening_moves(), 8);
    assert_eq!(config.filters.effective_min_time_control(), 600);
    assert_eq!(config.filters.effective_min_moves(), 20);
    assert!(config.filters.effective_require_clocks());
    assert_eq!(config.thresholds.effective_blunder_cp(), 100.0);
    assert_eq!(config.thresholds.effective_alternative_threshold_cp(), 50.0);
    assert_eq!(config.triggers.effective_friction_threshold(), 1.3);
    assert_eq!(config.triggers.effective_min_moves(), 4);
    assert_eq!(
        config.data.effective_database_path(),
        PathBuf::from("output/friction.db")
    );
    assert_eq!(config.analysis.effective_rating_bands().len(), 8);
    assert_eq!(config.profile.effective_benchmarks().len(), 3);
}

#[test]
fn test_explicit_yaml_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_friction_env_vars();

    let dir = tempdir();
    let path = dir.path().join("settings.yaml");
    std::fs::write(
        &path,
        "engine:\n  depth: 10\nthresholds:\n  blunder_cp: 150\n  mistake_cp: 75\n",
    )
    .unwrap();

    let config = FrictionConfig::load(dir.path(), Some(&path), None).unwrap();
    assert_eq!(config.engine.effective_depth(), 10);
    assert_eq!(config.thresholds.effective_blunder_cp(), 150.0);
    assert_eq!(config.thresholds.effective_mistake_cp(), 75.0);
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_friction_env_vars();

    let dir = tempdir();
    let missing = dir.path().join("nope.toml");
    let err = FrictionConfig::load(dir.path(), Some(&missing), None).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
    assert_eq!(err.error_code(), "CONFIG_ERROR");
}

#[test]
fn test_invalid_toml_names_the_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_friction_env_vars();

    let dir = tempdir();
    std::fs::write(dir.path().join("friction.toml"), "[engine\ndepth = ").unwrap();
    let err = FrictionConfig::load(dir.path(), None, None).unwrap_err();
    match err {
        ConfigError::ParseError { path, .. } => assert!(path.ends_with("friction.toml")),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_threshold_ordering_is_validated() {
    let config = FrictionConfig::from_toml(
        r#"
[thresholds]
blunder_cp = 40
mistake_cp = 50
"#,
    )
    .unwrap();
    let err = FrictionConfig::validate(&config).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "thresholds"));
}

#[test]
fn test_rating_window_and_bands_are_validated() {
    let config = FrictionConfig::from_toml("[filters]\nmin_rating = 2600\n").unwrap();
    assert!(FrictionConfig::validate(&config).is_err());

    let config = FrictionConfig::from_toml("[analysis]\nrating_bands = [1000, 1000, 1200]\n").unwrap();
    assert!(FrictionConfig::validate(&config).is_err());

    let config = FrictionConfig::from_toml("[engine]\nmultipv = 0\n").unwrap();
    assert!(FrictionConfig::validate(&config).is_err());
}

#[test]
fn test_domain_accuracy_cuts_are_validated() {
    let config = FrictionConfig::from_toml("[domains]\nmin_learners = 40\n").unwrap();
    assert_eq!(config.domains.effective_min_learners(), 40);
    assert_eq!(config.domains.effective_expert_accuracy(), 0.75);
    assert_eq!(config.domains.effective_buzz_expert_accuracy(), 0.80);
    assert_eq!(config.domains.effective_min_players(), 50);

    let config = FrictionConfig::from_toml("[domains]\nbuzz_expert_accuracy = 1.5\n").unwrap();
    let err = FrictionConfig::validate(&config).unwrap_err();
    assert!(
        matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "domains.buzz_expert_accuracy")
    );
}

#[test]
fn test_custom_benchmarks_replace_defaults() {
    let config = FrictionConfig::from_toml(
        r#"
[[profile.benchmarks]]
name = "coach"
l2_trigger = 1.7
opening_ratio = 0.8
middlegame_ratio = 1.3
endgame_ratio = 0.9
bimodal_index = 10.0
"#,
    )
    .unwrap();
    let benchmarks = config.profile.effective_benchmarks();
    assert_eq!(benchmarks.len(), 1);
    assert_eq!(
        benchmarks[0],
        EliteBenchmark {
            name: "coach".to_string(),
            l2_trigger: 1.7,
            opening_ratio: 0.8,
            middlegame_ratio: 1.3,
            endgame_ratio: 0.9,
            bimodal_index: 10.0,
        }
    );
}

#[test]
fn test_to_toml_round_trips_overrides() {
    let config = FrictionConfig::from_toml("[triggers]\nfriction_threshold = 1.6\n").unwrap();
    let text = config.to_toml().unwrap();
    let reparsed = FrictionConfig::from_toml(&text).unwrap();
    assert_eq!(reparsed.triggers.effective_friction_threshold(), 1.6);
}

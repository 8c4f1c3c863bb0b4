//! Top-level configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{
    AnalysisConfig, DataConfig, DomainConfig, EngineConfig, FilterConfig, ProfileConfig,
    ThresholdConfig, TriggerConfig,
};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sections.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`FRICTION_*`)
/// 3. Project config (`--config` path, else `friction.toml` in the root)
/// 4. User config (`~/.friction/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FrictionConfig {
    pub data: DataConfig,
    pub engine: EngineConfig,
    pub filters: FilterConfig,
    pub thresholds: ThresholdConfig,
    pub triggers: TriggerConfig,
    pub analysis: AnalysisConfig,
    pub profile: ProfileConfig,
    pub domains: DomainConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub database_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub engine_path: Option<PathBuf>,
    pub engine_depth: Option<u32>,
    pub sample_size: Option<usize>,
}

impl FrictionConfig {
    /// Load configuration with layered resolution.
    ///
    /// `explicit` names a project config file that must exist; without it
    /// `friction.toml` in `root` is used when present.
    pub fn load(
        root: &Path,
        explicit: Option<&Path>,
        cli_overrides: Option<&CliOverrides>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                Self::merge_file(&mut config, &user_config_path)?;
            }
        }

        // Layer 3: project config
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    });
                }
                Self::merge_file(&mut config, path)?;
            }
            None => {
                let project_config_path = root.join("friction.toml");
                if project_config_path.exists() {
                    Self::merge_file(&mut config, &project_config_path)?;
                }
            }
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml_str: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &FrictionConfig) -> Result<(), ConfigError> {
        let t = &config.thresholds;
        let (blunder, mistake, inaccuracy) = (
            t.effective_blunder_cp(),
            t.effective_mistake_cp(),
            t.effective_inaccuracy_cp(),
        );
        if !(blunder > mistake && mistake > inaccuracy && inaccuracy > 0.0) {
            return Err(ConfigError::ValidationFailed {
                field: "thresholds".to_string(),
                message: format!(
                    "require blunder > mistake > inaccuracy > 0, got {blunder} / {mistake} / {inaccuracy}"
                ),
            });
        }
        if t.effective_low_friction_multiplier() >= t.effective_high_friction_multiplier() {
            return Err(ConfigError::ValidationFailed {
                field: "thresholds.low_friction_multiplier".to_string(),
                message: "must be below high_friction_multiplier".to_string(),
            });
        }

        let f = &config.filters;
        if f.effective_min_rating() > f.effective_max_rating() {
            return Err(ConfigError::ValidationFailed {
                field: "filters.min_rating".to_string(),
                message: "must not exceed filters.max_rating".to_string(),
            });
        }
        let coverage = f.effective_min_clock_coverage();
        if !(coverage > 0.0 && coverage <= 1.0) {
            return Err(ConfigError::ValidationFailed {
                field: "filters.min_clock_coverage".to_string(),
                message: "must be in (0, 1]".to_string(),
            });
        }

        if config.engine.effective_depth() == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "engine.depth".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.engine.effective_multipv() == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "engine.multipv".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        let alpha = config.analysis.effective_significance_level();
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(ConfigError::ValidationFailed {
                field: "analysis.significance_level".to_string(),
                message: "must be in (0, 1]".to_string(),
            });
        }
        let bands = config.analysis.effective_rating_bands();
        if bands.len() < 2 || bands.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::ValidationFailed {
                field: "analysis.rating_bands".to_string(),
                message: "need at least two strictly ascending edges".to_string(),
            });
        }

        for (field, value) in [
            ("domains.expert_accuracy", config.domains.effective_expert_accuracy()),
            ("domains.buzz_expert_accuracy", config.domains.effective_buzz_expert_accuracy()),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be in (0, 1]".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Returns the user config path: `~/.friction/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".friction").join("config.toml"))
    }

    /// Merge a TOML or YAML file (chosen by extension) into the config.
    /// Unknown keys are ignored.
    fn merge_file(config: &mut FrictionConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let parsed = if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_toml(&content)
        };
        let file_config = parsed.map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins only where it has a value.
    fn merge(base: &mut FrictionConfig, other: &FrictionConfig) {
        // Data
        if other.data.database_path.is_some() {
            base.data.database_path = other.data.database_path.clone();
        }
        if other.data.output_dir.is_some() {
            base.data.output_dir = other.data.output_dir.clone();
        }
        if other.data.sample_size.is_some() {
            base.data.sample_size = other.data.sample_size;
        }

        // Engine
        if other.engine.path.is_some() {
            base.engine.path = other.engine.path.clone();
        }
        if other.engine.depth.is_some() {
            base.engine.depth = other.engine.depth;
        }
        if other.engine.multipv.is_some() {
            base.engine.multipv = other.engine.multipv;
        }
        if other.engine.threads.is_some() {
            base.engine.threads = other.engine.threads;
        }
        if other.engine.hash_mb.is_some() {
            base.engine.hash_mb = other.engine.hash_mb;
        }
        if other.engine.skip_opening_moves.is_some() {
            base.engine.skip_opening_moves = other.engine.skip_opening_moves;
        }
        if other.engine.cache_capacity.is_some() {
            base.engine.cache_capacity = other.engine.cache_capacity;
        }
        if other.engine.outside_top_penalty_cp.is_some() {
            base.engine.outside_top_penalty_cp = other.engine.outside_top_penalty_cp;
        }

        // Filters
        if other.filters.min_rating.is_some() {
            base.filters.min_rating = other.filters.min_rating;
        }
        if other.filters.max_rating.is_some() {
            base.filters.max_rating = other.filters.max_rating;
        }
        if other.filters.min_time_control.is_some() {
            base.filters.min_time_control = other.filters.min_time_control;
        }
        if other.filters.require_clocks.is_some() {
            base.filters.require_clocks = other.filters.require_clocks;
        }
        if other.filters.min_clock_coverage.is_some() {
            base.filters.min_clock_coverage = other.filters.min_clock_coverage;
        }
        if other.filters.min_moves.is_some() {
            base.filters.min_moves = other.filters.min_moves;
        }

        // Thresholds
        if other.thresholds.blunder_cp.is_some() {
            base.thresholds.blunder_cp = other.thresholds.blunder_cp;
        }
        if other.thresholds.mistake_cp.is_some() {
            base.thresholds.mistake_cp = other.thresholds.mistake_cp;
        }
        if other.thresholds.inaccuracy_cp.is_some() {
            base.thresholds.inaccuracy_cp = other.thresholds.inaccuracy_cp;
        }
        if other.thresholds.time_pressure_seconds.is_some() {
            base.thresholds.time_pressure_seconds = other.thresholds.time_pressure_seconds;
        }
        if other.thresholds.high_friction_multiplier.is_some() {
            base.thresholds.high_friction_multiplier = other.thresholds.high_friction_multiplier;
        }
        if other.thresholds.low_friction_multiplier.is_some() {
            base.thresholds.low_friction_multiplier = other.thresholds.low_friction_multiplier;
        }
        if other.thresholds.premove_threshold.is_some() {
            base.thresholds.premove_threshold = other.thresholds.premove_threshold;
        }
        if other.thresholds.alternative_threshold_cp.is_some() {
            base.thresholds.alternative_threshold_cp = other.thresholds.alternative_threshold_cp;
        }

        // Triggers
        if other.triggers.optionality_delta.is_some() {
            base.triggers.optionality_delta = other.triggers.optionality_delta;
        }
        if other.triggers.eval_gradient_cp.is_some() {
            base.triggers.eval_gradient_cp = other.triggers.eval_gradient_cp;
        }
        if other.triggers.criticality_gap_cp.is_some() {
            base.triggers.criticality_gap_cp = other.triggers.criticality_gap_cp;
        }
        if other.triggers.friction_threshold.is_some() {
            base.triggers.friction_threshold = other.triggers.friction_threshold;
        }
        if other.triggers.min_moves.is_some() {
            base.triggers.min_moves = other.triggers.min_moves;
        }

        // Analysis
        if other.analysis.significance_level.is_some() {
            base.analysis.significance_level = other.analysis.significance_level;
        }
        if !other.analysis.rating_bands.is_empty() {
            base.analysis.rating_bands = other.analysis.rating_bands.clone();
        }
        if other.analysis.min_correlation_samples.is_some() {
            base.analysis.min_correlation_samples = other.analysis.min_correlation_samples;
        }
        if other.analysis.min_regression_samples.is_some() {
            base.analysis.min_regression_samples = other.analysis.min_regression_samples;
        }

        // Profile
        if other.profile.min_games.is_some() {
            base.profile.min_games = other.profile.min_games;
        }
        if !other.profile.benchmarks.is_empty() {
            base.profile.benchmarks = other.profile.benchmarks.clone();
        }

        // Domains
        if other.domains.expert_accuracy.is_some() {
            base.domains.expert_accuracy = other.domains.expert_accuracy;
        }
        if other.domains.buzz_expert_accuracy.is_some() {
            base.domains.buzz_expert_accuracy = other.domains.buzz_expert_accuracy;
        }
        if other.domains.min_learners.is_some() {
            base.domains.min_learners = other.domains.min_learners;
        }
        if other.domains.min_players.is_some() {
            base.domains.min_players = other.domains.min_players;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `FRICTION_ENGINE_DEPTH`, `FRICTION_MIN_RATING`, etc.
    fn apply_env_overrides(config: &mut FrictionConfig) {
        if let Ok(val) = std::env::var("FRICTION_DATABASE_PATH") {
            config.data.database_path = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("FRICTION_ENGINE_PATH") {
            config.engine.path = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("FRICTION_ENGINE_DEPTH") {
            if let Ok(v) = val.parse::<u32>() {
                config.engine.depth = Some(v);
            }
        }
        if let Ok(val) = std::env::var("FRICTION_ENGINE_MULTIPV") {
            if let Ok(v) = val.parse::<u32>() {
                config.engine.multipv = Some(v);
            }
        }
        if let Ok(val) = std::env::var("FRICTION_ENGINE_THREADS") {
            if let Ok(v) = val.parse::<u32>() {
                config.engine.threads = Some(v);
            }
        }
        if let Ok(val) = std::env::var("FRICTION_MIN_RATING") {
            if let Ok(v) = val.parse::<u32>() {
                config.filters.min_rating = Some(v);
            }
        }
        if let Ok(val) = std::env::var("FRICTION_MAX_RATING") {
            if let Ok(v) = val.parse::<u32>() {
                config.filters.max_rating = Some(v);
            }
        }
        if let Ok(val) = std::env::var("FRICTION_BLUNDER_CP") {
            if let Ok(v) = val.parse::<f64>() {
                config.thresholds.blunder_cp = Some(v);
            }
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut FrictionConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.database_path {
            config.data.database_path = Some(v.clone());
        }
        if let Some(ref v) = cli.output_dir {
            config.data.output_dir = Some(v.clone());
        }
        if let Some(ref v) = cli.engine_path {
            config.engine.path = Some(v.clone());
        }
        if let Some(v) = cli.engine_depth {
            config.engine.depth = Some(v);
        }
        if let Some(v) = cli.sample_size {
            config.data.sample_size = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

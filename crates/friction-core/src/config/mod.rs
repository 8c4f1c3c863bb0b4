//! Configuration for the friction pipeline.
//! TOML or YAML, layered: CLI > env > project > user > defaults.

pub mod analysis_config;
pub mod data_config;
pub mod domain_config;
pub mod engine_config;
pub mod filter_config;
pub mod friction_config;
pub mod profile_config;
pub mod threshold_config;
pub mod trigger_config;

pub use analysis_config::AnalysisConfig;
pub use data_config::DataConfig;
pub use domain_config::DomainConfig;
pub use engine_config::EngineConfig;
pub use filter_config::FilterConfig;
pub use friction_config::{CliOverrides, FrictionConfig};
pub use profile_config::{EliteBenchmark, ProfileConfig};
pub use threshold_config::ThresholdConfig;
pub use trigger_config::TriggerConfig;

//! Data locations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DataConfig {
    /// SQLite database file. Default: `output/friction.db`.
    pub database_path: Option<PathBuf>,
    /// Directory for reports and CSV exports. Default: `output`.
    pub output_dir: Option<PathBuf>,
    /// Stop parsing after this many accepted games.
    pub sample_size: Option<usize>,
}

impl DataConfig {
    pub fn effective_database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("output/friction.db"))
    }

    pub fn effective_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("output"))
    }
}

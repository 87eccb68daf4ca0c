//! Validation stage configuration

use std::path::PathBuf;

use fmucat_store::RunOptions;

/// Runtime configuration for the validation stage
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory scanned recursively for `*.fmu` files
    pub models_dir: PathBuf,
    /// Model catalog table
    pub table_path: PathBuf,
    pub options: RunOptions,
}

impl Config {
    pub fn new(models_dir: impl Into<PathBuf>, table_path: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
            table_path: table_path.into(),
            options: RunOptions::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("downloads", "fmu_models.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.models_dir, PathBuf::from("downloads"));
        assert_eq!(config.table_path, PathBuf::from("fmu_models.csv"));
        assert!(!config.options.test_mode);
        assert_eq!(config.options.checkpoint_interval, RunOptions::CHECKPOINT_INTERVAL);
    }
}

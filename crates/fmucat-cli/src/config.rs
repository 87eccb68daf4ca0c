//! `fmucat.toml`: table locations, batch policies and GitHub access

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use fmucat_store::RunOptions;
use serde::Deserialize;

/// Global configuration for fmucat
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub run: RunConfig,
    pub github: GitHubConfig,
}

/// Where the tables and downloads live. File names are relative to `data_dir`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub links: PathBuf,
    pub downloads: PathBuf,
    pub download_dir: PathBuf,
    pub models: PathBuf,
    pub licenses: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("results"),
            links: PathBuf::from("fmu_links.csv"),
            downloads: PathBuf::from("downloads.csv"),
            download_dir: PathBuf::from("downloads"),
            models: PathBuf::from("fmu_models.csv"),
            licenses: PathBuf::from("repository_licenses.csv"),
        }
    }
}

impl StoreConfig {
    /// Resolve a configured name against `data_dir`.
    pub fn path(&self, name: &Path) -> PathBuf {
        self.data_dir.join(name)
    }

    pub fn links_path(&self) -> PathBuf {
        self.path(&self.links)
    }

    pub fn downloads_path(&self) -> PathBuf {
        self.path(&self.downloads)
    }

    pub fn download_dir(&self) -> PathBuf {
        self.path(&self.download_dir)
    }

    pub fn models_path(&self) -> PathBuf {
        self.path(&self.models)
    }

    pub fn licenses_path(&self) -> PathBuf {
        self.path(&self.licenses)
    }
}

/// Batch policies shared by every stage
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub checkpoint_interval: usize,
    pub test_checkpoint_interval: usize,
    pub test_cap: usize,
    pub progress_every: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            checkpoint_interval: RunOptions::CHECKPOINT_INTERVAL,
            test_checkpoint_interval: RunOptions::TEST_CHECKPOINT_INTERVAL,
            test_cap: RunOptions::TEST_CAP,
            progress_every: RunOptions::PROGRESS_EVERY,
        }
    }
}

impl RunConfig {
    pub fn options(&self, test_mode: bool) -> RunOptions {
        RunOptions {
            test_mode,
            test_cap: self.test_cap,
            checkpoint_interval: if test_mode {
                self.test_checkpoint_interval
            } else {
                self.checkpoint_interval
            },
            progress_every: self.progress_every,
            ..RunOptions::for_mode(test_mode)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_base: String,
    pub raw_base: String,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub token: Option<String>,
    pub search_query: String,
    pub max_pages: u32,
    pub test_max_pages: u32,
    pub page_delay_ms: u64,
    pub download_delay_ms: u64,
    pub license_delay_ms: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: fmucat_github::GitHubClient::API_BASE.to_string(),
            raw_base: fmucat_github::GitHubClient::RAW_BASE.to_string(),
            token: None,
            search_query: "extension:fmu".to_string(),
            max_pages: fmucat_github::search::MAX_PAGES,
            test_max_pages: fmucat_github::search::TEST_MAX_PAGES,
            page_delay_ms: 2000,
            download_delay_ms: fmucat_github::download::DOWNLOAD_DELAY.as_millis() as u64,
            license_delay_ms: fmucat_github::license::MIN_LOOKUP_DELAY.as_millis() as u64,
        }
    }
}

impl GitHubConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn download_delay(&self) -> Duration {
        Duration::from_millis(self.download_delay_ms)
    }

    pub fn license_delay(&self) -> Duration {
        Duration::from_millis(self.license_delay_ms)
    }
}

/// `token = "${GITHUB_TOKEN}"` reads the variable; anything else is literal.
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| expand_env_var(&value)))
}

fn expand_env_var(value: &str) -> Option<String> {
    match value.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
        Some(name) => std::env::var(name).ok(),
        None => Some(value.to_owned()),
    }
}

impl Config {
    /// First existing of `./fmucat.toml` and `<config dir>/fmucat/config.toml`,
    /// or the defaults when neither exists.
    pub fn load() -> Result<Self> {
        let user = directories::ProjectDirs::from("", "", "fmucat")
            .map(|dirs| dirs.config_dir().join("config.toml"));
        let candidates = std::iter::once(PathBuf::from("fmucat.toml")).chain(user);

        for candidate in candidates {
            if candidate.is_file() {
                return Self::from_file(&candidate);
            }
        }
        log::debug!("No fmucat.toml found, using built-in defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        log::info!("Using configuration {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.store.models_path(), PathBuf::from("results/fmu_models.csv"));
        assert_eq!(config.store.download_dir(), PathBuf::from("results/downloads"));
        assert_eq!(config.run.checkpoint_interval, 10);
        assert_eq!(config.github.api_base, "https://api.github.com");
        assert_eq!(config.github.license_delay(), Duration::from_millis(100));
    }

    #[test]
    fn downloads_are_paced_by_default() {
        let github = GitHubConfig::default();
        assert_eq!(github.download_delay(), Duration::from_secs(1));

        let options = RunConfig::default()
            .options(false)
            .with_item_delay(github.download_delay());
        assert!(!options.item_delay.is_zero());
    }

    #[test]
    fn run_options_follow_mode() {
        let run = RunConfig::default();
        let prod = run.options(false);
        let test = run.options(true);
        assert_eq!(prod.checkpoint_interval, 10);
        assert!(!prod.test_mode);
        assert_eq!(test.checkpoint_interval, 2);
        assert_eq!(test.test_cap, 5);
        assert!(test.test_mode);
    }

    #[test]
    fn expand_env_var_simple() {
        std::env::set_var("FMUCAT_TEST_VAR", "test_value");
        assert_eq!(
            expand_env_var("${FMUCAT_TEST_VAR}"),
            Some("test_value".to_string())
        );
        std::env::remove_var("FMUCAT_TEST_VAR");
    }

    #[test]
    fn expand_env_var_literal() {
        assert_eq!(expand_env_var("ghp_literal"), Some("ghp_literal".to_string()));
    }

    #[test]
    fn expand_env_var_missing() {
        assert_eq!(expand_env_var("${FMUCAT_UNSET_VARIABLE}"), None);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[store]
data_dir = "/tmp/fmus"
models = "models.csv"

[run]
test_cap = 3

[github]
token = "ghp_inline"
download_delay_ms = 250
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.store.models_path(), PathBuf::from("/tmp/fmus/models.csv"));
        assert_eq!(config.store.links_path(), PathBuf::from("/tmp/fmus/fmu_links.csv"));
        assert_eq!(config.run.test_cap, 3);
        assert_eq!(config.run.checkpoint_interval, 10);
        assert_eq!(config.github.token.as_deref(), Some("ghp_inline"));
        assert_eq!(config.github.download_delay(), Duration::from_millis(250));
        assert_eq!(config.github.search_query, "extension:fmu");
    }

    #[test]
    fn from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fmucat.toml");
        std::fs::write(&path, "[run\n").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("fmucat.toml"));
    }
}

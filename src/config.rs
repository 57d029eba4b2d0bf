use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::constants::constants;

pub const API_KEY_ENV: &str = "OMDB_API_KEY";

/// On-disk preferences (`config.toml` in the project config dir).
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
  pub api_key: Option<String>,
  pub base_url: Option<String>,
  pub debounce_ms: Option<u64>,
  pub request_timeout_secs: Option<u64>,
  pub theme_name: Option<String>,
}

fn project_dirs() -> Option<ProjectDirs> {
  ProjectDirs::from("", "", "reelscope")
}

pub fn config_path() -> Option<PathBuf> {
  project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Directory for rolling log files; falls back to the working directory.
pub fn log_dir() -> PathBuf {
  project_dirs().map(|dirs| dirs.data_local_dir().join("logs")).unwrap_or_else(|| PathBuf::from("logs"))
}

impl Config {
  pub fn parse(content: &str) -> Result<Self> {
    toml::from_str(content).context("Failed to parse config.toml")
  }

  /// Load preferences; a missing or invalid file yields defaults.
  pub fn load() -> Self {
    let Some(path) = config_path() else { return Self::default() };
    let Ok(content) = std::fs::read_to_string(&path) else { return Self::default() };
    match Self::parse(&content) {
      Ok(config) => config,
      Err(e) => {
        warn!(path = %path.display(), err = %format!("{:#}", e), "config: ignoring invalid file");
        Self::default()
      }
    }
  }

  pub fn save(&self) {
    if let Some(path) = config_path()
      && let Some(dir) = path.parent()
      && std::fs::create_dir_all(dir).is_ok()
      && let Ok(content) = toml::to_string(self)
    {
      let _ = std::fs::write(path, content);
    }
  }
}

/// Command-line overrides, highest precedence.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
  pub api_key: Option<String>,
  pub base_url: Option<String>,
  pub debounce_ms: Option<u64>,
}

/// Effective runtime settings after merging CLI, environment and file.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
  pub api_key: Option<String>,
  pub base_url: String,
  pub debounce_ms: u64,
  pub request_timeout_secs: u64,
}

impl Settings {
  /// Precedence: CLI flag > `OMDB_API_KEY` > config file > built-in constants.
  pub fn resolve(overrides: &Overrides, env_key: Option<String>, config: &Config) -> Self {
    let non_empty = |v: &Option<String>| v.as_ref().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let c = constants();
    Self {
      api_key: non_empty(&overrides.api_key).or_else(|| non_empty(&env_key)).or_else(|| non_empty(&config.api_key)),
      base_url: non_empty(&overrides.base_url)
        .or_else(|| non_empty(&config.base_url))
        .unwrap_or_else(|| c.omdb_base_url.clone()),
      debounce_ms: overrides.debounce_ms.or(config.debounce_ms).unwrap_or(c.debounce_ms),
      request_timeout_secs: config.request_timeout_secs.unwrap_or(c.request_timeout_secs),
    }
  }
}

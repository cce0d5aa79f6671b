use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, WatcherError};

// Watcher settings, stored as config.json in the app data directory

pub const LEAGUE_PATH_ENV: &str = "CHAMPSELECT_LEAGUE_PATH";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatcherConfig {
  #[serde(default)]
  pub league_path: Option<String>,
  #[serde(default = "default_poll_interval_ms")]
  pub poll_interval_ms: u64,
  #[serde(default = "default_true")]
  pub enable_item_sets: bool,
  #[serde(default = "default_true")]
  pub enable_summoner_spells: bool,
  #[serde(default = "default_true")]
  pub load_runes_automatically: bool,
  #[serde(default)]
  pub verbose_logging: bool,
  #[serde(default = "default_item_set_prefix")]
  pub item_set_prefix: String,
  #[serde(default = "default_request_timeout_ms")]
  pub request_timeout_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
  1000
}

fn default_true() -> bool {
  true
}

fn default_item_set_prefix() -> String {
  "CSW_".to_string()
}

fn default_request_timeout_ms() -> u64 {
  5000
}

impl Default for WatcherConfig {
  fn default() -> Self {
    Self {
      league_path: None,
      poll_interval_ms: default_poll_interval_ms(),
      enable_item_sets: true,
      enable_summoner_spells: true,
      load_runes_automatically: true,
      verbose_logging: false,
      item_set_prefix: default_item_set_prefix(),
      request_timeout_ms: default_request_timeout_ms(),
    }
  }
}

impl WatcherConfig {
  /// Reads the config file, falling back to defaults when it does not exist yet.
  pub fn load(path: &Path) -> Result<Self> {
    if !path.exists() {
      tracing::info!("[Config] No config at {}, using defaults", path.display());
      return Ok(Self::default());
    }

    let content = fs::read_to_string(path)
      .map_err(|e| WatcherError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    let config: Self = serde_json::from_str(&content)
      .map_err(|e| WatcherError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
  }

  pub fn save(&self, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(self)?;
    fs::write(path, data)?;
    Ok(())
  }

  /// The league path from the environment wins over the stored one.
  pub fn with_env_overrides(mut self) -> Self {
    if let Ok(path) = std::env::var(LEAGUE_PATH_ENV) {
      if !path.trim().is_empty() {
        self.league_path = Some(path);
      }
    }
    self
  }

  pub fn poll_interval(&self) -> Duration {
    Duration::from_millis(self.poll_interval_ms)
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_millis(self.request_timeout_ms)
  }

  fn validate(&self) -> Result<()> {
    if self.poll_interval_ms == 0 {
      return Err(WatcherError::Config(
        "poll_interval_ms must be greater than zero".to_string(),
      ));
    }
    if self.item_set_prefix.is_empty() {
      return Err(WatcherError::Config(
        "item_set_prefix must not be empty".to_string(),
      ));
    }
    Ok(())
  }
}

use std::io;
use thiserror::Error;

use crate::champ_select::types::ChampionId;

// Error handling for the champ select watcher

#[derive(Debug, Error)]
pub enum WatcherError {
  #[error("Request error: {0}")]
  Request(#[from] reqwest::Error),

  #[error("Unexpected HTTP status {status} from {endpoint}")]
  Http {
    endpoint: String,
    status: reqwest::StatusCode,
  },

  #[error("Invalid response from {endpoint}: {reason}")]
  InvalidResponse { endpoint: String, reason: String },

  #[error("League client is not running (no lockfile in {0})")]
  ClientNotRunning(String),

  #[error("Strategy error: {0}")]
  Strategy(String),

  #[error("Unsupported game mode: {0}")]
  UnsupportedGameMode(String),

  #[error("Unknown champion id {0}")]
  UnknownChampion(ChampionId),

  #[error("Item set error: {0}")]
  ItemSet(String),

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("IO Error: {0}")]
  Io(#[from] io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

impl WatcherError {
  /// Everything except an unsupported game mode only affects the current tick.
  pub fn is_transient(&self) -> bool {
    !matches!(self, Self::UnsupportedGameMode(_))
  }
}

pub type Result<T> = std::result::Result<T, WatcherError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unsupported_game_mode_is_not_transient() {
    assert!(!WatcherError::UnsupportedGameMode("TFT".into()).is_transient());
    assert!(WatcherError::Strategy("no local player".into()).is_transient());
    assert!(WatcherError::UnknownChampion(9999).is_transient());
  }

  #[test]
  fn http_error_names_the_endpoint() {
    let err = WatcherError::Http {
      endpoint: "/lol-champ-select/v1/session".into(),
      status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
    };
    let text = err.to_string();
    assert!(text.contains("500"));
    assert!(text.contains("/lol-champ-select/v1/session"));
  }
}

// Types shared by the champ select poller, state machine and strategies

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, WatcherError};

pub type ChampionId = i64;

/// One polled read of `/lol-champ-select/v1/session`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot(pub serde_json::Value);

impl SessionSnapshot {
  pub fn json(&self) -> &serde_json::Value {
    &self.0
  }
}

impl From<serde_json::Value> for SessionSnapshot {
  fn from(value: serde_json::Value) -> Self {
    Self(value)
  }
}

/// Result of a single session fetch.
#[derive(Debug)]
pub enum FetchOutcome {
  Snapshot(SessionSnapshot),
  /// No active session (HTTP 404 or no running client).
  NotFound,
  TransientError(WatcherError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
  #[default]
  Idle,
  InChampionSelect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
  #[serde(rename = "CLASSIC")]
  Classic,
  #[serde(rename = "ARAM")]
  Aram,
}

impl GameMode {
  pub fn parse(raw: &str) -> Result<Self> {
    match raw.trim().to_uppercase().as_str() {
      "CLASSIC" => Ok(Self::Classic),
      "ARAM" => Ok(Self::Aram),
      _ => Err(WatcherError::UnsupportedGameMode(raw.to_string())),
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Classic => "CLASSIC",
      Self::Aram => "ARAM",
    }
  }
}

impl fmt::Display for GameMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
  Top,
  Jungle,
  Middle,
  Bottom,
  Utility,
}

impl Position {
  /// Parses the client's `assignedPosition`; empty means not assigned yet.
  pub fn from_assigned(raw: &str) -> Option<Self> {
    match raw.trim().to_lowercase().as_str() {
      "top" => Some(Self::Top),
      "jungle" => Some(Self::Jungle),
      "middle" | "mid" => Some(Self::Middle),
      "bottom" | "adc" | "bot" => Some(Self::Bottom),
      "utility" | "support" => Some(Self::Utility),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Top => "top",
      Self::Jungle => "jungle",
      Self::Middle => "middle",
      Self::Bottom => "bottom",
      Self::Utility => "utility",
    }
  }
}

/// Label shown for a provider position: `ADC` stays upper case, anything else
/// is capitalized.
pub fn position_label(pos: &str) -> String {
  if pos.eq_ignore_ascii_case("adc") {
    return "ADC".to_string();
  }
  let mut chars = pos.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickInfo {
  pub champion_id: ChampionId,
  pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Champion {
  pub id: ChampionId,
  /// Data Dragon key, e.g. "LeeSin"; item sets are stored under it.
  pub key: String,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
  pub phase: Phase,
  pub game_mode: Option<GameMode>,
  pub last_champion_id: Option<ChampionId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
  PhaseEntered { game_mode: GameMode },
  PhaseExited,
  ChampionChosen(ChampionId),
  ChampionCleared,
}

impl DomainEvent {
  /// Name of the process-level signal, where the event has one.
  pub fn signal_name(&self) -> Option<&'static str> {
    match self {
      Self::PhaseEntered { .. } => Some("champion-select-in"),
      Self::PhaseExited => Some("champion-select-out"),
      _ => None,
    }
  }
}

/// What the status indicator shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WatcherStatus {
  #[default]
  Waiting,
  PickChampion,
  UpdatingDisplay(String),
  RunesLoaded { champion: String, position: String },
  Error(String),
}

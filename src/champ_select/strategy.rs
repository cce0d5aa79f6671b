// Per game mode extraction and lifecycle hooks

use std::collections::HashMap;

use super::game_modes::{AramStrategy, ClassicStrategy};
use super::types::{Champion, GameMode, PickInfo, Position, SessionSnapshot};
use crate::error::{Result, WatcherError};

/// Lifecycle of one strategy during an episode:
/// `on_first_tick` once, then `on_tick` on every tick (first tick included),
/// `on_champion_change` for each new non-zero pick, and `end` on exit.
pub trait GameModeStrategy: Send + Sync {
  fn on_first_tick(&mut self, snapshot: &SessionSnapshot) -> Result<()>;

  fn on_tick(&mut self, snapshot: &SessionSnapshot) -> Result<()>;

  /// Pick derived from the latest tick. `None` before the first `on_tick`.
  fn player(&self) -> Option<PickInfo>;

  fn position(&self) -> Option<Position>;

  fn on_champion_change(&mut self, champion: &Champion) -> Result<()>;

  fn end(&mut self);
}

/// Dispatch table from game mode to strategy, built once at startup.
pub struct StrategyTable {
  strategies: HashMap<GameMode, Box<dyn GameModeStrategy>>,
}

impl StrategyTable {
  pub fn empty() -> Self {
    Self {
      strategies: HashMap::new(),
    }
  }

  /// Every game mode with a built-in strategy.
  pub fn standard() -> Self {
    Self::empty()
      .with(GameMode::Classic, ClassicStrategy::default())
      .with(GameMode::Aram, AramStrategy::default())
  }

  pub fn with(mut self, mode: GameMode, strategy: impl GameModeStrategy + 'static) -> Self {
    self.strategies.insert(mode, Box::new(strategy));
    self
  }

  pub fn supports(&self, mode: GameMode) -> bool {
    self.strategies.contains_key(&mode)
  }

  pub fn get_mut(&mut self, mode: GameMode) -> Result<&mut (dyn GameModeStrategy + 'static)> {
    self
      .strategies
      .get_mut(&mode)
      .map(|s| s.as_mut())
      .ok_or_else(|| WatcherError::UnsupportedGameMode(mode.to_string()))
  }
}

impl Default for StrategyTable {
  fn default() -> Self {
    Self::standard()
  }
}

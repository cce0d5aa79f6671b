// Howling Abyss: champions are assigned, rerolls and bench swaps change them

use crate::champ_select::session::{local_champion_id, local_player};
use crate::champ_select::strategy::GameModeStrategy;
use crate::champ_select::types::{Champion, PickInfo, Position, SessionSnapshot};
use crate::error::{Result, WatcherError};

#[derive(Debug, Default)]
pub struct AramStrategy {
  player: Option<PickInfo>,
  champion_changes: u32,
}

impl AramStrategy {
  /// Champion changes in the current episode, the initial assignment included.
  pub fn champion_changes(&self) -> u32 {
    self.champion_changes
  }
}

impl GameModeStrategy for AramStrategy {
  fn on_first_tick(&mut self, _snapshot: &SessionSnapshot) -> Result<()> {
    self.player = None;
    self.champion_changes = 0;
    Ok(())
  }

  fn on_tick(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
    let player = local_player(snapshot).ok_or_else(|| {
      WatcherError::Strategy("local player missing from myTeam".to_string())
    })?;
    self.player = Some(PickInfo {
      champion_id: local_champion_id(player),
      position: None,
    });
    Ok(())
  }

  fn player(&self) -> Option<PickInfo> {
    self.player
  }

  fn position(&self) -> Option<Position> {
    None
  }

  fn on_champion_change(&mut self, champion: &Champion) -> Result<()> {
    self.champion_changes += 1;
    if self.champion_changes > 1 {
      tracing::info!(
        "[Champ Select][ARAM] Reroll/swap #{} -> {}",
        self.champion_changes - 1,
        champion.name
      );
    }
    Ok(())
  }

  fn end(&mut self) {
    tracing::debug!(
      "[Champ Select][ARAM] Episode ended after {} champion changes",
      self.champion_changes
    );
    self.player = None;
    self.champion_changes = 0;
  }
}

// Summoner's Rift draft / blind pick

use crate::champ_select::session::{
  assigned_position, has_pick_in_progress, local_champion_id, local_player,
};
use crate::champ_select::strategy::GameModeStrategy;
use crate::champ_select::types::{Champion, PickInfo, Position, SessionSnapshot};
use crate::error::{Result, WatcherError};

#[derive(Debug, Default)]
pub struct ClassicStrategy {
  position: Option<Position>,
  player: Option<PickInfo>,
}

impl ClassicStrategy {
  fn resolve_position(&mut self, snapshot: &SessionSnapshot) {
    if self.position.is_some() {
      return;
    }
    if let Some(position) = local_player(snapshot).and_then(assigned_position) {
      tracing::info!("[Champ Select][CLASSIC] Assigned position: {}", position.as_str());
      self.position = Some(position);
    }
  }
}

impl GameModeStrategy for ClassicStrategy {
  fn on_first_tick(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
    self.position = None;
    self.player = None;
    self.resolve_position(snapshot);
    Ok(())
  }

  fn on_tick(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
    let player = local_player(snapshot).ok_or_else(|| {
      WatcherError::Strategy("local player missing from myTeam".to_string())
    })?;

    // Blind pick only reveals the role once the draft settles.
    self.resolve_position(snapshot);

    // While our pick is in progress the championId is only a hover; keep the
    // previous pick until it is locked in.
    let champion_id = if has_pick_in_progress(snapshot) {
      self.player.map(|p| p.champion_id).unwrap_or(0)
    } else {
      local_champion_id(player)
    };

    self.player = Some(PickInfo {
      champion_id,
      position: self.position,
    });
    Ok(())
  }

  fn player(&self) -> Option<PickInfo> {
    self.player
  }

  fn position(&self) -> Option<Position> {
    self.position
  }

  fn on_champion_change(&mut self, champion: &Champion) -> Result<()> {
    tracing::debug!(
      "[Champ Select][CLASSIC] Champion locked: {} ({})",
      champion.name,
      champion.id
    );
    Ok(())
  }

  fn end(&mut self) {
    self.position = None;
    self.player = None;
  }
}
